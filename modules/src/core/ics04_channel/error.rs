use crate::prelude::*;

use flex_error::{define_error, TraceError};

use super::channel::State;
use super::packet::Sequence;
use crate::core::ics02_client::error as client_error;
use crate::core::ics03_connection::error as connection_error;
use crate::core::ics05_port::error as port_error;
use crate::core::ics24_host::error::ValidationError;
use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
use crate::proofs::ProofError;
use crate::timestamp::{Timestamp, TimestampOverflowError};
use crate::Height;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        Ics02Client
            [ client_error::Error ]
            | _ | { "ics02 client error" },

        Ics03Connection
            [ connection_error::Error ]
            | _ | { "ics03 connection error" },

        Ics05Port
            [ port_error::Error ]
            | _ | { "ics05 port error" },

        Identifier
            [ ValidationError ]
            | _ | { "identifier error" },

        Encode
            [ TraceError<serde_json::Error> ]
            | _ | { "failed to encode a value for commitment" },

        UnknownOrderType
            { type_id: String }
            | e | { format_args!("channel order type unknown: {}", e.type_id) },

        InvalidConnectionHopsLength
            { expected: usize, actual: usize }
            | e | {
                format_args!(
                    "invalid connection hops length: expected {0}; actual {1}",
                    e.expected, e.actual)
            },

        InvalidPacketCounterparty
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "packet destination port {} and channel {} doesn't match the counterparty's port/channel",
                    e.port_id, e.channel_id)
            },

        InvalidProof
            [ ProofError ]
            | _ | { "invalid proof" },

        MissingCounterpartyChannelId
            | _ | { "the counterparty channel id is not known yet" },

        ZeroPacketSequence
            | _ | { "packet sequence cannot be 0" },

        ZeroPacketData
            | _ | { "packet data bytes cannot be empty" },

        MissingTimeout
            | _ | { "packet timeout height and packet timeout timestamp cannot both be 0" },

        ConnectionNotOpen
            { connection_id: ConnectionId }
            | e | {
                format_args!(
                    "the associated connection {0} is not OPEN",
                    e.connection_id)
            },

        ChannelFeatureNotSupportedByConnection
            | _ | { "the channel ordering is not supported by connection" },

        ChannelNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "the channel end ({0}, {1}) does not exist",
                    e.port_id, e.channel_id)
            },

        InvalidChannelState
            { channel_id: ChannelId, state: State }
            | e | {
                format_args!(
                    "Channel {0} should not be state {1}",
                    e.channel_id, e.state)
            },

        ChannelClosed
            { channel_id: ChannelId }
            | e | {
                format_args!(
                    "Channel {0} is Closed",
                    e.channel_id)
            },

        InvalidChannelCapability
            { port_id: PortId, channel_id: ChannelId }
            [ port_error::Error ]
            | e | {
                format_args!(
                    "the capability presented is not the one owning channel ({0}, {1})",
                    e.port_id, e.channel_id)
            },

        FrozenClient
            { client_id: ClientId }
            | e | {
                format_args!(
                    "Client with id {0} is frozen",
                    e.client_id)
            },

        VerifyChannelFailed
            [ client_error::Error ]
            | _ | { "Error verifying channel state" },

        PacketVerificationFailed
            { sequence: Sequence }
            [ client_error::Error ]
            | e | {
                format_args!(
                    "Verification fails for the packet with the sequence number {0}",
                    e.sequence)
            },

        UpgradeVerificationFailed
            [ client_error::Error ]
            | _ | { "Error verifying the counterparty upgrade" },

        ErrorReceiptVerificationFailed
            [ client_error::Error ]
            | _ | { "Error verifying the counterparty upgrade error receipt" },

        InvalidAcknowledgement
            | _ | { "Acknowledgment cannot be empty" },

        AcknowledgementExists
            { sequence: Sequence }
            | e | {
                format_args!(
                    "Packet acknowledgement exists for the packet with the sequence {0}",
                    e.sequence)
            },

        MissingNextSendSeq
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "Missing sequence number for sending packets on port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        MissingNextRecvSeq
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "Missing sequence number for receiving packets on port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        MissingNextAckSeq
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "Missing sequence number for ack packets on port {0} and channel {1}",
                    e.port_id, e.channel_id)
            },

        InvalidStringAsSequence
            { value: String }
            [ TraceError<core::num::ParseIntError> ]
            | e | {
                format_args!(
                    "String {0} cannot be converted to packet sequence",
                    e.value)
            },

        InvalidPacketSequence
            {
                given_sequence: Sequence,
                next_sequence: Sequence
            }
            | e | {
                format_args!(
                    "Invalid packet sequence {0} ≠ next sequence {1}",
                    e.given_sequence, e.next_sequence)
            },

        LowPacketHeight
            {
                chain_height: Height,
                timeout_height: Height
            }
            | e | {
                format_args!(
                    "Receiving chain block height {0} >= packet timeout height {1}",
                    e.chain_height, e.timeout_height)
            },

        LowPacketTimestamp
            | _ | { "Receiving chain block timestamp >= packet timeout timestamp" },

        TimeoutHeightAlreadyReached
            {
                timeout_height: Height,
                latest_height: Height,
            }
            | e | {
                format_args!(
                    "Packet timeout height {0} is already reached by the counterparty at height {1}",
                    e.timeout_height, e.latest_height)
            },

        TimeoutTimestampAlreadyReached
            {
                timeout_timestamp: Timestamp,
                latest_timestamp: Timestamp,
            }
            | e | {
                format_args!(
                    "Packet timeout timestamp {0} is already reached by the counterparty at {1}",
                    e.timeout_timestamp, e.latest_timestamp)
            },

        PacketTimeoutNotReached
            {
                timeout_height: String,
                chain_height: Height,
                timeout_timestamp: Timestamp,
                chain_timestamp: Timestamp,
            }
            | e | {
                format_args!(
                    "Packet timeout (height {0}, timestamp {2}) not reached by the counterparty at height {1} and timestamp {3}",
                     e.timeout_height, e.chain_height, e.timeout_timestamp, e.chain_timestamp)
            },

        PacketCommitmentNotFound
            { sequence: Sequence }
            | e | {
                format_args!(
                    "Commitment for the packet {0} not found",
                    e.sequence)
            },

        PacketReceiptNotFound
            { sequence: Sequence }
            | e | {
                format_args!(
                    "Receipt for the packet {0} not found",
                    e.sequence)
            },

        PacketAcknowledgementNotFound
            { sequence: Sequence }
            | e | {
                format_args!(
                    "Acknowledgement for the packet {0} not found",
                    e.sequence)
            },

        IncorrectPacketCommitment
            { sequence: Sequence }
            | e | {
                format_args!(
                    "The stored commitment of the packet {0} is incorrect",
                    e.sequence)
            },

        UpgradeNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "no upgrade is in progress for the channel end ({0}, {1})",
                    e.port_id, e.channel_id)
            },

        UpgradeErrorReceiptNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "no upgrade error receipt exists for the channel end ({0}, {1})",
                    e.port_id, e.channel_id)
            },

        UpgradeFieldsUnchanged
            | _ | { "the proposed upgrade fields are identical to the current channel fields" },

        UpgradeTimeoutNotSet
            | _ | { "an upgrade timeout height or timestamp must be set" },

        UpgradeTimeoutElapsed
            | _ | { "the upgrade timeout has already elapsed" },

        UpgradeTimeoutNotReached
            | _ | { "the upgrade timeout has not been reached by the counterparty" },

        InvalidUpgradeSequence
            { given_sequence: Sequence, expected_sequence: Sequence }
            | e | {
                format_args!(
                    "upgrade sequence {0} is invalid, expected at least {1}",
                    e.given_sequence, e.expected_sequence)
            },

        ConnectionHopsMismatch
            { expected: ConnectionId, actual: ConnectionId }
            | e | {
                format_args!(
                    "the proposed connection hop {1} does not match the counterparty's hop {0}",
                    e.expected, e.actual)
            },

        CounterpartyUpgradeCompleted
            | _ | { "the counterparty has already completed the upgrade" },

        IncompatibleUpgrade
            | _ | { "the counterparty proposed upgrade fields incompatible with the local proposal" },

        CounterpartyUpgradeNotFound
            { port_id: PortId, channel_id: ChannelId }
            | e | {
                format_args!(
                    "no counterparty upgrade is recorded for the channel end ({0}, {1})",
                    e.port_id, e.channel_id)
            },

        PacketsInFlight
            { channel_id: ChannelId }
            | e | {
                format_args!(
                    "channel {0} still has packets in flight and cannot change its ordering",
                    e.channel_id)
            },

        OrderingChangePending
            { channel_id: ChannelId }
            | e | {
                format_args!(
                    "packet flow on channel {0} is paused until its upgrade changes the ordering",
                    e.channel_id)
            },

        TimestampOverflow
            [ TimestampOverflowError ]
            | _ | { "timestamp overflowed while computing the upgrade timeout" },

        AppModule
            { description: String }
            | e | {
                format_args!(
                    "application module error: {0}",
                    e.description)
            },

        ImplementationSpecific
            | _ | { "implementation specific error" },
    }
}

/// Coarse classification of channel errors, telling a relayer whether to fetch a fresher
/// proof, wait for the chain to advance, or abandon the message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Some stored object (channel, connection, commitment, ...) is absent.
    NotFound,
    /// The message does not apply to the current handshake or upgrade phase.
    InvalidState,
    /// A proof failed to verify. A fresher proof may succeed.
    InvalidProof,
    /// The capability presented does not own the channel.
    Unauthorized,
    /// A timeout was submitted before the counterparty reached it.
    TimeoutNotReached,
    /// The channel was closed and can no longer carry packets.
    ChannelFault,
    /// The message itself is malformed or inconsistent.
    InvalidArgument,
    Other,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self.detail() {
            ErrorDetail::ChannelNotFound(_)
            | ErrorDetail::MissingNextSendSeq(_)
            | ErrorDetail::MissingNextRecvSeq(_)
            | ErrorDetail::MissingNextAckSeq(_)
            | ErrorDetail::PacketCommitmentNotFound(_)
            | ErrorDetail::PacketReceiptNotFound(_)
            | ErrorDetail::PacketAcknowledgementNotFound(_)
            | ErrorDetail::UpgradeNotFound(_)
            | ErrorDetail::UpgradeErrorReceiptNotFound(_)
            | ErrorDetail::CounterpartyUpgradeNotFound(_) => ErrorClass::NotFound,
            ErrorDetail::Ics03Connection(e) => match e.source {
                connection_error::ErrorDetail::ConnectionNotFound(_) => ErrorClass::NotFound,
                _ => ErrorClass::InvalidState,
            },
            ErrorDetail::Ics02Client(e) => match e.source {
                client_error::ErrorDetail::ClientNotFound(_)
                | client_error::ErrorDetail::ConsensusStateNotFound(_) => ErrorClass::NotFound,
                _ => ErrorClass::Other,
            },
            ErrorDetail::InvalidChannelState(_)
            | ErrorDetail::ConnectionNotOpen(_)
            | ErrorDetail::FrozenClient(_)
            | ErrorDetail::InvalidPacketSequence(_)
            | ErrorDetail::AcknowledgementExists(_)
            | ErrorDetail::LowPacketHeight(_)
            | ErrorDetail::LowPacketTimestamp(_)
            | ErrorDetail::TimeoutHeightAlreadyReached(_)
            | ErrorDetail::TimeoutTimestampAlreadyReached(_)
            | ErrorDetail::UpgradeTimeoutElapsed(_)
            | ErrorDetail::InvalidUpgradeSequence(_)
            | ErrorDetail::CounterpartyUpgradeCompleted(_)
            | ErrorDetail::IncompatibleUpgrade(_)
            | ErrorDetail::PacketsInFlight(_)
            | ErrorDetail::OrderingChangePending(_)
            | ErrorDetail::MissingCounterpartyChannelId(_) => ErrorClass::InvalidState,
            ErrorDetail::InvalidProof(_)
            | ErrorDetail::VerifyChannelFailed(_)
            | ErrorDetail::PacketVerificationFailed(_)
            | ErrorDetail::UpgradeVerificationFailed(_)
            | ErrorDetail::ErrorReceiptVerificationFailed(_) => ErrorClass::InvalidProof,
            ErrorDetail::InvalidChannelCapability(_) | ErrorDetail::Ics05Port(_) => {
                ErrorClass::Unauthorized
            }
            ErrorDetail::PacketTimeoutNotReached(_) | ErrorDetail::UpgradeTimeoutNotReached(_) => {
                ErrorClass::TimeoutNotReached
            }
            ErrorDetail::ChannelClosed(_) => ErrorClass::ChannelFault,
            ErrorDetail::Identifier(_)
            | ErrorDetail::UnknownOrderType(_)
            | ErrorDetail::InvalidConnectionHopsLength(_)
            | ErrorDetail::InvalidPacketCounterparty(_)
            | ErrorDetail::ZeroPacketSequence(_)
            | ErrorDetail::ZeroPacketData(_)
            | ErrorDetail::MissingTimeout(_)
            | ErrorDetail::ChannelFeatureNotSupportedByConnection(_)
            | ErrorDetail::InvalidAcknowledgement(_)
            | ErrorDetail::InvalidStringAsSequence(_)
            | ErrorDetail::IncorrectPacketCommitment(_)
            | ErrorDetail::UpgradeFieldsUnchanged(_)
            | ErrorDetail::UpgradeTimeoutNotSet(_)
            | ErrorDetail::ConnectionHopsMismatch(_) => ErrorClass::InvalidArgument,
            ErrorDetail::Encode(_)
            | ErrorDetail::TimestampOverflow(_)
            | ErrorDetail::AppModule(_)
            | ErrorDetail::ImplementationSpecific(_) => ErrorClass::Other,
        }
    }
}
