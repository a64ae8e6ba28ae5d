//! ICS4 (channel) context. The two traits `ChannelReader ` and `ChannelKeeper` define
//! the interface that any host chain must implement to be able to process any `ChannelMsg`,
//! `UpgradeMsg` or `PacketMsg`.
//!
use tracing::warn;

use crate::config::Params;
use crate::core::ics02_client::context::ClientReader;
use crate::core::ics03_connection::context::ConnectionReader;
use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::commitment::{AcknowledgementCommitment, PacketCommitment};
use crate::core::ics04_channel::handler::recv_packet::RecvPacketResult;
use crate::core::ics04_channel::handler::{
    ChannelIdState, ChannelResult, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::upgrade::{ErrorReceipt, Upgrade};
use crate::core::ics04_channel::{error::Error, packet::Receipt};
use crate::core::ics05_port::capabilities::{CapabilityName, ChannelCapability};
use crate::core::ics05_port::context::{CapabilityKeeper, CapabilityReader};
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::prelude::*;
use crate::timestamp::Timestamp;
use crate::Height;

use super::packet::{PacketResult, Sequence};

/// A context supplying all the necessary read-only dependencies for processing any `ChannelMsg`.
pub trait ChannelReader: ClientReader + ConnectionReader + CapabilityReader {
    /// Returns the ChannelEnd for the given `port_id` and `channel_id`.
    fn channel_end(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<ChannelEnd, Error>;

    /// Returns the channels layered over the connection `conn_id`.
    fn connection_channels(&self, conn_id: &ConnectionId)
        -> Result<Vec<(PortId, ChannelId)>, Error>;

    fn get_next_sequence_send(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Error>;

    fn get_next_sequence_recv(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Error>;

    fn get_next_sequence_ack(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Error>;

    /// Fails with `PacketCommitmentNotFound` when no commitment is stored.
    fn get_packet_commitment(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<PacketCommitment, Error>;

    /// Fails with `PacketReceiptNotFound` when no receipt is stored.
    fn get_packet_receipt(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<Receipt, Error>;

    fn has_packet_receipt(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> bool {
        self.get_packet_receipt(port_id, channel_id, sequence)
            .is_ok()
    }

    /// Fails with `PacketAcknowledgementNotFound` when no acknowledgement is stored.
    fn get_packet_acknowledgement(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<AcknowledgementCommitment, Error>;

    /// Returns the upgrade in progress for the channel end, or `UpgradeNotFound`.
    fn get_upgrade(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<Upgrade, Error>;

    /// Returns the counterparty upgrade recorded by Try or Ack, or
    /// `CounterpartyUpgradeNotFound`.
    fn get_counterparty_upgrade(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Upgrade, Error>;

    /// Whether a packet sent on the channel end still waits for its acknowledgement or
    /// timeout. Hosts with prefix iteration should override the scan.
    fn has_packets_in_flight(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<bool, Error> {
        let next_seq_send = self.get_next_sequence_send(port_id, channel_id)?;
        Ok((1..next_seq_send.value()).any(|seq| {
            self.get_packet_commitment(port_id, channel_id, Sequence::from(seq))
                .is_ok()
        }))
    }

    /// Returns the last upgrade error receipt written for the channel end, or
    /// `UpgradeErrorReceiptNotFound`.
    fn get_upgrade_error_receipt(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ErrorReceipt, Error>;

    /// Returns the current height of the local chain.
    fn host_height(&self) -> Height;

    /// Returns the current timestamp of the local chain.
    fn host_timestamp(&self) -> Timestamp;

    /// Returns a counter on the number of channel ids have been created thus far.
    /// The value of this counter should increase only via method
    /// `ChannelKeeper::increase_channel_counter`.
    fn channel_counter(&self) -> Result<u64, Error>;

    /// Host parameters of the channel layer.
    fn params(&self) -> Params {
        Params::default()
    }

    /// Succeeds iff `capability` owns the channel end `(port_id, channel_id)`.
    fn authenticate_channel_capability(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        capability: &ChannelCapability,
    ) -> Result<(), Error> {
        self.authenticate_capability(
            &CapabilityName::channel(port_id, channel_id),
            capability.as_ref(),
        )
        .map_err(|e| {
            warn!(
                port_id = %port_id,
                channel_id = %channel_id,
                "channel capability authentication failed: {}",
                e
            );
            Error::invalid_channel_capability(port_id.clone(), channel_id.clone(), e)
        })
    }
}

/// A context supplying all the necessary write-only dependencies (i.e., storage writing facility)
/// for processing any `ChannelMsg`.
pub trait ChannelKeeper: CapabilityKeeper {
    /// Persists the result of a handshake handler. Returns the capability of a newly
    /// created channel end.
    fn store_channel_result(
        &mut self,
        result: ChannelResult,
    ) -> Result<Option<ChannelCapability>, Error> {
        let connection_id = result.channel_end.connection_hop()?.clone();

        // The handler processed this channel & some modifications occurred, store the new end.
        self.store_channel(&result.port_id, &result.channel_id, &result.channel_end)?;

        // The channel identifier was freshly brewed.
        // Increase counter, initialize seq. nrs. and hand out the capability.
        if matches!(result.channel_id_state, ChannelIdState::Generated) {
            self.increase_channel_counter();

            // Associate also the channel end to its connection.
            self.store_connection_channels(connection_id, &result.port_id, &result.channel_id)?;

            // Initialize send, recv, and ack sequence numbers.
            self.store_next_sequence_send(&result.port_id, &result.channel_id, 1.into())?;
            self.store_next_sequence_recv(&result.port_id, &result.channel_id, 1.into())?;
            self.store_next_sequence_ack(&result.port_id, &result.channel_id, 1.into())?;

            let capability = self
                .new_capability(CapabilityName::channel(&result.port_id, &result.channel_id))
                .map_err(Error::ics05_port)?;
            return Ok(Some(capability.into()));
        }

        Ok(None)
    }

    /// Persists the result of an upgrade handler.
    fn store_upgrade_result(&mut self, result: UpgradeResult) -> Result<(), Error> {
        self.store_channel(&result.port_id, &result.channel_id, &result.channel_end)?;

        let (port_id, channel_id) = (&result.port_id, &result.channel_id);
        match result.step {
            UpgradeStep::Proposed(upgrade) => self.store_upgrade(port_id, channel_id, upgrade),
            UpgradeStep::Answered {
                upgrade,
                counterparty,
            } => {
                self.store_upgrade(port_id, channel_id, upgrade)?;
                self.store_counterparty_upgrade(port_id, channel_id, counterparty)
            }
            UpgradeStep::Acknowledged(counterparty) => {
                self.store_counterparty_upgrade(port_id, channel_id, counterparty)
            }
            UpgradeStep::Completed(reset) => {
                if let Some(reset) = reset {
                    self.store_next_sequence_recv(port_id, channel_id, reset.next_seq_recv)?;
                    self.store_next_sequence_ack(port_id, channel_id, reset.next_seq_ack)?;
                }
                self.delete_upgrade(port_id, channel_id)?;
                self.delete_counterparty_upgrade(port_id, channel_id)
            }
            UpgradeStep::Cancelled => {
                self.delete_upgrade(port_id, channel_id)?;
                self.delete_counterparty_upgrade(port_id, channel_id)
            }
            UpgradeStep::Aborted(receipt) | UpgradeStep::TimedOut(receipt) => {
                self.delete_upgrade(port_id, channel_id)?;
                self.delete_counterparty_upgrade(port_id, channel_id)?;
                self.store_upgrade_error_receipt(port_id, channel_id, receipt)
            }
        }
    }

    fn store_packet_result(&mut self, general_result: PacketResult) -> Result<(), Error> {
        match general_result {
            PacketResult::Send(res) => {
                self.store_next_sequence_send(&res.port_id, &res.channel_id, res.seq_number)?;

                self.store_packet_commitment(
                    &res.port_id,
                    &res.channel_id,
                    res.seq,
                    res.commitment,
                )?;
            }
            PacketResult::Recv(res) => match res {
                RecvPacketResult::Ordered {
                    port_id,
                    channel_id,
                    next_seq_recv,
                } => self.store_next_sequence_recv(&port_id, &channel_id, next_seq_recv)?,
                RecvPacketResult::Unordered {
                    port_id,
                    channel_id,
                    sequence,
                    receipt,
                } => self.store_packet_receipt(&port_id, &channel_id, sequence, receipt)?,
            },
            PacketResult::WriteAck(res) => {
                self.store_packet_acknowledgement(
                    &res.port_id,
                    &res.channel_id,
                    res.seq,
                    res.ack_commitment,
                )?;
            }
            PacketResult::Ack(res) => {
                if let Some(s) = res.seq_number {
                    // Ordered channel
                    self.store_next_sequence_ack(&res.port_id, &res.channel_id, s)?;
                }
                self.delete_packet_commitment(&res.port_id, &res.channel_id, res.seq)?;
            }
            PacketResult::Timeout(res) => {
                if let Some(c) = res.channel {
                    // Ordered channel
                    self.store_channel(&res.port_id, &res.channel_id, &c)?;
                }
                self.delete_packet_commitment(&res.port_id, &res.channel_id, res.seq)?;
            }
            PacketResult::NoOp(_) => {}
        }
        Ok(())
    }

    fn store_packet_commitment(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        commitment: PacketCommitment,
    ) -> Result<(), Error>;

    fn delete_packet_commitment(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<(), Error>;

    fn store_packet_receipt(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        receipt: Receipt,
    ) -> Result<(), Error>;

    fn store_packet_acknowledgement(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        ack_commitment: AcknowledgementCommitment,
    ) -> Result<(), Error>;

    fn store_connection_channels(
        &mut self,
        conn_id: ConnectionId,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error>;

    /// Stores the given channel_end at a path associated with the port_id and channel_id.
    fn store_channel(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        channel_end: &ChannelEnd,
    ) -> Result<(), Error>;

    fn store_next_sequence_send(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Error>;

    fn store_next_sequence_recv(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Error>;

    fn store_next_sequence_ack(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Error>;

    fn store_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        upgrade: Upgrade,
    ) -> Result<(), Error>;

    /// Removing an absent upgrade is not an error.
    fn delete_upgrade(&mut self, port_id: &PortId, channel_id: &ChannelId) -> Result<(), Error>;

    fn store_counterparty_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        upgrade: Upgrade,
    ) -> Result<(), Error>;

    /// Removing an absent record is not an error.
    fn delete_counterparty_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error>;

    fn store_upgrade_error_receipt(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        receipt: ErrorReceipt,
    ) -> Result<(), Error>;

    /// Called upon channel identifier creation (Init or Try message processing).
    /// Increases the counter which keeps track of how many channels have been created.
    /// Should never fail.
    fn increase_channel_counter(&mut self);
}
