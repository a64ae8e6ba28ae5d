use crate::prelude::*;

use core::str::FromStr;

use derive_more::{Display, From, Into};
use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::timeout::{timeout_timestamp_reached, TimeoutHeight};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::timestamp::Timestamp;
use crate::Height;

use super::handler::{
    acknowledgement::AckPacketResult, recv_packet::RecvPacketResult,
    send_packet::SendPacketResult, timeout::TimeoutPacketResult,
    write_acknowledgement::WriteAckPacketResult,
};

/// Outcome of a packet handler, as handed to
/// [`ChannelKeeper::store_packet_result`](crate::core::ics04_channel::context::ChannelKeeper::store_packet_result).
#[derive(Clone, Debug)]
pub enum PacketResult {
    Send(SendPacketResult),
    Recv(RecvPacketResult),
    WriteAck(WriteAckPacketResult),
    Ack(AckPacketResult),
    Timeout(TimeoutPacketResult),
    /// The message was already processed by this chain. Nothing is written and no
    /// event is emitted.
    NoOp(NoOpReason),
}

impl PacketResult {
    pub fn is_no_op(&self) -> bool {
        matches!(self, PacketResult::NoOp(_))
    }
}

/// Why a relayed packet message did not change any state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoOpReason {
    /// A receipt for this sequence already exists on an unordered channel.
    PacketAlreadyReceived(Sequence),
    /// An acknowledgement for this sequence was already written.
    AcknowledgementAlreadyWritten(Sequence),
    /// The packet commitment was already deleted by an earlier ack or timeout.
    PacketCommitmentAbsent(Sequence),
}

impl core::fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NoOpReason::PacketAlreadyReceived(seq) => {
                write!(f, "packet {} was already received", seq)
            }
            NoOpReason::AcknowledgementAlreadyWritten(seq) => {
                write!(f, "acknowledgement for packet {} was already written", seq)
            }
            NoOpReason::PacketCommitmentAbsent(seq) => {
                write!(f, "commitment for packet {} is absent", seq)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Receipt {
    Ok,
}

/// The sequence number of a packet enforces ordering among packets from the same source.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Display,
    From,
    Into,
)]
pub struct Sequence(u64);

impl FromStr for Sequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.parse::<u64>().map_err(|e| {
            Error::invalid_string_as_sequence(s.to_string(), e)
        })?))
    }
}

impl Sequence {
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn increment(&self) -> Sequence {
        Sequence(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Big-endian encoding, as stored under the `nextSequence*` paths.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

#[derive(Clone, Default, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct Packet {
    pub sequence: Sequence,
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub destination_port: PortId,
    pub destination_channel: ChannelId,
    #[serde(
        serialize_with = "crate::serializers::ser_hex_upper",
        deserialize_with = "crate::serializers::deser_hex_upper"
    )]
    pub data: Vec<u8>,
    pub timeout_height: TimeoutHeight,
    pub timeout_timestamp: Timestamp,
}

struct PacketData<'a>(&'a [u8]);

impl<'a> core::fmt::Debug for PacketData<'a> {
    fn fmt(&self, formatter: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(formatter, "{:?}", self.0)
    }
}

impl core::fmt::Debug for Packet {
    fn fmt(&self, formatter: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        let data_wrapper = PacketData(&self.data);

        formatter
            .debug_struct("Packet")
            .field("sequence", &self.sequence)
            .field("source_port", &self.source_port)
            .field("source_channel", &self.source_channel)
            .field("destination_port", &self.destination_port)
            .field("destination_channel", &self.destination_channel)
            .field("data", &data_wrapper)
            .field("timeout_height", &self.timeout_height)
            .field("timeout_timestamp", &self.timeout_timestamp)
            .finish()
    }
}

impl Packet {
    /// Checks whether the packet is timed-out relative to the state of the destination
    /// chain at `dst_chain_height` and `dst_chain_ts`.
    ///
    /// A timed-out packet can no longer be received, and its commitment may be removed
    /// on the source chain with a `MsgTimeout`.
    pub fn timed_out(&self, dst_chain_ts: &Timestamp, dst_chain_height: Height) -> bool {
        self.timeout_height.is_reached(dst_chain_height)
            || timeout_timestamp_reached(&self.timeout_timestamp, dst_chain_ts)
    }

    /// Stateless checks a relayed packet must pass before any store is touched.
    pub fn validate_basic(&self) -> Result<(), Error> {
        if self.sequence.is_zero() {
            return Err(Error::zero_packet_sequence());
        }
        if !self.timeout_height.is_set() && !self.timeout_timestamp.is_set() {
            return Err(Error::missing_timeout());
        }
        if self.data.is_empty() {
            return Err(Error::zero_packet_data());
        }
        Ok(())
    }
}

impl core::fmt::Display for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(
            f,
            "seq:{}, path:{}/{}->{}/{}, toh:{}, tos:{})",
            self.sequence,
            self.source_channel,
            self.source_port,
            self.destination_channel,
            self.destination_port,
            self.timeout_height,
            self.timeout_timestamp
        )
    }
}

/// A packet as submitted by the sending application. The sequence and destination are
/// filled in from the channel end when the packet is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingPacket {
    pub source_port: PortId,
    pub source_channel: ChannelId,
    pub data: Vec<u8>,
    pub timeout_height: TimeoutHeight,
    pub timeout_timestamp: Timestamp,
}

impl OutgoingPacket {
    pub fn new(
        source_port: PortId,
        source_channel: ChannelId,
        data: Vec<u8>,
        timeout_height: TimeoutHeight,
        timeout_timestamp: Timestamp,
    ) -> Self {
        Self {
            source_port,
            source_channel,
            data,
            timeout_height,
            timeout_timestamp,
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use crate::prelude::*;

    use crate::core::ics04_channel::packet::{Packet, Sequence};
    use crate::core::ics04_channel::timeout::TimeoutHeight;
    use crate::core::ics24_host::identifier::{ChannelId, PortId};
    use crate::timestamp::Timestamp;
    use crate::Height;

    /// Returns a dummy `Packet` with sequence 1 travelling from `channel-0` to
    /// `channel-0` on the default port, for testing only!
    pub fn get_dummy_packet(timeout_height: u64, timeout_timestamp: u64) -> Packet {
        let timeout_height = match timeout_height {
            0 => TimeoutHeight::Never,
            h => TimeoutHeight::At(Height::new(0, h).unwrap()),
        };
        Packet {
            sequence: Sequence::from(1),
            source_port: PortId::default(),
            source_channel: ChannelId::default(),
            destination_port: PortId::default(),
            destination_channel: ChannelId::default(),
            data: vec![0],
            timeout_height,
            timeout_timestamp: Timestamp::from_nanoseconds(timeout_timestamp).unwrap(),
        }
    }
}
