use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::{Packet, Sequence};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgTimeout";

///
/// Message definition for packet timeout domain type.
///
/// On an unordered channel the proof is of the absence of a receipt for the packet. On an
/// ordered channel it proves `next_sequence_recv` on the destination.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgTimeout {
    pub packet: Packet,
    pub next_sequence_recv: Sequence,
    pub proofs: Proofs,
}

impl MsgTimeout {
    pub fn new(packet: Packet, next_sequence_recv: Sequence, proofs: Proofs) -> MsgTimeout {
        Self {
            packet,
            next_sequence_recv,
            proofs,
        }
    }
}

impl Msg for MsgTimeout {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.packet.validate_basic()
    }
}
