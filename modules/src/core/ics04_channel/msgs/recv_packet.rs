use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::Packet;
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";

///
/// Message definition for the "packet receiving" datagram.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRecvPacket {
    pub packet: Packet,
    pub proofs: Proofs,
}

impl MsgRecvPacket {
    pub fn new(packet: Packet, proofs: Proofs) -> MsgRecvPacket {
        Self { packet, proofs }
    }
}

impl Msg for MsgRecvPacket {
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


#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use super::test_util::get_dummy_msg_recv_packet;
    use crate::core::ics04_channel::packet::Sequence;
    use crate::core::ics04_channel::timeout::TimeoutHeight;
    use crate::tx_msg::Msg;

    #[test]
    fn msg_recv_packet_validation() {
        let msg = get_dummy_msg_recv_packet(10);
        assert!(msg.validate_basic().is_ok());

        let mut zero_sequence = msg.clone();
        zero_sequence.packet.sequence = Sequence::from(0);
        assert!(zero_sequence.validate_basic().is_err());

        let mut no_timeout = msg.clone();
        no_timeout.packet.timeout_height = TimeoutHeight::Never;
        assert!(no_timeout.validate_basic().is_err());

        let mut no_data = msg;
        no_data.packet.data.clear();
        assert!(no_data.validate_basic().is_err());
    }
}
