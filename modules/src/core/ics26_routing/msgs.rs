use crate::prelude::*;

use crate::core::ics04_channel::msgs::{ChannelMsg, PacketMsg, UpgradeMsg};

/// Enumeration of all relayed messages that the local ICS26 module is capable of routing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ics26Envelope {
    Ics4ChannelMsg(ChannelMsg),
    Ics4UpgradeMsg(UpgradeMsg),
    Ics4PacketMsg(PacketMsg),
}

impl Ics26Envelope {
    pub fn type_url(&self) -> String {
        use crate::core::ics04_channel::msgs::*;

        let url = match self {
            Ics26Envelope::Ics4ChannelMsg(msg) => match msg {
                ChannelMsg::ChannelOpenInit(_) => chan_open_init::TYPE_URL,
                ChannelMsg::ChannelOpenTry(_) => chan_open_try::TYPE_URL,
                ChannelMsg::ChannelOpenAck(_) => chan_open_ack::TYPE_URL,
                ChannelMsg::ChannelOpenConfirm(_) => chan_open_confirm::TYPE_URL,
            },
            Ics26Envelope::Ics4UpgradeMsg(msg) => match msg {
                UpgradeMsg::ChannelUpgradeTry(_) => chan_upgrade_try::TYPE_URL,
                UpgradeMsg::ChannelUpgradeAck(_) => chan_upgrade_ack::TYPE_URL,
                UpgradeMsg::ChannelUpgradeConfirm(_) => chan_upgrade_confirm::TYPE_URL,
                UpgradeMsg::ChannelUpgradeOpen(_) => chan_upgrade_open::TYPE_URL,
                UpgradeMsg::ChannelUpgradeCancel(_) => chan_upgrade_cancel::TYPE_URL,
                UpgradeMsg::ChannelUpgradeTimeout(_) => chan_upgrade_timeout::TYPE_URL,
            },
            Ics26Envelope::Ics4PacketMsg(msg) => match msg {
                PacketMsg::RecvPacket(_) => recv_packet::TYPE_URL,
                PacketMsg::AckPacket(_) => acknowledgement::TYPE_URL,
                PacketMsg::TimeoutPacket(_) => timeout::TYPE_URL,
            },
        };
        url.to_string()
    }
}

impl From<ChannelMsg> for Ics26Envelope {
    fn from(msg: ChannelMsg) -> Self {
        Ics26Envelope::Ics4ChannelMsg(msg)
    }
}

impl From<UpgradeMsg> for Ics26Envelope {
    fn from(msg: UpgradeMsg) -> Self {
        Ics26Envelope::Ics4UpgradeMsg(msg)
    }
}

impl From<PacketMsg> for Ics26Envelope {
    fn from(msg: PacketMsg) -> Self {
        Ics26Envelope::Ics4PacketMsg(msg)
    }
}
