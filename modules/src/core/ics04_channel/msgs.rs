//! Message definitions for all ICS4 domain types: channel open & close handshake datagrams,
//! channel upgrade datagrams, as well as packets.

use crate::prelude::*;

use crate::core::ics04_channel::msgs::acknowledgement::MsgAcknowledgement;
use crate::core::ics04_channel::msgs::chan_open_ack::MsgChannelOpenAck;
use crate::core::ics04_channel::msgs::chan_open_confirm::MsgChannelOpenConfirm;
use crate::core::ics04_channel::msgs::chan_open_init::MsgChannelOpenInit;
use crate::core::ics04_channel::msgs::chan_open_try::MsgChannelOpenTry;
use crate::core::ics04_channel::msgs::chan_upgrade_ack::MsgChannelUpgradeAck;
use crate::core::ics04_channel::msgs::chan_upgrade_cancel::MsgChannelUpgradeCancel;
use crate::core::ics04_channel::msgs::chan_upgrade_confirm::MsgChannelUpgradeConfirm;
use crate::core::ics04_channel::msgs::chan_upgrade_open::MsgChannelUpgradeOpen;
use crate::core::ics04_channel::msgs::chan_upgrade_timeout::MsgChannelUpgradeTimeout;
use crate::core::ics04_channel::msgs::chan_upgrade_try::MsgChannelUpgradeTry;
use crate::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
use crate::core::ics04_channel::msgs::timeout::MsgTimeout;

// Opening handshake messages.
pub mod chan_open_ack;
pub mod chan_open_confirm;
pub mod chan_open_init;
pub mod chan_open_try;

// Closing handshake messages.
pub mod chan_close_init;

// Upgrade handshake messages.
pub mod chan_upgrade_ack;
pub mod chan_upgrade_cancel;
pub mod chan_upgrade_confirm;
pub mod chan_upgrade_init;
pub mod chan_upgrade_open;
pub mod chan_upgrade_timeout;
pub mod chan_upgrade_try;

// Packet specific messages.
pub mod acknowledgement;
pub mod recv_packet;
pub mod timeout;

/// Enumeration of the relayed channel handshake messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelMsg {
    ChannelOpenInit(MsgChannelOpenInit),
    ChannelOpenTry(Box<MsgChannelOpenTry>),
    ChannelOpenAck(MsgChannelOpenAck),
    ChannelOpenConfirm(MsgChannelOpenConfirm),
}

impl ChannelMsg {
    pub fn port_id(&self) -> &crate::core::ics24_host::identifier::PortId {
        match self {
            ChannelMsg::ChannelOpenInit(msg) => &msg.port_id,
            ChannelMsg::ChannelOpenTry(msg) => &msg.port_id,
            ChannelMsg::ChannelOpenAck(msg) => &msg.port_id,
            ChannelMsg::ChannelOpenConfirm(msg) => &msg.port_id,
        }
    }
}

/// Enumeration of the relayed channel upgrade messages. The first step of the handshake
/// is taken by the application and is not relayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpgradeMsg {
    ChannelUpgradeTry(Box<MsgChannelUpgradeTry>),
    ChannelUpgradeAck(Box<MsgChannelUpgradeAck>),
    ChannelUpgradeConfirm(MsgChannelUpgradeConfirm),
    ChannelUpgradeOpen(MsgChannelUpgradeOpen),
    ChannelUpgradeCancel(MsgChannelUpgradeCancel),
    ChannelUpgradeTimeout(MsgChannelUpgradeTimeout),
}

impl UpgradeMsg {
    pub fn port_id(&self) -> &crate::core::ics24_host::identifier::PortId {
        match self {
            UpgradeMsg::ChannelUpgradeTry(msg) => &msg.port_id,
            UpgradeMsg::ChannelUpgradeAck(msg) => &msg.port_id,
            UpgradeMsg::ChannelUpgradeConfirm(msg) => &msg.port_id,
            UpgradeMsg::ChannelUpgradeOpen(msg) => &msg.port_id,
            UpgradeMsg::ChannelUpgradeCancel(msg) => &msg.port_id,
            UpgradeMsg::ChannelUpgradeTimeout(msg) => &msg.port_id,
        }
    }

    pub fn channel_id(&self) -> &crate::core::ics24_host::identifier::ChannelId {
        match self {
            UpgradeMsg::ChannelUpgradeTry(msg) => &msg.channel_id,
            UpgradeMsg::ChannelUpgradeAck(msg) => &msg.channel_id,
            UpgradeMsg::ChannelUpgradeConfirm(msg) => &msg.channel_id,
            UpgradeMsg::ChannelUpgradeOpen(msg) => &msg.channel_id,
            UpgradeMsg::ChannelUpgradeCancel(msg) => &msg.channel_id,
            UpgradeMsg::ChannelUpgradeTimeout(msg) => &msg.channel_id,
        }
    }
}

/// Enumeration of the relayed packet messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PacketMsg {
    RecvPacket(MsgRecvPacket),
    AckPacket(MsgAcknowledgement),
    TimeoutPacket(MsgTimeout),
}
