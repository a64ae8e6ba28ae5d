//! Events emitted by the handlers, and their flattening into key/value attributes for
//! hosts that index events.

use crate::prelude::*;

use core::fmt;

use serde_derive::Serialize;

use crate::core::ics04_channel::events as ChannelEvents;
use crate::core::ics04_channel::packet::Packet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IbcEventType {
    OpenInitChannel,
    OpenTryChannel,
    OpenAckChannel,
    OpenConfirmChannel,
    CloseInitChannel,
    ChannelClosed,
    UpgradeInitChannel,
    UpgradeTryChannel,
    UpgradeAckChannel,
    UpgradeConfirmChannel,
    UpgradeOpenChannel,
    UpgradeCancelChannel,
    UpgradeTimeoutChannel,
    UpgradeErrorChannel,
    SendPacket,
    ReceivePacket,
    WriteAcknowledgement,
    AcknowledgePacket,
    TimeoutPacket,
}

impl IbcEventType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            IbcEventType::OpenInitChannel => "channel_open_init",
            IbcEventType::OpenTryChannel => "channel_open_try",
            IbcEventType::OpenAckChannel => "channel_open_ack",
            IbcEventType::OpenConfirmChannel => "channel_open_confirm",
            IbcEventType::CloseInitChannel => "channel_close_init",
            IbcEventType::ChannelClosed => "channel_closed",
            IbcEventType::UpgradeInitChannel => "channel_upgrade_init",
            IbcEventType::UpgradeTryChannel => "channel_upgrade_try",
            IbcEventType::UpgradeAckChannel => "channel_upgrade_ack",
            IbcEventType::UpgradeConfirmChannel => "channel_upgrade_confirm",
            IbcEventType::UpgradeOpenChannel => "channel_upgrade_open",
            IbcEventType::UpgradeCancelChannel => "channel_upgrade_cancelled",
            IbcEventType::UpgradeTimeoutChannel => "channel_upgrade_timeout",
            IbcEventType::UpgradeErrorChannel => "channel_upgrade_error",
            IbcEventType::SendPacket => "send_packet",
            IbcEventType::ReceivePacket => "recv_packet",
            IbcEventType::WriteAcknowledgement => "write_acknowledgement",
            IbcEventType::AcknowledgePacket => "acknowledge_packet",
            IbcEventType::TimeoutPacket => "timeout_packet",
        }
    }
}

impl fmt::Display for IbcEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events emitted by the channel handlers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum IbcEvent {
    OpenInitChannel(ChannelEvents::OpenInit),
    OpenTryChannel(ChannelEvents::OpenTry),
    OpenAckChannel(ChannelEvents::OpenAck),
    OpenConfirmChannel(ChannelEvents::OpenConfirm),
    CloseInitChannel(ChannelEvents::CloseInit),
    ChannelClosed(ChannelEvents::ChannelClosed),

    UpgradeInitChannel(ChannelEvents::UpgradeInit),
    UpgradeTryChannel(ChannelEvents::UpgradeTry),
    UpgradeAckChannel(ChannelEvents::UpgradeAck),
    UpgradeConfirmChannel(ChannelEvents::UpgradeConfirm),
    UpgradeOpenChannel(ChannelEvents::UpgradeOpen),
    UpgradeCancelChannel(ChannelEvents::UpgradeCancel),
    UpgradeTimeoutChannel(ChannelEvents::UpgradeTimeout),
    UpgradeErrorChannel(ChannelEvents::UpgradeError),

    SendPacket(ChannelEvents::SendPacket),
    ReceivePacket(ChannelEvents::ReceivePacket),
    WriteAcknowledgement(ChannelEvents::WriteAcknowledgement),
    AcknowledgePacket(ChannelEvents::AcknowledgePacket),
    TimeoutPacket(ChannelEvents::TimeoutPacket),
}

impl IbcEvent {
    pub fn event_type(&self) -> IbcEventType {
        match self {
            IbcEvent::OpenInitChannel(_) => IbcEventType::OpenInitChannel,
            IbcEvent::OpenTryChannel(_) => IbcEventType::OpenTryChannel,
            IbcEvent::OpenAckChannel(_) => IbcEventType::OpenAckChannel,
            IbcEvent::OpenConfirmChannel(_) => IbcEventType::OpenConfirmChannel,
            IbcEvent::CloseInitChannel(_) => IbcEventType::CloseInitChannel,
            IbcEvent::ChannelClosed(_) => IbcEventType::ChannelClosed,
            IbcEvent::UpgradeInitChannel(_) => IbcEventType::UpgradeInitChannel,
            IbcEvent::UpgradeTryChannel(_) => IbcEventType::UpgradeTryChannel,
            IbcEvent::UpgradeAckChannel(_) => IbcEventType::UpgradeAckChannel,
            IbcEvent::UpgradeConfirmChannel(_) => IbcEventType::UpgradeConfirmChannel,
            IbcEvent::UpgradeOpenChannel(_) => IbcEventType::UpgradeOpenChannel,
            IbcEvent::UpgradeCancelChannel(_) => IbcEventType::UpgradeCancelChannel,
            IbcEvent::UpgradeTimeoutChannel(_) => IbcEventType::UpgradeTimeoutChannel,
            IbcEvent::UpgradeErrorChannel(_) => IbcEventType::UpgradeErrorChannel,
            IbcEvent::SendPacket(_) => IbcEventType::SendPacket,
            IbcEvent::ReceivePacket(_) => IbcEventType::ReceivePacket,
            IbcEvent::WriteAcknowledgement(_) => IbcEventType::WriteAcknowledgement,
            IbcEvent::AcknowledgePacket(_) => IbcEventType::AcknowledgePacket,
            IbcEvent::TimeoutPacket(_) => IbcEventType::TimeoutPacket,
        }
    }

    pub fn packet(&self) -> Option<&Packet> {
        match self {
            IbcEvent::SendPacket(ev) => Some(&ev.packet),
            IbcEvent::ReceivePacket(ev) => Some(&ev.packet),
            IbcEvent::WriteAcknowledgement(ev) => Some(&ev.packet),
            IbcEvent::AcknowledgePacket(ev) => Some(&ev.packet),
            IbcEvent::TimeoutPacket(ev) => Some(&ev.packet),
            _ => None,
        }
    }
}

impl fmt::Display for IbcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.packet() {
            Some(packet) => write!(f, "{}({})", self.event_type(), packet),
            None => write!(f, "{}", self.event_type()),
        }
    }
}

/// A flattened event, as indexed by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: IbcEventType, attributes: Vec<(String, String)>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            attributes,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl From<IbcEvent> for Event {
    fn from(event: IbcEvent) -> Self {
        match event {
            IbcEvent::OpenInitChannel(ev) => ev.into(),
            IbcEvent::OpenTryChannel(ev) => ev.into(),
            IbcEvent::OpenAckChannel(ev) => ev.into(),
            IbcEvent::OpenConfirmChannel(ev) => ev.into(),
            IbcEvent::CloseInitChannel(ev) => ev.into(),
            IbcEvent::ChannelClosed(ev) => ev.into(),
            IbcEvent::UpgradeInitChannel(ev) => ev.into(),
            IbcEvent::UpgradeTryChannel(ev) => ev.into(),
            IbcEvent::UpgradeAckChannel(ev) => ev.into(),
            IbcEvent::UpgradeConfirmChannel(ev) => ev.into(),
            IbcEvent::UpgradeOpenChannel(ev) => ev.into(),
            IbcEvent::UpgradeCancelChannel(ev) => ev.into(),
            IbcEvent::UpgradeTimeoutChannel(ev) => ev.into(),
            IbcEvent::UpgradeErrorChannel(ev) => ev.into(),
            IbcEvent::SendPacket(ev) => ev.into(),
            IbcEvent::ReceivePacket(ev) => ev.into(),
            IbcEvent::WriteAcknowledgement(ev) => ev.into(),
            IbcEvent::AcknowledgePacket(ev) => ev.into(),
            IbcEvent::TimeoutPacket(ev) => ev.into(),
        }
    }
}
