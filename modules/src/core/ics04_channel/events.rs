//! Types for the IBC events emitted by the channel handlers.

use crate::prelude::*;

use serde_derive::Serialize;
use sha2::{Digest, Sha256};
use subtle_encoding::{Encoding, Hex};

use crate::core::ics04_channel::channel::Order;
use crate::core::ics04_channel::packet::{Packet, Sequence};
use crate::core::ics04_channel::upgrade::UpgradeFields;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::events::{Event, IbcEvent, IbcEventType};

/// Channel event attribute keys
pub const CONNECTION_ID_ATTRIBUTE_KEY: &str = "connection_id";
pub const CHANNEL_ID_ATTRIBUTE_KEY: &str = "channel_id";
pub const PORT_ID_ATTRIBUTE_KEY: &str = "port_id";
pub const COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY: &str = "counterparty_channel_id";
pub const COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY: &str = "counterparty_port_id";

/// Upgrade event attribute keys
pub const UPGRADE_SEQUENCE_ATTRIBUTE_KEY: &str = "upgrade_sequence";
pub const UPGRADE_CONNECTION_HOPS_ATTRIBUTE_KEY: &str = "upgrade_connection_hops";
pub const UPGRADE_VERSION_ATTRIBUTE_KEY: &str = "upgrade_version";
pub const UPGRADE_ORDERING_ATTRIBUTE_KEY: &str = "upgrade_ordering";
pub const UPGRADE_ERROR_RECEIPT_ATTRIBUTE_KEY: &str = "upgrade_error_receipt";

/// Packet event attribute keys
pub const PKT_SEQ_ATTRIBUTE_KEY: &str = "packet_sequence";
pub const PKT_DATA_HEX_ATTRIBUTE_KEY: &str = "packet_data_hex";
pub const PKT_DATA_HASH_ATTRIBUTE_KEY: &str = "packet_data_hash";
pub const PKT_SRC_PORT_ATTRIBUTE_KEY: &str = "packet_src_port";
pub const PKT_SRC_CHANNEL_ATTRIBUTE_KEY: &str = "packet_src_channel";
pub const PKT_DST_PORT_ATTRIBUTE_KEY: &str = "packet_dst_port";
pub const PKT_DST_CHANNEL_ATTRIBUTE_KEY: &str = "packet_dst_channel";
pub const PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY: &str = "packet_timeout_height";
pub const PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY: &str = "packet_timeout_timestamp";
pub const PKT_ACK_HEX_ATTRIBUTE_KEY: &str = "packet_ack_hex";
pub const PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY: &str = "packet_channel_ordering";

fn to_hex(bytes: &[u8]) -> String {
    Hex::lower_case()
        .encode_to_string(bytes)
        .unwrap_or_default()
}

/// Identifiers of a channel end and of its counterparty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    pub port_id: PortId,
    pub channel_id: Option<ChannelId>,
    pub connection_id: ConnectionId,
    pub counterparty_port_id: PortId,
    pub counterparty_channel_id: Option<ChannelId>,
}

impl Attributes {
    pub fn port_id(&self) -> &PortId {
        &self.port_id
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        self.channel_id.as_ref()
    }

    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut attributes = vec![(PORT_ID_ATTRIBUTE_KEY.to_string(), self.port_id.to_string())];
        if let Some(channel_id) = &self.channel_id {
            attributes.push((CHANNEL_ID_ATTRIBUTE_KEY.to_string(), channel_id.to_string()));
        }
        attributes.push((
            COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY.to_string(),
            self.counterparty_port_id.to_string(),
        ));
        if let Some(channel_id) = &self.counterparty_channel_id {
            attributes.push((
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY.to_string(),
                channel_id.to_string(),
            ));
        }
        attributes.push((
            CONNECTION_ID_ATTRIBUTE_KEY.to_string(),
            self.connection_id.to_string(),
        ));
        attributes
    }
}

macro_rules! channel_event {
    ($name:ident, $variant:ident, $event_type:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
        pub struct $name(pub Attributes);

        impl $name {
            pub fn attributes(&self) -> &Attributes {
                &self.0
            }

            pub fn port_id(&self) -> &PortId {
                &self.0.port_id
            }

            pub fn channel_id(&self) -> Option<&ChannelId> {
                self.0.channel_id.as_ref()
            }
        }

        impl From<Attributes> for $name {
            fn from(attrs: Attributes) -> Self {
                $name(attrs)
            }
        }

        impl From<$name> for IbcEvent {
            fn from(v: $name) -> Self {
                IbcEvent::$variant(v)
            }
        }

        impl From<$name> for Event {
            fn from(v: $name) -> Self {
                Event::new(IbcEventType::$event_type, v.0.to_pairs())
            }
        }
    };
}

channel_event!(OpenInit, OpenInitChannel, OpenInitChannel);
channel_event!(OpenTry, OpenTryChannel, OpenTryChannel);
channel_event!(OpenAck, OpenAckChannel, OpenAckChannel);
channel_event!(OpenConfirm, OpenConfirmChannel, OpenConfirmChannel);
channel_event!(CloseInit, CloseInitChannel, CloseInitChannel);

/// Identifiers of an upgrading channel end together with the fields being negotiated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpgradeAttributes {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub counterparty_port_id: PortId,
    pub counterparty_channel_id: Option<ChannelId>,
    pub upgrade_sequence: Sequence,
    pub upgrade_fields: UpgradeFields,
}

impl UpgradeAttributes {
    fn to_pairs(&self) -> Vec<(String, String)> {
        let mut attributes = vec![
            (PORT_ID_ATTRIBUTE_KEY.to_string(), self.port_id.to_string()),
            (CHANNEL_ID_ATTRIBUTE_KEY.to_string(), self.channel_id.to_string()),
            (
                COUNTERPARTY_PORT_ID_ATTRIBUTE_KEY.to_string(),
                self.counterparty_port_id.to_string(),
            ),
        ];
        if let Some(channel_id) = &self.counterparty_channel_id {
            attributes.push((
                COUNTERPARTY_CHANNEL_ID_ATTRIBUTE_KEY.to_string(),
                channel_id.to_string(),
            ));
        }
        let hops = self
            .upgrade_fields
            .connection_hops
            .iter()
            .map(|hop| hop.to_string())
            .collect::<Vec<_>>()
            .join(",");
        attributes.extend([
            (
                UPGRADE_SEQUENCE_ATTRIBUTE_KEY.to_string(),
                self.upgrade_sequence.to_string(),
            ),
            (UPGRADE_CONNECTION_HOPS_ATTRIBUTE_KEY.to_string(), hops),
            (
                UPGRADE_VERSION_ATTRIBUTE_KEY.to_string(),
                self.upgrade_fields.version.to_string(),
            ),
            (
                UPGRADE_ORDERING_ATTRIBUTE_KEY.to_string(),
                self.upgrade_fields.ordering.to_string(),
            ),
        ]);
        attributes
    }
}

macro_rules! upgrade_event {
    ($name:ident, $variant:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
        pub struct $name(pub UpgradeAttributes);

        impl $name {
            pub fn attributes(&self) -> &UpgradeAttributes {
                &self.0
            }
        }

        impl From<UpgradeAttributes> for $name {
            fn from(attrs: UpgradeAttributes) -> Self {
                $name(attrs)
            }
        }

        impl From<$name> for IbcEvent {
            fn from(v: $name) -> Self {
                IbcEvent::$variant(v)
            }
        }

        impl From<$name> for Event {
            fn from(v: $name) -> Self {
                Event::new(IbcEventType::$variant, v.0.to_pairs())
            }
        }
    };
}

upgrade_event!(UpgradeInit, UpgradeInitChannel);
upgrade_event!(UpgradeTry, UpgradeTryChannel);
upgrade_event!(UpgradeAck, UpgradeAckChannel);
upgrade_event!(UpgradeConfirm, UpgradeConfirmChannel);
upgrade_event!(UpgradeOpen, UpgradeOpenChannel);
upgrade_event!(UpgradeCancel, UpgradeCancelChannel);
upgrade_event!(UpgradeTimeout, UpgradeTimeoutChannel);

/// Emitted when an upgrade is aborted and an error receipt is written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpgradeError {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub upgrade_sequence: Sequence,
    pub message: String,
}

impl From<UpgradeError> for IbcEvent {
    fn from(v: UpgradeError) -> Self {
        IbcEvent::UpgradeErrorChannel(v)
    }
}

impl From<UpgradeError> for Event {
    fn from(v: UpgradeError) -> Self {
        Event::new(
            IbcEventType::UpgradeErrorChannel,
            vec![
                (PORT_ID_ATTRIBUTE_KEY.to_string(), v.port_id.to_string()),
                (CHANNEL_ID_ATTRIBUTE_KEY.to_string(), v.channel_id.to_string()),
                (
                    UPGRADE_SEQUENCE_ATTRIBUTE_KEY.to_string(),
                    v.upgrade_sequence.to_string(),
                ),
                (UPGRADE_ERROR_RECEIPT_ATTRIBUTE_KEY.to_string(), v.message),
            ],
        )
    }
}

fn packet_pairs(packet: &Packet) -> Vec<(String, String)> {
    vec![
        (PKT_SEQ_ATTRIBUTE_KEY.to_string(), packet.sequence.to_string()),
        (
            PKT_SRC_PORT_ATTRIBUTE_KEY.to_string(),
            packet.source_port.to_string(),
        ),
        (
            PKT_SRC_CHANNEL_ATTRIBUTE_KEY.to_string(),
            packet.source_channel.to_string(),
        ),
        (
            PKT_DST_PORT_ATTRIBUTE_KEY.to_string(),
            packet.destination_port.to_string(),
        ),
        (
            PKT_DST_CHANNEL_ATTRIBUTE_KEY.to_string(),
            packet.destination_channel.to_string(),
        ),
        (
            PKT_TIMEOUT_HEIGHT_ATTRIBUTE_KEY.to_string(),
            packet.timeout_height.to_string(),
        ),
        (
            PKT_TIMEOUT_TIMESTAMP_ATTRIBUTE_KEY.to_string(),
            packet.timeout_timestamp.nanoseconds().to_string(),
        ),
        (PKT_DATA_HEX_ATTRIBUTE_KEY.to_string(), to_hex(&packet.data)),
        (
            PKT_DATA_HASH_ATTRIBUTE_KEY.to_string(),
            to_hex(&Sha256::digest(&packet.data)),
        ),
    ]
}

macro_rules! packet_event {
    ($name:ident, $variant:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Serialize)]
        pub struct $name {
            pub packet: Packet,
        }

        impl $name {
            pub fn packet(&self) -> &Packet {
                &self.packet
            }
        }

        impl From<$name> for IbcEvent {
            fn from(v: $name) -> Self {
                IbcEvent::$variant(v)
            }
        }

        impl From<$name> for Event {
            fn from(v: $name) -> Self {
                Event::new(IbcEventType::$variant, packet_pairs(&v.packet))
            }
        }
    };
}

packet_event!(SendPacket, SendPacket);
packet_event!(ReceivePacket, ReceivePacket);
packet_event!(AcknowledgePacket, AcknowledgePacket);
packet_event!(TimeoutPacket, TimeoutPacket);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WriteAcknowledgement {
    pub packet: Packet,
    pub ack: Vec<u8>,
}

impl WriteAcknowledgement {
    pub fn packet(&self) -> &Packet {
        &self.packet
    }
}

impl From<WriteAcknowledgement> for IbcEvent {
    fn from(v: WriteAcknowledgement) -> Self {
        IbcEvent::WriteAcknowledgement(v)
    }
}

impl From<WriteAcknowledgement> for Event {
    fn from(v: WriteAcknowledgement) -> Self {
        let mut attributes = packet_pairs(&v.packet);
        attributes.push((PKT_ACK_HEX_ATTRIBUTE_KEY.to_string(), to_hex(&v.ack)));
        Event::new(IbcEventType::WriteAcknowledgement, attributes)
    }
}

/// Emitted when a timeout on an ordered channel closes the channel end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelClosed {
    pub attributes: Attributes,
    pub channel_ordering: Order,
}

impl From<ChannelClosed> for IbcEvent {
    fn from(v: ChannelClosed) -> Self {
        IbcEvent::ChannelClosed(v)
    }
}

impl From<ChannelClosed> for Event {
    fn from(v: ChannelClosed) -> Self {
        let mut attributes = v.attributes.to_pairs();
        attributes.push((
            PKT_CHANNEL_ORDERING_ATTRIBUTE_KEY.to_string(),
            v.channel_ordering.to_string(),
        ));
        Event::new(IbcEventType::ChannelClosed, attributes)
    }
}
