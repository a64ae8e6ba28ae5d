//! Path-space as listed in ICS-024
//! https://github.com/cosmos/ibc/tree/master/spec/core/ics-024-host-requirements#path-space
//! Only the paths written or proven by the channel layer are represented here.

use core::fmt::{Display, Formatter, Result as FmtResult};

use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::prelude::*;

/// The Path enum abstracts out the different sub-paths.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Path {
    Connections(ConnectionId),
    ChannelEnds(PortId, ChannelId),
    SeqSends(PortId, ChannelId),
    SeqRecvs(PortId, ChannelId),
    SeqAcks(PortId, ChannelId),
    Commitments {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    Acks {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    Receipts {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
    },
    ChannelUpgrade(PortId, ChannelId),
    UpgradeErrorReceipt(PortId, ChannelId),
    ChannelCapability(PortId, ChannelId),
}

impl Path {
    /// Indication if the path is provable.
    pub fn is_provable(&self) -> bool {
        !matches!(&self, Path::ChannelCapability(_, _))
    }

    /// into_bytes implementation
    pub fn into_bytes(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn commitments(port_id: &PortId, channel_id: &ChannelId, sequence: Sequence) -> Self {
        Path::Commitments {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            sequence,
        }
    }

    pub fn acks(port_id: &PortId, channel_id: &ChannelId, sequence: Sequence) -> Self {
        Path::Acks {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            sequence,
        }
    }

    pub fn receipts(port_id: &PortId, channel_id: &ChannelId, sequence: Sequence) -> Self {
        Path::Receipts {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            sequence,
        }
    }
}

/// The Display trait adds the `.to_string()` method to the Path struct.
/// This is where the different path strings are constructed.
impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self {
            Path::Connections(id) => write!(f, "connections/{}", id),
            Path::ChannelEnds(port_id, channel_id) => {
                write!(f, "channelEnds/ports/{}/channels/{}", port_id, channel_id)
            }
            Path::SeqSends(port_id, channel_id) => write!(
                f,
                "nextSequenceSend/ports/{}/channels/{}",
                port_id, channel_id
            ),
            Path::SeqRecvs(port_id, channel_id) => write!(
                f,
                "nextSequenceRecv/ports/{}/channels/{}",
                port_id, channel_id
            ),
            Path::SeqAcks(port_id, channel_id) => write!(
                f,
                "nextSequenceAck/ports/{}/channels/{}",
                port_id, channel_id
            ),
            Path::Commitments {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "commitments/ports/{}/channels/{}/sequences/{}",
                port_id, channel_id, sequence
            ),
            Path::Acks {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "acks/ports/{}/channels/{}/sequences/{}",
                port_id, channel_id, sequence
            ),
            Path::Receipts {
                port_id,
                channel_id,
                sequence,
            } => write!(
                f,
                "receipts/ports/{}/channels/{}/sequences/{}",
                port_id, channel_id, sequence
            ),
            Path::ChannelUpgrade(port_id, channel_id) => write!(
                f,
                "channelUpgrades/upgrades/ports/{}/channels/{}",
                port_id, channel_id
            ),
            Path::UpgradeErrorReceipt(port_id, channel_id) => write!(
                f,
                "channelUpgrades/upgradeError/ports/{}/channels/{}",
                port_id, channel_id
            ),
            Path::ChannelCapability(port_id, channel_id) => write!(
                f,
                "capabilities/ports/{}/channels/{}",
                port_id, channel_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn packet_paths_are_keyed_by_sequence() {
        let path = Path::commitments(&PortId::transfer(), &ChannelId::new(3), 7.into());
        assert_eq!(
            path.to_string(),
            "commitments/ports/transfer/channels/channel-3/sequences/7"
        );

        let path = Path::receipts(&PortId::transfer(), &ChannelId::new(3), 7.into());
        assert_eq!(
            path.to_string(),
            "receipts/ports/transfer/channels/channel-3/sequences/7"
        );
    }

    #[test]
    fn capability_path_is_not_provable() {
        let path = Path::ChannelCapability(PortId::transfer(), ChannelId::new(0));
        assert!(!path.is_provable());
        assert!(Path::SeqRecvs(PortId::transfer(), ChannelId::new(0)).is_provable());
    }
}
