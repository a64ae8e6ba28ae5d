//! Types of the channel upgrade handshake.
//!
//! An upgrade renegotiates the ordering, connection hops and version of an open channel.
//! The proposal is stored next to the channel end under the `channelUpgrades` path while
//! the handshake runs. The channel end keeps its current fields until both ends agreed.

use crate::prelude::*;

use core::fmt::{Display, Error as FmtError, Formatter};

use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::channel::Order;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics04_channel::timeout::{timeout_timestamp_reached, TimeoutHeight};
use crate::core::ics04_channel::version::Version;
use crate::core::ics24_host::identifier::ConnectionId;
use crate::timestamp::Timestamp;
use crate::Height;

/// The channel fields an upgrade may change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeFields {
    pub ordering: Order,
    pub connection_hops: Vec<ConnectionId>,
    pub version: Version,
}

impl UpgradeFields {
    pub fn new(ordering: Order, connection_hops: Vec<ConnectionId>, version: Version) -> Self {
        Self {
            ordering,
            connection_hops,
            version,
        }
    }

    pub fn connection_hop(&self) -> Result<&ConnectionId, Error> {
        match self.connection_hops.as_slice() {
            [hop] => Ok(hop),
            hops => Err(Error::invalid_connection_hops_length(1, hops.len())),
        }
    }
}

impl Display for UpgradeFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "UpgradeFields {{ ordering: {}, connection_hops: {:?}, version: {} }}",
            self.ordering, self.connection_hops, self.version
        )
    }
}

/// Deadline for the counterparty to move along the upgrade handshake, measured against the
/// counterparty chain's height and time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTimeout {
    pub height: TimeoutHeight,
    pub timestamp: Timestamp,
}

impl UpgradeTimeout {
    pub fn new(height: TimeoutHeight, timestamp: Timestamp) -> Result<Self, Error> {
        let timeout = Self { height, timestamp };
        if !timeout.is_valid() {
            return Err(Error::upgrade_timeout_not_set());
        }
        Ok(timeout)
    }

    pub fn at_height(height: Height) -> Self {
        Self {
            height: TimeoutHeight::At(height),
            timestamp: Timestamp::none(),
        }
    }

    pub fn at_timestamp(timestamp: Timestamp) -> Self {
        Self {
            height: TimeoutHeight::Never,
            timestamp,
        }
    }

    /// At least one of the bounds must be set.
    pub fn is_valid(&self) -> bool {
        self.height.is_set() || self.timestamp.is_set()
    }

    /// Whether a chain at `height` and `timestamp` is past this deadline.
    pub fn has_elapsed(&self, height: Height, timestamp: &Timestamp) -> bool {
        self.height.is_reached(height) || timeout_timestamp_reached(&self.timestamp, timestamp)
    }
}

impl Display for UpgradeTimeout {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "UpgradeTimeout {{ height: {}, timestamp: {} }}",
            self.height, self.timestamp
        )
    }
}

/// An upgrade in progress for a channel end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    pub fields: UpgradeFields,
    pub timeout: UpgradeTimeout,
    /// Last sequence sent on the channel when the upgrade was proposed or accepted.
    pub latest_sequence_send: Sequence,
}

impl Upgrade {
    pub fn new(fields: UpgradeFields, timeout: UpgradeTimeout, latest_sequence_send: Sequence) -> Self {
        Self {
            fields,
            timeout,
            latest_sequence_send,
        }
    }

    /// Canonical encoding of an upgrade, as committed under the `channelUpgrades` path.
    pub fn encode_vec(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::encode)
    }
}

/// Written when an upgrade is aborted, so the counterparty can prove the abort and
/// restore its channel end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReceipt {
    pub sequence: Sequence,
    pub message: String,
}

impl ErrorReceipt {
    pub fn new(sequence: Sequence, message: impl ToString) -> Self {
        Self {
            sequence,
            message: message.to_string(),
        }
    }

    /// Canonical encoding of an error receipt, as committed under the `upgradeError` path.
    pub fn encode_vec(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::encode)
    }
}

/// Two proposals are compatible when they agree on ordering and version. Connection hops
/// name a connection local to each chain and are checked separately.
pub fn is_compatible(local: &UpgradeFields, counterparty: &UpgradeFields) -> bool {
    local.ordering == counterparty.ordering && local.version == counterparty.version
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use core::time::Duration;

    #[test]
    fn upgrade_timeout_requires_a_bound() {
        assert!(UpgradeTimeout::new(TimeoutHeight::Never, Timestamp::none()).is_err());
        assert!(UpgradeTimeout::new(
            TimeoutHeight::At(Height::new(0, 10).unwrap()),
            Timestamp::none()
        )
        .is_ok());
    }

    #[test]
    fn upgrade_timeout_elapses_on_either_bound() {
        let now = Timestamp::now();
        let deadline = (now + Duration::from_secs(60)).unwrap();
        let timeout = UpgradeTimeout {
            height: TimeoutHeight::At(Height::new(0, 20).unwrap()),
            timestamp: deadline,
        };

        assert!(!timeout.has_elapsed(Height::new(0, 19).unwrap(), &now));
        assert!(timeout.has_elapsed(Height::new(0, 20).unwrap(), &now));
        assert!(timeout.has_elapsed(Height::new(0, 1).unwrap(), &deadline));
    }

    #[test]
    fn compatibility_ignores_connection_hops() {
        let local = UpgradeFields::new(Order::Unordered, vec![ConnectionId::new(0)], "v2".into());
        let remote = UpgradeFields::new(Order::Unordered, vec![ConnectionId::new(7)], "v2".into());
        assert!(is_compatible(&local, &remote));

        let other_version = UpgradeFields {
            version: "v3".into(),
            ..remote
        };
        assert!(!is_compatible(&local, &other_version));
    }
}
