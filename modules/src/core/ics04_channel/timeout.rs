use core::fmt::{Display, Error as FmtError, Formatter};

use serde_derive::{Deserialize, Serialize};

use crate::core::ics02_client::height::Height;
use crate::prelude::*;
use crate::timestamp::Timestamp;

/// Indicates a consensus height on the destination chain after which the packet
/// will no longer be processed, and will instead count as having timed-out.
///
/// A height of zero on the wire means the timeout is disabled, which
/// `TimeoutHeight::Never` makes explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeoutHeight {
    Never,
    At(Height),
}

impl TimeoutHeight {
    /// Revision number to be used in packet commitment computation
    pub fn commitment_revision_number(&self) -> u64 {
        match self {
            Self::At(height) => height.revision_number(),
            Self::Never => 0,
        }
    }

    /// Revision height to be used in packet commitment computation
    pub fn commitment_revision_height(&self) -> u64 {
        match self {
            Self::At(height) => height.revision_height(),
            Self::Never => 0,
        }
    }

    /// Check if a height is *stricly past* the timeout height, and thus is
    /// deemed expired.
    pub fn has_expired(&self, height: Height) -> bool {
        match self {
            Self::At(timeout_height) => height > *timeout_height,
            // When there's no timeout, heights are never expired
            Self::Never => false,
        }
    }

    /// Whether the timeout is reached at `height`, i.e. whether a packet bearing
    /// this timeout may no longer be received by a chain at `height`.
    pub fn is_reached(&self, height: Height) -> bool {
        match self {
            Self::At(timeout_height) => height >= *timeout_height,
            Self::Never => false,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::At(_))
    }
}

impl Default for TimeoutHeight {
    fn default() -> Self {
        Self::Never
    }
}

impl From<Height> for TimeoutHeight {
    fn from(height: Height) -> Self {
        Self::At(height)
    }
}

impl Display for TimeoutHeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            TimeoutHeight::At(timeout_height) => write!(f, "{}", timeout_height),
            TimeoutHeight::Never => write!(f, "no timeout"),
        }
    }
}

/// Whether a timeout timestamp is reached when the observed chain time is `now`.
/// An unset timeout, or an unknown chain time, never counts as reached.
pub fn timeout_timestamp_reached(timeout: &Timestamp, now: &Timestamp) -> bool {
    timeout.is_set() && now.is_set() && !timeout.after(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn timeout_height_is_reached_at_the_timeout_height() {
        let timeout = TimeoutHeight::At(Height::new(0, 100).unwrap());
        assert!(!timeout.is_reached(Height::new(0, 99).unwrap()));
        assert!(timeout.is_reached(Height::new(0, 100).unwrap()));
        assert!(!timeout.has_expired(Height::new(0, 100).unwrap()));
        assert!(timeout.has_expired(Height::new(0, 101).unwrap()));

        assert!(!TimeoutHeight::Never.is_reached(Height::new(9, 9).unwrap()));
        assert_eq!(TimeoutHeight::Never.commitment_revision_height(), 0);
    }

    #[test]
    fn timeout_timestamp_is_reached_once_chain_time_catches_up() {
        let timeout = Timestamp::from_nanoseconds(1_000).unwrap();
        let before = Timestamp::from_nanoseconds(999).unwrap();
        assert!(!timeout_timestamp_reached(&timeout, &before));
        assert!(timeout_timestamp_reached(&timeout, &timeout));
        assert!(!timeout_timestamp_reached(&Timestamp::none(), &timeout));
    }
}
