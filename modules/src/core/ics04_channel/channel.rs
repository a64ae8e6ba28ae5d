use crate::prelude::*;

use core::fmt::{Display, Error as FmtError, Formatter};
use core::str::FromStr;

use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics04_channel::upgrade::UpgradeFields;
use crate::core::ics04_channel::{error::Error, version::Version};
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedChannelEnd {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub channel_end: ChannelEnd,
}

impl IdentifiedChannelEnd {
    pub fn new(port_id: PortId, channel_id: ChannelId, channel_end: ChannelEnd) -> Self {
        IdentifiedChannelEnd {
            port_id,
            channel_id,
            channel_end,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEnd {
    pub state: State,
    pub ordering: Order,
    pub remote: Counterparty,
    pub connection_hops: Vec<ConnectionId>,
    pub version: Version,
    pub upgrade_sequence: Sequence,
}

impl Display for ChannelEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(
            f,
            "ChannelEnd {{ state: {}, ordering: {}, remote: {}, connection_hops: {:?}, version: {}, upgrade_sequence: {} }}",
            self.state, self.ordering, self.remote, self.connection_hops, self.version, self.upgrade_sequence
        )
    }
}

impl Default for ChannelEnd {
    fn default() -> Self {
        ChannelEnd {
            state: State::Uninitialized,
            ordering: Default::default(),
            remote: Counterparty::default(),
            connection_hops: Vec::new(),
            version: Version::default(),
            // The value of 0 indicates the channel has never been upgraded
            upgrade_sequence: Sequence::from(0),
        }
    }
}

impl ChannelEnd {
    /// Creates a new ChannelEnd which has never been upgraded.
    pub fn new(
        state: State,
        ordering: Order,
        remote: Counterparty,
        connection_hops: Vec<ConnectionId>,
        version: Version,
    ) -> Self {
        Self {
            state,
            ordering,
            remote,
            connection_hops,
            version,
            upgrade_sequence: Sequence::from(0),
        }
    }

    pub fn with_upgrade_sequence(self, upgrade_sequence: Sequence) -> Self {
        Self {
            upgrade_sequence,
            ..self
        }
    }

    /// Updates the ChannelEnd to assume a new State 's'.
    pub fn set_state(&mut self, s: State) {
        self.state = s;
    }

    pub fn set_version(&mut self, v: Version) {
        self.version = v;
    }

    pub fn set_counterparty_channel_id(&mut self, c: ChannelId) {
        self.remote.channel_id = Some(c);
    }

    /// Returns `true` if this `ChannelEnd` is in state [`State::Open`].
    pub fn is_open(&self) -> bool {
        self.state_matches(&State::Open)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn ordering(&self) -> &Order {
        &self.ordering
    }

    pub fn counterparty(&self) -> &Counterparty {
        &self.remote
    }

    pub fn connection_hops(&self) -> &Vec<ConnectionId> {
        &self.connection_hops
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn upgrade_sequence(&self) -> Sequence {
        self.upgrade_sequence
    }

    /// The fields an upgrade may renegotiate, as currently in effect.
    pub fn upgrade_fields(&self) -> UpgradeFields {
        UpgradeFields::new(
            self.ordering,
            self.connection_hops.clone(),
            self.version.clone(),
        )
    }

    /// Swaps in the fields agreed upon by a completed upgrade.
    pub fn apply_upgrade_fields(&mut self, fields: UpgradeFields) {
        self.ordering = fields.ordering;
        self.connection_hops = fields.connection_hops;
        self.version = fields.version;
    }

    /// Returns the single connection hop of this channel end. Multi-hop channels are not
    /// supported.
    pub fn connection_hop(&self) -> Result<&ConnectionId, Error> {
        match self.connection_hops.as_slice() {
            [hop] => Ok(hop),
            hops => Err(Error::invalid_connection_hops_length(1, hops.len())),
        }
    }

    pub fn validate_basic(&self) -> Result<(), Error> {
        self.connection_hop()?;
        self.counterparty().validate_basic()
    }

    /// Helper function to compare the state of this end with another state.
    pub fn state_matches(&self, other: &State) -> bool {
        self.state() == other
    }

    /// Helper function to compare the order of this end with another order.
    pub fn order_matches(&self, other: &Order) -> bool {
        self.ordering() == other
    }

    pub fn counterparty_matches(&self, other: &Counterparty) -> bool {
        self.counterparty() == other
    }

    /// Canonical encoding of a channel end, as committed under the `channelEnds` path.
    pub fn encode_vec(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec(self).map_err(Error::encode)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterparty {
    pub port_id: PortId,
    pub channel_id: Option<ChannelId>,
}

impl Counterparty {
    pub fn new(port_id: PortId, channel_id: Option<ChannelId>) -> Self {
        Self {
            port_id,
            channel_id,
        }
    }

    pub fn port_id(&self) -> &PortId {
        &self.port_id
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        self.channel_id.as_ref()
    }

    pub fn validate_basic(&self) -> Result<(), Error> {
        Ok(())
    }
}

impl Display for Counterparty {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match &self.channel_id {
            Some(channel_id) => write!(
                f,
                "Counterparty(port_id: {}, channel_id: {})",
                self.port_id, channel_id
            ),
            None => write!(
                f,
                "Counterparty(port_id: {}, channel_id: None)",
                self.port_id
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Order {
    #[default]
    Unordered,
    Ordered,
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.as_str())
    }
}

impl Order {
    /// Yields the Order as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unordered => "ORDER_UNORDERED",
            Self::Ordered => "ORDER_ORDERED",
        }
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches("order_") {
            "unordered" => Ok(Self::Unordered),
            "ordered" => Ok(Self::Ordered),
            _ => Err(Error::unknown_order_type(s.to_string())),
        }
    }
}

/// The possible state variants that a channel can exhibit.
///
/// The opening handshake goes `Init -> TryOpen -> Open`, and `Closed` is terminal.
/// An open channel may renegotiate its fields through the upgrade handshake
/// `Open -> InitUpgrade -> TryUpgrade -> AckUpgrade -> Open`, during which the
/// channel keeps its pre-upgrade fields and packets keep flowing under them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum State {
    /// Default state
    Uninitialized,
    /// A channel has just started the opening handshake.
    Init,
    /// A channel has acknowledged the handshake step on the counterparty chain.
    TryOpen,
    /// A channel has completed the handshake. Open channels are ready to
    /// send and receive packets.
    Open,
    /// A channel has been closed and can no longer be used to send or receive
    /// packets.
    Closed,
    /// This end proposed an upgrade.
    InitUpgrade,
    /// This end accepted an upgrade proposed by the counterparty.
    TryUpgrade,
    /// This end observed that the counterparty accepted its proposal.
    AckUpgrade,
}

impl State {
    /// Yields the state as a string
    pub fn as_string(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Init => "INIT",
            Self::TryOpen => "TRYOPEN",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::InitUpgrade => "INITUPGRADE",
            Self::TryUpgrade => "TRYUPGRADE",
            Self::AckUpgrade => "ACKUPGRADE",
        }
    }

    /// Returns whether or not this channel state is `Open`.
    pub fn is_open(self) -> bool {
        self == State::Open
    }

    /// Returns whether an upgrade handshake is in progress.
    pub fn is_upgrading(self) -> bool {
        match self {
            State::InitUpgrade | State::TryUpgrade | State::AckUpgrade => true,
            State::Uninitialized | State::Init | State::TryOpen | State::Open | State::Closed => {
                false
            }
        }
    }

    /// Whether packets may be sent, received, acknowledged and timed out on a channel end in
    /// this state. Upgrades keep the channel usable under its pre-upgrade fields.
    pub fn allows_packets(self) -> bool {
        self.is_open() || self.is_upgrading()
    }

    /// Returns whether or not the channel with this state
    /// has progressed less or the same than the argument.
    /// This only takes into account the open channel handshake.
    ///
    /// # Example
    /// ```rust,ignore
    /// assert!(State::Init.less_or_equal_progress(State::Open));
    /// assert!(State::TryOpen.less_or_equal_progress(State::TryOpen));
    /// assert!(!State::Closed.less_or_equal_progress(State::Open));
    /// ```
    pub fn less_or_equal_progress(self, other: Self) -> bool {
        self.handshake_rank() <= other.handshake_rank()
    }

    fn handshake_rank(self) -> u8 {
        match self {
            State::Uninitialized => 0,
            State::Init => 1,
            State::TryOpen => 2,
            State::Open | State::InitUpgrade | State::TryUpgrade | State::AckUpgrade => 3,
            State::Closed => 4,
        }
    }
}

/// Provides a `to_string` method.
impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "{}", self.as_string())
    }
}


#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use core::str::FromStr;
    use test_log::test;

    use crate::core::ics04_channel::channel::{ChannelEnd, Order, State};
    use crate::core::ics04_channel::upgrade::UpgradeFields;
    use crate::core::ics24_host::identifier::ConnectionId;

    use super::test_util::get_dummy_channel_end;

    #[test]
    fn channel_end_validate_basic() {
        let mut end = get_dummy_channel_end(State::Init, Order::Unordered);
        assert!(end.validate_basic().is_ok());

        end.connection_hops = vec![];
        assert!(end.validate_basic().is_err());

        end.connection_hops = vec![ConnectionId::new(0), ConnectionId::new(1)];
        assert!(end.validate_basic().is_err());
    }

    #[test]
    fn parse_channel_ordering_type() {
        struct Test {
            ordering: &'static str,
            want_res: Option<Order>,
        }

        let tests: Vec<Test> = vec![
            Test {
                ordering: "ORDER_UNORDERED",
                want_res: Some(Order::Unordered),
            },
            Test {
                ordering: "ordered",
                want_res: Some(Order::Ordered),
            },
            Test {
                ordering: "UNINITIALIZED",
                want_res: None,
            },
            Test {
                ordering: "random",
                want_res: None,
            },
        ];

        for test in tests {
            match Order::from_str(test.ordering) {
                Ok(res) => {
                    assert!(test.want_res.is_some());
                    assert_eq!(test.want_res.unwrap(), res);
                }
                Err(_) => assert!(test.want_res.is_none(), "parse failed"),
            }
        }
    }

    #[test]
    fn upgrade_fields_are_swapped_in() {
        let mut end = get_dummy_channel_end(State::AckUpgrade, Order::Unordered);
        let fields = UpgradeFields::new(
            Order::Ordered,
            vec![ConnectionId::new(5)],
            "ics20-2".into(),
        );
        end.apply_upgrade_fields(fields.clone());
        assert_eq!(end.upgrade_fields(), fields);
        assert_eq!(end.state, State::AckUpgrade);
    }

    #[test]
    fn handshake_progress() {
        assert!(State::Init.less_or_equal_progress(State::Open));
        assert!(State::InitUpgrade.less_or_equal_progress(State::Open));
        assert!(!State::Closed.less_or_equal_progress(State::Open));
        assert!(State::TryUpgrade.is_upgrading());
        assert!(!State::Open.is_upgrading());
    }

    #[test]
    fn encoding_is_deterministic() {
        let end: ChannelEnd = get_dummy_channel_end(State::Open, Order::Ordered);
        assert_eq!(end.encode_vec().unwrap(), end.clone().encode_vec().unwrap());
    }
}
