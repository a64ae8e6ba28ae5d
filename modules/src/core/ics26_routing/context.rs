use crate::prelude::*;

use alloc::borrow::Cow;
use core::fmt::{self, Debug, Display, Formatter};

use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::channel::{Counterparty, Order};
use crate::core::ics04_channel::context::{ChannelKeeper, ChannelReader};
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::msgs::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::packet::Packet;
use crate::core::ics04_channel::upgrade::UpgradeFields;
use crate::core::ics04_channel::Version;
use crate::core::ics05_port::context::PortReader;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::core::ics26_routing::error::Error as RouterError;
use crate::handler::HandlerOutputBuilder;

/// This trait captures all the functional dependencies (i.e., context) which the ICS26 module
/// requires to be able to dispatch and process IBC messages. In other words, this is the
/// representation of a chain from the perspective of the IBC module of that chain.
pub trait Ics26Context: ChannelReader + ChannelKeeper + PortReader {
    type Router: Router;

    fn router(&self) -> &Self::Router;

    fn router_mut(&mut self) -> &mut Self::Router;
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(s: Cow<'_, str>) -> Result<Self, RouterError> {
        if !s.trim().is_empty() && s.chars().all(char::is_alphanumeric) {
            Ok(Self(s.into_owned()))
        } else {
            Err(RouterError::invalid_module_id(s.into_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log lines and events a module callback adds to the datagram's output.
pub type ModuleOutputBuilder = HandlerOutputBuilder<()>;

/// The callbacks an application bound to a port receives. A callback error fails the whole
/// datagram: nothing it was part of is written.
pub trait Module: Debug + Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn on_chan_open_init(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        _version: &Version,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Returns the version the channel end is opened with.
    #[allow(clippy::too_many_arguments)]
    fn on_chan_open_try(
        &mut self,
        output: &mut ModuleOutputBuilder,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, Error>;

    fn on_chan_open_ack(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn on_chan_open_confirm(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn on_chan_close_init(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called when the counterparty proposes `fields`. An error vetoes the proposal.
    fn on_chan_upgrade_try(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _fields: &UpgradeFields,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn on_chan_upgrade_ack(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called once the channel end runs with the upgraded fields.
    fn on_chan_upgrade_open(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        Ok(())
    }

    /// Called when an upgrade is abandoned and the channel end keeps its previous fields.
    fn on_chan_upgrade_restore(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) {
    }

    /// Returns the acknowledgement to write. An empty acknowledgement is written later by the
    /// module itself.
    fn on_recv_packet(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _packet: &Packet,
    ) -> Acknowledgement {
        Acknowledgement::from(Vec::new())
    }

    fn on_acknowledgement_packet(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _packet: &Packet,
        _acknowledgement: &Acknowledgement,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn on_timeout_packet(
        &mut self,
        _output: &mut ModuleOutputBuilder,
        _packet: &Packet,
    ) -> Result<(), Error> {
        Ok(())
    }
}

/// A router maintains a mapping of `ModuleId`s against `Modules`. Implementations must not
/// publicly expose APIs to add new routes once constructed.
pub trait Router {
    /// Returns a mutable reference to a `Module` registered against the specified `ModuleId`
    fn get_route_mut(&mut self, module_id: &ModuleId) -> Option<&mut dyn Module>;

    /// Returns true if the `Router` has a `Module` registered against the specified `ModuleId`
    fn has_route(&self, module_id: &ModuleId) -> bool;
}
