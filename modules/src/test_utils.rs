use std::sync::{Arc, Mutex, MutexGuard};

use crate::prelude::*;

use crate::core::ics03_connection::connection::{
    ConnectionEnd, Counterparty as ConnectionCounterparty, State as ConnectionState,
};
use crate::core::ics03_connection::version::get_compatible_versions;
use crate::core::ics04_channel::channel::{Counterparty, Order};
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::msgs::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::packet::Packet;
use crate::core::ics04_channel::upgrade::UpgradeFields;
use crate::core::ics04_channel::Version;
use crate::core::ics23_commitment::commitment::CommitmentPrefix;
use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
use crate::core::ics26_routing::context::{Module, ModuleOutputBuilder};
use crate::timestamp::ZERO_DURATION;

/// Returns an OPEN connection end verified by `client_id`, whose counterparty is
/// `counterparty_connection_id` tracked by the default client.
pub fn get_dummy_connection_end(
    client_id: ClientId,
    counterparty_connection_id: ConnectionId,
) -> ConnectionEnd {
    ConnectionEnd::new(
        ConnectionState::Open,
        client_id,
        ConnectionCounterparty::new(
            ClientId::default(),
            Some(counterparty_connection_id),
            CommitmentPrefix::default(),
        ),
        get_compatible_versions(),
        ZERO_DURATION,
    )
}

/// Everything a `DummyModule` was called with, shared with the test that installed it.
#[derive(Debug, Default)]
pub struct ModuleRecord {
    /// Names of the callbacks invoked, in order.
    pub callbacks: Vec<String>,
    pub received: Vec<Packet>,
    pub acknowledged: Vec<(Packet, Acknowledgement)>,
    pub timed_out: Vec<Packet>,
}

/// An application that accepts everything and records what it sees. The acknowledgement
/// returned on receive is configurable; an empty one acknowledges asynchronously.
#[derive(Clone, Debug)]
pub struct DummyModule {
    record: Arc<Mutex<ModuleRecord>>,
    ack: Acknowledgement,
    reject_upgrades: bool,
}

impl Default for DummyModule {
    fn default() -> Self {
        Self {
            record: Default::default(),
            ack: Acknowledgement::from(b"ack".to_vec()),
            reject_upgrades: false,
        }
    }
}

impl DummyModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ack(self, ack: Acknowledgement) -> Self {
        Self { ack, ..self }
    }

    /// Makes `on_chan_upgrade_try` veto every proposal.
    pub fn rejecting_upgrades(self) -> Self {
        Self {
            reject_upgrades: true,
            ..self
        }
    }

    /// A handle on what the module recorded, valid after the module was moved into a router.
    pub fn record(&self) -> Arc<Mutex<ModuleRecord>> {
        self.record.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ModuleRecord> {
        self.record.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn called(&self, output: &mut ModuleOutputBuilder, name: &str) {
        output.log(format!("dummy module: {}", name));
        self.lock().callbacks.push(name.to_string());
    }
}

impl Module for DummyModule {
    fn on_chan_open_init(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        _version: &Version,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_open_init");
        Ok(())
    }

    fn on_chan_open_try(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, Error> {
        self.called(output, "on_chan_open_try");
        Ok(counterparty_version.clone())
    }

    fn on_chan_open_ack(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_open_ack");
        Ok(())
    }

    fn on_chan_open_confirm(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_open_confirm");
        Ok(())
    }

    fn on_chan_close_init(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_close_init");
        Ok(())
    }

    fn on_chan_upgrade_try(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        fields: &UpgradeFields,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_upgrade_try");
        if self.reject_upgrades {
            return Err(Error::app_module(format!("upgrade to {} refused", fields)));
        }
        Ok(())
    }

    fn on_chan_upgrade_ack(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_version: &Version,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_upgrade_ack");
        Ok(())
    }

    fn on_chan_upgrade_open(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.called(output, "on_chan_upgrade_open");
        Ok(())
    }

    fn on_chan_upgrade_restore(
        &mut self,
        output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) {
        self.called(output, "on_chan_upgrade_restore");
    }

    fn on_recv_packet(&mut self, output: &mut ModuleOutputBuilder, packet: &Packet) -> Acknowledgement {
        self.called(output, "on_recv_packet");
        self.lock().received.push(packet.clone());
        self.ack.clone()
    }

    fn on_acknowledgement_packet(
        &mut self,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
    ) -> Result<(), Error> {
        self.called(output, "on_acknowledgement_packet");
        self.lock()
            .acknowledged
            .push((packet.clone(), acknowledgement.clone()));
        Ok(())
    }

    fn on_timeout_packet(
        &mut self,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
    ) -> Result<(), Error> {
        self.called(output, "on_timeout_packet");
        self.lock().timed_out.push(packet.clone());
        Ok(())
    }
}
