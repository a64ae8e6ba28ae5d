//! Implementation of a global context mock. Used in testing handlers of all IBC modules.

use crate::prelude::*;

use alloc::collections::BTreeMap;
use core::cmp::min;

use crate::config::Params;
use crate::core::ics02_client::client_consensus::ConsensusState;
use crate::core::ics02_client::client_state::ClientState;
use crate::core::ics02_client::context::ClientReader;
use crate::core::ics02_client::error::Error as Ics02Error;
use crate::core::ics03_connection::connection::ConnectionEnd;
use crate::core::ics03_connection::context::ConnectionReader;
use crate::core::ics03_connection::error::Error as Ics03Error;
use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::commitment::{
    AcknowledgementCommitment, PacketCommitment, RECEIPT_MARKER,
};
use crate::core::ics04_channel::context::{ChannelKeeper, ChannelReader};
use crate::core::ics04_channel::error::Error as Ics04Error;
use crate::core::ics04_channel::packet::{Receipt, Sequence};
use crate::core::ics04_channel::upgrade::{ErrorReceipt, Upgrade};
use crate::core::ics05_port::capabilities::{
    Capability, CapabilityName, CapabilityStore, ChannelCapability,
};
use crate::core::ics05_port::context::{CapabilityKeeper, CapabilityReader, PortReader};
use crate::core::ics05_port::error::Error as Ics05Error;
use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
use crate::core::ics24_host::Path;
use crate::core::ics26_routing::context::{Ics26Context, Module, ModuleId, Router};
use crate::core::ics26_routing::error::Error as RouterError;
use crate::core::ics26_routing::handler::{deliver, MsgReceipt};
use crate::core::ics26_routing::msgs::Ics26Envelope;
use crate::mock::client_def::MockClient;
use crate::mock::client_state::MockClientRecord;
use crate::mock::header::MockHeader;
use crate::mock::host::{block_timestamp, HostBlock, MockProvableStore};
use crate::timestamp::Timestamp;
use crate::Height;

type PortChannel = (PortId, ChannelId);
type PortChannelSeq = (PortId, ChannelId, Sequence);

/// A context implementing the dependencies necessary for testing any IBC module.
#[derive(Debug)]
pub struct MockContext {
    /// Maximum size for the history of the host chain. Any block older than this is pruned.
    max_history_size: usize,

    /// Highest height (i.e., most recent) of the blocks in the history.
    latest_height: Height,

    /// The chain of blocks underlying this context. A vector of size up to `max_history_size`
    /// blocks, ascending order by their height (latest block is on the last position).
    history: Vec<HostBlock>,

    /// The set of all clients, indexed by their id.
    clients: BTreeMap<ClientId, MockClientRecord>,

    /// All the connections in the store.
    connections: BTreeMap<ConnectionId, ConnectionEnd>,

    /// All the channels in the store.
    channels: BTreeMap<PortChannel, ChannelEnd>,

    /// Association between connection ids and channel ids.
    connection_channels: BTreeMap<ConnectionId, Vec<PortChannel>>,

    /// Tracks the sequence number for the next packet to be sent.
    next_sequence_send: BTreeMap<PortChannel, Sequence>,

    /// Tracks the sequence number for the next packet to be received.
    next_sequence_recv: BTreeMap<PortChannel, Sequence>,

    /// Tracks the sequence number for the next packet to be acknowledged.
    next_sequence_ack: BTreeMap<PortChannel, Sequence>,

    packet_commitment: BTreeMap<PortChannelSeq, PacketCommitment>,

    packet_receipt: BTreeMap<PortChannelSeq, Receipt>,

    packet_acknowledgement: BTreeMap<PortChannelSeq, AcknowledgementCommitment>,

    /// Upgrades in progress.
    upgrades: BTreeMap<PortChannel, Upgrade>,

    /// Counterparty upgrades recorded by Try and Ack.
    counterparty_upgrades: BTreeMap<PortChannel, Upgrade>,

    /// Last error receipt written per channel end.
    upgrade_error_receipts: BTreeMap<PortChannel, ErrorReceipt>,

    /// Counter for channel identifiers (see `increase_channel_counter`).
    channel_ids_counter: u64,

    capabilities: CapabilityStore,

    /// Maps ports to the module bound to them.
    port_to_module: BTreeMap<PortId, ModuleId>,

    router: MockRouter,

    params: Params,
}

/// Returns a MockContext with bare minimum initialization: no clients, no connections and no
/// channels are present, and the chain has Height(5).
impl Default for MockContext {
    fn default() -> Self {
        Self::new(
            5,
            Height {
                revision_number: 0,
                revision_height: 5,
            },
        )
    }
}

/// Implementation of internal interface for use in testing. The methods in this interface should
/// _not_ be accessible to any ICS handler.
impl MockContext {
    /// Creates a mock context. Parameter `max_history_size` determines how many blocks will
    /// the chain maintain in its history, which also determines the pruning window. Parameter
    /// `latest_height` determines the current height of the chain.
    pub fn new(max_history_size: usize, latest_height: Height) -> Self {
        assert_ne!(
            max_history_size, 0,
            "The chain must have a non-zero max_history_size"
        );

        // Compute the number of blocks to store.
        let n = min(max_history_size as u64, latest_height.revision_height);

        MockContext {
            max_history_size,
            latest_height,
            history: (0..n)
                .rev()
                .map(|i| {
                    let height = Height {
                        revision_number: latest_height.revision_number,
                        revision_height: latest_height.revision_height - i,
                    };
                    HostBlock::generate_block(height, MockProvableStore::default())
                })
                .collect(),
            clients: Default::default(),
            connections: Default::default(),
            channels: Default::default(),
            connection_channels: Default::default(),
            next_sequence_send: Default::default(),
            next_sequence_recv: Default::default(),
            next_sequence_ack: Default::default(),
            packet_commitment: Default::default(),
            packet_receipt: Default::default(),
            packet_acknowledgement: Default::default(),
            upgrades: Default::default(),
            counterparty_upgrades: Default::default(),
            upgrade_error_receipts: Default::default(),
            channel_ids_counter: 0,
            capabilities: Default::default(),
            port_to_module: Default::default(),
            router: Default::default(),
            params: Default::default(),
        }
    }

    /// Associates a client record to this context, with a consensus state at `height` whose
    /// root commits to an empty store.
    pub fn with_client(self, client_id: &ClientId, height: Height) -> Self {
        self.with_client_store(client_id, height, &MockProvableStore::default())
    }

    /// Records that the client `client_id` learnt the counterparty committed to `store` at
    /// `height`. Proofs of `store` then verify at `height`.
    pub fn with_client_store(
        mut self,
        client_id: &ClientId,
        height: Height,
        store: &MockProvableStore,
    ) -> Self {
        let header = MockHeader {
            height,
            timestamp: block_timestamp(height),
            root: store.root(),
        };
        self.update_client(client_id, header);
        self
    }

    pub fn with_frozen_client(mut self, client_id: &ClientId) -> Self {
        if let Some(record) = self.clients.get_mut(client_id) {
            record.client_state = record
                .client_state
                .with_frozen_height(record.client_state.latest_height);
        }
        self
    }

    /// Associates a connection to this context.
    pub fn with_connection(
        mut self,
        connection_id: ConnectionId,
        connection_end: ConnectionEnd,
    ) -> Self {
        self.connections.insert(connection_id, connection_end);
        self
    }

    /// Associates a channel (in an arbitrary state) to this context, together with the
    /// capability owning it.
    pub fn with_channel(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        channel_end: ChannelEnd,
    ) -> Self {
        let name = CapabilityName::channel(&port_id, &chan_id);
        if self.capabilities.get_capability(&name).is_err() {
            // Only fails for a name that is already taken.
            let _ = self.capabilities.new_capability(name);
        }
        self.channels.insert((port_id, chan_id), channel_end);
        self
    }

    pub fn with_send_sequence(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        seq_number: Sequence,
    ) -> Self {
        self.next_sequence_send.insert((port_id, chan_id), seq_number);
        self
    }

    pub fn with_recv_sequence(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        seq_number: Sequence,
    ) -> Self {
        self.next_sequence_recv.insert((port_id, chan_id), seq_number);
        self
    }

    pub fn with_ack_sequence(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        seq_number: Sequence,
    ) -> Self {
        self.next_sequence_ack.insert((port_id, chan_id), seq_number);
        self
    }

    pub fn with_packet_commitment(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        seq: Sequence,
        data: PacketCommitment,
    ) -> Self {
        self.packet_commitment.insert((port_id, chan_id, seq), data);
        self
    }

    pub fn with_packet_receipt(mut self, port_id: PortId, chan_id: ChannelId, seq: Sequence) -> Self {
        self.packet_receipt
            .insert((port_id, chan_id, seq), Receipt::Ok);
        self
    }

    pub fn with_packet_acknowledgement(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        seq: Sequence,
        ack_commitment: AcknowledgementCommitment,
    ) -> Self {
        self.packet_acknowledgement
            .insert((port_id, chan_id, seq), ack_commitment);
        self
    }

    pub fn with_upgrade(mut self, port_id: PortId, chan_id: ChannelId, upgrade: Upgrade) -> Self {
        self.upgrades.insert((port_id, chan_id), upgrade);
        self
    }

    pub fn with_counterparty_upgrade(
        mut self,
        port_id: PortId,
        chan_id: ChannelId,
        upgrade: Upgrade,
    ) -> Self {
        self.counterparty_upgrades.insert((port_id, chan_id), upgrade);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Binds `port_id` to `module`, registered under `module_id`.
    pub fn with_module(
        mut self,
        port_id: PortId,
        module_id: ModuleId,
        module: impl Module + 'static,
    ) -> Self {
        self.router.add_route(module_id.clone(), module);
        self.port_to_module.insert(port_id, module_id);
        self
    }

    /// Binds `port_id` to `module_id` without registering a module under it.
    pub fn with_port_binding(mut self, port_id: PortId, module_id: ModuleId) -> Self {
        self.port_to_module.insert(port_id, module_id);
        self
    }

    /// The capability owning the channel end `(port_id, chan_id)`, as held by its module.
    pub fn channel_capability(
        &self,
        port_id: &PortId,
        chan_id: &ChannelId,
    ) -> Option<ChannelCapability> {
        self.capabilities
            .get_capability(&CapabilityName::channel(port_id, chan_id))
            .ok()
            .map(ChannelCapability::from)
    }

    /// Accessor for a block of the local (host) chain from this context.
    /// Returns `None` if the block at the requested height does not exist.
    pub fn host_block(&self, target_height: Height) -> Option<&HostBlock> {
        self.history
            .iter()
            .find(|block| block.height() == target_height)
    }

    /// The header of the latest block, as a light client of this chain would learn it.
    pub fn latest_header(&self) -> Option<MockHeader> {
        self.history.last().map(HostBlock::header)
    }

    /// Proof of the whole provable store as committed by the block at `height`.
    pub fn query_proof(&self, height: Height) -> Option<CommitmentProofBytes> {
        self.host_block(height).map(HostBlock::proof)
    }

    /// Feeds `header` to the light client `client_id`, creating the client if needed.
    pub fn update_client(&mut self, client_id: &ClientId, header: MockHeader) {
        match self.clients.get_mut(client_id) {
            Some(record) => record.update(header),
            None => {
                self.clients
                    .insert(client_id.clone(), MockClientRecord::new(header));
            }
        }
    }

    /// The snapshot of every provable path, as the next block commits to it.
    pub fn provable_store(&self) -> MockProvableStore {
        let prefix = CommitmentPrefix::default();
        let mut store = MockProvableStore::default();

        for (id, end) in &self.connections {
            store.insert(
                &prefix,
                Path::Connections(id.clone()),
                serde_json::to_vec(end).unwrap_or_default(),
            );
        }
        for ((port_id, chan_id), end) in &self.channels {
            store.insert(
                &prefix,
                Path::ChannelEnds(port_id.clone(), chan_id.clone()),
                end.encode_vec().unwrap_or_default(),
            );
        }
        for ((port_id, chan_id), seq) in &self.next_sequence_send {
            store.insert(
                &prefix,
                Path::SeqSends(port_id.clone(), chan_id.clone()),
                seq.to_be_bytes().to_vec(),
            );
        }
        for ((port_id, chan_id), seq) in &self.next_sequence_recv {
            store.insert(
                &prefix,
                Path::SeqRecvs(port_id.clone(), chan_id.clone()),
                seq.to_be_bytes().to_vec(),
            );
        }
        for ((port_id, chan_id), seq) in &self.next_sequence_ack {
            store.insert(
                &prefix,
                Path::SeqAcks(port_id.clone(), chan_id.clone()),
                seq.to_be_bytes().to_vec(),
            );
        }
        for ((port_id, chan_id, seq), commitment) in &self.packet_commitment {
            store.insert(
                &prefix,
                Path::commitments(port_id, chan_id, *seq),
                commitment.as_bytes().to_vec(),
            );
        }
        for (port_id, chan_id, seq) in self.packet_receipt.keys() {
            store.insert(
                &prefix,
                Path::receipts(port_id, chan_id, *seq),
                RECEIPT_MARKER.to_vec(),
            );
        }
        for ((port_id, chan_id, seq), ack) in &self.packet_acknowledgement {
            store.insert(
                &prefix,
                Path::acks(port_id, chan_id, *seq),
                ack.as_bytes().to_vec(),
            );
        }
        for ((port_id, chan_id), upgrade) in &self.upgrades {
            store.insert(
                &prefix,
                Path::ChannelUpgrade(port_id.clone(), chan_id.clone()),
                upgrade.encode_vec().unwrap_or_default(),
            );
        }
        for ((port_id, chan_id), receipt) in &self.upgrade_error_receipts {
            store.insert(
                &prefix,
                Path::UpgradeErrorReceipt(port_id.clone(), chan_id.clone()),
                receipt.encode_vec().unwrap_or_default(),
            );
        }

        store
    }

    /// Triggers the advancing of the host chain, by extending the history of blocks. The new
    /// block commits to the current store.
    pub fn advance_host_chain_height(&mut self) {
        let new_block = HostBlock::generate_block(self.latest_height.increment(), self.provable_store());

        // Append the new header at the tip of the history.
        if self.history.len() >= self.max_history_size {
            // History is full, we rotate and replace the tip with the new header.
            self.history.rotate_left(1);
            self.history[self.max_history_size - 1] = new_block;
        } else {
            // History is not full yet.
            self.history.push(new_block);
        }
        self.latest_height = self.latest_height.increment();
    }

    /// A datagram passes from the relayer to the IBC module (on host chain). A new block is
    /// committed when it succeeds.
    pub fn deliver(&mut self, msg: Ics26Envelope) -> Result<MsgReceipt, RouterError> {
        let receipt = deliver(self, msg)?;
        self.advance_host_chain_height();
        Ok(receipt)
    }
}

#[derive(Debug, Default)]
pub struct MockRouter(BTreeMap<ModuleId, Box<dyn Module>>);

impl MockRouter {
    pub fn add_route(&mut self, module_id: ModuleId, module: impl Module + 'static) {
        self.0.insert(module_id, Box::new(module));
    }
}

impl Router for MockRouter {
    fn get_route_mut(&mut self, module_id: &ModuleId) -> Option<&mut dyn Module> {
        match self.0.get_mut(module_id) {
            Some(module) => Some(module.as_mut()),
            None => None,
        }
    }

    fn has_route(&self, module_id: &ModuleId) -> bool {
        self.0.contains_key(module_id)
    }
}

impl Ics26Context for MockContext {
    type Router = MockRouter;

    fn router(&self) -> &Self::Router {
        &self.router
    }

    fn router_mut(&mut self) -> &mut Self::Router {
        &mut self.router
    }
}

impl PortReader for MockContext {
    fn lookup_module_by_port(&self, port_id: &PortId) -> Result<ModuleId, Ics05Error> {
        self.port_to_module
            .get(port_id)
            .cloned()
            .ok_or_else(|| Ics05Error::unknown_port(port_id.clone()))
    }
}

impl CapabilityReader for MockContext {
    fn get_capability(&self, name: &CapabilityName) -> Result<Capability, Ics05Error> {
        self.capabilities.get_capability(name)
    }

    fn authenticate_capability(
        &self,
        name: &CapabilityName,
        capability: &Capability,
    ) -> Result<(), Ics05Error> {
        self.capabilities.authenticate_capability(name, capability)
    }
}

impl CapabilityKeeper for MockContext {
    fn new_capability(&mut self, name: CapabilityName) -> Result<Capability, Ics05Error> {
        self.capabilities.new_capability(name)
    }

    fn release_capability(
        &mut self,
        name: &CapabilityName,
        capability: Capability,
    ) -> Result<(), Ics05Error> {
        self.capabilities.release_capability(name, capability)
    }
}

impl ClientReader for MockContext {
    fn client_state(&self, client_id: &ClientId) -> Result<ClientState, Ics02Error> {
        self.clients
            .get(client_id)
            .map(|record| record.client_state)
            .ok_or_else(|| Ics02Error::client_not_found(client_id.clone()))
    }

    fn client_consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<ConsensusState, Ics02Error> {
        self.clients
            .get(client_id)
            .and_then(|record| record.consensus_states.get(&height))
            .cloned()
            .ok_or_else(|| Ics02Error::consensus_state_not_found(client_id.clone(), height))
    }

    fn verify_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
        value: Vec<u8>,
    ) -> Result<(), Ics02Error> {
        self.client_state(client_id)?;
        MockClient.verify_membership(prefix, proof, root, path, value)
    }

    fn verify_non_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
    ) -> Result<(), Ics02Error> {
        self.client_state(client_id)?;
        MockClient.verify_non_membership(prefix, proof, root, path)
    }
}

impl ConnectionReader for MockContext {
    fn connection_end(&self, cid: &ConnectionId) -> Result<ConnectionEnd, Ics03Error> {
        self.connections
            .get(cid)
            .cloned()
            .ok_or_else(|| Ics03Error::connection_not_found(cid.clone()))
    }
}

impl ChannelReader for MockContext {
    fn channel_end(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<ChannelEnd, Ics04Error> {
        self.channels
            .get(&(port_id.clone(), channel_id.clone()))
            .cloned()
            .ok_or_else(|| Ics04Error::channel_not_found(port_id.clone(), channel_id.clone()))
    }

    fn connection_channels(&self, cid: &ConnectionId) -> Result<Vec<PortChannel>, Ics04Error> {
        Ok(self
            .connection_channels
            .get(cid)
            .cloned()
            .unwrap_or_default())
    }

    fn get_next_sequence_send(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Ics04Error> {
        self.next_sequence_send
            .get(&(port_id.clone(), channel_id.clone()))
            .copied()
            .ok_or_else(|| Ics04Error::missing_next_send_seq(port_id.clone(), channel_id.clone()))
    }

    fn get_next_sequence_recv(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Ics04Error> {
        self.next_sequence_recv
            .get(&(port_id.clone(), channel_id.clone()))
            .copied()
            .ok_or_else(|| Ics04Error::missing_next_recv_seq(port_id.clone(), channel_id.clone()))
    }

    fn get_next_sequence_ack(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Sequence, Ics04Error> {
        self.next_sequence_ack
            .get(&(port_id.clone(), channel_id.clone()))
            .copied()
            .ok_or_else(|| Ics04Error::missing_next_ack_seq(port_id.clone(), channel_id.clone()))
    }

    fn get_packet_commitment(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<PacketCommitment, Ics04Error> {
        self.packet_commitment
            .get(&(port_id.clone(), channel_id.clone(), sequence))
            .cloned()
            .ok_or_else(|| Ics04Error::packet_commitment_not_found(sequence))
    }

    fn get_packet_receipt(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<Receipt, Ics04Error> {
        self.packet_receipt
            .get(&(port_id.clone(), channel_id.clone(), sequence))
            .cloned()
            .ok_or_else(|| Ics04Error::packet_receipt_not_found(sequence))
    }

    fn get_packet_acknowledgement(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<AcknowledgementCommitment, Ics04Error> {
        self.packet_acknowledgement
            .get(&(port_id.clone(), channel_id.clone(), sequence))
            .cloned()
            .ok_or_else(|| Ics04Error::packet_acknowledgement_not_found(sequence))
    }

    fn get_upgrade(&self, port_id: &PortId, channel_id: &ChannelId) -> Result<Upgrade, Ics04Error> {
        self.upgrades
            .get(&(port_id.clone(), channel_id.clone()))
            .cloned()
            .ok_or_else(|| Ics04Error::upgrade_not_found(port_id.clone(), channel_id.clone()))
    }

    fn get_counterparty_upgrade(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Upgrade, Ics04Error> {
        self.counterparty_upgrades
            .get(&(port_id.clone(), channel_id.clone()))
            .cloned()
            .ok_or_else(|| {
                Ics04Error::counterparty_upgrade_not_found(port_id.clone(), channel_id.clone())
            })
    }

    fn get_upgrade_error_receipt(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<ErrorReceipt, Ics04Error> {
        self.upgrade_error_receipts
            .get(&(port_id.clone(), channel_id.clone()))
            .cloned()
            .ok_or_else(|| {
                Ics04Error::upgrade_error_receipt_not_found(port_id.clone(), channel_id.clone())
            })
    }

    fn host_height(&self) -> Height {
        self.latest_height
    }

    fn host_timestamp(&self) -> Timestamp {
        block_timestamp(self.latest_height)
    }

    fn channel_counter(&self) -> Result<u64, Ics04Error> {
        Ok(self.channel_ids_counter)
    }

    fn params(&self) -> Params {
        self.params.clone()
    }
}

impl ChannelKeeper for MockContext {
    fn store_packet_commitment(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        commitment: PacketCommitment,
    ) -> Result<(), Ics04Error> {
        self.packet_commitment
            .insert((port_id.clone(), channel_id.clone(), sequence), commitment);
        Ok(())
    }

    fn delete_packet_commitment(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
    ) -> Result<(), Ics04Error> {
        self.packet_commitment
            .remove(&(port_id.clone(), channel_id.clone(), sequence));
        Ok(())
    }

    fn store_packet_receipt(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        receipt: Receipt,
    ) -> Result<(), Ics04Error> {
        self.packet_receipt
            .insert((port_id.clone(), channel_id.clone(), sequence), receipt);
        Ok(())
    }

    fn store_packet_acknowledgement(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        sequence: Sequence,
        ack_commitment: AcknowledgementCommitment,
    ) -> Result<(), Ics04Error> {
        self.packet_acknowledgement
            .insert((port_id.clone(), channel_id.clone(), sequence), ack_commitment);
        Ok(())
    }

    fn store_connection_channels(
        &mut self,
        cid: ConnectionId,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Ics04Error> {
        self.connection_channels
            .entry(cid)
            .or_default()
            .push((port_id.clone(), channel_id.clone()));
        Ok(())
    }

    fn store_channel(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        channel_end: &ChannelEnd,
    ) -> Result<(), Ics04Error> {
        self.channels
            .insert((port_id.clone(), channel_id.clone()), channel_end.clone());
        Ok(())
    }

    fn store_next_sequence_send(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Ics04Error> {
        self.next_sequence_send
            .insert((port_id.clone(), channel_id.clone()), seq);
        Ok(())
    }

    fn store_next_sequence_recv(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Ics04Error> {
        self.next_sequence_recv
            .insert((port_id.clone(), channel_id.clone()), seq);
        Ok(())
    }

    fn store_next_sequence_ack(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        seq: Sequence,
    ) -> Result<(), Ics04Error> {
        self.next_sequence_ack
            .insert((port_id.clone(), channel_id.clone()), seq);
        Ok(())
    }

    fn store_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        upgrade: Upgrade,
    ) -> Result<(), Ics04Error> {
        self.upgrades
            .insert((port_id.clone(), channel_id.clone()), upgrade);
        Ok(())
    }

    fn delete_upgrade(&mut self, port_id: &PortId, channel_id: &ChannelId) -> Result<(), Ics04Error> {
        self.upgrades.remove(&(port_id.clone(), channel_id.clone()));
        Ok(())
    }

    fn store_counterparty_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        upgrade: Upgrade,
    ) -> Result<(), Ics04Error> {
        self.counterparty_upgrades
            .insert((port_id.clone(), channel_id.clone()), upgrade);
        Ok(())
    }

    fn delete_counterparty_upgrade(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Ics04Error> {
        self.counterparty_upgrades
            .remove(&(port_id.clone(), channel_id.clone()));
        Ok(())
    }

    fn store_upgrade_error_receipt(
        &mut self,
        port_id: &PortId,
        channel_id: &ChannelId,
        receipt: ErrorReceipt,
    ) -> Result<(), Ics04Error> {
        self.upgrade_error_receipts
            .insert((port_id.clone(), channel_id.clone()), receipt);
        Ok(())
    }

    fn increase_channel_counter(&mut self) {
        self.channel_ids_counter += 1;
    }
}
