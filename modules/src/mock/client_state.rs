use crate::prelude::*;

use alloc::collections::BTreeMap;

use crate::core::ics02_client::client_consensus::ConsensusState;
use crate::core::ics02_client::client_state::ClientState;
use crate::mock::header::MockHeader;
use crate::Height;

/// A light client record as it is stored in a mock context: the latest height followed and
/// every consensus state learnt so far.
#[derive(Clone, Debug)]
pub struct MockClientRecord {
    /// The client state (representing only the latest height at the moment).
    pub client_state: ClientState,

    /// Mapping of heights to consensus states for this client.
    pub consensus_states: BTreeMap<Height, ConsensusState>,
}

impl MockClientRecord {
    pub fn new(header: MockHeader) -> Self {
        let mut consensus_states = BTreeMap::new();
        let height = header.height();
        consensus_states.insert(height, header.into());
        Self {
            client_state: ClientState::new(height),
            consensus_states,
        }
    }

    /// Records a newer header. Older headers are stored without moving the latest height.
    pub fn update(&mut self, header: MockHeader) {
        let height = header.height();
        if height > self.client_state.latest_height {
            self.client_state.latest_height = height;
        }
        self.consensus_states.insert(height, header.into());
    }
}
