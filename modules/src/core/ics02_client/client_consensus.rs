use serde_derive::{Deserialize, Serialize};

use crate::core::ics23_commitment::commitment::CommitmentRoot;
use crate::timestamp::Timestamp;

/// A counterparty consensus state, as tracked by a light client at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    pub root: CommitmentRoot,
    pub timestamp: Timestamp,
}

impl ConsensusState {
    pub fn new(root: CommitmentRoot, timestamp: Timestamp) -> Self {
        Self { root, timestamp }
    }

    pub fn root(&self) -> &CommitmentRoot {
        &self.root
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
