use serde_derive::{Deserialize, Serialize};

use crate::core::ics02_client::client_consensus::ConsensusState;
use crate::core::ics23_commitment::commitment::CommitmentRoot;
use crate::timestamp::Timestamp;
use crate::Height;

/// What a mock light client learns about a block of the chain it follows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockHeader {
    pub height: Height,
    pub timestamp: Timestamp,
    pub root: CommitmentRoot,
}

impl MockHeader {
    pub fn height(&self) -> Height {
        self.height
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl From<MockHeader> for ConsensusState {
    fn from(h: MockHeader) -> Self {
        ConsensusState::new(h.root, h.timestamp)
    }
}
