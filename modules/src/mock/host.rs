//! Host chain types and methods, used by context mock.

use crate::prelude::*;

use alloc::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics24_host::Path;
use crate::mock::header::MockHeader;
use crate::timestamp::Timestamp;
use crate::Height;

/// Timestamp of the (virtual) genesis block of every mock chain, in nanoseconds.
pub const GENESIS_TIMESTAMP_NANOS: u64 = 1_650_000_000_000_000_000;

/// Interval between two consecutive mock blocks, in nanoseconds.
pub const BLOCK_INTERVAL_NANOS: u64 = 5_000_000_000;

/// Mock chains produce blocks at a fixed pace, so that timeouts are reproducible.
pub fn block_timestamp(height: Height) -> Timestamp {
    let nanos = GENESIS_TIMESTAMP_NANOS + height.revision_height * BLOCK_INTERVAL_NANOS;
    Timestamp::from_nanoseconds(nanos).unwrap_or_default()
}

/// Key under which `path` is committed in a store using `prefix`.
pub fn prefixed_key(prefix: &CommitmentPrefix, path: &Path) -> String {
    format!("{}/{}", String::from_utf8_lossy(prefix.as_bytes()), path)
}

/// A snapshot of all provable paths of a store. Its proof is its own canonical encoding, and
/// its root the hash of that encoding, so a proof opens to a root iff it describes exactly
/// the committed snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockProvableStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MockProvableStore {
    /// Commits `value` under `path`, with the default commitment prefix.
    pub fn with(mut self, path: Path, value: Vec<u8>) -> Self {
        self.insert(&CommitmentPrefix::default(), path, value);
        self
    }

    pub fn insert(&mut self, prefix: &CommitmentPrefix, path: Path, value: Vec<u8>) {
        self.entries.insert(prefixed_key(prefix, &path), value);
    }

    pub fn get(&self, key: &str) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    pub fn encode_vec(&self) -> Vec<u8> {
        serde_json::to_vec(&self.entries).unwrap_or_default()
    }

    pub fn decode_vec(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_slice(bytes)?,
        })
    }

    pub fn root(&self) -> CommitmentRoot {
        CommitmentRoot::from_bytes(&Sha256::digest(self.encode_vec()))
    }

    /// The proof for any path of this snapshot, present or absent.
    pub fn proof(&self) -> CommitmentProofBytes {
        CommitmentProofBytes::try_from(self.encode_vec()).unwrap_or_else(|_| {
            unreachable!("a serialized map is never empty")
        })
    }
}

/// A block of a mock host chain: its header and the store it committed to.
#[derive(Clone, Debug)]
pub struct HostBlock {
    pub height: Height,
    pub timestamp: Timestamp,
    pub store: MockProvableStore,
}

impl HostBlock {
    /// Generates a new block at `height` committing to `store`.
    pub fn generate_block(height: Height, store: MockProvableStore) -> HostBlock {
        HostBlock {
            height,
            timestamp: block_timestamp(height),
            store,
        }
    }

    /// Returns the height of a block.
    pub fn height(&self) -> Height {
        self.height
    }

    /// The header a light client of this chain learns the block from.
    pub fn header(&self) -> MockHeader {
        MockHeader {
            height: self.height,
            timestamp: self.timestamp,
            root: self.store.root(),
        }
    }

    pub fn proof(&self) -> CommitmentProofBytes {
        self.store.proof()
    }
}
