//! ICS2 (client) context. The `ClientReader` trait is what a host exposes of its light clients
//! to the channel handlers: state reads plus the two proof verification primitives.

use crate::core::ics02_client::client_consensus::ConsensusState;
use crate::core::ics02_client::client_state::ClientState;
use crate::core::ics02_client::error::Error;
use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics24_host::identifier::ClientId;
use crate::core::ics24_host::Path;
use crate::prelude::*;
use crate::Height;

/// Defines the read-only part of ICS2 (client functions) context.
pub trait ClientReader {
    /// Returns the ClientState for the given identifier `client_id`.
    fn client_state(&self, client_id: &ClientId) -> Result<ClientState, Error>;

    /// Retrieve the consensus state for the given client ID at the specified
    /// height.
    ///
    /// Returns an error if no such state exists.
    fn client_consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<ConsensusState, Error>;

    /// Verify that `value` is committed under `prefix`/`path` in the counterparty state
    /// committed to by `root`.
    fn verify_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
        value: Vec<u8>,
    ) -> Result<(), Error>;

    /// Verify that nothing is committed under `prefix`/`path` in the counterparty state
    /// committed to by `root`.
    fn verify_non_membership(
        &self,
        client_id: &ClientId,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
    ) -> Result<(), Error>;
}
