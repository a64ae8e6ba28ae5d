//! Proof verification of the mock light client, against `MockProvableStore` snapshots.

use crate::prelude::*;

use sha2::{Digest, Sha256};

use crate::core::ics02_client::error::Error;
use crate::core::ics23_commitment::commitment::{
    CommitmentPrefix, CommitmentProofBytes, CommitmentRoot,
};
use crate::core::ics24_host::Path;
use crate::mock::host::{prefixed_key, MockProvableStore};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockClient;

impl MockClient {
    fn open(
        &self,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
    ) -> Result<MockProvableStore, Error> {
        if Sha256::digest(proof.as_bytes()).as_slice() != root.as_bytes() {
            return Err(Error::root_mismatch());
        }

        MockProvableStore::decode_vec(proof.as_bytes())
            .map_err(|e| Error::invalid_proof_encoding(e.to_string()))
    }

    pub fn verify_membership(
        &self,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
        value: Vec<u8>,
    ) -> Result<(), Error> {
        let store = self.open(proof, root)?;
        let key = prefixed_key(prefix, &path);

        match store.get(&key) {
            Some(committed) if committed == &value => Ok(()),
            _ => Err(Error::membership_verification_failed(key)),
        }
    }

    pub fn verify_non_membership(
        &self,
        prefix: &CommitmentPrefix,
        proof: &CommitmentProofBytes,
        root: &CommitmentRoot,
        path: Path,
    ) -> Result<(), Error> {
        let store = self.open(proof, root)?;
        let key = prefixed_key(prefix, &path);

        match store.get(&key) {
            None => Ok(()),
            Some(_) => Err(Error::non_membership_verification_failed(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::core::ics02_client::error::ErrorDetail;
    use crate::core::ics24_host::identifier::ConnectionId;

    #[test]
    fn verification_against_a_snapshot() {
        let path = Path::Connections(ConnectionId::new(0));
        let store = MockProvableStore::default().with(path.clone(), vec![7]);
        let prefix = CommitmentPrefix::default();
        let client = MockClient;

        assert!(client
            .verify_membership(&prefix, &store.proof(), &store.root(), path.clone(), vec![7])
            .is_ok());
        assert!(client
            .verify_membership(&prefix, &store.proof(), &store.root(), path.clone(), vec![8])
            .is_err());
        assert!(client
            .verify_non_membership(
                &prefix,
                &store.proof(),
                &store.root(),
                Path::Connections(ConnectionId::new(1))
            )
            .is_ok());

        let other = MockProvableStore::default();
        let res = client.verify_membership(&prefix, &store.proof(), &other.root(), path, vec![7]);
        assert!(matches!(
            res.unwrap_err().detail(),
            ErrorDetail::RootMismatch(_)
        ));
    }
}
