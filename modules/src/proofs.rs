use crate::prelude::*;

use flex_error::define_error;
use serde_derive::{Deserialize, Serialize};

use crate::core::ics23_commitment::commitment::CommitmentProofBytes;
use crate::Height;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    ProofError {
        ZeroHeight
            | _ | { "proof height cannot be zero" },

        EmptyProof
            | _ | { "proof cannot be empty" },
    }
}

/// Structure comprising proofs in a message. Proofs are carried by relayers and produced
/// by the counterparty chain at `height`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proofs {
    object_proof: CommitmentProofBytes,
    /// Second proof taken at the same height, e.g. of the counterparty upgrade next to its
    /// channel end.
    other_proof: Option<CommitmentProofBytes>,
    /// Height for both the above proofs
    height: Height,
}

impl Proofs {
    pub fn new(
        object_proof: CommitmentProofBytes,
        other_proof: Option<CommitmentProofBytes>,
        height: Height,
    ) -> Result<Self, ProofError> {
        if height.revision_height() == 0 {
            return Err(ProofError::zero_height());
        }
        if object_proof.as_bytes().is_empty() {
            return Err(ProofError::empty_proof());
        }

        Ok(Self {
            object_proof,
            other_proof,
            height,
        })
    }

    /// Getter for the object_proof field
    pub fn object_proof(&self) -> &CommitmentProofBytes {
        &self.object_proof
    }

    /// Getter for the other_proof field. Fails if the message carries a single proof.
    pub fn other_proof(&self) -> Result<&CommitmentProofBytes, ProofError> {
        self.other_proof.as_ref().ok_or_else(ProofError::empty_proof)
    }

    /// Getter for the height field
    pub fn height(&self) -> Height {
        self.height
    }
}
