use flex_error::define_error;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        EmptyCommitmentPrefix
            | _ | { "empty commitment prefix" },

        EmptyMerkleProof
            | _ | { "empty merkle proof" },

        EmptyMerkleRoot
            | _ | { "empty merkle root" },
    }
}
