use crate::prelude::*;

use flex_error::define_error;

use crate::core::ics24_host::identifier::ClientId;
use crate::Height;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        ClientNotFound
            { client_id: ClientId }
            | e | { format_args!("client not found: {0}", e.client_id) },

        ConsensusStateNotFound
            { client_id: ClientId, height: Height }
            | e | {
                format_args!("consensus state not found at: {0} at height {1}",
                    e.client_id, e.height)
            },

        ClientFrozen
            { client_id: ClientId }
            | e | { format_args!("the client {0} is frozen", e.client_id) },

        InvalidHeight
            | _ | { "height cannot end up zero or negative" },

        InvalidHeightResult
            | _ | { "height of the resulting block is not a valid height" },

        InvalidProofEncoding
            { reason: String }
            | e | { format_args!("the proof could not be decoded: {0}", e.reason) },

        RootMismatch
            | _ | { "the proof does not open to the expected commitment root" },

        MembershipVerificationFailed
            { path: String }
            | e | {
                format_args!("the value committed at path {0} does not match the expected value",
                    e.path)
            },

        NonMembershipVerificationFailed
            { path: String }
            | e | {
                format_args!("a value is committed at path {0} although it was expected to be absent",
                    e.path)
            },
    }
}
