//! ICS 23: Vector Commitment Scheme. Only the opaque byte containers exchanged between the
//! channel layer and the light clients live here; proof verification itself belongs to the
//! clients (see `ClientReader::verify_membership`).

pub mod commitment;
pub mod error;
