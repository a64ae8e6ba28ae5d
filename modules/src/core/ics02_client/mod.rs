//! ICS 02: Client. The channel layer never creates or updates light clients; it only reads
//! their latest state and asks them to verify proofs against a stored consensus root.

pub mod client_consensus;
pub mod client_state;
pub mod context;
pub mod error;
pub mod height;
