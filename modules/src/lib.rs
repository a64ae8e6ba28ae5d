#![no_std]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![allow(clippy::large_enum_variant)]
#![deny(trivial_casts, unused_import_braces, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Implementation of the channel layer of IBC and of the host-side pieces it depends on:
//!
//! - ICS 02: Client (the read interface towards light clients and their proof verification)
//! - ICS 03: Connection (read-only connection ends)
//! - ICS 04: Channel (handshake, upgrade handshake and packet lifecycle)
//! - ICS 05: Port (object capabilities)
//! - ICS 23: Vector Commitment Scheme (roots, proofs and prefixes)
//! - ICS 24: Host Requirements (identifiers and the provable path space)
//! - ICS 26: Routing (application callbacks and atomic message delivery)

extern crate alloc;
extern crate std;

mod prelude;

pub mod config;
pub mod core;
pub mod events;
pub mod handler;
pub mod keys;
pub mod proofs;
pub mod serializers;
pub mod timestamp;
pub mod tx_msg;

/// Re-export of ICS 002 Height domain type
pub type Height = crate::core::ics02_client::height::Height;

#[cfg(any(test, feature = "mocks"))]
pub mod test_utils;

#[cfg(any(test, feature = "mocks"))]
pub mod mock; // Context mock, the underlying host chain and a mock light client: for testing all handlers.
