//! ICS 26: Routing module implementation: routes relayed datagrams to the channel handlers
//! and the application modules bound to their ports, and commits each datagram atomically.

pub mod context;
pub mod error;
pub mod handler;
pub mod msgs;
