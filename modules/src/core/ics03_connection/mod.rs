//! ICS 03: Connection. Channels are layered over connections; the channel handlers only read
//! connection ends, they never drive the connection handshake.

pub mod connection;
pub mod context;
pub mod error;
pub mod version;
