//! The designation "core" is used to refer to the IBC modules that the channel layer either
//! implements (ICS 04) or consumes through context traits (ICS 02, 03, 05, 23, 24, 26).

pub mod ics02_client;
pub mod ics03_connection;
pub mod ics04_channel;
pub mod ics05_port;
pub mod ics23_commitment;
pub mod ics24_host;
pub mod ics26_routing;
