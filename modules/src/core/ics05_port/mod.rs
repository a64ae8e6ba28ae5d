//! ICS 05: Port. Ports bind applications to channel ends; capabilities are the unforgeable
//! handles that authorize an application to act on the channels it owns.

pub mod capabilities;
pub mod context;
pub mod error;
