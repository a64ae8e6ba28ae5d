//! ICS3 (connection) context. The channel handlers only need to read connection ends.

use crate::core::ics03_connection::connection::ConnectionEnd;
use crate::core::ics03_connection::error::Error;
use crate::core::ics24_host::identifier::ConnectionId;

/// A context supplying all the necessary read-only dependencies for the channel layer to
/// consult the connections it is layered over.
pub trait ConnectionReader {
    /// Returns the ConnectionEnd for the given identifier `conn_id`.
    fn connection_end(&self, conn_id: &ConnectionId) -> Result<ConnectionEnd, Error>;
}
