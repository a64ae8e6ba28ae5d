use crate::prelude::*;

/// Common surface of the datagrams handled by the channel layer.
pub trait Msg: Clone {
    type ValidationError;

    fn route(&self) -> String;

    fn type_url(&self) -> String;

    /// Stateless checks, run before the message is routed to a handler.
    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        Ok(())
    }
}
