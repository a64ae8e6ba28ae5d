use crate::prelude::*;

use flex_error::define_error;

use crate::core::ics24_host::identifier::ConnectionId;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        ConnectionNotFound
            { connection_id: ConnectionId }
            | e | {
                format_args!("no connection was found for the previous connection id provided {0}",
                    e.connection_id)
            },

        MissingCounterpartyConnectionId
            | _ | { "missing counterparty connection id" },

        NoCommonVersion
            | _ | { "no common version" },
    }
}
