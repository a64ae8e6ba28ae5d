use crate::prelude::*;

use flex_error::define_error;

use crate::core::ics24_host::identifier::PortId;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        UnknownPort
            { port_id: PortId }
            | e | { format_args!("port '{0}' is unknown", e.port_id) },

        PortAlreadyBound
            { port_id: PortId }
            | e | { format_args!("port '{0}' is already bound", e.port_id) },

        CapabilityNotFound
            { name: String }
            | e | { format_args!("no capability is registered under the name '{0}'", e.name) },

        CapabilityAlreadyTaken
            { name: String }
            | e | { format_args!("a capability is already registered under the name '{0}'", e.name) },

        Unauthenticated
            { name: String }
            | e | {
                format_args!("the capability presented does not authenticate against '{0}'",
                    e.name)
            },

        InvalidCapabilityName
            | _ | { "capability names cannot be empty" },
    }
}
