use crate::prelude::*;

use flex_error::define_error;

use crate::core::ics04_channel;
use crate::core::ics05_port;
use crate::core::ics26_routing::context::ModuleId;

define_error! {
    #[derive(Debug, PartialEq, Eq)]
    Error {
        Ics04Channel
            [ ics04_channel::error::Error ]
            | _ | { "ICS04 channel error" },

        Ics05Port
            [ ics05_port::error::Error ]
            | _ | { "ICS05 port error" },

        RouteNotFound
            { module_id: ModuleId }
            | e | { format_args!("no module is registered under the route {0}", e.module_id) },

        InvalidModuleId
            { module_id: String }
            | e | { format_args!("invalid module identifier '{0}'", e.module_id) },
    }
}
