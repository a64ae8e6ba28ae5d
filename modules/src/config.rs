//! Host parameters of the channel layer.

use crate::prelude::*;

use core::time::Duration;
use std::path::Path;

use flex_error::{define_error, TraceError};
use serde_derive::{Deserialize, Serialize};

define_error! {
    Error {
        Io
            [ TraceError<std::io::Error> ]
            |_| { "config I/O error" },

        Decode
            [ TraceError<toml::de::Error> ]
            |_| { "invalid configuration" },
    }
}

pub mod default {
    use super::*;

    pub fn upgrade_timeout() -> Duration {
        Duration::from_secs(600)
    }
}

/// Parameters a host chain sets for the channel handlers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// Time granted to the counterparty to move along an upgrade handshake, when the
    /// proposer does not give an explicit upgrade timeout.
    #[serde(default = "default::upgrade_timeout", with = "humantime_serde")]
    pub upgrade_timeout: Duration,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            upgrade_timeout: default::upgrade_timeout(),
        }
    }
}

impl Params {
    pub fn from_toml_str(toml: &str) -> Result<Self, Error> {
        toml::from_str::<Params>(toml).map_err(Error::decode)
    }
}

/// Attempt to load and parse the TOML config file as a `Params`.
pub fn parse(path: impl AsRef<Path>) -> Result<Params, Error> {
    let params_toml = std::fs::read_to_string(&path).map_err(Error::io)?;

    Params::from_toml_str(&params_toml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parse_params() {
        let params = Params::from_toml_str(r#"upgrade_timeout = "1h 30m""#).unwrap();
        assert_eq!(params.upgrade_timeout, Duration::from_secs(5400));
    }

    #[test]
    fn missing_fields_take_defaults() {
        assert_eq!(Params::from_toml_str("").unwrap(), Params::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Params::from_toml_str("max_hops = 2").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        match parse("/nonexistent/ibc-channel/params.toml") {
            Err(e) => assert!(matches!(e.detail(), ErrorDetail::Io(_))),
            Ok(params) => panic!("unexpected params {:?}", params),
        }
    }
}
