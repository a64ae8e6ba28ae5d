use crate::prelude::*;

use core::fmt::Display;

use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::channel::Order;

/// Stores the identifier and the features supported by a version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// unique version identifier
    identifier: String,
    /// list of features compatible with the specified identifier
    features: Vec<String>,
}

impl Version {
    pub fn new(identifier: String, features: Vec<String>) -> Self {
        Self {
            identifier,
            features,
        }
    }

    /// Checks whether or not the given feature is supported in this version
    pub fn is_supported_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Whether channels with the given ordering may be opened over a connection using this
    /// version.
    pub fn supports_order(&self, order: Order) -> bool {
        self.is_supported_feature(order.as_str())
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Default for Version {
    fn default() -> Self {
        Version {
            identifier: "1".to_string(),
            features: vec![
                Order::Ordered.as_str().to_string(),
                Order::Unordered.as_str().to_string(),
            ],
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.identifier)
    }
}

/// Returns the lists of supported versions
pub fn get_compatible_versions() -> Vec<Version> {
    vec![Version::default()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn default_version_supports_both_orderings() {
        let version = Version::default();
        assert!(version.supports_order(Order::Ordered));
        assert!(version.supports_order(Order::Unordered));

        let unordered_only = Version::new("1".to_string(), vec!["ORDER_UNORDERED".to_string()]);
        assert!(!unordered_only.supports_order(Order::Ordered));
    }
}
