use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::upgrade::{UpgradeFields, UpgradeTimeout};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeInit";

///
/// Message definition for the first step of the channel upgrade handshake, taken by the
/// application owning the channel.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeInit {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub fields: UpgradeFields,
    /// Deadline on the counterparty chain. When absent, the host default applies.
    pub timeout: Option<UpgradeTimeout>,
}

impl MsgChannelUpgradeInit {
    pub fn new(
        port_id: PortId,
        channel_id: ChannelId,
        fields: UpgradeFields,
        timeout: Option<UpgradeTimeout>,
    ) -> Self {
        Self {
            port_id,
            channel_id,
            fields,
            timeout,
        }
    }
}

impl Msg for MsgChannelUpgradeInit {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.fields.connection_hop()?;
        match &self.timeout {
            Some(timeout) if !timeout.is_valid() => Err(Error::upgrade_timeout_not_set()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::core::ics04_channel::channel::Order;
    use crate::core::ics24_host::identifier::ConnectionId;

    #[test]
    fn upgrade_init_validate_basic() {
        let fields = UpgradeFields::new(Order::Ordered, vec![ConnectionId::default()], "v2".into());
        let msg = MsgChannelUpgradeInit::new(
            PortId::default(),
            ChannelId::default(),
            fields.clone(),
            None,
        );
        assert!(msg.validate_basic().is_ok());

        let unset = MsgChannelUpgradeInit {
            timeout: Some(UpgradeTimeout::default()),
            ..msg.clone()
        };
        assert!(unset.validate_basic().is_err());

        let no_hops = MsgChannelUpgradeInit {
            fields: UpgradeFields {
                connection_hops: vec![],
                ..fields
            },
            ..msg
        };
        assert!(no_hops.validate_basic().is_err());
    }
}
