use crate::prelude::*;

use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::version::Version;
use crate::core::ics24_host::identifier::PortId;
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenTry";

///
/// Message definition for the second step in the channel open handshake (`ChanOpenTry` datagram).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelOpenTry {
    pub port_id: PortId,
    pub channel: ChannelEnd,
    pub counterparty_version: Version,
    pub proofs: Proofs,
}

impl MsgChannelOpenTry {
    pub fn new(
        port_id: PortId,
        channel: ChannelEnd,
        counterparty_version: Version,
        proofs: Proofs,
    ) -> Self {
        Self {
            port_id,
            channel,
            counterparty_version,
            proofs,
        }
    }
}

impl Msg for MsgChannelOpenTry {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.channel.validate_basic()?;
        if self.channel.counterparty().channel_id().is_none() {
            return Err(Error::missing_counterparty_channel_id());
        }
        Ok(())
    }
}
