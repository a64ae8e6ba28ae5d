use crate::prelude::*;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeOpen";

///
/// Message definition for the last step of the channel upgrade handshake.
///
/// The counterparty is either `Open` with the upgraded fields, or `AckUpgrade` when both
/// ends proposed the same upgrade concurrently.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeOpen {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub counterparty_channel_state: State,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeOpen {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        match self.counterparty_channel_state {
            State::Open | State::AckUpgrade => Ok(()),
            state => Err(Error::invalid_channel_state(self.channel_id.clone(), state)),
        }
    }
}
