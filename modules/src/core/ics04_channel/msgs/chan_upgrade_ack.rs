use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::upgrade::Upgrade;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeAck";

///
/// Message definition for the third step of the channel upgrade handshake.
///
/// `proofs.object_proof()` proves the counterparty channel end and `proofs.other_proof()`
/// proves the counterparty upgrade.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeAck {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub counterparty_upgrade: Upgrade,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeAck {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.proofs.other_proof().map_err(Error::invalid_proof)?;
        Ok(())
    }
}
