use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics04_channel::upgrade::{Upgrade, UpgradeTimeout};
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeTry";

///
/// Message definition for the second step of the channel upgrade handshake.
///
/// `proofs.object_proof()` proves the counterparty channel end and `proofs.other_proof()`
/// proves the counterparty upgrade.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeTry {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub proposed_connection_hops: Vec<ConnectionId>,
    pub upgrade_timeout: UpgradeTimeout,
    pub counterparty_upgrade: Upgrade,
    pub counterparty_upgrade_sequence: Sequence,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeTry {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        if self.proposed_connection_hops.len() != 1 {
            return Err(Error::invalid_connection_hops_length(
                1,
                self.proposed_connection_hops.len(),
            ));
        }
        if !self.upgrade_timeout.is_valid() {
            return Err(Error::upgrade_timeout_not_set());
        }
        self.proofs.other_proof().map_err(Error::invalid_proof)?;
        Ok(())
    }
}
