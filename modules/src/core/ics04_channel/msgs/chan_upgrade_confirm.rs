use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeConfirm";

///
/// Message definition for the fourth step of the channel upgrade handshake, completing the
/// upgrade on the chain that accepted the proposal.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeConfirm {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeConfirm {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}
