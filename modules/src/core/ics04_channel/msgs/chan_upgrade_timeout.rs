use crate::prelude::*;

use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::error::Error;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeTimeout";

///
/// Message definition for abandoning an upgrade the counterparty did not move along in time.
/// The proof is of `counterparty_channel`.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeTimeout {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub counterparty_channel: ChannelEnd,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeTimeout {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}
