use crate::prelude::*;

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::upgrade::ErrorReceipt;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelUpgradeCancel";

///
/// Message definition for cancelling an upgrade the counterparty aborted. The proof is of
/// the counterparty's error receipt.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelUpgradeCancel {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub error_receipt: ErrorReceipt,
    pub proofs: Proofs,
}

impl Msg for MsgChannelUpgradeCancel {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }
}
