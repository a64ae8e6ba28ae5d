//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeCancel`.

use tracing::warn;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::UpgradeCancel;
use crate::core::ics04_channel::handler::verify::verify_error_receipt_proofs;
use crate::core::ics04_channel::handler::{
    open_connection, upgrade_attributes, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_cancel::MsgChannelUpgradeCancel;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

/// Restores the channel end after the counterparty aborted the upgrade and proved it with
/// an error receipt.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeCancel,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    if !channel_end.state.is_upgrading() {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    // A receipt of an older attempt does not cancel the current one.
    if msg.error_receipt.sequence < channel_end.upgrade_sequence() {
        return Err(Error::invalid_upgrade_sequence(
            msg.error_receipt.sequence,
            channel_end.upgrade_sequence(),
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;

    verify_error_receipt_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &msg.error_receipt,
    )?;

    channel_end.set_state(State::Open);
    channel_end.upgrade_sequence = msg.error_receipt.sequence;

    output.log(format!(
        "success: channel upgrade cancelled: {}",
        msg.error_receipt.message
    ));
    warn!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        "channel upgrade cancelled by the counterparty: {}",
        msg.error_receipt.message
    );

    output.emit(
        UpgradeCancel(upgrade_attributes(
            &msg.port_id,
            &msg.channel_id,
            &channel_end,
            channel_end.upgrade_fields(),
        ))
        .into(),
    );

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::Cancelled,
    };

    Ok(output.with_result(result))
}
