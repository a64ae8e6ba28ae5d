//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeTimeout`.

use tracing::warn;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{UpgradeError, UpgradeTimeout};
use crate::core::ics04_channel::handler::verify::{
    counterparty_consensus_state, verify_channel_proofs,
};
use crate::core::ics04_channel::handler::{
    fields_match_counterparty, open_connection, upgrade_attributes, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_timeout::MsgChannelUpgradeTimeout;
use crate::core::ics04_channel::upgrade::ErrorReceipt;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

/// Abandons an upgrade the counterparty did not move along before the deadline.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeTimeout,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    // Once acknowledged, only the counterparty can decide the outcome.
    if !matches!(channel_end.state, State::InitUpgrade | State::TryUpgrade) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;
    let upgrade = ctx.get_upgrade(&msg.port_id, &msg.channel_id)?;

    let consensus_state = counterparty_consensus_state(ctx, &conn, msg.proofs.height())?;
    if !upgrade
        .timeout
        .has_elapsed(msg.proofs.height(), &consensus_state.timestamp())
    {
        return Err(Error::upgrade_timeout_not_reached());
    }

    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &msg.counterparty_channel,
    )?;

    let counterparty = &msg.counterparty_channel;
    if counterparty.state_matches(&State::Open)
        && counterparty.upgrade_sequence() >= channel_end.upgrade_sequence()
        && fields_match_counterparty(ctx, &upgrade.fields, &counterparty.upgrade_fields())?
    {
        return Err(Error::counterparty_upgrade_completed());
    }

    let receipt = ErrorReceipt::new(channel_end.upgrade_sequence(), "upgrade timed out");
    channel_end.set_state(State::Open);

    output.log(format!(
        "success: channel upgrade timed out at sequence {}",
        receipt.sequence
    ));
    warn!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %receipt.sequence,
        "channel upgrade timed out"
    );

    output.emit(
        UpgradeTimeout(upgrade_attributes(
            &msg.port_id,
            &msg.channel_id,
            &channel_end,
            upgrade.fields,
        ))
        .into(),
    );
    output.emit(
        UpgradeError {
            port_id: msg.port_id.clone(),
            channel_id: msg.channel_id.clone(),
            upgrade_sequence: receipt.sequence,
            message: receipt.message.clone(),
        }
        .into(),
    );

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::TimedOut(receipt),
    };

    Ok(output.with_result(result))
}
