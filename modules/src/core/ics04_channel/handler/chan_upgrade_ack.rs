//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeAck`.

use tracing::debug;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::UpgradeAck;
use crate::core::ics04_channel::handler::verify::{
    counterparty_consensus_state, verify_channel_proofs, verify_upgrade_proofs,
};
use crate::core::ics04_channel::handler::{
    abort_upgrade, counterparty_connection_id, ensure_flushed, fields_match_counterparty,
    open_connection, upgrade_attributes, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_ack::MsgChannelUpgradeAck;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeAck,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    // TRYUPGRADE is reached first by both ends after crossing hellos.
    if !matches!(channel_end.state, State::InitUpgrade | State::TryUpgrade) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;
    let upgrade = ctx.get_upgrade(&msg.port_id, &msg.channel_id)?;

    let expected_channel_end = ChannelEnd::new(
        State::TryUpgrade,
        channel_end.ordering,
        Counterparty::new(msg.port_id.clone(), Some(msg.channel_id.clone())),
        vec![counterparty_connection_id(&conn)?],
        channel_end.version.clone(),
    )
    .with_upgrade_sequence(channel_end.upgrade_sequence());

    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &expected_channel_end,
    )?;
    verify_upgrade_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.other_proof().map_err(Error::invalid_proof)?,
        &channel_end,
        &conn,
        &msg.counterparty_upgrade,
    )?;

    if !fields_match_counterparty(ctx, &upgrade.fields, &msg.counterparty_upgrade.fields)? {
        let result = abort_upgrade(
            &mut output,
            &msg.port_id,
            &msg.channel_id,
            channel_end,
            Error::incompatible_upgrade(),
        );
        return Ok(output.with_result(result));
    }

    // The local deadline is measured on the counterparty chain.
    let consensus_state = counterparty_consensus_state(ctx, &conn, msg.proofs.height())?;
    if upgrade
        .timeout
        .has_elapsed(msg.proofs.height(), &consensus_state.timestamp())
    {
        let result = abort_upgrade(
            &mut output,
            &msg.port_id,
            &msg.channel_id,
            channel_end,
            Error::upgrade_timeout_elapsed(),
        );
        return Ok(output.with_result(result));
    }

    ensure_flushed(ctx, &msg.port_id, &msg.channel_id, &channel_end, &upgrade.fields)?;

    channel_end.set_state(State::AckUpgrade);

    output.log("success: channel upgrade ack");
    debug!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        "channel upgrade ack"
    );

    output.emit(
        UpgradeAck(upgrade_attributes(
            &msg.port_id,
            &msg.channel_id,
            &channel_end,
            upgrade.fields,
        ))
        .into(),
    );

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::Acknowledged(msg.counterparty_upgrade.clone()),
    };

    Ok(output.with_result(result))
}
