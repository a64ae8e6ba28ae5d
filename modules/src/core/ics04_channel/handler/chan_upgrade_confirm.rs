//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeConfirm`.

use tracing::info;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{UpgradeConfirm, UpgradeOpen};
use crate::core::ics04_channel::handler::verify::{
    counterparty_consensus_state, verify_channel_proofs,
};
use crate::core::ics04_channel::handler::{
    abort_upgrade, counterparty_connection_id, open_connection, sequence_reset,
    upgrade_attributes, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_confirm::MsgChannelUpgradeConfirm;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeConfirm,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    if !channel_end.state_matches(&State::TryUpgrade) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;
    let upgrade = ctx.get_upgrade(&msg.port_id, &msg.channel_id)?;

    let expected_channel_end = ChannelEnd::new(
        State::AckUpgrade,
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

    let reset = sequence_reset(ctx, &msg.port_id, &msg.channel_id, &channel_end, &upgrade.fields)?;
    channel_end.apply_upgrade_fields(upgrade.fields);
    channel_end.set_state(State::Open);

    output.log("success: channel upgrade confirm");
    info!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        version = %channel_end.version,
        "channel upgrade completed"
    );

    let attributes = upgrade_attributes(
        &msg.port_id,
        &msg.channel_id,
        &channel_end,
        channel_end.upgrade_fields(),
    );
    output.emit(UpgradeConfirm(attributes.clone()).into());
    output.emit(UpgradeOpen(attributes).into());

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::Completed(reset),
    };

    Ok(output.with_result(result))
}
