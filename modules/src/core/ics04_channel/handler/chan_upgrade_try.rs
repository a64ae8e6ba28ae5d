//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeTry`.

use tracing::debug;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::UpgradeTry;
use crate::core::ics04_channel::handler::verify::{verify_channel_proofs, verify_upgrade_proofs};
use crate::core::ics04_channel::handler::{
    abort_upgrade, counterparty_connection_id, ensure_flushed, open_connection,
    upgrade_attributes, validate_upgrade_fields, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_try::MsgChannelUpgradeTry;
use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics04_channel::upgrade::{is_compatible, Upgrade, UpgradeFields};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeTry,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    if !matches!(channel_end.state, State::Open | State::InitUpgrade) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;

    // The counterparty set this deadline in terms of the local chain.
    if msg
        .counterparty_upgrade
        .timeout
        .has_elapsed(ctx.host_height(), &ctx.host_timestamp())
    {
        return Err(Error::upgrade_timeout_elapsed());
    }

    let proposed_fields = UpgradeFields::new(
        msg.counterparty_upgrade.fields.ordering,
        msg.proposed_connection_hops.clone(),
        msg.counterparty_upgrade.fields.version.clone(),
    );
    validate_upgrade_fields(ctx, &proposed_fields, &channel_end)?;

    // The proposed connection must be the local end of the one the counterparty proposed.
    let proposed_conn = ctx
        .connection_end(proposed_fields.connection_hop()?)
        .map_err(Error::ics03_connection)?;
    let expected_hop = msg.counterparty_upgrade.fields.connection_hop()?;
    let actual_hop = counterparty_connection_id(&proposed_conn)?;
    if &actual_hop != expected_hop {
        return Err(Error::connection_hops_mismatch(
            expected_hop.clone(),
            actual_hop,
        ));
    }

    // The counterparty proposed with its pre-upgrade fields.
    let expected_channel_end = ChannelEnd::new(
        State::InitUpgrade,
        channel_end.ordering,
        Counterparty::new(msg.port_id.clone(), Some(msg.channel_id.clone())),
        vec![counterparty_connection_id(&conn)?],
        channel_end.version.clone(),
    )
    .with_upgrade_sequence(msg.counterparty_upgrade_sequence);

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

    let upgrade = if channel_end.state_matches(&State::Open) {
        // The local proposal starts at the next sequence, which the counterparty must
        // not be behind.
        if msg.counterparty_upgrade_sequence <= channel_end.upgrade_sequence() {
            let error = Error::invalid_upgrade_sequence(
                msg.counterparty_upgrade_sequence,
                channel_end.upgrade_sequence().increment(),
            );
            let result =
                abort_upgrade(&mut output, &msg.port_id, &msg.channel_id, channel_end, error);
            return Ok(output.with_result(result));
        }
        channel_end.upgrade_sequence = msg.counterparty_upgrade_sequence;

        let next_seq_send = ctx.get_next_sequence_send(&msg.port_id, &msg.channel_id)?;
        Upgrade::new(
            proposed_fields,
            msg.upgrade_timeout,
            Sequence::from(next_seq_send.value().saturating_sub(1)),
        )
    } else {
        // Crossing hellos: both ends proposed. Keep the local proposal if the two agree.
        let local = ctx.get_upgrade(&msg.port_id, &msg.channel_id)?;
        if msg.counterparty_upgrade_sequence > channel_end.upgrade_sequence() {
            channel_end.upgrade_sequence = msg.counterparty_upgrade_sequence;
        }

        if !is_compatible(&local.fields, &msg.counterparty_upgrade.fields)
            || local.fields.connection_hops != proposed_fields.connection_hops
        {
            let result = abort_upgrade(
                &mut output,
                &msg.port_id,
                &msg.channel_id,
                channel_end,
                Error::incompatible_upgrade(),
            );
            return Ok(output.with_result(result));
        }
        local
    };

    ensure_flushed(ctx, &msg.port_id, &msg.channel_id, &channel_end, &upgrade.fields)?;

    channel_end.set_state(State::TryUpgrade);

    output.log(format!(
        "success: channel upgrade try at sequence {}",
        channel_end.upgrade_sequence()
    ));
    debug!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        "channel upgrade try"
    );

    output.emit(
        UpgradeTry(upgrade_attributes(
            &msg.port_id,
            &msg.channel_id,
            &channel_end,
            upgrade.fields.clone(),
        ))
        .into(),
    );

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::Answered {
            upgrade,
            counterparty: msg.counterparty_upgrade.clone(),
        },
    };

    Ok(output.with_result(result))
}
