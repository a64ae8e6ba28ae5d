//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeOpen`.

use tracing::info;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::UpgradeOpen;
use crate::core::ics04_channel::handler::verify::verify_channel_proofs;
use crate::core::ics04_channel::handler::{
    counterparty_connection_id, open_connection, sequence_reset, upgrade_attributes,
    UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_open::MsgChannelUpgradeOpen;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelUpgradeOpen,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    if !channel_end.state_matches(&State::AckUpgrade) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    let conn = open_connection(ctx, &channel_end)?;
    let upgrade = ctx.get_upgrade(&msg.port_id, &msg.channel_id)?;
    let counterparty = Counterparty::new(msg.port_id.clone(), Some(msg.channel_id.clone()));

    let expected_channel_end = match msg.counterparty_channel_state {
        // The counterparty confirmed and runs with the upgraded fields.
        State::Open => {
            let upgrade_conn = ctx
                .connection_end(upgrade.fields.connection_hop()?)
                .map_err(Error::ics03_connection)?;
            ChannelEnd::new(
                State::Open,
                upgrade.fields.ordering,
                counterparty,
                vec![counterparty_connection_id(&upgrade_conn)?],
                upgrade.fields.version.clone(),
            )
        }
        // Both ends acknowledged after crossing hellos.
        State::AckUpgrade => ChannelEnd::new(
            State::AckUpgrade,
            channel_end.ordering,
            counterparty,
            vec![counterparty_connection_id(&conn)?],
            channel_end.version.clone(),
        ),
        state => return Err(Error::invalid_channel_state(msg.channel_id.clone(), state)),
    }
    .with_upgrade_sequence(channel_end.upgrade_sequence());

    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &expected_channel_end,
    )?;

    let reset = sequence_reset(ctx, &msg.port_id, &msg.channel_id, &channel_end, &upgrade.fields)?;
    channel_end.apply_upgrade_fields(upgrade.fields);
    channel_end.set_state(State::Open);

    output.log("success: channel upgrade open");
    info!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        version = %channel_end.version,
        "channel upgrade completed"
    );

    output.emit(
        UpgradeOpen(upgrade_attributes(
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
        step: UpgradeStep::Completed(reset),
    };

    Ok(output.with_result(result))
}
