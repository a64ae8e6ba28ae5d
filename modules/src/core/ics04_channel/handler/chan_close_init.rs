//! Protocol logic specific to processing ICS4 messages of type `MsgChannelCloseInit`.

use tracing::info;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{Attributes, CloseInit};
use crate::core::ics04_channel::handler::{open_connection, ChannelIdState, ChannelResult};
use crate::core::ics04_channel::msgs::chan_close_init::MsgChannelCloseInit;
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

/// Closes the channel end on behalf of the application holding `capability`.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    msg: &MsgChannelCloseInit,
) -> HandlerResult<ChannelResult, Error> {
    let mut output = HandlerOutput::builder();

    // Unwrap the old channel end and validate it against the message.
    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    ctx.authenticate_channel_capability(&msg.port_id, &msg.channel_id, capability)?;

    // Validate that the channel end is in a state where it can be closed.
    if channel_end.state_matches(&State::Closed) {
        return Err(Error::channel_closed(msg.channel_id.clone()));
    }

    open_connection(ctx, &channel_end)?;

    output.log("success: channel close init");

    channel_end.set_state(State::Closed);

    info!(port_id = %msg.port_id, channel_id = %msg.channel_id, "channel closed");

    output.emit(
        CloseInit(Attributes {
            port_id: msg.port_id.clone(),
            channel_id: Some(msg.channel_id.clone()),
            connection_id: channel_end.connection_hop()?.clone(),
            counterparty_port_id: channel_end.counterparty().port_id().clone(),
            counterparty_channel_id: channel_end.counterparty().channel_id().cloned(),
        })
        .into(),
    );

    let result = ChannelResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_id_state: ChannelIdState::Reused,
        channel_end,
    };

    Ok(output.with_result(result))
}
