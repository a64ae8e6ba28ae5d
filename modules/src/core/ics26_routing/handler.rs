//! Delivery of relayed datagrams and of the calls applications make into the channel layer.
//!
//! Each datagram is one state transition: the channel handler checks it against the host
//! state, the module bound to the port runs its callback, and only when both succeed is the
//! result written through the `ChannelKeeper`. A failing datagram writes nothing.

use tracing::debug;

use crate::core::ics04_channel::context::{ChannelKeeper, ChannelReader};
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::handler::{
    chan_close_init, chan_upgrade_init, channel_dispatch, packet_dispatch, send_packet,
    upgrade_dispatch, write_acknowledgement, UpgradeStep,
};
use crate::core::ics04_channel::msgs::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::msgs::chan_close_init::MsgChannelCloseInit;
use crate::core::ics04_channel::msgs::chan_upgrade_init::MsgChannelUpgradeInit;
use crate::core::ics04_channel::msgs::{ChannelMsg, PacketMsg, UpgradeMsg};
use crate::core::ics04_channel::packet::{OutgoingPacket, Packet, PacketResult, Sequence};
use crate::core::ics05_port::capabilities::{CapabilityName, ChannelCapability};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::core::ics26_routing::context::{
    Ics26Context, Module, ModuleId, ModuleOutputBuilder, Router,
};
use crate::core::ics26_routing::error::Error as RouterError;
use crate::core::ics26_routing::msgs::Ics26Envelope;
use crate::events::IbcEvent;
use crate::handler::{HandlerOutput, HandlerOutputBuilder};
use crate::prelude::*;

/// How a delivered datagram changed the host state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The datagram took effect.
    Applied,
    /// The datagram was already processed: nothing was written and no event was emitted.
    AlreadyApplied,
    /// The channel upgrade was abandoned. The abort itself is committed.
    Aborted,
}

#[derive(Debug)]
pub struct MsgReceipt {
    pub outcome: Outcome,
    pub events: Vec<IbcEvent>,
    pub log: Vec<String>,
    /// The capability of a channel end created by the datagram, for the module bound to its
    /// port.
    pub channel_capability: Option<ChannelCapability>,
}

impl MsgReceipt {
    fn new(outcome: Outcome, output: ModuleOutputBuilder) -> Self {
        let HandlerOutput { log, events, .. } = output.with_result(());
        Self {
            outcome,
            events,
            log,
            channel_capability: None,
        }
    }
}

/// Mimics the DeliverTx ABCI interface, but for a single message and at a slightly lower level.
/// No need for authentication info or signature checks here.
pub fn deliver<Ctx>(ctx: &mut Ctx, message: Ics26Envelope) -> Result<MsgReceipt, RouterError>
where
    Ctx: Ics26Context,
{
    let type_url = message.type_url();

    let receipt = match message {
        Ics26Envelope::Ics4ChannelMsg(msg) => deliver_channel_msg(ctx, msg),
        Ics26Envelope::Ics4UpgradeMsg(msg) => deliver_upgrade_msg(ctx, msg),
        Ics26Envelope::Ics4PacketMsg(msg) => deliver_packet_msg(ctx, msg),
    }?;

    debug!(type_url = %type_url, outcome = ?receipt.outcome, "datagram delivered");

    Ok(receipt)
}

fn lookup_module<Ctx: Ics26Context>(ctx: &Ctx, port_id: &PortId) -> Result<ModuleId, RouterError> {
    let module_id = ctx
        .lookup_module_by_port(port_id)
        .map_err(RouterError::ics05_port)?;
    if !ctx.router().has_route(&module_id) {
        return Err(RouterError::route_not_found(module_id));
    }
    Ok(module_id)
}

fn route_mut<'a, Ctx: Ics26Context>(
    ctx: &'a mut Ctx,
    module_id: &ModuleId,
) -> Result<&'a mut dyn Module, RouterError> {
    ctx.router_mut()
        .get_route_mut(module_id)
        .ok_or_else(|| RouterError::route_not_found(module_id.clone()))
}

/// Starts the output of a datagram from the output of its channel handler.
fn module_output<T>(output: HandlerOutput<T>) -> (T, ModuleOutputBuilder) {
    let HandlerOutput {
        result,
        log,
        events,
    } = output;
    (
        result,
        HandlerOutputBuilder::new().with_log(log).with_events(events),
    )
}

fn deliver_channel_msg<Ctx>(ctx: &mut Ctx, msg: ChannelMsg) -> Result<MsgReceipt, RouterError>
where
    Ctx: Ics26Context,
{
    let module_id = lookup_module(&*ctx, msg.port_id())?;

    let (mut result, mut output) =
        module_output(channel_dispatch(&*ctx, &msg).map_err(RouterError::ics04_channel)?);

    let module = route_mut(ctx, &module_id)?;
    match &msg {
        ChannelMsg::ChannelOpenInit(msg) => module.on_chan_open_init(
            &mut output,
            msg.channel.ordering,
            msg.channel.connection_hops(),
            &msg.port_id,
            &result.channel_id,
            msg.channel.counterparty(),
            msg.channel.version(),
        ),
        ChannelMsg::ChannelOpenTry(msg) => module
            .on_chan_open_try(
                &mut output,
                msg.channel.ordering,
                msg.channel.connection_hops(),
                &msg.port_id,
                &result.channel_id,
                msg.channel.counterparty(),
                &msg.counterparty_version,
            )
            .map(|version| result.channel_end.set_version(version)),
        ChannelMsg::ChannelOpenAck(msg) => module.on_chan_open_ack(
            &mut output,
            &msg.port_id,
            &msg.channel_id,
            &msg.counterparty_version,
        ),
        ChannelMsg::ChannelOpenConfirm(msg) => {
            module.on_chan_open_confirm(&mut output, &msg.port_id, &msg.channel_id)
        }
    }
    .map_err(RouterError::ics04_channel)?;

    let channel_capability = ctx
        .store_channel_result(result)
        .map_err(RouterError::ics04_channel)?;

    Ok(MsgReceipt {
        channel_capability,
        ..MsgReceipt::new(Outcome::Applied, output)
    })
}

fn deliver_upgrade_msg<Ctx>(ctx: &mut Ctx, msg: UpgradeMsg) -> Result<MsgReceipt, RouterError>
where
    Ctx: Ics26Context,
{
    let module_id = lookup_module(&*ctx, msg.port_id())?;

    let (result, mut output) =
        module_output(upgrade_dispatch(&*ctx, &msg).map_err(RouterError::ics04_channel)?);

    let (port_id, channel_id) = (&result.port_id, &result.channel_id);
    let module = route_mut(ctx, &module_id)?;
    match (&msg, &result.step) {
        (_, step) if step.is_restore() => {
            module.on_chan_upgrade_restore(&mut output, port_id, channel_id);
            Ok(())
        }
        (_, UpgradeStep::Answered { upgrade, .. }) => {
            module.on_chan_upgrade_try(&mut output, port_id, channel_id, &upgrade.fields)
        }
        (UpgradeMsg::ChannelUpgradeAck(msg), UpgradeStep::Acknowledged(_)) => module
            .on_chan_upgrade_ack(
                &mut output,
                port_id,
                channel_id,
                &msg.counterparty_upgrade.fields.version,
            ),
        (_, UpgradeStep::Completed(_)) => {
            module.on_chan_upgrade_open(&mut output, port_id, channel_id)
        }
        _ => Ok(()),
    }
    .map_err(RouterError::ics04_channel)?;

    let outcome = match result.step {
        UpgradeStep::Aborted(_) => Outcome::Aborted,
        _ => Outcome::Applied,
    };

    ctx.store_upgrade_result(result)
        .map_err(RouterError::ics04_channel)?;

    Ok(MsgReceipt::new(outcome, output))
}

/// The channel end a packet message is processed on.
fn packet_msg_channel(msg: &PacketMsg) -> (&PortId, &ChannelId) {
    match msg {
        PacketMsg::RecvPacket(msg) => (
            &msg.packet.destination_port,
            &msg.packet.destination_channel,
        ),
        PacketMsg::AckPacket(msg) => (&msg.packet.source_port, &msg.packet.source_channel),
        PacketMsg::TimeoutPacket(msg) => (&msg.packet.source_port, &msg.packet.source_channel),
    }
}

fn deliver_packet_msg<Ctx>(ctx: &mut Ctx, msg: PacketMsg) -> Result<MsgReceipt, RouterError>
where
    Ctx: Ics26Context,
{
    let (port_id, channel_id) = packet_msg_channel(&msg);
    let module_id = lookup_module(&*ctx, port_id)?;

    // The router acts for the module owning the channel end.
    let capability = ctx
        .get_capability(&CapabilityName::channel(port_id, channel_id))
        .map(ChannelCapability::from)
        .map_err(RouterError::ics05_port)?;

    let (result, mut output) = module_output(
        packet_dispatch(&*ctx, &capability, &msg).map_err(RouterError::ics04_channel)?,
    );

    if let PacketResult::NoOp(reason) = &result {
        debug!(port_id = %port_id, channel_id = %channel_id, "skipping packet: {}", reason);
        return Ok(MsgReceipt::new(Outcome::AlreadyApplied, output));
    }

    let mut results = vec![result];

    let module = route_mut(ctx, &module_id)?;
    match &msg {
        PacketMsg::RecvPacket(msg) => {
            let ack = module.on_recv_packet(&mut output, &msg.packet);
            // An empty acknowledgement is written later by the module.
            if !ack.is_empty() {
                let written =
                    write_acknowledgement::process(&*ctx, &capability, msg.packet.clone(), ack)
                        .map_err(RouterError::ics04_channel)?;
                results.push(output.merge_output(written));
            }
        }
        PacketMsg::AckPacket(msg) => module
            .on_acknowledgement_packet(&mut output, &msg.packet, &msg.acknowledgement)
            .map_err(RouterError::ics04_channel)?,
        PacketMsg::TimeoutPacket(msg) => module
            .on_timeout_packet(&mut output, &msg.packet)
            .map_err(RouterError::ics04_channel)?,
    }

    for result in results {
        ctx.store_packet_result(result)
            .map_err(RouterError::ics04_channel)?;
    }

    Ok(MsgReceipt::new(Outcome::Applied, output))
}

/// Sends a packet on behalf of the application holding `capability`, and returns its
/// sequence.
pub fn send_packet<Ctx>(
    ctx: &mut Ctx,
    capability: &ChannelCapability,
    packet: OutgoingPacket,
) -> Result<HandlerOutput<Sequence>, Error>
where
    Ctx: ChannelReader + ChannelKeeper,
{
    let (port_id, channel_id) = (packet.source_port.clone(), packet.source_channel.clone());

    let (result, output) = module_output(send_packet::process(&*ctx, capability, packet)?);
    ctx.store_packet_result(result)?;

    // The counter moved past the sequence the packet was given.
    let next_seq_send = ctx.get_next_sequence_send(&port_id, &channel_id)?;
    let sequence = Sequence::from(next_seq_send.value().saturating_sub(1));

    let HandlerOutput { log, events, .. } = output.with_result(());
    Ok(HandlerOutput {
        result: sequence,
        log,
        events,
    })
}

/// Writes the acknowledgement of a packet the application chose to acknowledge
/// asynchronously. Writing it twice is a no-op.
pub fn write_acknowledgement<Ctx>(
    ctx: &mut Ctx,
    capability: &ChannelCapability,
    packet: Packet,
    ack: Acknowledgement,
) -> Result<HandlerOutput<Outcome>, Error>
where
    Ctx: ChannelReader + ChannelKeeper,
{
    let (result, output) =
        module_output(write_acknowledgement::process(&*ctx, capability, packet, ack)?);

    let outcome = if result.is_no_op() {
        Outcome::AlreadyApplied
    } else {
        Outcome::Applied
    };
    ctx.store_packet_result(result)?;

    let HandlerOutput { log, events, .. } = output.with_result(());
    Ok(HandlerOutput {
        result: outcome,
        log,
        events,
    })
}

/// Proposes an upgrade of a channel end on behalf of the application holding `capability`,
/// and returns the new upgrade sequence.
pub fn upgrade_channel<Ctx>(
    ctx: &mut Ctx,
    capability: &ChannelCapability,
    msg: &MsgChannelUpgradeInit,
) -> Result<HandlerOutput<Sequence>, Error>
where
    Ctx: ChannelReader + ChannelKeeper,
{
    let (result, output) = module_output(chan_upgrade_init::process(&*ctx, capability, msg)?);

    let upgrade_sequence = result.channel_end.upgrade_sequence();
    ctx.store_upgrade_result(result)?;

    let HandlerOutput { log, events, .. } = output.with_result(());
    Ok(HandlerOutput {
        result: upgrade_sequence,
        log,
        events,
    })
}

/// Closes a channel end on behalf of the application holding `capability`.
pub fn close_channel<Ctx>(
    ctx: &mut Ctx,
    capability: &ChannelCapability,
    msg: &MsgChannelCloseInit,
) -> Result<HandlerOutput<()>, Error>
where
    Ctx: ChannelReader + ChannelKeeper,
{
    let (result, output) = module_output(chan_close_init::process(&*ctx, capability, msg)?);

    ctx.store_channel_result(result)?;

    Ok(output.with_result(()))
}
