//! This module implements the processing logic for ICS4 (channel) messages.

use tracing::warn;

use crate::core::ics03_connection::connection::ConnectionEnd;
use crate::core::ics03_connection::error::Error as ConnectionError;
use crate::core::ics04_channel::channel::{ChannelEnd, Order, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{UpgradeAttributes, UpgradeError};
use crate::core::ics04_channel::msgs::{ChannelMsg, PacketMsg, UpgradeMsg};
use crate::core::ics04_channel::packet::{PacketResult, Sequence};
use crate::core::ics04_channel::upgrade::{ErrorReceipt, Upgrade, UpgradeFields};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::handler::{HandlerOutput, HandlerOutputBuilder};
use crate::prelude::*;

pub mod acknowledgement;
pub mod chan_close_init;
pub mod chan_open_ack;
pub mod chan_open_confirm;
pub mod chan_open_init;
pub mod chan_open_try;
pub mod chan_upgrade_ack;
pub mod chan_upgrade_cancel;
pub mod chan_upgrade_confirm;
pub mod chan_upgrade_init;
pub mod chan_upgrade_open;
pub mod chan_upgrade_timeout;
pub mod chan_upgrade_try;
pub mod recv_packet;
pub mod send_packet;
pub mod timeout;
pub mod verify;
pub mod write_acknowledgement;

/// Defines the possible states of a channel identifier in a `ChannelResult`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelIdState {
    /// Specifies that the channel handshake handler allocated a new channel identifier. This
    /// happens during the processing of either the `MsgChannelOpenInit` or `MsgChannelOpenTry`.
    Generated,

    /// Specifies that the handler reused a previously-allocated channel identifier.
    Reused,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub channel_id_state: ChannelIdState,
    pub channel_end: ChannelEnd,
}

/// What an upgrade handler does to the upgrade record stored next to the channel end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpgradeStep {
    /// The given upgrade is written (Init).
    Proposed(Upgrade),
    /// The local upgrade is written next to the counterparty's (Try).
    Answered { upgrade: Upgrade, counterparty: Upgrade },
    /// The counterparty's upgrade is recorded (Ack).
    Acknowledged(Upgrade),
    /// The new fields were swapped in and the records are removed (Confirm, Open). Carries the
    /// counters to restart from when the ordering changed to ORDERED.
    Completed(Option<SequenceReset>),
    /// The counterparty aborted: the records are removed (Cancel).
    Cancelled,
    /// The upgrade failed here: the records are removed and the receipt written.
    Aborted(ErrorReceipt),
    /// The counterparty missed the deadline: the records are removed and the receipt written.
    TimedOut(ErrorReceipt),
}

/// Packet counters of a channel end that switched to ORDERED. Both ends flushed their
/// packets, so each side restarts right after the last sequence sent before the upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceReset {
    pub next_seq_recv: Sequence,
    pub next_seq_ack: Sequence,
}

impl UpgradeStep {
    /// Whether the channel end went back to its pre-upgrade fields.
    pub fn is_restore(&self) -> bool {
        matches!(
            self,
            UpgradeStep::Cancelled | UpgradeStep::Aborted(_) | UpgradeStep::TimedOut(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpgradeResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub channel_end: ChannelEnd,
    pub step: UpgradeStep,
}

/// General entry point for processing any type of message related to the ICS4 channel open
/// handshake protocol.
pub fn channel_dispatch<Ctx>(
    ctx: &Ctx,
    msg: &ChannelMsg,
) -> Result<HandlerOutput<ChannelResult>, Error>
where
    Ctx: ChannelReader,
{
    match msg {
        ChannelMsg::ChannelOpenInit(msg) => chan_open_init::process(ctx, msg),
        ChannelMsg::ChannelOpenTry(msg) => chan_open_try::process(ctx, msg),
        ChannelMsg::ChannelOpenAck(msg) => chan_open_ack::process(ctx, msg),
        ChannelMsg::ChannelOpenConfirm(msg) => chan_open_confirm::process(ctx, msg),
    }
}

/// General entry point for the relayed messages of the channel upgrade handshake.
pub fn upgrade_dispatch<Ctx>(
    ctx: &Ctx,
    msg: &UpgradeMsg,
) -> Result<HandlerOutput<UpgradeResult>, Error>
where
    Ctx: ChannelReader,
{
    match msg {
        UpgradeMsg::ChannelUpgradeTry(msg) => chan_upgrade_try::process(ctx, msg),
        UpgradeMsg::ChannelUpgradeAck(msg) => chan_upgrade_ack::process(ctx, msg),
        UpgradeMsg::ChannelUpgradeConfirm(msg) => chan_upgrade_confirm::process(ctx, msg),
        UpgradeMsg::ChannelUpgradeOpen(msg) => chan_upgrade_open::process(ctx, msg),
        UpgradeMsg::ChannelUpgradeCancel(msg) => chan_upgrade_cancel::process(ctx, msg),
        UpgradeMsg::ChannelUpgradeTimeout(msg) => chan_upgrade_timeout::process(ctx, msg),
    }
}

/// Dispatcher for processing any type of message related to the ICS4 packet protocols.
/// `capability` must own the channel end the packet is processed on.
pub fn packet_dispatch<Ctx>(
    ctx: &Ctx,
    capability: &ChannelCapability,
    msg: &PacketMsg,
) -> Result<HandlerOutput<PacketResult>, Error>
where
    Ctx: ChannelReader,
{
    match msg {
        PacketMsg::RecvPacket(msg) => recv_packet::process(ctx, capability, msg),
        PacketMsg::AckPacket(msg) => acknowledgement::process(ctx, capability, msg),
        PacketMsg::TimeoutPacket(msg) => timeout::process(ctx, capability, msg),
    }
}

/// Returns the connection under `channel_end`, which must be OPEN.
pub(crate) fn open_connection(
    ctx: &dyn ChannelReader,
    channel_end: &ChannelEnd,
) -> Result<ConnectionEnd, Error> {
    let conn_id = channel_end.connection_hop()?;
    let conn = ctx.connection_end(conn_id).map_err(Error::ics03_connection)?;
    if !conn.is_open() {
        return Err(Error::connection_not_open(conn_id.clone()));
    }
    Ok(conn)
}

/// The identifier the counterparty chain knows `connection_end` by.
pub(crate) fn counterparty_connection_id(
    connection_end: &ConnectionEnd,
) -> Result<ConnectionId, Error> {
    connection_end
        .counterparty()
        .connection_id()
        .cloned()
        .ok_or_else(|| Error::ics03_connection(ConnectionError::missing_counterparty_connection_id()))
}

/// Checks that `proposed` is a real change of `channel_end` that the host can carry: a single
/// OPEN connection hop supporting the proposed ordering.
pub fn validate_upgrade_fields(
    ctx: &dyn ChannelReader,
    proposed: &UpgradeFields,
    channel_end: &ChannelEnd,
) -> Result<(), Error> {
    if proposed == &channel_end.upgrade_fields() {
        return Err(Error::upgrade_fields_unchanged());
    }

    let hop = proposed.connection_hop()?;
    let connection_end = ctx.connection_end(hop).map_err(Error::ics03_connection)?;
    if !connection_end.is_open() {
        return Err(Error::connection_not_open(hop.clone()));
    }

    if !connection_end
        .versions()
        .iter()
        .any(|version| version.supports_order(proposed.ordering))
    {
        return Err(Error::channel_feature_not_supported_by_connection());
    }

    Ok(())
}

/// Whether the counterparty's upgrade fields describe the same channel as the local ones:
/// same ordering and version, over the counterparty end of the local connection hop.
pub(crate) fn fields_match_counterparty(
    ctx: &dyn ChannelReader,
    local: &UpgradeFields,
    counterparty: &UpgradeFields,
) -> Result<bool, Error> {
    if local.ordering != counterparty.ordering || local.version != counterparty.version {
        return Ok(false);
    }

    let conn = ctx
        .connection_end(local.connection_hop()?)
        .map_err(Error::ics03_connection)?;
    Ok(&counterparty_connection_id(&conn)? == counterparty.connection_hop()?)
}

/// The upgrade in progress on `channel_end`, if it changes the channel ordering.
pub(crate) fn pending_ordering_change(
    ctx: &dyn ChannelReader,
    port_id: &PortId,
    channel_id: &ChannelId,
    channel_end: &ChannelEnd,
) -> Result<Option<Upgrade>, Error> {
    if !channel_end.state.is_upgrading() {
        return Ok(None);
    }
    let upgrade = ctx.get_upgrade(port_id, channel_id)?;
    Ok((upgrade.fields.ordering != channel_end.ordering).then(|| upgrade))
}

/// An end switches ordering only once every packet it sent was acknowledged or timed out.
/// Sends stay paused from the proposal on, so the check holds until completion.
pub(crate) fn ensure_flushed(
    ctx: &dyn ChannelReader,
    port_id: &PortId,
    channel_id: &ChannelId,
    channel_end: &ChannelEnd,
    fields: &UpgradeFields,
) -> Result<(), Error> {
    if fields.ordering != channel_end.ordering && ctx.has_packets_in_flight(port_id, channel_id)? {
        return Err(Error::packets_in_flight(channel_id.clone()));
    }
    Ok(())
}

/// The counters `channel_end` restarts from once `fields` make it ORDERED: right after the
/// last packet each side sent before the upgrade. An end turning UNORDERED keeps its
/// receive counter, below which every packet counts as received.
pub(crate) fn sequence_reset(
    ctx: &dyn ChannelReader,
    port_id: &PortId,
    channel_id: &ChannelId,
    channel_end: &ChannelEnd,
    fields: &UpgradeFields,
) -> Result<Option<SequenceReset>, Error> {
    if fields.ordering != Order::Ordered || channel_end.ordering == Order::Ordered {
        return Ok(None);
    }

    let counterparty = ctx.get_counterparty_upgrade(port_id, channel_id)?;
    Ok(Some(SequenceReset {
        next_seq_recv: counterparty.latest_sequence_send.increment(),
        next_seq_ack: ctx.get_next_sequence_send(port_id, channel_id)?,
    }))
}

pub(crate) fn upgrade_attributes(
    port_id: &PortId,
    channel_id: &ChannelId,
    channel_end: &ChannelEnd,
    fields: UpgradeFields,
) -> UpgradeAttributes {
    UpgradeAttributes {
        port_id: port_id.clone(),
        channel_id: channel_id.clone(),
        counterparty_port_id: channel_end.counterparty().port_id().clone(),
        counterparty_channel_id: channel_end.counterparty().channel_id().cloned(),
        upgrade_sequence: channel_end.upgrade_sequence(),
        upgrade_fields: fields,
    }
}

/// Abandons the upgrade of the channel end: an error receipt is written at the current
/// upgrade sequence and the end goes back to OPEN with its pre-upgrade fields.
pub(crate) fn abort_upgrade(
    output: &mut HandlerOutputBuilder<UpgradeResult>,
    port_id: &PortId,
    channel_id: &ChannelId,
    mut channel_end: ChannelEnd,
    error: Error,
) -> UpgradeResult {
    warn!(
        port_id = %port_id,
        channel_id = %channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        "aborting channel upgrade: {}",
        error
    );

    let receipt = ErrorReceipt::new(channel_end.upgrade_sequence(), &error);
    channel_end.set_state(State::Open);

    output.log(format!(
        "channel upgrade aborted at sequence {}: {}",
        receipt.sequence, receipt.message
    ));
    output.emit(
        UpgradeError {
            port_id: port_id.clone(),
            channel_id: channel_id.clone(),
            upgrade_sequence: receipt.sequence,
            message: receipt.message.clone(),
        }
        .into(),
    );

    UpgradeResult {
        port_id: port_id.clone(),
        channel_id: channel_id.clone(),
        channel_end,
        step: UpgradeStep::Aborted(receipt),
    }
}
