use tracing::{debug, info};

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, Order, State};
use crate::core::ics04_channel::commitment::packet_commitment_of;
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::{Error, ErrorDetail};
use crate::core::ics04_channel::events::{Attributes, ChannelClosed, TimeoutPacket};
use crate::core::ics04_channel::handler::verify::{
    counterparty_consensus_state, verify_next_sequence_recv, verify_packet_receipt_absence,
};
use crate::core::ics04_channel::msgs::timeout::MsgTimeout;
use crate::core::ics04_channel::packet::{NoOpReason, PacketResult, Sequence};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct TimeoutPacketResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub seq: Sequence,
    /// The channel end this timeout closed, for ordered channels that were still open.
    pub channel: Option<ChannelEnd>,
}

/// Removes the commitment of a packet the destination did not receive in time. A timeout on
/// an ordered channel closes it.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    msg: &MsgTimeout,
) -> HandlerResult<PacketResult, Error> {
    let mut output = HandlerOutput::builder();

    let packet = &msg.packet;

    let mut source_channel_end = ctx.channel_end(&packet.source_port, &packet.source_channel)?;

    ctx.authenticate_channel_capability(&packet.source_port, &packet.source_channel, capability)?;

    // Checked first: a replayed timeout finds the channel it closed.
    let packet_commitment = match ctx.get_packet_commitment(
        &packet.source_port,
        &packet.source_channel,
        packet.sequence,
    ) {
        Ok(commitment) => commitment,
        Err(e) if matches!(e.detail(), ErrorDetail::PacketCommitmentNotFound(_)) => {
            output.log("no-op: packet commitment absent");
            return Ok(output.with_result(PacketResult::NoOp(
                NoOpReason::PacketCommitmentAbsent(packet.sequence),
            )));
        }
        Err(e) => return Err(e),
    };

    // A closed source end still times out the packets left in flight.
    let counterparty = Counterparty::new(
        packet.destination_port.clone(),
        Some(packet.destination_channel.clone()),
    );

    if !source_channel_end.counterparty_matches(&counterparty) {
        return Err(Error::invalid_packet_counterparty(
            packet.destination_port.clone(),
            packet.destination_channel.clone(),
        ));
    }

    let connection_end = ctx
        .connection_end(source_channel_end.connection_hop()?)
        .map_err(Error::ics03_connection)?;

    if packet_commitment != packet_commitment_of(packet) {
        return Err(Error::incorrect_packet_commitment(packet.sequence));
    }

    // check that timeout height or timeout timestamp has passed on the other end
    let proof_height = msg.proofs.height();
    let consensus_state = counterparty_consensus_state(ctx, &connection_end, proof_height)?;
    let proof_timestamp = consensus_state.timestamp();

    if !packet.timed_out(&proof_timestamp, proof_height) {
        return Err(Error::packet_timeout_not_reached(
            packet.timeout_height.to_string(),
            proof_height,
            packet.timeout_timestamp,
            proof_timestamp,
        ));
    }

    let channel = if source_channel_end.order_matches(&Order::Ordered) {
        // The destination must not have received the packet.
        if msg.next_sequence_recv > packet.sequence {
            return Err(Error::invalid_packet_sequence(
                packet.sequence,
                msg.next_sequence_recv,
            ));
        }
        verify_next_sequence_recv(
            ctx,
            &connection_end,
            packet,
            msg.next_sequence_recv,
            &msg.proofs,
        )?;

        if source_channel_end.state_matches(&State::Closed) {
            None
        } else {
            source_channel_end.set_state(State::Closed);
            Some(source_channel_end)
        }
    } else {
        verify_packet_receipt_absence(ctx, &connection_end, packet, &msg.proofs)?;
        None
    };

    output.log("success: packet timeout");
    debug!(
        port_id = %packet.source_port,
        channel_id = %packet.source_channel,
        sequence = %packet.sequence,
        "packet timed out"
    );

    output.emit(
        TimeoutPacket {
            packet: packet.clone(),
        }
        .into(),
    );

    if let Some(closed) = &channel {
        info!(
            port_id = %packet.source_port,
            channel_id = %packet.source_channel,
            "ordered channel closed by a packet timeout"
        );
        output.emit(
            ChannelClosed {
                attributes: Attributes {
                    port_id: packet.source_port.clone(),
                    channel_id: Some(packet.source_channel.clone()),
                    connection_id: closed.connection_hop()?.clone(),
                    counterparty_port_id: packet.destination_port.clone(),
                    counterparty_channel_id: Some(packet.destination_channel.clone()),
                },
                channel_ordering: *closed.ordering(),
            }
            .into(),
        );
    }

    let result = PacketResult::Timeout(TimeoutPacketResult {
        port_id: packet.source_port.clone(),
        channel_id: packet.source_channel.clone(),
        seq: packet.sequence,
        channel,
    });

    Ok(output.with_result(result))
}
