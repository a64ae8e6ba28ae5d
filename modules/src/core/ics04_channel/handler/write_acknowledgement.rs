use tracing::debug;

use crate::core::ics04_channel::commitment::{compute_ack_commitment, AcknowledgementCommitment};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::WriteAcknowledgement;
use crate::core::ics04_channel::msgs::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::packet::{NoOpReason, Packet, PacketResult, Sequence};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct WriteAckPacketResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub seq: Sequence,
    pub ack_commitment: AcknowledgementCommitment,
}

/// Writes the acknowledgement of a received packet, on behalf of the application holding
/// the capability of the destination channel end.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    packet: Packet,
    ack: Acknowledgement,
) -> HandlerResult<PacketResult, Error> {
    let mut output = HandlerOutput::builder();

    let dest_channel_end =
        ctx.channel_end(&packet.destination_port, &packet.destination_channel)?;

    ctx.authenticate_channel_capability(
        &packet.destination_port,
        &packet.destination_channel,
        capability,
    )?;

    if !dest_channel_end.state.allows_packets() {
        return Err(Error::invalid_channel_state(
            packet.destination_channel,
            dest_channel_end.state,
        ));
    }

    if ctx
        .get_packet_acknowledgement(
            &packet.destination_port,
            &packet.destination_channel,
            packet.sequence,
        )
        .is_ok()
    {
        output.log("no-op: acknowledgement already written");
        return Ok(output.with_result(PacketResult::NoOp(
            NoOpReason::AcknowledgementAlreadyWritten(packet.sequence),
        )));
    }

    if ack.is_empty() {
        return Err(Error::invalid_acknowledgement());
    }

    let result = PacketResult::WriteAck(WriteAckPacketResult {
        port_id: packet.destination_port.clone(),
        channel_id: packet.destination_channel.clone(),
        seq: packet.sequence,
        ack_commitment: compute_ack_commitment(&ack),
    });

    output.log("success: packet write acknowledgement");
    debug!(
        port_id = %packet.destination_port,
        channel_id = %packet.destination_channel,
        sequence = %packet.sequence,
        "acknowledgement written"
    );

    output.emit(
        WriteAcknowledgement {
            packet,
            ack: ack.into_bytes(),
        }
        .into(),
    );

    Ok(output.with_result(result))
}
