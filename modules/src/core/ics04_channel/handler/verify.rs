use crate::core::ics02_client::client_consensus::ConsensusState;
use crate::core::ics03_connection::connection::ConnectionEnd;
use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::commitment::{packet_commitment_of, AcknowledgementCommitment};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::{Packet, Sequence};
use crate::core::ics04_channel::upgrade::{ErrorReceipt, Upgrade};
use crate::core::ics23_commitment::commitment::CommitmentProofBytes;
use crate::core::ics24_host::identifier::ChannelId;
use crate::core::ics24_host::Path;
use crate::prelude::*;
use crate::proofs::Proofs;
use crate::Height;

/// Returns the consensus state the light client behind `connection_end` stored for the
/// counterparty at `height`. The client must not be frozen.
pub fn counterparty_consensus_state(
    ctx: &dyn ChannelReader,
    connection_end: &ConnectionEnd,
    height: Height,
) -> Result<ConsensusState, Error> {
    // This is the client which will perform proof verification.
    let client_id = connection_end.client_id();

    let client_state = ctx.client_state(client_id).map_err(Error::ics02_client)?;

    // The client must not be frozen.
    if client_state.is_frozen() {
        return Err(Error::frozen_client(client_id.clone()));
    }

    ctx.client_consensus_state(client_id, height)
        .map_err(Error::ics02_client)
}

fn counterparty_channel_id(channel_end: &ChannelEnd) -> Result<&ChannelId, Error> {
    channel_end
        .counterparty()
        .channel_id()
        .ok_or_else(Error::missing_counterparty_channel_id)
}

/// Entry point for verifying all proofs bundled in any ICS4 message for channel protocols.
/// `channel_end` is the local end, `expected_chan` what its counterparty must store.
pub fn verify_channel_proofs(
    ctx: &dyn ChannelReader,
    height: Height,
    proof: &CommitmentProofBytes,
    channel_end: &ChannelEnd,
    connection_end: &ConnectionEnd,
    expected_chan: &ChannelEnd,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, height)?;

    let path = Path::ChannelEnds(
        channel_end.counterparty().port_id().clone(),
        counterparty_channel_id(channel_end)?.clone(),
    );

    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proof,
        consensus_state.root(),
        path,
        expected_chan.encode_vec()?,
    )
    .map_err(Error::verify_channel_failed)
}

/// Verifies the upgrade record the counterparty of `channel_end` stores.
pub fn verify_upgrade_proofs(
    ctx: &dyn ChannelReader,
    height: Height,
    proof: &CommitmentProofBytes,
    channel_end: &ChannelEnd,
    connection_end: &ConnectionEnd,
    upgrade: &Upgrade,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, height)?;

    let path = Path::ChannelUpgrade(
        channel_end.counterparty().port_id().clone(),
        counterparty_channel_id(channel_end)?.clone(),
    );

    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proof,
        consensus_state.root(),
        path,
        upgrade.encode_vec()?,
    )
    .map_err(Error::upgrade_verification_failed)
}

/// Verifies the upgrade error receipt written by the counterparty of `channel_end`.
pub fn verify_error_receipt_proofs(
    ctx: &dyn ChannelReader,
    height: Height,
    proof: &CommitmentProofBytes,
    channel_end: &ChannelEnd,
    connection_end: &ConnectionEnd,
    receipt: &ErrorReceipt,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, height)?;

    let path = Path::UpgradeErrorReceipt(
        channel_end.counterparty().port_id().clone(),
        counterparty_channel_id(channel_end)?.clone(),
    );

    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proof,
        consensus_state.root(),
        path,
        receipt.encode_vec()?,
    )
    .map_err(Error::error_receipt_verification_failed)
}

/// Entry point for verifying all proofs bundled in a ICS4 packet recv. message.
pub fn verify_packet_recv_proofs(
    ctx: &dyn ChannelReader,
    packet: &Packet,
    connection_end: &ConnectionEnd,
    proofs: &Proofs,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, proofs.height())?;

    let commitment_path = Path::commitments(
        &packet.source_port,
        &packet.source_channel,
        packet.sequence,
    );

    // Verify the proof for the packet against the chain store.
    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proofs.object_proof(),
        consensus_state.root(),
        commitment_path,
        packet_commitment_of(packet).into_vec(),
    )
    .map_err(|e| Error::packet_verification_failed(packet.sequence, e))
}

/// Entry point for verifying all proofs bundled in an ICS4 packet ack message.
pub fn verify_packet_acknowledgement_proofs(
    ctx: &dyn ChannelReader,
    packet: &Packet,
    ack_commitment: AcknowledgementCommitment,
    connection_end: &ConnectionEnd,
    proofs: &Proofs,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, proofs.height())?;

    // Acknowledgements are written by the destination chain.
    let ack_path = Path::acks(
        &packet.destination_port,
        &packet.destination_channel,
        packet.sequence,
    );

    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proofs.object_proof(),
        consensus_state.root(),
        ack_path,
        ack_commitment.into_vec(),
    )
    .map_err(|e| Error::packet_verification_failed(packet.sequence, e))
}

/// Entry point for verifying all timeout proofs on ordered channels.
pub fn verify_next_sequence_recv(
    ctx: &dyn ChannelReader,
    connection_end: &ConnectionEnd,
    packet: &Packet,
    seq: Sequence,
    proofs: &Proofs,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, proofs.height())?;

    let seq_path = Path::SeqRecvs(
        packet.destination_port.clone(),
        packet.destination_channel.clone(),
    );

    ctx.verify_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proofs.object_proof(),
        consensus_state.root(),
        seq_path,
        seq.to_be_bytes().to_vec(),
    )
    .map_err(|e| Error::packet_verification_failed(seq, e))
}

pub fn verify_packet_receipt_absence(
    ctx: &dyn ChannelReader,
    connection_end: &ConnectionEnd,
    packet: &Packet,
    proofs: &Proofs,
) -> Result<(), Error> {
    let consensus_state = counterparty_consensus_state(ctx, connection_end, proofs.height())?;

    let receipt_path = Path::receipts(
        &packet.destination_port,
        &packet.destination_channel,
        packet.sequence,
    );

    ctx.verify_non_membership(
        connection_end.client_id(),
        connection_end.counterparty().prefix(),
        proofs.object_proof(),
        consensus_state.root(),
        receipt_path,
    )
    .map_err(|e| Error::packet_verification_failed(packet.sequence, e))
}
