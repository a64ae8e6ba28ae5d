use tracing::debug;

use crate::core::ics04_channel::channel::{Counterparty, Order, State};
use crate::core::ics04_channel::commitment::{compute_ack_commitment, packet_commitment_of};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::{Error, ErrorDetail};
use crate::core::ics04_channel::events::AcknowledgePacket;
use crate::core::ics04_channel::handler::open_connection;
use crate::core::ics04_channel::handler::verify::verify_packet_acknowledgement_proofs;
use crate::core::ics04_channel::msgs::acknowledgement::MsgAcknowledgement;
use crate::core::ics04_channel::packet::{NoOpReason, PacketResult, Sequence};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct AckPacketResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub seq: Sequence,
    pub seq_number: Option<Sequence>,
}

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    msg: &MsgAcknowledgement,
) -> HandlerResult<PacketResult, Error> {
    let mut output = HandlerOutput::builder();

    let packet = &msg.packet;

    let source_channel_end = ctx.channel_end(&packet.source_port, &packet.source_channel)?;

    ctx.authenticate_channel_capability(&packet.source_port, &packet.source_channel, capability)?;

    if source_channel_end.state_matches(&State::Closed) {
        return Err(Error::channel_closed(packet.source_channel.clone()));
    }
    if !source_channel_end.state.allows_packets() {
        return Err(Error::invalid_channel_state(
            packet.source_channel.clone(),
            source_channel_end.state,
        ));
    }

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

    let connection_end = open_connection(ctx, &source_channel_end)?;

    // Verify packet commitment
    let packet_commitment = match ctx.get_packet_commitment(
        &packet.source_port,
        &packet.source_channel,
        packet.sequence,
    ) {
        Ok(commitment) => commitment,
        Err(e) if matches!(e.detail(), ErrorDetail::PacketCommitmentNotFound(_)) => {
            // Already acknowledged or timed out.
            output.log("no-op: packet commitment absent");
            return Ok(output.with_result(PacketResult::NoOp(
                NoOpReason::PacketCommitmentAbsent(packet.sequence),
            )));
        }
        Err(e) => return Err(e),
    };

    if packet_commitment != packet_commitment_of(packet) {
        return Err(Error::incorrect_packet_commitment(packet.sequence));
    }

    // Verify the acknowledgement proof
    verify_packet_acknowledgement_proofs(
        ctx,
        packet,
        compute_ack_commitment(&msg.acknowledgement),
        &connection_end,
        &msg.proofs,
    )?;

    let seq_number = if source_channel_end.order_matches(&Order::Ordered) {
        let next_seq_ack =
            ctx.get_next_sequence_ack(&packet.source_port, &packet.source_channel)?;

        if packet.sequence != next_seq_ack {
            return Err(Error::invalid_packet_sequence(
                packet.sequence,
                next_seq_ack,
            ));
        }

        Some(next_seq_ack.increment())
    } else {
        None
    };

    let result = PacketResult::Ack(AckPacketResult {
        port_id: packet.source_port.clone(),
        channel_id: packet.source_channel.clone(),
        seq: packet.sequence,
        seq_number,
    });

    output.log("success: packet ack");
    debug!(
        port_id = %packet.source_port,
        channel_id = %packet.source_channel,
        sequence = %packet.sequence,
        "packet acknowledged"
    );

    output.emit(
        AcknowledgePacket {
            packet: packet.clone(),
        }
        .into(),
    );

    Ok(output.with_result(result))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{Order, State};
    use crate::core::ics04_channel::commitment::{compute_ack_commitment, packet_commitment_of};
    use crate::core::ics04_channel::handler::packet_dispatch;
    use crate::core::ics04_channel::msgs::acknowledgement::{Acknowledgement, MsgAcknowledgement};
    use crate::core::ics04_channel::msgs::PacketMsg;
    use crate::core::ics04_channel::packet::test_utils::get_dummy_packet;
    use crate::core::ics04_channel::packet::{NoOpReason, Packet, PacketResult, Sequence};
    use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
    use crate::core::ics24_host::Path;
    use crate::events::IbcEvent;
    use crate::mock::context::MockContext;
    use crate::mock::host::MockProvableStore;
    use crate::proofs::Proofs;
    use crate::test_utils::get_dummy_connection_end;
    use crate::Height;

    fn proof_height() -> Height {
        Height::new(0, 10).unwrap()
    }

    fn ack() -> Acknowledgement {
        Acknowledgement::from(b"ok".to_vec())
    }

    /// The destination chain store holding the acknowledgement of `packet`.
    fn destination_store(packet: &Packet) -> MockProvableStore {
        MockProvableStore::default().with(
            Path::acks(
                &packet.destination_port,
                &packet.destination_channel,
                packet.sequence,
            ),
            compute_ack_commitment(&ack()).into_vec(),
        )
    }

    fn context_with(order: Order, packet: &Packet, store: &MockProvableStore) -> MockContext {
        MockContext::default()
            .with_client_store(&ClientId::default(), proof_height(), store)
            .with_connection(
                ConnectionId::default(),
                get_dummy_connection_end(ClientId::default(), ConnectionId::new(7)),
            )
            .with_channel(
                PortId::default(),
                ChannelId::default(),
                get_dummy_channel_end(State::Open, order),
            )
            .with_packet_commitment(
                PortId::default(),
                ChannelId::default(),
                packet.sequence,
                packet_commitment_of(packet),
            )
            .with_ack_sequence(PortId::default(), ChannelId::default(), Sequence::from(1))
    }

    fn msg_ack(packet: Packet, store: &MockProvableStore) -> PacketMsg {
        PacketMsg::AckPacket(MsgAcknowledgement::new(
            packet,
            ack(),
            Proofs::new(store.proof(), None, proof_height()).unwrap(),
        ))
    }

    #[test]
    fn ack_packet_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: PacketMsg,
            want_pass: bool,
            want_seq_number: Option<Sequence>,
        }

        let packet = get_dummy_packet(100, 0);
        let store = destination_store(&packet);

        let second = Packet {
            sequence: Sequence::from(2),
            ..packet.clone()
        };
        let second_store = destination_store(&second);

        let tampered = Packet {
            data: b"tampered".to_vec(),
            ..packet.clone()
        };

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because the packet data differs from the commitment"
                    .to_string(),
                ctx: context_with(Order::Unordered, &packet, &store),
                msg: msg_ack(tampered, &store),
                want_pass: false,
                want_seq_number: None,
            },
            Test {
                name: "Processing fails because the acknowledgement is not proven".to_string(),
                ctx: context_with(Order::Unordered, &packet, &MockProvableStore::default()),
                msg: msg_ack(packet.clone(), &MockProvableStore::default()),
                want_pass: false,
                want_seq_number: None,
            },
            Test {
                name: "Processing fails because an ordered channel expects sequence 1"
                    .to_string(),
                ctx: context_with(Order::Ordered, &second, &second_store),
                msg: msg_ack(second, &second_store),
                want_pass: false,
                want_seq_number: None,
            },
            Test {
                name: "Good parameters on an unordered channel".to_string(),
                ctx: context_with(Order::Unordered, &packet, &store),
                msg: msg_ack(packet.clone(), &store),
                want_pass: true,
                want_seq_number: None,
            },
            Test {
                name: "Good parameters on an ordered channel".to_string(),
                ctx: context_with(Order::Ordered, &packet, &store),
                msg: msg_ack(packet, &store),
                want_pass: true,
                want_seq_number: Some(Sequence::from(2)),
            },
        ]
        .into_iter()
        .collect();

        for test in tests {
            let capability = test
                .ctx
                .channel_capability(&PortId::default(), &ChannelId::default())
                .unwrap();

            let res = packet_dispatch(&test.ctx, &capability, &test.msg);
            match res {
                Ok(proto_output) => {
                    assert!(
                        test.want_pass,
                        "ack_packet: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    match proto_output.result {
                        PacketResult::Ack(res) => {
                            assert_eq!(res.seq, Sequence::from(1));
                            assert_eq!(res.seq_number, test.want_seq_number);
                        }
                        res => panic!("unexpected packet result {:?}", res),
                    }

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::AcknowledgePacket(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "ack_packet: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }

    #[test]
    fn ack_packet_without_commitment_is_a_no_op() {
        let packet = get_dummy_packet(100, 0);
        let store = destination_store(&packet);
        let other = Packet {
            sequence: Sequence::from(9),
            ..packet.clone()
        };
        // Only the commitment of another packet is left.
        let ctx = context_with(Order::Unordered, &other, &store);
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();

        let output = packet_dispatch(&ctx, &capability, &msg_ack(packet, &store)).unwrap();

        assert!(matches!(
            output.result,
            PacketResult::NoOp(NoOpReason::PacketCommitmentAbsent(_))
        ));
        assert!(output.events.is_empty());
    }
}
