use tracing::debug;

use crate::core::ics04_channel::channel::{Counterparty, Order, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::ReceivePacket;
use crate::core::ics04_channel::handler::{open_connection, pending_ordering_change};
use crate::core::ics04_channel::handler::verify::verify_packet_recv_proofs;
use crate::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
use crate::core::ics04_channel::packet::{NoOpReason, PacketResult, Receipt, Sequence};
use crate::core::ics04_channel::timeout::{timeout_timestamp_reached, TimeoutHeight};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub enum RecvPacketResult {
    Ordered {
        port_id: PortId,
        channel_id: ChannelId,
        next_seq_recv: Sequence,
    },
    Unordered {
        port_id: PortId,
        channel_id: ChannelId,
        sequence: Sequence,
        receipt: Receipt,
    },
}

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    msg: &MsgRecvPacket,
) -> HandlerResult<PacketResult, Error> {
    let mut output = HandlerOutput::builder();

    let packet = &msg.packet;

    let dest_channel_end =
        ctx.channel_end(&packet.destination_port, &packet.destination_channel)?;

    ctx.authenticate_channel_capability(
        &packet.destination_port,
        &packet.destination_channel,
        capability,
    )?;

    if !dest_channel_end.state.allows_packets() {
        return Err(Error::invalid_channel_state(
            packet.destination_channel.clone(),
            dest_channel_end.state,
        ));
    }

    let counterparty = Counterparty::new(
        packet.source_port.clone(),
        Some(packet.source_channel.clone()),
    );

    if !dest_channel_end.counterparty_matches(&counterparty) {
        return Err(Error::invalid_packet_counterparty(
            packet.source_port.clone(),
            packet.source_channel.clone(),
        ));
    }

    // Once acknowledged, an ordering change only lets through packets sent under the new
    // ordering: the counterparty flushed the others before answering.
    if dest_channel_end.state_matches(&State::AckUpgrade)
        && pending_ordering_change(
            ctx,
            &packet.destination_port,
            &packet.destination_channel,
            &dest_channel_end,
        )?
        .is_some()
    {
        return Err(Error::ordering_change_pending(
            packet.destination_channel.clone(),
        ));
    }

    let connection_end = open_connection(ctx, &dest_channel_end)?;

    // Check if packet height is newer than the height of the local host chain
    let latest_height = ctx.host_height();
    if let TimeoutHeight::At(timeout_height) = packet.timeout_height {
        if latest_height >= timeout_height {
            return Err(Error::low_packet_height(latest_height, timeout_height));
        }
    }

    // Check if packet timestamp is newer than the local host chain timestamp
    if timeout_timestamp_reached(&packet.timeout_timestamp, &ctx.host_timestamp()) {
        return Err(Error::low_packet_timestamp());
    }

    verify_packet_recv_proofs(ctx, packet, &connection_end, &msg.proofs)?;

    // Below the receive counter of an ordered channel, or of one that was ordered before an
    // upgrade, every packet was received already.
    let next_seq_recv =
        ctx.get_next_sequence_recv(&packet.destination_port, &packet.destination_channel)?;
    if packet.sequence < next_seq_recv {
        output.log("no-op: packet already received");
        return Ok(output.with_result(PacketResult::NoOp(
            NoOpReason::PacketAlreadyReceived(packet.sequence),
        )));
    }

    let result = if dest_channel_end.order_matches(&Order::Ordered) {
        if packet.sequence != next_seq_recv {
            return Err(Error::invalid_packet_sequence(
                packet.sequence,
                next_seq_recv,
            ));
        }

        RecvPacketResult::Ordered {
            port_id: packet.destination_port.clone(),
            channel_id: packet.destination_channel.clone(),
            next_seq_recv: next_seq_recv.increment(),
        }
    } else {
        if ctx.has_packet_receipt(
            &packet.destination_port,
            &packet.destination_channel,
            packet.sequence,
        ) {
            // A relayer raced us to it: nothing to do, and nothing to emit.
            output.log("no-op: packet already received");
            return Ok(output.with_result(PacketResult::NoOp(
                NoOpReason::PacketAlreadyReceived(packet.sequence),
            )));
        }

        // store a receipt that does not contain any data
        RecvPacketResult::Unordered {
            port_id: packet.destination_port.clone(),
            channel_id: packet.destination_channel.clone(),
            sequence: packet.sequence,
            receipt: Receipt::Ok,
        }
    };

    output.log("success: packet receive");
    debug!(
        port_id = %packet.destination_port,
        channel_id = %packet.destination_channel,
        sequence = %packet.sequence,
        "packet received"
    );

    output.emit(
        ReceivePacket {
            packet: packet.clone(),
        }
        .into(),
    );

    Ok(output.with_result(PacketResult::Recv(result)))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{Order, State};
    use crate::core::ics04_channel::commitment::packet_commitment_of;
    use crate::core::ics04_channel::handler::packet_dispatch;
    use crate::core::ics04_channel::handler::recv_packet::RecvPacketResult;
    use crate::core::ics04_channel::msgs::recv_packet::MsgRecvPacket;
    use crate::core::ics04_channel::msgs::PacketMsg;
    use crate::core::ics04_channel::packet::test_utils::get_dummy_packet;
    use crate::core::ics04_channel::packet::{NoOpReason, Packet, PacketResult, Sequence};
    use crate::core::ics04_channel::upgrade::{Upgrade, UpgradeFields, UpgradeTimeout};
    use crate::core::ics04_channel::Version;
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

    /// The source chain store committing to `packet`.
    fn source_store(packet: &Packet) -> MockProvableStore {
        MockProvableStore::default().with(
            Path::commitments(&packet.source_port, &packet.source_channel, packet.sequence),
            packet_commitment_of(packet).into_vec(),
        )
    }

    fn context_with(state: State, order: Order, store: &MockProvableStore) -> MockContext {
        MockContext::default()
            .with_client_store(&ClientId::default(), proof_height(), store)
            .with_connection(
                ConnectionId::default(),
                get_dummy_connection_end(ClientId::default(), ConnectionId::new(7)),
            )
            .with_channel(
                PortId::default(),
                ChannelId::default(),
                get_dummy_channel_end(state, order),
            )
            .with_recv_sequence(PortId::default(), ChannelId::default(), Sequence::from(1))
    }

    /// An unordered channel end that acknowledged an upgrade to `ordering`.
    fn acknowledged_upgrade_to(ordering: Order, store: &MockProvableStore) -> MockContext {
        let upgrade = Upgrade::new(
            UpgradeFields::new(
                ordering,
                vec![ConnectionId::default()],
                Version::from("ics20-2"),
            ),
            UpgradeTimeout::at_height(Height::new(0, 100).unwrap()),
            Sequence::from(0),
        );
        context_with(State::AckUpgrade, Order::Unordered, store).with_upgrade(
            PortId::default(),
            ChannelId::default(),
            upgrade,
        )
    }

    fn msg_recv(packet: Packet, store: &MockProvableStore) -> PacketMsg {
        PacketMsg::RecvPacket(MsgRecvPacket::new(
            packet,
            Proofs::new(store.proof(), None, proof_height()).unwrap(),
        ))
    }

    #[test]
    fn recv_packet_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: PacketMsg,
            want_pass: bool,
        }

        let packet = get_dummy_packet(100, 0);
        let store = source_store(&packet);

        let second = Packet {
            sequence: Sequence::from(2),
            ..packet.clone()
        };
        let second_store = source_store(&second);

        let expired = get_dummy_packet(5, 0);
        let expired_store = source_store(&expired);

        let foreign = Packet {
            source_channel: ChannelId::new(3),
            ..packet.clone()
        };
        let foreign_store = source_store(&foreign);

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because no channel exists in the context".to_string(),
                ctx: MockContext::default(),
                msg: msg_recv(packet.clone(), &store),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the channel is closed".to_string(),
                ctx: context_with(State::Closed, Order::Unordered, &store),
                msg: msg_recv(packet.clone(), &store),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the packet comes from another channel"
                    .to_string(),
                ctx: context_with(State::Open, Order::Unordered, &foreign_store),
                msg: msg_recv(foreign, &foreign_store),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the packet timed out at the host height"
                    .to_string(),
                ctx: context_with(State::Open, Order::Unordered, &expired_store),
                msg: msg_recv(expired, &expired_store),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the packet was never sent".to_string(),
                ctx: context_with(State::Open, Order::Unordered, &MockProvableStore::default()),
                msg: msg_recv(packet.clone(), &MockProvableStore::default()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because an ordered channel expects sequence 1"
                    .to_string(),
                ctx: context_with(State::Open, Order::Ordered, &second_store),
                msg: msg_recv(second.clone(), &second_store),
                want_pass: false,
            },
            Test {
                name: "Processing fails while an acknowledged upgrade changes the ordering"
                    .to_string(),
                ctx: acknowledged_upgrade_to(Order::Ordered, &second_store),
                msg: msg_recv(second.clone(), &second_store),
                want_pass: false,
            },
            Test {
                name: "Good parameters on an unordered channel".to_string(),
                ctx: context_with(State::Open, Order::Unordered, &store),
                msg: msg_recv(packet.clone(), &store),
                want_pass: true,
            },
            Test {
                name: "Good parameters on an ordered channel".to_string(),
                ctx: context_with(State::Open, Order::Ordered, &store),
                msg: msg_recv(packet.clone(), &store),
                want_pass: true,
            },
            Test {
                name: "Good parameters while the channel is upgrading".to_string(),
                ctx: acknowledged_upgrade_to(Order::Unordered, &second_store),
                msg: msg_recv(second, &second_store),
                want_pass: true,
            },
        ]
        .into_iter()
        .collect();

        for test in tests {
            let capability = match test
                .ctx
                .channel_capability(&PortId::default(), &ChannelId::default())
            {
                Some(capability) => capability,
                None => {
                    assert!(!test.want_pass, "recv_packet: no capability for test: {}", test.name);
                    continue;
                }
            };

            let res = packet_dispatch(&test.ctx, &capability, &test.msg);
            match res {
                Ok(proto_output) => {
                    assert!(
                        test.want_pass,
                        "recv_packet: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    match proto_output.result {
                        PacketResult::Recv(RecvPacketResult::Ordered { next_seq_recv, .. }) => {
                            assert_eq!(next_seq_recv, Sequence::from(2))
                        }
                        PacketResult::Recv(RecvPacketResult::Unordered { .. }) => {}
                        res => panic!("unexpected packet result {:?}", res),
                    }

                    assert!(!proto_output.events.is_empty()); // Some events must exist.

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::ReceivePacket(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "recv_packet: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }

    #[test]
    fn recv_packet_duplicate_on_unordered_channel_is_a_no_op() {
        let packet = get_dummy_packet(100, 0);
        let store = source_store(&packet);
        let ctx = context_with(State::Open, Order::Unordered, &store).with_packet_receipt(
            PortId::default(),
            ChannelId::default(),
            Sequence::from(1),
        );
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();

        let output = packet_dispatch(&ctx, &capability, &msg_recv(packet, &store)).unwrap();

        assert!(matches!(
            output.result,
            PacketResult::NoOp(NoOpReason::PacketAlreadyReceived(seq)) if seq == Sequence::from(1)
        ));
        assert!(output.events.is_empty());
    }

    #[test]
    fn recv_packet_replay_on_ordered_channel_is_a_no_op() {
        let packet = get_dummy_packet(100, 0);
        let store = source_store(&packet);
        let ctx = context_with(State::Open, Order::Ordered, &store).with_recv_sequence(
            PortId::default(),
            ChannelId::default(),
            Sequence::from(2),
        );
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();

        let output = packet_dispatch(&ctx, &capability, &msg_recv(packet, &store)).unwrap();

        assert!(matches!(
            output.result,
            PacketResult::NoOp(NoOpReason::PacketAlreadyReceived(seq)) if seq == Sequence::from(1)
        ));
        assert!(output.events.is_empty());
    }

    #[test]
    fn recv_packet_below_the_receive_counter_of_a_formerly_ordered_channel_is_a_no_op() {
        // Sequence 1 was received while the channel was ordered, so it has no receipt.
        let packet = get_dummy_packet(100, 0);
        let store = source_store(&packet);
        let ctx = context_with(State::Open, Order::Unordered, &store).with_recv_sequence(
            PortId::default(),
            ChannelId::default(),
            Sequence::from(2),
        );
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();

        let output = packet_dispatch(&ctx, &capability, &msg_recv(packet, &store)).unwrap();

        assert!(matches!(
            output.result,
            PacketResult::NoOp(NoOpReason::PacketAlreadyReceived(_))
        ));

        let second = Packet {
            sequence: Sequence::from(2),
            ..get_dummy_packet(100, 0)
        };
        let second_store = source_store(&second);
        let ctx = context_with(State::Open, Order::Unordered, &second_store).with_recv_sequence(
            PortId::default(),
            ChannelId::default(),
            Sequence::from(2),
        );
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();
        let output =
            packet_dispatch(&ctx, &capability, &msg_recv(second, &second_store)).unwrap();
        assert!(matches!(
            output.result,
            PacketResult::Recv(RecvPacketResult::Unordered { .. })
        ));
    }
}
