use tracing::debug;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::commitment::{packet_commitment_of, PacketCommitment};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::SendPacket;
use crate::core::ics04_channel::handler::pending_ordering_change;
use crate::core::ics04_channel::packet::{OutgoingPacket, Packet, PacketResult, Sequence};
use crate::core::ics04_channel::timeout::{timeout_timestamp_reached, TimeoutHeight};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

#[derive(Clone, Debug)]
pub struct SendPacketResult {
    pub port_id: PortId,
    pub channel_id: ChannelId,
    pub seq: Sequence,
    pub seq_number: Sequence,
    pub commitment: PacketCommitment,
}

/// Commits to a packet the application holding `capability` sends over its channel end.
/// The packet is numbered with the next send sequence of the channel.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    outgoing: OutgoingPacket,
) -> HandlerResult<PacketResult, Error> {
    let mut output = HandlerOutput::builder();

    let source_channel_end = ctx.channel_end(&outgoing.source_port, &outgoing.source_channel)?;

    ctx.authenticate_channel_capability(
        &outgoing.source_port,
        &outgoing.source_channel,
        capability,
    )?;

    if source_channel_end.state_matches(&State::Closed) {
        return Err(Error::channel_closed(outgoing.source_channel));
    }
    if !source_channel_end.state.allows_packets() {
        return Err(Error::invalid_channel_state(
            outgoing.source_channel,
            source_channel_end.state,
        ));
    }
    if pending_ordering_change(
        ctx,
        &outgoing.source_port,
        &outgoing.source_channel,
        &source_channel_end,
    )?
    .is_some()
    {
        return Err(Error::ordering_change_pending(outgoing.source_channel));
    }

    if outgoing.data.is_empty() {
        return Err(Error::zero_packet_data());
    }
    if !outgoing.timeout_height.is_set() && !outgoing.timeout_timestamp.is_set() {
        return Err(Error::missing_timeout());
    }

    let counterparty = source_channel_end.counterparty();
    let destination_channel = counterparty
        .channel_id()
        .cloned()
        .ok_or_else(Error::missing_counterparty_channel_id)?;

    let connection_end = ctx
        .connection_end(source_channel_end.connection_hop()?)
        .map_err(Error::ics03_connection)?;

    let client_id = connection_end.client_id();
    let client_state = ctx.client_state(client_id).map_err(Error::ics02_client)?;

    // prevent accidental sends with clients that cannot be updated
    if client_state.is_frozen() {
        return Err(Error::frozen_client(client_id.clone()));
    }

    // The destination must not have passed the timeout already, as far as the client knows.
    let latest_height = client_state.latest_height();
    if let TimeoutHeight::At(timeout_height) = outgoing.timeout_height {
        if timeout_height <= latest_height {
            return Err(Error::timeout_height_already_reached(
                timeout_height,
                latest_height,
            ));
        }
    }

    let consensus_state = ctx
        .client_consensus_state(client_id, latest_height)
        .map_err(Error::ics02_client)?;
    let latest_timestamp = consensus_state.timestamp();
    if timeout_timestamp_reached(&outgoing.timeout_timestamp, &latest_timestamp) {
        return Err(Error::timeout_timestamp_already_reached(
            outgoing.timeout_timestamp,
            latest_timestamp,
        ));
    }

    let next_seq_send =
        ctx.get_next_sequence_send(&outgoing.source_port, &outgoing.source_channel)?;

    let packet = Packet {
        sequence: next_seq_send,
        source_port: outgoing.source_port,
        source_channel: outgoing.source_channel,
        destination_port: counterparty.port_id().clone(),
        destination_channel,
        data: outgoing.data,
        timeout_height: outgoing.timeout_height,
        timeout_timestamp: outgoing.timeout_timestamp,
    };

    output.log("success: packet send");
    debug!(
        port_id = %packet.source_port,
        channel_id = %packet.source_channel,
        sequence = %packet.sequence,
        "packet sent"
    );

    let result = PacketResult::Send(SendPacketResult {
        port_id: packet.source_port.clone(),
        channel_id: packet.source_channel.clone(),
        seq: packet.sequence,
        seq_number: next_seq_send.increment(),
        commitment: packet_commitment_of(&packet),
    });

    output.emit(SendPacket { packet }.into());

    Ok(output.with_result(result))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{Order, State};
    use crate::core::ics04_channel::commitment::packet_commitment_of;
    use crate::core::ics04_channel::error;
    use crate::core::ics04_channel::handler::send_packet::process;
    use crate::core::ics04_channel::packet::{OutgoingPacket, PacketResult, Sequence};
    use crate::core::ics04_channel::timeout::TimeoutHeight;
    use crate::core::ics04_channel::upgrade::{Upgrade, UpgradeFields, UpgradeTimeout};
    use crate::core::ics04_channel::Version;
    use crate::core::ics05_port::capabilities::{Capability, ChannelCapability};
    use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
    use crate::events::IbcEvent;
    use crate::mock::context::MockContext;
    use crate::mock::host::block_timestamp;
    use crate::test_utils::get_dummy_connection_end;
    use crate::timestamp::Timestamp;
    use crate::Height;

    fn client_height() -> Height {
        Height::new(0, 10).unwrap()
    }

    fn context_with(state: State) -> MockContext {
        MockContext::default()
            .with_client(&ClientId::default(), client_height())
            .with_connection(
                ConnectionId::default(),
                get_dummy_connection_end(ClientId::default(), ConnectionId::new(7)),
            )
            .with_channel(
                PortId::default(),
                ChannelId::default(),
                get_dummy_channel_end(state, Order::Unordered),
            )
            .with_send_sequence(PortId::default(), ChannelId::default(), Sequence::from(1))
    }

    /// An upgrade of the channel to `ordering` and version `ics20-2`.
    fn upgrade_to(ordering: Order) -> Upgrade {
        Upgrade::new(
            UpgradeFields::new(
                ordering,
                vec![ConnectionId::default()],
                Version::from("ics20-2"),
            ),
            UpgradeTimeout::at_height(Height::new(0, 100).unwrap()),
            Sequence::from(0),
        )
    }

    fn upgrading_context(ordering: Order) -> MockContext {
        context_with(State::TryUpgrade).with_upgrade(
            PortId::default(),
            ChannelId::default(),
            upgrade_to(ordering),
        )
    }

    fn outgoing(timeout_height: u64, timeout_timestamp: Timestamp) -> OutgoingPacket {
        let timeout_height = match timeout_height {
            0 => TimeoutHeight::Never,
            h => TimeoutHeight::At(Height::new(0, h).unwrap()),
        };
        OutgoingPacket::new(
            PortId::default(),
            ChannelId::default(),
            b"ping".to_vec(),
            timeout_height,
            timeout_timestamp,
        )
    }

    #[test]
    fn send_packet_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            packet: OutgoingPacket,
            want_pass: bool,
        }

        let consensus_timestamp = block_timestamp(client_height());
        let later = Timestamp::from_nanoseconds(consensus_timestamp.nanoseconds() + 1).unwrap();

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because no channel exists in the context".to_string(),
                ctx: MockContext::default(),
                packet: outgoing(100, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the channel is closed".to_string(),
                ctx: context_with(State::Closed),
                packet: outgoing(100, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the channel is not open yet".to_string(),
                ctx: context_with(State::Init),
                packet: outgoing(100, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because no timeout is set".to_string(),
                ctx: context_with(State::Open),
                packet: outgoing(0, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the data is empty".to_string(),
                ctx: context_with(State::Open),
                packet: OutgoingPacket {
                    data: vec![],
                    ..outgoing(100, Timestamp::none())
                },
                want_pass: false,
            },
            Test {
                name: "Processing fails because the timeout height is the client height"
                    .to_string(),
                ctx: context_with(State::Open),
                packet: outgoing(10, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the timeout timestamp is reached".to_string(),
                ctx: context_with(State::Open),
                packet: outgoing(0, consensus_timestamp),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the client is frozen".to_string(),
                ctx: context_with(State::Open).with_frozen_client(&ClientId::default()),
                packet: outgoing(100, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Good parameters with a timeout height".to_string(),
                ctx: context_with(State::Open),
                packet: outgoing(11, Timestamp::none()),
                want_pass: true,
            },
            Test {
                name: "Good parameters with a timeout timestamp".to_string(),
                ctx: context_with(State::Open),
                packet: outgoing(0, later),
                want_pass: true,
            },
            Test {
                name: "Processing fails while an upgrade changes the ordering".to_string(),
                ctx: upgrading_context(Order::Ordered),
                packet: outgoing(100, Timestamp::none()),
                want_pass: false,
            },
            Test {
                name: "Good parameters while the channel is upgrading".to_string(),
                ctx: upgrading_context(Order::Unordered),
                packet: outgoing(100, Timestamp::none()),
                want_pass: true,
            },
        ]
        .into_iter()
        .collect();

        for test in tests {
            let capability = test
                .ctx
                .channel_capability(&PortId::default(), &ChannelId::default())
                .unwrap_or_else(|| ChannelCapability::from(Capability::new(u64::MAX)));

            let res = process(&test.ctx, &capability, test.packet.clone());
            match res {
                Ok(proto_output) => {
                    assert!(
                        test.want_pass,
                        "send_packet: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.packet,
                    );

                    let res = match proto_output.result {
                        PacketResult::Send(res) => res,
                        res => panic!("unexpected packet result {:?}", res),
                    };
                    assert_eq!(res.seq, Sequence::from(1));
                    assert_eq!(res.seq_number, Sequence::from(2));

                    match proto_output.events.as_slice() {
                        [IbcEvent::SendPacket(ev)] => {
                            assert_eq!(ev.packet.sequence, Sequence::from(1));
                            assert_eq!(ev.packet.destination_channel, ChannelId::default());
                            assert_eq!(packet_commitment_of(&ev.packet), res.commitment);
                        }
                        events => panic!("unexpected events {:?}", events),
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "send_packet: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.packet,
                        e,
                    );
                }
            }
        }
    }

    #[test]
    fn send_packet_requires_the_channel_capability() {
        let ctx = context_with(State::Open);
        let forged = ChannelCapability::from(Capability::new(u64::MAX));

        match process(&ctx, &forged, outgoing(100, Timestamp::none())) {
            Err(e) => assert!(matches!(
                e.detail(),
                error::ErrorDetail::InvalidChannelCapability(_)
            )),
            Ok(_) => panic!("a packet was sent with a forged capability"),
        }
    }

    #[test]
    fn send_packet_pauses_while_the_ordering_changes() {
        let ctx = upgrading_context(Order::Ordered);
        let capability = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();

        match process(&ctx, &capability, outgoing(100, Timestamp::none())) {
            Err(e) => assert!(matches!(
                e.detail(),
                error::ErrorDetail::OrderingChangePending(_)
            )),
            Ok(_) => panic!("a packet was sent while the ordering changes"),
        }
    }
}
