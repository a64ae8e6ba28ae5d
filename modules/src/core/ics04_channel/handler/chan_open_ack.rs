//! Protocol logic specific to ICS4 messages of type `MsgChannelOpenAck`.

use tracing::info;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{Attributes, OpenAck};
use crate::core::ics04_channel::handler::verify::verify_channel_proofs;
use crate::core::ics04_channel::handler::{
    counterparty_connection_id, open_connection, ChannelIdState, ChannelResult,
};
use crate::core::ics04_channel::msgs::chan_open_ack::MsgChannelOpenAck;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelOpenAck,
) -> HandlerResult<ChannelResult, Error> {
    let mut output = HandlerOutput::builder();

    // Unwrap the old channel end and validate it against the message.
    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    // Validate that the channel end is in a state where it can be ack.
    if !channel_end.state_matches(&State::Init) && !channel_end.state_matches(&State::TryOpen) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    // An OPEN IBC connection running on the local (host) chain should exist.
    let conn = open_connection(ctx, &channel_end)?;

    // Proof verification in two steps:
    // 1. Setup: build the Channel as we expect to find it on the other party.
    let expected_counterparty =
        Counterparty::new(msg.port_id.clone(), Some(msg.channel_id.clone()));

    let expected_channel_end = ChannelEnd::new(
        State::TryOpen,
        channel_end.ordering,
        expected_counterparty,
        vec![counterparty_connection_id(&conn)?],
        msg.counterparty_version.clone(),
    );

    // set the counterparty channel id to verify against it
    channel_end.set_counterparty_channel_id(msg.counterparty_channel_id.clone());

    //2. Verify proofs
    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &expected_channel_end,
    )?;

    output.log("success: channel open ack");

    // Transition the channel end to the new state & pick a version.
    channel_end.set_state(State::Open);
    channel_end.set_version(msg.counterparty_version.clone());

    info!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        version = %channel_end.version,
        "channel open"
    );

    output.emit(
        OpenAck(Attributes {
            port_id: msg.port_id.clone(),
            channel_id: Some(msg.channel_id.clone()),
            connection_id: channel_end.connection_hop()?.clone(),
            counterparty_port_id: channel_end.counterparty().port_id().clone(),
            counterparty_channel_id: Some(msg.counterparty_channel_id.clone()),
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

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics03_connection::connection::State as ConnectionState;
    use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, Order, State};
    use crate::core::ics04_channel::handler::{channel_dispatch, ChannelIdState};
    use crate::core::ics04_channel::msgs::chan_open_ack::MsgChannelOpenAck;
    use crate::core::ics04_channel::msgs::ChannelMsg;
    use crate::core::ics04_channel::Version;
    use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
    use crate::core::ics24_host::Path;
    use crate::events::IbcEvent;
    use crate::mock::context::MockContext;
    use crate::mock::host::MockProvableStore;
    use crate::proofs::Proofs;
    use crate::test_utils::get_dummy_connection_end;
    use crate::Height;

    #[test]
    fn chan_open_ack_msg_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: ChannelMsg,
            want_pass: bool,
        }

        let proof_height = Height::new(0, 10).unwrap();
        let client_id = ClientId::default();
        let conn_id = ConnectionId::default();
        let counterparty_conn_id = ConnectionId::new(7);
        let port_id = PortId::default();
        let chan_id = ChannelId::new(0);
        let counterparty_chan_id = ChannelId::new(5);
        let version = Version::from("ics20-1");

        let conn_end = get_dummy_connection_end(client_id.clone(), counterparty_conn_id.clone());

        // The local end, as written by `ChanOpenInit`.
        let init_end = ChannelEnd::new(
            State::Init,
            Order::Unordered,
            Counterparty::new(port_id.clone(), None),
            vec![conn_id.clone()],
            version.clone(),
        );

        // The counterparty end, as written by `ChanOpenTry`.
        let counterparty_end = ChannelEnd::new(
            State::TryOpen,
            Order::Unordered,
            Counterparty::new(port_id.clone(), Some(chan_id.clone())),
            vec![counterparty_conn_id],
            version.clone(),
        );
        let store = MockProvableStore::default().with(
            Path::ChannelEnds(port_id.clone(), counterparty_chan_id.clone()),
            counterparty_end.encode_vec().unwrap(),
        );

        let msg = MsgChannelOpenAck::new(
            port_id.clone(),
            chan_id.clone(),
            counterparty_chan_id.clone(),
            version.clone(),
            Proofs::new(store.proof(), None, proof_height).unwrap(),
        );

        let ctx_with = |end: ChannelEnd| {
            MockContext::default()
                .with_client_store(&client_id, proof_height, &store)
                .with_connection(conn_id.clone(), conn_end.clone())
                .with_channel(port_id.clone(), chan_id.clone(), end)
        };

        let mut open_end = init_end.clone();
        open_end.set_state(State::Open);

        let mut closed_conn = conn_end.clone();
        closed_conn.set_state(ConnectionState::Init);

        let mut msg_wrong_chan = msg.clone();
        msg_wrong_chan.counterparty_channel_id = ChannelId::new(6);

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because no channel exists in the context".to_string(),
                ctx: MockContext::default()
                    .with_client_store(&client_id, proof_height, &store)
                    .with_connection(conn_id.clone(), conn_end.clone()),
                msg: ChannelMsg::ChannelOpenAck(msg.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the channel is already open".to_string(),
                ctx: ctx_with(open_end),
                msg: ChannelMsg::ChannelOpenAck(msg.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the connection is not open".to_string(),
                ctx: MockContext::default()
                    .with_client_store(&client_id, proof_height, &store)
                    .with_connection(conn_id.clone(), closed_conn)
                    .with_channel(port_id.clone(), chan_id.clone(), init_end.clone()),
                msg: ChannelMsg::ChannelOpenAck(msg.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the counterparty channel id is not the proven one"
                    .to_string(),
                ctx: ctx_with(init_end.clone()),
                msg: ChannelMsg::ChannelOpenAck(msg_wrong_chan),
                want_pass: false,
            },
            Test {
                name: "Good parameters".to_string(),
                ctx: ctx_with(init_end),
                msg: ChannelMsg::ChannelOpenAck(msg),
                want_pass: true,
            },
        ]
        .into_iter()
        .collect();

        for test in tests {
            let res = channel_dispatch(&test.ctx, &test.msg);
            // Additionally check the events and the output objects in the result.
            match res {
                Ok(proto_output) => {
                    assert!(
                        test.want_pass,
                        "chan_open_ack: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    assert!(!proto_output.events.is_empty()); // Some events must exist.

                    // The object in the output is a ChannelEnd, should have open state.
                    assert_eq!(proto_output.result.channel_end.state().clone(), State::Open);
                    assert_eq!(
                        proto_output.result.channel_end.counterparty().channel_id(),
                        Some(&counterparty_chan_id)
                    );
                    assert_eq!(
                        proto_output.result.channel_id_state,
                        ChannelIdState::Reused
                    );

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::OpenAckChannel(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "chan_open_ack: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }
}
