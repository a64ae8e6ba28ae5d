//! Protocol logic specific to ICS4 messages of type `MsgChannelOpenConfirm`.

use tracing::info;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{Attributes, OpenConfirm};
use crate::core::ics04_channel::handler::verify::verify_channel_proofs;
use crate::core::ics04_channel::handler::{
    counterparty_connection_id, open_connection, ChannelIdState, ChannelResult,
};
use crate::core::ics04_channel::msgs::chan_open_confirm::MsgChannelOpenConfirm;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelOpenConfirm,
) -> HandlerResult<ChannelResult, Error> {
    let mut output = HandlerOutput::builder();

    // Unwrap the old channel end and validate it against the message.
    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    // Validate that the channel end is in a state where it can be confirmed.
    if !channel_end.state_matches(&State::TryOpen) {
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
        State::Open,
        channel_end.ordering,
        expected_counterparty,
        vec![counterparty_connection_id(&conn)?],
        channel_end.version().clone(),
    );

    //2. Verify proofs
    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &channel_end,
        &conn,
        &expected_channel_end,
    )?;

    output.log("success: channel open confirm ");

    // Transition the channel end to the new state.
    channel_end.set_state(State::Open);

    info!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        version = %channel_end.version,
        "channel open"
    );

    output.emit(
        OpenConfirm(Attributes {
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

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, Order, State};
    use crate::core::ics04_channel::handler::channel_dispatch;
    use crate::core::ics04_channel::msgs::chan_open_confirm::MsgChannelOpenConfirm;
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
    fn chan_open_confirm_msg_processing() {
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

        // The local end, as written by `ChanOpenTry`.
        let try_end = ChannelEnd::new(
            State::TryOpen,
            Order::Ordered,
            Counterparty::new(port_id.clone(), Some(counterparty_chan_id.clone())),
            vec![conn_id.clone()],
            version.clone(),
        );

        // The counterparty end, as written by `ChanOpenAck`.
        let counterparty_end = ChannelEnd::new(
            State::Open,
            Order::Ordered,
            Counterparty::new(port_id.clone(), Some(chan_id.clone())),
            vec![counterparty_conn_id],
            version,
        );
        let counterparty_path = Path::ChannelEnds(port_id.clone(), counterparty_chan_id);
        let store = MockProvableStore::default()
            .with(counterparty_path.clone(), counterparty_end.encode_vec().unwrap());

        let mut counterparty_init = counterparty_end;
        counterparty_init.set_state(State::Init);
        let init_store = MockProvableStore::default()
            .with(counterparty_path, counterparty_init.encode_vec().unwrap());

        let msg = MsgChannelOpenConfirm::new(
            port_id.clone(),
            chan_id.clone(),
            Proofs::new(store.proof(), None, proof_height).unwrap(),
        );
        let msg_init_proof = MsgChannelOpenConfirm::new(
            port_id.clone(),
            chan_id.clone(),
            Proofs::new(init_store.proof(), None, proof_height).unwrap(),
        );

        let mut init_end = try_end.clone();
        init_end.set_state(State::Init);

        let ctx_with = |end: ChannelEnd, store: &MockProvableStore| {
            MockContext::default()
                .with_client_store(&client_id, proof_height, store)
                .with_connection(conn_id.clone(), conn_end.clone())
                .with_channel(port_id.clone(), chan_id.clone(), end)
        };

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because the channel is not in TRYOPEN".to_string(),
                ctx: ctx_with(init_end, &store),
                msg: ChannelMsg::ChannelOpenConfirm(msg.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the counterparty is not OPEN".to_string(),
                ctx: ctx_with(try_end.clone(), &init_store),
                msg: ChannelMsg::ChannelOpenConfirm(msg_init_proof),
                want_pass: false,
            },
            Test {
                name: "Good parameters".to_string(),
                ctx: ctx_with(try_end, &store),
                msg: ChannelMsg::ChannelOpenConfirm(msg),
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
                        "chan_open_confirm: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    assert!(!proto_output.events.is_empty()); // Some events must exist.

                    // The object in the output is a ChannelEnd, should have open state.
                    assert_eq!(proto_output.result.channel_end.state().clone(), State::Open);

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::OpenConfirmChannel(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "chan_open_confirm: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }
}
