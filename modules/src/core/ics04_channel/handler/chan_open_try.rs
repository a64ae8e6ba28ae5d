//! Protocol logic specific to ICS4 messages of type `MsgChannelOpenTry`.

use tracing::debug;

use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{Attributes, OpenTry};
use crate::core::ics04_channel::handler::verify::verify_channel_proofs;
use crate::core::ics04_channel::handler::{
    counterparty_connection_id, open_connection, ChannelIdState, ChannelResult,
};
use crate::core::ics04_channel::msgs::chan_open_try::MsgChannelOpenTry;
use crate::core::ics24_host::identifier::ChannelId;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelOpenTry,
) -> HandlerResult<ChannelResult, Error> {
    let mut output = HandlerOutput::builder();

    let counterparty_channel_id = msg
        .channel
        .counterparty()
        .channel_id()
        .ok_or_else(Error::missing_counterparty_channel_id)?;

    // An OPEN IBC connection running on the local (host) chain should exist.
    let conn = open_connection(ctx, &msg.channel)?;
    let conn_id = msg.channel.connection_hop()?;

    if !conn
        .versions()
        .iter()
        .any(|version| version.supports_order(msg.channel.ordering))
    {
        return Err(Error::channel_feature_not_supported_by_connection());
    }

    // The version is the counterparty's until the application picks its own.
    let new_channel_end = ChannelEnd::new(
        State::TryOpen,
        msg.channel.ordering,
        msg.channel.counterparty().clone(),
        msg.channel.connection_hops().clone(),
        msg.counterparty_version.clone(),
    );

    // Proof verification in two steps:
    // 1. Setup: build the Channel as we expect to find it on the other party.
    //      the port should be identical with the port we're using; the channel id should not be set
    //      since the counterparty cannot know yet which ID did we choose.
    let expected_counterparty = Counterparty::new(msg.port_id.clone(), None);
    let expected_connection_hops = vec![counterparty_connection_id(&conn)?];

    // The other party should be storing a channel end in this configuration.
    let expected_channel_end = ChannelEnd::new(
        State::Init,
        msg.channel.ordering,
        expected_counterparty,
        expected_connection_hops,
        msg.counterparty_version.clone(),
    );

    // 2. Actual proofs are verified now.
    verify_channel_proofs(
        ctx,
        msg.proofs.height(),
        msg.proofs.object_proof(),
        &new_channel_end,
        &conn,
        &expected_channel_end,
    )?;

    // Channel identifier construction.
    let id_counter = ctx.channel_counter()?;
    let chan_id = ChannelId::new(id_counter);

    output.log(format!(
        "success: generated new channel identifier: {}",
        chan_id
    ));
    output.log("success: channel open try");
    debug!(port_id = %msg.port_id, channel_id = %chan_id, "channel open try");

    output.emit(
        OpenTry(Attributes {
            port_id: msg.port_id.clone(),
            channel_id: Some(chan_id.clone()),
            connection_id: conn_id.clone(),
            counterparty_port_id: msg.channel.counterparty().port_id().clone(),
            counterparty_channel_id: Some(counterparty_channel_id.clone()),
        })
        .into(),
    );

    let result = ChannelResult {
        port_id: msg.port_id.clone(),
        channel_id: chan_id,
        channel_id_state: ChannelIdState::Generated,
        channel_end: new_channel_end,
    };

    Ok(output.with_result(result))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{ChannelEnd, Counterparty, Order, State};
    use crate::core::ics04_channel::error;
    use crate::core::ics04_channel::handler::channel_dispatch;
    use crate::core::ics04_channel::msgs::chan_open_try::MsgChannelOpenTry;
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
    fn chan_open_try_msg_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: ChannelMsg,
            want_pass: bool,
        }

        // Some general-purpose variable to parametrize the messages and the context.
        let proof_height = Height::new(0, 10).unwrap();
        let client_id = ClientId::default();
        let conn_id = ConnectionId::default();
        let counterparty_conn_id = ConnectionId::new(7);
        let version = Version::from("ics20-1");

        // This is the connection underlying the channel we're trying to open.
        let conn_end = get_dummy_connection_end(client_id.clone(), counterparty_conn_id.clone());

        // The channel end the counterparty chain stores after its `ChanOpenInit`.
        let counterparty_end = ChannelEnd::new(
            State::Init,
            Order::Unordered,
            Counterparty::new(PortId::default(), None),
            vec![counterparty_conn_id],
            version.clone(),
        );
        let counterparty_path = Path::ChannelEnds(PortId::default(), ChannelId::default());
        let store = MockProvableStore::default()
            .with(counterparty_path.clone(), counterparty_end.encode_vec().unwrap());

        let msg = MsgChannelOpenTry::new(
            PortId::default(),
            get_dummy_channel_end(State::TryOpen, Order::Unordered),
            version.clone(),
            Proofs::new(store.proof(), None, proof_height).unwrap(),
        );

        // A counterparty that already moved on.
        let mut open_end = counterparty_end.clone();
        open_end.set_state(State::Open);
        let open_store =
            MockProvableStore::default().with(counterparty_path, open_end.encode_vec().unwrap());

        let mut msg_no_counterparty_id = msg.clone();
        msg_no_counterparty_id.channel.remote.channel_id = None;

        let mut msg_other_version = msg.clone();
        msg_other_version.counterparty_version = Version::from("ics20-2");

        let good_ctx = || {
            MockContext::default()
                .with_client_store(&client_id, proof_height, &store)
                .with_connection(conn_id.clone(), conn_end.clone())
        };

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because no connection exists in the context".to_string(),
                ctx: MockContext::default().with_client_store(&client_id, proof_height, &store),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg.clone())),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the client is missing".to_string(),
                ctx: MockContext::default().with_connection(conn_id.clone(), conn_end.clone()),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg.clone())),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the client is frozen".to_string(),
                ctx: good_ctx().with_frozen_client(&client_id),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg.clone())),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the counterparty channel id is missing".to_string(),
                ctx: good_ctx(),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg_no_counterparty_id)),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the counterparty is not in INIT".to_string(),
                ctx: MockContext::default()
                    .with_client_store(&client_id, proof_height, &open_store)
                    .with_connection(conn_id.clone(), conn_end.clone()),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg.clone())),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the proven version differs".to_string(),
                ctx: good_ctx(),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg_other_version)),
                want_pass: false,
            },
            Test {
                name: "Good parameters".to_string(),
                ctx: good_ctx(),
                msg: ChannelMsg::ChannelOpenTry(Box::new(msg)),
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
                        "chan_open_try: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    assert!(!proto_output.events.is_empty()); // Some events must exist.

                    // The object in the output is a channel end, should have TryOpen state.
                    assert_eq!(
                        proto_output.result.channel_end.state().clone(),
                        State::TryOpen
                    );
                    assert_eq!(proto_output.result.channel_end.version(), &version);

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::OpenTryChannel(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "chan_open_try: did not pass test: {}, \nparams:\n\t{:?}\nerror: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }

    #[test]
    fn chan_open_try_rejects_unknown_proofs() {
        let proof_height = Height::new(0, 10).unwrap();
        let client_id = ClientId::default();
        let tracked = MockProvableStore::default();
        let forged = MockProvableStore::default().with(
            Path::ChannelEnds(PortId::default(), ChannelId::default()),
            vec![1],
        );

        let ctx = MockContext::default()
            .with_client_store(&client_id, proof_height, &tracked)
            .with_connection(
                ConnectionId::default(),
                get_dummy_connection_end(client_id, ConnectionId::new(7)),
            );
        let msg = MsgChannelOpenTry::new(
            PortId::default(),
            get_dummy_channel_end(State::TryOpen, Order::Unordered),
            Version::from("ics20-1"),
            Proofs::new(forged.proof(), None, proof_height).unwrap(),
        );

        let res = channel_dispatch(&ctx, &ChannelMsg::ChannelOpenTry(Box::new(msg)));
        match res {
            Err(e) => assert!(matches!(
                e.detail(),
                error::ErrorDetail::VerifyChannelFailed(_)
            )),
            Ok(_) => panic!("a proof that does not open to the tracked root was accepted"),
        }
    }
}
