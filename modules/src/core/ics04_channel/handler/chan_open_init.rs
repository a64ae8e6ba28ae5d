//! Protocol logic specific to ICS4 messages of type `MsgChannelOpenInit`.

use tracing::debug;

use crate::core::ics04_channel::channel::{ChannelEnd, State};
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::{Attributes, OpenInit};
use crate::core::ics04_channel::handler::{open_connection, ChannelIdState, ChannelResult};
use crate::core::ics04_channel::msgs::chan_open_init::MsgChannelOpenInit;
use crate::core::ics24_host::identifier::ChannelId;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

pub(crate) fn process(
    ctx: &dyn ChannelReader,
    msg: &MsgChannelOpenInit,
) -> HandlerResult<ChannelResult, Error> {
    let mut output = HandlerOutput::builder();

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

    // Channel identifier construction.
    let id_counter = ctx.channel_counter()?;
    let chan_id = ChannelId::new(id_counter);

    output.log(format!(
        "success: generated new channel identifier: {}",
        chan_id
    ));

    let new_channel_end = ChannelEnd::new(
        State::Init,
        msg.channel.ordering,
        msg.channel.counterparty().clone(),
        msg.channel.connection_hops().clone(),
        msg.channel.version().clone(),
    );

    debug!(port_id = %msg.port_id, channel_id = %chan_id, "channel open init");

    let result = ChannelResult {
        port_id: msg.port_id.clone(),
        channel_id: chan_id.clone(),
        channel_end: new_channel_end,
        channel_id_state: ChannelIdState::Generated,
    };

    output.emit(
        OpenInit(Attributes {
            port_id: msg.port_id.clone(),
            channel_id: Some(chan_id),
            connection_id: conn_id.clone(),
            counterparty_port_id: msg.channel.counterparty().port_id().clone(),
            counterparty_channel_id: None,
        })
        .into(),
    );

    Ok(output.with_result(result))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use test_log::test;

    use crate::core::ics03_connection::connection::{ConnectionEnd, State as ConnectionState};
    use crate::core::ics03_connection::version::Version as ConnectionVersion;
    use crate::core::ics04_channel::channel::{Order, State};
    use crate::core::ics04_channel::handler::{channel_dispatch, ChannelIdState};
    use crate::core::ics04_channel::msgs::chan_open_init::test_util::get_dummy_msg_chan_open_init;
    use crate::core::ics04_channel::msgs::ChannelMsg;
    use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId};
    use crate::events::IbcEvent;
    use crate::mock::context::MockContext;
    use crate::test_utils::get_dummy_connection_end;

    #[test]
    fn chan_open_init_msg_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: ChannelMsg,
            want_pass: bool,
        }

        let msg_chan_init = get_dummy_msg_chan_open_init();
        let conn_id = ConnectionId::default();
        let open_conn = get_dummy_connection_end(ClientId::default(), ConnectionId::new(7));

        let mut init_conn = open_conn.clone();
        init_conn.set_state(ConnectionState::Init);

        let unordered_only = ConnectionEnd::new(
            ConnectionState::Open,
            open_conn.client_id().clone(),
            open_conn.counterparty().clone(),
            vec![ConnectionVersion::new(
                "1".to_string(),
                vec![Order::Unordered.as_str().to_string()],
            )],
            open_conn.delay_period(),
        );

        let mut ordered_msg = msg_chan_init.clone();
        ordered_msg.channel.ordering = Order::Ordered;

        let mut two_hops_msg = msg_chan_init.clone();
        two_hops_msg.channel.connection_hops.push(ConnectionId::new(1));

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because no connection exists in the context".to_string(),
                ctx: MockContext::default(),
                msg: ChannelMsg::ChannelOpenInit(msg_chan_init.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the connection is not open".to_string(),
                ctx: MockContext::default().with_connection(conn_id.clone(), init_conn),
                msg: ChannelMsg::ChannelOpenInit(msg_chan_init.clone()),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the ordering is not supported".to_string(),
                ctx: MockContext::default().with_connection(conn_id.clone(), unordered_only),
                msg: ChannelMsg::ChannelOpenInit(ordered_msg),
                want_pass: false,
            },
            Test {
                name: "Processing fails for multi-hop channels".to_string(),
                ctx: MockContext::default().with_connection(conn_id.clone(), open_conn.clone()),
                msg: ChannelMsg::ChannelOpenInit(two_hops_msg),
                want_pass: false,
            },
            Test {
                name: "Good parameters".to_string(),
                ctx: MockContext::default().with_connection(conn_id, open_conn),
                msg: ChannelMsg::ChannelOpenInit(msg_chan_init),
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
                        "chan_open_init: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    assert!(!proto_output.events.is_empty()); // Some events must exist.

                    // The object in the output is a ChannelEnd, should have init state.
                    assert_eq!(proto_output.result.channel_end.state().clone(), State::Init);
                    assert_eq!(proto_output.result.channel_id, ChannelId::new(0));
                    assert_eq!(
                        proto_output.result.channel_id_state,
                        ChannelIdState::Generated
                    );
                    assert_eq!(proto_output.result.channel_end.upgrade_sequence(), 0.into());

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::OpenInitChannel(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "chan_open_init: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }
}
