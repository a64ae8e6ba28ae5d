//! Protocol logic specific to ICS4 messages of type `MsgChannelUpgradeInit`.

use tracing::debug;

use crate::core::ics04_channel::channel::State;
use crate::core::ics04_channel::context::ChannelReader;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::events::UpgradeInit;
use crate::core::ics04_channel::handler::{
    upgrade_attributes, validate_upgrade_fields, UpgradeResult, UpgradeStep,
};
use crate::core::ics04_channel::msgs::chan_upgrade_init::MsgChannelUpgradeInit;
use crate::core::ics04_channel::packet::Sequence;
use crate::core::ics04_channel::upgrade::{Upgrade, UpgradeTimeout};
use crate::core::ics05_port::capabilities::ChannelCapability;
use crate::handler::{HandlerOutput, HandlerResult};
use crate::prelude::*;

/// Proposes an upgrade of an OPEN channel on behalf of the application holding
/// `capability`.
pub(crate) fn process(
    ctx: &dyn ChannelReader,
    capability: &ChannelCapability,
    msg: &MsgChannelUpgradeInit,
) -> HandlerResult<UpgradeResult, Error> {
    let mut output = HandlerOutput::builder();

    let mut channel_end = ctx.channel_end(&msg.port_id, &msg.channel_id)?;

    ctx.authenticate_channel_capability(&msg.port_id, &msg.channel_id, capability)?;

    if !channel_end.state_matches(&State::Open) {
        return Err(Error::invalid_channel_state(
            msg.channel_id.clone(),
            channel_end.state,
        ));
    }

    validate_upgrade_fields(ctx, &msg.fields, &channel_end)?;

    let timeout = match msg.timeout {
        Some(timeout) => timeout,
        None => {
            let deadline = (ctx.host_timestamp() + ctx.params().upgrade_timeout)
                .map_err(Error::timestamp_overflow)?;
            UpgradeTimeout::at_timestamp(deadline)
        }
    };
    if !timeout.is_valid() {
        return Err(Error::upgrade_timeout_not_set());
    }

    let next_seq_send = ctx.get_next_sequence_send(&msg.port_id, &msg.channel_id)?;
    let latest_sequence_send = Sequence::from(next_seq_send.value().saturating_sub(1));

    channel_end.upgrade_sequence = channel_end.upgrade_sequence().increment();
    channel_end.set_state(State::InitUpgrade);

    output.log(format!(
        "success: channel upgrade init at sequence {}",
        channel_end.upgrade_sequence()
    ));
    debug!(
        port_id = %msg.port_id,
        channel_id = %msg.channel_id,
        upgrade_sequence = %channel_end.upgrade_sequence(),
        "channel upgrade init"
    );

    output.emit(
        UpgradeInit(upgrade_attributes(
            &msg.port_id,
            &msg.channel_id,
            &channel_end,
            msg.fields.clone(),
        ))
        .into(),
    );

    let result = UpgradeResult {
        port_id: msg.port_id.clone(),
        channel_id: msg.channel_id.clone(),
        channel_end,
        step: UpgradeStep::Proposed(Upgrade::new(
            msg.fields.clone(),
            timeout,
            latest_sequence_send,
        )),
    };

    Ok(output.with_result(result))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    use core::time::Duration;
    use test_log::test;

    use crate::config::Params;
    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{ChannelEnd, Order, State};
    use crate::core::ics04_channel::context::ChannelReader;
    use crate::core::ics04_channel::error;
    use crate::core::ics04_channel::handler::{chan_upgrade_init, UpgradeStep};
    use crate::core::ics04_channel::msgs::chan_upgrade_init::MsgChannelUpgradeInit;
    use crate::core::ics04_channel::packet::Sequence;
    use crate::core::ics04_channel::upgrade::{UpgradeFields, UpgradeTimeout};
    use crate::core::ics04_channel::Version;
    use crate::core::ics24_host::identifier::{ChannelId, ClientId, ConnectionId, PortId};
    use crate::events::IbcEvent;
    use crate::mock::context::MockContext;
    use crate::test_utils::get_dummy_connection_end;
    use crate::Height;

    fn context_with(channel_end: ChannelEnd) -> MockContext {
        MockContext::default()
            .with_client(&ClientId::default(), Height::new(0, 2).unwrap())
            .with_connection(
                ConnectionId::default(),
                get_dummy_connection_end(ClientId::default(), ConnectionId::new(7)),
            )
            .with_channel(PortId::default(), ChannelId::default(), channel_end)
            .with_send_sequence(PortId::default(), ChannelId::default(), Sequence::from(4))
    }

    fn fields_with_version(version: &str) -> UpgradeFields {
        UpgradeFields::new(
            Order::Unordered,
            vec![ConnectionId::default()],
            Version::from(version),
        )
    }

    #[test]
    fn chan_upgrade_init_msg_processing() {
        struct Test {
            name: String,
            ctx: MockContext,
            msg: MsgChannelUpgradeInit,
            want_pass: bool,
        }

        let open_end = get_dummy_channel_end(State::Open, Order::Unordered);
        let timeout = Some(UpgradeTimeout::at_height(Height::new(0, 100).unwrap()));
        let msg = MsgChannelUpgradeInit::new(
            PortId::default(),
            ChannelId::default(),
            fields_with_version("ics20-2"),
            timeout,
        );

        let tests: Vec<Test> = vec![
            Test {
                name: "Processing fails because the proposal changes nothing".to_string(),
                ctx: context_with(open_end.clone()),
                msg: MsgChannelUpgradeInit {
                    fields: fields_with_version("ics20-1"),
                    ..msg.clone()
                },
                want_pass: false,
            },
            Test {
                name: "Processing fails because the channel is not open".to_string(),
                ctx: context_with(get_dummy_channel_end(State::TryOpen, Order::Unordered)),
                msg: msg.clone(),
                want_pass: false,
            },
            Test {
                name: "Processing fails because an upgrade is already in progress".to_string(),
                ctx: context_with(get_dummy_channel_end(State::InitUpgrade, Order::Unordered)),
                msg: msg.clone(),
                want_pass: false,
            },
            Test {
                name: "Processing fails because the proposed connection does not exist"
                    .to_string(),
                ctx: context_with(open_end.clone()),
                msg: MsgChannelUpgradeInit {
                    fields: UpgradeFields::new(
                        Order::Unordered,
                        vec![ConnectionId::new(3)],
                        Version::from("ics20-2"),
                    ),
                    ..msg.clone()
                },
                want_pass: false,
            },
            Test {
                name: "Good parameters".to_string(),
                ctx: context_with(open_end),
                msg,
                want_pass: true,
            },
        ]
        .into_iter()
        .collect();

        for test in tests {
            let cap = test
                .ctx
                .channel_capability(&PortId::default(), &ChannelId::default())
                .unwrap();
            let res = chan_upgrade_init::process(&test.ctx, &cap, &test.msg);
            match res {
                Ok(proto_output) => {
                    assert!(
                        test.want_pass,
                        "chan_upgrade_init: test passed but was supposed to fail for test: {}, \nparams {:?}",
                        test.name,
                        test.msg,
                    );

                    let result = proto_output.result;
                    assert_eq!(result.channel_end.state(), &State::InitUpgrade);
                    assert_eq!(result.channel_end.upgrade_sequence(), Sequence::from(1));
                    // The channel keeps its fields until the upgrade completes.
                    assert_eq!(result.channel_end.version(), &Version::from("ics20-1"));

                    match result.step {
                        UpgradeStep::Proposed(upgrade) => {
                            assert_eq!(upgrade.fields, test.msg.fields);
                            assert_eq!(upgrade.latest_sequence_send, Sequence::from(3));
                        }
                        step => panic!("unexpected upgrade step {:?}", step),
                    }

                    for e in proto_output.events.iter() {
                        assert!(matches!(e, &IbcEvent::UpgradeInitChannel(_)));
                    }
                }
                Err(e) => {
                    assert!(
                        !test.want_pass,
                        "chan_upgrade_init: did not pass test: {}, \nparams {:?} error: {:?}",
                        test.name,
                        test.msg,
                        e,
                    );
                }
            }
        }
    }

    #[test]
    fn chan_upgrade_init_defaults_the_timeout_from_params() {
        let params = Params {
            upgrade_timeout: Duration::from_secs(30),
        };
        let ctx = context_with(get_dummy_channel_end(State::Open, Order::Unordered))
            .with_params(params);
        let cap = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();
        let msg = MsgChannelUpgradeInit::new(
            PortId::default(),
            ChannelId::default(),
            fields_with_version("ics20-2"),
            None,
        );

        let output = chan_upgrade_init::process(&ctx, &cap, &msg).unwrap();

        let expected = (ctx.host_timestamp() + Duration::from_secs(30)).unwrap();
        match output.result.step {
            UpgradeStep::Proposed(upgrade) => {
                assert_eq!(upgrade.timeout, UpgradeTimeout::at_timestamp(expected))
            }
            step => panic!("unexpected upgrade step {:?}", step),
        }
    }

    #[test]
    fn chan_upgrade_init_rejects_unchanged_fields() {
        let ctx = context_with(get_dummy_channel_end(State::Open, Order::Unordered));
        let cap = ctx
            .channel_capability(&PortId::default(), &ChannelId::default())
            .unwrap();
        let msg = MsgChannelUpgradeInit::new(
            PortId::default(),
            ChannelId::default(),
            fields_with_version("ics20-1"),
            None,
        );

        match chan_upgrade_init::process(&ctx, &cap, &msg) {
            Err(e) => assert!(matches!(
                e.detail(),
                error::ErrorDetail::UpgradeFieldsUnchanged(_)
            )),
            Ok(_) => panic!("an upgrade without changes was accepted"),
        }
    }
}
