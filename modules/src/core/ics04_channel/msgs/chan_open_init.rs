use crate::prelude::*;

use crate::core::ics04_channel::channel::ChannelEnd;
use crate::core::ics04_channel::error::Error;
use crate::core::ics24_host::identifier::PortId;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgChannelOpenInit";

///
/// Message definition for the first step in the channel open handshake (`ChanOpenInit` datagram).
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgChannelOpenInit {
    pub port_id: PortId,
    pub channel: ChannelEnd,
}

impl MsgChannelOpenInit {
    pub fn new(port_id: PortId, channel: ChannelEnd) -> Self {
        Self { port_id, channel }
    }
}

impl Msg for MsgChannelOpenInit {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.channel.validate_basic()
    }
}

#[cfg(test)]
pub mod test_util {
    use crate::prelude::*;

    use crate::core::ics04_channel::channel::test_util::get_dummy_channel_end;
    use crate::core::ics04_channel::channel::{Counterparty, Order, State};
    use crate::core::ics04_channel::msgs::chan_open_init::MsgChannelOpenInit;
    use crate::core::ics24_host::identifier::PortId;

    /// Returns a dummy `MsgChannelOpenInit`, for testing only!
    pub fn get_dummy_msg_chan_open_init() -> MsgChannelOpenInit {
        let mut channel = get_dummy_channel_end(State::Init, Order::Unordered);
        channel.remote = Counterparty::new(PortId::default(), None);
        MsgChannelOpenInit::new(PortId::default(), channel)
    }
}
