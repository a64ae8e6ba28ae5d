use crate::prelude::*;

use derive_more::Into;
use serde_derive::{Deserialize, Serialize};

use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::Packet;
use crate::proofs::Proofs;
use crate::tx_msg::Msg;

pub const TYPE_URL: &str = "/ibc.core.channel.v1.MsgAcknowledgement";

/// Opaque acknowledgement produced by the receiving application. An empty acknowledgement
/// returned from a receive callback means the application will acknowledge later.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Into)]
pub struct Acknowledgement(Vec<u8>);

impl Acknowledgement {
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Acknowledgement {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Acknowledgement {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

///
/// Message definition for packet acknowledgements.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgAcknowledgement {
    pub packet: Packet,
    pub acknowledgement: Acknowledgement,
    pub proofs: Proofs,
}

impl MsgAcknowledgement {
    pub fn new(packet: Packet, acknowledgement: Acknowledgement, proofs: Proofs) -> Self {
        Self {
            packet,
            acknowledgement,
            proofs,
        }
    }

    pub fn acknowledgement(&self) -> &Acknowledgement {
        &self.acknowledgement
    }
}

impl Msg for MsgAcknowledgement {
    type ValidationError = Error;

    fn route(&self) -> String {
        crate::keys::ROUTER_KEY.to_string()
    }

    fn type_url(&self) -> String {
        TYPE_URL.to_string()
    }

    fn validate_basic(&self) -> Result<(), Self::ValidationError> {
        self.packet.validate_basic()?;
        if self.acknowledgement.is_empty() {
            return Err(Error::invalid_acknowledgement());
        }
        Ok(())
    }
}
