//! Commitments written by the packet handlers.
//!
//! Only hashes are stored for packets and acknowledgements. A receipt is a single marker
//! byte.

use crate::prelude::*;

use core::fmt;

use serde_derive::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle_encoding::{Encoding, Hex};

use crate::core::ics04_channel::msgs::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::packet::Packet;
use crate::core::ics04_channel::timeout::TimeoutHeight;
use crate::timestamp::Timestamp;

/// Value stored under the `receipts` path of an unordered channel.
pub const RECEIPT_MARKER: [u8; 1] = [1];

/// Packet commitment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketCommitment(Vec<u8>);

impl PacketCommitment {
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for PacketCommitment {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PacketCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = Hex::upper_case()
            .encode_to_string(&self.0)
            .map_err(|_| fmt::Error)?;
        f.debug_tuple("PacketCommitment").field(&hex).finish()
    }
}

/// Acknowledgement commitment to be stored
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcknowledgementCommitment(Vec<u8>);

impl AcknowledgementCommitment {
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for AcknowledgementCommitment {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for AcknowledgementCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = Hex::upper_case()
            .encode_to_string(&self.0)
            .map_err(|_| fmt::Error)?;
        f.debug_tuple("AcknowledgementCommitment").field(&hex).finish()
    }
}

/// Compute the commitment for a packet.
///
/// The commitment is `sha256(timeout_timestamp || revision_number || revision_height ||
/// sha256(data))` with every integer encoded as 8 big-endian bytes. A disabled timeout
/// contributes zeroes.
pub fn compute_packet_commitment(
    packet_data: &[u8],
    timeout_height: &TimeoutHeight,
    timeout_timestamp: &Timestamp,
) -> PacketCommitment {
    let mut hash_input = timeout_timestamp.nanoseconds().to_be_bytes().to_vec();

    let revision_number = timeout_height.commitment_revision_number().to_be_bytes();
    hash_input.append(&mut revision_number.to_vec());

    let revision_height = timeout_height.commitment_revision_height().to_be_bytes();
    hash_input.append(&mut revision_height.to_vec());

    let packet_data_hash = hash(packet_data);
    hash_input.append(&mut packet_data_hash.to_vec());

    hash(&hash_input).into()
}

/// Commitment of the packet as sent, used on both chains to agree on its content.
pub fn packet_commitment_of(packet: &Packet) -> PacketCommitment {
    compute_packet_commitment(
        &packet.data,
        &packet.timeout_height,
        &packet.timeout_timestamp,
    )
}

/// Compute the commitment for an acknowledgement.
pub fn compute_ack_commitment(ack: &Acknowledgement) -> AcknowledgementCommitment {
    hash(ack.as_ref()).into()
}

fn hash(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::Height;

    #[test]
    fn packet_commitment_binds_every_field() {
        let height = TimeoutHeight::At(Height::new(0, 100).unwrap());
        let ts = Timestamp::from_nanoseconds(5_000).unwrap();
        let base = compute_packet_commitment(b"ping", &height, &ts);

        assert_eq!(base.as_bytes().len(), 32);
        assert_eq!(base, compute_packet_commitment(b"ping", &height, &ts));
        assert_ne!(base, compute_packet_commitment(b"pong", &height, &ts));
        assert_ne!(
            base,
            compute_packet_commitment(b"ping", &TimeoutHeight::Never, &ts)
        );
        assert_ne!(
            base,
            compute_packet_commitment(b"ping", &height, &Timestamp::none())
        );
    }

    #[test]
    fn packet_commitment_layout() {
        let height = TimeoutHeight::At(Height::new(1, 2).unwrap());
        let ts = Timestamp::from_nanoseconds(3).unwrap();

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&3u64.to_be_bytes());
        preimage.extend_from_slice(&1u64.to_be_bytes());
        preimage.extend_from_slice(&2u64.to_be_bytes());
        preimage.extend_from_slice(&Sha256::digest(b"data"));

        assert_eq!(
            compute_packet_commitment(b"data", &height, &ts).into_vec(),
            Sha256::digest(&preimage).to_vec()
        );
    }

    #[test]
    fn ack_commitment_is_a_hash_of_the_ack() {
        let ack = Acknowledgement::from(b"ok".to_vec());
        assert_eq!(
            compute_ack_commitment(&ack).into_vec(),
            Sha256::digest(b"ok").to_vec()
        );
    }
}
