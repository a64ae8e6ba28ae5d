use crate::prelude::*;

use serde::{
    de::Error as _,
    ser::{Error as _, Serialize, Serializer},
    Deserialize, Deserializer,
};
use subtle_encoding::{Encoding, Hex};

pub fn ser_hex_upper<S, T>(data: T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    let hex = Hex::upper_case()
        .encode_to_string(data)
        .map_err(S::Error::custom)?;
    hex.serialize(serializer)
}

pub fn deser_hex_upper<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<Vec<u8>>,
{
    let hex = String::deserialize(deserializer)?;
    let bytes = Hex::upper_case()
        .decode(hex.as_bytes())
        .map_err(D::Error::custom)?;
    Ok(bytes.into())
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use serde_derive::{Deserialize, Serialize};
    use test_log::test;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Blob {
        #[serde(
            serialize_with = "super::ser_hex_upper",
            deserialize_with = "super::deser_hex_upper"
        )]
        data: Vec<u8>,
    }

    #[test]
    fn bytes_are_written_as_upper_hex() {
        let blob = Blob {
            data: vec![0xde, 0xad, 0x01],
        };
        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, r#"{"data":"DEAD01"}"#);
        assert_eq!(serde_json::from_str::<Blob>(&json).unwrap(), blob);
    }
}
