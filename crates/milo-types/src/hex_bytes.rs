//! Serde adapter that writes byte buffers as lowercase hex strings.
//!
//! Use with `#[serde(with = "milo_types::hex_bytes")]` on `Vec<u8>` fields so
//! captured payloads stay readable in JSON dumps.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(deserializer)?;
    hex::decode(text).map_err(serde::de::Error::custom)
}
