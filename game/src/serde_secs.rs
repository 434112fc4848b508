//! `#[serde(with = "crate::serde_secs")]` for `Duration` fields written as fractional seconds
//! (`1.0`, `0.25`), which is how the config file spells timings.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.as_secs_f64())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| D::Error::custom(format!("expected a non-negative number of seconds, got {secs}")))
}
