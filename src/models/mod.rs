// src/models/mod.rs

pub mod benchmark;
pub mod comment;
pub mod playground;
pub mod problem;
pub mod search;
pub mod solution;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Backend ids are UUID strings, but older deployments still emit integers.
/// Both are accepted and kept as opaque strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Str(s) => s,
            RawId::Int(i) => i.to_string(),
        }
    }
}

pub(crate) fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(String::from))
}

pub(crate) fn string_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<RawId>::deserialize(deserializer).map(|ids| ids.into_iter().map(String::from).collect())
}

pub(crate) fn opt_string_ids<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<RawId>>::deserialize(deserializer)
        .map(|ids| ids.map(|ids| ids.into_iter().map(String::from).collect()))
}

/// Paged listing envelope used by `/problems` and `/solutions`.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
}
