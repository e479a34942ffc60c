use serde::{Deserialize, Serialize};

/// One observed transmission scraped from the dashboard's "last heard" table.
///
/// Every field is the raw cell text; no numeric validation happens anywhere.
/// `name` starts empty and is filled in by the poller from the name resolver
/// before the record is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub num: String,
    pub date: String,
    pub name: String,
    pub call: String,
    pub id: String,
    pub sec: String,
    pub slot: String,
    pub talkgroup: String,
}

/// API statistics as served by `/monitor/stats`.
///
/// `uptime` is whole seconds since process start. `fetch_errors` is internal
/// observability only and never serialized; the wire shape is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub stale_cache: bool,
    pub hits: u64,
    pub refresh: u64,
    pub uptime: u64,
    #[serde(skip)]
    pub fetch_errors: u64,
}

/// User records from the radioid.net database dump. Unused fields are
/// ignored on deserialize to keep memory down.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDump {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}
