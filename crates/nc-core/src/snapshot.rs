//! Typed view of a Nextcloud `serverinfo` response.
//!
//! The tree mirrors the OCS document `{"ocs": {"meta": .., "data": ..}}`.
//! Scalar fields default to zero or empty when absent or `null`; the
//! optional `apps` and `update` records stay `None` so the mapper can tell
//! "not reported" apart from "reported as zero".

use serde::Deserialize;

use crate::decode::{int_or_string, or_default, yes_no};

/// One decoded serverinfo response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    pub ocs: Ocs,
}

impl Snapshot {
    /// Shortcut to the `ocs.data` section.
    pub fn data(&self) -> &ServerInfo {
        &self.ocs.data
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ocs {
    #[serde(deserialize_with = "or_default")]
    pub meta: Meta,
    #[serde(deserialize_with = "or_default")]
    pub data: ServerInfo,
}

/// OCS envelope status.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "or_default")]
    pub status: String,
    #[serde(rename = "statuscode", deserialize_with = "or_default")]
    pub status_code: i64,
    #[serde(deserialize_with = "or_default")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    #[serde(rename = "activeUsers", deserialize_with = "or_default")]
    pub active_users: ActiveUsers,
    #[serde(deserialize_with = "or_default")]
    pub nextcloud: Nextcloud,
    #[serde(deserialize_with = "or_default")]
    pub server: Server,
}

/// Distinct users seen over three trailing windows.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActiveUsers {
    #[serde(rename = "last5minutes", deserialize_with = "or_default")]
    pub last_5_minutes: i64,
    #[serde(rename = "last1hour", deserialize_with = "or_default")]
    pub last_1_hour: i64,
    #[serde(rename = "last24hours", deserialize_with = "or_default")]
    pub last_24_hours: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Nextcloud {
    #[serde(deserialize_with = "or_default")]
    pub system: System,
    #[serde(deserialize_with = "or_default")]
    pub storage: Storage,
    #[serde(deserialize_with = "or_default")]
    pub shares: Shares,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct System {
    #[serde(deserialize_with = "or_default")]
    pub version: String,
    #[serde(deserialize_with = "or_default")]
    pub theme: String,
    #[serde(rename = "freespace", deserialize_with = "or_default")]
    pub free_space: i64,
    #[serde(deserialize_with = "or_default")]
    pub mem_total: i64,
    #[serde(deserialize_with = "or_default")]
    pub mem_free: i64,
    #[serde(deserialize_with = "or_default")]
    pub swap_total: i64,
    #[serde(deserialize_with = "or_default")]
    pub swap_free: i64,
    #[serde(rename = "cpuload", deserialize_with = "or_default")]
    pub cpu_load: Vec<f64>,
    #[serde(rename = "memcache.local", deserialize_with = "or_default")]
    pub memcache_local: String,
    #[serde(rename = "memcache.distributed", deserialize_with = "or_default")]
    pub memcache_distributed: String,
    #[serde(rename = "memcache.locking", deserialize_with = "or_default")]
    pub memcache_locking: String,
    #[serde(deserialize_with = "yes_no")]
    pub debug: bool,
    #[serde(deserialize_with = "yes_no")]
    pub enable_avatars: bool,
    #[serde(deserialize_with = "yes_no")]
    pub enable_previews: bool,
    #[serde(rename = "filelocking.enabled", deserialize_with = "yes_no")]
    pub filelocking_enabled: bool,
    /// Absent when the instance is queried with `skipApps=true`.
    pub apps: Option<Apps>,
    /// Absent when the instance is queried with `skipUpdate=true`.
    pub update: Option<Update>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Apps {
    #[serde(rename = "num_installed", deserialize_with = "or_default")]
    pub installed: i64,
    #[serde(rename = "num_updates_available", deserialize_with = "or_default")]
    pub updates_available: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Update {
    #[serde(rename = "lastupdatedat", deserialize_with = "or_default")]
    pub last_updated_at: i64,
    #[serde(deserialize_with = "or_default")]
    pub available: bool,
    #[serde(deserialize_with = "or_default")]
    pub available_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Storage {
    #[serde(deserialize_with = "or_default")]
    pub num_users: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_files: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_storages: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_storages_local: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_storages_home: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_storages_other: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Shares {
    #[serde(deserialize_with = "or_default")]
    pub num_shares: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_user: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_groups: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_link: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_link_no_password: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_mail: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_shares_room: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_fed_shares_sent: i64,
    #[serde(deserialize_with = "or_default")]
    pub num_fed_shares_received: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Server {
    #[serde(deserialize_with = "or_default")]
    pub webserver: String,
    #[serde(deserialize_with = "or_default")]
    pub php: Php,
    #[serde(deserialize_with = "or_default")]
    pub database: Database,
}

/// PHP runtime limits, in seconds and bytes as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Php {
    #[serde(deserialize_with = "or_default")]
    pub version: String,
    #[serde(deserialize_with = "or_default")]
    pub memory_limit: i64,
    #[serde(deserialize_with = "or_default")]
    pub max_execution_time: i64,
    #[serde(rename = "upload_max_filesize", deserialize_with = "or_default")]
    pub upload_max_file_size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Database {
    #[serde(rename = "type", deserialize_with = "or_default")]
    pub kind: String,
    #[serde(deserialize_with = "or_default")]
    pub version: String,
    /// Older servers send a number, newer ones a quoted decimal string.
    #[serde(deserialize_with = "int_or_string")]
    pub size: i64,
}
