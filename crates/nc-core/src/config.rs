//! Exporter configuration.
//!
//! The file is TOML, or JSON when its extension is `.json`. Loading
//! validates everything the collector depends on, so a config that loads
//! is a config that can run.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Path of the serverinfo OCS endpoint relative to the instance root.
pub const DEFAULT_SERVERINFO_PATH: &str = "ocs/v2.php/apps/serverinfo/api/v1/info";

const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
const DEFAULT_LISTEN: &str = ":9091";

/// Config file layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub nextcloud_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_true")]
    pub append_default_serverinfo_path: bool,
    #[serde(default)]
    pub skip_apps: Option<bool>,
    #[serde(default)]
    pub skip_update: Option<bool>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

/// HTTP Basic credentials for the serverinfo endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Absolute http(s) URL of the serverinfo endpoint, without user-info.
    pub info_url: Url,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
    /// `host:port` handed to the listener; the host may be a name.
    pub listen: String,
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let raw: RawConfig = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidUrl {
            url: raw.nextcloud_url.clone(),
            reason: reason.to_string(),
        };

        let mut info_url = Url::parse(&raw.nextcloud_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(info_url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if info_url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host"));
        }

        let from_url = url_credentials(&info_url);
        // set_username/set_password only fail for cannot-be-a-base URLs,
        // which the scheme check above already excludes.
        let _ = info_url.set_username("");
        let _ = info_url.set_password(None);

        let credentials = match (raw.username, raw.password) {
            (None, None) => from_url,
            (username, password) => Some(Credentials {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
            }),
        };

        if raw.append_default_serverinfo_path {
            let mut path = info_url.path().to_string();
            if !path.ends_with('/') {
                path.push('/');
            }
            path.push_str(DEFAULT_SERVERINFO_PATH);
            info_url.set_path(&path);
        }

        if raw.skip_apps.is_some() || raw.skip_update.is_some() {
            set_query_flags(&mut info_url, &[("skipApps", raw.skip_apps), ("skipUpdate", raw.skip_update)]);
        }

        if !raw.timeout.is_finite() || raw.timeout <= 0.0 {
            return Err(ConfigError::InvalidTimeout(raw.timeout));
        }
        let timeout = Duration::from_secs_f64(raw.timeout);

        let listen = parse_listen(&raw.listen)?;

        Ok(Self {
            info_url,
            credentials,
            timeout,
            listen,
        })
    }
    /// Replace the listen address, applying the same rules as the file.
    pub fn set_listen(&mut self, listen: &str) -> Result<(), ConfigError> {
        self.listen = parse_listen(listen)?;
        Ok(())
    }
}

fn url_credentials(url: &Url) -> Option<Credentials> {
    let username = url.username();
    let password = url.password().unwrap_or_default();
    if username.is_empty() && password.is_empty() {
        return None;
    }
    Some(Credentials {
        username: percent_decode(username),
        password: percent_decode(password),
    })
}

fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Replace the given query keys, keeping every other pair in order.
fn set_query_flags(url: &mut Url, flags: &[(&str, Option<bool>)]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !flags.iter().any(|(name, value)| value.is_some() && &**k == *name))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    for (name, value) in flags {
        if let Some(value) = value {
            pairs.append_pair(name, if *value { "true" } else { "false" });
        }
    }
}

/// Check a `host:port` listen value. A bare `:port` binds every interface
/// on both address families through the IPv6 wildcard.
fn parse_listen(listen: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidListen(listen.to_string());

    let (host, port) = listen.rsplit_once(':').ok_or_else(invalid)?;
    port.parse::<u16>().map_err(|_| invalid())?;

    if host.is_empty() {
        return Ok(format!("[::]:{port}"));
    }
    let bracketed = host.starts_with('[') && host.ends_with(']');
    if host.contains(':') && !bracketed {
        return Err(invalid());
    }
    Ok(listen.to_string())
}
