use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://raid-helper.dev/api/events/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEZONE: &str = "Europe/Prague";

pub const DEFAULT_SERVER_IDS: &[&str] = &[
    "902588385607163955",
    "1327632150232698952",
    "1082291130625966110",
    "1135207896100114514",
    "1318284716092428298",
    "1305782557920464896",
    "494289106625626112",
    "1145012794589196539",
    "1146543294818553996",
    "1362492441814499568",
    "1394723327167168563",
    "1388288271632830494",
];

/// Everything the pipeline needs to talk to the Raid-Helper API.
///
/// The access token is a shared secret; it is redacted from `Debug` output.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub access_token: String,
    pub timeout: Duration,
    pub source_ids: Vec<String>,
    pub default_timezone: String,
}

impl Config {
    #[must_use]
    pub fn new<S: Into<String>>(access_token: S) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
            source_ids: DEFAULT_SERVER_IDS.iter().map(|id| id.to_string()).collect(),
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("source_ids", &self.source_ids)
            .field("default_timezone", &self.default_timezone)
            .finish()
    }
}
