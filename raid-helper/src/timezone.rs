use chrono_tz::Tz;
use log::{debug, warn};

/// Used when even the configured default identifier does not resolve.
pub const FALLBACK_TIMEZONE: Tz = chrono_tz::Europe::Prague;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneResolver {
    default: Tz,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new(default_name: &str) -> Self {
        let default = default_name.trim().parse::<Tz>().unwrap_or_else(|err| {
            warn!(
                "Default timezone `{default_name}` is invalid ({err}), using {}",
                FALLBACK_TIMEZONE.name()
            );
            FALLBACK_TIMEZONE
        });

        Self { default }
    }

    #[must_use]
    pub fn default_timezone(&self) -> Tz {
        self.default
    }

    /// Resolves `name`, falling back to the configured default when it is
    /// absent or not a known IANA identifier.
    #[must_use]
    pub fn resolve(&self, name: Option<&str>) -> Tz {
        let Some(name) = name else {
            return self.default;
        };

        match name.trim().parse::<Tz>() {
            Ok(tz) => tz,
            Err(err) => {
                debug!(
                    "Unknown timezone `{name}` ({err}), using {}",
                    self.default.name()
                );
                self.default
            }
        }
    }
}

impl Default for TimeZoneResolver {
    fn default() -> Self {
        Self {
            default: FALLBACK_TIMEZONE,
        }
    }
}
