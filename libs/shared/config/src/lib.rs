use std::env;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_DAY_START: &str = "09:00";
pub const DEFAULT_DAY_END: &str = "17:00";
pub const DEFAULT_SLOT_INTERVAL_MINUTES: i64 = 15;
pub const DEFAULT_LOCATION: &str = "Einsteinweg 55 - Leiden";
pub const DEFAULT_NOTICE_TTL_SECONDS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub slot_interval_minutes: i64,
    pub location: String,
    pub notice_ttl_seconds: u64,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            day_start: parse_time(DEFAULT_DAY_START).unwrap_or(NaiveTime::MIN),
            day_end: parse_time(DEFAULT_DAY_END).unwrap_or(NaiveTime::MIN),
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            location: DEFAULT_LOCATION.to_string(),
            notice_ttl_seconds: DEFAULT_NOTICE_TTL_SECONDS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            day_start: env::var("SCHEDULING_DAY_START")
                .ok()
                .and_then(|v| parse_time(&v))
                .unwrap_or_else(|| {
                    warn!("SCHEDULING_DAY_START not set or invalid, using {}", DEFAULT_DAY_START);
                    defaults.day_start
                }),
            day_end: env::var("SCHEDULING_DAY_END")
                .ok()
                .and_then(|v| parse_time(&v))
                .unwrap_or_else(|| {
                    warn!("SCHEDULING_DAY_END not set or invalid, using {}", DEFAULT_DAY_END);
                    defaults.day_end
                }),
            slot_interval_minutes: parse_var("SCHEDULING_SLOT_INTERVAL_MINUTES")
                .unwrap_or_else(|| {
                    warn!("SCHEDULING_SLOT_INTERVAL_MINUTES not set or invalid, using {}", DEFAULT_SLOT_INTERVAL_MINUTES);
                    defaults.slot_interval_minutes
                }),
            location: env::var("SCHEDULING_LOCATION")
                .unwrap_or_else(|_| {
                    warn!("SCHEDULING_LOCATION not set, using default");
                    defaults.location.clone()
                }),
            notice_ttl_seconds: parse_var("SCHEDULING_NOTICE_TTL_SECONDS")
                .unwrap_or_else(|| {
                    warn!("SCHEDULING_NOTICE_TTL_SECONDS not set or invalid, using {}", DEFAULT_NOTICE_TTL_SECONDS);
                    defaults.notice_ttl_seconds
                }),
            bind_addr: env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("API_BIND_ADDR not set, using {}", DEFAULT_BIND_ADDR);
                    defaults.bind_addr.clone()
                }),
        };

        if !config.is_configured() {
            warn!("Scheduling window is not usable - check SCHEDULING_* environment variables");
        }

        config
    }

    /// The slot window is usable when it is non-empty and the interval is positive.
    pub fn is_configured(&self) -> bool {
        self.day_start <= self.day_end && self.slot_interval_minutes > 0
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
