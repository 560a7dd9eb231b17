//! Creation timestamps and locale-convention datetime formatting.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, Timelike};

/// Source of the current instant.
///
/// Records take both their id and their display datetime from one call to
/// [`Clock::now`].
pub trait Clock: fmt::Debug {
    /// The current local time.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Display conventions for record datetimes.
///
/// All variants use a 4-digit year and 2-digit month, day, hour, minute and
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    /// `2024/01/15 下午03:04:05`
    #[default]
    ZhTw,
    /// `01/15/2024, 03:04:05 PM`
    EnUs,
    /// `2024-01-15 15:04:05`
    Iso,
}

impl DateLocale {
    /// Format `dt` according to this locale's conventions.
    #[must_use]
    pub fn format(self, dt: &DateTime<FixedOffset>) -> String {
        let afternoon = dt.hour() >= 12;
        match self {
            Self::ZhTw => {
                let marker = if afternoon { "下午" } else { "上午" };
                format!(
                    "{} {marker}{}",
                    dt.format("%Y/%m/%d"),
                    dt.format("%I:%M:%S")
                )
            }
            Self::EnUs => {
                let marker = if afternoon { "PM" } else { "AM" };
                format!("{} {marker}", dt.format("%m/%d/%Y, %I:%M:%S"))
            }
            Self::Iso => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl FromStr for DateLocale {
    type Err = std::convert::Infallible;

    /// Unknown locale tags fall back to [`DateLocale::Iso`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "zh-tw" => Self::ZhTw,
            "en-us" => Self::EnUs,
            _ => Self::Iso,
        })
    }
}

impl fmt::Display for DateLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZhTw => write!(f, "zh-TW"),
            Self::EnUs => write!(f, "en-US"),
            Self::Iso => write!(f, "iso"),
        }
    }
}
