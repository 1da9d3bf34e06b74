//! Human-readable rendering of elapsed time.
//!
//! A duration is broken down clock-style: each component is the truncated
//! count in its unit minus what the next larger unit already accounts for.
//! Only non-zero components are rendered, largest unit first.

use std::fmt;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Clock breakdown of a [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
    pub microseconds: u64,
    pub nanoseconds: u64,
}

impl DurationParts {
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        let total = duration.as_nanos();
        let in_unit = |per: u128| total / per;

        Self {
            hours: in_unit(NANOS_PER_HOUR) as u64,
            minutes: (in_unit(NANOS_PER_MINUTE) - in_unit(NANOS_PER_HOUR) * 60) as u64,
            seconds: (in_unit(NANOS_PER_SECOND) - in_unit(NANOS_PER_MINUTE) * 60) as u64,
            milliseconds: (in_unit(NANOS_PER_MILLI) - in_unit(NANOS_PER_SECOND) * 1_000) as u64,
            microseconds: (in_unit(NANOS_PER_MICRO) - in_unit(NANOS_PER_MILLI) * 1_000) as u64,
            nanoseconds: (total - in_unit(NANOS_PER_MICRO) * 1_000) as u64,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl From<Duration> for DurationParts {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

/// `Display` adapter for a [`Duration`].
///
/// Every unit but nanoseconds is followed by a space, so `1s + 1ms` renders
/// as `"1 s 1 ms "` and `14s + 3ms + 5ns` as `"14 s 3 ms 5 ns"`. A zero
/// duration renders as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = DurationParts::from_duration(self.0);
        let units = [
            (parts.hours, "hr(s) "),
            (parts.minutes, "min(s) "),
            (parts.seconds, "s "),
            (parts.milliseconds, "ms "),
            (parts.microseconds, "us "),
            (parts.nanoseconds, "ns"),
        ];
        for (count, unit) in units {
            if count != 0 {
                write!(f, "{count} {unit}")?;
            }
        }
        Ok(())
    }
}

/// Render `duration` with [`HumanDuration`].
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    HumanDuration(duration).to_string()
}
