use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Civil timezone of `FechaHoraHusoGenRegistro`.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Madrid;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats record timestamps in a fixed civil timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamper {
    tz: Tz,
}

impl Default for Timestamper {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl Timestamper {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// ISO-8601 local time with explicit offset, e.g. `2024-11-20T19:00:55+01:00`.
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.tz)
            .format("%Y-%m-%dT%H:%M:%S%:z")
            .to_string()
    }

    /// Format the current instant of `clock`.
    pub fn now(&self, clock: &dyn Clock) -> String {
        self.format(clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn winter_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 11, 20, 18, 0, 55).unwrap();
        assert_eq!(
            Timestamper::default().format(instant),
            "2024-11-20T19:00:55+01:00"
        );
    }

    #[test]
    fn summer_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap();
        assert_eq!(
            Timestamper::default().format(instant),
            "2024-07-01T12:00:00+02:00"
        );
    }

    #[test]
    fn canary_islands_timezone() {
        let stamper = Timestamper::new(chrono_tz::Atlantic::Canary);
        let instant = Utc.with_ymd_and_hms(2024, 11, 20, 18, 0, 55).unwrap();
        assert_eq!(stamper.format(instant), "2024-11-20T18:00:55+00:00");
    }

    #[test]
    fn fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 11, 21, 9, 0, 55).unwrap();
        let stamper = Timestamper::default();
        assert_eq!(stamper.now(&FixedClock(instant)), "2024-11-21T10:00:55+01:00");
    }
}
