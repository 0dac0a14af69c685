//! Human-friendly rendering of counts and durations for the run report.
//!
//! Purely presentational: nothing downstream parses these strings.

use std::fmt;
use std::time::Duration;

/// Renders a count with a thousand/million suffix, e.g. `1.5m`.
pub struct HumanCount(pub u64);

impl fmt::Display for HumanCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const K: u64 = 1_000;
        const M: u64 = K * K;

        let mut value = self.0 as f64;
        let mut unit = "";
        if self.0 > M {
            value /= M as f64;
            unit = "m";
        } else if self.0 > K {
            value /= K as f64;
            unit = "k";
        }
        write!(f, "{value:.1}{unit}")
    }
}

/// Renders a wall-clock duration with a unit, e.g. `2.5min`.
pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MIN: f64 = 60.0;
        const HR: f64 = MIN * 60.0;
        const DAY: f64 = HR * 24.0;

        let mut value = self.0.as_secs_f64();
        let mut unit = "s";
        if value >= DAY {
            value /= DAY;
            unit = "d";
        } else if value >= HR {
            value /= HR;
            unit = "hr";
        } else if value >= MIN {
            value /= MIN;
            unit = "min";
        }
        write!(f, "{value:.1}{unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_plain() {
        assert_eq!(HumanCount(0).to_string(), "0.0");
        assert_eq!(HumanCount(999).to_string(), "999.0");
    }

    #[test]
    fn test_count_thousands() {
        assert_eq!(HumanCount(1_500).to_string(), "1.5k");
        assert_eq!(HumanCount(20_000).to_string(), "20.0k");
    }

    #[test]
    fn test_count_millions() {
        assert_eq!(HumanCount(2_500_000).to_string(), "2.5m");
        assert_eq!(HumanCount(20_000_000).to_string(), "20.0m");
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(HumanDuration(Duration::from_secs(0)).to_string(), "0.0s");
        assert_eq!(HumanDuration(Duration::from_secs(59)).to_string(), "59.0s");
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(HumanDuration(Duration::from_secs(90)).to_string(), "1.5min");
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(
            HumanDuration(Duration::from_secs(3 * 3600)).to_string(),
            "3.0hr"
        );
    }

    #[test]
    fn test_duration_days() {
        assert_eq!(
            HumanDuration(Duration::from_secs(36 * 3600)).to_string(),
            "1.5d"
        );
    }
}
