pub mod daily;
pub mod projection;
pub mod rate;

use serde::Serialize;

use crate::quantity::time::Hours;

/// User-declared usage pattern. Captured once at run start, immutable after.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct UsageProfile {
    /// Hours per day the device is actively used.
    pub active: Hours,

    /// Hours per day the device stays plugged in.
    pub plugged_in: Hours,

    pub uses_every_day: bool,
}

impl UsageProfile {
    /// Clamps both durations into a day.
    #[must_use]
    pub fn new(active: Hours, plugged_in: Hours, uses_every_day: bool) -> Self {
        Self {
            active: active.clamp(Hours::ZERO, Hours::FULL_DAY),
            plugged_in: plugged_in.clamp(Hours::ZERO, Hours::FULL_DAY),
            uses_every_day,
        }
    }

    /// Plugged-in-but-idle share of the day. Phantom draw applies only here.
    #[must_use]
    pub fn idle(self) -> Hours {
        (self.plugged_in - self.active).max(Hours::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_durations_are_clamped_into_a_day() {
        let profile = UsageProfile::new(Hours(-2.0), Hours(30.0), true);
        assert_eq!(profile.active, Hours::ZERO);
        assert_eq!(profile.plugged_in, Hours::FULL_DAY);
    }

    #[test]
    fn test_idle_time() {
        assert_abs_diff_eq!(UsageProfile::new(Hours(2.0), Hours(12.0), true).idle().0, 10.0);
    }

    #[test]
    fn test_idle_time_is_never_negative() {
        assert_eq!(UsageProfile::new(Hours(5.0), Hours(2.0), true).idle(), Hours::ZERO);
    }
}
