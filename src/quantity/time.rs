use std::time::Duration;

quantity!(Hours, suffix: "h", precision: 3);

impl Hours {
    pub const FULL_DAY: Self = Self(24.0);
}

impl From<Duration> for Hours {
    fn from(duration: Duration) -> Self {
        Self(duration.as_secs_f64() / 3600.0)
    }
}
