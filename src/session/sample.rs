use std::time::Duration;

use serde::Serialize;

use crate::{
    prelude::*,
    quantity::{cost::Cost, energy::WattHours, power::Watts, time::Hours},
};

/// One measurement row: instantaneous power plus the energy and cost
/// accumulated over a single sample interval.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sample {
    pub power: Watts,
    pub energy: WattHours,
    pub cost: Cost,
}

/// Chronologically ordered samples of one measurement phase.
#[derive(Debug, Default)]
pub struct SampleSeries(Vec<Sample>);

impl SampleSeries {
    pub fn push(&mut self, sample: Sample) {
        self.0.push(sample);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.0
    }

    pub fn total_energy(&self) -> WattHours {
        self.0.iter().map(|sample| sample.energy).sum()
    }

    pub fn total_cost(&self) -> Cost {
        self.0.iter().map(|sample| sample.cost).sum()
    }

    /// Wall time covered by the whole series.
    pub fn duration(&self, interval: SampleInterval) -> Hours {
        interval.span(self.len())
    }
}

impl FromIterator<Sample> for SampleSeries {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Grand total as written by the logger itself. Informational only:
/// extrapolation never reads it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub energy: WattHours,
    pub cost: Cost,
}

/// Time span represented by one sample. Strictly positive and constant
/// across a whole run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SampleInterval(Hours);

impl SampleInterval {
    pub fn from_delay(delay: Duration) -> Result<Self> {
        let hours = Hours::from(delay);
        ensure!(hours > Hours::ZERO, "the sample interval must be strictly positive");
        Ok(Self(hours))
    }

    #[must_use]
    pub const fn hours(self) -> Hours {
        self.0
    }

    /// Number of samples needed to cover the duration, rounded up.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn samples_for(self, duration: Hours) -> usize {
        (duration.0 / self.0.0).ceil() as usize
    }

    /// Wall time covered by `count` samples.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn span(self, count: usize) -> Hours {
        Hours(self.0.0 * count as f64)
    }
}
