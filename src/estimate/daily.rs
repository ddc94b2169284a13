use std::fmt::{Display, Formatter};

use average::Mean;
use serde::Serialize;

use crate::{
    estimate::UsageProfile,
    prelude::*,
    quantity::{
        cost::Cost,
        energy::{KilowattHours, WattHours},
        power::Watts,
        rate::KilowattHourRate,
    },
    session::{SampleInterval, SampleSeries},
};

/// Fewest samples the steady-state tail is averaged over.
const MIN_TAIL_SAMPLES: usize = 5;

/// How the daily active energy was obtained.
#[derive(Copy, Clone, Debug, Serialize)]
pub enum Method {
    /// The log covers the declared daily active time, so the leading
    /// sub-window is read off directly.
    Prefix { samples_used: usize },

    /// The log is shorter than the declared daily active time; the remainder
    /// is extrapolated at the steady-state tail power.
    PrefixPlusTail { tail_power: Watts },
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefix { samples_used } => {
                write!(f, "prefix ({samples_used} leading readings)")
            }
            Self::PrefixPlusTail { tail_power } => {
                write!(f, "prefix + tail (steady-state ~ {tail_power})")
            }
        }
    }
}

/// Daily energy estimate for one device.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct DailyEstimate {
    pub active_energy: WattHours,
    pub phantom_energy: WattHours,
    pub phantom_power: Watts,
    pub method: Method,
}

impl DailyEstimate {
    pub fn total_energy(&self) -> WattHours {
        self.active_energy + self.phantom_energy
    }

    /// Daily cost and its no-phantom counterfactual; both `None` without a
    /// known rate.
    pub fn costs(&self, rate: Option<KilowattHourRate>) -> DailyCosts {
        DailyCosts {
            total: rate.map(|rate| KilowattHours::from(self.total_energy()) * rate),
            active_only: rate.map(|rate| KilowattHours::from(self.active_energy) * rate),
        }
    }
}

#[derive(Copy, Clone, Debug, Serialize)]
pub struct DailyCosts {
    pub total: Option<Cost>,
    pub active_only: Option<Cost>,
}

/// The extrapolation core: projects the logged test window onto the declared
/// daily usage pattern.
#[instrument(skip_all)]
pub fn extrapolate(
    active: &SampleSeries,
    phantom: &SampleSeries,
    interval: SampleInterval,
    profile: UsageProfile,
) -> Result<DailyEstimate> {
    ensure!(!active.is_empty(), "no active readings found, cannot extrapolate");

    let test_duration = active.duration(interval);
    let (active_energy, method) = if profile.active <= test_duration {
        // The ceiling can land one sample past the end when the declared time
        // sits exactly on the window boundary.
        let samples_used = interval.samples_for(profile.active).min(active.len());
        let energy = active.samples()[..samples_used]
            .iter()
            .map(|sample| sample.energy)
            .sum();
        (energy, Method::Prefix { samples_used })
    } else {
        let tail_power = steady_tail_power(active, interval);
        let energy = active.total_energy() + tail_power * (profile.active - test_duration);
        (energy, Method::PrefixPlusTail { tail_power })
    };

    let phantom_power = average_phantom_power(phantom, interval);
    let phantom_energy = phantom_power * profile.idle();

    debug!(?method, %active_energy, %phantom_energy);
    Ok(DailyEstimate { active_energy, phantom_energy, phantom_power, method })
}

/// Average power over the trailing window, which is assumed to represent
/// settled operation rather than start-up transients. The window is
/// [`MIN_TAIL_SAMPLES`] or a tenth of the series, whichever is larger; a
/// series shorter than the window still divides by the full window span.
fn steady_tail_power(active: &SampleSeries, interval: SampleInterval) -> Watts {
    let window = (active.len() / 10).max(MIN_TAIL_SAMPLES);
    let tail = &active.samples()[active.len().saturating_sub(window)..];
    let tail_energy: WattHours = tail.iter().map(|sample| sample.energy).sum();
    tail_energy / interval.span(window)
}

/// Average phantom draw; zero without phantom readings.
fn average_phantom_power(phantom: &SampleSeries, interval: SampleInterval) -> Watts {
    if phantom.is_empty() {
        return Watts::ZERO;
    }
    let mean_energy: Mean = phantom.samples().iter().map(|sample| sample.energy.0).collect();
    WattHours(mean_energy.mean()) / interval.hours()
}
