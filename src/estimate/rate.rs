use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
    session::SampleSeries,
};

/// Effective cost of energy and where it came from. `Unknown` propagates as
/// "cost unknown" through every downstream total, never as a zero rate.
#[derive(Copy, Clone, Debug, Serialize)]
pub enum CostRate {
    /// User-supplied override; always wins.
    Override(KilowattHourRate),

    /// Derived from the active series totals.
    Inferred(KilowattHourRate),

    Unknown,
}

impl CostRate {
    pub fn resolve(override_rate: Option<KilowattHourRate>, active: &SampleSeries) -> Self {
        match override_rate {
            Some(rate) => Self::Override(rate),
            None => infer(active).map_or(Self::Unknown, Self::Inferred),
        }
    }

    #[must_use]
    pub const fn value(self) -> Option<KilowattHourRate> {
        match self {
            Self::Override(rate) | Self::Inferred(rate) => Some(rate),
            Self::Unknown => None,
        }
    }
}

impl Display for CostRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override(rate) => write!(f, "{rate} (override)"),
            Self::Inferred(rate) => write!(f, "{rate} (inferred from the log)"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Total cost over total energy, or `None` when the series carries no energy
/// at all.
pub fn infer(active: &SampleSeries) -> Option<KilowattHourRate> {
    let total_energy = KilowattHours::from(active.total_energy());
    (total_energy > KilowattHours::ZERO).then(|| active.total_cost() / total_energy)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        quantity::{cost::Cost, energy::WattHours, power::Watts},
        session::Sample,
    };

    fn series(rows: &[(f64, f64)]) -> SampleSeries {
        rows.iter()
            .map(|&(energy, cost)| Sample {
                power: Watts::ZERO,
                energy: WattHours(energy),
                cost: Cost(cost),
            })
            .collect()
    }

    #[test]
    fn test_zero_energy_infers_nothing() {
        // Nonzero cost over zero energy is unknowable, not infinite and not zero.
        assert!(infer(&series(&[(0.0, 0.0), (0.0, 0.0), (0.0, 1.0)])).is_none());
    }

    #[test]
    fn test_inferred_rate() {
        let rate = infer(&series(&[(1.0, 0.1), (1.0, 0.1)])).unwrap();
        assert_abs_diff_eq!(rate.0, 100.0);
    }

    #[test]
    fn test_override_wins() {
        let resolved = CostRate::resolve(Some(KilowattHourRate(0.192)), &series(&[(1.0, 0.1)]));
        assert!(matches!(resolved, CostRate::Override(rate) if rate == KilowattHourRate(0.192)));
    }
}
