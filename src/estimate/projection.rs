use serde::Serialize;

use crate::{
    estimate::daily::{DailyCosts, DailyEstimate},
    quantity::{cost::Cost, energy::WattHours},
};

/// The "used every day" projection is deliberately calendar-blind.
pub const DAYS_PER_MONTH: f64 = 30.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Energy and cost over one projection period.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct PeriodTotals {
    pub energy: WattHours,
    pub cost: Option<Cost>,
}

impl PeriodTotals {
    fn scale(self, factor: f64) -> Self {
        Self {
            energy: self.energy * factor,
            cost: self.cost.map(|cost| cost * factor),
        }
    }
}

/// Monthly and yearly projections, with the no-phantom counterfactual.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Projection {
    pub monthly: PeriodTotals,
    pub yearly: PeriodTotals,
    pub no_phantom_monthly: PeriodTotals,
    pub no_phantom_yearly: PeriodTotals,
}

/// `None` unless the device is declared to be used every day.
pub fn project(
    estimate: &DailyEstimate,
    costs: DailyCosts,
    uses_every_day: bool,
) -> Option<Projection> {
    uses_every_day.then(|| {
        let monthly = PeriodTotals { energy: estimate.total_energy(), cost: costs.total }
            .scale(DAYS_PER_MONTH);
        let no_phantom_monthly =
            PeriodTotals { energy: estimate.active_energy, cost: costs.active_only }
                .scale(DAYS_PER_MONTH);
        Projection {
            monthly,
            yearly: monthly.scale(MONTHS_PER_YEAR),
            no_phantom_monthly,
            no_phantom_yearly: no_phantom_monthly.scale(MONTHS_PER_YEAR),
        }
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{estimate::daily::Method, quantity::power::Watts};

    fn estimate() -> DailyEstimate {
        DailyEstimate {
            active_energy: WattHours(8.0),
            phantom_energy: WattHours(2.0),
            phantom_power: Watts(1.0),
            method: Method::Prefix { samples_used: 4 },
        }
    }

    #[test]
    fn test_monthly_and_yearly_multipliers() {
        let costs = DailyCosts { total: Some(Cost(0.01)), active_only: Some(Cost(0.008)) };
        let projection = project(&estimate(), costs, true).unwrap();

        assert_abs_diff_eq!(projection.monthly.energy.0, 300.0);
        assert_abs_diff_eq!(projection.yearly.energy.0, 3600.0);
        assert_abs_diff_eq!(projection.monthly.cost.unwrap().0, 0.3);
        assert_abs_diff_eq!(projection.yearly.cost.unwrap().0, 3.6);

        assert_abs_diff_eq!(projection.no_phantom_monthly.energy.0, 240.0);
        assert_abs_diff_eq!(projection.no_phantom_yearly.energy.0, 2880.0);
    }

    #[test]
    fn test_absent_without_daily_use() {
        let costs = DailyCosts { total: Some(Cost(0.01)), active_only: Some(Cost(0.008)) };
        assert!(project(&estimate(), costs, false).is_none());
    }

    #[test]
    fn test_unknown_cost_stays_unknown() {
        let costs = DailyCosts { total: None, active_only: None };
        let projection = project(&estimate(), costs, true).unwrap();
        assert!(projection.monthly.cost.is_none());
        assert!(projection.yearly.cost.is_none());
    }
}
