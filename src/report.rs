use std::{
    fmt::{Display, Formatter},
    fs,
    path::Path,
};

use serde::Serialize;

use crate::{
    estimate::{
        UsageProfile,
        daily::{self, DailyCosts, DailyEstimate},
        projection::{self, Projection},
        rate::CostRate,
    },
    fmt::MaybeCost,
    prelude::*,
    quantity::{power::Watts, rate::KilowattHourRate, time::Hours},
    session::{Sample, SampleInterval, SessionLog, SessionSummary},
};

/// Everything the report, table and chart consumers need from one run.
#[derive(Serialize)]
pub struct Assessment {
    pub device: String,
    pub interval: SampleInterval,
    pub profile: UsageProfile,
    pub active_readings: usize,
    pub phantom_readings: usize,
    pub rate: CostRate,
    pub daily: DailyEstimate,
    pub daily_costs: DailyCosts,
    pub projection: Option<Projection>,
    pub session_summary: Option<SessionSummary>,
    pub traces: PowerTraces,
}

impl Assessment {
    /// Runs stages 2–4 of the pipeline over a parsed log.
    #[instrument(skip_all)]
    pub fn assemble(
        device: String,
        log: &SessionLog,
        interval: SampleInterval,
        profile: UsageProfile,
        rate_override: Option<KilowattHourRate>,
    ) -> Result<Self> {
        let rate = CostRate::resolve(rate_override, &log.active);
        let daily = daily::extrapolate(&log.active, &log.phantom, interval, profile)?;
        let daily_costs = daily.costs(rate.value());
        let projection = projection::project(&daily, daily_costs, profile.uses_every_day);
        Ok(Self {
            device,
            interval,
            profile,
            active_readings: log.active.len(),
            phantom_readings: log.phantom.len(),
            rate,
            daily,
            daily_costs,
            projection,
            session_summary: log.summary,
            traces: PowerTraces::from_log(log, interval),
        })
    }
}

impl Display for Assessment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "======= Energy Report =======")?;
        writeln!(f, "Device: {}", self.device)?;
        writeln!(
            f,
            "Readings: {} active, {} phantom (one per {})",
            self.active_readings,
            self.phantom_readings,
            self.interval.hours(),
        )?;
        writeln!(
            f,
            "Declared use: {} active, {} plugged in per day",
            self.profile.active, self.profile.plugged_in,
        )?;
        writeln!(f, "Method: {}", self.daily.method)?;
        writeln!(f)?;
        writeln!(f, "Daily active energy:  {}", self.daily.active_energy)?;
        writeln!(
            f,
            "Daily phantom energy: {} (phantom draw ~ {})",
            self.daily.phantom_energy, self.daily.phantom_power,
        )?;
        writeln!(f, "Daily total energy:   {}", self.daily.total_energy())?;
        writeln!(
            f,
            "Daily cost:           {} (rate: {})",
            MaybeCost(self.daily_costs.total),
            self.rate,
        )?;
        if let Some(projection) = &self.projection {
            writeln!(f)?;
            writeln!(f, "Assuming daily use:")?;
            writeln!(
                f,
                "Monthly: {}, costing {}",
                projection.monthly.energy,
                MaybeCost(projection.monthly.cost),
            )?;
            writeln!(
                f,
                "Yearly:  {}, costing {}",
                projection.yearly.energy,
                MaybeCost(projection.yearly.cost),
            )?;
            writeln!(
                f,
                "Unplugging the device while idle would cut the yearly total to {}, costing {}",
                projection.no_phantom_yearly.energy,
                MaybeCost(projection.no_phantom_yearly.cost),
            )?;
        }
        if let Some(summary) = &self.session_summary {
            writeln!(f)?;
            writeln!(
                f,
                "Logger session summary: {}, costing {}",
                summary.energy, summary.cost,
            )?;
        }
        Ok(())
    }
}

/// Per-sample instantaneous power against the run's time axis, for charting.
/// Phantom timestamps continue from the end of the active range.
#[derive(Serialize)]
pub struct PowerTraces {
    pub active: Vec<TracePoint>,
    pub phantom: Vec<TracePoint>,
}

#[derive(Copy, Clone, Serialize)]
pub struct TracePoint {
    pub at: Hours,
    pub power: Watts,
}

impl PowerTraces {
    fn from_log(log: &SessionLog, interval: SampleInterval) -> Self {
        let trace = |offset: Hours, samples: &[Sample]| -> Vec<TracePoint> {
            samples
                .iter()
                .enumerate()
                .map(|(index, sample)| TracePoint {
                    at: offset + interval.span(index),
                    power: sample.power,
                })
                .collect()
        };
        Self {
            active: trace(Hours::ZERO, log.active.samples()),
            phantom: trace(log.active.duration(interval), log.phantom.samples()),
        }
    }
}

/// Writes the plain-text report. The text is rendered in full before the
/// file is touched: no partial report on failure.
pub fn write_text(assessment: &Assessment, path: &Path) -> Result {
    fs::write(path, assessment.to_string())
        .with_context(|| format!("failed to write the report to `{}`", path.display()))
}

/// Serializes the whole bundle for the external plotting collaborator.
pub fn write_json(assessment: &Assessment, path: &Path) -> Result {
    let json =
        serde_json::to_string_pretty(assessment).context("failed to serialize the assessment")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write the JSON bundle to `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use csv::StringRecord;

    use super::*;

    fn log() -> SessionLog {
        let rows = [
            vec!["1", "5.1", "210", "140.0", "0.2", "0.001"],
            vec!["2", "5.1", "210", "150.0", "0.21", "0.0011"],
            vec!["phantom measurements will now be taken!"],
            vec!["5.0", "12", "0.06", "0.0003", "0.000001"],
        ];
        SessionLog::from_records(rows.into_iter().map(StringRecord::from)).unwrap()
    }

    fn assessment() -> Assessment {
        let interval = SampleInterval::from_delay(Duration::from_secs(3600)).unwrap();
        let profile = UsageProfile::new(Hours(2.0), Hours(24.0), true);
        Assessment::assemble("kettle".to_owned(), &log(), interval, profile, None).unwrap()
    }

    #[test]
    fn test_phantom_trace_continues_the_time_axis() {
        let assessment = assessment();
        assert_eq!(assessment.traces.active.len(), 2);
        assert_eq!(assessment.traces.phantom.len(), 1);
        assert_eq!(assessment.traces.phantom[0].at, Hours(2.0));
        assert_eq!(assessment.traces.phantom[0].power, Watts(0.06));
    }

    #[test]
    fn test_report_mentions_the_method_and_device() {
        let text = assessment().to_string();
        assert!(text.contains("Device: kettle"));
        assert!(text.contains("Method: prefix"));
        assert!(text.contains("Assuming daily use:"));
    }

    #[test]
    fn test_identical_inputs_yield_an_identical_bundle() {
        let left = serde_json::to_string(&assessment()).unwrap();
        let right = serde_json::to_string(&assessment()).unwrap();
        assert_eq!(left, right);
    }
}
