use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    estimate::UsageProfile,
    prelude::*,
    quantity::{rate::KilowattHourRate, time::Hours},
    session::SampleInterval,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: parse a session log and project daily, monthly and
    /// yearly energy and cost.
    #[clap(name = "analyze")]
    Analyze(Box<AnalyzeArgs>),
}

const DEFAULT_DEVICE: &str = "unnamed device";

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Device label used in the report.
    #[clap(long, env = "DEVICE_LABEL", default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Session log to analyze. Defaults to the newest `energy_log_*.csv`
    /// under `--log-dir`.
    #[clap(long = "log", env = "SESSION_LOG")]
    pub log_path: Option<PathBuf>,

    /// Directory searched for session logs when `--log` is not given.
    #[clap(long = "log-dir", env = "SESSION_LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// Delay between readings, as recorded by the logger.
    #[clap(long = "sample-interval", env = "SAMPLE_INTERVAL", default_value = "5s")]
    pub sample_interval: humantime::Duration,

    /// Hours per day the device stays plugged in.
    #[clap(long = "plugged-in-hours", env = "PLUGGED_IN_HOURS")]
    pub plugged_in_hours: Hours,

    /// Hours per day the device is actively used.
    #[clap(long = "active-hours", env = "ACTIVE_HOURS")]
    pub active_hours: Hours,

    /// Electricity cost override per kWh. Inferred from the log when omitted.
    #[clap(long = "rate-per-kwh", env = "RATE_PER_KWH")]
    pub rate: Option<KilowattHourRate>,

    /// Whether the device is used every day. Monthly and yearly projections
    /// are computed only for `yes`.
    #[clap(long = "used-every-day", env = "USED_EVERY_DAY", value_enum)]
    pub used_every_day: UsedEveryDay,

    /// Plain-text report output path.
    #[clap(long = "report", env = "REPORT_PATH", default_value = "energy_report.txt")]
    pub report_path: PathBuf,

    /// Optional JSON bundle output for external plotting.
    #[clap(long = "json", env = "JSON_PATH")]
    pub json_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum UsedEveryDay {
    Yes,
    No,
}

impl AnalyzeArgs {
    /// Device label, falling back to the placeholder when blank.
    #[must_use]
    pub fn device(&self) -> String {
        let device = self.device.trim();
        if device.is_empty() { DEFAULT_DEVICE.to_owned() } else { device.to_owned() }
    }

    pub fn interval(&self) -> Result<SampleInterval> {
        SampleInterval::from_delay(self.sample_interval.into())
    }

    #[must_use]
    pub fn profile(&self) -> UsageProfile {
        UsageProfile::new(
            self.active_hours,
            self.plugged_in_hours,
            matches!(self.used_every_day, UsedEveryDay::Yes),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_the_analyze_command() {
        let args = Args::try_parse_from([
            "dormouse",
            "analyze",
            "--device",
            "kettle",
            "--active-hours",
            "1.5",
            "--plugged-in-hours",
            "24",
            "--used-every-day",
            "yes",
        ])
        .unwrap();
        let Command::Analyze(args) = args.command;
        assert_eq!(args.device, "kettle");
        assert_eq!(args.profile().active, Hours(1.5));
        assert!(args.profile().uses_every_day);
        assert!(args.interval().is_ok());
    }

    #[test]
    fn test_blank_device_falls_back_to_the_placeholder() {
        let args = Args::try_parse_from([
            "dormouse",
            "analyze",
            "--device",
            "   ",
            "--active-hours",
            "1",
            "--plugged-in-hours",
            "2",
            "--used-every-day",
            "no",
        ])
        .unwrap();
        let Command::Analyze(args) = args.command;
        assert_eq!(args.device(), DEFAULT_DEVICE);
        assert!(!args.profile().uses_every_day);
    }
}
