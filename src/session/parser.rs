use std::{fs::File, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    prelude::*,
    quantity::{cost::Cost, energy::WattHours, power::Watts},
    session::sample::{Sample, SampleSeries, SessionSummary},
};

/// Marker the logger writes at the start of the phantom section.
const PHANTOM_MARKER: &str = "phantom measurements";

/// Marker the logger writes at the start of the summary section.
const SUMMARY_MARKER: &str = "session summary";

/// Column-header fragments, discarded in any section.
const HEADER_FRAGMENTS: [&str; 3] = ["reading #", "phantom voltage", "total energy(wh)"];

/// Logical section of a session log. The log is one flat table; marker rows
/// switch the scanner between sections and carry no data themselves.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Section {
    Active,
    Phantom,
    Summary,
}

impl Section {
    fn recognize(first_field: &str) -> Option<Self> {
        let first_field = first_field.trim().to_lowercase();
        if first_field.contains(PHANTOM_MARKER) {
            Some(Self::Phantom)
        } else if first_field.contains(SUMMARY_MARKER) {
            Some(Self::Summary)
        } else {
            None
        }
    }
}

fn is_header(first_field: &str) -> bool {
    let first_field = first_field.trim().to_lowercase();
    HEADER_FRAGMENTS.iter().any(|fragment| first_field.contains(fragment))
}

/// Numeric fields of the row, in order. Unparseable fields are dropped, they
/// never abort the row.
fn numbers(record: &StringRecord) -> Vec<f64> {
    record.iter().filter_map(|field| field.trim().parse().ok()).collect()
}

/// A parsed session log: the two measurement series plus the optional
/// logger-written grand total.
#[derive(Debug)]
pub struct SessionLog {
    pub active: SampleSeries,
    pub phantom: SampleSeries,
    pub summary: Option<SessionSummary>,
}

impl SessionLog {
    #[instrument(skip_all)]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open the session log `{}`", path.display()))?;
        let records: Vec<StringRecord> = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file)
            .into_records()
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to read the session log `{}`", path.display()))?;
        Self::from_records(records)
    }

    /// Scans the rows with the tagged-section state machine.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = StringRecord>,
    {
        let mut section = Section::Active;
        let mut active = SampleSeries::default();
        let mut phantom = SampleSeries::default();
        let mut summary = None;

        for record in records {
            let Some(first_field) = record.get(0) else {
                continue;
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            if let Some(next_section) = Section::recognize(first_field) {
                section = next_section;
                continue;
            }
            if is_header(first_field) {
                continue;
            }

            let numbers = numbers(&record);
            match section {
                Section::Active | Section::Phantom => {
                    // The trailing three numbers are power, energy and cost;
                    // leading metadata columns do not matter. Rows with fewer
                    // numbers are malformed and dropped.
                    if let [.., power, energy, cost] = numbers.as_slice() {
                        let sample = Sample {
                            power: Watts(*power),
                            energy: WattHours(*energy),
                            cost: Cost(*cost),
                        };
                        if section == Section::Active {
                            active.push(sample);
                        } else {
                            phantom.push(sample);
                        }
                    }
                }
                Section::Summary => {
                    // The first meaningful summary row wins.
                    if summary.is_none()
                        && let [energy, cost, ..] = numbers.as_slice()
                    {
                        summary = Some(SessionSummary {
                            energy: WattHours(*energy),
                            cost: Cost(*cost),
                        });
                    }
                }
            }
        }

        ensure!(!active.is_empty(), "no active readings found, cannot extrapolate");
        Ok(Self { active, phantom, summary })
    }
}
