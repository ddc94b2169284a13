//! The session recorder: the on-device logging loop reframed as a state
//! machine. Discrete events go in, log rows come out; there is no I/O and no
//! clock in here. Timestamps arrive with the events, and a collaborator
//! appends the emitted rows to the current session file.

use std::fmt::{Display, Formatter};

use crate::{
    quantity::{
        cost::Cost,
        energy::{KilowattHours, WattHours},
        power::Watts,
        rate::KilowattHourRate,
    },
    session::SampleInterval,
};

/// Phantom samples taken per session before the summary is written.
pub const PHANTOM_SAMPLES_PER_SESSION: usize = 60;

/// Button edges closer than this to the last accepted edge are switch bounce.
pub const DEBOUNCE_MS: u64 = 200;

/// One raw sensor reading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reading {
    pub voltage: f64,
    pub current_milliamps: f64,
}

impl Reading {
    /// Instantaneous power. The current sign depends on how the shunt is
    /// wired, so only its magnitude is meaningful.
    #[must_use]
    pub fn power(self) -> Watts {
        Watts(self.voltage * self.current_milliamps.abs() / 1000.0)
    }
}

/// Discrete external events driving the recorder.
#[derive(Copy, Clone, Debug)]
pub enum Event {
    /// Falling edge of the toggle button.
    ButtonEdge { at_ms: u64 },

    /// Sampling timer fired with a fresh reading.
    Tick { reading: Reading },
}

/// Recorder lifecycle. `Phantom` counts the idle samples already taken.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum State {
    Idle,
    Active,
    Phantom { taken: usize },
    Closed,
}

/// Running totals of one session, threaded through the transitions.
#[derive(Copy, Clone, Debug, Default)]
pub struct SessionTotals {
    pub active_energy: WattHours,
    pub active_cost: Cost,
    pub phantom_energy: WattHours,
    pub phantom_cost: Cost,
}

impl SessionTotals {
    #[must_use]
    pub fn grand_energy(&self) -> WattHours {
        self.active_energy + self.phantom_energy
    }

    #[must_use]
    pub fn grand_cost(&self) -> Cost {
        self.active_cost + self.phantom_cost
    }
}

/// A log row the recorder emits. `Preamble` opens a new session file;
/// everything else appends to the current one. The textual rendering is
/// exactly what [`crate::session::SessionLog`] parses back.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Preamble { interval: SampleInterval },
    ActiveHeader,
    ActiveSample { index: u32, reading: Reading, power: Watts, energy: WattHours, cost: Cost },
    PhantomMarker,
    PhantomHeader,
    PhantomSample { reading: Reading, power: Watts, energy: WattHours, cost: Cost },
    SummaryMarker,
    SummaryHeader,
    SummaryTotals { energy: WattHours, cost: Cost },
}

impl Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preamble { interval } => {
                write!(f, "Delay (seconds): {}", interval.hours().0 * 3600.0)
            }
            Self::ActiveHeader => {
                write!(f, "Reading #, voltage (V), current (mA), power (W), energy (Wh), cost")
            }
            Self::ActiveSample { index, reading, power, energy, cost } => write!(
                f,
                "{},{},{},{},{},{}",
                index, reading.voltage, reading.current_milliamps, power.0, energy.0, cost.0,
            ),
            Self::PhantomMarker => write!(f, "phantom measurements will now be taken!"),
            Self::PhantomHeader => write!(
                f,
                "phantom voltage (V), phantom current (mA), phantom power (W), phantom energy (Wh), cost"
            ),
            Self::PhantomSample { reading, power, energy, cost } => write!(
                f,
                "{},{},{},{},{}",
                reading.voltage, reading.current_milliamps, power.0, energy.0, cost.0,
            ),
            Self::SummaryMarker => write!(f, "Session Summary"),
            Self::SummaryHeader => write!(f, "Total Energy(Wh), Total Cost"),
            Self::SummaryTotals { energy, cost } => write!(f, "{},{}", energy.0, cost.0),
        }
    }
}

/// Debounce filter over button-edge timestamps.
#[derive(Copy, Clone, Debug, Default)]
pub struct Debounce {
    last_accepted_ms: Option<u64>,
}

impl Debounce {
    /// Whether an edge at this timestamp is genuine rather than bounce.
    #[must_use]
    pub fn accepts(self, at_ms: u64) -> bool {
        self.last_accepted_ms.is_none_or(|last| at_ms.saturating_sub(last) > DEBOUNCE_MS)
    }

    fn accept(&mut self, at_ms: u64) {
        self.last_accepted_ms = Some(at_ms);
    }
}

pub struct Recorder {
    interval: SampleInterval,
    rate: KilowattHourRate,
    state: State,
    debounce: Debounce,
    session: u32,
    reading_index: u32,
    totals: SessionTotals,
}

impl Recorder {
    #[must_use]
    pub fn new(interval: SampleInterval, rate: KilowattHourRate) -> Self {
        Self {
            interval,
            rate,
            state: State::Idle,
            debounce: Debounce::default(),
            session: 0,
            reading_index: 1,
            totals: SessionTotals::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub const fn totals(&self) -> SessionTotals {
        self.totals
    }

    #[must_use]
    pub const fn session(&self) -> u32 {
        self.session
    }

    /// File the current session's rows belong into.
    #[must_use]
    pub fn log_file_name(&self) -> Option<String> {
        (self.session != 0).then(|| format!("energy_log_{}.csv", self.session))
    }

    /// Feeds one event through the machine and returns the rows to append.
    pub fn handle(&mut self, event: Event) -> Vec<Row> {
        match event {
            Event::ButtonEdge { at_ms } => self.on_edge(at_ms),
            Event::Tick { reading } => self.on_tick(reading),
        }
    }

    fn on_edge(&mut self, at_ms: u64) -> Vec<Row> {
        if !self.debounce.accepts(at_ms) {
            return Vec::new();
        }
        self.debounce.accept(at_ms);
        match self.state {
            // Toggling off ends the active phase; phantom sampling follows.
            State::Active => {
                self.state = State::Phantom { taken: 0 };
                Vec::new()
            }
            // Toggling on anywhere else starts a fresh session.
            State::Idle | State::Phantom { .. } | State::Closed => {
                self.session += 1;
                self.reading_index = 1;
                self.totals = SessionTotals::default();
                self.state = State::Active;
                vec![Row::Preamble { interval: self.interval }, Row::ActiveHeader]
            }
        }
    }

    fn on_tick(&mut self, reading: Reading) -> Vec<Row> {
        match self.state {
            State::Idle | State::Closed => Vec::new(),
            State::Active => {
                let (power, energy, cost) = self.measure(reading);
                self.totals.active_energy += energy;
                self.totals.active_cost += cost;
                let row =
                    Row::ActiveSample { index: self.reading_index, reading, power, energy, cost };
                self.reading_index += 1;
                vec![row]
            }
            State::Phantom { taken } => {
                let (power, energy, cost) = self.measure(reading);
                self.totals.phantom_energy += energy;
                self.totals.phantom_cost += cost;

                let mut rows = Vec::new();
                if taken == 0 {
                    rows.push(Row::PhantomMarker);
                    rows.push(Row::PhantomHeader);
                }
                rows.push(Row::PhantomSample { reading, power, energy, cost });

                let taken = taken + 1;
                if taken < PHANTOM_SAMPLES_PER_SESSION {
                    self.state = State::Phantom { taken };
                } else {
                    // The summary closes the session; `Closed` guarantees it
                    // is written exactly once.
                    rows.push(Row::SummaryMarker);
                    rows.push(Row::SummaryHeader);
                    rows.push(Row::SummaryTotals {
                        energy: self.totals.grand_energy(),
                        cost: self.totals.grand_cost(),
                    });
                    self.state = State::Closed;
                }
                rows
            }
        }
    }

    fn measure(&self, reading: Reading) -> (Watts, WattHours, Cost) {
        let power = reading.power();
        let energy = power * self.interval.hours();
        let cost = KilowattHours::from(energy) * self.rate;
        (power, energy, cost)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    use super::*;
    use crate::session::SessionLog;

    const READING: Reading = Reading { voltage: 5.0, current_milliamps: 1000.0 };

    fn recorder() -> Recorder {
        // 0.1 h per sample at a 0.192 per-kWh rate.
        let interval = SampleInterval::from_delay(Duration::from_secs(360)).unwrap();
        Recorder::new(interval, KilowattHourRate(0.192))
    }

    #[test]
    fn test_debounce_swallows_bounce() {
        let mut recorder = recorder();
        assert!(!recorder.handle(Event::ButtonEdge { at_ms: 1000 }).is_empty());
        assert_eq!(recorder.state(), State::Active);

        // 100 ms later: bounce, nothing happens.
        assert!(recorder.handle(Event::ButtonEdge { at_ms: 1100 }).is_empty());
        assert_eq!(recorder.state(), State::Active);

        // 300 ms after the accepted edge: a genuine toggle.
        recorder.handle(Event::ButtonEdge { at_ms: 1300 });
        assert_eq!(recorder.state(), State::Phantom { taken: 0 });
    }

    #[test]
    fn test_ticks_are_ignored_outside_a_session() {
        let mut recorder = recorder();
        assert!(recorder.handle(Event::Tick { reading: READING }).is_empty());
        assert_eq!(recorder.state(), State::Idle);
    }

    #[test]
    fn test_active_ticks_accumulate_totals() {
        let mut recorder = recorder();
        let rows = recorder.handle(Event::ButtonEdge { at_ms: 1000 });
        assert_eq!(rows, vec![
            Row::Preamble { interval: recorder.interval },
            Row::ActiveHeader,
        ]);
        assert_eq!(recorder.session(), 1);
        assert_eq!(recorder.log_file_name().unwrap(), "energy_log_1.csv");

        // 5 V × 1 A over 0.1 h: 0.5 Wh per tick.
        recorder.handle(Event::Tick { reading: READING });
        recorder.handle(Event::Tick { reading: READING });
        assert_abs_diff_eq!(recorder.totals().active_energy.0, 1.0);
        assert_abs_diff_eq!(recorder.totals().active_cost.0, 0.001 * 0.192);
    }

    #[test]
    fn test_phantom_phase_caps_and_summarizes_once() {
        let mut recorder = recorder();
        recorder.handle(Event::ButtonEdge { at_ms: 1000 });
        recorder.handle(Event::Tick { reading: READING });
        recorder.handle(Event::ButtonEdge { at_ms: 2000 });

        let first = recorder.handle(Event::Tick { reading: READING });
        assert_eq!(first[0], Row::PhantomMarker);
        assert_eq!(first[1], Row::PhantomHeader);

        let mut last = Vec::new();
        for _ in 1..PHANTOM_SAMPLES_PER_SESSION {
            last = recorder.handle(Event::Tick { reading: READING });
        }
        assert_eq!(recorder.state(), State::Closed);
        assert!(last.contains(&Row::SummaryMarker));
        assert!(matches!(last.last(), Some(Row::SummaryTotals { .. })));
        assert_abs_diff_eq!(recorder.totals().phantom_energy.0, 30.0);

        // The session is closed: further ticks write nothing.
        assert!(recorder.handle(Event::Tick { reading: READING }).is_empty());
    }

    #[test]
    fn test_restart_resets_the_session_record() {
        let mut recorder = recorder();
        recorder.handle(Event::ButtonEdge { at_ms: 1000 });
        recorder.handle(Event::Tick { reading: READING });
        recorder.handle(Event::ButtonEdge { at_ms: 2000 });
        recorder.handle(Event::Tick { reading: READING });

        recorder.handle(Event::ButtonEdge { at_ms: 3000 });
        assert_eq!(recorder.state(), State::Active);
        assert_eq!(recorder.session(), 2);
        assert_eq!(recorder.log_file_name().unwrap(), "energy_log_2.csv");
        assert_abs_diff_eq!(recorder.totals().grand_energy().0, 0.0);
    }

    #[test]
    fn test_emitted_rows_parse_back_into_the_same_totals() {
        let mut recorder = recorder();
        let mut rows = recorder.handle(Event::ButtonEdge { at_ms: 1000 });
        for _ in 0..3 {
            rows.extend(recorder.handle(Event::Tick { reading: READING }));
        }
        rows.extend(recorder.handle(Event::ButtonEdge { at_ms: 2000 }));
        for _ in 0..PHANTOM_SAMPLES_PER_SESSION {
            rows.extend(recorder.handle(Event::Tick { reading: READING }));
        }

        let text = rows.iter().map(Row::to_string).join("\n");
        let records: Vec<csv::StringRecord> = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes())
            .into_records()
            .collect::<Result<_, _>>()
            .unwrap();
        let log = SessionLog::from_records(records).unwrap();

        assert_eq!(log.active.len(), 3);
        assert_eq!(log.phantom.len(), PHANTOM_SAMPLES_PER_SESSION);
        assert_abs_diff_eq!(log.active.total_energy().0, recorder.totals().active_energy.0);
        assert_abs_diff_eq!(log.phantom.total_energy().0, recorder.totals().phantom_energy.0);
        let summary = log.summary.unwrap();
        assert_abs_diff_eq!(summary.energy.0, recorder.totals().grand_energy().0);
        assert_abs_diff_eq!(summary.cost.0, recorder.totals().grand_cost().0);
    }
}
