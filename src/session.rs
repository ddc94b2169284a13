pub mod locate;
pub mod parser;
pub mod sample;

pub use self::{
    locate::find_latest_log,
    parser::SessionLog,
    sample::{Sample, SampleInterval, SampleSeries, SessionSummary},
};
