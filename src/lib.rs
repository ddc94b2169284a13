#![doc = include_str!("../README.md")]

pub mod cli;
pub mod estimate;
pub mod fmt;
pub mod prelude;
pub mod quantity;
pub mod recorder;
pub mod report;
pub mod session;
pub mod tables;
