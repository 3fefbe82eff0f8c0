//! Exploratory data analysis of the Titanic passenger dataset.
//!
//! One linear pipeline: load `titanic.csv`, inspect it, fill missing values,
//! render a fixed sequence of charts, and optionally assemble everything into
//! a single report document. See [`pipeline::run`] for the entry point both
//! binaries share.

pub mod charts;
pub mod color;
pub mod data;
pub mod error;
pub mod inspect;
pub mod pipeline;
pub mod report;
pub mod stats;
