//! Senatax: Senate elections and income-tax statistics
//!
//! A library for joining per-year Senate election results with IRS
//! state-level income data and fitting the models that relate them.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
