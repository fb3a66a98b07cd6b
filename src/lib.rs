//! MFA Analyzer - Multi-factor decision analysis engine
//!
//! Weights a set of attributes, either manually or from pairwise importance
//! judgments, scores candidate scenarios against them and ranks the
//! scenarios. Open analyses are saved in the background after edits settle.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
