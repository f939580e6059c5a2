//! # Integration Scenarios
//!
//! Whole-application flows driven through the same calls the consensus
//! engine makes.

pub mod crash_consistency;
pub mod determinism;
pub mod marketplace_flow;
