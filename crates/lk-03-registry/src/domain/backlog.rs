//! # Backlog Retention
//!
//! The backlog is appended in block order, so it is sorted by height and
//! retention is a single prefix cut.

use super::entities::ServiceRequest;

/// Drop every entry with `height <= cutoff`. Returns how many were dropped.
pub fn retain_above(backlog: &mut Vec<ServiceRequest>, cutoff: i64) -> usize {
    let split = backlog.partition_point(|entry| entry.height <= cutoff);
    backlog.drain(..split);
    split
}
