//! Identity and timestamp helpers
//!
//! Every diagram and chart id comes from here so that ids are globally
//! unique regardless of which row or chart created them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Mint a fresh, never-reused identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time, used for `createdAt`/`updatedAt`
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
