//! Shared countdown refresh clock.
//!
//! The ticker does not own a thread or a timer. The caller samples "now"
//! once per refresh and calls [`CountdownTicker::tick`]; every attached row
//! gets its countdown recomputed against that single sample.
//!
//! ## Usage
//!
//! ```ignore
//! let mut ticker = CountdownTicker::new();
//! let row = ticker.attach(&milestone.id);
//! // once per second:
//! for update in ticker.tick(Utc::now(), &db.list_milestones()?) { /* redraw */ }
//! // row scrolled out of view:
//! ticker.detach(row);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::countdown::Countdown;
use crate::milestone::Milestone;

/// Handle for one attached row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RowHandle(u64);

/// Fresh countdown for one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowTick {
    pub row: RowHandle,
    pub milestone_id: String,
    pub countdown: Countdown,
}

impl RowTick {
    pub fn text(&self) -> String {
        self.countdown.to_string()
    }
}

#[derive(Debug, Default)]
pub struct CountdownTicker {
    rows: Vec<(RowHandle, String)>,
    next_handle: u64,
    last_tick: Option<DateTime<Utc>>,
}

impl CountdownTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing the row showing `milestone_id`.
    pub fn attach(&mut self, milestone_id: &str) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.push((handle, milestone_id.to_string()));
        handle
    }

    /// Stop refreshing a row. Returns false if it was not attached.
    pub fn detach(&mut self, row: RowHandle) -> bool {
        let before = self.rows.len();
        self.rows.retain(|(h, _)| *h != row);
        self.rows.len() != before
    }

    pub fn detach_all(&mut self) {
        self.rows.clear();
    }

    pub fn attached(&self) -> usize {
        self.rows.len()
    }

    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    /// Recompute every attached row against `now`.
    ///
    /// Rows whose milestone is no longer in `milestones` are detached.
    pub fn tick(&mut self, now: DateTime<Utc>, milestones: &[Milestone]) -> Vec<RowTick> {
        self.last_tick = Some(now);
        let mut updates = Vec::with_capacity(self.rows.len());
        self.rows.retain(|(row, id)| match milestones.iter().find(|m| &m.id == id) {
            Some(m) => {
                updates.push(RowTick {
                    row: *row,
                    milestone_id: id.clone(),
                    countdown: Countdown::between(m.target, now),
                });
                true
            }
            None => {
                debug!(milestone_id = %id, "row detached: milestone is gone");
                false
            }
        });
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn tick_broadcasts_one_sample_to_all_rows() {
        let a = Milestone::new("A", "", now() + Duration::seconds(90), now());
        let b = Milestone::new("B", "", now() - Duration::seconds(5), now());
        let mut ticker = CountdownTicker::new();
        ticker.attach(&a.id);
        ticker.attach(&b.id);

        let updates = ticker.tick(now(), &[a.clone(), b.clone()]);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].text(), "00d 00h 01m 30s");
        assert_eq!(updates[1].text(), "00d 00h 00m 00s");

        let later = ticker.tick(now() + Duration::seconds(30), &[a, b]);
        assert_eq!(later[0].text(), "00d 00h 01m 00s");
        assert_eq!(ticker.last_tick(), Some(now() + Duration::seconds(30)));
    }

    #[test]
    fn detached_rows_stop_updating() {
        let a = Milestone::new("A", "", now(), now());
        let mut ticker = CountdownTicker::new();
        let row = ticker.attach(&a.id);
        assert!(ticker.detach(row));
        assert!(!ticker.detach(row));
        assert!(ticker.tick(now(), &[a]).is_empty());
    }

    #[test]
    fn missing_milestones_are_detached() {
        let a = Milestone::new("A", "", now(), now());
        let mut ticker = CountdownTicker::new();
        ticker.attach(&a.id);
        assert!(ticker.tick(now(), &[]).is_empty());
        assert_eq!(ticker.attached(), 0);
    }
}
