use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::clock;
use crate::messages::MARK_PRESENT_ID;

/// The user behind a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub user_id: u64,
    /// Guild nickname, or the username when no nickname is set.
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub user_id: u64,
    pub display_name: String,
    /// Localized wall-clock time of the first click, `hh:mm:ss AM`.
    pub marked_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Open,
    Closed,
}

/// What a single click did to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// First click from this user; a record was created.
    Marked(AttendanceRecord),
    /// The user already has a record. Nothing changed.
    AlreadyMarked,
    /// The click targeted some other control.
    Ignored,
    /// The window no longer accepts clicks.
    Closed,
}

/// One day's collection window.
///
/// Records are kept in arrival order and keyed by user id; a user can hold
/// at most one record. Once closed the window rejects every click.
#[derive(Debug, Clone)]
pub struct AttendanceWindow {
    opened_at: DateTime<Tz>,
    duration: Duration,
    state: WindowState,
    records: Vec<AttendanceRecord>,
    marked: HashSet<u64>,
}

impl AttendanceWindow {
    pub fn open(opened_at: DateTime<Tz>, duration: Duration) -> Self {
        Self {
            opened_at,
            duration,
            state: WindowState::Open,
            records: Vec::new(),
            marked: HashSet::new(),
        }
    }

    pub fn opened_at(&self) -> &DateTime<Tz> {
        &self.opened_at
    }

    /// Poll date, `DD/MM/YYYY`.
    pub fn date(&self) -> String {
        clock::format_date(&self.opened_at)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == WindowState::Open
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    /// Apply a click on control `custom_id` made at `at`.
    pub fn record(&mut self, custom_id: &str, attendee: Attendee, at: &DateTime<Tz>) -> ClickOutcome {
        if !self.is_open() {
            return ClickOutcome::Closed;
        }
        if custom_id != MARK_PRESENT_ID {
            return ClickOutcome::Ignored;
        }
        if !self.marked.insert(attendee.user_id) {
            return ClickOutcome::AlreadyMarked;
        }

        let record = AttendanceRecord {
            user_id: attendee.user_id,
            display_name: attendee.display_name,
            marked_at: clock::format_time(at),
        };
        self.records.push(record.clone());
        ClickOutcome::Marked(record)
    }

    /// Move to `Closed`. Returns `false` if the window was already closed.
    pub fn close(&mut self) -> bool {
        match self.state {
            WindowState::Open => {
                self.state = WindowState::Closed;
                true
            }
            WindowState::Closed => false,
        }
    }
}
