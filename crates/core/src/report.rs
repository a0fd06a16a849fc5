//! Present/absent partition of a closed window and its text rendering.

use std::collections::HashSet;

use crate::models::attendance::AttendanceRecord;
use crate::models::roster::{Member, Roster};

pub const NO_ONE_PRESENT: &str = "No one marked themselves as present today. ❌";
pub const EVERYONE_PRESENT: &str = "🎉 Everyone marked their attendance today!";

/// Longest message body the platform accepts.
pub const MESSAGE_LIMIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    date: String,
    present: Vec<AttendanceRecord>,
    absent: Vec<Member>,
}

impl Report {
    /// Present is every record in arrival order. Absent is every roster
    /// member without a record, in roster order.
    pub fn build(date: impl Into<String>, records: &[AttendanceRecord], roster: &Roster) -> Self {
        let marked: HashSet<u64> = records.iter().map(|record| record.user_id).collect();
        let absent = roster
            .members()
            .iter()
            .filter(|member| !marked.contains(&member.user_id))
            .cloned()
            .collect();

        Self {
            date: date.into(),
            present: records.to_vec(),
            absent,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn present(&self) -> &[AttendanceRecord] {
        &self.present
    }

    pub fn absent(&self) -> &[Member] {
        &self.absent
    }

    pub fn present_text(&self) -> String {
        let mut text = format!(
            "📢 **{}: Daily Attendance Report**\n\n📢 **Present List**\n",
            self.date
        );

        if self.present.is_empty() {
            text.push_str(NO_ONE_PRESENT);
        } else {
            for record in &self.present {
                text.push_str(&format!(
                    "✅ {} - Marked at **{}**\n",
                    record.display_name, record.marked_at
                ));
            }
        }

        text
    }

    pub fn absent_text(&self) -> String {
        let mut text = String::from("📢 **Absent List**\n");

        if self.absent.is_empty() {
            text.push_str(EVERYONE_PRESENT);
        } else {
            for member in &self.absent {
                text.push_str(&format!("❌ {}\n", member.display_name()));
            }
        }

        text
    }

    /// Present and absent sections together, for the report channel.
    pub fn combined_text(&self) -> String {
        format!("{}\n{}", self.present_text(), self.absent_text())
    }
}

/// Break `text` into pieces of at most `limit` characters, cutting at line
/// ends where possible. A `limit` of zero means no limit.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 {
        return if text.is_empty() { Vec::new() } else { vec![text.to_string()] };
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        let mut line = line;

        while line.chars().count() > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let cut = line
                .char_indices()
                .nth(limit)
                .map(|(index, _)| index)
                .unwrap_or(line.len());
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }

        if current.chars().count() + line.chars().count() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
