//! User-facing text and control identifiers shared by the poll cycle.

/// Custom id of the button that marks the clicker present.
pub const MARK_PRESENT_ID: &str = "mark_present";
pub const MARK_PRESENT_LABEL: &str = "✅ Mark Present";

/// Disabled acknowledgement shown only to the user who just marked.
pub const MARKED_ID: &str = "marked";
pub const MARKED_LABEL: &str = "✅ Marked";

/// Disabled control that replaces the poll button once the window closes.
pub const TIMES_UP_ID: &str = "times_up";
pub const TIMES_UP_LABEL: &str = "⏳ Time's Up!";

pub const ALREADY_MARKED: &str = "⚠️ You have already marked your attendance!";

pub fn poll_text(date: &str) -> String {
    format!(
        "📢 **{date}: Daily Attendance**\nClick the button below to mark yourself as **Present**."
    )
}

pub fn closed_poll_text(date: &str) -> String {
    format!("📢 **{date}: Daily Attendance (Closed)**\nThe attendance marking is now closed.")
}

pub fn marked_reply(time: &str) -> String {
    format!("✅ You marked yourself present at **{time}**!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn poll_texts_carry_the_date() {
        assert_eq!(
            poll_text("07/03/2025"),
            "📢 **07/03/2025: Daily Attendance**\nClick the button below to mark yourself as **Present**."
        );
        assert_eq!(
            closed_poll_text("07/03/2025"),
            "📢 **07/03/2025: Daily Attendance (Closed)**\nThe attendance marking is now closed."
        );
    }

    #[test]
    fn marked_reply_carries_the_time() {
        assert_eq!(
            marked_reply("11:12:05 AM"),
            "✅ You marked yourself present at **11:12:05 AM**!"
        );
    }
}
