//! Wall-clock helpers pinned to the bot's fixed timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Every date and time the bot shows is rendered in this zone.
pub const TIMEZONE: Tz = chrono_tz::Asia::Dhaka;

/// Current time in [`TIMEZONE`].
pub fn now() -> DateTime<Tz> {
    Utc::now().with_timezone(&TIMEZONE)
}

/// `DD/MM/YYYY`
pub fn format_date(at: &DateTime<Tz>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// `hh:mm:ss AM`
pub fn format_time(at: &DateTime<Tz>) -> String {
    at.format("%I:%M:%S %p").to_string()
}
