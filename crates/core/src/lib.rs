pub mod clock;
pub mod errors;
pub mod messages;
pub mod models;
pub mod report;
