pub mod movies;
pub mod schedule;

pub use movies::MovieClient;
pub use schedule::{ScheduleCheck, ScheduleClient};
