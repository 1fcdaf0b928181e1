pub mod date;
pub mod error;

pub use date::ScreeningDate;
pub use error::ApiError;
