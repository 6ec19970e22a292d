pub mod aggregate;
pub mod changes;
pub mod day;
pub mod habit;
pub mod service;
pub mod source;
pub mod streak;

pub use crate::service::HabitService;
