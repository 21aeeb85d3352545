pub mod adherence;
pub mod aggregation;
pub mod calendar;
pub mod etl;
pub mod pipeline;
pub mod prescription;
pub mod presentation;
pub mod range_filter;
pub mod recurrence;
pub mod reminders;
pub mod schedule_check;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::domain::report::{Snapshot, TransformResult};
pub use crate::utils::error::Result;
