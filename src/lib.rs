pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};

pub use crate::core::{etl::EtlEngine, pipeline::ReportPipeline};
pub use crate::core::{
    adherence::{adherence, adherence_on},
    aggregation::aggregate,
    range_filter::{filter, filter_in},
    recurrence::expand,
};
pub use crate::domain::model::{
    AdherenceReport, AggregatedSessionPoint, DateWindow, DayOfWeek, Prescription, SessionRecord,
};
pub use crate::utils::error::{EtlError, Result};
