pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::core::presentation::ChartView;
    use crate::core::ConfigProvider;
    use crate::utils::error::{EtlError, Result};
    use crate::utils::validation::{
        validate_non_empty_string, validate_output_formats, validate_path, validate_range,
        validate_source, Validate,
    };
    use chrono::NaiveDate;
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "therapy-etl")]
    #[command(about = "Exercise prescription adherence and session reports")]
    pub struct CliConfig {
        /// Prescriptions snapshot: Firebase REST URL or local JSON export
        #[arg(long, default_value = "./data/prescriptions.json")]
        pub prescriptions: String,

        /// Exercise sessions snapshot: Firebase REST URL or local JSON export
        #[arg(long, default_value = "./data/exercises.json")]
        pub sessions: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Only report this patient
        #[arg(long)]
        pub patient: Option<String>,

        /// Only report this exercise
        #[arg(long)]
        pub exercise: Option<String>,

        /// First day of the chart window (YYYY-MM-DD)
        #[arg(long)]
        pub start: Option<NaiveDate>,

        /// Last day of the chart window (YYYY-MM-DD)
        #[arg(long)]
        pub end: Option<NaiveDate>,

        /// Day adherence is measured on, defaults to today (UTC)
        #[arg(long)]
        pub reference_date: Option<NaiveDate>,

        #[arg(long, default_value = "all")]
        pub chart_view: ChartView,

        #[arg(long, value_delimiter = ',', default_value = "csv,json")]
        pub formats: Vec<String>,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        /// Firebase database secret or ID token, sent as the `auth` query parameter
        #[arg(long)]
        pub auth: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per stage")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn prescriptions_source(&self) -> &str {
            &self.prescriptions
        }

        fn sessions_source(&self) -> &str {
            &self.sessions
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn patient_filter(&self) -> Option<&str> {
            self.patient.as_deref()
        }

        fn exercise_filter(&self) -> Option<&str> {
            self.exercise.as_deref()
        }

        fn requested_start(&self) -> Option<NaiveDate> {
            self.start
        }

        fn requested_end(&self) -> Option<NaiveDate> {
            self.end
        }

        fn reference_date(&self) -> Option<NaiveDate> {
            self.reference_date
        }

        fn chart_view(&self) -> ChartView {
            self.chart_view
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }

        fn request_parameters(&self) -> Vec<(String, String)> {
            self.auth
                .iter()
                .map(|token| ("auth".to_string(), token.clone()))
                .collect()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_source("prescriptions", &self.prescriptions)?;
            validate_source("sessions", &self.sessions)?;
            validate_path("output_path", &self.output_path)?;
            validate_output_formats("formats", &self.formats)?;

            if let Some(patient) = &self.patient {
                validate_non_empty_string("patient", patient)?;
            }
            if let Some(exercise) = &self.exercise {
                validate_non_empty_string("exercise", exercise)?;
            }
            if let Some(timeout) = self.timeout_seconds {
                validate_range("timeout_seconds", timeout, 1, 300)?;
            }
            if let Some(auth) = &self.auth {
                if auth.trim().is_empty() {
                    return Err(EtlError::MissingConfigError {
                        field: "auth".to_string(),
                    });
                }
            }

            Ok(())
        }
    }

}
