use crate::core::presentation::ChartView;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_range,
    validate_required_field, validate_source, Validate,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub adherence: AdherenceConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub prescriptions: Option<String>,
    pub sessions: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<BTreeMap<String, String>>,
    pub parameters: Option<BTreeMap<String, String>>,
}

/// 日期以字串表示，例如 start = "2024-01-01"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub patient_id: Option<String>,
    pub exercise_name: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdherenceConfig {
    pub reference_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub view: ChartView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FIREBASE_AUTH})，找不到的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("report.name", &self.report.name)?;

        let prescriptions = validate_required_field("source.prescriptions", &self.source.prescriptions)?;
        validate_source("source.prescriptions", prescriptions)?;
        let sessions = validate_required_field("source.sessions", &self.source.sessions)?;
        validate_source("source.sessions", sessions)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        // 沒被替換的 ${VAR} 代表環境變數未設定
        for (key, value) in self.request_parameters().iter().chain(self.request_headers().iter()) {
            if value.starts_with("${") {
                return Err(EtlError::MissingConfigError {
                    field: format!("source: {} ({})", key, value),
                });
            }
        }

        if let Some(patient) = &self.filter.patient_id {
            validate_non_empty_string("filter.patient_id", patient)?;
        }

        validate_path("load.output_path", &self.load.output_path)?;
        validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(compression) = &self.load.compression {
            if !compression.filename.ends_with(".zip") {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.compression.filename".to_string(),
                    value: compression.filename.clone(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn prescriptions_source(&self) -> &str {
        self.source.prescriptions.as_deref().unwrap_or_default()
    }

    fn sessions_source(&self) -> &str {
        self.source.sessions.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn patient_filter(&self) -> Option<&str> {
        self.filter.patient_id.as_deref()
    }

    fn exercise_filter(&self) -> Option<&str> {
        self.filter.exercise_name.as_deref()
    }

    fn requested_start(&self) -> Option<NaiveDate> {
        self.filter.start
    }

    fn requested_end(&self) -> Option<NaiveDate> {
        self.filter.end
    }

    fn reference_date(&self) -> Option<NaiveDate> {
        self.adherence.reference_date
    }

    fn chart_view(&self) -> ChartView {
        self.chart.view
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .map(|c| c.filename.as_str())
            .unwrap_or("therapy_report.zip")
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        pairs(self.source.headers.as_ref())
    }

    fn request_parameters(&self) -> Vec<(String, String)> {
        pairs(self.source.parameters.as_ref())
    }
}

fn pairs(map: Option<&BTreeMap<String, String>>) -> Vec<(String, String)> {
    map.map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
