use crate::core::presentation::ChartView;
use crate::domain::report::{Snapshot, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// 處方快照來源：http(s) URL 或本機檔案
    fn prescriptions_source(&self) -> &str;
    /// 訓練紀錄快照來源：http(s) URL 或本機檔案
    fn sessions_source(&self) -> &str;
    fn output_path(&self) -> &str;
    fn patient_filter(&self) -> Option<&str>;
    fn exercise_filter(&self) -> Option<&str>;
    fn requested_start(&self) -> Option<NaiveDate>;
    fn requested_end(&self) -> Option<NaiveDate>;
    fn reference_date(&self) -> Option<NaiveDate>;
    fn chart_view(&self) -> ChartView;
    fn output_formats(&self) -> &[String];

    fn archive_name(&self) -> &str {
        "therapy_report.zip"
    }

    fn request_timeout(&self) -> Option<Duration> {
        None
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn request_parameters(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn wants_format(&self, format: &str) -> bool {
        self.output_formats().iter().any(|f| f == format)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Snapshot>;
    async fn transform(&self, snapshot: Snapshot) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
