//! Chart series and CSV rows built from filtered session points.

use crate::domain::model::AggregatedSessionPoint;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

pub const CSV_HEADER: [&str; 4] = [
    "Date",
    "LeftSuccessRate",
    "RightSuccessRate",
    "AverageSuccessRate",
];

/// 圖表顯示哪幾條線；只切換 hidden，不重新計算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartView {
    #[default]
    All,
    LeftAndRight,
    Average,
}

impl FromStr for ChartView {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ChartView::All),
            "left-and-right" | "left & right" | "left-right" => Ok(ChartView::LeftAndRight),
            "average" => Ok(ChartView::Average),
            other => Err(EtlError::InvalidConfigValueError {
                field: "chart_view".to_string(),
                value: other.to_string(),
                reason: "Expected one of: all, left-and-right, average".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<Option<f64>>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<DateTime<Utc>>,
    pub left: Dataset,
    pub right: Dataset,
    pub average: Dataset,
}

impl ChartSeries {
    pub fn build(points: &[AggregatedSessionPoint], view: ChartView) -> Self {
        let sides_hidden = view == ChartView::Average;

        Self {
            labels: points.iter().map(|p| p.timestamp).collect(),
            left: Dataset {
                label: "Left Success Rate",
                data: points.iter().map(|p| p.avg_success_rate_left).collect(),
                hidden: sides_hidden,
            },
            right: Dataset {
                label: "Right Success Rate",
                data: points.iter().map(|p| p.avg_success_rate_right).collect(),
                hidden: sides_hidden,
            },
            average: Dataset {
                label: "Average Success Rate",
                data: points.iter().map(average_success_rate).collect(),
                hidden: view == ChartView::LeftAndRight,
            },
        }
    }

    /// 換檢視只改 hidden 旗標
    pub fn with_view(mut self, view: ChartView) -> Self {
        self.left.hidden = view == ChartView::Average;
        self.right.hidden = view == ChartView::Average;
        self.average.hidden = view == ChartView::LeftAndRight;
        self
    }
}

/// 左右兩側有量到的平均；兩側都沒有時為 None
pub fn average_success_rate(point: &AggregatedSessionPoint) -> Option<f64> {
    match (point.avg_success_rate_left, point.avg_success_rate_right) {
        (Some(l), Some(r)) => Some((l + r) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "LeftSuccessRate")]
    pub left: Option<f64>,
    #[serde(rename = "RightSuccessRate")]
    pub right: Option<f64>,
    #[serde(rename = "AverageSuccessRate")]
    pub average: Option<f64>,
}

impl From<&AggregatedSessionPoint> for CsvRow {
    fn from(point: &AggregatedSessionPoint) -> Self {
        Self {
            date: point.timestamp.format("%Y-%m-%d").to_string(),
            left: point.avg_success_rate_left,
            right: point.avg_success_rate_right,
            average: average_success_rate(point),
        }
    }
}

pub fn csv_rows(points: &[AggregatedSessionPoint]) -> Vec<CsvRow> {
    points.iter().map(CsvRow::from).collect()
}

/// 篩選後沒有資料時回傳 `EtlError::EmptyRange`
pub fn export_csv(points: &[AggregatedSessionPoint]) -> Result<String> {
    if points.is_empty() {
        return Err(EtlError::EmptyRange);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in csv_rows(points) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| EtlError::ProcessingError {
            message: format!("Failed to flush CSV writer: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// 檔名用的安全字串
pub fn file_stem(patient_id: &str, exercise_name: &str) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    };
    format!("{}__{}", clean(patient_id), clean(exercise_name))
}

/// 同一個壓縮檔內的檔名不可重複，撞名時加上 `__2`、`__3`
#[derive(Debug, Default)]
pub struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    pub fn claim(&mut self, stem: &str, extension: &str) -> String {
        let mut name = format!("{}.{}", stem, extension);
        let mut suffix = 2;
        while self.used.contains(&name) {
            name = format!("{}__{}.{}", stem, suffix, extension);
            suffix += 1;
        }
        self.used.insert(name.clone());
        name
    }
}
