use crate::adapters::firebase::{decode_prescriptions, decode_sessions};
use crate::adapters::source::{RequestOptions, SnapshotSource};
use crate::core::adherence::adherence_on;
use crate::core::aggregation::{aggregate, group_by_exercise, normalize_exercise_name, ExerciseKey};
use crate::core::calendar::{calendar_events, CalendarEvent};
use crate::core::presentation::{export_csv, file_stem, ChartSeries, EntryNames};
use crate::core::range_filter::filter;
use crate::core::reminders::due_reminders;
use crate::core::schedule_check::{check_schedule, ScheduleCheck};
use crate::core::{ConfigProvider, Pipeline, Snapshot, Storage, TransformResult};
use crate::domain::model::{AggregatedSessionPoint, Prescription};
use crate::domain::report::{AdherenceRow, ExerciseReport};
use crate::utils::error::{DataError, EtlError, Result};
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Seek, Write};
use zip::write::{FileOptions, ZipWriter};

/// 讀取處方與訓練紀錄快照，產出遵從度、圖表與提醒報表
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    fn request_options(&self) -> RequestOptions {
        RequestOptions {
            timeout: self.config.request_timeout(),
            headers: self.config.request_headers(),
            parameters: self.config.request_parameters(),
        }
    }

    /// 沒指定時用今天（UTC）
    fn reference_date(&self) -> NaiveDate {
        self.config
            .reference_date()
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    fn build_exercise_report(
        &self,
        key: ExerciseKey,
        points: Vec<AggregatedSessionPoint>,
        reference_date: NaiveDate,
    ) -> Result<ExerciseReport> {
        // 未指定區間時用整段資料範圍
        let window_start = self
            .config
            .requested_start()
            .or_else(|| points.first().map(|p| p.timestamp.date_naive()))
            .unwrap_or(reference_date);
        let window_end = self
            .config
            .requested_end()
            .or_else(|| points.last().map(|p| p.timestamp.date_naive()))
            .unwrap_or(reference_date);

        let outcome = filter(&points, window_start, window_end);
        for notice in &outcome.notifications {
            tracing::warn!(
                "⚠️ {} / {}: {}",
                key.patient_id,
                key.exercise_name,
                notice
            );
        }

        let chart = ChartSeries::build(&outcome.filtered, self.config.chart_view());
        let csv = match export_csv(&outcome.filtered) {
            Ok(csv) => Some(csv),
            Err(EtlError::EmptyRange) => {
                tracing::warn!(
                    "⚠️ No CSV for {} / {}: {}",
                    key.patient_id,
                    key.exercise_name,
                    EtlError::EmptyRange
                );
                None
            }
            Err(e) => return Err(e),
        };

        Ok(ExerciseReport {
            key,
            window_start,
            window_end,
            notifications: outcome.notifications,
            points: outcome.filtered,
            chart,
            csv,
        })
    }
}

fn matches_exercise(filter: Option<&str>, exercise_name: &str) -> bool {
    filter.map_or(true, |wanted| {
        normalize_exercise_name(wanted).eq_ignore_ascii_case(&normalize_exercise_name(exercise_name))
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Snapshot> {
        let options = self.request_options();
        let prescriptions_source = SnapshotSource::parse(self.config.prescriptions_source())?;
        let sessions_source = SnapshotSource::parse(self.config.sessions_source())?;

        // 兩份快照同時抓
        let (prescriptions_raw, sessions_raw) = tokio::try_join!(
            prescriptions_source.fetch(&self.client, &options),
            sessions_source.fetch(&self.client, &options)
        )?;

        let prescriptions = decode_prescriptions(prescriptions_raw)?;
        let sessions = decode_sessions(sessions_raw)?;

        let mut rejected = prescriptions.rejected;
        rejected.extend(sessions.rejected);

        // 病患篩選在這裡做；動作篩選留到 transform，提醒判斷需要病患的全部紀錄
        let patient = self.config.patient_filter();
        let keep = |patient_id: &str| patient.map_or(true, |p| p == patient_id);

        let snapshot = Snapshot {
            prescriptions: prescriptions
                .records
                .into_iter()
                .filter(|p| keep(&p.patient_id))
                .collect(),
            sessions: sessions
                .records
                .into_iter()
                .filter(|s| keep(&s.patient_id))
                .collect(),
            rejected,
        };

        tracing::debug!(
            "Snapshot: {} prescription(s), {} session(s)",
            snapshot.prescriptions.len(),
            snapshot.sessions.len()
        );
        Ok(snapshot)
    }

    async fn transform(&self, snapshot: Snapshot) -> Result<TransformResult> {
        let reference_date = self.reference_date();
        let exercise_filter = self.config.exercise_filter();
        let Snapshot {
            prescriptions,
            sessions,
            mut rejected,
        } = snapshot;

        let mut adherence = Vec::new();
        let mut schedule_checks = Vec::new();
        let mut active: Vec<Prescription> = Vec::new();

        for (position, prescription) in prescriptions.into_iter().enumerate() {
            if !matches_exercise(exercise_filter, &prescription.exercise_name) {
                continue;
            }

            let check = match check_schedule(&prescription) {
                Ok(check) => check,
                Err(e) => {
                    let label = prescription
                        .key
                        .clone()
                        .unwrap_or_else(|| format!("#{}", position));
                    tracing::warn!("⚠️ Rejected prescription {}: {}", label, e);
                    rejected.push(DataError::new(label, e.to_string()));
                    continue;
                }
            };

            // 以重新展開的排程計算，已存的日期可能有多餘的一週
            let report = adherence_on(&check.expected, reference_date);
            adherence.push(AdherenceRow {
                key: prescription.key.clone().unwrap_or_default(),
                patient_id: prescription.patient_id.clone(),
                exercise_name: normalize_exercise_name(&prescription.exercise_name),
                start_date: prescription.start_date,
                end_date: prescription.end_date,
                scheduled: report.total,
                completed: report.completed,
                percent_complete: report.percent_complete,
            });
            schedule_checks.push(check);
            active.push(prescription);
        }

        let mut exercises = Vec::new();
        for (key, records) in group_by_exercise(&sessions) {
            if !matches_exercise(exercise_filter, &key.exercise_name) {
                continue;
            }
            let outcome = aggregate(&records);
            rejected.extend(outcome.rejected);
            exercises.push(self.build_exercise_report(key, outcome.points, reference_date)?);
        }

        let reminders = due_reminders(&active, &sessions, reference_date);

        let patients: BTreeSet<&str> = active.iter().map(|p| p.patient_id.as_str()).collect();
        let calendar: BTreeMap<String, Vec<CalendarEvent>> = patients
            .into_iter()
            .map(|patient_id| (patient_id.to_string(), calendar_events(&active, patient_id)))
            .collect();

        Ok(TransformResult {
            reference_date,
            adherence,
            exercises,
            schedule_checks,
            calendar,
            reminders,
            rejected,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        let zip_data = build_archive(
            &result,
            self.config.wants_format("csv"),
            self.config.wants_format("json"),
        )?;

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleDocument<'a> {
    reference_date: NaiveDate,
    checks: &'a [ScheduleCheck],
    calendar: &'a BTreeMap<String, Vec<CalendarEvent>>,
}

fn build_archive(result: &TransformResult, with_csv: bool, with_json: bool) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    if with_csv {
        zip.start_file::<_, ()>("adherence.csv", FileOptions::default())?;
        zip.write_all(adherence_csv(&result.adherence)?.as_bytes())?;

        let mut names = EntryNames::default();
        for report in &result.exercises {
            if let Some(csv) = &report.csv {
                let stem = file_stem(&report.key.patient_id, &report.key.exercise_name);
                let name = format!("sessions/{}", names.claim(&stem, "csv"));
                zip.start_file::<_, ()>(name, FileOptions::default())?;
                zip.write_all(csv.as_bytes())?;
            }
        }
    }

    if with_json {
        write_json(&mut zip, "charts.json", &result.exercises)?;
        write_json(
            &mut zip,
            "schedule.json",
            &ScheduleDocument {
                reference_date: result.reference_date,
                checks: &result.schedule_checks,
                calendar: &result.calendar,
            },
        )?;
        write_json(&mut zip, "reminders.json", &result.reminders)?;
    }

    // 被拒絕的紀錄不論格式都要留下
    if !result.rejected.is_empty() {
        write_json(&mut zip, "rejected.json", &result.rejected)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn write_json<W, T>(zip: &mut ZipWriter<W>, name: &str, value: &T) -> Result<()>
where
    W: Write + Seek,
    T: Serialize + ?Sized,
{
    zip.start_file::<_, ()>(name, FileOptions::default())?;
    let json_data = serde_json::to_string_pretty(value)?;
    zip.write_all(json_data.as_bytes())?;
    Ok(())
}

fn adherence_csv(rows: &[AdherenceRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presentation::ChartView;
    use crate::domain::model::{DayOfWeek, ExerciseSet, Rep, SessionRecord, StoredInstant};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        prescriptions: String,
        sessions: String,
        output_path: String,
        patient: Option<String>,
        exercise: Option<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        formats: Vec<String>,
    }

    impl MockConfig {
        fn new(prescriptions: String, sessions: String) -> Self {
            Self {
                prescriptions,
                sessions,
                output_path: "test_output".to_string(),
                patient: None,
                exercise: None,
                start: None,
                end: None,
                formats: vec!["csv".to_string(), "json".to_string()],
            }
        }
    }

    impl ConfigProvider for MockConfig {
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
            Some(date(1, 10))
        }

        fn chart_view(&self) -> ChartView {
            ChartView::All
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn prescription(key: &str, patient: &str, exercise: &str) -> Prescription {
        Prescription {
            key: Some(key.to_string()),
            patient_id: patient.to_string(),
            therapist_id: "t1".to_string(),
            patient_name: None,
            email: Some(format!("{}@example.com", patient)),
            exercise_name: exercise.to_string(),
            sets: 3,
            reps: 10,
            hold_time_seconds: 5,
            start_date: date(1, 1),
            end_date: date(1, 14),
            weekdays: [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]
                .into_iter()
                .collect(),
            scheduled_dates: vec![date(1, 1), date(1, 3), date(1, 5), date(1, 8), date(1, 10), date(1, 12)],
        }
    }

    fn session(key: &str, patient: &str, exercise: &str, seconds: i64, left: f64) -> SessionRecord {
        SessionRecord {
            key: Some(key.to_string()),
            patient_id: patient.to_string(),
            exercise_name: exercise.to_string(),
            timestamp: Some(StoredInstant {
                seconds: Some(seconds),
                nanoseconds: Some(0),
            }),
            sets: vec![ExerciseSet {
                reps: vec![Rep {
                    success_rate_left: Some(left),
                    success_rate_right: None,
                }],
            }],
        }
    }

    // 2024-01-03 10:00 UTC 與 2024-01-08 10:00 UTC
    const JAN_3: i64 = 1_704_276_000;
    const JAN_8: i64 = 1_704_708_000;

    fn pipeline(config: MockConfig) -> ReportPipeline<MockStorage, MockConfig> {
        ReportPipeline::new(MockStorage::new(), config)
    }

    #[tokio::test]
    async fn test_extract_fetches_both_snapshots() {
        let server = MockServer::start();
        let prescriptions_mock = server.mock(|when, then| {
            when.method(GET).path("/prescriptions.json");
            then.status(200).json_body(serde_json::json!({
                "-Rx1": {
                    "patientId": "p1", "exerciseName": "Squat", "sets": 3, "reps": 10,
                    "startDate": "2024-01-01", "endDate": "2024-01-14",
                    "daysOfWeek": ["Every Monday"], "dates": ["2024-01-01", "2024-01-08"]
                },
                "-Rx2": {
                    "patientId": "p2", "exerciseName": "Bridge", "sets": 3, "reps": 10,
                    "startDate": "2024-01-01", "endDate": "2024-01-14"
                }
            }));
        });
        let sessions_mock = server.mock(|when, then| {
            when.method(GET).path("/exercises.json");
            then.status(200).json_body(serde_json::json!({
                "-S1": {"userID": "p1", "exerciseName": "Squat",
                        "timestamp": {"seconds": JAN_3, "nanoseconds": 0}, "sets": []},
                "-S2": {"userID": "p1"}
            }));
        });

        let mut config = MockConfig::new(
            server.url("/prescriptions.json"),
            server.url("/exercises.json"),
        );
        config.patient = Some("p1".to_string());

        let snapshot = pipeline(config).extract().await.unwrap();

        prescriptions_mock.assert();
        sessions_mock.assert();
        assert_eq!(snapshot.prescriptions.len(), 1);
        assert_eq!(snapshot.prescriptions[0].key.as_deref(), Some("-Rx1"));
        assert_eq!(snapshot.sessions.len(), 1);
        assert_eq!(snapshot.rejected.len(), 1);
        assert_eq!(snapshot.rejected[0].record, "-S2");
    }

    #[tokio::test]
    async fn test_extract_fails_on_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/prescriptions.json");
            then.status(500);
        });
        server.mock(|when, then| {
            when.method(GET).path("/exercises.json");
            then.status(200).json_body(serde_json::json!({}));
        });

        let config = MockConfig::new(
            server.url("/prescriptions.json"),
            server.url("/exercises.json"),
        );
        let err = pipeline(config).extract().await.unwrap_err();
        assert!(matches!(err, EtlError::HttpStatusError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_transform_builds_adherence_and_charts() {
        let snapshot = Snapshot {
            prescriptions: vec![prescription("-Rx1", "p1", "Squat"), prescription("-Rx2", "p2", "Bridge")],
            sessions: vec![
                session("-S2", "p1", "\"Squat\"", JAN_8, 0.5),
                session("-S1", "p1", "Squat", JAN_3, 0.9),
            ],
            rejected: Vec::new(),
        };

        let config = MockConfig::new(String::new(), String::new());
        let result = pipeline(config).transform(snapshot).await.unwrap();

        assert_eq!(result.reference_date, date(1, 10));
        assert_eq!(result.adherence.len(), 2);
        assert_eq!(result.adherence[0].completed, 4);
        assert_eq!(result.adherence[0].scheduled, 6);
        assert_eq!(result.adherence[0].percent_complete, 67);

        assert_eq!(result.exercises.len(), 1);
        let report = &result.exercises[0];
        assert_eq!(report.key.exercise_name, "Squat");
        assert_eq!(report.window_start, date(1, 3));
        assert_eq!(report.window_end, date(1, 8));
        assert!(report.notifications.is_empty());
        assert_eq!(report.points[0].sequence_index, 1);
        assert_eq!(report.points[0].avg_success_rate_left, Some(0.9));
        assert!(report.csv.is_some());

        // p1 在排程日有練習，p2 沒有
        assert_eq!(result.reminders.len(), 1);
        assert_eq!(result.reminders[0].patient_id, "p2");
        assert_eq!(result.calendar["p1"].len(), 6);
    }

    #[tokio::test]
    async fn test_transform_window_outside_data_keeps_notices() {
        let snapshot = Snapshot {
            prescriptions: Vec::new(),
            sessions: vec![session("-S1", "p1", "Squat", JAN_3, 0.9)],
            rejected: Vec::new(),
        };

        let mut config = MockConfig::new(String::new(), String::new());
        config.start = Some(date(1, 5));
        config.end = Some(date(1, 20));

        let result = pipeline(config).transform(snapshot).await.unwrap();
        let report = &result.exercises[0];
        assert!(report.points.is_empty());
        assert!(report.csv.is_none());
        assert_eq!(
            report.notifications.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
            vec!["No exercise data after 2024-01-03".to_string()]
        );
    }

    #[tokio::test]
    async fn test_transform_rejects_invalid_prescription_window() {
        let mut broken = prescription("-Rx9", "p1", "Squat");
        broken.start_date = date(2, 1);

        let snapshot = Snapshot {
            prescriptions: vec![broken],
            sessions: Vec::new(),
            rejected: Vec::new(),
        };

        let config = MockConfig::new(String::new(), String::new());
        let result = pipeline(config).transform(snapshot).await.unwrap();
        assert!(result.adherence.is_empty());
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].record, "-Rx9");
    }

    #[tokio::test]
    async fn test_transform_exercise_filter() {
        let snapshot = Snapshot {
            prescriptions: vec![prescription("-Rx1", "p1", "Squat"), prescription("-Rx2", "p1", "Bridge")],
            sessions: vec![
                session("-S1", "p1", "Squat", JAN_3, 0.9),
                session("-S2", "p1", "Bridge", JAN_8, 0.4),
            ],
            rejected: Vec::new(),
        };

        let mut config = MockConfig::new(String::new(), String::new());
        config.exercise = Some("bridge".to_string());

        let result = pipeline(config).transform(snapshot).await.unwrap();
        assert_eq!(result.adherence.len(), 1);
        assert_eq!(result.adherence[0].exercise_name, "Bridge");
        assert_eq!(result.exercises.len(), 1);
        assert_eq!(result.exercises[0].key.exercise_name, "Bridge");
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let snapshot = Snapshot {
            prescriptions: vec![prescription("-Rx1", "p1", "Squat")],
            sessions: vec![session("-S1", "p1", "Squat", JAN_3, 0.9)],
            rejected: vec![DataError::new("-S9", "timestamp is missing")],
        };

        let storage = MockStorage::new();
        let config = MockConfig::new(String::new(), String::new());
        let pipeline = ReportPipeline::new(storage.clone(), config);

        let result = pipeline.transform(snapshot).await.unwrap();
        let output = pipeline.load(result).await.unwrap();
        assert_eq!(output, "test_output/therapy_report.zip");

        let zip_data = storage.get_file("therapy_report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(zip_data)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "adherence.csv",
                "charts.json",
                "rejected.json",
                "reminders.json",
                "schedule.json",
                "sessions/p1__Squat.csv",
            ]
        );

        let mut csv = String::new();
        archive
            .by_name("sessions/p1__Squat.csv")
            .unwrap()
            .read_to_string(&mut csv)
            .unwrap();
        assert!(csv.starts_with("Date,LeftSuccessRate,RightSuccessRate,AverageSuccessRate"));
    }

    #[tokio::test]
    async fn test_transform_labels_array_rejects_by_snapshot_index() {
        let stored = serde_json::json!([
            null,
            {"userID": "p1", "exerciseName": "Squat",
             "timestamp": {"seconds": JAN_3, "nanoseconds": 0}, "sets": []},
            {"userID": "p1", "exerciseName": "Bridge", "sets": []},
            {"userID": "p1", "exerciseName": "Squat", "sets": []}
        ]);
        let sessions = decode_sessions(stored).unwrap();
        let snapshot = Snapshot {
            prescriptions: Vec::new(),
            sessions: sessions.records,
            rejected: sessions.rejected,
        };

        let config = MockConfig::new(String::new(), String::new());
        let result = pipeline(config).transform(snapshot).await.unwrap();

        let labels: Vec<&str> = result.rejected.iter().map(|r| r.record.as_str()).collect();
        assert_eq!(labels, vec!["2", "3"]);
        assert_eq!(result.exercises.len(), 2);
    }

    #[tokio::test]
    async fn test_load_keeps_sessions_with_colliding_file_names() {
        let snapshot = Snapshot {
            prescriptions: Vec::new(),
            sessions: vec![
                session("-S1", "p1", "深蹲", JAN_3, 0.9),
                session("-S2", "p1", "弓步", JAN_3, 0.8),
                session("-S3", "p1", "Heel Raise", JAN_3, 0.7),
                session("-S4", "p1", "Heel.Raise", JAN_8, 0.6),
            ],
            rejected: Vec::new(),
        };

        let storage = MockStorage::new();
        let config = MockConfig::new(String::new(), String::new());
        let pipeline = ReportPipeline::new(storage.clone(), config);

        let result = pipeline.transform(snapshot).await.unwrap();
        assert_eq!(result.exercises.len(), 4);
        pipeline.load(result).await.unwrap();

        let zip_data = storage.get_file("therapy_report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(zip_data)).unwrap();
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|n| n.starts_with("sessions/"))
            .map(|n| n.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "sessions/p1__Heel_Raise.csv",
                "sessions/p1__Heel_Raise__2.csv",
                "sessions/p1__弓步.csv",
                "sessions/p1__深蹲.csv",
            ]
        );

        // "Heel Raise" 排在 "Heel.Raise" 前面，拿到不帶後綴的檔名
        let mut csv = String::new();
        archive
            .by_name("sessions/p1__Heel_Raise__2.csv")
            .unwrap()
            .read_to_string(&mut csv)
            .unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("2024-01-08,0.6"));
    }

    #[tokio::test]
    async fn test_load_csv_only_skips_json() {
        let snapshot = Snapshot {
            prescriptions: vec![prescription("-Rx1", "p1", "Squat")],
            sessions: Vec::new(),
            rejected: Vec::new(),
        };

        let storage = MockStorage::new();
        let mut config = MockConfig::new(String::new(), String::new());
        config.formats = vec!["csv".to_string()];
        let pipeline = ReportPipeline::new(storage.clone(), config);

        let result = pipeline.transform(snapshot).await.unwrap();
        pipeline.load(result).await.unwrap();

        let zip_data = storage.get_file("therapy_report.zip").await.unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names, vec!["adherence.csv"]);
    }
}
