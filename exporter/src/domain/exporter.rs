//! View exporter
//!
//! Translates a view snapshot into one batch and writes it to the sink.
//! Export calls never fail towards the caller: every error goes to the
//! installed [`ErrorHandler`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::ExportError;
use super::handler::{ErrorHandler, TracingErrorHandler};
use super::translate::{aggregation_fields, merge_tags, point_name};
use crate::core::{ExporterConfig, NamingPolicy};
use crate::data::{BatchConfig, BatchPoints, Point, PointSink, Precision, ViewSnapshot};

/// Entry point used by the reporting scheduler, once per view per interval
#[async_trait]
pub trait ViewExporter: Send + Sync {
    async fn export_view(&self, snapshot: &ViewSnapshot);
}

/// Exports view snapshots to an InfluxDB-style sink
///
/// Holds only immutable configuration; concurrent exports are as safe as the
/// sink they share.
pub struct InfluxExporter {
    sink: Arc<dyn PointSink>,
    database: String,
    error_handler: Arc<dyn ErrorHandler>,
    static_tags: Option<BTreeMap<String, String>>,
    naming: NamingPolicy,
}

impl InfluxExporter {
    pub fn new(
        sink: Arc<dyn PointSink>,
        database: impl Into<String>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        Self {
            sink,
            database: database.into(),
            error_handler,
            static_tags: None,
            naming: NamingPolicy::default(),
        }
    }

    /// Exporter that logs errors through `tracing`
    pub fn with_tracing(sink: Arc<dyn PointSink>, database: impl Into<String>) -> Self {
        Self::new(sink, database, Arc::new(TracingErrorHandler))
    }

    pub fn from_config(
        config: &ExporterConfig,
        sink: Arc<dyn PointSink>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        let mut exporter = Self::new(sink, config.database.clone(), error_handler)
            .with_naming(config.naming);
        if let Some(tags) = &config.static_tags {
            exporter = exporter.with_static_tags(tags.clone());
        }
        exporter
    }

    /// Tags added to every point; row tags take precedence on collision
    pub fn with_static_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.static_tags = (!tags.is_empty()).then_some(tags);
        self
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn naming(&self) -> NamingPolicy {
        self.naming
    }

    pub fn static_tags(&self) -> Option<&BTreeMap<String, String>> {
        self.static_tags.as_ref()
    }

    fn report(&self, error: ExportError) {
        self.error_handler.handle(error);
    }

    /// Build the batch for a snapshot.
    ///
    /// Returns `None` when the export must be abandoned; the cause has already
    /// been reported. Rows whose point cannot be built are reported and skipped.
    fn build_batch(&self, snapshot: &ViewSnapshot) -> Option<BatchPoints> {
        let mut batch = match BatchPoints::new(BatchConfig {
            database: self.database.clone(),
            precision: Precision::Seconds,
        }) {
            Ok(batch) => batch,
            Err(e) => {
                self.report(e.into());
                return None;
            }
        };

        for row in &snapshot.rows {
            let fields = match aggregation_fields(&row.data) {
                Ok(fields) => fields,
                Err(e) => {
                    self.report(e);
                    return None;
                }
            };

            let name = point_name(self.naming, &snapshot.view_name, &row.data);
            let tags = merge_tags(self.static_tags.as_ref(), &row.tags);

            match Point::new(name, tags, fields, snapshot.end) {
                Ok(point) => batch.add_point(point),
                Err(e) => {
                    tracing::debug!(
                        view = %snapshot.view_name,
                        error = %e,
                        "Skipping row with invalid point"
                    );
                    self.report(ExportError::invalid_point(&snapshot.view_name, e));
                }
            }
        }

        Some(batch)
    }
}

#[async_trait]
impl ViewExporter for InfluxExporter {
    async fn export_view(&self, snapshot: &ViewSnapshot) {
        let Some(batch) = self.build_batch(snapshot) else {
            return;
        };

        match self.sink.write(&batch).await {
            Ok(()) => {
                tracing::debug!(
                    view = %snapshot.view_name,
                    points = batch.len(),
                    database = %self.database,
                    "Exported view"
                );
            }
            Err(e) => self.report(ExportError::write(&self.database, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        AggregationData, DistributionData, FieldValue, Fields, PointError, SinkError, Tag, Tags,
        ViewRow,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    /// Sink recording every batch it receives
    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<BatchPoints>>,
        fail_with: Option<u16>,
    }

    impl RecordingSink {
        fn failing(status: u16) -> Self {
            Self {
                fail_with: Some(status),
                ..Default::default()
            }
        }

        fn batches(&self) -> Vec<BatchPoints> {
            self.batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PointSink for RecordingSink {
        async fn write(&self, batch: &BatchPoints) -> Result<(), SinkError> {
            self.batches.lock().unwrap().push(batch.clone());
            match self.fail_with {
                Some(status) => Err(SinkError::status(status, "write failed")),
                None => Ok(()),
            }
        }
    }

    /// Handler collecting every reported error
    #[derive(Default)]
    struct CollectingHandler {
        errors: Mutex<Vec<ExportError>>,
    }

    impl CollectingHandler {
        fn messages(&self) -> Vec<String> {
            self.errors
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.to_string())
                .collect()
        }
    }

    impl ErrorHandler for CollectingHandler {
        fn handle(&self, error: ExportError) {
            self.errors.lock().unwrap().push(error);
        }
    }

    fn end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn snapshot(view: &str, rows: Vec<ViewRow>) -> ViewSnapshot {
        ViewSnapshot::new(view, rows, end())
    }

    fn setup(
        database: &str,
        sink: RecordingSink,
    ) -> (InfluxExporter, Arc<RecordingSink>, Arc<CollectingHandler>) {
        let sink = Arc::new(sink);
        let handler = Arc::new(CollectingHandler::default());
        let exporter = InfluxExporter::new(sink.clone(), database, handler.clone());
        (exporter, sink, handler)
    }

    fn count_row(host: &str, value: i64) -> ViewRow {
        ViewRow::new(
            vec![Tag::new("host", host)],
            AggregationData::Count { value },
        )
    }

    fn unrecognized_row() -> ViewRow {
        ViewRow::new(
            vec![],
            AggregationData::Unrecognized {
                kind: "exemplar".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_export_writes_one_point_per_row() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let rows = vec![
            count_row("a", 1),
            count_row("b", 2),
            ViewRow::new(vec![], AggregationData::Sum { value: 7.5 }),
        ];

        exporter.export_view(&snapshot("requests", rows)).await;

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[0].database(), "metrics");
        assert_eq!(batches[0].precision(), Precision::Seconds);
        assert!(handler.messages().is_empty());

        let hosts: Vec<Option<&String>> =
            batches[0].points().iter().map(|p| p.tags().get("host")).collect();
        assert_eq!(
            hosts,
            vec![Some(&"a".to_string()), Some(&"b".to_string()), None]
        );
        assert!(batches[0].points().iter().all(|p| p.timestamp() == end()));
    }

    #[tokio::test]
    async fn test_suffixed_count_point() {
        let (exporter, sink, _) = setup("metrics", RecordingSink::default());
        let exporter = exporter.with_naming(NamingPolicy::Suffixed);

        exporter
            .export_view(&snapshot("requests", vec![count_row("a", 42)]))
            .await;

        let batches = sink.batches();
        let point = &batches[0].points()[0];
        assert_eq!(point.name(), "requests.count");
        assert_eq!(
            point.fields(),
            &Fields::from([("value".to_string(), FieldValue::Float(42.0))])
        );
    }

    #[tokio::test]
    async fn test_plain_naming_keeps_view_name() {
        let (exporter, sink, _) = setup("metrics", RecordingSink::default());
        let rows = vec![ViewRow::new(
            vec![],
            AggregationData::Distribution(DistributionData {
                min: 1.0,
                max: 9.0,
                mean: 5.0,
                count: 3,
                ..Default::default()
            }),
        )];

        exporter.export_view(&snapshot("latency", rows)).await;

        let batches = sink.batches();
        let point = &batches[0].points()[0];
        assert_eq!(point.name(), "latency");
        assert_eq!(
            point.fields(),
            &Fields::from([
                ("min".to_string(), FieldValue::Float(1.0)),
                ("max".to_string(), FieldValue::Float(9.0)),
                ("mean".to_string(), FieldValue::Float(5.0)),
                ("count".to_string(), FieldValue::Integer(3)),
            ])
        );
    }

    #[tokio::test]
    async fn test_static_tags_overlaid_by_row_tags() {
        let (exporter, sink, _) = setup("metrics", RecordingSink::default());
        let exporter =
            exporter.with_static_tags(BTreeMap::from([("env".to_string(), "prod".to_string())]));
        let rows = vec![
            ViewRow::new(
                vec![Tag::new("env", "dev"), Tag::new("host", "a")],
                AggregationData::LastValue { value: 3.0 },
            ),
            count_row("b", 1),
        ];

        exporter.export_view(&snapshot("load", rows)).await;

        let batches = sink.batches();
        let points = batches[0].points();
        assert_eq!(
            points[0].tags(),
            &Tags::from([
                ("env".to_string(), "dev".to_string()),
                ("host".to_string(), "a".to_string()),
            ])
        );
        assert_eq!(
            points[1].tags(),
            &Tags::from([
                ("env".to_string(), "prod".to_string()),
                ("host".to_string(), "b".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_unknown_aggregation_aborts_without_write() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let rows = vec![count_row("a", 1), unrecognized_row(), count_row("b", 2)];

        exporter.export_view(&snapshot("requests", rows)).await;

        assert!(sink.batches().is_empty());
        assert_eq!(
            handler.messages(),
            vec!["unknown aggregation type: exemplar".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_aggregation_first_row() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());

        exporter
            .export_view(&snapshot("requests", vec![unrecognized_row(), count_row("a", 1)]))
            .await;

        assert!(sink.batches().is_empty());
        assert_eq!(handler.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_database_aborts() {
        let (exporter, sink, handler) = setup("", RecordingSink::default());
        // The unrecognized row would be reported too if rows were visited
        let rows = vec![count_row("a", 1), unrecognized_row()];

        exporter.export_view(&snapshot("requests", rows)).await;

        assert!(sink.batches().is_empty());
        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ExportError::InvalidBatch(_)));
    }

    #[tokio::test]
    async fn test_invalid_point_skipped() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let rows = vec![
            count_row("a", 1),
            ViewRow::new(vec![], AggregationData::LastValue { value: f64::NAN }),
            ViewRow::new(vec![Tag::new("", "x")], AggregationData::Sum { value: 1.0 }),
            count_row("b", 2),
        ];

        exporter.export_view(&snapshot("requests", rows)).await;

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);

        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, ExportError::InvalidPoint { view, .. } if view == "requests"))
        );
    }

    #[tokio::test]
    async fn test_oversized_series_key_skipped() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let rows = vec![
            count_row("a", 1),
            count_row(&"h".repeat(70_000), 5),
            count_row("b", 2),
        ];

        exporter.export_view(&snapshot("requests", rows)).await;

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        let hosts: Vec<&str> = batches[0]
            .points()
            .iter()
            .map(|p| p.tags()["host"].as_str())
            .collect();
        assert_eq!(hosts, vec!["a", "b"]);

        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ExportError::InvalidPoint { source: PointError::KeyTooLong { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn test_trailing_backslash_tag_skipped() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let rows = vec![count_row("a", 1), count_row("b\\", 2), count_row("c", 3)];

        exporter.export_view(&snapshot("requests", rows)).await;

        let batches = sink.batches();
        assert_eq!(batches[0].len(), 2);
        // Every remaining line still parses as exactly one tag set
        let body = batches[0].to_line_protocol();
        assert_eq!(
            body,
            "requests,host=a value=1 1704067200\nrequests,host=c value=3 1704067200\n"
        );

        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ExportError::InvalidPoint { source: PointError::TrailingBackslash(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_timestamp_skips_every_row() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let end = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        let rows = vec![count_row("a", 1), count_row("b", 2)];

        exporter
            .export_view(&ViewSnapshot::new("requests", rows, end))
            .await;

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(
            e,
            ExportError::InvalidPoint { source: PointError::TimestampOutOfRange(_), .. }
        )));
    }

    #[tokio::test]
    async fn test_empty_view_name_skips_every_row() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());

        exporter
            .export_view(&snapshot("", vec![count_row("a", 1), count_row("b", 2)]))
            .await;

        // Batch is still written, empty
        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
        assert_eq!(handler.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_snapshot_writes_empty_batch() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());

        exporter.export_view(&snapshot("requests", vec![])).await;

        assert_eq!(sink.batches().len(), 1);
        assert!(handler.messages().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_reported() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::failing(503));

        exporter
            .export_view(&snapshot("requests", vec![count_row("a", 1)]))
            .await;

        assert_eq!(sink.batches().len(), 1);
        let errors = handler.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            ExportError::Write { database, source } => {
                assert_eq!(database, "metrics");
                assert!(source.is_transient());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_each_export_is_independent() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());

        exporter
            .export_view(&snapshot("requests", vec![unrecognized_row()]))
            .await;
        exporter
            .export_view(&snapshot("requests", vec![count_row("a", 1)]))
            .await;

        assert_eq!(sink.batches().len(), 1);
        assert_eq!(handler.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_exports_do_not_mix_rows() {
        let (exporter, sink, handler) = setup("metrics", RecordingSink::default());
        let exporter = Arc::new(exporter.with_naming(NamingPolicy::Suffixed));

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let exporter = exporter.clone();
                tokio::spawn(async move {
                    let view = format!("view{i}");
                    let rows = (0..10).map(|j| count_row(&format!("{i}-{j}"), j)).collect();
                    exporter.export_view(&snapshot(&view, rows)).await;
                })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let batches = sink.batches();
        assert_eq!(batches.len(), 16);
        assert!(handler.messages().is_empty());
        for batch in &batches {
            let view = batch.points()[0].name().trim_end_matches(".count").to_string();
            let i = view.trim_start_matches("view");
            for (j, point) in batch.points().iter().enumerate() {
                assert_eq!(point.name(), format!("{view}.count"));
                assert_eq!(point.tags()["host"], format!("{i}-{j}"));
                assert_eq!(point.fields()["value"], FieldValue::Float(j as f64));
            }
        }
    }

    #[test]
    fn test_from_config() {
        let config = ExporterConfig {
            database: "metrics".to_string(),
            naming: NamingPolicy::Suffixed,
            static_tags: Some(BTreeMap::from([("env".to_string(), "prod".to_string())])),
            ..Default::default()
        };
        let sink = Arc::new(RecordingSink::default());
        let exporter = InfluxExporter::from_config(&config, sink, Arc::new(TracingErrorHandler));

        assert_eq!(exporter.database(), "metrics");
        assert_eq!(exporter.naming(), NamingPolicy::Suffixed);
        assert_eq!(exporter.static_tags().unwrap()["env"], "prod");
    }

    #[test]
    fn test_empty_static_tags_ignored() {
        let exporter = InfluxExporter::with_tracing(Arc::new(RecordingSink::default()), "metrics")
            .with_static_tags(BTreeMap::new());
        assert!(exporter.static_tags().is_none());
    }
}
