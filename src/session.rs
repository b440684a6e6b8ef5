// src/session.rs

use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use serde_json::Value;

use crate::classifier::ThresholdClassifier;
use crate::config::MapConfig;
use crate::error::MapError;
use crate::event::MapEvent;
use crate::geopoint::GeoPoint;
use crate::record::Record;
use crate::source::RecordSource;
use crate::types::TimeSlot;
use crate::viewport::{filter_visible, resolve_click};

const DEFAULT_INTENSITY_LABEL: &str = "Noise";

/// A marker ready to hand to the map widget.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub position: GeoPoint,
    pub color: String,
    pub popup: String,
}

/// What the dashboard draws for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<'a> {
    /// Records inside the viewport, in collection order.
    pub visible: Vec<&'a Record>,
    pub markers: Vec<Marker>,
    /// The record under the last click, shown in the detail panel.
    pub selected: Option<&'a Record>,
}

/// Session-scoped state: the record collection fetched once at start, plus
/// everything needed to answer map events. Read-only after construction.
#[derive(Debug, Clone)]
pub struct MapSession {
    records: Vec<Record>,
    classifier: ThresholdClassifier,
    click_tolerance: f64,
    center: GeoPoint,
    zoom: u8,
    intensity_label: String,
    started_at: DateTime<FixedOffset>,
}

impl MapSession {
    /// Validates `config`, builds the classifier and fetches the records once.
    ///
    /// Any failure aborts the session; nothing is kept from a partial fetch.
    pub async fn start<S: RecordSource>(source: &S, config: &MapConfig) -> Result<Self, MapError> {
        let classifier = config.validated_classifier()?;
        let records = source.fetch_all().await?;
        Ok(Self::assemble(records, config, classifier))
    }

    /// Builds a session around an already fetched collection.
    pub fn with_records(records: Vec<Record>, config: &MapConfig) -> Result<Self, MapError> {
        let classifier = config.validated_classifier()?;
        Ok(Self::assemble(records, config, classifier))
    }

    fn assemble(records: Vec<Record>, config: &MapConfig, classifier: ThresholdClassifier) -> Self {
        let intensity_label = config
            .param::<String>("intensityLabel")
            .unwrap_or_else(|| DEFAULT_INTENSITY_LABEL.to_string());

        log::info!(
            "Map session started with {} records, {} color categories",
            records.len(),
            classifier.labels().len()
        );

        MapSession {
            records,
            classifier,
            click_tolerance: config.click_tolerance,
            center: config.center,
            zoom: config.zoom,
            intensity_label,
            started_at: DateTime::<FixedOffset>::from(Local::now()),
        }
    }

    /// Pins the session clock, e.g. to replay a dashboard state.
    pub fn with_started_at(mut self, started_at: DateTime<FixedOffset>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn classifier(&self) -> &ThresholdClassifier {
        &self.classifier
    }

    pub fn click_tolerance(&self) -> f64 {
        self.click_tolerance
    }

    /// Initial map center and zoom.
    pub fn initial_view(&self) -> (GeoPoint, u8) {
        (self.center, self.zoom)
    }

    pub fn started_at(&self) -> DateTime<FixedOffset> {
        self.started_at
    }

    /// The day/hour preselected on the dashboard: the session start, truncated to the hour.
    pub fn default_time_slot(&self) -> TimeSlot {
        TimeSlot::from_datetime(&self.started_at)
    }

    pub fn marker_for(&self, record: &Record) -> Marker {
        Marker {
            id: record.id.clone(),
            position: record.location,
            color: self.classifier.classify(record.intensity).to_string(),
            popup: format!(
                "{}: {} {}",
                record.name, self.intensity_label, record.intensity
            ),
        }
    }

    /// Markers for the whole collection.
    pub fn markers(&self) -> Vec<Marker> {
        self.records.iter().map(|r| self.marker_for(r)).collect()
    }

    /// Computes the frame for one event. Without a viewport every record is visible.
    pub fn handle_event(&self, event: &MapEvent) -> RenderFrame<'_> {
        let visible: Vec<&Record> = match &event.viewport {
            Some(bounds) => filter_visible(&self.records, bounds),
            None => self.records.iter().collect(),
        };
        let selected = event
            .clicked
            .and_then(|clicked| resolve_click(&self.records, clicked, self.click_tolerance));
        if let (Some(clicked), None) = (event.clicked, selected) {
            log::debug!("Click at {:?} matched no record", clicked);
        }
        let markers = visible.iter().map(|r| self.marker_for(r)).collect();
        RenderFrame {
            visible,
            markers,
            selected,
        }
    }

    /// Decodes a raw widget payload leniently and computes its frame.
    pub fn handle_raw_event(&self, payload: &Value) -> RenderFrame<'_> {
        self.handle_event(&MapEvent::from_value_lenient(payload))
    }
}
