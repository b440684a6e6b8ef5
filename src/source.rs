// src/source.rs

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::bounds::BoundingBox;
use crate::error::MapError;
use crate::geopoint::GeoPoint;
use crate::location::{first_present, LocationFields};
use crate::record::Record;

/// Produces the record collection for a session. Called once per session.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    async fn fetch_all(&self) -> Result<Vec<Record>, MapError>;
}

/// A fixed, already built collection.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        StaticSource { records }
    }
}

impl RecordSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<Record>, MapError> {
        Ok(self.records.clone())
    }
}

/// Sound intensity sample points around the center of Florence.
pub fn florence_intensity_samples() -> Vec<Record> {
    const SAMPLES: [(f64, f64, f64); 10] = [
        (43.7696, 11.2558, 100.0),
        (43.7623, 11.2658, 60.0),
        (43.7590, 11.2458, 30.0),
        (43.7600, 11.2550, 100.0),
        (43.7700, 11.2650, 60.0),
        (43.7599, 11.2650, 60.0),
        (43.7500, 11.2690, 30.0),
        (43.7640, 11.2350, 30.0),
        (43.7680, 11.2450, 100.0),
        (43.7800, 11.2350, 100.0),
    ];
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, &(latitude, longitude, intensity))| {
            Record::new(
                (i + 1).to_string(),
                format!("Sample {}", i + 1),
                GeoPoint {
                    latitude,
                    longitude,
                },
                intensity,
            )
        })
        .collect()
}

/// Reads a flat JSON array of records from disk.
///
/// Each entry needs an intensity (`intensity` or `noise`), a name (`name` or `rest`)
/// and a location given either as a nested `location` object or as top-level
/// coordinate keys (`latitude`/`longitude`, `lat`/`lng`, `lat`/`lon`,
/// `latitudine`/`longitudine`). A missing `id` becomes the 1-based position.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }

    /// Parses a JSON document in the file format.
    pub fn parse_records(json: &str) -> Result<Vec<Record>, MapError> {
        let entries: Vec<Value> = serde_json::from_str(json).map_err(|e| {
            MapError::JsonDeserializationFailed(format!("Expected a JSON array of records: {}", e))
        })?;
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                record_from_entry(i, entry).map_err(|e| {
                    MapError::JsonDeserializationFailed(format!("Record {}: {}", i, e))
                })
            })
            .collect()
    }
}

fn record_from_entry(index: usize, entry: &Value) -> Result<Record, String> {
    let id = match entry.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => (index + 1).to_string(),
    };
    let name = first_present(entry, &["name", "rest"])
        .and_then(Value::as_str)
        .ok_or_else(|| "missing string field 'name'".to_string())?
        .to_string();
    let intensity = first_present(entry, &["intensity", "noise"])
        .and_then(Value::as_f64)
        .ok_or_else(|| "missing numeric field 'intensity'".to_string())?;
    let description = entry
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let location = if let Some(nested) = entry.get("location") {
        LocationFields::resolve_value(nested)
    } else if let (Some(lat), Some(lon)) = (entry.get("latitudine"), entry.get("longitudine")) {
        LocationFields::resolve_value(&serde_json::json!({ "latitude": lat, "longitude": lon }))
    } else {
        LocationFields::resolve_value(entry)
    }
    .map_err(|e| e.to_string())?;

    Ok(Record::new(id, name, location, intensity).with_description(description))
}

impl RecordSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<Record>, MapError> {
        log::debug!("Reading records from {}", self.path.display());
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let records = Self::parse_records(&contents)?;
        log::info!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// Generates restaurants with random noise readings inside a box.
#[derive(Debug, Clone)]
pub struct RandomSource {
    count: usize,
    area: BoundingBox,
    seed: Option<u64>,
}

impl RandomSource {
    /// Noise readings are whole numbers in this range.
    pub const NOISE_RANGE: std::ops::RangeInclusive<i32> = 20..=100;

    /// `count` restaurants in central Florence.
    pub fn new(count: usize) -> Self {
        RandomSource {
            count,
            area: florence_area(),
            seed: None,
        }
    }

    pub fn with_area(mut self, area: BoundingBox) -> Self {
        self.area = area;
        self
    }

    /// Makes the output reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generate(&self) -> Result<Vec<Record>, MapError> {
        if self.area.is_inverted() {
            return Err(MapError::InvalidConfig(format!(
                "Cannot generate records inside an inverted area {:?}",
                self.area
            )));
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let sw = self.area.south_west;
        let ne = self.area.north_east;
        Ok((1..=self.count)
            .map(|i| {
                let location = GeoPoint {
                    latitude: rng.gen_range(sw.latitude..=ne.latitude),
                    longitude: rng.gen_range(sw.longitude..=ne.longitude),
                };
                let noise = rng.gen_range(Self::NOISE_RANGE);
                Record::new(i.to_string(), format!("Restaurant {}", i), location, noise as f64)
            })
            .collect())
    }
}

/// Central Florence, where the random restaurants are placed.
pub fn florence_area() -> BoundingBox {
    BoundingBox::new(
        GeoPoint {
            latitude: 43.7600,
            longitude: 11.2300,
        },
        GeoPoint {
            latitude: 43.7900,
            longitude: 11.2800,
        },
    )
}

impl RecordSource for RandomSource {
    async fn fetch_all(&self) -> Result<Vec<Record>, MapError> {
        self.generate()
    }
}
