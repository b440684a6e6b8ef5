pub mod bounds;
pub mod classifier;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod geopoint;
pub mod location;
pub mod record;
pub mod session;
pub mod source;
pub mod types;
pub mod viewport;

pub use bounds::BoundingBox;
pub use classifier::{Breakpoint, ClassifierConfig, ThresholdClassifier};
pub use client::ParksClient;
pub use config::MapConfig;
pub use error::MapError;
pub use event::MapEvent;
pub use geopoint::GeoPoint;
pub use location::LocationFields;
pub use record::{Located, Record};
pub use session::{MapSession, Marker, RenderFrame};
pub use source::{JsonFileSource, RandomSource, RecordSource, StaticSource};
pub use viewport::{filter_visible, resolve_click, DEFAULT_CLICK_TOLERANCE};

pub use types::TimeSlot;
