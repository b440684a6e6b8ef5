// src/client.rs

use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::geopoint::GeoPoint;
use crate::location::{CoordinateValue, LocationFields};
use crate::record::Record;
use crate::source::RecordSource;

/// Client for the National Park Service data API.
///
/// Parks are fetched page by page and converted into [`Record`]s. The API key is
/// sent in the `X-Api-Key` header and is never written to the logs.
///
/// ```rust,no_run
/// use noisemap_rs::{ParksClient, MapError, RecordSource};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), MapError> {
/// let api_key = std::env::var("NPS_API_KEY").unwrap_or_default();
/// let client = ParksClient::new("https://developer.nps.gov/api/v1", &api_key)?;
/// let parks = client.fetch_all().await?;
/// println!("{} parks with coordinates", parks.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ParksClient {
    pub base_url: String,
    pub(crate) page_size: u32,
    pub(crate) state_codes: Vec<String>,
    default_headers: HeaderMap,
    pub(crate) http_client: Client,
}

impl ParksClient {
    /// Creates a new `ParksClient`.
    ///
    /// `base_url` gets an `https://` scheme if it has none; trailing slashes are removed.
    ///
    /// # Errors
    /// `MapError::MissingCredential` for an empty key, URL errors for an unusable base URL,
    /// and `MapError::InvalidHeaderValue` if the key cannot be sent as a header.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, MapError> {
        if api_key.trim().is_empty() {
            return Err(MapError::MissingCredential(
                "The parks API key cannot be empty".to_string(),
            ));
        }

        let mut temp_url_string = base_url.trim().to_string();
        if !temp_url_string.starts_with("http://") && !temp_url_string.starts_with("https://") {
            temp_url_string = format!("https://{}", temp_url_string);
        }

        let parsed = Url::parse(&temp_url_string)?;
        if parsed.cannot_be_a_base() {
            return Err(MapError::InvalidUrl(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        let mut key_header =
            HeaderValue::from_str(api_key.trim()).map_err(MapError::InvalidHeaderValue)?;
        key_header.set_sensitive(true);
        default_headers.insert("X-Api-Key", key_header);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .default_headers(default_headers.clone())
            .build()
            .map_err(MapError::ReqwestError)?;

        let final_base_url = parsed.as_str().trim_end_matches('/').to_string();
        log::debug!("ParksClient initialized with base url: {}", final_base_url);

        Ok(Self {
            base_url: final_base_url,
            page_size: 50,
            state_codes: Vec::new(),
            default_headers,
            http_client,
        })
    }

    /// Ignores any system proxy settings, for servers on a local network.
    pub fn without_proxy(mut self) -> Result<Self, MapError> {
        self.http_client = Client::builder()
            .default_headers(self.default_headers.clone())
            .no_proxy()
            .build()
            .map_err(MapError::ReqwestError)?;
        Ok(self)
    }

    /// Builds a client from the session config. Requires `api_key`.
    pub fn from_config(config: &MapConfig) -> Result<Self, MapError> {
        let client = Self::new(&config.api_base_url, config.require_api_key()?)?;
        Ok(client.with_page_size(config.page_size))
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Restricts results to parks in the given two-letter state codes.
    pub fn with_state_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state_codes = codes
            .into_iter()
            .map(|c| c.as_ref().trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Fetches one page of parks starting at offset `start`.
    pub async fn fetch_parks_page(&self, start: usize) -> Result<ParksPage, MapError> {
        let mut params = vec![
            ("limit".to_string(), self.page_size.to_string()),
            ("start".to_string(), start.to_string()),
        ];
        if !self.state_codes.is_empty() {
            params.push(("stateCode".to_string(), self.state_codes.join(",")));
        }
        self.get_with_url_params("parks", &params).await
    }

    /// Fetches every page and converts parks into records, skipping parks that
    /// have no usable coordinates.
    pub async fn fetch_all_parks(&self) -> Result<Vec<Record>, MapError> {
        let mut records = Vec::new();
        let mut start = 0usize;
        loop {
            let page = self.fetch_parks_page(start).await?;
            let received = page.data.len();
            let total = page.total;
            log::debug!(
                "Fetched parks {}..{} of {}",
                start,
                start + received,
                total
            );
            if received == 0 {
                break;
            }
            start += received;
            records.extend(page.into_records());
            if start as u64 >= total {
                break;
            }
        }
        log::info!("Loaded {} parks from {}", records.len(), self.base_url);
        Ok(records)
    }

    pub(crate) async fn get_with_url_params<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<R, MapError> {
        let url_string = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut full_url = Url::parse(&url_string).map_err(|e| {
            MapError::InvalidUrl(format!(
                "Failed to build URL from '{}' and '{}': {}",
                self.base_url, endpoint, e
            ))
        })?;
        for (key, value) in params {
            full_url.query_pairs_mut().append_pair(key, value);
        }

        log::debug!("GET {}", full_url.as_str());

        let response = self
            .http_client
            .get(full_url)
            .send()
            .await
            .map_err(MapError::ReqwestError)?;

        let status = response.status();
        let body_bytes = response.bytes().await.map_err(MapError::ReqwestError)?;

        if status.is_success() {
            serde_json::from_slice(&body_bytes).map_err(|e| {
                MapError::JsonDeserializationFailed(format!(
                    "Error: {}, Body: {}",
                    e,
                    String::from_utf8_lossy(&body_bytes)
                ))
            })
        } else {
            let error_body_string = String::from_utf8_lossy(&body_bytes).to_string();
            log::warn!(
                "Request failed with status {} and body: {}",
                status,
                error_body_string
            );
            match serde_json::from_slice::<Value>(&body_bytes) {
                Ok(json_value) => Err(MapError::from_response(status.as_u16(), json_value)),
                Err(_) => Err(MapError::from_response(
                    status.as_u16(),
                    serde_json::json!({ "message": error_body_string }),
                )),
            }
        }
    }
}

impl RecordSource for ParksClient {
    async fn fetch_all(&self) -> Result<Vec<Record>, MapError> {
        self.fetch_all_parks().await
    }
}

fn de_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match CoordinateValue::deserialize(deserializer)? {
        CoordinateValue::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => {
            Ok(n as u64)
        }
        CoordinateValue::Number(n) => Err(serde::de::Error::custom(format!(
            "expected a non-negative whole count, got {}",
            n
        ))),
        CoordinateValue::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("expected a count, got {:?}", s))),
    }
}

/// One page of the `/parks` endpoint. Counts arrive as strings.
#[derive(Debug, Deserialize, Clone)]
pub struct ParksPage {
    #[serde(deserialize_with = "de_string_or_number")]
    pub total: u64,
    #[serde(default)]
    pub data: Vec<Park>,
}

impl ParksPage {
    pub fn into_records(self) -> Vec<Record> {
        self.data.iter().filter_map(Park::to_record).collect()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Park {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub park_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub lat_long: String,
    #[serde(default)]
    pub states: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

fn lat_long_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"lat:\s*(-?\d+(?:\.\d+)?)\s*,\s*long:\s*(-?\d+(?:\.\d+)?)")
            .expect("lat/long pattern is valid")
    })
}

/// Parses the API's `"lat:44.59824417, long:-110.5471695"` form.
pub fn parse_lat_long(lat_long: &str) -> Option<GeoPoint> {
    let caps = lat_long_pattern().captures(lat_long)?;
    let lat = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let lon = caps.get(2)?.as_str().parse::<f64>().ok()?;
    GeoPoint::new(lat, lon).ok()
}

impl Park {
    /// The park's coordinates from `latitude`/`longitude`, falling back to `latLong`.
    pub fn location(&self) -> Option<GeoPoint> {
        let fields = LocationFields::LatitudeLongitude {
            latitude: CoordinateValue::Text(self.latitude.clone()),
            longitude: CoordinateValue::Text(self.longitude.clone()),
        };
        fields.resolve().ok().or_else(|| parse_lat_long(&self.lat_long))
    }

    /// Converts to a map record. Parks report no noise readings, so the number of
    /// listed activities is used as marker intensity.
    pub fn to_record(&self) -> Option<Record> {
        let Some(location) = self.location() else {
            log::warn!(
                "Skipping park '{}' ({}): no usable coordinates",
                self.full_name,
                self.id
            );
            return None;
        };
        Some(
            Record::new(
                self.id.clone(),
                self.full_name.clone(),
                location,
                self.activities.len() as f64,
            )
            .with_description(self.description.clone()),
        )
    }
}
