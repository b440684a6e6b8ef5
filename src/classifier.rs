// src/classifier.rs

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// One segment of a threshold classification: values `<= upper_bound` get `label`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Breakpoint {
    pub upper_bound: f64,
    pub label: String,
}

impl Breakpoint {
    pub fn new(upper_bound: f64, label: impl Into<String>) -> Self {
        Breakpoint {
            upper_bound,
            label: label.into(),
        }
    }
}

/// Configuration form of a breakpoint. A missing or `null` bound marks the
/// overflow entry, which must come last.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ThresholdEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<f64>,
    pub label: String,
}

/// `{ "thresholds": [ {"bound": 30, "label": "green"}, ..., {"label": "red"} ] }`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub thresholds: Vec<ThresholdEntry>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ThresholdClassifier::restaurant_noise().to_config()
    }
}

/// Maps a scalar intensity to a color label using ascending breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdClassifier {
    breakpoints: Vec<Breakpoint>,
    overflow_label: String,
}

impl ThresholdClassifier {
    /// Builds a classifier from ascending breakpoints plus the label for values
    /// above every bound.
    ///
    /// A trailing breakpoint with an infinite bound is taken as the overflow entry
    /// when `overflow_label` is `None`, so `[(30, "green"), (60, "orange"), (inf, "red")]`
    /// can be passed as is.
    ///
    /// # Errors
    /// `MapError::InvalidBreakpoints` if the sequence is empty, unordered, contains a
    /// non-finite bound anywhere else, or has an empty label.
    pub fn new(
        mut breakpoints: Vec<Breakpoint>,
        overflow_label: Option<String>,
    ) -> Result<Self, MapError> {
        let overflow_label = match overflow_label {
            Some(label) => label,
            None => {
                let ends_unbounded = breakpoints
                    .last()
                    .is_some_and(|b| b.upper_bound == f64::INFINITY);
                if !ends_unbounded {
                    return Err(MapError::InvalidBreakpoints(
                        "No overflow label: pass one or end the breakpoints with an infinite bound"
                            .to_string(),
                    ));
                }
                breakpoints.pop().map(|b| b.label).unwrap_or_default()
            }
        };

        if overflow_label.is_empty() {
            return Err(MapError::InvalidBreakpoints(
                "Overflow label cannot be empty".to_string(),
            ));
        }
        if breakpoints.is_empty() {
            return Err(MapError::InvalidBreakpoints(
                "At least one bounded breakpoint is required".to_string(),
            ));
        }
        for (i, bp) in breakpoints.iter().enumerate() {
            if !bp.upper_bound.is_finite() {
                return Err(MapError::InvalidBreakpoints(format!(
                    "Breakpoint {} ('{}') has non-finite bound {}",
                    i, bp.label, bp.upper_bound
                )));
            }
            if bp.label.is_empty() {
                return Err(MapError::InvalidBreakpoints(format!(
                    "Breakpoint {} has an empty label",
                    i
                )));
            }
        }
        if let Some(pair) = breakpoints
            .windows(2)
            .find(|w| w[0].upper_bound >= w[1].upper_bound)
        {
            return Err(MapError::InvalidBreakpoints(format!(
                "Breakpoints must be strictly ascending: {} ('{}') is followed by {} ('{}')",
                pair[0].upper_bound, pair[0].label, pair[1].upper_bound, pair[1].label
            )));
        }

        Ok(ThresholdClassifier {
            breakpoints,
            overflow_label,
        })
    }

    /// Builds a classifier from its configuration form.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, MapError> {
        let Some((last, bounded)) = config.thresholds.split_last() else {
            return Err(MapError::InvalidBreakpoints(
                "thresholds cannot be empty".to_string(),
            ));
        };
        if last.bound.is_some() {
            return Err(MapError::InvalidBreakpoints(
                "The last threshold must omit its bound (overflow entry)".to_string(),
            ));
        }

        let mut breakpoints = Vec::with_capacity(bounded.len());
        for entry in bounded {
            let bound = entry.bound.ok_or_else(|| {
                MapError::InvalidBreakpoints(format!(
                    "Only the last threshold may omit its bound, '{}' does too",
                    entry.label
                ))
            })?;
            breakpoints.push(Breakpoint::new(bound, entry.label.clone()));
        }
        Self::new(breakpoints, Some(last.label.clone()))
    }

    pub fn to_config(&self) -> ClassifierConfig {
        let mut thresholds: Vec<ThresholdEntry> = self
            .breakpoints
            .iter()
            .map(|bp| ThresholdEntry {
                bound: Some(bp.upper_bound),
                label: bp.label.clone(),
            })
            .collect();
        thresholds.push(ThresholdEntry {
            bound: None,
            label: self.overflow_label.clone(),
        });
        ClassifierConfig { thresholds }
    }

    /// Restaurant noise markers: <=30 green, <=60 orange, else red.
    pub fn restaurant_noise() -> Self {
        ThresholdClassifier {
            breakpoints: vec![Breakpoint::new(30.0, "green"), Breakpoint::new(60.0, "orange")],
            overflow_label: "red".to_string(),
        }
    }

    /// Sound intensity heat points: <=30 yellow, <=60 green, else intense red.
    pub fn sound_intensity() -> Self {
        ThresholdClassifier {
            breakpoints: vec![Breakpoint::new(30.0, "yellow"), Breakpoint::new(60.0, "green")],
            overflow_label: "intense red".to_string(),
        }
    }

    /// Category index of `value`: 0 for the lowest, `breakpoints().len()` for overflow.
    pub fn severity(&self, value: f64) -> usize {
        self.breakpoints
            .iter()
            .position(|bp| value <= bp.upper_bound)
            .unwrap_or(self.breakpoints.len())
    }

    /// Label for `value`. NaN compares false against every bound and lands in overflow.
    pub fn classify(&self, value: f64) -> &str {
        self.label_for_severity(self.severity(value))
    }

    fn label_for_severity(&self, severity: usize) -> &str {
        self.breakpoints
            .get(severity)
            .map(|bp| bp.label.as_str())
            .unwrap_or(&self.overflow_label)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn overflow_label(&self) -> &str {
        &self.overflow_label
    }

    /// Labels in ascending severity, overflow last.
    pub fn labels(&self) -> Vec<&str> {
        self.breakpoints
            .iter()
            .map(|bp| bp.label.as_str())
            .chain(std::iter::once(self.overflow_label.as_str()))
            .collect()
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::restaurant_noise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_restaurant_noise_scenario() {
        let c = ThresholdClassifier::new(
            vec![
                Breakpoint::new(30.0, "green"),
                Breakpoint::new(60.0, "orange"),
                Breakpoint::new(f64::INFINITY, "red"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(c.classify(25.0), "green");
        assert_eq!(c.classify(30.0), "green");
        assert_eq!(c.classify(45.0), "orange");
        assert_eq!(c.classify(75.0), "red");
        assert_eq!(c, ThresholdClassifier::restaurant_noise());
    }

    #[test]
    fn test_negative_values_are_lowest_category() {
        let c = ThresholdClassifier::restaurant_noise();
        assert_eq!(c.classify(-1000.0), "green");
        assert_eq!(c.severity(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_nan_is_overflow() {
        let c = ThresholdClassifier::restaurant_noise();
        assert_eq!(c.classify(f64::NAN), "red");
    }

    #[test]
    fn test_alternate_breakpoints_from_config() {
        let config: ClassifierConfig = serde_json::from_value(json!({
            "thresholds": [
                {"bound": 20, "label": "green"},
                {"bound": 30, "label": "orange"},
                {"label": "red"}
            ]
        }))
        .unwrap();
        let c = ThresholdClassifier::from_config(&config).unwrap();
        assert_eq!(c.classify(20.0), "green");
        assert_eq!(c.classify(25.0), "orange");
        assert_eq!(c.classify(30.5), "red");
        assert_eq!(c.labels(), vec!["green", "orange", "red"]);
    }

    #[test]
    fn test_monotonic_severity() {
        let c = ThresholdClassifier::sound_intensity();
        let mut last = 0;
        let mut v = -50.0;
        while v <= 150.0 {
            let s = c.severity(v);
            assert!(s >= last, "severity dropped at {}", v);
            last = s;
            v += 0.5;
        }
        assert_eq!(last, 2);
        assert_eq!(c.classify(100.0), "intense red");
    }

    #[test]
    fn test_rejects_unordered() {
        let err = ThresholdClassifier::new(
            vec![Breakpoint::new(60.0, "orange"), Breakpoint::new(30.0, "green")],
            Some("red".into()),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::InvalidBreakpoints(_)));

        let dup = ThresholdClassifier::new(
            vec![Breakpoint::new(30.0, "a"), Breakpoint::new(30.0, "b")],
            Some("c".into()),
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_rejects_empty_and_missing_overflow() {
        assert!(ThresholdClassifier::new(vec![], Some("red".into())).is_err());
        assert!(ThresholdClassifier::new(vec![Breakpoint::new(30.0, "green")], None).is_err());
        assert!(ThresholdClassifier::new(
            vec![Breakpoint::new(f64::INFINITY, "red")],
            None
        )
        .is_err());
        assert!(ThresholdClassifier::from_config(&ClassifierConfig { thresholds: vec![] }).is_err());
    }

    #[test]
    fn test_config_requires_single_trailing_overflow() {
        let bounded_last: ClassifierConfig = serde_json::from_value(json!({
            "thresholds": [{"bound": 30, "label": "green"}, {"bound": 60, "label": "red"}]
        }))
        .unwrap();
        assert!(ThresholdClassifier::from_config(&bounded_last).is_err());

        let overflow_in_middle: ClassifierConfig = serde_json::from_value(json!({
            "thresholds": [{"label": "green"}, {"bound": 60, "label": "orange"}, {"label": "red"}]
        }))
        .unwrap();
        assert!(ThresholdClassifier::from_config(&overflow_in_middle).is_err());
    }

    #[test]
    fn test_config_round_trip_preserves_behavior() {
        let c = ThresholdClassifier::sound_intensity();
        let back = ThresholdClassifier::from_config(&c.to_config()).unwrap();
        assert_eq!(back, c);
        assert_eq!(ClassifierConfig::default(), ThresholdClassifier::restaurant_noise().to_config());
    }
}
