//! Adapter from an opaque image classifier to a coarse vehicle category.
//!
//! The category produced here is only ever a suggestion for the entry form.
//! Failures are logged and reported as [`VehicleCategory::Unknown`].

use lot_domain::VehicleCategory;

use crate::CoreError;

/// Number of top predictions inspected when none is configured.
pub const DEFAULT_TOP_K: usize = 3;

const CAR_WORDS: &[&str] = &["car", "cab", "taxi", "minivan", "convertible", "limousine", "jeep"];
const BIKE_WORDS: &[&str] = &["motorcycle", "motorbike", "moped", "scooter", "bike", "bicycle"];
const TRUCK_WORDS: &[&str] = &["truck", "pickup", "lorry", "trailer"];

/// One label produced by a classifier, with its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: Option<f32>,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// A pretrained image classifier. Predictions are expected best-first.
pub trait VehicleClassifier: Send + Sync {
    fn predict(&self, image: &[u8]) -> Result<Vec<Prediction>, CoreError>;
}

/// Maps classifier output onto [`VehicleCategory`].
pub struct ClassificationAdapter {
    classifier: Option<Box<dyn VehicleClassifier>>,
    top_k: usize,
}

impl ClassificationAdapter {
    pub fn new(classifier: Box<dyn VehicleClassifier>, top_k: usize) -> Self {
        Self {
            classifier: Some(classifier),
            top_k: top_k.max(1),
        }
    }

    /// An adapter with no classifier behind it; every image is `Unknown`.
    pub fn disabled() -> Self {
        Self {
            classifier: None,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Classifies raw image bytes. Never fails.
    pub fn classify(&self, image: &[u8]) -> VehicleCategory {
        let Some(classifier) = self.classifier.as_ref() else {
            tracing::debug!("no classifier configured; suggesting Unknown");
            return VehicleCategory::Unknown;
        };
        match classifier.predict(image) {
            Ok(predictions) => category_from_predictions(&predictions, self.top_k),
            Err(err) => {
                tracing::warn!(error = %err, "classification degraded to Unknown");
                VehicleCategory::Unknown
            }
        }
    }
}

/// Picks the first of the top `top_k` predictions that names a vehicle.
pub fn category_from_predictions(predictions: &[Prediction], top_k: usize) -> VehicleCategory {
    predictions
        .iter()
        .take(top_k)
        .find_map(|prediction| category_from_label(&prediction.label))
        .unwrap_or(VehicleCategory::Unknown)
}

/// Maps a single classifier label such as `sports_car` or `trailer_truck`.
/// Matching is per word so that `cardigan` is not mistaken for a car.
pub fn category_from_label(label: &str) -> Option<VehicleCategory> {
    let lowered = label.to_ascii_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .collect();
    let has_any = |vocabulary: &[&str]| words.iter().any(|word| vocabulary.contains(word));

    if has_any(CAR_WORDS) {
        Some(VehicleCategory::Car)
    } else if has_any(BIKE_WORDS) {
        Some(VehicleCategory::Bike)
    } else if has_any(TRUCK_WORDS) {
        Some(VehicleCategory::Truck)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<Vec<&'static str>, &'static str>);

    impl VehicleClassifier for Scripted {
        fn predict(&self, _image: &[u8]) -> Result<Vec<Prediction>, CoreError> {
            match &self.0 {
                Ok(labels) => Ok(labels.iter().map(|l| Prediction::new(*l, None)).collect()),
                Err(message) => Err(CoreError::Classification((*message).to_string())),
            }
        }
    }

    fn adapter(result: Result<Vec<&'static str>, &'static str>) -> ClassificationAdapter {
        ClassificationAdapter::new(Box::new(Scripted(result)), DEFAULT_TOP_K)
    }

    #[test]
    fn maps_imagenet_style_labels() {
        assert_eq!(category_from_label("sports_car"), Some(VehicleCategory::Car));
        assert_eq!(category_from_label("cab"), Some(VehicleCategory::Car));
        assert_eq!(category_from_label("motor_scooter"), Some(VehicleCategory::Bike));
        assert_eq!(category_from_label("trailer_truck"), Some(VehicleCategory::Truck));
        assert_eq!(category_from_label("Moving Van"), None);
        assert_eq!(category_from_label("cardigan"), None);
    }

    #[test]
    fn first_vehicle_label_in_top_k_wins() {
        let category = adapter(Ok(vec!["grille", "pickup", "sports_car"])).classify(b"img");
        assert_eq!(category, VehicleCategory::Truck);
    }

    #[test]
    fn labels_beyond_top_k_are_ignored() {
        let category = adapter(Ok(vec!["grille", "tabby", "lakeside", "minivan"])).classify(b"img");
        assert_eq!(category, VehicleCategory::Unknown);
    }

    #[test]
    fn classifier_errors_degrade_to_unknown() {
        let category = adapter(Err("model missing")).classify(b"img");
        assert_eq!(category, VehicleCategory::Unknown);
    }

    #[test]
    fn disabled_adapter_suggests_unknown() {
        let adapter = ClassificationAdapter::disabled();
        assert!(!adapter.is_enabled());
        assert_eq!(adapter.classify(b"img"), VehicleCategory::Unknown);
    }
}
