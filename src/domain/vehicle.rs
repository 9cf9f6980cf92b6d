use serde::{Deserialize, Serialize};

/// (make, model, year) tuple identifying a vehicle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleIdentity {
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl VehicleIdentity {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
        }
    }

    /// Normalized key for catalog lookups.
    pub fn catalog_key(&self) -> (String, String) {
        (
            self.make.trim().to_lowercase(),
            self.model.trim().to_lowercase(),
        )
    }
}

/// Coarse body classification derived from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "Pickup Truck")]
    PickupTruck,
    #[serde(rename = "SUV")]
    Suv,
    #[serde(rename = "Minivan")]
    Minivan,
    #[serde(rename = "Sedan")]
    Sedan,
}

impl VehicleType {
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::PickupTruck => "Pickup Truck",
            VehicleType::Suv => "SUV",
            VehicleType::Minivan => "Minivan",
            VehicleType::Sedan => "Sedan",
        }
    }
}

const PICKUP_KEYWORDS: &[&str] = &[
    "f-150", "f150", "f-250", "silverado", "sierra", "ram", "tundra", "tacoma", "ranger",
    "frontier", "ridgeline", "pickup", "truck",
];

const SUV_KEYWORDS: &[&str] = &[
    "explorer",
    "escape",
    "expedition",
    "cr-v",
    "crv",
    "rav4",
    "highlander",
    "4runner",
    "pilot",
    "passport",
    "tahoe",
    "suburban",
    "equinox",
    "rogue",
    "pathfinder",
    "outback",
    "suv",
    "crossover",
];

// "van" also catches "caravan" and "minivan".
const VAN_KEYWORDS: &[&str] = &["odyssey", "sienna", "pacifica", "quest", "sedona", "van"];

/// Classifies a model name into a `VehicleType` by substring matching against
/// fixed keyword lists. Checks run in a fixed priority order (pickup, SUV,
/// van) and the first matching category wins; anything else is a Sedan.
pub fn classify_model_name(model: &str) -> VehicleType {
    let name = model.trim().to_lowercase();

    if PICKUP_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        VehicleType::PickupTruck
    } else if SUV_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        VehicleType::Suv
    } else if VAN_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        VehicleType::Minivan
    } else {
        VehicleType::Sedan
    }
}

/// A (name, value) display pair. Order within a detail record is
/// display-significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationEntry {
    pub name: String,
    pub value: String,
}

impl SpecificationEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Which path produced the estimated price. Threaded through explicitly so
/// there is no hidden cross-request fallback flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Model,
    Heuristic,
}

/// Synthesized per-request response record. Immutable once constructed;
/// never persisted. Serializes to the camelCase wire shape used by the
/// serving boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    pub estimated_price: f64,
    pub price_source: PriceSource,
    pub specifications: Vec<SpecificationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_models() {
        assert_eq!(classify_model_name("F-150"), VehicleType::PickupTruck);
        assert_eq!(classify_model_name("Explorer"), VehicleType::Suv);
        assert_eq!(classify_model_name("Odyssey"), VehicleType::Minivan);
        assert_eq!(classify_model_name("Camry"), VehicleType::Sedan);
    }

    #[test]
    fn test_classify_priority_order() {
        // Contains both a pickup and an SUV keyword; pickup is checked first.
        assert_eq!(
            classify_model_name("Silverado Crossover"),
            VehicleType::PickupTruck
        );
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_model_name("  rav4  "), VehicleType::Suv);
        assert_eq!(classify_model_name("GRAND CARAVAN"), VehicleType::Minivan);
    }

    #[test]
    fn test_unknown_model_defaults_to_sedan() {
        assert_eq!(classify_model_name("Model 3"), VehicleType::Sedan);
        assert_eq!(classify_model_name(""), VehicleType::Sedan);
    }

    #[test]
    fn test_catalog_key_normalizes() {
        let id = VehicleIdentity::new(" Ford ", "F-150", 2020);
        assert_eq!(id.catalog_key(), ("ford".to_string(), "f-150".to_string()));
    }

    #[test]
    fn test_detail_wire_shape() {
        let detail = VehicleDetail {
            make: "Ford".to_string(),
            model: "F-150".to_string(),
            year: 2020,
            vehicle_type: VehicleType::PickupTruck,
            estimated_price: 31_400.0,
            price_source: PriceSource::Heuristic,
            specifications: vec![SpecificationEntry::new("Engine", "3.5L V6")],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["vehicleType"], "Pickup Truck");
        assert_eq!(json["estimatedPrice"], 31_400.0);
        assert_eq!(json["priceSource"], "heuristic");
        assert_eq!(json["specifications"][0]["name"], "Engine");
    }
}
