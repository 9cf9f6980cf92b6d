use crate::domain::vehicle::{SpecificationEntry, VehicleIdentity};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Static fallback store mapping (make, model) to canonical specification
/// lists. Populated once at startup; read-only at request time. A miss is not
/// an error — callers fall back to `generic_template`.
pub struct VehicleCatalog {
    specs: HashMap<(String, String), Vec<SpecificationEntry>>,
}

/// One record of a collaborator-supplied catalog file.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    make: String,
    model: String,
    specifications: Vec<SpecificationEntry>,
}

impl VehicleCatalog {
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Built-in demo entries used when no catalog source is configured.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();

        catalog.insert(
            "Ford",
            "F-150",
            vec![
                SpecificationEntry::new("Engine", "3.5L EcoBoost V6"),
                SpecificationEntry::new("Horsepower", "400 hp"),
                SpecificationEntry::new("Transmission", "10-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Four-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "18 city / 24 highway mpg"),
                SpecificationEntry::new("Towing Capacity", "13,200 lbs"),
            ],
        );
        catalog.insert(
            "Ford",
            "Explorer",
            vec![
                SpecificationEntry::new("Engine", "2.3L EcoBoost I-4"),
                SpecificationEntry::new("Horsepower", "300 hp"),
                SpecificationEntry::new("Transmission", "10-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Rear-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "21 city / 28 highway mpg"),
                SpecificationEntry::new("Seating", "7 passengers"),
            ],
        );
        catalog.insert(
            "Toyota",
            "Camry",
            vec![
                SpecificationEntry::new("Engine", "2.5L 4-cylinder"),
                SpecificationEntry::new("Horsepower", "203 hp"),
                SpecificationEntry::new("Transmission", "8-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Front-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "28 city / 39 highway mpg"),
                SpecificationEntry::new("Seating", "5 passengers"),
            ],
        );
        catalog.insert(
            "Toyota",
            "RAV4",
            vec![
                SpecificationEntry::new("Engine", "2.5L 4-cylinder"),
                SpecificationEntry::new("Horsepower", "203 hp"),
                SpecificationEntry::new("Transmission", "8-speed automatic"),
                SpecificationEntry::new("Drivetrain", "All-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "27 city / 35 highway mpg"),
                SpecificationEntry::new("Seating", "5 passengers"),
            ],
        );
        catalog.insert(
            "Honda",
            "Civic",
            vec![
                SpecificationEntry::new("Engine", "2.0L 4-cylinder"),
                SpecificationEntry::new("Horsepower", "158 hp"),
                SpecificationEntry::new("Transmission", "CVT"),
                SpecificationEntry::new("Drivetrain", "Front-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "31 city / 40 highway mpg"),
                SpecificationEntry::new("Seating", "5 passengers"),
            ],
        );
        catalog.insert(
            "Honda",
            "CR-V",
            vec![
                SpecificationEntry::new("Engine", "1.5L turbocharged 4-cylinder"),
                SpecificationEntry::new("Horsepower", "190 hp"),
                SpecificationEntry::new("Transmission", "CVT"),
                SpecificationEntry::new("Drivetrain", "All-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "28 city / 34 highway mpg"),
                SpecificationEntry::new("Seating", "5 passengers"),
            ],
        );
        catalog.insert(
            "Honda",
            "Odyssey",
            vec![
                SpecificationEntry::new("Engine", "3.5L V6"),
                SpecificationEntry::new("Horsepower", "280 hp"),
                SpecificationEntry::new("Transmission", "10-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Front-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "19 city / 28 highway mpg"),
                SpecificationEntry::new("Seating", "8 passengers"),
            ],
        );
        catalog.insert(
            "Chevrolet",
            "Silverado",
            vec![
                SpecificationEntry::new("Engine", "5.3L V8"),
                SpecificationEntry::new("Horsepower", "355 hp"),
                SpecificationEntry::new("Transmission", "10-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Four-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "16 city / 22 highway mpg"),
                SpecificationEntry::new("Towing Capacity", "11,500 lbs"),
            ],
        );
        catalog.insert(
            "BMW",
            "3 Series",
            vec![
                SpecificationEntry::new("Engine", "2.0L turbocharged 4-cylinder"),
                SpecificationEntry::new("Horsepower", "255 hp"),
                SpecificationEntry::new("Transmission", "8-speed automatic"),
                SpecificationEntry::new("Drivetrain", "Rear-wheel drive"),
                SpecificationEntry::new("Fuel Economy", "26 city / 36 highway mpg"),
                SpecificationEntry::new("Seating", "5 passengers"),
            ],
        );

        catalog
    }

    /// Loads a collaborator-supplied catalog: a JSON array of
    /// `{make, model, specifications: [{name, value}]}` records.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open catalog file {:?}", path))?;
        let entries: Vec<CatalogEntry> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?;

        let mut catalog = Self::empty();
        for CatalogEntry {
            make,
            model,
            specifications,
        } in entries
        {
            catalog.insert(&make, &model, specifications);
        }
        info!("Loaded {} catalog entries from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn insert(&mut self, make: &str, model: &str, specs: Vec<SpecificationEntry>) {
        self.specs
            .insert((make.trim().to_lowercase(), model.trim().to_lowercase()), specs);
    }

    /// Specification list for an identity. `None` means a catalog miss.
    pub fn lookup_specs(&self, identity: &VehicleIdentity) -> Option<&[SpecificationEntry]> {
        self.specs
            .get(&identity.catalog_key())
            .map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// The fixed placeholder sequence returned on a catalog miss, so the
/// synthesizer always has something to display.
pub fn generic_template() -> Vec<SpecificationEntry> {
    vec![
        SpecificationEntry::new("Engine", "2.4L 4-cylinder"),
        SpecificationEntry::new("Horsepower", "180 hp"),
        SpecificationEntry::new("Transmission", "Automatic"),
        SpecificationEntry::new("Drivetrain", "Front-wheel drive"),
        SpecificationEntry::new("Fuel Economy", "24 city / 32 highway mpg"),
        SpecificationEntry::new("Seating", "5 passengers"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = VehicleCatalog::builtin();
        let id = VehicleIdentity::new("FORD", "f-150", 2021);

        let specs = catalog.lookup_specs(&id).unwrap();
        assert_eq!(specs[0].name, "Engine");
        assert!(specs[0].value.contains("EcoBoost"));
    }

    #[test]
    fn test_miss_returns_none() {
        let catalog = VehicleCatalog::builtin();
        let id = VehicleIdentity::new("Yugo", "GV", 1987);
        assert!(catalog.lookup_specs(&id).is_none());
    }

    #[test]
    fn test_generic_template_is_fixed() {
        let a = generic_template();
        let b = generic_template();
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert_eq!(a[0].name, "Engine");
    }

    #[test]
    fn test_from_json_entries() {
        let path = std::env::temp_dir().join(format!(
            "carprice_catalog_test_{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"[{"make": "Subaru", "model": "Outback",
                 "specifications": [{"name": "Engine", "value": "2.5L flat-4"}]}]"#,
        )
        .unwrap();

        let catalog = VehicleCatalog::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(catalog.len(), 1);
        let id = VehicleIdentity::new("subaru", "outback", 2022);
        assert_eq!(catalog.lookup_specs(&id).unwrap()[0].value, "2.5L flat-4");
    }
}
