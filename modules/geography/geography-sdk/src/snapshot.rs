//! Immutable view of the geography hierarchy.
//!
//! A [`GeoSnapshot`] is built once (from storage, from the embedded dataset
//! or with [`GeoSnapshot::builder`] in tests), validated, and then shared
//! behind an `Arc`. Every reference it holds points at a row it also holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GeographyError;
use crate::models::{City, Departement, Epci, Region};

/// Lookups the scope resolver needs. Each returns `None` for an unknown code.
pub trait GeographyReader: Send + Sync {
    fn region(&self, code: &str) -> Option<&Region>;
    fn departement(&self, code: &str) -> Option<&Departement>;
    fn epci(&self, code: &str) -> Option<&Epci>;
    fn city(&self, code: &str) -> Option<&City>;

    /// Départements of a region, ordered by code.
    fn departements_in_region(&self, region_code: &str) -> Vec<&Departement>;
}

/// Serialized form of the hierarchy (reference dataset, CLI export).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoDataset {
    pub regions: Vec<Region>,
    pub departements: Vec<Departement>,
    pub epcis: Vec<Epci>,
    pub cities: Vec<City>,
}

impl GeoDataset {
    /// Parse a JSON dataset.
    ///
    /// # Errors
    /// Returns [`GeographyError::InvalidDataset`] on malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, GeographyError> {
        serde_json::from_str(raw).map_err(|e| GeographyError::InvalidDataset(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoSnapshot {
    regions: BTreeMap<String, Region>,
    departements: BTreeMap<String, Departement>,
    epcis: BTreeMap<String, Epci>,
    cities: BTreeMap<String, City>,
}

impl GeoSnapshot {
    #[must_use]
    pub fn builder() -> GeoSnapshotBuilder {
        GeoSnapshotBuilder::default()
    }

    /// Validate a dataset and index it.
    ///
    /// # Errors
    /// Returns [`GeographyError::InvalidDataset`] on duplicate codes or
    /// references to rows absent from the dataset.
    pub fn from_dataset(dataset: GeoDataset) -> Result<Self, GeographyError> {
        let mut snapshot = Self::default();

        for r in dataset.regions {
            insert_unique(&mut snapshot.regions, r.code.clone(), r, "region")?;
        }
        for d in dataset.departements {
            if !snapshot.regions.contains_key(&d.region_code) {
                return Err(dangling("departement", &d.code, "region", &d.region_code));
            }
            insert_unique(&mut snapshot.departements, d.code.clone(), d, "departement")?;
        }
        for e in dataset.epcis {
            if !snapshot.departements.contains_key(&e.departement_code) {
                return Err(dangling("epci", &e.code, "departement", &e.departement_code));
            }
            insert_unique(&mut snapshot.epcis, e.code.clone(), e, "epci")?;
        }
        for c in dataset.cities {
            if !snapshot.departements.contains_key(&c.departement_code) {
                return Err(dangling("city", &c.code, "departement", &c.departement_code));
            }
            if let Some(epci) = &c.epci_code
                && !snapshot.epcis.contains_key(epci)
            {
                return Err(dangling("city", &c.code, "epci", epci));
            }
            insert_unique(&mut snapshot.cities, c.code.clone(), c, "city")?;
        }

        Ok(snapshot)
    }

    /// Export back to the serialized form, rows ordered by code.
    #[must_use]
    pub fn to_dataset(&self) -> GeoDataset {
        GeoDataset {
            regions: self.regions.values().cloned().collect(),
            departements: self.departements.values().cloned().collect(),
            epcis: self.epcis.values().cloned().collect(),
            cities: self.cities.values().cloned().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Row counts `(regions, departements, epcis, cities)`.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.regions.len(),
            self.departements.len(),
            self.epcis.len(),
            self.cities.len(),
        )
    }
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    code: String,
    row: T,
    kind: &str,
) -> Result<(), GeographyError> {
    if map.contains_key(&code) {
        return Err(GeographyError::InvalidDataset(format!(
            "duplicate {kind} code '{code}'"
        )));
    }
    map.insert(code, row);
    Ok(())
}

fn dangling(kind: &str, code: &str, target: &str, target_code: &str) -> GeographyError {
    GeographyError::InvalidDataset(format!(
        "{kind} '{code}' references unknown {target} '{target_code}'"
    ))
}

impl GeographyReader for GeoSnapshot {
    fn region(&self, code: &str) -> Option<&Region> {
        self.regions.get(code)
    }

    fn departement(&self, code: &str) -> Option<&Departement> {
        self.departements.get(code)
    }

    fn epci(&self, code: &str) -> Option<&Epci> {
        self.epcis.get(code)
    }

    fn city(&self, code: &str) -> Option<&City> {
        self.cities.get(code)
    }

    fn departements_in_region(&self, region_code: &str) -> Vec<&Departement> {
        self.departements
            .values()
            .filter(|d| d.region_code == region_code)
            .collect()
    }
}

/// Fluent builder for synthetic geographies.
///
/// ```
/// use geography_sdk::{GeoSnapshot, GeographyReader};
///
/// let snapshot = GeoSnapshot::builder()
///     .region("11", "Ile-de-France")
///     .departement("75", "Paris", "11", 48.8566, 2.3522)
///     .city("75056", "Paris", "75", None)
///     .build()
///     .unwrap();
/// assert_eq!(snapshot.city("75056").map(|c| c.departement_code.as_str()), Some("75"));
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct GeoSnapshotBuilder {
    dataset: GeoDataset,
}

impl GeoSnapshotBuilder {
    pub fn region(mut self, code: &str, name: &str) -> Self {
        self.dataset.regions.push(Region {
            code: code.to_owned(),
            name: name.to_owned(),
        });
        self
    }

    pub fn departement(
        mut self,
        code: &str,
        name: &str,
        region_code: &str,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        self.dataset.departements.push(Departement {
            code: code.to_owned(),
            name: name.to_owned(),
            latitude,
            longitude,
            region_code: region_code.to_owned(),
        });
        self
    }

    pub fn epci(mut self, code: &str, name: &str, departement_code: &str) -> Self {
        self.dataset.epcis.push(Epci {
            code: code.to_owned(),
            name: name.to_owned(),
            departement_code: departement_code.to_owned(),
        });
        self
    }

    pub fn city(
        mut self,
        code: &str,
        name: &str,
        departement_code: &str,
        epci_code: Option<&str>,
    ) -> Self {
        self.dataset.cities.push(City {
            code: code.to_owned(),
            name: name.to_owned(),
            departement_code: departement_code.to_owned(),
            epci_code: epci_code.map(str::to_owned),
        });
        self
    }

    /// # Errors
    /// See [`GeoSnapshot::from_dataset`].
    pub fn build(self) -> Result<GeoSnapshot, GeographyError> {
        GeoSnapshot::from_dataset(self.dataset)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn snapshot() -> GeoSnapshot {
        GeoSnapshot::builder()
            .region("11", "Ile-de-France")
            .region("93", "Provence-Alpes-Cote d'Azur")
            .departement("75", "Paris", "11", 48.856_6, 2.352_2)
            .departement("92", "Hauts-de-Seine", "11", 48.828_5, 2.218_8)
            .departement("13", "Bouches-du-Rhone", "93", 43.296_5, 5.369_8)
            .epci("200054781", "Metropole du Grand Paris", "75")
            .city("75056", "Paris", "75", Some("200054781"))
            .city("13055", "Marseille", "13", None)
            .build()
            .unwrap()
    }

    #[test]
    fn lookups() {
        let s = snapshot();
        assert_eq!(s.region("11").map(|r| r.name.as_str()), Some("Ile-de-France"));
        assert_eq!(s.departement("13").map(|d| d.region_code.as_str()), Some("93"));
        assert!(s.epci("200054781").is_some());
        assert!(s.city("99999").is_none());
        assert_eq!(s.counts(), (2, 3, 1, 2));
    }

    #[test]
    fn departements_in_region_are_ordered() {
        let s = snapshot();
        let codes: Vec<_> = s
            .departements_in_region("11")
            .into_iter()
            .map(|d| d.code.as_str())
            .collect();
        assert_eq!(codes, vec!["75", "92"]);
        assert!(s.departements_in_region("84").is_empty());
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let err = GeoSnapshot::builder()
            .region("11", "Ile-de-France")
            .departement("13", "Bouches-du-Rhone", "93", 43.3, 5.4)
            .build()
            .unwrap_err();
        assert!(matches!(err, GeographyError::InvalidDataset(msg) if msg.contains("'93'")));
    }

    #[test]
    fn city_with_unknown_epci_is_rejected() {
        let err = GeoSnapshot::builder()
            .region("11", "Ile-de-France")
            .departement("75", "Paris", "11", 48.8, 2.3)
            .city("75056", "Paris", "75", Some("123456789"))
            .build()
            .unwrap_err();
        assert!(matches!(err, GeographyError::InvalidDataset(_)));
    }

    #[test]
    fn duplicate_code_is_rejected() {
        let err = GeoSnapshot::builder()
            .region("11", "Ile-de-France")
            .region("11", "Again")
            .build()
            .unwrap_err();
        assert!(matches!(err, GeographyError::InvalidDataset(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn dataset_round_trip_through_json() {
        let s = snapshot();
        let json = serde_json::to_string(&s.to_dataset()).unwrap();
        let back = GeoSnapshot::from_dataset(GeoDataset::from_json(&json).unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn unknown_dataset_field_is_rejected() {
        let err = GeoDataset::from_json(r#"{"regions":[],"countries":[]}"#).unwrap_err();
        assert!(matches!(err, GeographyError::InvalidDataset(_)));
    }
}
