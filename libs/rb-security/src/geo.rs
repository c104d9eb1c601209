//! Geographic pointers carried by principals.
//!
//! Storage keeps four nullable columns (`region_code`, `departement_code`,
//! `epci_code`, `city_code`). The domain only ever sees a [`GeoPointer`], and
//! the only way from columns to a pointer is [`GeoPointerColumns::check_geo_consistency`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of a geographic scope, broadest first.
///
/// The derived `Ord` follows breadth: `Nation < Region < Departement < Epci < City`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicLevel {
    Nation,
    Region,
    Departement,
    Epci,
    City,
}

impl GeographicLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nation => "nation",
            Self::Region => "region",
            Self::Departement => "departement",
            Self::Epci => "epci",
            Self::City => "city",
        }
    }

    /// Returns `true` when `self` covers a strictly larger area than `other`.
    #[must_use]
    pub fn is_broader_than(self, other: Self) -> bool {
        self < other
    }

    /// The broader of two levels.
    #[must_use]
    pub fn broadest(self, other: Self) -> Self {
        self.min(other)
    }
}

impl fmt::Display for GeographicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single geographic assignment of a principal.
///
/// `Nation` means no pointer at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", content = "code", rename_all = "snake_case")]
pub enum GeoPointer {
    #[default]
    Nation,
    Region(String),
    /// Legacy département assignment.
    Departement(String),
    Epci(String),
    City(String),
}

impl GeoPointer {
    #[must_use]
    pub fn level(&self) -> GeographicLevel {
        match self {
            Self::Nation => GeographicLevel::Nation,
            Self::Region(_) => GeographicLevel::Region,
            Self::Departement(_) => GeographicLevel::Departement,
            Self::Epci(_) => GeographicLevel::Epci,
            Self::City(_) => GeographicLevel::City,
        }
    }

    /// The referenced code, `None` for `Nation`.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Nation => None,
            Self::Region(c) | Self::Departement(c) | Self::Epci(c) | Self::City(c) => Some(c),
        }
    }
}

impl fmt::Display for GeoPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code() {
            Some(code) => write!(f, "{}:{code}", self.level()),
            None => f.write_str("nation"),
        }
    }
}

/// More than one geo pointer was set on a candidate row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at most one geo pointer may be set, found: {}", join_levels(.set))]
pub struct InvalidGeoScope {
    /// The pointers that were set, broadest first.
    pub set: Vec<GeographicLevel>,
}

fn join_levels(levels: &[GeographicLevel]) -> String {
    levels
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Nullable storage representation of a geo pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoPointerColumns {
    pub region_code: Option<String>,
    pub departement_code: Option<String>,
    pub epci_code: Option<String>,
    pub city_code: Option<String>,
}

impl GeoPointerColumns {
    /// Validate a candidate row and convert it to a pointer.
    ///
    /// Blank strings count as null.
    ///
    /// # Errors
    /// Returns [`InvalidGeoScope`] when two or more pointers are set.
    pub fn check_geo_consistency(&self) -> Result<GeoPointer, InvalidGeoScope> {
        let set: Vec<(GeographicLevel, &str)> = [
            (GeographicLevel::Region, self.region_code.as_deref()),
            (GeographicLevel::Departement, self.departement_code.as_deref()),
            (GeographicLevel::Epci, self.epci_code.as_deref()),
            (GeographicLevel::City, self.city_code.as_deref()),
        ]
        .into_iter()
        .filter_map(|(level, code)| {
            code.map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| (level, c))
        })
        .collect();

        match set.as_slice() {
            [] => Ok(GeoPointer::Nation),
            [(level, code)] => {
                let code = (*code).to_owned();
                Ok(match level {
                    GeographicLevel::Region => GeoPointer::Region(code),
                    GeographicLevel::Departement => GeoPointer::Departement(code),
                    GeographicLevel::Epci => GeoPointer::Epci(code),
                    GeographicLevel::City => GeoPointer::City(code),
                    GeographicLevel::Nation => GeoPointer::Nation,
                })
            }
            many => Err(InvalidGeoScope {
                set: many.iter().map(|(level, _)| *level).collect(),
            }),
        }
    }
}

impl From<&GeoPointer> for GeoPointerColumns {
    fn from(pointer: &GeoPointer) -> Self {
        let mut cols = Self::default();
        match pointer {
            GeoPointer::Nation => {}
            GeoPointer::Region(c) => cols.region_code = Some(c.clone()),
            GeoPointer::Departement(c) => cols.departement_code = Some(c.clone()),
            GeoPointer::Epci(c) => cols.epci_code = Some(c.clone()),
            GeoPointer::City(c) => cols.city_code = Some(c.clone()),
        }
        cols
    }
}

impl TryFrom<GeoPointerColumns> for GeoPointer {
    type Error = InvalidGeoScope;

    fn try_from(cols: GeoPointerColumns) -> Result<Self, Self::Error> {
        cols.check_geo_consistency()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn cols(region: Option<&str>, epci: Option<&str>, city: Option<&str>) -> GeoPointerColumns {
        GeoPointerColumns {
            region_code: region.map(str::to_owned),
            departement_code: None,
            epci_code: epci.map(str::to_owned),
            city_code: city.map(str::to_owned),
        }
    }

    #[test]
    fn level_ordering_follows_breadth() {
        assert!(GeographicLevel::Nation.is_broader_than(GeographicLevel::Region));
        assert!(GeographicLevel::Departement.is_broader_than(GeographicLevel::Epci));
        assert!(!GeographicLevel::City.is_broader_than(GeographicLevel::City));
        assert_eq!(
            GeographicLevel::City.broadest(GeographicLevel::Region),
            GeographicLevel::Region
        );
    }

    #[test]
    fn pointer_serializes_as_tagged_variant() {
        let json = serde_json::to_value(GeoPointer::City("75056".to_owned())).unwrap();
        assert_eq!(json, serde_json::json!({"level": "city", "code": "75056"}));

        let nation: GeoPointer = serde_json::from_str(r#"{"level":"nation"}"#).unwrap();
        assert_eq!(nation, GeoPointer::Nation);
    }

    #[test]
    fn blank_codes_count_as_null() {
        let candidate = cols(Some("  "), None, Some("75056"));
        assert_eq!(
            candidate.check_geo_consistency(),
            Ok(GeoPointer::City("75056".to_owned()))
        );
    }

    #[test]
    fn columns_round_trip_through_pointer() {
        let pointer = GeoPointer::Epci("200054781".to_owned());
        let columns = GeoPointerColumns::from(&pointer);
        assert_eq!(columns.epci_code.as_deref(), Some("200054781"));
        assert_eq!(GeoPointer::try_from(columns), Ok(pointer));
    }

    #[test]
    fn error_lists_every_set_pointer() {
        let err = cols(Some("11"), Some("200054781"), Some("75056"))
            .check_geo_consistency()
            .unwrap_err();
        assert_eq!(
            err.set,
            vec![
                GeographicLevel::Region,
                GeographicLevel::Epci,
                GeographicLevel::City
            ]
        );
        assert_eq!(
            err.to_string(),
            "at most one geo pointer may be set, found: region, epci, city"
        );
    }
}
