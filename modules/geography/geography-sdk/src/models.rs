//! Reference rows and resolved scopes.

use rb_security::{GeoPointer, GeographicLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Departement {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Epci {
    pub code: String,
    pub name: String,
    pub departement_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct City {
    pub code: String,
    pub name: String,
    pub departement_code: String,
    #[serde(default)]
    pub epci_code: Option<String>,
}

/// Map center of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Center of metropolitan France, used for national scopes.
pub const DEFAULT_CENTROID: Centroid = Centroid {
    latitude: 46.775_582_9,
    longitude: 2.049_772_7,
};

impl Centroid {
    /// Arithmetic mean of the given départements' coordinates.
    ///
    /// Falls back to [`DEFAULT_CENTROID`] when there are none.
    #[must_use]
    pub fn mean_of<'a>(departements: impl IntoIterator<Item = &'a Departement>) -> Self {
        let (lat, lon, n) = departements
            .into_iter()
            .fold((0.0_f64, 0.0_f64, 0.0_f64), |(lat, lon, n), d| {
                (lat + d.latitude, lon + d.longitude, n + 1.0)
            });
        if n < 1.0 {
            return DEFAULT_CENTROID;
        }
        Self {
            latitude: lat / n,
            longitude: lon / n,
        }
    }
}

impl From<&Departement> for Centroid {
    fn from(d: &Departement) -> Self {
        Self {
            latitude: d.latitude,
            longitude: d.longitude,
        }
    }
}

/// A principal's scope with every ancestor of its pointer filled in.
///
/// Fields finer than `level` are empty: a region scope carries only its
/// region, an EPCI scope its EPCI, département and region, and a city scope
/// everything (`epci` stays empty for cities outside any EPCI).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScope {
    pub level: GeographicLevel,
    pub region: Option<Region>,
    pub departement: Option<Departement>,
    pub epci: Option<Epci>,
    pub city: Option<City>,
    pub centroid: Centroid,
}

impl ResolvedScope {
    /// The national scope: no geo field, default centroid.
    #[must_use]
    pub fn nation() -> Self {
        Self {
            level: GeographicLevel::Nation,
            region: None,
            departement: None,
            epci: None,
            city: None,
            centroid: DEFAULT_CENTROID,
        }
    }

    #[must_use]
    pub fn region_code(&self) -> Option<&str> {
        self.region.as_ref().map(|r| r.code.as_str())
    }

    #[must_use]
    pub fn departement_code(&self) -> Option<&str> {
        self.departement.as_ref().map(|d| d.code.as_str())
    }

    #[must_use]
    pub fn epci_code(&self) -> Option<&str> {
        self.epci.as_ref().map(|e| e.code.as_str())
    }

    #[must_use]
    pub fn city_code(&self) -> Option<&str> {
        self.city.as_ref().map(|c| c.code.as_str())
    }

    /// The pointer that designates this scope.
    #[must_use]
    pub fn pointer(&self) -> GeoPointer {
        let code = match self.level {
            GeographicLevel::Nation => None,
            GeographicLevel::Region => self.region_code(),
            GeographicLevel::Departement => self.departement_code(),
            GeographicLevel::Epci => self.epci_code(),
            GeographicLevel::City => self.city_code(),
        }
        .map(str::to_owned);

        match (self.level, code) {
            (GeographicLevel::Region, Some(c)) => GeoPointer::Region(c),
            (GeographicLevel::Departement, Some(c)) => GeoPointer::Departement(c),
            (GeographicLevel::Epci, Some(c)) => GeoPointer::Epci(c),
            (GeographicLevel::City, Some(c)) => GeoPointer::City(c),
            _ => GeoPointer::Nation,
        }
    }

    /// `true` when `inner` lies within `self`. See [`contains_scope`].
    #[must_use]
    pub fn contains(&self, inner: &ResolvedScope) -> bool {
        contains_scope(self, inner)
    }

    /// The ancestor scope at `level`.
    ///
    /// Returns `None` when `level` is narrower than `self.level`, or when the
    /// ancestor does not exist (a city outside any EPCI widened to `epci`).
    /// The centroid of `self` is kept, except at nation level.
    #[must_use]
    pub fn widen_to(&self, level: GeographicLevel) -> Option<ResolvedScope> {
        if level > self.level {
            return None;
        }
        if level == self.level {
            return Some(self.clone());
        }

        let mut widened = Self {
            level,
            region: None,
            departement: None,
            epci: None,
            city: None,
            centroid: self.centroid,
        };
        match level {
            GeographicLevel::Nation => return Some(Self::nation()),
            GeographicLevel::Region => {
                widened.region = Some(self.region.clone()?);
            }
            GeographicLevel::Departement => {
                widened.region = Some(self.region.clone()?);
                widened.departement = Some(self.departement.clone()?);
            }
            GeographicLevel::Epci => {
                widened.region = Some(self.region.clone()?);
                widened.departement = Some(self.departement.clone()?);
                widened.epci = Some(self.epci.clone()?);
            }
            GeographicLevel::City => return None,
        }
        Some(widened)
    }
}

/// Geographic containment.
///
/// - nation contains everything;
/// - a nation-level `inner` is contained only by a nation-level `outer`;
/// - region R contains any scope whose region is R;
/// - département D contains any scope whose département is D;
/// - EPCI E contains any scope whose EPCI is E;
/// - city C contains only C.
#[must_use]
pub fn contains_scope(outer: &ResolvedScope, inner: &ResolvedScope) -> bool {
    fn same(a: Option<&str>, b: Option<&str>) -> bool {
        matches!((a, b), (Some(a), Some(b)) if a == b)
    }

    match outer.level {
        GeographicLevel::Nation => true,
        GeographicLevel::Region => same(outer.region_code(), inner.region_code()),
        GeographicLevel::Departement => {
            same(outer.departement_code(), inner.departement_code())
        }
        GeographicLevel::Epci => same(outer.epci_code(), inner.epci_code()),
        GeographicLevel::City => same(outer.city_code(), inner.city_code()),
    }
}
