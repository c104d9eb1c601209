//! Scope resolution: from a stored pointer to a fully populated scope.

use geography_sdk::{
    Centroid, City, Departement, Epci, GeographyError, GeographyReader, Region, ResolvedScope,
};
use rb_security::{GeoPointer, GeographicLevel};

/// Resolve `pointer` against `reader`.
///
/// The most specific pointer wins (a [`GeoPointer`] holds only one). Every
/// ancestor of the pointed row is looked up; a city's EPCI is filled in when
/// the city belongs to one.
///
/// # Errors
/// Returns [`GeographyError::DanglingReference`] naming the pointer kind whose
/// row is missing, including ancestors reached through a foreign key.
pub fn resolve_scope(
    reader: &dyn GeographyReader,
    pointer: &GeoPointer,
) -> Result<ResolvedScope, GeographyError> {
    match pointer {
        GeoPointer::Nation => Ok(ResolvedScope::nation()),
        GeoPointer::City(code) => {
            let city = lookup_city(reader, code)?;
            let departement = lookup_departement(reader, &city.departement_code)?;
            let region = lookup_region(reader, &departement.region_code)?;
            let epci = city
                .epci_code
                .as_deref()
                .map(|e| lookup_epci(reader, e))
                .transpose()?;
            Ok(ResolvedScope {
                level: GeographicLevel::City,
                centroid: Centroid::from(departement),
                region: Some(region.clone()),
                departement: Some(departement.clone()),
                epci: epci.cloned(),
                city: Some(city.clone()),
            })
        }
        GeoPointer::Epci(code) => {
            let epci = lookup_epci(reader, code)?;
            let departement = lookup_departement(reader, &epci.departement_code)?;
            let region = lookup_region(reader, &departement.region_code)?;
            Ok(ResolvedScope {
                level: GeographicLevel::Epci,
                centroid: Centroid::from(departement),
                region: Some(region.clone()),
                departement: Some(departement.clone()),
                epci: Some(epci.clone()),
                city: None,
            })
        }
        GeoPointer::Departement(code) => {
            let departement = lookup_departement(reader, code)?;
            let region = lookup_region(reader, &departement.region_code)?;
            Ok(ResolvedScope {
                level: GeographicLevel::Departement,
                centroid: Centroid::from(departement),
                region: Some(region.clone()),
                departement: Some(departement.clone()),
                epci: None,
                city: None,
            })
        }
        GeoPointer::Region(code) => {
            let region = lookup_region(reader, code)?;
            Ok(ResolvedScope {
                level: GeographicLevel::Region,
                centroid: Centroid::mean_of(reader.departements_in_region(&region.code)),
                region: Some(region.clone()),
                departement: None,
                epci: None,
                city: None,
            })
        }
    }
}

fn lookup_region<'a>(reader: &'a dyn GeographyReader, code: &str) -> Result<&'a Region, GeographyError> {
    reader
        .region(code)
        .ok_or_else(|| GeographyError::dangling(GeographicLevel::Region, code))
}

fn lookup_departement<'a>(
    reader: &'a dyn GeographyReader,
    code: &str,
) -> Result<&'a Departement, GeographyError> {
    reader
        .departement(code)
        .ok_or_else(|| GeographyError::dangling(GeographicLevel::Departement, code))
}

fn lookup_epci<'a>(reader: &'a dyn GeographyReader, code: &str) -> Result<&'a Epci, GeographyError> {
    reader
        .epci(code)
        .ok_or_else(|| GeographyError::dangling(GeographicLevel::Epci, code))
}

fn lookup_city<'a>(reader: &'a dyn GeographyReader, code: &str) -> Result<&'a City, GeographyError> {
    reader
        .city(code)
        .ok_or_else(|| GeographyError::dangling(GeographicLevel::City, code))
}
