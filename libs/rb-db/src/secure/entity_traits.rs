use sea_orm::EntityTrait;

/// Entities whose rows can be filtered by an [`AccessScope`](rb_security::AccessScope).
///
/// The only contract is property resolution: given an authorization property
/// name (`"departement_code"`, `"id"`, ...) return the column that stores it,
/// or `None` when the entity has no such column. Unknown properties make the
/// constraint that names them fail (fail-closed).
///
/// ```rust,ignore
/// impl ScopableEntity for plan_territory::Entity {
///     fn resolve_property(property: &str) -> Option<Self::Column> {
///         match property {
///             pep_properties::DEPARTEMENT_CODE => Some(Column::DepartementCode),
///             pep_properties::REGION_CODE => Some(Column::RegionCode),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait ScopableEntity: EntityTrait {
    /// Reference tables readable by everyone. Inserts skip scope validation.
    const IS_UNRESTRICTED: bool = false;

    /// Map a PEP property name to a column.
    #[must_use]
    fn resolve_property(property: &str) -> Option<Self::Column>;
}
