use crate::geo::GeoPointer;
use crate::role::Role;

/// `SecurityContext` carries the authenticated principal through a request.
///
/// Built by the directory from a stored user and its organization, then
/// handed to the `PolicyEnforcer` to authorize operations and obtain list
/// scopes. An anonymous context has no subject and is rejected by every gate.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Authenticated user. `None` for anonymous contexts.
    subject_id: Option<i64>,
    /// Role of the subject.
    role: Option<Role>,
    /// Organization the subject belongs to. Selects organization-specific
    /// permission overrides.
    organization_id: Option<i64>,
    /// Geographic assignment inherited from the organization.
    #[serde(default)]
    location: GeoPointer,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no subject, role or location
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    #[must_use]
    pub fn subject_id(&self) -> Option<i64> {
        self.subject_id
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    #[must_use]
    pub fn organization_id(&self) -> Option<i64> {
        self.organization_id
    }

    #[must_use]
    pub fn location(&self) -> &GeoPointer {
        &self.location
    }

    /// A context is authenticated when both subject and role are known.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.subject_id.is_some() && self.role.is_some()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<i64>,
    role: Option<Role>,
    organization_id: Option<i64>,
    location: GeoPointer,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: i64) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn organization_id(mut self, organization_id: i64) -> Self {
        self.organization_id = Some(organization_id);
        self
    }

    #[must_use]
    pub fn location(mut self, location: GeoPointer) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id,
            role: self.role,
            organization_id: self.organization_id,
            location: self.location,
        }
    }
}
