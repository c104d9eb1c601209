use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    NationalAdmin,
    LocalAdmin,
    DirectCollaborator,
    Association,
    Intervener,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::NationalAdmin,
        Self::LocalAdmin,
        Self::DirectCollaborator,
        Self::Association,
        Self::Intervener,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NationalAdmin => "national_admin",
            Self::LocalAdmin => "local_admin",
            Self::DirectCollaborator => "direct_collaborator",
            Self::Association => "association",
            Self::Intervener => "intervener",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_every_role_name() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(UnknownRole("superuser".to_owned()))
        );
    }

    #[test]
    fn serde_name_matches_as_str() {
        let json = serde_json::to_string(&Role::DirectCollaborator).unwrap();
        assert_eq!(json, "\"direct_collaborator\"");
    }
}
