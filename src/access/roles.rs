//! Staff Roles
//! Mission: Closed enumeration of job functions used to gate portal features

use serde::{Deserialize, Serialize};

/// User roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    #[serde(rename = "admin", alias = "Administrateur")]
    Admin, // Full access, overrides ownership checks
    #[serde(rename = "dean", alias = "Doyen")]
    Dean, // Supervises departmental resources
    #[serde(rename = "teacher", alias = "Enseignant")]
    Teacher, // Self-service on own requests and projects
    #[serde(rename = "registrar", alias = "Scolarité")]
    Registrar, // Records office, student registration
    #[serde(rename = "librarian", alias = "Bibliothécaire")]
    Librarian, // Library management
}

/// How a role's management rights are scoped when checking a specific resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityTier {
    /// May manage any resource of any type.
    Full,
    /// May manage a resource type wholesale when holding `manage_<type>`.
    Supervisory,
    /// May manage only resources it owns, via `manage_own_<type>`.
    SelfService,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Dean,
        Role::Teacher,
        Role::Registrar,
        Role::Librarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dean => "dean",
            Role::Teacher => "teacher",
            Role::Registrar => "registrar",
            Role::Librarian => "librarian",
        }
    }

    /// Label used by the legacy French-language deployment.
    pub fn legacy_label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrateur",
            Role::Dean => "Doyen",
            Role::Teacher => "Enseignant",
            Role::Registrar => "Scolarité",
            Role::Librarian => "Bibliothécaire",
        }
    }

    /// Parse a role name: an exact wire name or an exact legacy label.
    /// Case variants, padding and other spellings are not roles.
    pub fn from_str(s: &str) -> Option<Self> {
        Role::ALL
            .into_iter()
            .find(|role| s == role.as_str() || s == role.legacy_label())
    }

    pub fn tier(&self) -> AuthorityTier {
        match self {
            Role::Admin => AuthorityTier::Full,
            Role::Dean => AuthorityTier::Supervisory,
            Role::Teacher | Role::Registrar | Role::Librarian => AuthorityTier::SelfService,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let dean = Role::Dean;
        let json = serde_json::to_string(&dean).unwrap();
        assert_eq!(json, r#""dean""#);

        let teacher: Role = serde_json::from_str(r#""teacher""#).unwrap();
        assert_eq!(teacher, Role::Teacher);

        let legacy: Role = serde_json::from_str(r#""Scolarité""#).unwrap();
        assert_eq!(legacy, Role::Registrar);
    }

    #[test]
    fn test_role_string_conversion() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
            assert_eq!(Role::from_str(role.legacy_label()), Some(role));
        }

        assert_eq!(Role::from_str("student"), None);
        assert_eq!(Role::from_str(""), None);
    }

    #[test]
    fn test_near_miss_names_are_not_roles() {
        for name in [
            "ADMIN",
            " admin ",
            "Admin",
            "Administrator",
            "administrateur",
            "DOYEN",
            "doyen",
            "Scolarite",
            "librarian\n",
        ] {
            assert_eq!(Role::from_str(name), None, "{name:?}");
        }
    }

    #[test]
    fn test_authority_tiers() {
        assert_eq!(Role::Admin.tier(), AuthorityTier::Full);
        assert_eq!(Role::Dean.tier(), AuthorityTier::Supervisory);
        assert_eq!(Role::Teacher.tier(), AuthorityTier::SelfService);
        assert_eq!(Role::Registrar.tier(), AuthorityTier::SelfService);
        assert_eq!(Role::Librarian.tier(), AuthorityTier::SelfService);
    }
}
