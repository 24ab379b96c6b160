// src/utils/access.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Account role, stored as `'user'` / `'admin'` in the `users` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn grants(self, capability: Capability) -> bool {
        match self {
            Role::Admin => true,
            Role::User => matches!(
                capability,
                Capability::SubmitAnswers | Capability::RecordProgress
            ),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a protected route may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, edit and delete quizzes and questions.
    ManageCatalog,
    /// Read every user's quiz results.
    ReadAllResults,
    SubmitAnswers,
    RecordProgress,
}

/// The authenticated identity attached to a request after token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Checks a capability against the principal's role. Reads nothing but the principal.
pub fn authorize(principal: &Principal, capability: Capability) -> Result<(), AppError> {
    if principal.role.grants(capability) {
        Ok(())
    } else {
        tracing::debug!(
            user_id = principal.user_id,
            ?capability,
            "Capability denied"
        );
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: 7,
            username: "learner".to_string(),
            role,
        }
    }

    #[test]
    fn admin_holds_every_capability() {
        let admin = principal(Role::Admin);
        for cap in [
            Capability::ManageCatalog,
            Capability::ReadAllResults,
            Capability::SubmitAnswers,
            Capability::RecordProgress,
        ] {
            assert!(authorize(&admin, cap).is_ok());
        }
    }

    #[test]
    fn user_cannot_manage_catalog() {
        let user = principal(Role::User);
        assert!(matches!(
            authorize(&user, Capability::ManageCatalog),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            authorize(&user, Capability::ReadAllResults),
            Err(AppError::Forbidden)
        ));
        assert!(authorize(&user, Capability::SubmitAnswers).is_ok());
        assert!(authorize(&user, Capability::RecordProgress).is_ok());
    }

    #[test]
    fn role_round_trips_through_its_column_value() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }
}
