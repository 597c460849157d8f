// ABOUTME: User type definitions
// ABOUTME: Roles, account records, and response projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to an account. Determines which workflow transitions the
/// actor may trigger; enforced at the API boundary, trusted below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppRole {
    Admin,
    Agent,
    Responsible,
    Technician,
    Provider,
    Manager,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Admin => "ADMIN",
            AppRole::Agent => "AGENT",
            AppRole::Responsible => "RESPONSIBLE",
            AppRole::Technician => "TECHNICIAN",
            AppRole::Provider => "PROVIDER",
            AppRole::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(AppRole::Admin),
            "AGENT" => Ok(AppRole::Agent),
            "RESPONSIBLE" => Ok(AppRole::Responsible),
            "TECHNICIAN" => Ok(AppRole::Technician),
            "PROVIDER" => Ok(AppRole::Provider),
            "MANAGER" => Ok(AppRole::Manager),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Full account record, including the credential hash. Never serialized to
/// callers; project through UserResponse or UserSummary instead.
#[derive(Debug, Clone)]
pub struct AppUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AppRole,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AppRole,
}

/// Registration request as received from the API layer
#[derive(Debug, Clone, Deserialize)]
pub struct UserRegisterInput {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: AppRole,
}

/// Full user projection returned by user endpoints
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub role: AppRole,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Lightweight projection embedded in demand/quote/comment responses
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub role: AppRole,
}

impl From<&AppUser> for UserResponse {
    fn from(user: &AppUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<&AppUser> for UserSummary {
    fn from(user: &AppUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            AppRole::Admin,
            AppRole::Agent,
            AppRole::Responsible,
            AppRole::Technician,
            AppRole::Provider,
            AppRole::Manager,
        ] {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("provider".parse::<AppRole>().unwrap(), AppRole::Provider);
        assert!("SUPERVISOR".parse::<AppRole>().is_err());
    }
}
