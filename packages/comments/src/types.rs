// ABOUTME: Comment type definitions
// ABOUTME: Audit records with a tagged-union attachment target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use procura_users::UserSummary;

/// Kind of decision a comment documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommentType {
    Approved,
    Rejected,
}

impl CommentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentType::Approved => "APPROVED",
            CommentType::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CommentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "APPROVED" => Ok(CommentType::Approved),
            "REJECTED" => Ok(CommentType::Rejected),
            other => Err(format!("unknown comment type: {other}")),
        }
    }
}

/// What a comment is attached to. Exactly one target, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Demand(i64),
    Quote(i64),
}

impl CommentTarget {
    pub fn demand_id(&self) -> Option<i64> {
        match self {
            CommentTarget::Demand(id) => Some(*id),
            CommentTarget::Quote(_) => None,
        }
    }

    pub fn quote_id(&self) -> Option<i64> {
        match self {
            CommentTarget::Demand(_) => None,
            CommentTarget::Quote(id) => Some(*id),
        }
    }
}

/// Persisted audit record
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: i64,
    pub created_by: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub comment_type: CommentType,
    pub target: CommentTarget,
}

/// Insert payload for the ledger
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub comment_type: CommentType,
    pub author_id: i64,
    pub target: CommentTarget,
}

/// Comment payload as received from the API layer; carries the target as a
/// pair of optional ids, which must resolve to exactly one
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub content: String,
    #[serde(rename = "type")]
    pub comment_type: String,
    #[serde(rename = "demandId")]
    pub demand_id: Option<i64>,
    #[serde(rename = "quoteId")]
    pub quote_id: Option<i64>,
}

impl CommentInput {
    /// Collapse the two optional ids into the typed target
    pub fn target(&self) -> Result<CommentTarget, String> {
        match (self.demand_id, self.quote_id) {
            (Some(id), None) => Ok(CommentTarget::Demand(id)),
            (None, Some(id)) => Ok(CommentTarget::Quote(id)),
            (Some(_), Some(_)) => Err("comment targets both a demand and a quote".to_string()),
            (None, None) => Err("comment targets neither a demand nor a quote".to_string()),
        }
    }
}

/// Projection embedded in demand/quote responses
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    #[serde(rename = "createdBy")]
    pub created_by: UserSummary,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    #[serde(rename = "demandId")]
    pub demand_id: Option<i64>,
    #[serde(rename = "quoteId")]
    pub quote_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(demand_id: Option<i64>, quote_id: Option<i64>) -> CommentInput {
        CommentInput {
            content: "ok".to_string(),
            comment_type: "APPROVED".to_string(),
            demand_id,
            quote_id,
        }
    }

    #[test]
    fn test_target_requires_exactly_one_id() {
        assert_eq!(input(Some(1), None).target(), Ok(CommentTarget::Demand(1)));
        assert_eq!(input(None, Some(2)).target(), Ok(CommentTarget::Quote(2)));
        assert!(input(Some(1), Some(2)).target().is_err());
        assert!(input(None, None).target().is_err());
    }

    #[test]
    fn test_comment_type_parse() {
        assert_eq!("approved".parse::<CommentType>().unwrap(), CommentType::Approved);
        assert!("MAYBE".parse::<CommentType>().is_err());
    }
}
