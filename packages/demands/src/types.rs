// ABOUTME: Demand and article type definitions
// ABOUTME: Entities, request inputs, response projections, and statistics views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use procura_attachments::AttachmentUpload;
use procura_comments::{CommentInput, CommentResponse};
use procura_users::UserSummary;

/// Demand workflow states.
/// CREATED is initial; RESPONSIBLE_REJECTED, TECHNICIAN_REJECTED, and DONE
/// are terminal for this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemandStatus {
    Created,
    ResponsibleApproved,
    ResponsibleRejected,
    TechnicianApproved,
    TechnicianRejected,
    InProgress,
    Done,
}

impl DemandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandStatus::Created => "CREATED",
            DemandStatus::ResponsibleApproved => "RESPONSIBLE_APPROVED",
            DemandStatus::ResponsibleRejected => "RESPONSIBLE_REJECTED",
            DemandStatus::TechnicianApproved => "TECHNICIAN_APPROVED",
            DemandStatus::TechnicianRejected => "TECHNICIAN_REJECTED",
            DemandStatus::InProgress => "IN_PROGRESS",
            DemandStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATED" => Ok(DemandStatus::Created),
            "RESPONSIBLE_APPROVED" => Ok(DemandStatus::ResponsibleApproved),
            "RESPONSIBLE_REJECTED" => Ok(DemandStatus::ResponsibleRejected),
            "TECHNICIAN_APPROVED" => Ok(DemandStatus::TechnicianApproved),
            "TECHNICIAN_REJECTED" => Ok(DemandStatus::TechnicianRejected),
            "IN_PROGRESS" => Ok(DemandStatus::InProgress),
            "DONE" => Ok(DemandStatus::Done),
            other => Err(format!("unknown demand status: {other}")),
        }
    }
}

/// Persisted demand record
#[derive(Debug, Clone)]
pub struct Demand {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: DemandStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub attached_file: Option<String>,
}

/// Persisted line item, exclusively owned by one demand
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: Option<f64>,
    pub demand_id: i64,
}

/// Line-item entry in create/update requests. An entry without an id is a
/// new article; an entry with an id patches the existing one.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleEntry {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub quantity: i64,
}

/// Demand creation request
#[derive(Debug)]
pub struct DemandCreateInput {
    pub title: String,
    pub description: String,
    pub attached_file: Option<AttachmentUpload>,
    pub articles: Vec<ArticleEntry>,
}

/// Demand update request; does not touch status
#[derive(Debug, Clone, Deserialize)]
pub struct DemandUpdateInput {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub articles: Vec<ArticleEntry>,
}

/// Validation decision request. The decision suffix combines with the
/// actor's role to select the target state.
#[derive(Debug, Clone, Deserialize)]
pub struct DemandValidateInput {
    #[serde(rename = "demandStatus")]
    pub decision: String,
    pub comment: CommentInput,
}

/// Quote projection embedded one level deep in demand responses
#[derive(Debug, Clone, Serialize)]
pub struct QuoteSummary {
    pub id: i64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "createdBy")]
    pub created_by: i64,
}

/// Article projection in demand responses
#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: Option<f64>,
}

impl From<&Article> for ArticleResponse {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            name: article.name.clone(),
            description: article.description.clone(),
            quantity: article.quantity,
            price: article.price,
        }
    }
}

/// Full demand projection returned by the engine; embeds related entities
/// exactly one level deep
#[derive(Debug, Clone, Serialize)]
pub struct DemandResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: DemandStatus,
    #[serde(rename = "createdBy")]
    pub created_by: UserSummary,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "attachedFile")]
    pub attached_file: Option<String>,
    pub articles: Vec<ArticleResponse>,
    pub quotes: Vec<QuoteSummary>,
    pub comments: Vec<CommentResponse>,
}

/// Lightweight demand projection embedded in quote responses
#[derive(Debug, Clone, Serialize)]
pub struct DemandSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: DemandStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Demand> for DemandSummary {
    fn from(demand: &Demand) -> Self {
        Self {
            id: demand.id,
            title: demand.title.clone(),
            description: demand.description.clone(),
            status: demand.status,
            created_at: demand.created_at,
        }
    }
}

/// Per-requester demand counts
#[derive(Debug, Clone, Serialize)]
pub struct UserStatistics {
    #[serde(rename = "totalDemandsCreated")]
    pub total_demands_created: i64,
    #[serde(rename = "totalClosedDemands")]
    pub total_closed_demands: i64,
    #[serde(rename = "pendingDemands")]
    pub pending_demands: i64,
    #[serde(rename = "rejectedDemands")]
    pub rejected_demands: i64,
}

/// Global technician workload counts
#[derive(Debug, Clone, Serialize)]
pub struct TechnicianStatistics {
    #[serde(rename = "totalDemandsToValidate")]
    pub total_demands_to_validate: i64,
    #[serde(rename = "validatedDemands")]
    pub validated_demands: i64,
    #[serde(rename = "rejectedDemands")]
    pub rejected_demands: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DemandStatus::Created,
            DemandStatus::ResponsibleApproved,
            DemandStatus::ResponsibleRejected,
            DemandStatus::TechnicianApproved,
            DemandStatus::TechnicianRejected,
            DemandStatus::InProgress,
            DemandStatus::Done,
        ] {
            assert_eq!(status.as_str().parse::<DemandStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("APPROVED".parse::<DemandStatus>().is_err());
        assert!("MANAGER_APPROVED".parse::<DemandStatus>().is_err());
    }
}
