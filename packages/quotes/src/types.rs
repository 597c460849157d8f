// ABOUTME: Quote type definitions
// ABOUTME: Entity, request inputs, response projection, and provider statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use procura_attachments::AttachmentUpload;
use procura_comments::{CommentInput, CommentResponse};
use procura_demands::DemandSummary;
use procura_users::UserSummary;

/// Quote workflow states. CREATED is initial, DONE is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Created,
    Approved,
    Rejected,
    Done,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Created => "CREATED",
            QuoteStatus::Approved => "APPROVED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATED" => Ok(QuoteStatus::Created),
            "APPROVED" => Ok(QuoteStatus::Approved),
            "REJECTED" => Ok(QuoteStatus::Rejected),
            "DONE" => Ok(QuoteStatus::Done),
            other => Err(format!("unknown quote status: {other}")),
        }
    }
}

/// Persisted quote record
#[derive(Debug, Clone)]
pub struct Quote {
    pub id: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub total_amount: f64,
    pub status: QuoteStatus,
    pub demand_id: i64,
    pub fulfillment_file: Option<String>,
}

/// Quote creation request
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteCreateInput {
    #[serde(rename = "demandId")]
    pub demand_id: i64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}

/// Amend an offer; amending restarts its review from CREATED
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteUpdateInput {
    pub id: i64,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
}

/// Validation request: the caller supplies the literal target status token
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteValidateInput {
    #[serde(rename = "quoteStatus")]
    pub status: String,
    pub comment: CommentInput,
}

/// Fulfillment request, restricted to the MANAGER role at the boundary
#[derive(Debug)]
pub struct QuoteManageInput {
    pub quote_id: i64,
    pub attached_file: Option<AttachmentUpload>,
}

/// Full quote projection; embeds related entities one level deep
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub id: i64,
    #[serde(rename = "createdBy")]
    pub created_by: UserSummary,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub status: QuoteStatus,
    pub demand: DemandSummary,
    #[serde(rename = "fulfillmentFile")]
    pub fulfillment_file: Option<String>,
    pub comments: Vec<CommentResponse>,
}

/// Per-provider quote counts
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatistics {
    #[serde(rename = "totalQuotesCreated")]
    pub total_quotes_created: i64,
    #[serde(rename = "totalAcceptedQuotes")]
    pub total_accepted_quotes: i64,
    #[serde(rename = "quotesPendingValidation")]
    pub quotes_pending_validation: i64,
    #[serde(rename = "rejectedQuotes")]
    pub rejected_quotes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            QuoteStatus::Created,
            QuoteStatus::Approved,
            QuoteStatus::Rejected,
            QuoteStatus::Done,
        ] {
            assert_eq!(status.as_str().parse::<QuoteStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert!("PENDING".parse::<QuoteStatus>().is_err());
    }
}
