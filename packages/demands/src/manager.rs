// ABOUTME: Demand lifecycle operations
// ABOUTME: Create/update/validate with atomic status+comment writes, plus statistics

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use procura_attachments::{UploadError, Uploader};
use procura_comments::{storage::append_in, CommentStorage, CommentTarget, CommentType, NewComment};
use procura_core::{PageRequest, PaginatedResponse};
use procura_storage::StorageError;
use procura_users::{AppRole, UserStorage, UserSummary};

use crate::storage::{force_status, DemandStorage, NewDemand};
use crate::types::{
    Demand, DemandCreateInput, DemandResponse, DemandStatus, DemandUpdateInput,
    DemandValidateInput, TechnicianStatistics, UserStatistics,
};
use crate::workflow::{decide, expected_predecessor, Decision};

#[derive(Error, Debug)]
pub enum DemandError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("Invalid demand state: {0}")]
    InvalidState(String),
    #[error("Attachment upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl DemandError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<StorageError> for DemandError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, key } => DemandError::NotFound { entity, key },
            other => DemandError::Storage(other),
        }
    }
}

pub type DemandResult<T> = Result<T, DemandError>;

/// Demand lifecycle engine
pub struct DemandManager {
    storage: DemandStorage,
    users: UserStorage,
    comments: CommentStorage,
    uploader: Arc<dyn Uploader>,
}

impl DemandManager {
    pub fn new(
        storage: DemandStorage,
        users: UserStorage,
        comments: CommentStorage,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            storage,
            users,
            comments,
            uploader,
        }
    }

    /// Create a demand with its articles. A demand created by a RESPONSIBLE
    /// starts at RESPONSIBLE_APPROVED: the creator's own sign-off counts.
    pub async fn create(
        &self,
        input: DemandCreateInput,
        creator_email: &str,
    ) -> DemandResult<DemandResponse> {
        let creator = self.get_user(creator_email).await?;

        // Upload before any state is committed so a failed upload aborts
        // the whole operation
        let attached_file = match &input.attached_file {
            Some(upload) => Some(self.uploader.upload(&upload.bytes, &upload.filename).await?),
            None => None,
        };

        let status = if creator.role == AppRole::Responsible {
            DemandStatus::ResponsibleApproved
        } else {
            DemandStatus::Created
        };

        let demand = self
            .storage
            .create(
                NewDemand {
                    title: input.title,
                    description: input.description,
                    status,
                    created_by: creator.id,
                    attached_file,
                },
                &input.articles,
            )
            .await?;

        info!(
            "Created demand {} '{}' at {} for {}",
            demand.id, demand.title, demand.status, creator.email
        );

        self.to_response(demand).await
    }

    /// Rewrite title/description and upsert articles. Status is untouched.
    pub async fn update(&self, input: DemandUpdateInput) -> DemandResult<DemandResponse> {
        self.storage.update(&input).await?;

        let demand = self.get_demand(input.id).await?;
        self.to_response(demand).await
    }

    /// Record a validation decision: the actor's role and the supplied
    /// suffix select the target state from the transition table, and the
    /// status change commits atomically with its audit comment.
    pub async fn validate(
        &self,
        input: DemandValidateInput,
        actor_email: &str,
    ) -> DemandResult<DemandResponse> {
        let actor = self.get_user(actor_email).await?;

        let demand_id = input
            .comment
            .demand_id
            .ok_or_else(|| DemandError::not_found("Demand", "missing demand id"))?;

        let decision: Decision = input.decision.parse().map_err(|_| {
            DemandError::InvalidState(format!(
                "{}_{}",
                actor.role,
                input.decision.to_ascii_uppercase()
            ))
        })?;

        let next = decide(actor.role, decision)
            .ok_or_else(|| DemandError::InvalidState(format!("{}_{}", actor.role, decision)))?;

        let comment_type: CommentType = input
            .comment
            .comment_type
            .parse()
            .map_err(DemandError::InvalidState)?;

        let demand = self.get_demand(demand_id).await?;

        if expected_predecessor(next) != Some(demand.status) {
            warn!(
                "Demand {} validated to {} from {} (expected {:?})",
                demand.id,
                next,
                demand.status,
                expected_predecessor(next)
            );
        }

        let mut tx = self
            .storage
            .pool()
            .begin()
            .await
            .map_err(StorageError::Sqlx)?;

        force_status(&mut tx, demand.id, next).await?;
        append_in(
            &mut *tx,
            NewComment {
                content: input.comment.content,
                comment_type,
                author_id: actor.id,
                target: CommentTarget::Demand(demand.id),
            },
        )
        .await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Demand {} validated to {} by {} ({})",
            demand.id, next, actor.email, actor.role
        );

        let demand = self.get_demand(demand_id).await?;
        self.to_response(demand).await
    }

    /// Privileged status write, used by the quote engine on fulfillment.
    /// Bypasses the transition table and appends no comment.
    pub async fn update_status(&self, id: i64, status: DemandStatus) -> DemandResult<()> {
        self.storage.set_status(id, status).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> DemandResult<DemandResponse> {
        let demand = self.get_demand(id).await?;
        self.to_response(demand).await
    }

    /// List demands newest first with the standard pagination contract
    pub async fn find_all(
        &self,
        params: &PageRequest,
    ) -> DemandResult<PaginatedResponse<DemandResponse>> {
        let (demands, total) = self.storage.list(params).await?;

        let mut responses = Vec::with_capacity(demands.len());
        for demand in demands {
            responses.push(self.to_response(demand).await?);
        }

        Ok(PaginatedResponse::new(responses, params, total))
    }

    /// Demand counts scoped to the given requester
    pub async fn user_stats(&self, email: &str) -> DemandResult<UserStatistics> {
        let user = self.get_user(email).await?;

        let created = self.storage.count_by_creator(user.id).await?;
        let closed = self
            .storage
            .count_by_creator_in_statuses(user.id, &[DemandStatus::Done])
            .await?;
        let pending = self
            .storage
            .count_by_creator_in_statuses(
                user.id,
                &[
                    DemandStatus::Created,
                    DemandStatus::ResponsibleApproved,
                    DemandStatus::TechnicianApproved,
                    DemandStatus::InProgress,
                ],
            )
            .await?;
        let rejected = self
            .storage
            .count_by_creator_in_statuses(
                user.id,
                &[
                    DemandStatus::ResponsibleRejected,
                    DemandStatus::TechnicianRejected,
                ],
            )
            .await?;

        Ok(UserStatistics {
            total_demands_created: created,
            total_closed_demands: closed,
            pending_demands: pending,
            rejected_demands: rejected,
        })
    }

    /// Global technician workload counts
    pub async fn tech_stats(&self) -> DemandResult<TechnicianStatistics> {
        let awaiting = self
            .storage
            .count_in_status(DemandStatus::ResponsibleApproved)
            .await?;
        let validated = self
            .storage
            .count_in_status(DemandStatus::TechnicianApproved)
            .await?;
        let rejected = self
            .storage
            .count_in_status(DemandStatus::TechnicianRejected)
            .await?;

        Ok(TechnicianStatistics {
            total_demands_to_validate: awaiting,
            validated_demands: validated,
            rejected_demands: rejected,
        })
    }

    async fn get_user(&self, email: &str) -> DemandResult<procura_users::AppUser> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| DemandError::not_found("User", email))
    }

    async fn get_demand(&self, id: i64) -> DemandResult<Demand> {
        self.storage
            .find_by_id(id)
            .await?
            .ok_or_else(|| DemandError::not_found("Demand", id))
    }

    /// Assemble the response projection, embedding related entities one
    /// level deep
    async fn to_response(&self, demand: Demand) -> DemandResult<DemandResponse> {
        let creator = self
            .users
            .find_by_id(demand.created_by)
            .await?
            .ok_or_else(|| DemandError::not_found("User", demand.created_by))?;

        let articles = self.storage.fetch_articles(demand.id).await?;
        let quotes = self.storage.fetch_quote_summaries(demand.id).await?;
        let comments = self.comments.list_for_demand(demand.id).await?;

        Ok(DemandResponse {
            id: demand.id,
            title: demand.title,
            description: demand.description,
            status: demand.status,
            created_by: UserSummary::from(&creator),
            created_at: demand.created_at,
            attached_file: demand.attached_file,
            articles: articles.iter().map(Into::into).collect(),
            quotes,
            comments,
        })
    }
}
