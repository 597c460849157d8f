// ABOUTME: Quote lifecycle operations
// ABOUTME: Create/update/validate plus the manage step that closes quote and demand together

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use procura_attachments::{UploadError, Uploader};
use procura_comments::{storage::append_in, CommentStorage, CommentTarget, CommentType, NewComment};
use procura_core::{PageRequest, PaginatedResponse};
use procura_demands::{force_status, DemandStatus, DemandStorage, DemandSummary};
use procura_storage::StorageError;
use procura_users::{UserStorage, UserSummary};

use crate::storage::{fulfill_in, set_status_in, NewQuote, QuoteStorage};
use crate::types::{
    ProviderStatistics, Quote, QuoteCreateInput, QuoteManageInput, QuoteResponse, QuoteStatus,
    QuoteUpdateInput, QuoteValidateInput,
};

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("Invalid quote state: {0}")]
    InvalidState(String),
    #[error("Attachment upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl QuoteError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<StorageError> for QuoteError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, key } => QuoteError::NotFound { entity, key },
            other => QuoteError::Storage(other),
        }
    }
}

pub type QuoteResult<T> = Result<T, QuoteError>;

/// Quote lifecycle engine
pub struct QuoteManager {
    storage: QuoteStorage,
    demands: DemandStorage,
    users: UserStorage,
    comments: CommentStorage,
    uploader: Arc<dyn Uploader>,
}

impl QuoteManager {
    pub fn new(
        storage: QuoteStorage,
        demands: DemandStorage,
        users: UserStorage,
        comments: CommentStorage,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            storage,
            demands,
            users,
            comments,
            uploader,
        }
    }

    /// Create an offer against a demand
    pub async fn create(
        &self,
        input: QuoteCreateInput,
        creator_email: &str,
    ) -> QuoteResult<QuoteResponse> {
        let creator = self.get_user(creator_email).await?;

        if !self.demands.exists(input.demand_id).await? {
            return Err(QuoteError::not_found("Demand", input.demand_id));
        }

        let quote = self
            .storage
            .create(NewQuote {
                created_by: creator.id,
                demand_id: input.demand_id,
                total_amount: input.total_amount,
            })
            .await?;

        info!(
            "Quote {} created by {} against demand {} for {:.2}",
            quote.id, creator.email, quote.demand_id, quote.total_amount
        );

        self.to_response(quote).await
    }

    /// Amend the offer amount. Amending restarts the review: status goes
    /// back to CREATED whatever it was.
    pub async fn update(&self, input: QuoteUpdateInput) -> QuoteResult<QuoteResponse> {
        self.storage
            .update_amount(input.id, input.total_amount)
            .await?;

        let quote = self.get_quote(input.id).await?;
        self.to_response(quote).await
    }

    /// Record a validation decision. Unlike demands, the caller passes the
    /// literal target status token; the status change commits atomically
    /// with its audit comment.
    pub async fn validate(
        &self,
        input: QuoteValidateInput,
        actor_email: &str,
    ) -> QuoteResult<QuoteResponse> {
        let actor = self.get_user(actor_email).await?;

        let quote_id = input
            .comment
            .quote_id
            .ok_or_else(|| QuoteError::not_found("Quote", "missing quote id"))?;

        let next: QuoteStatus = input
            .status
            .parse()
            .map_err(|_| QuoteError::InvalidState(input.status.to_ascii_uppercase()))?;

        let comment_type: CommentType = input
            .comment
            .comment_type
            .parse()
            .map_err(QuoteError::InvalidState)?;

        let quote = self.get_quote(quote_id).await?;

        if quote.status == QuoteStatus::Done {
            warn!("Quote {} validated to {} after DONE", quote.id, next);
        }

        let mut tx = self
            .storage
            .pool()
            .begin()
            .await
            .map_err(StorageError::Sqlx)?;

        set_status_in(&mut tx, quote.id, next).await?;
        append_in(
            &mut *tx,
            NewComment {
                content: input.comment.content,
                comment_type,
                author_id: actor.id,
                target: CommentTarget::Quote(quote.id),
            },
        )
        .await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Quote {} validated to {} by {} ({})",
            quote.id, next, actor.email, actor.role
        );

        let quote = self.get_quote(quote_id).await?;
        self.to_response(quote).await
    }

    /// Fulfillment: close the quote and its parent demand together. The
    /// document upload happens before the transaction; the two DONE writes
    /// commit as one unit.
    pub async fn manage(&self, input: QuoteManageInput) -> QuoteResult<QuoteResponse> {
        let quote = self.get_quote(input.quote_id).await?;

        let fulfillment_file = match &input.attached_file {
            Some(upload) => Some(self.uploader.upload(&upload.bytes, &upload.filename).await?),
            None => None,
        };

        let mut tx = self
            .storage
            .pool()
            .begin()
            .await
            .map_err(StorageError::Sqlx)?;

        fulfill_in(&mut tx, quote.id, fulfillment_file.as_deref()).await?;
        force_status(&mut tx, quote.demand_id, DemandStatus::Done).await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Quote {} fulfilled; demand {} closed",
            quote.id, quote.demand_id
        );

        let quote = self.get_quote(input.quote_id).await?;
        self.to_response(quote).await
    }

    pub async fn find_by_id(&self, id: i64) -> QuoteResult<QuoteResponse> {
        let quote = self.get_quote(id).await?;
        self.to_response(quote).await
    }

    /// List quotes newest first with the standard pagination contract
    pub async fn find_all(
        &self,
        params: &PageRequest,
    ) -> QuoteResult<PaginatedResponse<QuoteResponse>> {
        let (quotes, total) = self.storage.list(params).await?;

        let mut responses = Vec::with_capacity(quotes.len());
        for quote in quotes {
            responses.push(self.to_response(quote).await?);
        }

        Ok(PaginatedResponse::new(responses, params, total))
    }

    /// Quote counts scoped to the given provider
    pub async fn provider_stats(&self, email: &str) -> QuoteResult<ProviderStatistics> {
        let provider = self.get_user(email).await?;

        let created = self.storage.count_by_creator(provider.id).await?;
        let approved = self
            .storage
            .count_by_creator_in_status(provider.id, QuoteStatus::Approved)
            .await?;
        let pending = self
            .storage
            .count_by_creator_in_status(provider.id, QuoteStatus::Created)
            .await?;
        let rejected = self
            .storage
            .count_by_creator_in_status(provider.id, QuoteStatus::Rejected)
            .await?;

        Ok(ProviderStatistics {
            total_quotes_created: created,
            total_accepted_quotes: approved,
            quotes_pending_validation: pending,
            rejected_quotes: rejected,
        })
    }

    async fn get_user(&self, email: &str) -> QuoteResult<procura_users::AppUser> {
        self.users
            .find_by_email(email)
            .await?
            .ok_or_else(|| QuoteError::not_found("User", email))
    }

    async fn get_quote(&self, id: i64) -> QuoteResult<Quote> {
        self.storage
            .find_by_id(id)
            .await?
            .ok_or_else(|| QuoteError::not_found("Quote", id))
    }

    async fn to_response(&self, quote: Quote) -> QuoteResult<QuoteResponse> {
        let creator = self
            .users
            .find_by_id(quote.created_by)
            .await?
            .ok_or_else(|| QuoteError::not_found("User", quote.created_by))?;

        let demand = self
            .demands
            .find_by_id(quote.demand_id)
            .await?
            .ok_or_else(|| QuoteError::not_found("Demand", quote.demand_id))?;

        let comments = self.comments.list_for_quote(quote.id).await?;

        Ok(QuoteResponse {
            id: quote.id,
            created_by: UserSummary::from(&creator),
            created_at: quote.created_at,
            total_amount: quote.total_amount,
            status: quote.status,
            demand: DemandSummary::from(&demand),
            fulfillment_file: quote.fulfillment_file,
            comments,
        })
    }
}
