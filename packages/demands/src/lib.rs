// ABOUTME: Demand lifecycle engine
// ABOUTME: Owns demands and their articles, the approval state machine, and requester/technician statistics

pub mod manager;
pub mod storage;
pub mod types;
pub mod workflow;

pub use manager::{DemandError, DemandManager, DemandResult};
pub use storage::{force_status, DemandStorage};
pub use types::{
    Article, ArticleEntry, ArticleResponse, Demand, DemandCreateInput, DemandResponse,
    DemandStatus, DemandSummary, DemandUpdateInput, DemandValidateInput, QuoteSummary,
    TechnicianStatistics, UserStatistics,
};
pub use workflow::{decide, expected_predecessor, Decision};
