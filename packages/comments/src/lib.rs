// ABOUTME: Append-only audit comment ledger
// ABOUTME: Every validation decision is recorded here; comments are never edited or deleted

pub mod storage;
pub mod types;

pub use storage::CommentStorage;
pub use types::{Comment, CommentInput, CommentResponse, CommentTarget, CommentType, NewComment};
