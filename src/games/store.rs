//! Storage abstraction for the games catalog.

use async_trait::async_trait;
use thiserror::Error;

use crate::games::types::{Game, GameId, GamePatch, NewGame};

/// Errors that can occur while talking to a games store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store understood the request and refused it.
    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a usable answer.
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a body we could not decode.
    #[error("invalid store response: {0}")]
    Decode(String),

    /// A write succeeded but no row was returned.
    #[error("store returned no row")]
    EmptyResponse,

    /// The client could not be constructed from configuration.
    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for game records.
///
/// Injected into the router as `Arc<dyn GameStore>`.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// All games, newest release first.
    async fn list(&self) -> StoreResult<Vec<Game>>;

    async fn get(&self, id: GameId) -> StoreResult<Option<Game>>;

    async fn insert(&self, game: NewGame) -> StoreResult<Game>;

    /// Returns `None` when no row has `id`.
    async fn update(&self, id: GameId, patch: GamePatch) -> StoreResult<Option<Game>>;

    /// Deleting a missing row is not an error.
    async fn delete(&self, id: GameId) -> StoreResult<()>;
}
