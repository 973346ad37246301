//! Games catalog subsystem.
//!
//! # Data Flow
//! ```text
//! /api/games[/{id}]
//!     → handlers.rs (extract, presence checks)
//!     → Arc<dyn GameStore> (injected through AppState)
//!         → rest.rs (PostgREST over HTTPS)
//!         → memory.rs (in-process)
//!     → ApiError mapping at the handler boundary
//! ```

pub mod handlers;
pub mod memory;
pub mod rest;
pub mod store;
pub mod types;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{GameStore, StoreError, StoreResult};
pub use types::{Game, GameId, GameInput, GamePatch, NewGame};
