//! In-process games store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::games::store::{GameStore, StoreResult};
use crate::games::types::{Game, GameId, GamePatch, NewGame};

/// A `GameStore` kept entirely in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<GameId, Game>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows, keeping their ids.
    pub fn with_games(games: impl IntoIterator<Item = Game>) -> Self {
        let mut inner = Inner::default();
        for game in games {
            inner.last_id = inner.last_id.max(game.id.0);
            inner.rows.insert(game.id, game);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Game>> {
        let inner = self.inner.read().await;
        let mut games: Vec<Game> = inner.rows.values().cloned().collect();
        games.sort_by(|a, b| b.release_year.cmp(&a.release_year));
        Ok(games)
    }

    async fn get(&self, id: GameId) -> StoreResult<Option<Game>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, game: NewGame) -> StoreResult<Game> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let game = game.into_game(GameId(inner.last_id));
        inner.rows.insert(game.id, game.clone());
        Ok(game)
    }

    async fn update(&self, id: GameId, patch: GamePatch) -> StoreResult<Option<Game>> {
        let mut inner = self.inner.write().await;
        Ok(inner.rows.get_mut(&id).map(|game| {
            patch.apply(game);
            game.clone()
        }))
    }

    async fn delete(&self, id: GameId) -> StoreResult<()> {
        self.inner.write().await.rows.remove(&id);
        Ok(())
    }
}
