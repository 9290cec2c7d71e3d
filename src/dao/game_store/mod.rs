#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    dao::{models::GameListItemEntity, storage::StorageResult},
    scorecard::{Game, HoleUpdate},
};

/// Abstraction over the document store holding scorecards.
pub trait GameStore: Send + Sync {
    /// Persist a freshly created game.
    fn insert_game(&self, game: Game) -> BoxFuture<'static, StorageResult<()>>;
    /// Load a game by id regardless of its owner, `None` when it does not exist.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>>;
    /// Summaries of every game owned by `owner`.
    fn list_games(&self, owner: String)
    -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>>;
    /// Remove a game, returning whether it existed.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Apply a hole update to the game `id` owned by `owner` in a single write.
    ///
    /// Returns `false` when no such game exists or when it has no hole with the targeted key.
    fn update_hole(
        &self,
        id: Uuid,
        owner: String,
        update: HoleUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap round-trip used by the supervisor to detect a lost connection.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
