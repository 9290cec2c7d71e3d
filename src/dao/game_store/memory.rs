//! Process-local game store used for development runs and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::GameListItemEntity, storage::StorageResult},
    scorecard::{Game, HoleUpdate},
};

/// In-memory store backed by a concurrent map. Clones share the same games.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<DashMap<Uuid, Game>>,
}

impl InMemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of games currently stored.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the store holds no game at all.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Copy of the stored game, bypassing the async interface.
    pub fn get(&self, id: Uuid) -> Option<Game> {
        self.games.get(&id).map(|entry| entry.value().clone())
    }

    fn update_hole_sync(&self, id: Uuid, owner: &str, update: HoleUpdate) -> bool {
        match self.games.get_mut(&id) {
            Some(mut game) if game.user_id == owner => update.apply_to(&mut game.holes),
            _ => false,
        }
    }
}

impl GameStore for InMemoryGameStore {
    fn insert_game(&self, game: Game) -> BoxFuture<'static, StorageResult<()>> {
        let games = self.games.clone();
        Box::pin(async move {
            games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.get(id)) })
    }

    fn list_games(
        &self,
        owner: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let games = self.games.clone();
        Box::pin(async move {
            Ok(games
                .iter()
                .filter(|entry| entry.user_id == owner)
                .map(|entry| GameListItemEntity::from(entry.value()))
                .collect())
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let games = self.games.clone();
        Box::pin(async move { Ok(games.remove(&id).is_some()) })
    }

    fn update_hole(
        &self,
        id: Uuid,
        owner: String,
        update: HoleUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.update_hole_sync(id, &owner, update)) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::scorecard::{HoleKey, HoleScore, Player, ScorecardIndex, build_hole_update, initialize};

    fn game(owner: &str, title: &str) -> Game {
        let (players, holes) = initialize(
            vec![Player {
                name: "A".into(),
                uid: None,
            }],
            2,
        );
        Game {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: SystemTime::now(),
            user_id: owner.into(),
            players,
            holes,
        }
    }

    fn recorded(value: i32) -> Vec<HoleScore> {
        vec![HoleScore {
            scorecard_index: ScorecardIndex::new(0),
            score: Some(value),
            name: None,
        }]
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let store = InMemoryGameStore::new();
        store.insert_game(game("alice", "one")).await.unwrap();
        store.insert_game(game("alice", "two")).await.unwrap();
        store.insert_game(game("bob", "three")).await.unwrap();

        let mut titles: Vec<String> = store
            .list_games("alice".into())
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect();
        titles.sort();

        assert_eq!(titles, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn update_requires_owner_and_existing_hole() {
        let store = InMemoryGameStore::new();
        let game = game("alice", "round");
        let id = game.id;
        store.insert_game(game).await.unwrap();

        let update = build_hole_update(HoleKey::new(1), recorded(4));
        assert!(!store.update_hole(id, "bob".into(), update.clone()).await.unwrap());
        assert!(!store
            .update_hole(Uuid::new_v4(), "alice".into(), update.clone())
            .await
            .unwrap());
        let missing_hole = build_hole_update(HoleKey::new(3), recorded(4));
        assert!(!store.update_hole(id, "alice".into(), missing_hole).await.unwrap());
        assert!(store.get(id).unwrap().holes[&HoleKey::new(1)][0].score.is_none());

        assert!(store.update_hole(id, "alice".into(), update).await.unwrap());
        assert_eq!(store.get(id).unwrap().holes[&HoleKey::new(1)], recorded(4));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = InMemoryGameStore::new();
        let game = game("alice", "round");
        let id = game.id;
        store.insert_game(game).await.unwrap();

        assert!(store.delete_game(id).await.unwrap());
        assert!(!store.delete_game(id).await.unwrap());
        assert!(store.is_empty());
    }
}
