use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, MongoGameListDocument, doc_id, scores_as_bson},
};
use crate::{
    dao::{game_store::GameStore, models::GameListItemEntity, storage::StorageResult},
    scorecard::{Game, HoleUpdate},
};

const GAME_COLLECTION_NAME: &str = "games";

/// MongoDB-backed [`GameStore`]. Clones share the same connection.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept alongside the database handle so the client lives as long as the connection.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let index = IndexModel::builder()
            .keys(doc! {"user_id": 1, "created_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_owner_idx".to_owned()))
                    .build(),
            )
            .build();

        self.collection()
            .await
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "user_id,created_at",
                source,
            })?;

        Ok(())
    }

    async fn collection(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn insert_game(&self, game: Game) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.collection()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::InsertGame { id, source })?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> StorageResult<Option<Game>> {
        let document = self
            .collection()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        document.map(Game::try_from).transpose()
    }

    async fn list_games(&self, owner: String) -> StorageResult<Vec<GameListItemEntity>> {
        let collection = self
            .collection()
            .await
            .clone_with_type::<MongoGameListDocument>();

        let documents: Vec<MongoGameListDocument> = collection
            .find(doc! { "user_id": &owner })
            .projection(MongoGameListDocument::projection())
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|source| MongoDaoError::ListGames {
                owner: owner.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames {
                owner: owner.clone(),
                source,
            })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .collection()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn update_hole(&self, id: Uuid, owner: String, update: HoleUpdate) -> MongoResult<bool> {
        let path = update.field_path();
        let mut filter = doc_id(id);
        filter.insert("user_id", owner);
        filter.insert(path.clone(), doc! { "$exists": true });

        let scores =
            scores_as_bson(update.scores()).map_err(|source| MongoDaoError::EncodeScores {
                id,
                hole: update.hole().to_string(),
                source,
            })?;
        let mut assignment = mongodb::bson::Document::new();
        assignment.insert(path, scores);

        let result = self
            .collection()
            .await
            .update_one(filter, doc! { "$set": assignment })
            .await
            .map_err(|source| MongoDaoError::UpdateHole {
                id,
                hole: update.hole().to_string(),
                source,
            })?;

        debug!(
            game_id = %id,
            hole = %update.hole(),
            matched = result.matched_count,
            "applied hole update"
        );
        Ok(result.matched_count > 0)
    }
}

impl GameStore for MongoGameStore {
    fn insert_game(&self, game: Game) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await })
    }

    fn list_games(
        &self,
        owner: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(owner).await })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn update_hole(
        &self,
        id: Uuid,
        owner: String,
        update: HoleUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_hole(id, owner, update)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
