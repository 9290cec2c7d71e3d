use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::{game_store::GameStore, models::GameListItemEntity, storage::StorageResult},
    scorecard::{Game, HoleUpdate},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        CouchGameDocument, FindResponse, find_games_query, game_doc_id, list_items,
        owner_index_definition,
    },
};

/// Attempts made by a read-modify-write before giving up on revision conflicts.
const MAX_CONFLICT_ATTEMPTS: u32 = 3;
/// Rows requested per `_find` page; a shorter page is the last one.
const FIND_PAGE_SIZE: usize = 200;
const FIND: &str = "_find";
const INDEX: &str = "_index";

/// CouchDB-backed [`GameStore`] talking to the HTTP API.
#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    database_url: Arc<str>,
    credentials: Option<Arc<(String, String)>>,
}

impl CouchGameStore {
    /// Build the HTTP client and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let CouchConfig {
            base_url,
            database,
            username,
            password,
        } = config;

        let store = Self {
            client,
            database_url: format!("{}/{}", base_url.trim_end_matches('/'), database).into(),
            credentials: username.zip(password).map(Arc::new),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    /// Request against the database itself (`path` empty) or one of its documents.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            self.database_url.to_string()
        } else {
            format!("{}/{}", self.database_url, path)
        };
        let builder = self.client.request(method, url);
        match self.credentials.as_deref() {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> CouchResult<Response> {
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: path.to_owned(),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let existing = self.send(self.request(Method::GET, ""), "").await?;
        match existing.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                debug!(url = %self.database_url, "creating CouchDB database");
                let created = self.send(self.request(Method::PUT, ""), "").await?;
                expect_success(created, "")?;
            }
            status => return Err(unexpected(status, "")),
        }

        // Posting an existing index definition is a no-op.
        let builder = self.request(Method::POST, INDEX).json(&owner_index_definition());
        expect_success(self.send(builder, INDEX).await?, INDEX)
    }

    async fn fetch<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, doc_id), doc_id).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response
                    .json::<T>()
                    .await
                    .map(Some)
                    .map_err(|source| CouchDaoError::Decode {
                        path: doc_id.to_owned(),
                        source,
                    })
            }
            status => Err(unexpected(status, doc_id)),
        }
    }

    /// Write a document; a stale or missing `_rev` surfaces as [`CouchDaoError::Conflict`].
    async fn save<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .send(self.request(Method::PUT, doc_id).json(document), doc_id)
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(CouchDaoError::Conflict {
                path: doc_id.to_owned(),
            });
        }
        expect_success(response, doc_id)
    }

    /// Summaries of one owner's games, following `_find` bookmarks until a short page.
    async fn owned_games(&self, owner: &str) -> CouchResult<Vec<GameListItemEntity>> {
        let mut items = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let query = find_games_query(owner, FIND_PAGE_SIZE, bookmark.as_deref());
            let response = self
                .send(self.request(Method::POST, FIND).json(&query), FIND)
                .await?;
            if !response.status().is_success() {
                return Err(unexpected(response.status(), FIND));
            }

            let page = response
                .json::<FindResponse>()
                .await
                .map_err(|source| CouchDaoError::Decode {
                    path: FIND.to_owned(),
                    source,
                })?;
            let fetched = page.docs.len();
            items.extend(list_items(FIND, page.docs));

            match page.bookmark {
                Some(next) if fetched == FIND_PAGE_SIZE => bookmark = Some(next),
                _ => break,
            }
        }

        debug!(owner, count = items.len(), "listed games");
        Ok(items)
    }

    async fn remove(&self, id: Uuid) -> CouchResult<bool> {
        let doc_id = game_doc_id(id);
        let Some(existing) = self.fetch::<CouchGameDocument>(&doc_id).await? else {
            return Ok(false);
        };

        let builder = self
            .request(Method::DELETE, &doc_id)
            .query(&[("rev", existing.rev.unwrap_or_default())]);
        let response = self.send(builder, &doc_id).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(unexpected(status, &doc_id)),
        }
    }

    /// CouchDB has no field-path update: the whole document is rewritten under its current
    /// `_rev`, starting over when another writer got there first.
    async fn replace_hole(&self, id: Uuid, owner: &str, update: HoleUpdate) -> CouchResult<bool> {
        let doc_id = game_doc_id(id);
        let hole = update.hole();

        for attempt in 1..=MAX_CONFLICT_ATTEMPTS {
            let Some(mut document) = self.fetch::<CouchGameDocument>(&doc_id).await? else {
                return Ok(false);
            };
            if document.game.user_id != owner {
                return Ok(false);
            }
            let Some(slot) = document.game.holes.get_mut(&hole.to_string()) else {
                return Ok(false);
            };
            *slot = update.scores().to_vec();

            match self.save(&doc_id, &document).await {
                Ok(()) => {
                    debug!(game_id = %id, hole = %hole, attempt, "applied hole update");
                    return Ok(true);
                }
                Err(CouchDaoError::Conflict { .. }) => {
                    warn!(game_id = %id, hole = %hole, attempt, "revision conflict on hole update");
                }
                Err(err) => return Err(err),
            }
        }

        Err(CouchDaoError::ConflictRetriesExhausted {
            path: doc_id,
            attempts: MAX_CONFLICT_ATTEMPTS,
        })
    }
}

fn unexpected(status: StatusCode, path: &str) -> CouchDaoError {
    CouchDaoError::UnexpectedStatus {
        path: path.to_owned(),
        status,
    }
}

fn expect_success(response: Response, path: &str) -> CouchResult<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(unexpected(response.status(), path))
    }
}

impl GameStore for CouchGameStore {
    fn insert_game(&self, game: Game) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = game_doc_id(game.id);
            let document = CouchGameDocument::from(game);
            Ok(store.save(&doc_id, &document).await?)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<Game>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.fetch::<CouchGameDocument>(&game_doc_id(id)).await?;
            document.map(CouchGameDocument::into_entity).transpose()
        })
    }

    fn list_games(
        &self,
        owner: String,
    ) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.owned_games(&owner).await?) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.remove(id).await?) })
    }

    fn update_hole(
        &self,
        id: Uuid,
        owner: String,
        update: HoleUpdate,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.replace_hole(id, &owner, update).await?) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let response = store.send(store.request(Method::HEAD, ""), "").await?;
            Ok(expect_success(response, "")?)
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.ensure_database().await?) })
    }
}
