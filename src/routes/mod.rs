use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod game;
pub mod health;

/// Compose the health, game and documentation trees over the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(game::router(state.clone()))
        .merge(docs::router())
        .with_state(state)
}
