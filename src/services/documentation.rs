use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scorecard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::create_game,
        crate::routes::game::delete_game,
        crate::routes::game::update_hole_score,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::PlayerInput,
            crate::dto::game::UpdateHoleScoreRequest,
            crate::dto::game::HoleScoreInput,
            crate::dto::game::CreatedGame,
            crate::dto::game::ActionResponse,
            crate::dto::game::GameListItem,
            crate::dto::game::GameResponse,
            crate::dto::game::ScoredPlayerView,
            crate::dto::game::HoleScoreView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Scorecard management for the authenticated user"),
    )
)]
pub struct ApiDoc;
