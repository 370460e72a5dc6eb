use utoipa::OpenApi;

#[derive(OpenApi)]
/// OpenAPI document of the league console.
#[openapi(
    info(
        title = "League Console",
        description = "Live-match console between the league frontends and the league backend"
    ),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::public::live_matches,
        crate::routes::public::live_match,
        crate::routes::public::tournaments,
        crate::routes::public::standings,
        crate::routes::public::top_scorers,
        crate::routes::public::history,
        crate::routes::public::fixtures,
        crate::routes::public::teams,
        crate::routes::public::lineup,
        crate::routes::auth::identity_settings,
        crate::routes::auth::profile,
        crate::routes::auth::current_user,
        crate::routes::auth::sync_user,
        crate::routes::admin::list_matches,
        crate::routes::admin::refresh_matches,
        crate::routes::admin::create_live_match,
        crate::routes::admin::lifecycle_command,
        crate::routes::admin::change_stage,
        crate::routes::admin::register_goal,
        crate::routes::admin::create_club,
        crate::routes::admin::create_players,
        crate::routes::admin::create_tournament,
        crate::routes::admin::create_history_match,
        crate::routes::admin::team_lineup,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::MatchesRefreshedEvent,
            crate::dto::sse::ClockTickEvent,
            crate::dto::sse::CommandAppliedEvent,
            crate::dto::common::ClockView,
            crate::state::state_machine::MatchStatus,
            crate::state::state_machine::MatchStage,
            crate::state::state_machine::TeamSide,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "public", description = "Anonymous viewer data"),
        (name = "admin", description = "Operator commands and data entry"),
        (name = "auth", description = "Identity sync with the league backend"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
/// OpenAPI description of every route.
pub struct ApiDoc;
