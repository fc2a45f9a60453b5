use crate::api::handlers;
use crate::core::theater::TheaterService;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub service: TheaterService,
}

impl AppState {
    pub fn new(service: TheaterService) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/room/",
            get(handlers::list_rooms).post(handlers::create_room),
        )
        .route(
            "/movie/",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route(
            "/ticket/",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route(
            "/theater-playing-movies/",
            get(handlers::list_playing_movies),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
