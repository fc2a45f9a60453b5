use crate::api::error::ApiError;
use crate::api::routes::AppState;
use crate::core::payload::{MovieCreate, RoomCreate, TicketCreate};
use crate::domain::views::{MovieRead, RoomRead, TicketRead};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

type Created<T> = Result<(StatusCode, Json<T>), ApiError>;
type Listed<T> = Result<Json<Vec<T>>, ApiError>;

/// `POST /api/room/`
pub async fn create_room(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Created<RoomRead> {
    let Json(body) = body?;
    let payload = RoomCreate::from_json(body)?;
    let room = state.service.create_room(payload).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /api/room/`
pub async fn list_rooms(State(state): State<AppState>) -> Listed<RoomRead> {
    Ok(Json(state.service.list_rooms().await?))
}

/// `POST /api/movie/`
pub async fn create_movie(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Created<MovieRead> {
    let Json(body) = body?;
    let payload = MovieCreate::from_json(body)?;
    let movie = state.service.create_movie(payload).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// `GET /api/movie/`
pub async fn list_movies(State(state): State<AppState>) -> Listed<MovieRead> {
    Ok(Json(state.service.list_movies().await?))
}

/// `POST /api/ticket/`
pub async fn create_ticket(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Created<TicketRead> {
    let Json(body) = body?;
    let payload = TicketCreate::from_json(body)?;
    let ticket = state.service.create_ticket(payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `GET /api/ticket/`
pub async fn list_tickets(State(state): State<AppState>) -> Listed<TicketRead> {
    Ok(Json(state.service.list_tickets().await?))
}

/// `GET /api/theater-playing-movies/`
pub async fn list_playing_movies(State(state): State<AppState>) -> Listed<MovieRead> {
    Ok(Json(state.service.playing_movies().await?))
}

/// `GET /health`
pub async fn health_check() -> &'static str {
    "ok"
}
