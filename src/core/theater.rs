use crate::core::payload::{MovieCreate, RoomCreate, TicketCreate};
use crate::domain::derived::TheaterSnapshot;
use crate::domain::model::RoomId;
use crate::domain::ports::{Clock, SystemClock, TheaterStore};
use crate::domain::views::{MovieRead, RoomRead, TicketRead};
use crate::utils::error::{Result, TheaterError};
use std::sync::Arc;

/// Create and list operations for rooms, movies and tickets.
///
/// Creates validate the payload fields, hand the write to the store (which
/// runs the scheduling and capacity rules atomically) and answer with the
/// read shape built from the rows the store returned with the write. Lists
/// never write.
#[derive(Clone)]
pub struct TheaterService {
    store: Arc<dyn TheaterStore>,
    clock: Arc<dyn Clock>,
}

impl TheaterService {
    pub fn new(store: Arc<dyn TheaterStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn TheaterStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn TheaterStore> {
        &self.store
    }

    pub async fn create_room(&self, payload: RoomCreate) -> Result<RoomRead> {
        let new_room = payload.validate()?;
        let room = self.store.create_room(new_room).await?;
        tracing::info!(room_id = room.id, capacity = room.capacity, "Room created: {}", room);

        // 新放映廳尚無電影
        Ok(TheaterSnapshot::default().room_read(&room, self.clock.now()))
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomRead>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.room_reads(self.clock.now()))
    }

    pub async fn create_movie(&self, payload: MovieCreate) -> Result<MovieRead> {
        let new_movie = payload.validate()?;
        let room = new_movie.room;

        let committed = self
            .store
            .create_movie(new_movie)
            .await
            .inspect_err(|e| log_rejection("movie", e))?;

        let movie = &committed.record;
        let read = committed
            .scope
            .movie_read(movie, self.clock.now())
            .ok_or(TheaterError::UnknownReference { field: "room", id: room })?;
        tracing::info!(movie_id = movie.id, room_id = room, "Movie scheduled: {}", read);
        Ok(read)
    }

    pub async fn list_movies(&self) -> Result<Vec<MovieRead>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.movie_reads(self.clock.now()))
    }

    pub async fn create_ticket(&self, payload: TicketCreate) -> Result<TicketRead> {
        let new_ticket = payload.validate()?;
        let movie_id = new_ticket.movie;

        let committed = self
            .store
            .create_ticket(new_ticket)
            .await
            .inspect_err(|e| log_rejection("ticket", e))?;

        let ticket = &committed.record;
        let read = committed
            .scope
            .ticket_read(ticket, self.clock.now())
            .ok_or(TheaterError::UnknownReference {
                field: "movie",
                id: movie_id,
            })?;
        tracing::info!(
            ticket_id = ticket.id,
            movie_id,
            remaining = read.movie.remaining_tickets,
            "Ticket sold: {}",
            read
        );
        Ok(read)
    }

    pub async fn list_tickets(&self) -> Result<Vec<TicketRead>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.ticket_reads(self.clock.now()))
    }

    /// 目前正在放映的電影（所有放映廳）
    pub async fn playing_movies(&self) -> Result<Vec<MovieRead>> {
        let snapshot = self.store.snapshot().await?;
        Ok(snapshot.playing_movie_reads(self.clock.now()))
    }

    /// 刪除放映廳及其電影與票券，僅供管理指令使用
    pub async fn remove_room(&self, room: RoomId) -> Result<bool> {
        let removed = self.store.delete_room(room).await?;
        if removed {
            tracing::info!(room_id = room, "Room removed with its movies and tickets");
        } else {
            tracing::warn!(room_id = room, "Room not found, nothing removed");
        }
        Ok(removed)
    }
}

fn log_rejection(entity: &str, error: &TheaterError) {
    if error.is_rule_violation() {
        tracing::warn!("Rejected {} creation: {}", entity, error);
    } else if error.field_errors().is_none() {
        tracing::error!("Failed to create {}: {}", entity, error);
    }
}
