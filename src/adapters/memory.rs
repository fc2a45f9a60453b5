use crate::domain::derived::TheaterSnapshot;
use crate::domain::model::{Movie, MovieId, NewMovie, NewRoom, NewTicket, Room, RoomId, Ticket};
use crate::domain::ports::{Committed, TheaterStore};
use crate::domain::rules::{self, OverlapPolicy};
use crate::utils::error::{Result, TheaterError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    rooms: Vec<Room>,
    movies: Vec<Movie>,
    tickets: Vec<Ticket>,
    next_room_id: i64,
    next_movie_id: i64,
    next_ticket_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn scope(&self, room: RoomId, movie: Option<MovieId>) -> TheaterSnapshot {
        TheaterSnapshot {
            rooms: self.rooms.iter().filter(|r| r.id == room).cloned().collect(),
            movies: self.movies.iter().filter(|m| m.room == room).cloned().collect(),
            tickets: self
                .tickets
                .iter()
                .filter(|t| Some(t.movie) == movie)
                .cloned()
                .collect(),
        }
    }
}

/// Process-local store. Every write holds the write lock across its rule
/// check and insert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    overlap_policy: OverlapPolicy,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }
}

#[async_trait]
impl TheaterStore for InMemoryStore {
    async fn create_room(&self, room: NewRoom) -> Result<Room> {
        let mut tables = self.tables.write().await;
        let room = Room {
            id: Tables::next_id(&mut tables.next_room_id),
            name: room.name,
            capacity: room.capacity,
        };
        tables.rooms.push(room.clone());
        Ok(room)
    }

    async fn create_movie(&self, movie: NewMovie) -> Result<Committed<Movie>> {
        let mut tables = self.tables.write().await;

        if !tables.rooms.iter().any(|r| r.id == movie.room) {
            return Err(TheaterError::UnknownReference {
                field: "room",
                id: movie.room,
            });
        }

        rules::check_schedule(&movie, &tables.movies, self.overlap_policy)?;

        let movie = movie.into_movie(Tables::next_id(&mut tables.next_movie_id));
        tables.movies.push(movie.clone());
        Ok(Committed {
            scope: tables.scope(movie.room, Some(movie.id)),
            record: movie,
        })
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Committed<Ticket>> {
        let mut tables = self.tables.write().await;

        let (room, capacity) = tables
            .movies
            .iter()
            .find(|m| m.id == ticket.movie)
            .and_then(|m| tables.rooms.iter().find(|r| r.id == m.room))
            .map(|r| (r.id, r.capacity))
            .ok_or(TheaterError::UnknownReference {
                field: "movie",
                id: ticket.movie,
            })?;

        let sold: u64 = tables
            .tickets
            .iter()
            .filter(|t| t.movie == ticket.movie)
            .map(|t| u64::from(t.quantity))
            .sum();

        rules::check_ticket_sale(capacity, sold, ticket.quantity)?;

        let ticket = Ticket {
            id: Tables::next_id(&mut tables.next_ticket_id),
            movie: ticket.movie,
            quantity: ticket.quantity,
        };
        tables.tickets.push(ticket.clone());
        Ok(Committed {
            scope: tables.scope(room, Some(ticket.movie)),
            record: ticket,
        })
    }

    async fn snapshot(&self) -> Result<TheaterSnapshot> {
        let tables = self.tables.read().await;
        Ok(TheaterSnapshot {
            rooms: tables.rooms.clone(),
            movies: tables.movies.clone(),
            tickets: tables.tickets.clone(),
        })
    }

    async fn delete_room(&self, room: RoomId) -> Result<bool> {
        let mut tables = self.tables.write().await;

        let before = tables.rooms.len();
        tables.rooms.retain(|r| r.id != room);
        if tables.rooms.len() == before {
            return Ok(false);
        }

        let removed: Vec<_> = tables
            .movies
            .iter()
            .filter(|m| m.room == room)
            .map(|m| m.id)
            .collect();
        tables.movies.retain(|m| m.room != room);
        tables.tickets.retain(|t| !removed.contains(&t.movie));

        Ok(true)
    }
}
