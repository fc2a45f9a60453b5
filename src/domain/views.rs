//! Read shapes returned by the API: related rows nested, derived figures
//! filled in from a [`TheaterSnapshot`].

use crate::domain::derived::TheaterSnapshot;
use crate::domain::model::{Movie, MovieId, Room, RoomId, Ticket, TicketId};
use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;

/// A room's playing movie, with the room as a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomMovie {
    pub id: MovieId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: RoomId,
}

impl From<&Movie> for RoomMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            name: movie.name.clone(),
            start_time: movie.start_time,
            end_time: movie.end_time,
            room: movie.room,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomRead {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub current_playing_movie: Option<RoomMovie>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRead {
    pub id: MovieId,
    pub room: RoomRead,
    pub remaining_tickets: i64,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// `"<name> (<room>) : <start> - <end>"`
#[derive(Debug, Clone, Copy)]
pub struct MovieLabel<'a> {
    pub name: &'a str,
    pub room: &'a str,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl fmt::Display for MovieLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) : {} - {}",
            self.name, self.room, self.start_time, self.end_time
        )
    }
}

impl fmt::Display for MovieRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = MovieLabel {
            name: &self.name,
            room: &self.room.name,
            start_time: self.start_time,
            end_time: self.end_time,
        };
        fmt::Display::fmt(&label, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRead {
    pub id: TicketId,
    pub movie: MovieRead,
    pub quantity: u32,
}

impl fmt::Display for TicketRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} : {}",
            self.movie.room.name, self.movie.name, self.quantity
        )
    }
}

impl TheaterSnapshot {
    /// Room name is left empty when the room is not in the snapshot.
    pub fn movie_label<'a>(&'a self, movie: &'a Movie) -> MovieLabel<'a> {
        MovieLabel {
            name: &movie.name,
            room: self.room(movie.room).map(|r| r.name.as_str()).unwrap_or(""),
            start_time: movie.start_time,
            end_time: movie.end_time,
        }
    }

    pub fn room_read(&self, room: &Room, now: NaiveTime) -> RoomRead {
        RoomRead {
            id: room.id,
            name: room.name.clone(),
            capacity: room.capacity,
            current_playing_movie: self.current_playing_movie(room.id, now).map(RoomMovie::from),
        }
    }

    /// `None` when the movie's room is not in the snapshot.
    pub fn movie_read(&self, movie: &Movie, now: NaiveTime) -> Option<MovieRead> {
        let room = self.room(movie.room)?;
        Some(MovieRead {
            id: movie.id,
            room: self.room_read(room, now),
            remaining_tickets: self.remaining_tickets_count(movie)?,
            name: movie.name.clone(),
            start_time: movie.start_time,
            end_time: movie.end_time,
        })
    }

    pub fn ticket_read(&self, ticket: &Ticket, now: NaiveTime) -> Option<TicketRead> {
        let movie = self.movie(ticket.movie)?;
        Some(TicketRead {
            id: ticket.id,
            movie: self.movie_read(movie, now)?,
            quantity: ticket.quantity,
        })
    }

    pub fn room_reads(&self, now: NaiveTime) -> Vec<RoomRead> {
        self.rooms.iter().map(|r| self.room_read(r, now)).collect()
    }

    pub fn movie_reads(&self, now: NaiveTime) -> Vec<MovieRead> {
        self.movies
            .iter()
            .filter_map(|m| self.movie_read(m, now))
            .collect()
    }

    pub fn ticket_reads(&self, now: NaiveTime) -> Vec<TicketRead> {
        self.tickets
            .iter()
            .filter_map(|t| self.ticket_read(t, now))
            .collect()
    }

    pub fn playing_movie_reads(&self, now: NaiveTime) -> Vec<MovieRead> {
        self.playing_movies(now)
            .filter_map(|m| self.movie_read(m, now))
            .collect()
    }
}
