use crate::domain::model::{Movie, MovieId, Room, RoomId, Ticket};
use crate::domain::rules::remaining_tickets;
use chrono::NaiveTime;

/// Rooms, movies and tickets read together from the store.
///
/// Derived figures are recomputed from these rows on every call; nothing is
/// cached between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TheaterSnapshot {
    pub rooms: Vec<Room>,
    pub movies: Vec<Movie>,
    pub tickets: Vec<Ticket>,
}

impl TheaterSnapshot {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    pub fn movies_in_room(&self, room: RoomId) -> impl Iterator<Item = &Movie> {
        self.movies.iter().filter(move |m| m.room == room)
    }

    pub fn movie_count(&self, room: RoomId) -> usize {
        self.movies_in_room(room).count()
    }

    /// 第一部在 `now` 放映中的電影
    pub fn current_playing_movie(&self, room: RoomId, now: NaiveTime) -> Option<&Movie> {
        self.movies_in_room(room).find(|m| m.is_playing_at(now))
    }

    pub fn sold_tickets_count(&self, movie: MovieId) -> u64 {
        self.tickets
            .iter()
            .filter(|t| t.movie == movie)
            .map(|t| u64::from(t.quantity))
            .sum()
    }

    /// `None` when the movie's room is missing from the snapshot.
    pub fn remaining_tickets_count(&self, movie: &Movie) -> Option<i64> {
        let room = self.room(movie.room)?;
        Some(remaining_tickets(
            room.capacity,
            self.sold_tickets_count(movie.id),
        ))
    }

    pub fn tickets_sold_out(&self, movie: &Movie) -> bool {
        self.remaining_tickets_count(movie) == Some(0)
    }

    /// 所有放映廳中正在放映的電影
    pub fn playing_movies(&self, now: NaiveTime) -> impl Iterator<Item = &Movie> {
        self.movies.iter().filter(move |m| m.is_playing_at(now))
    }
}
