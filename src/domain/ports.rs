use crate::domain::derived::TheaterSnapshot;
use crate::domain::model::{Movie, NewMovie, NewRoom, NewTicket, Room, RoomId, Ticket};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveTime;

/// A committed write with the rows needed to render it, read under the same
/// lock or transaction as the write itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub record: T,
    /// The record's room with all of its movies, plus the tickets of the
    /// affected movie.
    pub scope: TheaterSnapshot,
}

/// Relational storage for rooms, movies and tickets.
///
/// `create_movie` and `create_ticket` run the scheduling and ticket sale
/// rules against the stored rows and insert in the same atomic step, so a
/// concurrent request can never observe the pre-insert state once the check
/// has passed.
#[async_trait]
pub trait TheaterStore: Send + Sync {
    async fn create_room(&self, room: NewRoom) -> Result<Room>;

    /// Fails with `UnknownReference` when the room does not exist.
    async fn create_movie(&self, movie: NewMovie) -> Result<Committed<Movie>>;

    /// Fails with `UnknownReference` when the movie does not exist.
    async fn create_ticket(&self, ticket: NewTicket) -> Result<Committed<Ticket>>;

    async fn snapshot(&self) -> Result<TheaterSnapshot>;

    /// Removes the room with its movies and their tickets. Returns `false`
    /// when no such room exists.
    async fn delete_room(&self, room: RoomId) -> Result<bool>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
