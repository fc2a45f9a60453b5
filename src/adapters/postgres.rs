use crate::domain::derived::TheaterSnapshot;
use crate::domain::model::{Movie, NewMovie, NewRoom, NewTicket, Room, RoomId, Ticket};
use crate::domain::ports::{Committed, TheaterStore};
use crate::domain::rules::{self, OverlapPolicy};
use crate::utils::error::{Result, TheaterError};
use async_trait::async_trait;
use chrono::NaiveTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS rooms (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS movies (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(256) NOT NULL,
        start_time TIME NOT NULL,
        end_time TIME NOT NULL,
        room_id BIGINT NOT NULL REFERENCES rooms (id) ON DELETE CASCADE,
        CHECK (start_time < end_time)
    )",
    "CREATE TABLE IF NOT EXISTS tickets (
        id BIGSERIAL PRIMARY KEY,
        movie_id BIGINT NOT NULL REFERENCES movies (id) ON DELETE CASCADE,
        quantity INTEGER NOT NULL CHECK (quantity > 0)
    )",
    "CREATE INDEX IF NOT EXISTS movies_room_id_idx ON movies (room_id)",
    "CREATE INDEX IF NOT EXISTS tickets_movie_id_idx ON tickets (movie_id)",
];

type RoomRow = (i64, String, i32);
type MovieRow = (i64, String, NaiveTime, NaiveTime, i64);
type TicketRow = (i64, i64, i32);

fn room_from_row((id, name, capacity): RoomRow) -> Room {
    Room {
        id,
        name,
        // CHECK (capacity >= 0)
        capacity: u32::try_from(capacity).unwrap_or(0),
    }
}

fn movie_from_row((id, name, start_time, end_time, room): MovieRow) -> Movie {
    Movie {
        id,
        name,
        start_time,
        end_time,
        room,
    }
}

fn ticket_from_row((id, movie, quantity): TicketRow) -> Ticket {
    Ticket {
        id,
        movie,
        quantity: u32::try_from(quantity).unwrap_or(0),
    }
}

fn to_db_int(field: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        TheaterError::InputError(crate::utils::error::FieldErrors::single(
            field,
            format!("Ensure this value is less than or equal to {}.", i32::MAX),
        ))
    })
}

/// Postgres-backed store.
///
/// Movie creation locks the room row and ticket creation locks the movie
/// row (`SELECT ... FOR UPDATE`) before reading the rows the rule depends
/// on. Concurrent writers against the same room or movie queue behind the
/// lock and re-read the committed state.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    overlap_policy: OverlapPolicy,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            overlap_policy: OverlapPolicy::default(),
        }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// 建立資料表（可重複執行）
    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("Schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl TheaterStore for PgStore {
    async fn create_room(&self, room: NewRoom) -> Result<Room> {
        let row: RoomRow = sqlx::query_as(
            "INSERT INTO rooms (name, capacity) VALUES ($1, $2)
             RETURNING id, name, capacity",
        )
        .bind(&room.name)
        .bind(to_db_int("capacity", room.capacity)?)
        .fetch_one(&self.pool)
        .await?;

        Ok(room_from_row(row))
    }

    async fn create_movie(&self, movie: NewMovie) -> Result<Committed<Movie>> {
        let mut tx = self.pool.begin().await?;

        // 鎖住放映廳，同一廳的排片依序進行
        let room: Option<RoomRow> =
            sqlx::query_as("SELECT id, name, capacity FROM rooms WHERE id = $1 FOR UPDATE")
                .bind(movie.room)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(room) = room else {
            let _ = tx.rollback().await;
            return Err(TheaterError::UnknownReference {
                field: "room",
                id: movie.room,
            });
        };

        let existing: Vec<MovieRow> = sqlx::query_as(
            "SELECT id, name, start_time, end_time, room_id
             FROM movies
             WHERE room_id = $1
             ORDER BY id",
        )
        .bind(movie.room)
        .fetch_all(&mut *tx)
        .await?;
        let mut movies: Vec<Movie> = existing.into_iter().map(movie_from_row).collect();

        if let Err(e) = rules::check_schedule(&movie, &movies, self.overlap_policy) {
            let _ = tx.rollback().await;
            return Err(e);
        }

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO movies (name, start_time, end_time, room_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&movie.name)
        .bind(movie.start_time)
        .bind(movie.end_time)
        .bind(movie.room)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let movie = movie.into_movie(id);
        movies.push(movie.clone());
        Ok(Committed {
            record: movie,
            scope: TheaterSnapshot {
                rooms: vec![room_from_row(room)],
                movies,
                tickets: Vec::new(),
            },
        })
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Committed<Ticket>> {
        let quantity = to_db_int("quantity", ticket.quantity)?;
        let mut tx = self.pool.begin().await?;

        // 鎖住電影列，同一場次的售票依序進行
        let room: Option<RoomRow> = sqlx::query_as(
            "SELECT r.id, r.name, r.capacity
             FROM movies m
             JOIN rooms r ON r.id = m.room_id
             WHERE m.id = $1
             FOR UPDATE OF m",
        )
        .bind(ticket.movie)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(room) = room else {
            let _ = tx.rollback().await;
            return Err(TheaterError::UnknownReference {
                field: "movie",
                id: ticket.movie,
            });
        };
        let room = room_from_row(room);

        let (sold,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM tickets WHERE movie_id = $1",
        )
        .bind(ticket.movie)
        .fetch_one(&mut *tx)
        .await?;

        let sold = u64::try_from(sold).unwrap_or(0);
        if let Err(e) = rules::check_ticket_sale(room.capacity, sold, ticket.quantity) {
            let _ = tx.rollback().await;
            return Err(e);
        }

        let row: TicketRow = sqlx::query_as(
            "INSERT INTO tickets (movie_id, quantity) VALUES ($1, $2)
             RETURNING id, movie_id, quantity",
        )
        .bind(ticket.movie)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        let movies: Vec<MovieRow> = sqlx::query_as(
            "SELECT id, name, start_time, end_time, room_id
             FROM movies
             WHERE room_id = $1
             ORDER BY id",
        )
        .bind(room.id)
        .fetch_all(&mut *tx)
        .await?;
        let tickets: Vec<TicketRow> = sqlx::query_as(
            "SELECT id, movie_id, quantity FROM tickets WHERE movie_id = $1 ORDER BY id",
        )
        .bind(ticket.movie)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Committed {
            record: ticket_from_row(row),
            scope: TheaterSnapshot {
                rooms: vec![room],
                movies: movies.into_iter().map(movie_from_row).collect(),
                tickets: tickets.into_iter().map(ticket_from_row).collect(),
            },
        })
    }

    async fn snapshot(&self) -> Result<TheaterSnapshot> {
        let mut tx = self.pool.begin().await?;

        // 三張表讀同一個快照
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let rooms: Vec<RoomRow> =
            sqlx::query_as("SELECT id, name, capacity FROM rooms ORDER BY id")
                .fetch_all(&mut *tx)
                .await?;
        let movies: Vec<MovieRow> = sqlx::query_as(
            "SELECT id, name, start_time, end_time, room_id FROM movies ORDER BY id",
        )
        .fetch_all(&mut *tx)
        .await?;
        let tickets: Vec<TicketRow> =
            sqlx::query_as("SELECT id, movie_id, quantity FROM tickets ORDER BY id")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(TheaterSnapshot {
            rooms: rooms.into_iter().map(room_from_row).collect(),
            movies: movies.into_iter().map(movie_from_row).collect(),
            tickets: tickets.into_iter().map(ticket_from_row).collect(),
        })
    }

    async fn delete_room(&self, room: RoomId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(room)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
