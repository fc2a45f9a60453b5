use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type RoomId = i64;
pub type MovieId = i64;
pub type TicketId = i64;

/// 放映廳
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 排入某放映廳的一場電影
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: RoomId,
}

impl Movie {
    /// `[start_time, end_time]` 含兩端
    pub fn is_playing_at(&self, now: NaiveTime) -> bool {
        self.start_time <= now && now <= self.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub movie: MovieId,
    pub quantity: u32,
}

/// 已通過欄位檢查、尚未寫入的資料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room: RoomId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub movie: MovieId,
    pub quantity: u32,
}

impl NewMovie {
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            name: self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_is_playing_at_includes_both_ends() {
        let movie = Movie {
            id: 1,
            name: "Movie 1".into(),
            start_time: t(10, 0),
            end_time: t(12, 0),
            room: 1,
        };

        assert!(movie.is_playing_at(t(10, 0)));
        assert!(movie.is_playing_at(t(11, 30)));
        assert!(movie.is_playing_at(t(12, 0)));
        assert!(!movie.is_playing_at(t(9, 59)));
        assert!(!movie.is_playing_at(t(12, 1)));
    }

    #[test]
    fn test_room_display_is_name() {
        let room = Room {
            id: 3,
            name: "Room 3".into(),
            capacity: 30,
        };
        assert_eq!(room.to_string(), "Room 3");
    }
}
