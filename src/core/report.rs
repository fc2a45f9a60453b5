use crate::domain::derived::TheaterSnapshot;
use crate::utils::error::{Result, TheaterError};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Rooms,
    Movies,
    Tickets,
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rooms" => Ok(Self::Rooms),
            "movies" => Ok(Self::Movies),
            "tickets" => Ok(Self::Tickets),
            other => Err(format!("unknown report: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ReportFormat {
    fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(format!("unknown format: {}", other)),
        }
    }
}

#[derive(Serialize)]
struct RoomLine<'a> {
    name: &'a str,
    capacity: u32,
    movie_count: usize,
}

#[derive(Serialize)]
struct MovieLine<'a> {
    name: &'a str,
    start_time: String,
    end_time: String,
    room: &'a str,
    sold_tickets_count: u64,
    remaining_tickets_count: i64,
    tickets_sold_out: bool,
}

#[derive(Serialize)]
struct TicketLine {
    movie: String,
    quantity: u32,
}

const ROOM_COLUMNS: [&str; 3] = ["name", "capacity", "movie_count"];
const MOVIE_COLUMNS: [&str; 7] = [
    "name",
    "start_time",
    "end_time",
    "room",
    "sold_tickets_count",
    "remaining_tickets_count",
    "tickets_sold_out",
];
const TICKET_COLUMNS: [&str; 2] = ["movie", "quantity"];

impl ReportKind {
    fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Rooms => &ROOM_COLUMNS,
            Self::Movies => &MOVIE_COLUMNS,
            Self::Tickets => &TICKET_COLUMNS,
        }
    }
}

// 標題列自行寫入，空清單也會輸出欄位名稱
fn writer(format: ReportFormat) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(false)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| TheaterError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        TheaterError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Admin listing of a snapshot, one line per row with its derived figures.
pub fn render(
    snapshot: &TheaterSnapshot,
    kind: ReportKind,
    format: ReportFormat,
) -> Result<String> {
    let mut wtr = writer(format);
    wtr.write_record(kind.columns())?;

    match kind {
        ReportKind::Rooms => {
            for room in &snapshot.rooms {
                wtr.serialize(RoomLine {
                    name: &room.name,
                    capacity: room.capacity,
                    movie_count: snapshot.movie_count(room.id),
                })?;
            }
        }
        ReportKind::Movies => {
            for movie in &snapshot.movies {
                let room = snapshot.room(movie.room).map(|r| r.name.as_str()).unwrap_or("");
                wtr.serialize(MovieLine {
                    name: &movie.name,
                    start_time: movie.start_time.to_string(),
                    end_time: movie.end_time.to_string(),
                    room,
                    sold_tickets_count: snapshot.sold_tickets_count(movie.id),
                    remaining_tickets_count: snapshot.remaining_tickets_count(movie).unwrap_or(0),
                    tickets_sold_out: snapshot.tickets_sold_out(movie),
                })?;
            }
        }
        ReportKind::Tickets => {
            for ticket in &snapshot.tickets {
                let movie = snapshot
                    .movie(ticket.movie)
                    .map(|m| snapshot.movie_label(m).to_string())
                    .unwrap_or_default();
                wtr.serialize(TicketLine {
                    movie,
                    quantity: ticket.quantity,
                })?;
            }
        }
    }

    finish(wtr)
}
