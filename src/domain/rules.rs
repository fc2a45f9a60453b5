//! Write-time rules for scheduling movies and selling tickets.
//!
//! Both storage backends call these while holding the lock (or row lock)
//! that covers the rows being checked, so the check and the insert commit
//! together.

use crate::domain::model::{Movie, NewMovie};
use crate::utils::error::{Result, TheaterError};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const WRONG_DURATION: &str = "WRONG_DURATION";
pub const MOVIE_EXIST: &str = "MOVIE_EXIST";
pub const SOLD_OUT: &str = "SOLD_OUT";
pub const INSUFFICIENT_TICKETS: &str = "INSUFFICIENT_TICKETS";

/// How a new showtime is compared against the room's existing schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Reject when either endpoint of the new showtime falls inside an
    /// existing one (inclusive). A new showtime that strictly surrounds an
    /// existing one is accepted.
    #[default]
    Endpoints,
    /// `Endpoints`, plus reject a new showtime that surrounds an existing one.
    AnyIntersection,
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "endpoints" => Ok(Self::Endpoints),
            "any-intersection" => Ok(Self::AnyIntersection),
            other => Err(format!("unknown overlap policy: {}", other)),
        }
    }
}

fn contains(movie: &Movie, instant: NaiveTime) -> bool {
    movie.start_time <= instant && instant <= movie.end_time
}

/// Zero-length showtimes are rejected along with reversed ones.
pub fn check_duration(start_time: NaiveTime, end_time: NaiveTime) -> Result<()> {
    if start_time >= end_time {
        return Err(TheaterError::InvalidDuration);
    }
    Ok(())
}

/// `existing` must already be narrowed to the new movie's room.
pub fn check_schedule<'a, I>(new: &NewMovie, existing: I, policy: OverlapPolicy) -> Result<()>
where
    I: IntoIterator<Item = &'a Movie>,
{
    check_duration(new.start_time, new.end_time)?;

    let existing: Vec<&Movie> = existing.into_iter().filter(|m| m.room == new.room).collect();

    if existing.iter().any(|m| contains(m, new.start_time)) {
        return Err(TheaterError::ScheduleConflict);
    }

    if existing.iter().any(|m| contains(m, new.end_time)) {
        return Err(TheaterError::ScheduleConflict);
    }

    if policy == OverlapPolicy::AnyIntersection
        && existing
            .iter()
            .any(|m| new.start_time <= m.start_time && m.end_time <= new.end_time)
    {
        return Err(TheaterError::ScheduleConflict);
    }

    Ok(())
}

/// `sold` is the sum of quantities already sold for the movie.
pub fn check_ticket_sale(capacity: u32, sold: u64, quantity: u32) -> Result<()> {
    let remaining = remaining_tickets(capacity, sold);

    if remaining == 0 {
        return Err(TheaterError::SoldOut);
    }

    if remaining < i64::from(quantity) {
        return Err(TheaterError::InsufficientCapacity);
    }

    Ok(())
}

/// Negative only when the capacity invariant was broken outside this crate.
pub fn remaining_tickets(capacity: u32, sold: u64) -> i64 {
    let sold = i64::try_from(sold).unwrap_or(i64::MAX);
    i64::from(capacity) - sold
}
