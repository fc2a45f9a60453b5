pub mod payload;
pub mod report;
pub mod theater;

pub use crate::domain::ports::{Clock, TheaterStore};
pub use crate::utils::error::Result;
