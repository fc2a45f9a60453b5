//! Create-input shapes. Request bodies are read field by field, so a missing
//! or badly typed value becomes an error on that field instead of failing the
//! whole body.

use crate::domain::model::{NewMovie, NewRoom, NewTicket};
use crate::utils::error::{FieldErrors, Result, TheaterError, NON_FIELD_ERRORS};
use crate::utils::validation::{require, require_at_least, require_text};
use chrono::NaiveTime;
use serde_json::{Map, Value};

pub const NAME_MAX_LENGTH: usize = 256;

pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_TIME: &str =
    "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].";

fn fit_u32(errors: &mut FieldErrors, field_name: &str, value: Option<i64>) -> Option<u32> {
    let value = value?;
    match u32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(
                field_name,
                format!("Ensure this value is less than or equal to {}.", u32::MAX),
            );
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// One JSON object being converted into a create-input shape.
struct Fields {
    body: Map<String, Value>,
    errors: FieldErrors,
}

impl Fields {
    fn new(body: Value) -> Result<Self> {
        match body {
            Value::Object(body) => Ok(Self {
                body,
                errors: FieldErrors::new(),
            }),
            other => Err(TheaterError::InputError(FieldErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type(&other)
                ),
            ))),
        }
    }

    /// `null` counts as absent.
    fn take(&mut self, name: &str) -> Option<Value> {
        self.body.remove(name).filter(|v| !v.is_null())
    }

    fn text(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => {
                self.errors.add(name, INVALID_STRING);
                None
            }
        }
    }

    /// Accepts numbers and numeric strings.
    fn integer(&mut self, name: &str) -> Option<i64> {
        let parsed = match self.take(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, INVALID_INTEGER);
        }
        parsed
    }

    fn time(&mut self, name: &str) -> Option<NaiveTime> {
        let parsed = match self.take(name)? {
            Value::String(s) => s.trim().parse::<NaiveTime>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(name, INVALID_TIME);
        }
        parsed
    }

    /// Id of a related row.
    fn pk(&mut self, name: &str) -> Option<i64> {
        let value = self.take(name)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(
                name,
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    json_type(&value)
                ),
            );
        }
        parsed
    }

    /// Conversion errors win; the remaining fields still get their own
    /// checks so one response lists every problem.
    fn finish<P, T>(self, payload: P, validate: impl FnOnce(P) -> Result<T>) -> Result<P> {
        let mut errors = self.errors;
        if errors.is_empty() {
            return Ok(payload);
        }

        if let Err(TheaterError::InputError(more)) = validate(payload) {
            for field in more.fields() {
                if errors.get(field).is_some() {
                    continue;
                }
                for message in more.get(field).unwrap_or_default() {
                    errors.add(field, message.clone());
                }
            }
        }
        Err(TheaterError::InputError(errors))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCreate {
    pub name: Option<String>,
    pub capacity: Option<i64>,
}

impl RoomCreate {
    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = Fields::new(body)?;
        let payload = Self {
            name: fields.text("name"),
            capacity: fields.integer("capacity"),
        };
        fields.finish(payload, Self::validate)
    }

    pub fn validate(self) -> Result<NewRoom> {
        let mut errors = FieldErrors::new();

        let name = require_text(&mut errors, "name", self.name, NAME_MAX_LENGTH);
        let capacity = require_at_least(&mut errors, "capacity", self.capacity, 0);
        let capacity = fit_u32(&mut errors, "capacity", capacity);

        if let (Some(name), Some(capacity)) = (name, capacity) {
            if errors.is_empty() {
                return Ok(NewRoom { name, capacity });
            }
        }
        Err(TheaterError::InputError(errors))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieCreate {
    pub name: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub room: Option<i64>,
}

impl MovieCreate {
    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = Fields::new(body)?;
        let payload = Self {
            name: fields.text("name"),
            start_time: fields.time("start_time"),
            end_time: fields.time("end_time"),
            room: fields.pk("room"),
        };
        fields.finish(payload, Self::validate)
    }

    /// Field checks only; duration and schedule rules run at the store.
    pub fn validate(self) -> Result<NewMovie> {
        let mut errors = FieldErrors::new();

        let name = require_text(&mut errors, "name", self.name, NAME_MAX_LENGTH);
        let start_time = require(&mut errors, "start_time", self.start_time);
        let end_time = require(&mut errors, "end_time", self.end_time);
        let room = require(&mut errors, "room", self.room);

        if let (Some(name), Some(start_time), Some(end_time), Some(room)) =
            (name, start_time, end_time, room)
        {
            if errors.is_empty() {
                return Ok(NewMovie {
                    name,
                    start_time,
                    end_time,
                    room,
                });
            }
        }
        Err(TheaterError::InputError(errors))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketCreate {
    pub movie: Option<i64>,
    pub quantity: Option<i64>,
}

impl TicketCreate {
    pub fn from_json(body: Value) -> Result<Self> {
        let mut fields = Fields::new(body)?;
        let payload = Self {
            movie: fields.pk("movie"),
            quantity: fields.integer("quantity"),
        };
        fields.finish(payload, Self::validate)
    }

    /// Field checks only; sold-out and capacity rules run at the store.
    pub fn validate(self) -> Result<NewTicket> {
        let mut errors = FieldErrors::new();

        let movie = require(&mut errors, "movie", self.movie);
        let quantity = require_at_least(&mut errors, "quantity", self.quantity, 1);
        let quantity = fit_u32(&mut errors, "quantity", quantity);

        if let (Some(movie), Some(quantity)) = (movie, quantity) {
            if errors.is_empty() {
                return Ok(NewTicket { movie, quantity });
            }
        }
        Err(TheaterError::InputError(errors))
    }
}
