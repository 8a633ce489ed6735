use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability label derived from capacity and the booking ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    BookAsap,
    SoldOut,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::BookAsap => "BOOK_ASAP",
            Status::SoldOut => "SOLD_OUT",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status label: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for Status {
    type Err = UnknownStatus;

    // Older rows were written with a space instead of an underscore
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(' ', "_").as_str() {
            "BOOK_ASAP" => Ok(Status::BookAsap),
            "SOLD_OUT" => Ok(Status::SoldOut),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Case-insensitive identity of a (movie, theatre) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InventoryKey {
    movie: String,
    theatre: String,
}

impl InventoryKey {
    pub fn new(movie_name: &str, theatre_name: &str) -> Self {
        Self {
            movie: normalize(movie_name),
            theatre: normalize(theatre_name),
        }
    }

    pub fn movie(&self) -> &str {
        &self.movie
    }

    pub fn theatre(&self) -> &str {
        &self.theatre
    }
}

impl fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.movie, self.theatre)
    }
}

pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Seat capacity record for one movie showing at one theatre.
///
/// `status` is only ever written by the booking core after recomputing it
/// from `total_capacity` and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub movie_name: String,
    pub theatre_name: String,
    pub total_capacity: i32,
    pub status: Status,
}

impl Inventory {
    pub fn key(&self) -> InventoryKey {
        InventoryKey::new(&self.movie_name, &self.theatre_name)
    }
}

/// Live booking figures for an inventory, as reported to admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookedInfo {
    pub booked: i64,
    pub remaining: i64,
    pub status: Status,
}
