//! Join key shared by every wide table

use std::fmt;

use serde::Serialize;

/// A (year, state) pair. Orders by year first, then state code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateYear {
    pub year: i32,
    pub state: String,
}

impl StateYear {
    pub fn new(year: i32, state: impl Into<String>) -> Self {
        Self {
            year,
            state: state.into(),
        }
    }
}

impl fmt::Display for StateYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.state, self.year)
    }
}
