//! Exam hall geometry.

use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, SeatwiseError};
use crate::domain::ids::HallId;

/// Smallest row or column count a hall may have.
pub const MIN_HALL_DIMENSION: u32 = 3;

/// Largest row or column count a hall may have.
pub const MAX_HALL_DIMENSION: u32 = 100;

/// Registration request for a hall (`POST /halls`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHall {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

impl NewHall {
    pub fn new(name: impl Into<String>, rows: u32, cols: u32) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
        }
    }
}

/// A validated exam hall.
///
/// Fields are private so that a `HallModel` can only exist with valid
/// geometry; capacity is always `rows * cols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "HallView")]
pub struct HallModel {
    id: HallId,
    name: String,
    rows: u32,
    cols: u32,
}

impl HallModel {
    /// Validate geometry and build a hall.
    ///
    /// # Errors
    ///
    /// Returns `SeatwiseError::InvalidGeometry` when rows or cols lies
    /// outside [`MIN_HALL_DIMENSION`]..=[`MAX_HALL_DIMENSION`], and
    /// `SeatwiseError::MissingField` for a blank name.
    pub fn new(id: HallId, name: impl Into<String>, rows: u32, cols: u32) -> Result<Self> {
        let dimensions = MIN_HALL_DIMENSION..=MAX_HALL_DIMENSION;
        if !dimensions.contains(&rows) || !dimensions.contains(&cols) {
            return Err(SeatwiseError::InvalidGeometry { rows, cols });
        }
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SeatwiseError::MissingField("name"));
        }
        Ok(Self {
            id,
            name,
            rows,
            cols,
        })
    }

    pub fn id(&self) -> HallId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn capacity(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Whether `(row, col)` lies inside the hall.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row < self.rows && col < self.cols
    }

    /// Row-major index of a seat. Caller must pass a contained coordinate.
    pub fn seat_index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Every seat coordinate in row-major order.
    ///
    /// The iterator is lazy and can be recreated at will; it borrows nothing
    /// but the dimensions.
    pub fn seat_coordinates(&self) -> SeatCoordinates {
        SeatCoordinates {
            rows: self.rows,
            cols: self.cols,
            next: 0,
        }
    }

    /// Read projection handed to callers (`GET /halls`).
    pub fn view(&self) -> HallView {
        HallView {
            id: self.id,
            name: self.name.clone(),
            rows: self.rows,
            cols: self.cols,
            capacity: self.capacity(),
        }
    }
}

/// Lazy row-major iterator over `(row, col)` seat coordinates.
#[derive(Debug, Clone)]
pub struct SeatCoordinates {
    rows: u32,
    cols: u32,
    next: u64,
}

impl Iterator for SeatCoordinates {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let total = u64::from(self.rows) * u64::from(self.cols);
        if self.next >= total {
            return None;
        }
        let cols = u64::from(self.cols);
        let item = ((self.next / cols) as u32, (self.next % cols) as u32);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = u64::from(self.rows) * u64::from(self.cols);
        let remaining = total.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SeatCoordinates {}

impl std::iter::FusedIterator for SeatCoordinates {}

/// Serialisable hall including its computed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallView {
    pub id: HallId,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub capacity: usize,
}

impl From<HallModel> for HallView {
    fn from(hall: HallModel) -> Self {
        hall.view()
    }
}
