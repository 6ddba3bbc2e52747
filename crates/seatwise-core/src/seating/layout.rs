//! Flattened seat list spanning every hall in filling order.

use crate::domain::ids::HallId;
use crate::hall::HallModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeatSlot {
    pub hall_id: HallId,
    /// Position of the hall in filling order; 0 is filled first.
    pub hall_rank: u32,
    pub row: u32,
    pub col: u32,
}

/// Seats of all halls, hall by hall in filling order and row-major within a
/// hall. Adjacency never crosses a hall boundary.
#[derive(Debug, Clone)]
pub(crate) struct SeatLayout {
    slots: Vec<SeatSlot>,
    neighbors: Vec<Vec<usize>>,
}

impl SeatLayout {
    pub(crate) fn build(ordered_halls: &[&HallModel]) -> Self {
        let total: usize = ordered_halls.iter().map(|h| h.capacity()).sum();
        let mut slots = Vec::with_capacity(total);
        let mut neighbors = Vec::with_capacity(total);

        for (rank, hall) in ordered_halls.iter().enumerate() {
            let base = slots.len();
            for (row, col) in hall.seat_coordinates() {
                slots.push(SeatSlot {
                    hall_id: hall.id(),
                    hall_rank: rank as u32,
                    row,
                    col,
                });

                let mut adjacent = Vec::with_capacity(4);
                if row > 0 {
                    adjacent.push(base + hall.seat_index(row - 1, col));
                }
                if row + 1 < hall.rows() {
                    adjacent.push(base + hall.seat_index(row + 1, col));
                }
                if col > 0 {
                    adjacent.push(base + hall.seat_index(row, col - 1));
                }
                if col + 1 < hall.cols() {
                    adjacent.push(base + hall.seat_index(row, col + 1));
                }
                neighbors.push(adjacent);
            }
        }

        Self { slots, neighbors }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, seat: usize) -> &SeatSlot {
        &self.slots[seat]
    }

    pub(crate) fn neighbors(&self, seat: usize) -> &[usize] {
        &self.neighbors[seat]
    }

    pub(crate) fn rank(&self, seat: usize) -> u64 {
        u64::from(self.slots[seat].hall_rank)
    }

    /// Every adjacent seat pair once, as `(lower, higher)`.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(p, adj)| adj.iter().copied().filter(move |&q| q > p).map(move |q| (p, q)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall(id: u64, rows: u32, cols: u32) -> HallModel {
        HallModel::new(HallId(id), format!("H{id}"), rows, cols).unwrap()
    }

    #[test]
    fn test_corner_edge_and_centre_degrees() {
        let h = hall(1, 3, 3);
        let layout = SeatLayout::build(&[&h]);
        assert_eq!(layout.len(), 9);
        assert_eq!(layout.neighbors(0).len(), 2);
        assert_eq!(layout.neighbors(1).len(), 3);
        assert_eq!(layout.neighbors(4).len(), 4);
    }

    #[test]
    fn test_edge_count_of_grid() {
        // rows * (cols - 1) + cols * (rows - 1)
        let h = hall(1, 3, 4);
        let layout = SeatLayout::build(&[&h]);
        assert_eq!(layout.edges().count(), 3 * 3 + 4 * 2);
    }

    #[test]
    fn test_halls_are_not_adjacent_to_each_other() {
        let a = hall(1, 3, 3);
        let b = hall(2, 3, 3);
        let layout = SeatLayout::build(&[&a, &b]);
        assert_eq!(layout.len(), 18);
        for (p, q) in layout.edges() {
            assert_eq!(layout.slot(p).hall_id, layout.slot(q).hall_id);
        }
        assert_eq!(layout.slot(9).hall_rank, 1);
        assert_eq!(layout.slot(9).row, 0);
        assert_eq!(layout.rank(17), 1);
    }
}
