//! Constructive placement and local search over seat swaps.
//!
//! The objective is lexicographic: first the weighted conflict cost of all
//! adjacent pairs, then the hall spread (sum of the filling rank of every
//! occupied seat). Spread only breaks ties, so a later hall is used only
//! when that strictly lowers the conflict cost.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::conflict::ConflictGraph;
use super::layout::SeatLayout;

/// Deadline checks are amortised over this many moves.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Cost {
    pub conflict: u64,
    pub spread: u64,
}

/// Bidirectional student <-> seat mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    seat_of: Vec<usize>,
    occupant: Vec<Option<usize>>,
}

impl Placement {
    pub(crate) fn occupant(&self, seat: usize) -> Option<usize> {
        self.occupant[seat]
    }

    pub(crate) fn seat_of(&self, student: usize) -> usize {
        self.seat_of[student]
    }

    fn swap(&mut self, p: usize, q: usize) {
        self.occupant.swap(p, q);
        if let Some(s) = self.occupant[p] {
            self.seat_of[s] = p;
        }
        if let Some(s) = self.occupant[q] {
            self.seat_of[s] = q;
        }
    }
}

/// Move and time accounting shared by every search phase.
#[derive(Debug)]
pub(crate) struct SearchBudget {
    max_moves: u64,
    deadline: Option<Instant>,
    moves: u64,
    exhausted: bool,
}

impl SearchBudget {
    pub(crate) fn new(max_moves: u64, time_budget: Option<Duration>) -> Self {
        Self {
            max_moves,
            // A budget too far out to represent is no deadline at all.
            deadline: time_budget.and_then(|d| Instant::now().checked_add(d)),
            moves: 0,
            exhausted: false,
        }
    }

    /// Account for one move. Returns `false` once the budget is spent.
    fn charge(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.moves >= self.max_moves {
            self.exhausted = true;
            return false;
        }
        self.moves += 1;
        if self.moves % DEADLINE_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.exhausted = true;
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn moves(&self) -> u64 {
        self.moves
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Statistics of one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchStats {
    pub improvements: u64,
    pub restarts_run: u32,
}

/// Cost evaluation over a fixed layout and conflict graph.
pub(crate) struct Evaluator<'a> {
    layout: &'a SeatLayout,
    graph: &'a ConflictGraph,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(layout: &'a SeatLayout, graph: &'a ConflictGraph) -> Self {
        Self { layout, graph }
    }

    /// Conflict cost `student` would have at `seat` given current occupants.
    fn cost_at(&self, placement: &Placement, student: usize, seat: usize) -> u64 {
        self.layout
            .neighbors(seat)
            .iter()
            .filter_map(|&n| placement.occupant[n])
            .filter(|&other| other != student)
            .map(|other| self.graph.pair_cost(student, other))
            .fold(0, u64::saturating_add)
    }

    /// Conflict cost of whoever sits at `seat`.
    fn local_conflict(&self, placement: &Placement, seat: usize) -> u64 {
        match placement.occupant[seat] {
            Some(student) => self.cost_at(placement, student, seat),
            None => 0,
        }
    }

    fn local_spread(&self, placement: &Placement, seat: usize) -> u64 {
        if placement.occupant[seat].is_some() {
            self.layout.rank(seat)
        } else {
            0
        }
    }

    pub(crate) fn cost(&self, placement: &Placement) -> Cost {
        let conflict = self
            .layout
            .edges()
            .filter_map(|(p, q)| match (placement.occupant[p], placement.occupant[q]) {
                (Some(a), Some(b)) => Some(self.graph.pair_cost(a, b)),
                _ => None,
            })
            .fold(0, u64::saturating_add);
        let spread = (0..self.layout.len())
            .map(|seat| self.local_spread(placement, seat))
            .sum();
        Cost { conflict, spread }
    }

    /// Greedy construction: each student, in `order`, takes the free seat
    /// with the lowest added conflict, then the earliest hall, then the
    /// lowest seat index.
    ///
    /// Returns `None` if the seats run out before every student is placed.
    pub(crate) fn construct(&self, order: &[usize]) -> Option<Placement> {
        let mut placement = Placement {
            seat_of: vec![usize::MAX; self.graph.len()],
            occupant: vec![None; self.layout.len()],
        };
        for &student in order {
            let seat = (0..self.layout.len())
                .filter(|&seat| placement.occupant[seat].is_none())
                .min_by_key(|&seat| {
                    (
                        self.cost_at(&placement, student, seat),
                        self.layout.rank(seat),
                        seat,
                    )
                })?;
            placement.occupant[seat] = Some(student);
            placement.seat_of[student] = seat;
        }
        Some(placement)
    }

    /// Swap the contents of seats `p` and `q`, keeping the swap only if the
    /// lexicographic cost strictly drops.
    ///
    /// When `p` and `q` are adjacent, their mutual pair cost is counted in
    /// both local sums before and after the swap, so it cancels out.
    fn try_swap(&self, placement: &mut Placement, p: usize, q: usize) -> bool {
        let before = (
            self.local_conflict(placement, p)
                .saturating_add(self.local_conflict(placement, q)),
            self.local_spread(placement, p) + self.local_spread(placement, q),
        );
        placement.swap(p, q);
        let after = (
            self.local_conflict(placement, p)
                .saturating_add(self.local_conflict(placement, q)),
            self.local_spread(placement, p) + self.local_spread(placement, q),
        );
        if after < before {
            true
        } else {
            placement.swap(p, q);
            false
        }
    }

    /// Whether the occupant of `seat` could still gain from moving.
    fn is_improvable(&self, placement: &Placement, seat: usize) -> bool {
        placement.occupant[seat].is_some()
            && (self.local_conflict(placement, seat) > 0 || self.layout.rank(seat) > 0)
    }

    /// First-improvement descent over all seat swaps until a full pass finds
    /// nothing or the budget runs out. Returns the number of accepted swaps.
    pub(crate) fn descend(&self, placement: &mut Placement, budget: &mut SearchBudget) -> u64 {
        let seats = self.layout.len();
        let mut accepted = 0;
        loop {
            let mut improved = false;
            for p in 0..seats {
                if !self.is_improvable(placement, p) {
                    continue;
                }
                for q in 0..seats {
                    if q == p {
                        continue;
                    }
                    if !budget.charge() {
                        return accepted;
                    }
                    if self.try_swap(placement, p, q) {
                        accepted += 1;
                        improved = true;
                        if !self.is_improvable(placement, p) {
                            break;
                        }
                    }
                }
            }
            if !improved {
                return accepted;
            }
        }
    }

    /// Descend, then run seeded perturbation rounds while conflicts remain.
    ///
    /// Each round kicks a copy of the best placement by swapping conflicted
    /// students into random seats, descends again, and keeps the result only
    /// if it is strictly better.
    pub(crate) fn improve(
        &self,
        placement: Placement,
        budget: &mut SearchBudget,
        rng: &mut StdRng,
        restarts: u32,
    ) -> (Placement, SearchStats) {
        let mut stats = SearchStats::default();
        let mut best = placement;
        stats.improvements += self.descend(&mut best, budget);
        let mut best_cost = self.cost(&best);

        let seats = self.layout.len();
        let students = self.graph.len();
        let kicks = (students / 8).clamp(2, 16);

        for round in 0..restarts {
            if best_cost.conflict == 0 || budget.is_exhausted() || seats < 2 || students == 0 {
                break;
            }
            let conflicted: Vec<usize> = (0..seats)
                .filter(|&seat| self.local_conflict(&best, seat) > 0)
                .collect();

            let mut trial = best.clone();
            for kick in 0..kicks {
                let p = if kick % 2 == 0 && !conflicted.is_empty() {
                    conflicted[rng.gen_range(0..conflicted.len())]
                } else {
                    trial.seat_of(rng.gen_range(0..students))
                };
                let q = rng.gen_range(0..seats);
                if p != q {
                    trial.swap(p, q);
                }
            }

            stats.improvements += self.descend(&mut trial, budget);
            stats.restarts_run += 1;
            let trial_cost = self.cost(&trial);
            debug!(
                round,
                conflict = trial_cost.conflict,
                best = best_cost.conflict,
                "perturbation round finished"
            );
            if trial_cost < best_cost {
                best = trial;
                best_cost = trial_cost;
            }
        }

        (best, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{HallId, StudentId};
    use crate::hall::HallModel;
    use crate::risk::RiskTier;
    use crate::seating::config::CostWeights;
    use crate::seating::conflict::SeatingCandidate;
    use rand::SeedableRng;

    fn hall(rows: u32, cols: u32) -> HallModel {
        HallModel::new(HallId(1), "H", rows, cols).unwrap()
    }

    fn roster(subjects: &[&str]) -> Vec<SeatingCandidate> {
        subjects
            .iter()
            .enumerate()
            .map(|(i, s)| SeatingCandidate::new(StudentId(i as u64), *s, RiskTier::Low))
            .collect()
    }

    #[test]
    fn test_budget_stops_after_max_moves() {
        let mut budget = SearchBudget::new(3, None);
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(!budget.charge());
        assert!(budget.is_exhausted());
        assert_eq!(budget.moves(), 3);
    }

    #[test]
    fn test_huge_time_budget_does_not_panic() {
        let mut budget = SearchBudget::new(300, Some(Duration::MAX));
        assert!(budget.deadline.is_none());
        for _ in 0..300 {
            assert!(budget.charge());
        }
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_construct_fails_without_enough_seats() {
        let h = hall(3, 3);
        let layout = SeatLayout::build(&[&h]);
        let candidates = roster(&["A"; 10]);
        let graph = ConflictGraph::build(&candidates, CostWeights::default());
        let eval = Evaluator::new(&layout, &graph);
        assert!(eval.construct(&graph.placement_order()).is_none());
    }

    #[test]
    fn test_construct_spreads_one_subject_on_checkerboard() {
        let h = hall(3, 3);
        let layout = SeatLayout::build(&[&h]);
        let candidates = roster(&["A"; 5]);
        let graph = ConflictGraph::build(&candidates, CostWeights::default());
        let eval = Evaluator::new(&layout, &graph);
        let placement = eval.construct(&graph.placement_order()).unwrap();
        assert_eq!(eval.cost(&placement).conflict, 0);
        let mut seats: Vec<usize> = (0..5).map(|s| placement.seat_of(s)).collect();
        seats.sort_unstable();
        assert_eq!(seats, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_descend_resolves_interleaved_roster() {
        let h = hall(3, 3);
        let layout = SeatLayout::build(&[&h]);
        let candidates = roster(&["A", "B", "C", "A", "B", "C", "A", "B", "C"]);
        let graph = ConflictGraph::build(&candidates, CostWeights::default());
        let eval = Evaluator::new(&layout, &graph);
        let mut placement = eval.construct(&graph.placement_order()).unwrap();
        assert!(eval.cost(&placement).conflict > 0);

        let mut budget = SearchBudget::new(10_000, None);
        let accepted = eval.descend(&mut placement, &mut budget);
        assert!(accepted > 0);
        assert_eq!(eval.cost(&placement).conflict, 0);
    }

    #[test]
    fn test_swap_keeps_mapping_consistent() {
        let h = hall(3, 3);
        let layout = SeatLayout::build(&[&h]);
        let candidates = roster(&["A", "B", "C"]);
        let graph = ConflictGraph::build(&candidates, CostWeights::default());
        let eval = Evaluator::new(&layout, &graph);
        let mut placement = eval.construct(&graph.placement_order()).unwrap();
        placement.swap(0, 8);
        for student in 0..3 {
            let seat = placement.seat_of(student);
            assert_eq!(placement.occupant(seat), Some(student));
        }
    }

    #[test]
    fn test_improve_is_deterministic_for_a_seed() {
        let h = hall(3, 4);
        let layout = SeatLayout::build(&[&h]);
        let candidates = roster(&["A", "A", "A", "A", "A", "A", "A", "B", "B", "B", "C"]);
        let graph = ConflictGraph::build(&candidates, CostWeights::default());
        let eval = Evaluator::new(&layout, &graph);

        let run = || {
            let start = eval.construct(&graph.placement_order()).unwrap();
            let mut budget = SearchBudget::new(50_000, None);
            let mut rng = StdRng::seed_from_u64(7);
            eval.improve(start, &mut budget, &mut rng, 8).0
        };
        assert_eq!(run(), run());
    }
}
