//! Append-only violation ledger and credibility accounts.
//!
//! Each student owns an account holding the current credibility and the
//! ordered violation history. Concurrency model:
//!
//! - the account map sits behind an `RwLock`; `record` takes it shared,
//!   registration and snapshots take it exclusive;
//! - every account sits behind its own `Mutex`, so the read-modify-write of
//!   one student's credibility is serialised without blocking records for
//!   other students.
//!
//! Holding the shared map lock for the full duration of `record` means an
//! exclusive snapshot never observes a half-applied violation.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::domain::error::{Result, SeatwiseError};
use crate::domain::ids::StudentId;
use crate::domain::student::Credibility;
use crate::domain::violation::{Violation, ViolationKind};

#[derive(Debug, Default)]
struct Account {
    credibility: Credibility,
    /// `(global sequence, violation)`, oldest first.
    history: Vec<(u64, Violation)>,
}

/// Per-student credibility accounts backed by an append-only audit log.
#[derive(Debug, Default)]
pub struct ViolationLedger {
    accounts: RwLock<HashMap<StudentId, Mutex<Account>>>,
    next_seq: AtomicU64,
}

impl ViolationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account at full credibility.
    ///
    /// Returns `false` when the student already has an account; the existing
    /// account is left untouched.
    pub fn register(&self, student_id: StudentId) -> bool {
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&student_id) {
            return false;
        }
        accounts.insert(student_id, Mutex::new(Account::default()));
        true
    }

    pub fn is_registered(&self, student_id: StudentId) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&student_id)
    }

    /// Record a violation of `kind` now and return the updated credibility.
    ///
    /// # Errors
    ///
    /// Returns `SeatwiseError::UnknownStudent` if the student has no account.
    /// Nothing is written in that case.
    pub fn record(&self, student_id: StudentId, kind: ViolationKind) -> Result<Credibility> {
        self.append(Violation::new(student_id, kind))
    }

    /// Append a fully formed violation (used when replaying a stored log).
    ///
    /// The penalty applied is always the kind's contract penalty, regardless
    /// of the `penalty` field carried by `violation`.
    pub fn append(&self, mut violation: Violation) -> Result<Credibility> {
        let accounts = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let account = accounts
            .get(&violation.student_id)
            .ok_or(SeatwiseError::UnknownStudent(violation.student_id))?;

        let mut account = account.lock().unwrap_or_else(PoisonError::into_inner);
        violation.penalty = violation.kind.penalty();
        let previous = account.credibility;
        account.credibility = previous.apply(violation.penalty);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        debug!(
            student_id = %violation.student_id,
            kind = %violation.kind,
            previous = previous.value(),
            current = account.credibility.value(),
            "violation appended"
        );
        account.history.push((seq, violation));
        Ok(account.credibility)
    }

    /// Violations recorded for a student, oldest first.
    pub fn history_for(&self, student_id: StudentId) -> Result<Vec<Violation>> {
        self.with_account(student_id, |account| {
            account.history.iter().map(|(_, v)| v.clone()).collect()
        })
    }

    pub fn credibility_of(&self, student_id: StudentId) -> Result<Credibility> {
        self.with_account(student_id, |account| account.credibility)
    }

    /// Consistent view of every account's credibility.
    ///
    /// Takes the map lock exclusively, so no `record` is in flight while the
    /// view is assembled.
    pub fn credibility_snapshot(&self) -> BTreeMap<StudentId, Credibility> {
        let accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        accounts
            .iter()
            .map(|(id, account)| {
                let account = account.lock().unwrap_or_else(PoisonError::into_inner);
                (*id, account.credibility)
            })
            .collect()
    }

    /// Every violation across all students, in recording order.
    pub fn audit_log(&self) -> Vec<Violation> {
        let accounts = self
            .accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(u64, Violation)> = accounts
            .values()
            .flat_map(|account| {
                account
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .history
                    .clone()
            })
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, v)| v).collect()
    }

    fn with_account<T>(&self, student_id: StudentId, f: impl FnOnce(&Account) -> T) -> Result<T> {
        let accounts = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let account = accounts
            .get(&student_id)
            .ok_or(SeatwiseError::UnknownStudent(student_id))?;
        let account = account.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ledger_with(ids: &[u64]) -> ViolationLedger {
        let ledger = ViolationLedger::new();
        for id in ids {
            assert!(ledger.register(StudentId(*id)));
        }
        ledger
    }

    #[test]
    fn test_new_account_starts_at_full_credibility() {
        let ledger = ledger_with(&[1]);
        assert_eq!(ledger.credibility_of(StudentId(1)).unwrap(), Credibility::MAX);
        assert!(ledger.history_for(StudentId(1)).unwrap().is_empty());
    }

    #[test]
    fn test_register_twice_keeps_existing_account() {
        let ledger = ledger_with(&[1]);
        ledger.record(StudentId(1), ViolationKind::Copying).unwrap();
        assert!(!ledger.register(StudentId(1)));
        assert_eq!(ledger.credibility_of(StudentId(1)).unwrap().value(), 85);
    }

    #[test]
    fn test_credibility_is_clamped_sum_of_penalties() {
        let ledger = ledger_with(&[1]);
        let kinds = [
            ViolationKind::UnauthorizedMaterial,
            ViolationKind::UnauthorizedMaterial,
            ViolationKind::Copying,
            ViolationKind::Communication,
            ViolationKind::Peeking,
        ];
        let mut expected = 100;
        for kind in kinds {
            expected = (expected + kind.penalty()).clamp(0, 100);
            let c = ledger.record(StudentId(1), kind).unwrap();
            assert_eq!(i32::from(c), expected);
        }
        assert_eq!(expected, 30);

        for _ in 0..5 {
            ledger
                .record(StudentId(1), ViolationKind::UnauthorizedMaterial)
                .unwrap();
        }
        assert_eq!(ledger.credibility_of(StudentId(1)).unwrap(), Credibility::MIN);
    }

    #[test]
    fn test_history_is_oldest_first() {
        let ledger = ledger_with(&[1]);
        ledger.record(StudentId(1), ViolationKind::Peeking).unwrap();
        ledger.record(StudentId(1), ViolationKind::Copying).unwrap();
        let history = ledger.history_for(StudentId(1)).unwrap();
        let kinds: Vec<_> = history.iter().map(|v| v.kind).collect();
        assert_eq!(kinds, vec![ViolationKind::Peeking, ViolationKind::Copying]);
        assert_eq!(history[1].penalty, -15);
    }

    #[test]
    fn test_unknown_student_leaves_everything_unchanged() {
        let ledger = ledger_with(&[1, 2]);
        ledger.record(StudentId(2), ViolationKind::Peeking).unwrap();
        let before = ledger.credibility_snapshot();

        let err = ledger
            .record(StudentId(9), ViolationKind::Copying)
            .unwrap_err();
        assert!(matches!(err, SeatwiseError::UnknownStudent(StudentId(9))));
        assert_eq!(ledger.credibility_snapshot(), before);
        assert_eq!(ledger.audit_log().len(), 1);
    }

    #[test]
    fn test_append_ignores_tampered_penalty() {
        let ledger = ledger_with(&[1]);
        let mut violation = Violation::new(StudentId(1), ViolationKind::Peeking);
        violation.penalty = -90;
        let c = ledger.append(violation).unwrap();
        assert_eq!(c.value(), 95);
        assert_eq!(ledger.history_for(StudentId(1)).unwrap()[0].penalty, -5);
    }

    #[test]
    fn test_audit_log_preserves_global_order() {
        let ledger = ledger_with(&[1, 2]);
        ledger.record(StudentId(2), ViolationKind::Peeking).unwrap();
        ledger.record(StudentId(1), ViolationKind::Copying).unwrap();
        ledger.record(StudentId(2), ViolationKind::Communication).unwrap();
        let order: Vec<_> = ledger
            .audit_log()
            .iter()
            .map(|v| (v.student_id.0, v.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                (2, ViolationKind::Peeking),
                (1, ViolationKind::Copying),
                (2, ViolationKind::Communication),
            ]
        );
    }

    #[test]
    fn test_concurrent_records_are_not_lost() {
        let ledger = Arc::new(ledger_with(&[1, 2, 3, 4]));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let id = StudentId(t % 4 + 1);
                    for _ in 0..3 {
                        ledger.record(id, ViolationKind::Peeking).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Two threads per student, three peeks each: 100 - 6 * 5.
        for id in 1..=4 {
            assert_eq!(ledger.credibility_of(StudentId(id)).unwrap().value(), 70);
            assert_eq!(ledger.history_for(StudentId(id)).unwrap().len(), 6);
        }
        assert_eq!(ledger.audit_log().len(), 24);
    }
}
