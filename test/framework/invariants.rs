//! # State Invariant Definitions & Verification
//!
//! Defines invariants that must hold across all ledger state transitions.
//! Invariants are checked after every action during state exploration and
//! can be composed via the `InvariantSet` builder.
//!
//! ## Complexity
//!
//! Snapshot lookups are linear, so most checks are O(m·d) in the number of
//! medications and doses. With exploration runs capped at a few dozen
//! actions this is negligible.

extern crate std;

use std::string::String;
use std::vec::Vec;

use super::LedgerSnapshot;

// ── Invariant Trait ──────────────────────────────────────────────────────────

/// A named invariant that can be verified against a state snapshot.
pub trait Invariant {
    /// Human-readable name for error messages.
    fn name(&self) -> &str;

    /// Check the invariant. Returns `Ok(())` on success, `Err(description)` on violation.
    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String>;
}

// ── Built-in Invariants ──────────────────────────────────────────────────────

/// **Dense Ids**: every id in `1..=count` resolves to a record carrying that id.
///
/// A gap means an id was allocated on a failure path or a record was lost.
pub struct DenseIds;

impl Invariant for DenseIds {
    fn name(&self) -> &str {
        "every allocated id resolves to its record"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for (id, med) in &snapshot.medications {
            match med {
                Some(m) if m.id == *id => {}
                Some(m) => {
                    return Err(std::format!("Medication key {} holds record id {}", id, m.id))
                }
                None => return Err(std::format!("Medication id {} allocated but missing", id)),
            }
        }
        for (id, dose) in &snapshot.doses {
            match dose {
                Some(d) if d.id == *id => {}
                Some(d) => return Err(std::format!("Dose key {} holds record id {}", id, d.id)),
                None => return Err(std::format!("Dose id {} allocated but missing", id)),
            }
        }
        Ok(())
    }
}

/// **Patient Index Consistency**: a patient's index lists exactly their
/// medications, in strictly increasing (creation) order.
pub struct PatientIndexConsistency;

impl Invariant for PatientIndexConsistency {
    fn name(&self) -> &str {
        "patient index == medications owned by patient, in creation order"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for (patient, ids) in &snapshot.patient_index {
            if ids.windows(2).any(|w| w[0] >= w[1]) {
                return Err(std::format!(
                    "Index for {:?} is not strictly increasing: {:?}",
                    patient, ids
                ));
            }

            for id in ids {
                match snapshot.medication(*id) {
                    Some(m) if m.patient == *patient => {}
                    Some(_) => {
                        return Err(std::format!(
                            "Medication {} indexed under {:?} belongs to another patient",
                            id, patient
                        ))
                    }
                    None => {
                        return Err(std::format!(
                            "Index for {:?} references unknown medication {}",
                            patient, id
                        ))
                    }
                }
            }

            let owned = snapshot
                .medications
                .iter()
                .filter_map(|(_, m)| m.as_ref())
                .filter(|m| m.patient == *patient)
                .count();
            if owned != ids.len() {
                return Err(std::format!(
                    "{:?} owns {} medications but index lists {}",
                    patient,
                    owned,
                    ids.len()
                ));
            }
        }
        Ok(())
    }
}

/// **Dose Ownership**: every dose references an existing medication and
/// carries that medication's patient.
pub struct DoseOwnership;

impl Invariant for DoseOwnership {
    fn name(&self) -> &str {
        "dose.patient == medication.patient"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for dose in snapshot.doses.iter().filter_map(|(_, d)| d.as_ref()) {
            let Some(med) = snapshot.medication(dose.medication_id) else {
                return Err(std::format!(
                    "Dose {} references unknown medication {}",
                    dose.id, dose.medication_id
                ));
            };
            if med.patient != dose.patient {
                return Err(std::format!(
                    "Dose {} patient differs from medication {} patient",
                    dose.id, med.id
                ));
            }
        }
        Ok(())
    }
}

/// **Taken / Actual-Time Pairing**: `actual_time` is present iff `taken`.
pub struct TakenActualPairing;

impl Invariant for TakenActualPairing {
    fn name(&self) -> &str {
        "dose.actual_time.is_some() == dose.taken"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for dose in snapshot.doses.iter().filter_map(|(_, d)| d.as_ref()) {
            if dose.actual_time.is_some() != dose.taken {
                return Err(std::format!(
                    "Dose {} has taken={} but actual_time={:?}",
                    dose.id, dose.taken, dose.actual_time
                ));
            }
        }
        Ok(())
    }
}

/// **Valid Medication Fields**: stored medications satisfy input validation.
pub struct ValidMedicationFields;

impl Invariant for ValidMedicationFields {
    fn name(&self) -> &str {
        "stored medications have name, dosage > 0, 1 <= frequency <= 24, interval > 0"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for med in snapshot.medications.iter().filter_map(|(_, m)| m.as_ref()) {
            if med.name.len() == 0
                || med.dosage == 0
                || !(1..=24).contains(&med.frequency_per_day)
                || med.interval_minutes == 0
            {
                return Err(std::format!("Medication {} stored with invalid fields", med.id));
            }
        }
        Ok(())
    }
}

/// **Bounded Compliance**: compliance is a percentage and equals the ratio
/// recomputed from the snapshot's dose records.
pub struct ComplianceMatchesDoses;

impl Invariant for ComplianceMatchesDoses {
    fn name(&self) -> &str {
        "compliance == floor(taken * 100 / scheduled), within 0..=100"
    }

    fn check(&self, snapshot: &LedgerSnapshot) -> Result<(), String> {
        for (id, rate) in &snapshot.compliance {
            if *rate > 100 {
                return Err(std::format!("Medication {} compliance {} > 100", id, rate));
            }

            let doses: Vec<_> = snapshot
                .doses
                .iter()
                .filter_map(|(_, d)| d.as_ref())
                .filter(|d| d.medication_id == *id)
                .collect();
            let scheduled = doses.len() as u64;
            let taken = doses.iter().filter(|d| d.taken).count() as u64;
            let expected = if scheduled == 0 { 0 } else { taken * 100 / scheduled };

            if u64::from(*rate) != expected {
                return Err(std::format!(
                    "Medication {} compliance {} != expected {} ({} of {})",
                    id, rate, expected, taken, scheduled
                ));
            }
        }
        Ok(())
    }
}

// ── Invariant Set ────────────────────────────────────────────────────────────

/// A composable set of invariants that are checked together.
pub struct InvariantSet {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantSet {
    /// Create an empty invariant set.
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Create a set pre-loaded with all built-in ledger invariants.
    pub fn ledger_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(DenseIds));
        set.add(Box::new(PatientIndexConsistency));
        set.add(Box::new(DoseOwnership));
        set.add(Box::new(TakenActualPairing));
        set.add(Box::new(ValidMedicationFields));
        set.add(Box::new(ComplianceMatchesDoses));
        set
    }

    /// Add a custom invariant.
    pub fn add(&mut self, invariant: Box<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Verify all invariants against a snapshot.
    /// Returns a list of (invariant_name, violation_message) for all failures.
    pub fn check_all(&self, snapshot: &LedgerSnapshot) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(snapshot) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    /// Assert all invariants hold, panicking with details on violation.
    pub fn assert_all(&self, snapshot: &LedgerSnapshot) {
        let violations = self.check_all(snapshot);
        if !violations.is_empty() {
            let mut report = String::from("Invariant violations detected:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }

    /// Number of invariants in the set.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for InvariantSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Transition Invariants ────────────────────────────────────────────────────

/// Invariants that verify the relationship between two consecutive snapshots
/// (before and after an action).
pub trait TransitionInvariant {
    fn name(&self) -> &str;
    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String>;
}

/// **Monotonic Counters**: id counters never decrease.
pub struct MonotonicCounters;

impl TransitionInvariant for MonotonicCounters {
    fn name(&self) -> &str {
        "medication and dose counters never decrease"
    }

    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String> {
        if after.medication_count < before.medication_count {
            return Err(std::format!(
                "Medication counter went backwards: {} -> {}",
                before.medication_count, after.medication_count
            ));
        }
        if after.dose_count < before.dose_count {
            return Err(std::format!(
                "Dose counter went backwards: {} -> {}",
                before.dose_count, after.dose_count
            ));
        }
        Ok(())
    }
}

/// **One-Way Deactivation**: an inactive medication never becomes active,
/// and no field other than `active` ever changes.
pub struct MedicationStateMachine;

impl TransitionInvariant for MedicationStateMachine {
    fn name(&self) -> &str {
        "medications only move active -> inactive"
    }

    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String> {
        for old in before.medications.iter().filter_map(|(_, m)| m.as_ref()) {
            let Some(new) = after.medication(old.id) else {
                return Err(std::format!("Medication {} disappeared", old.id));
            };
            if !old.active && new.active {
                return Err(std::format!("Medication {} was reactivated", old.id));
            }
            let mut unchanged = new.clone();
            unchanged.active = old.active;
            if &unchanged != old {
                return Err(std::format!(
                    "Medication {} changed a field other than `active`",
                    old.id
                ));
            }
        }
        Ok(())
    }
}

/// **Write-Once Doses**: a dose record never changes after creation.
pub struct WriteOnceDoses;

impl TransitionInvariant for WriteOnceDoses {
    fn name(&self) -> &str {
        "dose records are immutable"
    }

    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String> {
        for old in before.doses.iter().filter_map(|(_, d)| d.as_ref()) {
            if after.dose(old.id) != Some(old) {
                return Err(std::format!("Dose {} was modified or removed", old.id));
            }
        }
        Ok(())
    }
}

/// **Monotonic Time**: the ledger timestamp never decreases between snapshots.
pub struct MonotonicTime;

impl TransitionInvariant for MonotonicTime {
    fn name(&self) -> &str {
        "ledger time never decreases"
    }

    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String> {
        if after.timestamp < before.timestamp {
            return Err(std::format!(
                "Time went backwards: {} -> {}",
                before.timestamp, after.timestamp
            ));
        }
        Ok(())
    }
}

/// **Rejection Leaves No Trace**: a call that returned a contract error
/// changed no counter, record, index, flag or compliance figure.
///
/// Only meaningful for rejected actions, so it is not part of
/// `TransitionInvariantSet::ledger_defaults`; the state explorer applies it
/// whenever an action ends in `ActionOutcome::ExpectedError`.
pub struct RejectedCallIsNoop;

impl TransitionInvariant for RejectedCallIsNoop {
    fn name(&self) -> &str {
        "a rejected call leaves ledger state untouched"
    }

    fn check(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) -> Result<(), String> {
        let after_at_same_time = LedgerSnapshot {
            timestamp: before.timestamp,
            ..after.clone()
        };
        if &after_at_same_time == before {
            return Ok(());
        }

        let mut changed = Vec::new();
        if after.medication_count != before.medication_count
            || after.medications != before.medications
        {
            changed.push("medications");
        }
        if after.dose_count != before.dose_count || after.doses != before.doses {
            changed.push("doses");
        }
        if after.patient_index != before.patient_index {
            changed.push("patient index");
        }
        if after.prescribers != before.prescribers {
            changed.push("prescribers");
        }
        if after.compliance != before.compliance {
            changed.push("compliance");
        }
        Err(std::format!("Rejected call changed: {}", changed.join(", ")))
    }
}

/// Composite checker for transition invariants.
pub struct TransitionInvariantSet {
    invariants: Vec<Box<dyn TransitionInvariant>>,
}

impl TransitionInvariantSet {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Create a set pre-loaded with all built-in transition invariants.
    pub fn ledger_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(MonotonicCounters));
        set.add(Box::new(MedicationStateMachine));
        set.add(Box::new(WriteOnceDoses));
        set.add(Box::new(MonotonicTime));
        set
    }

    pub fn add(&mut self, invariant: Box<dyn TransitionInvariant>) {
        self.invariants.push(invariant);
    }

    pub fn check_all(
        &self,
        before: &LedgerSnapshot,
        after: &LedgerSnapshot,
    ) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(before, after) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    pub fn assert_all(&self, before: &LedgerSnapshot, after: &LedgerSnapshot) {
        let violations = self.check_all(before, after);
        if !violations.is_empty() {
            let mut report = String::from("Transition invariant violations:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }
}

impl Default for TransitionInvariantSet {
    fn default() -> Self {
        Self::new()
    }
}
