//! # Medication Compliance Ledger
//!
//! Permissioned on-chain ledger of medications and dose events, with
//! per-medication compliance statistics.
//!
//! ## Roles
//! | Principal  | May                                                        |
//! |------------|------------------------------------------------------------|
//! | Owner      | authorize / revoke prescribers                             |
//! | Prescriber | add and deactivate medications for any patient             |
//! | Patient    | add and deactivate own medications, record own doses       |
//!
//! Reads are public. Every mutating entry point validates authorization and
//! input before touching storage, so a failed call leaves no trace.
//!
//! ## Compliance
//! `calculate_compliance` counts the dose records of one medication whose
//! `scheduled_time` falls inside an inclusive window and returns
//! `floor(taken * 100 / scheduled)`, or 0 when nothing was scheduled.
//! Doses are summarised in fixed-size log pages, so a query reads one
//! directory entry plus only the pages that straddle a window bound.
#![no_std]
#![allow(clippy::too_many_arguments)]

pub mod compliance;
pub mod errors;
pub mod events;
pub mod storage;
pub mod types;
pub mod validation;

pub use errors::ComplianceError;
pub use types::{DataKey, DoseMark, DosePage, DoseRecord, Medication};

use compliance::{ComplianceTally, PageOverlap};
use soroban_sdk::{contract, contractimpl, Address, Env, String, Vec};

const CONTRACT_VERSION: u32 = 1;

#[contract]
pub struct MedicationComplianceContract;

#[contractimpl]
impl MedicationComplianceContract {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Initialise the ledger with its owner. The owner cannot change afterwards.
    pub fn initialize(env: Env, owner: Address) -> Result<(), ComplianceError> {
        if storage::is_initialized(&env) {
            return Err(ComplianceError::AlreadyInitialized);
        }

        owner.require_auth();

        storage::set_owner(&env, &owner);
        events::publish_initialized(&env, owner);

        Ok(())
    }

    /// Return the ledger owner.
    pub fn get_owner(env: Env) -> Result<Address, ComplianceError> {
        storage::get_owner(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn version() -> u32 {
        CONTRACT_VERSION
    }

    // ── Access helpers ────────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ComplianceError> {
        if !storage::is_initialized(env) {
            return Err(ComplianceError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), ComplianceError> {
        let owner = storage::get_owner(env)?;
        if *caller != owner {
            return Err(ComplianceError::NotAuthorized);
        }
        Ok(())
    }

    /// Patient acting for themselves, or an authorized prescriber.
    fn require_patient_or_prescriber(
        env: &Env,
        caller: &Address,
        patient: &Address,
    ) -> Result<(), ComplianceError> {
        if caller == patient || storage::is_prescriber(env, caller) {
            return Ok(());
        }
        Err(ComplianceError::NotAuthorized)
    }

    // ── Prescriber authorization ──────────────────────────────────────────────

    /// Grant (`status = true`) or revoke prescriber rights. Owner only.
    pub fn authorize_prescriber(
        env: Env,
        caller: Address,
        prescriber: Address,
        status: bool,
    ) -> Result<bool, ComplianceError> {
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        storage::set_prescriber(&env, &prescriber, status);
        events::publish_prescriber_set(&env, caller, prescriber, status);

        Ok(true)
    }

    pub fn is_authorized_prescriber(env: Env, principal: Address) -> bool {
        storage::is_prescriber(&env, &principal)
    }

    // ── Medications ───────────────────────────────────────────────────────────

    /// Register a medication for `patient` and return its id.
    ///
    /// The caller must be the patient or an authorized prescriber. A zero
    /// `interval_minutes` is derived from the daily frequency.
    pub fn add_medication(
        env: Env,
        caller: Address,
        patient: Address,
        name: String,
        dosage: u32,
        frequency_per_day: u32,
        interval_minutes: u32,
    ) -> Result<u64, ComplianceError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        Self::require_patient_or_prescriber(&env, &caller, &patient)?;

        let interval_minutes =
            validation::validate_medication(&name, dosage, frequency_per_day, interval_minutes)?;

        let id = storage::next_medication_id(&env);
        let medication = Medication {
            id,
            patient: patient.clone(),
            name,
            dosage,
            frequency_per_day,
            interval_minutes,
            active: true,
            created_by: caller.clone(),
            created_at: env.ledger().timestamp(),
        };

        storage::save_medication(&env, &medication);
        storage::append_patient_medication(&env, &patient, id);
        events::publish_medication_added(&env, id, patient, caller);

        Ok(id)
    }

    /// Mark a medication inactive. Repeating the call is harmless.
    pub fn deactivate_medication(
        env: Env,
        caller: Address,
        medication_id: u64,
    ) -> Result<bool, ComplianceError> {
        caller.require_auth();
        Self::require_initialized(&env)?;

        let mut medication =
            storage::get_medication(&env, medication_id).ok_or(ComplianceError::NotFound)?;
        Self::require_patient_or_prescriber(&env, &caller, &medication.patient)?;

        if medication.active {
            medication.active = false;
            storage::save_medication(&env, &medication);
            events::publish_medication_deactivated(&env, medication_id, caller);
        }

        Ok(true)
    }

    pub fn get_medication(env: Env, medication_id: u64) -> Option<Medication> {
        storage::get_medication(&env, medication_id)
    }

    /// Medication ids for `patient` in creation order; empty when none exist.
    pub fn get_patient_medications(env: Env, patient: Address) -> Vec<u64> {
        storage::get_patient_medications(&env, &patient)
    }

    pub fn get_medication_count(env: Env) -> u64 {
        storage::medication_count(&env)
    }

    // ── Dose records ──────────────────────────────────────────────────────────

    /// Record a dose event for one of the caller's own medications.
    ///
    /// Only the medication's patient may record; prescribers cannot record on
    /// a patient's behalf. `actual_time` must be present exactly when `taken`
    /// is true. A missed dose is `taken = false` with no actual time.
    pub fn record_dose(
        env: Env,
        caller: Address,
        medication_id: u64,
        scheduled_time: u64,
        taken: bool,
        actual_time: Option<u64>,
    ) -> Result<u64, ComplianceError> {
        caller.require_auth();
        Self::require_initialized(&env)?;

        let medication =
            storage::get_medication(&env, medication_id).ok_or(ComplianceError::NotFound)?;
        if caller != medication.patient {
            return Err(ComplianceError::NotAuthorized);
        }
        validation::validate_dose(taken, &actual_time)?;

        let id = storage::next_dose_id(&env);
        let dose = DoseRecord {
            id,
            medication_id,
            patient: medication.patient.clone(),
            scheduled_time,
            actual_time,
            taken,
            recorded_at: env.ledger().timestamp(),
        };

        storage::save_dose(&env, &dose);
        storage::append_dose_mark(
            &env,
            medication_id,
            &DoseMark {
                dose_id: id,
                scheduled_time,
                taken,
            },
        );
        events::publish_dose_recorded(&env, id, medication_id, medication.patient, taken);

        Ok(id)
    }

    pub fn get_dose_record(env: Env, dose_id: u64) -> Option<DoseRecord> {
        storage::get_dose(&env, dose_id)
    }

    /// Dose ids recorded against a medication, oldest first.
    pub fn get_medication_doses(env: Env, medication_id: u64) -> Vec<u64> {
        storage::get_medication_doses(&env, medication_id)
    }

    pub fn get_dose_count(env: Env) -> u64 {
        storage::dose_count(&env)
    }

    // ── Compliance ────────────────────────────────────────────────────────────

    /// Percentage (0–100) of doses taken among those scheduled inside
    /// `[period_start, period_end]`. Returns 0 when no dose falls in the window.
    pub fn calculate_compliance(
        env: Env,
        medication_id: u64,
        period_start: u64,
        period_end: u64,
    ) -> u32 {
        let mut tally = ComplianceTally::default();
        if period_start > period_end {
            return tally.rate();
        }

        let pages = storage::get_dose_pages(&env, medication_id);
        for (page_no, page) in (0u32..).zip(pages.iter()) {
            match compliance::page_overlap(&page, period_start, period_end) {
                PageOverlap::Outside => {}
                PageOverlap::Inside => tally.absorb(&page),
                PageOverlap::Partial => {
                    for mark in storage::get_dose_page(&env, medication_id, page_no).iter() {
                        tally.observe(&mark, period_start, period_end);
                    }
                }
            }
        }

        tally.rate()
    }
}
