use soroban_sdk::{Address, Env, Vec};

use crate::errors::ComplianceError;
use crate::types::{DataKey, DoseMark, DosePage, DoseRecord, Medication};

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

fn extend_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Initialized)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&DataKey::Owner, owner);
    env.storage().instance().set(&DataKey::Initialized, &true);
}

pub fn get_owner(env: &Env) -> Result<Address, ComplianceError> {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .ok_or(ComplianceError::NotInitialized)
}

// ── Counters ──────────────────────────────────────────────────────────────────

pub fn medication_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::MedicationCount)
        .unwrap_or(0)
}

pub fn dose_count(env: &Env) -> u64 {
    env.storage().instance().get(&DataKey::DoseCount).unwrap_or(0)
}

/// Bump a counter and return the new id. Ids start at 1 and are never reused.
fn next_id(env: &Env, key: &DataKey) -> u64 {
    let current: u64 = env.storage().instance().get(key).unwrap_or(0);
    let id = current.saturating_add(1);
    env.storage().instance().set(key, &id);
    id
}

pub fn next_medication_id(env: &Env) -> u64 {
    next_id(env, &DataKey::MedicationCount)
}

pub fn next_dose_id(env: &Env) -> u64 {
    next_id(env, &DataKey::DoseCount)
}

// ── Prescribers ───────────────────────────────────────────────────────────────

pub fn is_prescriber(env: &Env, principal: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Prescriber(principal.clone()))
        .unwrap_or(false)
}

/// Revocation removes the entry rather than storing `false`.
pub fn set_prescriber(env: &Env, principal: &Address, status: bool) {
    let key = DataKey::Prescriber(principal.clone());
    if status {
        env.storage().persistent().set(&key, &true);
        extend_ttl(env, &key);
    } else {
        env.storage().persistent().remove(&key);
    }
}

// ── Medications ───────────────────────────────────────────────────────────────

pub fn get_medication(env: &Env, id: u64) -> Option<Medication> {
    env.storage().persistent().get(&DataKey::Medication(id))
}

pub fn save_medication(env: &Env, medication: &Medication) {
    let key = DataKey::Medication(medication.id);
    env.storage().persistent().set(&key, medication);
    extend_ttl(env, &key);
}

pub fn get_patient_medications(env: &Env, patient: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::PatientMeds(patient.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn append_patient_medication(env: &Env, patient: &Address, medication_id: u64) {
    let key = DataKey::PatientMeds(patient.clone());
    let mut ids = get_patient_medications(env, patient);
    ids.push_back(medication_id);
    env.storage().persistent().set(&key, &ids);
    extend_ttl(env, &key);
}

// ── Dose records ──────────────────────────────────────────────────────────────

pub fn get_dose(env: &Env, id: u64) -> Option<DoseRecord> {
    env.storage().persistent().get(&DataKey::Dose(id))
}

pub fn save_dose(env: &Env, dose: &DoseRecord) {
    let key = DataKey::Dose(dose.id);
    env.storage().persistent().set(&key, dose);
    extend_ttl(env, &key);
}

// ── Dose log ──────────────────────────────────────────────────────────────────

/// Marks per dose-log page. Appending a dose rewrites one page and the page
/// directory, and a compliance query reads the directory plus the pages that
/// straddle its window bounds.
pub const DOSE_PAGE_SIZE: u32 = 64;

pub fn get_dose_pages(env: &Env, medication_id: u64) -> Vec<DosePage> {
    env.storage()
        .persistent()
        .get(&DataKey::DoseLog(medication_id))
        .unwrap_or(Vec::new(env))
}

pub fn get_dose_page(env: &Env, medication_id: u64, page: u32) -> Vec<DoseMark> {
    env.storage()
        .persistent()
        .get(&DataKey::DoseLogPage(medication_id, page))
        .unwrap_or(Vec::new(env))
}

/// Append `mark` to the medication's log, opening a new page when the last
/// one is full.
pub fn append_dose_mark(env: &Env, medication_id: u64, mark: &DoseMark) {
    let mut pages = get_dose_pages(env, medication_id);

    let (page_no, marks) = match pages.last() {
        Some(mut summary) if summary.scheduled < DOSE_PAGE_SIZE => {
            let page_no = pages.len() - 1;
            let mut marks = get_dose_page(env, medication_id, page_no);
            marks.push_back(mark.clone());
            summary.include(mark);
            pages.set(page_no, summary);
            (page_no, marks)
        }
        _ => {
            let page_no = pages.len();
            let mut marks = Vec::new(env);
            marks.push_back(mark.clone());
            pages.push_back(DosePage::first(mark));
            (page_no, marks)
        }
    };

    let page_key = DataKey::DoseLogPage(medication_id, page_no);
    env.storage().persistent().set(&page_key, &marks);
    extend_ttl(env, &page_key);

    let log_key = DataKey::DoseLog(medication_id);
    env.storage().persistent().set(&log_key, &pages);
    extend_ttl(env, &log_key);
}

/// Dose ids of a medication in recording order, gathered from its log pages.
pub fn get_medication_doses(env: &Env, medication_id: u64) -> Vec<u64> {
    let mut ids = Vec::new(env);
    for page_no in 0..get_dose_pages(env, medication_id).len() {
        for mark in get_dose_page(env, medication_id, page_no).iter() {
            ids.push_back(mark.dose_id);
        }
    }
    ids
}
