use soroban_sdk::{contracttype, Address, String};

// ==================== Storage Keys ====================

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    // Singleton / lifecycle: instance storage
    Initialized,
    Owner,

    // Monotonic id counters: instance storage
    MedicationCount, // u64
    DoseCount, // u64

    // Prescriber flags: persistent, absent = unauthorized
    Prescriber(Address), // bool

    // Medications: persistent
    Medication(u64), // Medication
    PatientMeds(Address), // Vec<u64>, creation order

    // Dose records: persistent
    Dose(u64), // DoseRecord
    DoseLog(u64), // Vec<DosePage>, one summary per page
    DoseLogPage(u64, u32), // Vec<DoseMark>, at most DOSE_PAGE_SIZE entries
}

// ==================== Core Records ====================

/// A medication regimen registered for a patient.
///
/// Everything except `active` is fixed at creation; `active` only ever moves
/// from `true` to `false`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Medication {
    pub id: u64,
    pub patient: Address,
    pub name: String,
    pub dosage: u32,
    pub frequency_per_day: u32,
    /// Minutes between doses, always > 0 once stored.
    pub interval_minutes: u32,
    pub active: bool,
    /// Patient or prescriber that registered the medication.
    pub created_by: Address,
    pub created_at: u64,
}

/// A single recorded dose event. Write-once.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoseRecord {
    pub id: u64,
    pub medication_id: u64,
    pub patient: Address,
    /// Epoch seconds the dose was due.
    pub scheduled_time: u64,
    /// Epoch seconds the dose was taken; `None` for a missed dose.
    pub actual_time: Option<u64>,
    pub taken: bool,
    pub recorded_at: u64,
}

// ==================== Dose Log ====================

/// Compact entry in a medication's dose log.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoseMark {
    pub dose_id: u64,
    pub scheduled_time: u64,
    pub taken: bool,
}

/// Summary of one dose-log page. `scheduled` counts every mark on the page.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DosePage {
    pub earliest: u64,
    pub latest: u64,
    pub scheduled: u32,
    pub taken: u32,
}
