//! Events emitted by the compliance ledger.
//!
//! Every event is published under the topic pair `("MED_CMP", <name>)` so
//! indexers can subscribe to the whole contract with a single prefix.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

// ── Internal helper ───────────────────────────────────────────────────────────

fn emit<T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, topic: &str, data: T) {
    #[allow(deprecated)]
    env.events()
        .publish((symbol_short!("MED_CMP"), Symbol::new(env, topic)), data);
}

// ── Event structs ─────────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrescriberSetEvent {
    pub owner: Address,
    pub prescriber: Address,
    /// true = authorized, false = revoked.
    pub authorized: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicationAddedEvent {
    pub medication_id: u64,
    pub patient: Address,
    pub created_by: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicationDeactivatedEvent {
    pub medication_id: u64,
    pub caller: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoseRecordedEvent {
    pub dose_id: u64,
    pub medication_id: u64,
    pub patient: Address,
    pub taken: bool,
    pub timestamp: u64,
}

// ── Emit functions ────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, owner: Address) {
    emit(
        env,
        "init",
        InitializedEvent {
            owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_prescriber_set(env: &Env, owner: Address, prescriber: Address, authorized: bool) {
    emit(
        env,
        "presc_set",
        PrescriberSetEvent {
            owner,
            prescriber,
            authorized,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_medication_added(
    env: &Env,
    medication_id: u64,
    patient: Address,
    created_by: Address,
) {
    emit(
        env,
        "med_add",
        MedicationAddedEvent {
            medication_id,
            patient,
            created_by,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_medication_deactivated(env: &Env, medication_id: u64, caller: Address) {
    emit(
        env,
        "med_off",
        MedicationDeactivatedEvent {
            medication_id,
            caller,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_dose_recorded(
    env: &Env,
    dose_id: u64,
    medication_id: u64,
    patient: Address,
    taken: bool,
) {
    emit(
        env,
        "dose_rec",
        DoseRecordedEvent {
            dose_id,
            medication_id,
            patient,
            taken,
            timestamp: env.ledger().timestamp(),
        },
    );
}
