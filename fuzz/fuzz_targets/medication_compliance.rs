#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use medication_compliance::{MedicationComplianceContract, MedicationComplianceContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String,
};

/// Actions covering every mutating ledger entry point.
///
/// Caller and patient are picked from a small user pool by index so that
/// authorized, unauthorized and self-service paths are all reachable.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    AuthorizePrescriber { caller: u8, prescriber: u8, status: bool },
    AddMedication { caller: u8, patient: u8, name_len: u8, dosage: u32, frequency: u8, interval: u16 },
    Deactivate { caller: u8, medication_id: u8 },
    RecordDose { caller: u8, medication_id: u8, scheduled: u32, taken: bool, with_actual: bool },
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let contract_id = env.register(MedicationComplianceContract, ());
    let client = MedicationComplianceContractClient::new(&env, &contract_id);

    if client.try_initialize(&owner).is_err() {
        return;
    }

    let mut users = vec![owner.clone()];
    for _ in 0..4 {
        users.push(Address::generate(&env));
    }
    let pick = |i: u8| users[i as usize % users.len()].clone();

    let mut last_med_count = 0u64;
    let mut last_dose_count = 0u64;

    for action in actions {
        match action {
            FuzzAction::AuthorizePrescriber { caller, prescriber, status } => {
                let _ = client.try_authorize_prescriber(&pick(caller), &pick(prescriber), &status);
            }
            FuzzAction::AddMedication { caller, patient, name_len, dosage, frequency, interval } => {
                let bytes: Vec<u8> = (0..name_len).map(|i| b'a' + i % 26).collect();
                let name = String::from_bytes(&env, &bytes);
                let _ = client.try_add_medication(
                    &pick(caller),
                    &pick(patient),
                    &name,
                    &dosage,
                    &(frequency as u32),
                    &(interval as u32),
                );
            }
            FuzzAction::Deactivate { caller, medication_id } => {
                let _ = client.try_deactivate_medication(&pick(caller), &(medication_id as u64));
            }
            FuzzAction::RecordDose { caller, medication_id, scheduled, taken, with_actual } => {
                let scheduled = scheduled as u64;
                let actual = if with_actual { Some(scheduled) } else { None };
                let _ = client.try_record_dose(
                    &pick(caller),
                    &(medication_id as u64),
                    &scheduled,
                    &taken,
                    &actual,
                );
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let med_count = client.get_medication_count();
        let dose_count = client.get_dose_count();
        assert!(med_count >= last_med_count, "INVARIANT VIOLATION: medication counter decreased");
        assert!(dose_count >= last_dose_count, "INVARIANT VIOLATION: dose counter decreased");
        assert!(med_count <= last_med_count + 1, "INVARIANT VIOLATION: more than one medication per call");
        assert!(dose_count <= last_dose_count + 1, "INVARIANT VIOLATION: more than one dose per call");

        if dose_count > last_dose_count {
            let dose = client
                .get_dose_record(&dose_count)
                .expect("INVARIANT VIOLATION: new dose id has no record");
            assert_eq!(dose.taken, dose.actual_time.is_some(), "INVARIANT VIOLATION: taken/actual_time mismatch");
            let med = client
                .get_medication(&dose.medication_id)
                .expect("INVARIANT VIOLATION: dose for unknown medication");
            assert_eq!(dose.patient, med.patient, "INVARIANT VIOLATION: dose patient differs from medication patient");
        }

        for id in 1..=med_count {
            let med = client
                .get_medication(&id)
                .expect("INVARIANT VIOLATION: allocated medication id has no record");
            assert!(med.dosage > 0 && (1..=24).contains(&med.frequency_per_day));
            assert!(med.interval_minutes > 0, "INVARIANT VIOLATION: stored interval is zero");
            let rate = client.calculate_compliance(&id, &0, &u64::MAX);
            assert!(rate <= 100, "INVARIANT VIOLATION: compliance above 100: {}", rate);
        }

        last_med_count = med_count;
        last_dose_count = dose_count;
    }
});
