use soroban_sdk::contracterror;

/// Error codes returned by the compliance ledger.
///
/// # Code ranges
/// | Range | Purpose                    |
/// |-------|----------------------------|
/// | 1 – 9 | Lifecycle / initialisation |
/// | 100+  | Ledger-specific failures   |
///
/// The set is closed; codes are part of the public interface and must never
/// be renumbered.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ComplianceError {
    // --- Lifecycle (1–2) ---
    NotInitialized = 1,
    AlreadyInitialized = 2,

    // --- Ledger (100–102) ---
    /// Caller is neither the owner, the patient, nor an authorized prescriber
    /// as the operation requires.
    NotAuthorized = 100,
    /// Empty or oversized name, zero dosage, frequency outside 1–24, or a
    /// taken flag that disagrees with the presence of an actual time.
    InvalidInput = 101,
    /// Referenced medication does not exist.
    NotFound = 102,
}
