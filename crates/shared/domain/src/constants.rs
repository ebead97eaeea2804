/// Storage key the agreement wizard writes its draft under.
pub const DEFAULT_DRAFT_KEY: &str = "agreementWizardDraft";

/// JSON field carrying the save timestamp inside a stored draft.
pub const LAST_SAVED_FIELD: &str = "lastSaved";

/// Autosave period in milliseconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 30_000;

/// Index of the submit step in the agreement wizard.
pub const DEFAULT_FINAL_STEP: u32 = 14;

/// Steps at or below this index have nowhere to go back to.
pub const FIRST_STEP: u32 = 1;
