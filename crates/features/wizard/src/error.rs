use fleetdesk_storage::StorageError;
use std::borrow::Cow;

/// Wizard core error type.
#[fleetdesk_derive::fleet_error]
pub enum WizardError {
    #[error("Draft storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Draft serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Corrupt draft{}: {message}", format_context(.context))]
    CorruptDraft { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Wizard state used outside of a wizard session{}", format_context(.context))]
    MissingContext { context: Option<Cow<'static, str>> },

    #[error("Invalid autosave interval{}: {message}", format_context(.context))]
    InvalidInterval { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No async runtime available{}: {source}", format_context(.context))]
    Runtime { source: tokio::runtime::TryCurrentError, context: Option<Cow<'static, str>> },
}
