use std::borrow::Cow;

/// Operations slice error type.
#[fleetdesk_derive::fleet_error]
pub enum OperationsError {
    #[error("Invalid SLA{}: {message}", format_context(.context))]
    InvalidSla { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Quote cannot be versioned{}: {message}", format_context(.context))]
    NotVersionable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Arithmetic overflow{}: {message}", format_context(.context))]
    Overflow { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
