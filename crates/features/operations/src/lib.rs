//! Operations helpers shared by the ticket, fine and quote screens.
mod error;
pub mod quote;
pub mod sla;

pub use crate::error::{OperationsError, OperationsErrorExt};
pub use crate::quote::{LineItem, Quote, QuoteStatus, latest_version};
pub use crate::sla::{SlaCountdown, SlaStatus};
