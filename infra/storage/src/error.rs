use std::borrow::Cow;

/// Errors raised by [`KeyValueStore`](crate::KeyValueStore) implementations.
#[fleetdesk_derive::fleet_error]
pub enum StorageError {
    #[error("Invalid storage key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage quota exceeded{}: {message}", format_context(.context))]
    QuotaExceeded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Stored value is not UTF-8{}: {source}", format_context(.context))]
    Utf8 { source: std::string::FromUtf8Error, context: Option<Cow<'static, str>> },

    #[error("Decompression failure{}: {source}", format_context(.context))]
    Decompress { source: lz4_flex::block::DecompressError, context: Option<Cow<'static, str>> },
}
