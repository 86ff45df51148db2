/// Errors raised by the wire type catalog.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// A received tag byte does not name any supported wire type.
    #[error("unsupported wire type tag {tag:#04x}")]
    UnsupportedTag { tag: u8 },

    /// A date string did not match the expected `dd.MM.yyyy HH:mm:ss` format.
    #[error("invalid date string {input:?} (expected dd.MM.yyyy HH:mm:ss)")]
    InvalidDate { input: String },
}

pub type Result<T> = std::result::Result<T, TypeError>;
