use fblink_transport::TransportError;
use fblink_types::TypeError;

/// Errors raised by the typed data buffer.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The position cursor is exhausted: more slots were read than the
    /// schema declares.
    #[error("no more elements to access")]
    NoMoreElements,

    /// An accessor was called against a slot holding a different kind.
    /// Callers are expected to check with the matching `is_*` first.
    #[error("attempted to access {requested} {requested_shape} where {stored} {stored_shape} is stored")]
    TypeMismatch {
        requested: &'static str,
        requested_shape: &'static str,
        stored: &'static str,
        stored_shape: &'static str,
    },

    /// A slot was read before any receive filled it.
    #[error("slot {index} holds no received value")]
    EmptySlot { index: usize },

    /// A received tag byte named no supported wire type.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The layer below failed while flushing or filling the buffer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
