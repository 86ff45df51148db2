use fblink_codec::CodecError;
use fblink_transport::TransportError;

/// Errors surfaced by session setup and the typed socket facade.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
