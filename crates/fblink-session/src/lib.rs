//! Session setup: turning declared schemas and an address into a connected,
//! typed socket.
//!
//! [`ConnectionParams`] collects the address, the [`ServiceType`] and the
//! input/output schemas, then [`ConnectionParams::make_socket`] opens the
//! transport stack and arranges the codecs: one shared codec when both
//! directions declare the same schema, separate input and output codecs
//! otherwise. The resulting [`FbSocket`] is the surface application code
//! talks to.

pub mod error;
pub mod params;
pub mod socket;

pub use error::{Result, SessionError};
pub use fblink_transport::ServiceType;
pub use params::ConnectionParams;
pub use socket::FbSocket;
