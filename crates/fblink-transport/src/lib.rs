//! Bottom half of the FORTE communication layer stack.
//!
//! A connection is a chain of layers. Each layer owns the layer below it and
//! delegates the structural operations (open, close, send, primitive reads)
//! downward until they reach a transport that performs the actual socket
//! I/O. The [`IpLayer`] in the middle picks one of four transports when the
//! connection is opened, based on the requested [`ServiceType`]:
//!
//! - [`TcpClientLayer`]: connects to a FORTE SERVER function block
//! - [`TcpServerLayer`]: accepts a connection from a FORTE CLIENT block
//! - [`UdpPublisherLayer`]: multicast sender towards SUBSCRIBE blocks
//! - [`UdpSubscriberLayer`]: multicast receiver for PUBLISH blocks
//!
//! Everything here is blocking; one caller drives a session sequentially.

pub mod error;
pub mod layer;
pub mod tcp;
pub mod udp;

pub use error::{Result, TransportError};
pub use layer::{CommLayer, IpLayer, LinkParams, ServiceType};
pub use tcp::{TcpClientLayer, TcpServerLayer};
pub use udp::{UdpPublisherLayer, UdpSubscriberLayer};
