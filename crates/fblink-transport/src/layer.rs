use std::net::SocketAddr;

use crate::error::{Result, TransportError};
use crate::tcp::{TcpClientLayer, TcpServerLayer};
use crate::udp::{UdpPublisherLayer, UdpSubscriberLayer};

/// The four IEC 61499 communication service interface kinds. Determines
/// which transport the [`IpLayer`] instantiates when a connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Client,
    Server,
    Publisher,
    Subscriber,
}

/// Everything a transport needs to open a connection: the remote (or bind)
/// address and the service kind.
#[derive(Debug, Clone, Copy)]
pub struct LinkParams {
    pub addr: SocketAddr,
    pub service: ServiceType,
}

impl LinkParams {
    pub fn new(addr: SocketAddr, service: ServiceType) -> Self {
        Self { addr, service }
    }
}

/// One link in the communication layer stack.
///
/// Layers above the bottom delegate every operation to the layer they own
/// below; the transport at the bottom performs the socket I/O. The primitive
/// reads default to composing [`read_byte`](CommLayer::read_byte), so a
/// transport that buffers bytes (or refuses reads outright) only has to
/// implement that one method.
pub trait CommLayer {
    /// Opens the connection, building any layers still missing below.
    fn open(&mut self, params: &LinkParams) -> Result<()>;

    /// Closes this layer and everything below it.
    fn close(&mut self) -> Result<()>;

    /// Sends one encoded frame.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Reads the next raw byte, blocking until it arrives.
    fn read_byte(&mut self) -> Result<u8>;

    /// Reads 8 bytes as a big-endian signed integer.
    fn read_long(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        for b in &mut buf {
            *b = self.read_byte()?;
        }
        Ok(i64::from_be_bytes(buf))
    }

    /// Reads 4 bytes as a big-endian IEEE 754 single.
    fn read_float(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        for b in &mut buf {
            *b = self.read_byte()?;
        }
        Ok(f32::from_be_bytes(buf))
    }

    /// Reads 8 bytes as a big-endian IEEE 754 double.
    fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        for b in &mut buf {
            *b = self.read_byte()?;
        }
        Ok(f64::from_be_bytes(buf))
    }

    /// Whether this layer currently has an open connection.
    fn is_connected(&self) -> bool;
}

/// The IP dispatch layer.
///
/// Stays agnostic of TCP vs. UDP: at open time it instantiates exactly one
/// transport for the requested [`ServiceType`] and owns it as the layer
/// below. No further type switching happens after construction.
#[derive(Default)]
pub struct IpLayer {
    below: Option<Box<dyn CommLayer + Send>>,
    connected: bool,
}

impl IpLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn below_mut(&mut self) -> Result<&mut (dyn CommLayer + Send)> {
        match self.below.as_mut() {
            Some(below) => Ok(below.as_mut()),
            None => Err(TransportError::NotConnected),
        }
    }
}

impl CommLayer for IpLayer {
    fn open(&mut self, params: &LinkParams) -> Result<()> {
        let mut below: Box<dyn CommLayer + Send> = match params.service {
            ServiceType::Client => Box::new(TcpClientLayer::new()),
            ServiceType::Server => Box::new(TcpServerLayer::new()),
            ServiceType::Publisher => Box::new(UdpPublisherLayer::new()),
            ServiceType::Subscriber => Box::new(UdpSubscriberLayer::new()),
        };
        below.open(params)?;
        self.connected = below.is_connected();
        self.below = Some(below);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(below) = self.below.as_mut() {
            below.close()?;
        }
        self.below = None;
        self.connected = false;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.below_mut()?.send(data)
    }

    fn read_byte(&mut self) -> Result<u8> {
        self.below_mut()?.read_byte()
    }

    fn read_long(&mut self) -> Result<i64> {
        self.below_mut()?.read_long()
    }

    fn read_float(&mut self) -> Result<f32> {
        self.below_mut()?.read_float()
    }

    fn read_double(&mut self) -> Result<f64> {
        self.below_mut()?.read_double()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopened_layer_reports_disconnected() {
        let mut layer = IpLayer::new();
        assert!(!layer.is_connected());
        assert!(matches!(
            layer.read_byte(),
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            layer.send(&[1, 2, 3]),
            Err(TransportError::NotConnected)
        ));
    }

    #[test]
    fn close_without_open_is_a_no_op() {
        let mut layer = IpLayer::new();
        layer.close().unwrap();
        assert!(!layer.is_connected());
    }
}
