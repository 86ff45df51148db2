use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::layer::{CommLayer, LinkParams};

/// Bottom layer for the CLIENT service type: one persistent TCP stream
/// initiated towards a fixed remote address.
#[derive(Default)]
pub struct TcpClientLayer {
    stream: Option<TcpStream>,
}

impl TcpClientLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommLayer for TcpClientLayer {
    fn open(&mut self, params: &LinkParams) -> Result<()> {
        let stream = TcpStream::connect(params.addr).map_err(|e| TransportError::Connect {
            addr: params.addr,
            source: e,
        })?;
        info!(addr = %params.addr, "tcp client connected");
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            // The peer may already be gone; a failed shutdown is not an error
            // on the close path.
            let _ = stream.shutdown(Shutdown::Both);
            debug!("tcp client closed");
        }
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        stream_mut(&mut self.stream)?.write_all(data)?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_long(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_float(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(f32::from_be_bytes(buf))
    }

    fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Bottom layer for the SERVER service type: binds the address and accepts
/// exactly one peer. `open` blocks until that peer connects.
#[derive(Default)]
pub struct TcpServerLayer {
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
}

impl TcpServerLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommLayer for TcpServerLayer {
    fn open(&mut self, params: &LinkParams) -> Result<()> {
        let listener = TcpListener::bind(params.addr).map_err(|e| TransportError::Bind {
            addr: params.addr,
            source: e,
        })?;
        info!(addr = %params.addr, "tcp server listening");
        let (stream, peer) = listener.accept().map_err(TransportError::Accept)?;
        debug!(peer = %peer, "tcp server accepted peer");
        self.listener = Some(listener);
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if self.listener.take().is_some() {
            debug!("tcp server closed");
        }
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        stream_mut(&mut self.stream)?.write_all(data)?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_long(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_float(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(f32::from_be_bytes(buf))
    }

    fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        stream_mut(&mut self.stream)?.read_exact(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

fn stream_mut(stream: &mut Option<TcpStream>) -> Result<&mut TcpStream> {
    stream.as_mut().ok_or(TransportError::NotConnected)
}
