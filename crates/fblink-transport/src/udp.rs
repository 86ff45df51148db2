use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use bytes::{Buf, BytesMut};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::layer::{CommLayer, LinkParams};

/// Largest datagram either side will emit: Ethernet MTU minus IP/UDP headers.
const MAX_DATAGRAM: usize = 1472;

const PUBLISHER_RECV_ERR: &str = "publishers cannot receive data";
const SUBSCRIBER_SEND_ERR: &str = "subscribers cannot send data";

/// Bottom layer for the PUBLISHER service type: a multicast sender. Each
/// `send` emits exactly one datagram; every read is a capability violation.
#[derive(Default)]
pub struct UdpPublisherLayer {
    socket: Option<UdpSocket>,
    target: Option<SocketAddr>,
}

impl UdpPublisherLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommLayer for UdpPublisherLayer {
    fn open(&mut self, params: &LinkParams) -> Result<()> {
        let local: SocketAddr = (Ipv4Addr::UNSPECIFIED, 0).into();
        let socket = UdpSocket::bind(local).map_err(|e| TransportError::Bind {
            addr: local,
            source: e,
        })?;
        info!(target = %params.addr, "udp publisher ready");
        self.socket = Some(socket);
        self.target = Some(params.addr);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.socket.take().is_some() {
            debug!("udp publisher closed");
        }
        self.target = None;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        let (socket, target) = match (self.socket.as_ref(), self.target) {
            (Some(socket), Some(target)) => (socket, target),
            _ => return Err(TransportError::NotConnected),
        };
        socket.send_to(data, target)?;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        Err(TransportError::Capability(PUBLISHER_RECV_ERR))
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some() && self.target.is_some()
    }
}

/// Bottom layer for the SUBSCRIBER service type: joins the multicast group
/// and buffers one datagram at a time. Primitive reads drain the buffered
/// datagram sequentially and pull the next one once it is exhausted. Every
/// send is a capability violation.
#[derive(Default)]
pub struct UdpSubscriberLayer {
    socket: Option<UdpSocket>,
    joined_group: Option<Ipv4Addr>,
    buf: BytesMut,
}

impl UdpSubscriberLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks for the next datagram and replaces the drain buffer with it.
    fn next_datagram(&mut self) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(TransportError::NotConnected)?;
        let mut chunk = [0u8; MAX_DATAGRAM];
        let len = socket.recv(&mut chunk)?;
        debug!(len, "udp subscriber buffered datagram");
        self.buf.clear();
        self.buf.extend_from_slice(&chunk[..len]);
        Ok(())
    }
}

impl CommLayer for UdpSubscriberLayer {
    fn open(&mut self, params: &LinkParams) -> Result<()> {
        let local: SocketAddr = (Ipv4Addr::UNSPECIFIED, params.addr.port()).into();
        let socket = UdpSocket::bind(local).map_err(|e| TransportError::Bind {
            addr: local,
            source: e,
        })?;
        if let IpAddr::V4(group) = params.addr.ip() {
            if group.is_multicast() {
                socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
                self.joined_group = Some(group);
                info!(group = %group, port = params.addr.port(), "udp subscriber joined group");
            }
        }
        self.socket = Some(socket);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(socket) = self.socket.take() {
            if let Some(group) = self.joined_group.take() {
                let _ = socket.leave_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED);
            }
            debug!("udp subscriber closed");
        }
        self.buf.clear();
        Ok(())
    }

    fn send(&mut self, _data: &[u8]) -> Result<()> {
        Err(TransportError::Capability(SUBSCRIBER_SEND_ERR))
    }

    fn read_byte(&mut self) -> Result<u8> {
        if !self.buf.has_remaining() {
            self.next_datagram()?;
        }
        Ok(self.buf.get_u8())
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}
