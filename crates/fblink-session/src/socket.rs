use fblink_codec::{DataBuffer, Schema};
use fblink_transport::{CommLayer, IpLayer};
use fblink_types::DateAndTime;
use tracing::{debug, info};

use crate::error::Result;
use crate::params::ConnectionParams;

/// The codec arrangement over one link.
///
/// Symmetric schemas run both directions through a single codec, the common
/// case for echo-style CLIENT/SERVER pairs. Asymmetric schemas get one codec
/// per direction over the same link: the input codec encodes what this side
/// sends, the output codec decodes what it receives.
enum CodecPair {
    Shared(DataBuffer),
    Split {
        input: DataBuffer,
        output: DataBuffer,
    },
}

/// A connected, schema-typed communication endpoint.
///
/// Wraps the transport stack and the per-direction codecs behind one typed
/// surface: `put_*` stages outgoing values, [`send_data`](FbSocket::send_data)
/// flushes them, [`recv_data`](FbSocket::recv_data) blocks for the next
/// incoming frame, and `is_*`/`get_*` consume it in schema order.
pub struct FbSocket {
    link: IpLayer,
    codecs: CodecPair,
}

impl FbSocket {
    /// Opens the transport described by the parameters and builds the codec
    /// arrangement from the declared schemas.
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        let mut link = IpLayer::new();
        link.open(&params.link_params())?;
        let codecs = if params.symmetric() {
            debug!("symmetric schemas, sharing one codec for both directions");
            CodecPair::Shared(DataBuffer::new(params.inputs().clone()))
        } else {
            debug!("asymmetric schemas, splitting input and output codecs");
            CodecPair::Split {
                input: DataBuffer::new(params.inputs().clone()),
                output: DataBuffer::new(params.outputs().clone()),
            }
        };
        info!(addr = %params.addr(), service = ?params.service(), "session open");
        Ok(Self { link, codecs })
    }

    /// Whether this socket runs separate input and output codecs.
    pub fn is_split(&self) -> bool {
        matches!(self.codecs, CodecPair::Split { .. })
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Closes the underlying connection.
    pub fn disconnect(&mut self) -> Result<()> {
        self.link.close()?;
        Ok(())
    }

    /// Schema of the sending direction.
    pub fn input_schema(&self) -> &Schema {
        self.encoder_ref().schema()
    }

    /// Full-frame capacity of the sending direction, in bytes.
    pub fn capacity(&self) -> usize {
        self.encoder_ref().capacity()
    }

    /// The encoded bytes staged for the next send.
    pub fn frame(&self) -> &[u8] {
        self.encoder_ref().frame()
    }

    /// Schema of the receiving direction.
    pub fn output_schema(&self) -> &Schema {
        self.decoder_ref().schema()
    }

    /// Anchors DATE_AND_TIME decoding for both directions.
    pub fn set_time_reference(&mut self, reference: &DateAndTime) {
        match &mut self.codecs {
            CodecPair::Shared(codec) => codec.set_time_reference(reference),
            CodecPair::Split { input, output } => {
                input.set_time_reference(reference);
                output.set_time_reference(reference);
            }
        }
    }

    /// Flushes the staged outgoing frame.
    pub fn send_data(&mut self) -> Result<()> {
        let Self { link, codecs } = self;
        match codecs {
            CodecPair::Shared(codec) => codec.send_data(link)?,
            CodecPair::Split { input, .. } => input.send_data(link)?,
        }
        Ok(())
    }

    /// Sends a bare acknowledgement frame.
    pub fn send_ack(&mut self) -> Result<()> {
        let Self { link, codecs } = self;
        match codecs {
            CodecPair::Shared(codec) => codec.send_ack(link)?,
            CodecPair::Split { input, .. } => input.send_ack(link)?,
        }
        Ok(())
    }

    /// Blocks until the next incoming frame is decoded, then rewinds the
    /// receive cursor for consumption.
    pub fn recv_data(&mut self) -> Result<()> {
        let Self { link, codecs } = self;
        match codecs {
            CodecPair::Shared(codec) => codec.recv_data(link)?,
            CodecPair::Split { output, .. } => output.recv_data(link)?,
        }
        Ok(())
    }

    /// The codec that encodes what this side sends (the remote block's
    /// declared inputs).
    fn encoder(&mut self) -> &mut DataBuffer {
        match &mut self.codecs {
            CodecPair::Shared(codec) => codec,
            CodecPair::Split { input, .. } => input,
        }
    }

    /// The codec that decodes what this side receives (the remote block's
    /// declared outputs).
    fn decoder(&mut self) -> &mut DataBuffer {
        match &mut self.codecs {
            CodecPair::Shared(codec) => codec,
            CodecPair::Split { output, .. } => output,
        }
    }

    fn encoder_ref(&self) -> &DataBuffer {
        match &self.codecs {
            CodecPair::Shared(codec) => codec,
            CodecPair::Split { input, .. } => input,
        }
    }

    fn decoder_ref(&self) -> &DataBuffer {
        match &self.codecs {
            CodecPair::Shared(codec) => codec,
            CodecPair::Split { output, .. } => output,
        }
    }

    // --- staging outgoing values ---

    pub fn put_bool(&mut self, value: bool) -> bool {
        self.encoder().put_bool(value)
    }

    pub fn put_bool_array(&mut self, values: &[bool]) -> bool {
        self.encoder().put_bool_array(values)
    }

    pub fn put_int(&mut self, value: i32) -> bool {
        self.encoder().put_int(value)
    }

    pub fn put_int_array(&mut self, values: &[i32]) -> bool {
        self.encoder().put_int_array(values)
    }

    pub fn put_long(&mut self, value: i64) -> bool {
        self.encoder().put_long(value)
    }

    pub fn put_long_array(&mut self, values: &[i64]) -> bool {
        self.encoder().put_long_array(values)
    }

    pub fn put_float(&mut self, value: f32) -> bool {
        self.encoder().put_float(value)
    }

    pub fn put_float_array(&mut self, values: &[f32]) -> bool {
        self.encoder().put_float_array(values)
    }

    pub fn put_double(&mut self, value: f64) -> bool {
        self.encoder().put_double(value)
    }

    pub fn put_double_array(&mut self, values: &[f64]) -> bool {
        self.encoder().put_double_array(values)
    }

    pub fn put_str(&mut self, value: &str) -> bool {
        self.encoder().put_str(value)
    }

    pub fn put_str_array(&mut self, values: &[String]) -> bool {
        self.encoder().put_str_array(values)
    }

    pub fn put_date_and_time(&mut self, value: &DateAndTime) -> bool {
        self.encoder().put_date_and_time(value)
    }

    pub fn put_date_and_time_array(&mut self, values: &[DateAndTime]) -> bool {
        self.encoder().put_date_and_time_array(values)
    }

    // --- inspecting the next incoming slot ---

    pub fn is_bool(&self) -> bool {
        self.decoder_ref().is_bool()
    }

    pub fn is_int(&self) -> bool {
        self.decoder_ref().is_int()
    }

    pub fn is_long(&self) -> bool {
        self.decoder_ref().is_long()
    }

    pub fn is_float(&self) -> bool {
        self.decoder_ref().is_float()
    }

    pub fn is_double(&self) -> bool {
        self.decoder_ref().is_double()
    }

    pub fn is_date_and_time(&self) -> bool {
        self.decoder_ref().is_date_and_time()
    }

    pub fn is_str(&self) -> bool {
        self.decoder_ref().is_str()
    }

    pub fn is_bool_array(&self) -> bool {
        self.decoder_ref().is_bool_array()
    }

    pub fn is_int_array(&self) -> bool {
        self.decoder_ref().is_int_array()
    }

    pub fn is_long_array(&self) -> bool {
        self.decoder_ref().is_long_array()
    }

    pub fn is_float_array(&self) -> bool {
        self.decoder_ref().is_float_array()
    }

    pub fn is_double_array(&self) -> bool {
        self.decoder_ref().is_double_array()
    }

    pub fn is_date_and_time_array(&self) -> bool {
        self.decoder_ref().is_date_and_time_array()
    }

    pub fn is_str_array(&self) -> bool {
        self.decoder_ref().is_str_array()
    }

    // --- consuming received values ---

    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.decoder().get_bool()?)
    }

    pub fn get_int(&mut self) -> Result<i32> {
        Ok(self.decoder().get_int()?)
    }

    pub fn get_long(&mut self) -> Result<i64> {
        Ok(self.decoder().get_long()?)
    }

    pub fn get_float(&mut self) -> Result<f32> {
        Ok(self.decoder().get_float()?)
    }

    pub fn get_double(&mut self) -> Result<f64> {
        Ok(self.decoder().get_double()?)
    }

    pub fn get_date_and_time(&mut self) -> Result<DateAndTime> {
        Ok(self.decoder().get_date_and_time()?)
    }

    pub fn get_str(&mut self) -> Result<String> {
        Ok(self.decoder().get_str()?)
    }

    pub fn get_bool_array(&mut self) -> Result<Vec<bool>> {
        Ok(self.decoder().get_bool_array()?)
    }

    pub fn get_int_array(&mut self) -> Result<Vec<i32>> {
        Ok(self.decoder().get_int_array()?)
    }

    pub fn get_long_array(&mut self) -> Result<Vec<i64>> {
        Ok(self.decoder().get_long_array()?)
    }

    pub fn get_float_array(&mut self) -> Result<Vec<f32>> {
        Ok(self.decoder().get_float_array()?)
    }

    pub fn get_double_array(&mut self) -> Result<Vec<f64>> {
        Ok(self.decoder().get_double_array()?)
    }

    pub fn get_date_and_time_array(&mut self) -> Result<Vec<DateAndTime>> {
        Ok(self.decoder().get_date_and_time_array()?)
    }

    pub fn get_str_array(&mut self) -> Result<Vec<String>> {
        Ok(self.decoder().get_str_array()?)
    }

    // --- cursor control ---

    /// Position of the receive cursor.
    pub fn position(&self) -> isize {
        self.decoder_ref().position()
    }

    pub fn increment_position(&mut self) -> bool {
        self.decoder().increment_position()
    }

    /// Rewinds the cursors in both directions.
    pub fn rewind(&mut self) {
        match &mut self.codecs {
            CodecPair::Shared(codec) => codec.rewind(),
            CodecPair::Split { input, output } => {
                input.rewind();
                output.rewind();
            }
        }
    }

    /// Rewinds both directions and drops any staged bytes.
    pub fn reset(&mut self) {
        match &mut self.codecs {
            CodecPair::Shared(codec) => codec.reset(),
            CodecPair::Split { input, output } => {
                input.reset();
                output.reset();
            }
        }
    }
}

impl Drop for FbSocket {
    fn drop(&mut self) {
        let _ = self.link.close();
    }
}

#[cfg(test)]
mod tests {
    use std::net::{SocketAddr, TcpListener};
    use std::thread;
    use std::time::Duration;

    use fblink_codec::CodecError;
    use fblink_transport::{ServiceType, TransportError};
    use fblink_types::WireType;

    use super::*;
    use crate::error::SessionError;

    fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind should work");
        listener
            .local_addr()
            .expect("bound listener should have an address")
            .port()
    }

    fn connect_with_retry(params: &ConnectionParams) -> FbSocket {
        for _ in 0..100 {
            if let Ok(socket) = params.make_socket() {
                return socket;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("peer never became reachable");
    }

    #[test]
    fn symmetric_tcp_session_echoes_doubled_value() {
        let addr: SocketAddr = format!("127.0.0.1:{}", free_port()).parse().unwrap();

        let server = thread::spawn(move || {
            let mut params = ConnectionParams::new(addr, ServiceType::Server);
            params.add_input_output(WireType::Lreal);
            let mut socket = params.make_socket().expect("server should accept");
            assert!(!socket.is_split());

            socket.recv_data().expect("server should receive");
            let value = socket.get_double().expect("payload should be a double");
            socket.rewind();
            socket.put_double(value * 2.0);
            socket.send_data().expect("server should respond");
        });

        let mut params = ConnectionParams::new(addr, ServiceType::Client);
        params.add_input_output(WireType::Lreal);
        let mut client = connect_with_retry(&params);
        assert!(!client.is_split());
        assert!(client.is_connected());

        client.put_double(5.0);
        client.send_data().expect("client should send");
        client.recv_data().expect("client should receive the echo");
        assert!(client.is_double());
        assert_eq!(client.get_double().expect("echo should be a double"), 10.0);

        server.join().expect("server thread should complete");
    }

    #[test]
    fn one_way_session_acknowledges_with_empty_frame() {
        let addr: SocketAddr = format!("127.0.0.1:{}", free_port()).parse().unwrap();

        let server = thread::spawn(move || {
            let mut params = ConnectionParams::new(addr, ServiceType::Server);
            // The peer sends a string; this side sends nothing back.
            params.add_output(WireType::String);
            let mut socket = params.make_socket().expect("server should accept");
            assert!(socket.is_split());

            socket.recv_data().expect("server should receive");
            assert_eq!(socket.get_str().expect("payload should be a string"), "ping");
            // The sending schema is the NONE placeholder, so this acks.
            socket.send_data().expect("server should acknowledge");
        });

        let mut params = ConnectionParams::new(addr, ServiceType::Client);
        params.add_input(WireType::String);
        let mut client = connect_with_retry(&params);
        assert!(client.is_split());

        client.put_str("ping");
        client.send_data().expect("client should send");
        // The ack terminates the receive without filling any slot.
        client.recv_data().expect("client should see the ack");

        server.join().expect("server thread should complete");
    }

    #[test]
    fn split_codecs_keep_directions_isolated() {
        let addr: SocketAddr = "239.61.49.9:61509".parse().unwrap();
        let mut params = ConnectionParams::new(addr, ServiceType::Publisher);
        params.add_input(WireType::Real);
        params.add_output(WireType::Real);
        params.add_output(WireType::Bool);
        let mut socket = params.make_socket().expect("publisher should open");
        assert!(socket.is_split());

        // Staging a send must not surface through the receive accessors.
        socket.put_float(5.5);
        assert!(matches!(
            socket.get_float().expect_err("nothing was received"),
            SessionError::Codec(CodecError::EmptySlot { index: 0 })
        ));
    }

    #[test]
    fn publisher_session_cannot_receive() {
        let addr: SocketAddr = "239.61.49.9:61511".parse().unwrap();
        let mut params = ConnectionParams::new(addr, ServiceType::Publisher);
        params.add_input_output(WireType::Lreal);
        let mut socket = params.make_socket().expect("publisher should open");

        let err = socket.recv_data().expect_err("publishers only send");
        assert!(matches!(
            err,
            SessionError::Codec(CodecError::Transport(TransportError::Capability(_)))
        ));
    }

    #[test]
    fn subscriber_session_cannot_send() {
        // An ephemeral port keeps the bind from colliding; a unicast address
        // skips the group join.
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut params = ConnectionParams::new(addr, ServiceType::Subscriber);
        params.add_input_output(WireType::Lreal);
        let mut socket = params.make_socket().expect("subscriber should open");

        socket.put_double(5.0);
        let err = socket.send_data().expect_err("subscribers only receive");
        assert!(matches!(
            err,
            SessionError::Codec(CodecError::Transport(TransportError::Capability(_)))
        ));
    }

    #[test]
    fn symmetric_schemas_share_one_codec() {
        let addr: SocketAddr = "239.61.49.9:61510".parse().unwrap();
        let mut params = ConnectionParams::new(addr, ServiceType::Publisher);
        params.add_input_output(WireType::Real);
        let socket = params.make_socket().expect("publisher should open");
        assert!(!socket.is_split());
    }
}
