use bytes::{BufMut, BytesMut};
use fblink_transport::CommLayer;
use fblink_types::{tags, DateAndTime, TypeError, WireType};
use tracing::debug;

use crate::error::{CodecError, Result};
use crate::schema::{Schema, SchemaSlot};
use crate::value::Value;

/// Cursor value meaning "before the first slot".
const POSITION_INIT: isize = -1;

/// The typed data buffer: a fixed-schema sequence of typed slots backed by
/// one byte buffer, with a single forward position cursor sequencing both
/// the encode (`put_*` → [`send_data`](DataBuffer::send_data)) and decode
/// ([`recv_data`](DataBuffer::recv_data) → `is_*`/`get_*`) paths.
///
/// The schema is established at construction and never changes. Values must
/// be written and consumed in declared schema order; the cursor only ever
/// moves forward until the buffer is rewound or reset.
pub struct DataBuffer {
    schema: Schema,
    buf: BytesMut,
    position: isize,
    values: Vec<Option<Value>>,
    /// Absolute ms value at simulation time zero, used to decode
    /// DATE_AND_TIME slots.
    time_reference: i64,
}

impl DataBuffer {
    /// Builds a buffer for one direction's schema. The backing byte buffer
    /// is sized to hold exactly one full frame.
    pub fn new(mut schema: Schema) -> Self {
        if schema.is_empty() {
            // An empty direction still exchanges acknowledgements.
            schema.push(SchemaSlot::scalar(WireType::None));
        }
        let values = vec![None; schema.len()];
        let buf = BytesMut::with_capacity(schema.frame_capacity());
        Self {
            schema,
            buf,
            position: POSITION_INIT,
            values,
            time_reference: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of slots in the schema.
    pub fn len(&self) -> usize {
        self.schema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema.is_empty()
    }

    /// Full-frame capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.schema.frame_capacity()
    }

    /// The encoded bytes staged for the next send.
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Anchors DATE_AND_TIME decoding: received absolute values are
    /// interpreted relative to this timestamp's simulation start.
    pub fn set_time_reference(&mut self, reference: &DateAndTime) {
        self.time_reference = reference.simulation_start();
    }

    // --- cursor ---

    pub fn position(&self) -> isize {
        self.position
    }

    /// Moves the cursor, clamped to `[-1, len - 1]`.
    pub fn set_position(&mut self, position: isize) {
        let last = self.schema.len() as isize - 1;
        self.position = position.clamp(POSITION_INIT, last);
    }

    /// Advances the cursor one slot. Returns false once the cursor already
    /// sits on the last slot; it never wraps.
    pub fn increment_position(&mut self) -> bool {
        let previous = self.position;
        self.set_position(previous + 1);
        self.position > previous
    }

    /// Resets the cursor to before the first slot.
    pub fn rewind(&mut self) {
        self.position = POSITION_INIT;
    }

    /// Rewinds the cursor and clears the staged byte buffer.
    pub fn reset(&mut self) {
        self.rewind();
        self.buf.clear();
    }

    fn clamp_index(&self, position: isize) -> usize {
        let last = self.schema.len() as isize - 1;
        position.clamp(0, last) as usize
    }

    /// Declared wire type at a slot position (clamped into range).
    pub fn type_at(&self, position: isize) -> WireType {
        self.schema.slots()[self.clamp_index(position)].ty
    }

    /// Whether the slot at a position (clamped into range) is an array.
    pub fn is_array_at(&self, position: isize) -> bool {
        self.schema.slots()[self.clamp_index(position)].is_array()
    }

    fn next_type(&self) -> WireType {
        self.type_at(self.position + 1)
    }

    fn next_is_array(&self) -> bool {
        self.is_array_at(self.position + 1)
    }

    // --- encode ---

    /// Encodes a BOOL: the tag byte itself carries the value.
    pub fn put_bool(&mut self, value: bool) -> bool {
        self.buf.put_u8(bool_tag(value));
        self.increment_position()
    }

    /// Encodes a BOOL array. Unlike other arrays there is no shared element
    /// tag; each element is its own true/false tag byte.
    pub fn put_bool_array(&mut self, values: &[bool]) -> bool {
        self.put_array_marker(values.len());
        for &value in values {
            self.buf.put_u8(bool_tag(value));
        }
        self.increment_position()
    }

    /// Encodes one of the short integer kinds. The payload width comes from
    /// the declared slot type, not from the value: a SINT slot always
    /// encodes one payload byte regardless of the `i32` passed in.
    pub fn put_int(&mut self, value: i32) -> bool {
        let ty = self.next_type();
        self.buf.put_u8(ty.tag());
        self.put_int_payload(i64::from(value), payload_len(ty));
        self.increment_position()
    }

    pub fn put_int_array(&mut self, values: &[i32]) -> bool {
        let ty = self.next_type();
        self.put_array_header(ty.tag(), values.len());
        for &value in values {
            self.put_int_payload(i64::from(value), payload_len(ty));
        }
        self.increment_position()
    }

    /// Encodes a LINT/ULINT slot: full 8-byte payload.
    pub fn put_long(&mut self, value: i64) -> bool {
        let ty = self.next_type();
        self.buf.put_u8(ty.tag());
        self.buf.put_i64(value);
        self.increment_position()
    }

    pub fn put_long_array(&mut self, values: &[i64]) -> bool {
        let ty = self.next_type();
        self.put_array_header(ty.tag(), values.len());
        for &value in values {
            self.buf.put_i64(value);
        }
        self.increment_position()
    }

    pub fn put_float(&mut self, value: f32) -> bool {
        self.buf.put_u8(tags::REAL);
        self.buf.put_f32(value);
        self.increment_position()
    }

    pub fn put_float_array(&mut self, values: &[f32]) -> bool {
        self.put_array_header(tags::REAL, values.len());
        for &value in values {
            self.buf.put_f32(value);
        }
        self.increment_position()
    }

    pub fn put_double(&mut self, value: f64) -> bool {
        self.buf.put_u8(tags::LREAL);
        self.buf.put_f64(value);
        self.increment_position()
    }

    pub fn put_double_array(&mut self, values: &[f64]) -> bool {
        self.put_array_header(tags::LREAL, values.len());
        for &value in values {
            self.buf.put_f64(value);
        }
        self.increment_position()
    }

    /// Encodes a STRING: 2-byte length header plus raw bytes, no terminator.
    pub fn put_str(&mut self, value: &str) -> bool {
        self.buf.put_u8(tags::STRING);
        self.put_str_payload(value);
        self.increment_position()
    }

    pub fn put_str_array(&mut self, values: &[String]) -> bool {
        self.put_array_header(tags::STRING, values.len());
        for value in values {
            self.put_str_payload(value);
        }
        self.increment_position()
    }

    /// Encodes a DATE_AND_TIME as its absolute millisecond value.
    pub fn put_date_and_time(&mut self, value: &DateAndTime) -> bool {
        self.buf.put_u8(tags::DATE_AND_TIME);
        self.buf.put_i64(value.millis());
        self.increment_position()
    }

    pub fn put_date_and_time_array(&mut self, values: &[DateAndTime]) -> bool {
        self.put_array_header(tags::DATE_AND_TIME, values.len());
        for value in values {
            self.buf.put_i64(value.millis());
        }
        self.increment_position()
    }

    fn put_array_marker(&mut self, len: usize) {
        self.buf.put_u8(tags::ARRAY);
        self.buf.put_u16(len as u16);
    }

    fn put_array_header(&mut self, tag: u8, len: usize) {
        self.put_array_marker(len);
        self.buf.put_u8(tag);
    }

    /// Writes the low `len` big-endian bytes of `value`. Values wider than
    /// the declared payload are truncated; the remote sizes its reads by the
    /// declared type, so there is nowhere to put the extra bytes.
    fn put_int_payload(&mut self, value: i64, len: usize) {
        if len < 8 {
            let max = 1i64 << (8 * len as u32);
            let min = -(1i64 << (8 * len as u32 - 1));
            if value >= max || value < min {
                debug!(value, len, "integer exceeds declared payload width, truncating");
            }
        }
        let bytes = value.to_be_bytes();
        self.buf.put_slice(&bytes[8 - len..]);
    }

    fn put_str_payload(&mut self, value: &str) {
        if value.len() > usize::from(u16::MAX) {
            debug!(
                len = value.len(),
                "string exceeds the 2-byte length header, header wraps"
            );
        }
        self.buf.put_u16(value.len() as u16);
        self.buf.put_slice(value.as_bytes());
    }

    // --- type inspection ---

    pub fn is_bool(&self) -> bool {
        !self.next_is_array() && self.next_type() == WireType::Bool
    }

    pub fn is_int(&self) -> bool {
        !self.next_is_array() && self.next_type().is_int_kind()
    }

    pub fn is_long(&self) -> bool {
        !self.next_is_array() && self.next_type().is_long_kind()
    }

    pub fn is_float(&self) -> bool {
        !self.next_is_array() && self.next_type() == WireType::Real
    }

    pub fn is_double(&self) -> bool {
        !self.next_is_array() && self.next_type() == WireType::Lreal
    }

    pub fn is_date_and_time(&self) -> bool {
        !self.next_is_array() && self.next_type() == WireType::DateAndTime
    }

    pub fn is_str(&self) -> bool {
        !self.next_is_array() && self.next_type() == WireType::String
    }

    pub fn is_bool_array(&self) -> bool {
        self.next_is_array() && self.next_type() == WireType::Bool
    }

    pub fn is_int_array(&self) -> bool {
        self.next_is_array() && self.next_type().is_int_kind()
    }

    pub fn is_long_array(&self) -> bool {
        self.next_is_array() && self.next_type().is_long_kind()
    }

    pub fn is_float_array(&self) -> bool {
        self.next_is_array() && self.next_type() == WireType::Real
    }

    pub fn is_double_array(&self) -> bool {
        self.next_is_array() && self.next_type() == WireType::Lreal
    }

    pub fn is_date_and_time_array(&self) -> bool {
        self.next_is_array() && self.next_type() == WireType::DateAndTime
    }

    pub fn is_str_array(&self) -> bool {
        self.next_is_array() && self.next_type() == WireType::String
    }

    // --- decode accessors ---

    pub fn get_bool(&mut self) -> Result<bool> {
        match self.advance_and_take(WireType::Bool, false)? {
            Value::Bool(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Bool, false, &other)),
        }
    }

    pub fn get_int(&mut self) -> Result<i32> {
        match self.advance_and_take(WireType::Int, false)? {
            Value::Int(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Int, false, &other)),
        }
    }

    pub fn get_long(&mut self) -> Result<i64> {
        match self.advance_and_take(WireType::Lint, false)? {
            Value::Long(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Lint, false, &other)),
        }
    }

    pub fn get_float(&mut self) -> Result<f32> {
        match self.advance_and_take(WireType::Real, false)? {
            Value::Float(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Real, false, &other)),
        }
    }

    pub fn get_double(&mut self) -> Result<f64> {
        match self.advance_and_take(WireType::Lreal, false)? {
            Value::Double(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Lreal, false, &other)),
        }
    }

    pub fn get_date_and_time(&mut self) -> Result<DateAndTime> {
        match self.advance_and_take(WireType::DateAndTime, false)? {
            Value::DateAndTime(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::DateAndTime, false, &other)),
        }
    }

    pub fn get_str(&mut self) -> Result<String> {
        match self.advance_and_take(WireType::String, false)? {
            Value::Str(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::String, false, &other)),
        }
    }

    pub fn get_bool_array(&mut self) -> Result<Vec<bool>> {
        match self.advance_and_take(WireType::Bool, true)? {
            Value::BoolArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Bool, true, &other)),
        }
    }

    pub fn get_int_array(&mut self) -> Result<Vec<i32>> {
        match self.advance_and_take(WireType::Int, true)? {
            Value::IntArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Int, true, &other)),
        }
    }

    pub fn get_long_array(&mut self) -> Result<Vec<i64>> {
        match self.advance_and_take(WireType::Lint, true)? {
            Value::LongArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Lint, true, &other)),
        }
    }

    pub fn get_float_array(&mut self) -> Result<Vec<f32>> {
        match self.advance_and_take(WireType::Real, true)? {
            Value::FloatArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Real, true, &other)),
        }
    }

    pub fn get_double_array(&mut self) -> Result<Vec<f64>> {
        match self.advance_and_take(WireType::Lreal, true)? {
            Value::DoubleArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::Lreal, true, &other)),
        }
    }

    pub fn get_date_and_time_array(&mut self) -> Result<Vec<DateAndTime>> {
        match self.advance_and_take(WireType::DateAndTime, true)? {
            Value::DateAndTimeArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::DateAndTime, true, &other)),
        }
    }

    pub fn get_str_array(&mut self) -> Result<Vec<String>> {
        match self.advance_and_take(WireType::String, true)? {
            Value::StrArray(v) => Ok(v),
            other => Err(self.stored_mismatch(WireType::String, true, &other)),
        }
    }

    fn advance_and_take(&mut self, requested: WireType, want_array: bool) -> Result<Value> {
        let matches =
            self.next_is_array() == want_array && kind_matches(self.next_type(), requested);
        if !matches {
            return Err(self.declared_mismatch(requested, want_array));
        }
        if !self.increment_position() {
            return Err(CodecError::NoMoreElements);
        }
        let index = self.position as usize;
        self.values[index]
            .clone()
            .ok_or(CodecError::EmptySlot { index })
    }

    /// Mismatch against the declared schema slot the cursor is about to
    /// consume.
    fn declared_mismatch(&self, requested: WireType, want_array: bool) -> CodecError {
        let position = self.position + 1;
        CodecError::TypeMismatch {
            requested: requested.kind_name(),
            requested_shape: shape_name(want_array),
            stored: self.type_at(position).kind_name(),
            stored_shape: shape_name(self.is_array_at(position)),
        }
    }

    /// Mismatch against what a decode actually stored in the slot. Happens
    /// when the remote's frame disagrees with the declared schema.
    fn stored_mismatch(
        &self,
        requested: WireType,
        want_array: bool,
        stored: &Value,
    ) -> CodecError {
        let (kind, shape) = stored.described();
        CodecError::TypeMismatch {
            requested: requested.kind_name(),
            requested_shape: shape_name(want_array),
            stored: kind,
            stored_shape: shape,
        }
    }

    // --- frame I/O ---

    /// Flushes the staged frame through the layer below and resets for
    /// reuse. A buffer whose schema has nothing to send (leading NONE slot)
    /// sends the one-byte acknowledgement marker instead.
    pub fn send_data(&mut self, below: &mut dyn CommLayer) -> Result<()> {
        if self.next_type() == WireType::None {
            self.buf.put_u8(tags::ACK);
        }
        below.send(&self.buf)?;
        self.reset();
        Ok(())
    }

    /// Sends a bare acknowledgement without touching the staged frame.
    pub fn send_ack(&mut self, below: &mut dyn CommLayer) -> Result<()> {
        below.send(&[tags::ACK])?;
        Ok(())
    }

    /// Blocks until one full frame has been decoded into the typed slots,
    /// then rewinds so consumption starts from slot 0.
    ///
    /// Decoding is tag-driven: each slot starts with one tag byte that
    /// selects scalar, array, or the early-terminating acknowledgement.
    pub fn recv_data(&mut self, below: &mut dyn CommLayer) -> Result<()> {
        self.rewind();
        while self.increment_position() {
            let tag = below.read_byte()?;
            match tag {
                tags::ACK => {
                    // Acknowledgement frame: no payload slots follow.
                    self.reset();
                    return Ok(());
                }
                tags::ARRAY => {
                    let len = read_length_header(below)?;
                    self.decode_array(below, len)?;
                }
                _ => self.decode_scalar(below, tag)?,
            }
        }
        self.reset();
        Ok(())
    }

    fn decode_scalar(&mut self, below: &mut dyn CommLayer, tag: u8) -> Result<()> {
        let index = self.position as usize;
        let value = match tag {
            tags::BOOL_TRUE | tags::BOOL_FALSE => Value::Bool(tag == tags::BOOL_TRUE),
            tags::SINT | tags::USINT | tags::INT | tags::UINT | tags::DINT | tags::UDINT => {
                let len = payload_len(WireType::from_tag(tag)?);
                Value::Int(read_int_payload(below, len)?)
            }
            tags::LINT | tags::ULINT => Value::Long(below.read_long()?),
            tags::REAL => Value::Float(below.read_float()?),
            tags::LREAL => Value::Double(below.read_double()?),
            tags::DATE_AND_TIME => Value::DateAndTime(self.read_date_and_time(below)?),
            tags::STRING => Value::Str(read_string(below)?),
            other => return Err(TypeError::UnsupportedTag { tag: other }.into()),
        };
        self.values[index] = Some(value);
        Ok(())
    }

    fn decode_array(&mut self, below: &mut dyn CommLayer, len: usize) -> Result<()> {
        let index = self.position as usize;
        let tag = below.read_byte()?;
        let value = match tag {
            tags::BOOL_TRUE | tags::BOOL_FALSE => {
                // BOOL arrays carry no shared element tag; the byte that
                // discriminated the element type is already element 0.
                let mut elements = Vec::with_capacity(len);
                if len > 0 {
                    elements.push(tag == tags::BOOL_TRUE);
                    for _ in 1..len {
                        elements.push(below.read_byte()? == tags::BOOL_TRUE);
                    }
                }
                Value::BoolArray(elements)
            }
            tags::SINT | tags::USINT | tags::INT | tags::UINT | tags::DINT | tags::UDINT => {
                let width = payload_len(WireType::from_tag(tag)?);
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(read_int_payload(below, width)?);
                }
                Value::IntArray(elements)
            }
            tags::LINT | tags::ULINT => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(below.read_long()?);
                }
                Value::LongArray(elements)
            }
            tags::REAL => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(below.read_float()?);
                }
                Value::FloatArray(elements)
            }
            tags::LREAL => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(below.read_double()?);
                }
                Value::DoubleArray(elements)
            }
            tags::DATE_AND_TIME => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(self.read_date_and_time(below)?);
                }
                Value::DateAndTimeArray(elements)
            }
            tags::STRING => {
                let mut elements = Vec::with_capacity(len);
                for _ in 0..len {
                    elements.push(read_string(below)?);
                }
                Value::StrArray(elements)
            }
            other => return Err(TypeError::UnsupportedTag { tag: other }.into()),
        };
        self.values[index] = Some(value);
        Ok(())
    }

    fn read_date_and_time(&self, below: &mut dyn CommLayer) -> Result<DateAndTime> {
        let absolute = below.read_long()?;
        let mut dt = DateAndTime::from_simulation_start(self.time_reference);
        dt.set_simulation_secs((absolute - self.time_reference) / 1000);
        Ok(dt)
    }
}

fn bool_tag(value: bool) -> u8 {
    if value {
        tags::BOOL_TRUE
    } else {
        tags::BOOL_FALSE
    }
}

fn shape_name(is_array: bool) -> &'static str {
    if is_array {
        "array"
    } else {
        "value"
    }
}

/// Payload bytes of a scalar encoding: declared length minus the tag byte.
fn payload_len(ty: WireType) -> usize {
    ty.encoded_len().saturating_sub(1)
}

fn kind_matches(declared: WireType, requested: WireType) -> bool {
    if requested.is_int_kind() {
        declared.is_int_kind()
    } else if requested.is_long_kind() {
        declared.is_long_kind()
    } else {
        declared == requested
    }
}

/// Big-endian sign-extending read of a declared-width integer payload.
fn read_int_payload(below: &mut dyn CommLayer, len: usize) -> Result<i32> {
    let mut acc: i32 = 0;
    for i in 0..len {
        let byte = below.read_byte()?;
        if i == 0 {
            acc = i32::from(byte as i8);
        } else {
            acc = (acc << 8) | i32::from(byte);
        }
    }
    Ok(acc)
}

/// 2-byte big-endian length used by STRING payloads and array headers.
fn read_length_header(below: &mut dyn CommLayer) -> Result<usize> {
    let hi = below.read_byte()?;
    let lo = below.read_byte()?;
    Ok(usize::from(hi) << 8 | usize::from(lo))
}

fn read_string(below: &mut dyn CommLayer) -> Result<String> {
    let len = read_length_header(below)?;
    let mut bytes = Vec::with_capacity(len);
    for _ in 0..len {
        bytes.push(below.read_byte()?);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use fblink_transport::{LinkParams, Result as TransportResult, TransportError};

    use super::*;

    /// Feeds sent frames straight back to the reader.
    #[derive(Default)]
    struct Loopback {
        wire: BytesMut,
    }

    impl CommLayer for Loopback {
        fn open(&mut self, _params: &LinkParams) -> TransportResult<()> {
            Ok(())
        }

        fn close(&mut self) -> TransportResult<()> {
            Ok(())
        }

        fn send(&mut self, data: &[u8]) -> TransportResult<()> {
            self.wire.extend_from_slice(data);
            Ok(())
        }

        fn read_byte(&mut self) -> TransportResult<u8> {
            if !self.wire.has_remaining() {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "loopback wire drained",
                )));
            }
            Ok(self.wire.get_u8())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn schema_of(slots: &[SchemaSlot]) -> Schema {
        slots.iter().copied().collect()
    }

    #[test]
    fn lreal_frame_layout_matches_wire_format() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::Lreal)]));
        codec.put_double(5.0);
        let frame = codec.frame();
        assert_eq!(frame.len(), 9);
        assert_eq!(frame[0], tags::LREAL);
        assert_eq!(frame[1], 64);
        assert_eq!(frame[2], 20);
        assert!(frame[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn scalar_round_trip_through_loopback() {
        let reference = DateAndTime::from_year(2017);
        let schema = schema_of(&[
            SchemaSlot::scalar(WireType::Real),
            SchemaSlot::scalar(WireType::Int),
            SchemaSlot::scalar(WireType::Udint),
            SchemaSlot::scalar(WireType::Lint),
            SchemaSlot::scalar(WireType::String),
            SchemaSlot::scalar(WireType::DateAndTime),
        ]);
        let mut codec = DataBuffer::new(schema);
        codec.set_time_reference(&reference);

        let mut dt = reference;
        dt.set_simulation_secs(0);

        codec.put_float(5.5);
        codec.put_int(5);
        codec.put_int(5);
        codec.put_long(5);
        codec.put_str("five");
        codec.put_date_and_time(&dt);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        assert!(codec.is_float());
        assert_eq!(codec.get_float().unwrap(), 5.5);
        assert!(codec.is_int());
        assert_eq!(codec.get_int().unwrap(), 5);
        assert!(codec.is_int());
        assert_eq!(codec.get_int().unwrap(), 5);
        assert!(codec.is_long());
        assert_eq!(codec.get_long().unwrap(), 5);
        assert!(codec.is_str());
        assert_eq!(codec.get_str().unwrap(), "five");
        assert!(codec.is_date_and_time());
        let got = codec.get_date_and_time().unwrap();
        assert_eq!(got.simulation_secs(), 0);
        assert_eq!(got, dt);
    }

    #[test]
    fn negative_short_integers_sign_extend() {
        let mut codec = DataBuffer::new(schema_of(&[
            SchemaSlot::scalar(WireType::Sint),
            SchemaSlot::scalar(WireType::Dint),
        ]));
        codec.put_int(-7);
        codec.put_int(-70_000);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        assert_eq!(codec.get_int().unwrap(), -7);
        assert_eq!(codec.get_int().unwrap(), -70_000);
    }

    #[test]
    fn sint_payload_is_one_byte() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::Sint)]));
        codec.put_int(5);
        assert_eq!(codec.frame(), &[tags::SINT, 5]);
    }

    #[test]
    fn double_array_round_trip() {
        let mut codec =
            DataBuffer::new(schema_of(&[SchemaSlot::array(WireType::Lreal, 5)]));
        let sent = [1.0, 2.0, 3.0, 4.0, 5.0];
        codec.put_double_array(&sent);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        assert!(codec.is_double_array());
        assert_eq!(codec.get_double_array().unwrap(), sent);
    }

    #[test]
    fn bool_array_round_trip_keeps_length() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::array(WireType::Bool, 2)]));
        codec.put_bool_array(&[true, false]);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        // On the wire: ARRAY marker, 2-byte count, one tag byte per element.
        assert_eq!(wire.wire.as_ref(), &[tags::ARRAY, 0, 2, 64, 65]);
        codec.recv_data(&mut wire).unwrap();

        assert!(codec.is_bool_array());
        assert_eq!(codec.get_bool_array().unwrap(), vec![true, false]);
    }

    #[test]
    fn int_array_round_trip() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::array(WireType::Int, 3)]));
        codec.put_int_array(&[-1, 0, 300]);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        // ARRAY marker + count + shared tag + 2 payload bytes per element.
        assert_eq!(wire.wire.len(), 4 + 3 * 2);
        codec.recv_data(&mut wire).unwrap();

        assert_eq!(codec.get_int_array().unwrap(), vec![-1, 0, 300]);
    }

    #[test]
    fn string_array_round_trip() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::array(WireType::String, 2)]));
        codec.put_str_array(&["one".to_owned(), "two".to_owned()]);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        assert_eq!(codec.get_str_array().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn consumption_follows_schema_order() {
        let mut codec = DataBuffer::new(schema_of(&[
            SchemaSlot::scalar(WireType::Real),
            SchemaSlot::scalar(WireType::Bool),
        ]));
        codec.put_float(1.5);
        codec.put_bool(true);

        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        // Out-of-order access is a mismatch, not a reordering.
        let err = codec.get_bool().unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "attempted to access bool value where float value is stored"
        );

        assert!(codec.is_float());
        assert_eq!(codec.get_float().unwrap(), 1.5);
        assert!(codec.is_bool());
        assert!(codec.get_bool().unwrap());
    }

    #[test]
    fn mismatch_reports_array_shape() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::array(WireType::Int, 4)]));
        let err = codec.get_int().unwrap_err();
        assert_eq!(
            err.to_string(),
            "attempted to access int value where int array is stored"
        );
        let err = codec.get_double_array().unwrap_err();
        assert_eq!(
            err.to_string(),
            "attempted to access double array where int array is stored"
        );
    }

    #[test]
    fn cursor_is_monotonic_and_saturates() {
        let mut codec = DataBuffer::new(schema_of(&[
            SchemaSlot::scalar(WireType::Real),
            SchemaSlot::scalar(WireType::Real),
        ]));
        assert_eq!(codec.position(), -1);
        assert!(codec.increment_position());
        assert!(codec.increment_position());
        assert_eq!(codec.position(), 1);
        assert!(!codec.increment_position());
        assert_eq!(codec.position(), 1);
        codec.rewind();
        assert_eq!(codec.position(), -1);
    }

    #[test]
    fn exhausted_cursor_raises_no_more_elements() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::Real)]));
        codec.put_float(2.5);
        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        codec.recv_data(&mut wire).unwrap();

        assert_eq!(codec.get_float().unwrap(), 2.5);
        assert!(matches!(
            codec.get_float().unwrap_err(),
            CodecError::NoMoreElements
        ));
    }

    #[test]
    fn response_only_schema_sends_ack_marker() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::None)]));
        let mut wire = Loopback::default();
        codec.send_data(&mut wire).unwrap();
        assert_eq!(wire.wire.as_ref(), &[tags::ACK]);
    }

    #[test]
    fn ack_frame_short_circuits_receive() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::Lreal)]));
        let mut wire = Loopback::default();
        wire.send(&[tags::ACK]).unwrap();
        codec.recv_data(&mut wire).unwrap();

        // Schema still says double, but no payload slot was filled.
        assert!(codec.is_double());
        assert!(matches!(
            codec.get_double().unwrap_err(),
            CodecError::EmptySlot { index: 0 }
        ));
    }

    #[test]
    fn unsupported_tag_fails_the_frame() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::Lreal)]));
        let mut wire = Loopback::default();
        wire.send(&[0x2A]).unwrap();
        assert!(matches!(
            codec.recv_data(&mut wire).unwrap_err(),
            CodecError::Type(TypeError::UnsupportedTag { tag: 0x2A })
        ));
    }

    #[test]
    fn put_reports_remaining_capacity() {
        let mut codec = DataBuffer::new(schema_of(&[
            SchemaSlot::scalar(WireType::Lreal),
            SchemaSlot::scalar(WireType::Lreal),
        ]));
        assert!(codec.put_double(1.0));
        assert!(codec.put_double(2.0));
        // Cursor saturated; further puts no longer advance.
        assert!(!codec.put_double(3.0));
    }

    #[test]
    fn oversize_string_wraps_the_length_header() {
        let mut codec = DataBuffer::new(schema_of(&[SchemaSlot::scalar(WireType::String)]));
        let text = "x".repeat(usize::from(u16::MAX) + 3);
        assert!(codec.put_str(&text));

        // The 2-byte header cannot address the full payload; it wraps while
        // every byte is still written.
        let frame = codec.frame();
        assert_eq!(frame[0], tags::STRING);
        assert_eq!(&frame[1..3], &2u16.to_be_bytes());
        assert_eq!(frame.len(), 3 + text.len());
    }
}
