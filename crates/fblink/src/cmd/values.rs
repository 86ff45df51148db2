//! The TYPE and TYPE:VALUE grammars shared by every subcommand.
//!
//! Slot specs name a wire type, optionally with an arity: `lreal`, `intx3`.
//! Value specs add a payload after a colon: `lreal:5.0`, `intx3:1,2,3`,
//! `string:five`, `dt:01.01.2017 00:00:00`. Array payloads are
//! comma-separated and must match the declared arity.

use fblink_codec::{CodecError, SchemaSlot, Value};
use fblink_session::{ConnectionParams, FbSocket, SessionError};
use fblink_types::{DateAndTime, WireType};

use crate::exit::{session_error, CliError, CliResult, USAGE};

pub fn parse_wire_type(name: &str) -> CliResult<WireType> {
    match name {
        "bool" => Ok(WireType::Bool),
        "sint" => Ok(WireType::Sint),
        "int" => Ok(WireType::Int),
        "dint" => Ok(WireType::Dint),
        "lint" => Ok(WireType::Lint),
        "usint" => Ok(WireType::Usint),
        "uint" => Ok(WireType::Uint),
        "udint" => Ok(WireType::Udint),
        "ulint" => Ok(WireType::Ulint),
        "real" => Ok(WireType::Real),
        "lreal" => Ok(WireType::Lreal),
        "string" => Ok(WireType::String),
        "dt" | "date_and_time" => Ok(WireType::DateAndTime),
        other => Err(CliError::new(
            USAGE,
            format!("unknown wire type: {other}"),
        )),
    }
}

/// Parses a slot spec: a type name, optionally suffixed with `x<LEN>`.
pub fn parse_slot(spec: &str) -> CliResult<SchemaSlot> {
    if let Some((name, arity)) = spec.rsplit_once('x') {
        if let Ok(len) = arity.parse::<usize>() {
            if len < 2 {
                return Err(CliError::new(
                    USAGE,
                    format!("array arity must be at least 2: {spec}"),
                ));
            }
            return Ok(SchemaSlot::array(parse_wire_type(name)?, len));
        }
    }
    Ok(SchemaSlot::scalar(parse_wire_type(spec)?))
}

/// Parses a value spec into its slot declaration and the typed value.
pub fn parse_value(spec: &str) -> CliResult<(SchemaSlot, Value)> {
    let (ty, raw) = spec.split_once(':').ok_or_else(|| {
        CliError::new(USAGE, format!("value must look like TYPE:VALUE: {spec}"))
    })?;
    let slot = parse_slot(ty)?;
    let value = if slot.is_array() {
        let parts: Vec<&str> = raw.split(',').collect();
        if parts.len() != slot.len {
            return Err(CliError::new(
                USAGE,
                format!(
                    "expected {} array elements, got {}: {spec}",
                    slot.len,
                    parts.len()
                ),
            ));
        }
        parse_array(slot.ty, &parts)?
    } else {
        parse_scalar(slot.ty, raw)?
    };
    Ok((slot, value))
}

fn parse_scalar(ty: WireType, raw: &str) -> CliResult<Value> {
    match ty {
        WireType::Bool => Ok(Value::Bool(parse_bool(raw)?)),
        WireType::Lint | WireType::Ulint => Ok(Value::Long(parse_num(raw)?)),
        WireType::Real => Ok(Value::Float(parse_num(raw)?)),
        WireType::Lreal => Ok(Value::Double(parse_num(raw)?)),
        WireType::DateAndTime => Ok(Value::DateAndTime(parse_timestamp(raw)?)),
        WireType::String => Ok(Value::Str(raw.to_owned())),
        _ => Ok(Value::Int(parse_num(raw)?)),
    }
}

fn parse_array(ty: WireType, parts: &[&str]) -> CliResult<Value> {
    match ty {
        WireType::Bool => Ok(Value::BoolArray(collect(parts, parse_bool)?)),
        WireType::Lint | WireType::Ulint => Ok(Value::LongArray(collect(parts, parse_num)?)),
        WireType::Real => Ok(Value::FloatArray(collect(parts, parse_num)?)),
        WireType::Lreal => Ok(Value::DoubleArray(collect(parts, parse_num)?)),
        WireType::DateAndTime => {
            Ok(Value::DateAndTimeArray(collect(parts, parse_timestamp)?))
        }
        WireType::String => Ok(Value::StrArray(
            parts.iter().map(|p| (*p).to_owned()).collect(),
        )),
        _ => Ok(Value::IntArray(collect(parts, parse_num)?)),
    }
}

fn collect<T>(parts: &[&str], parse: impl Fn(&str) -> CliResult<T>) -> CliResult<Vec<T>> {
    parts.iter().map(|part| parse(part)).collect()
}

fn parse_bool(raw: &str) -> CliResult<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CliError::new(USAGE, format!("invalid bool: {other}"))),
    }
}

fn parse_num<T: std::str::FromStr>(raw: &str) -> CliResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid number: {raw}")))
}

fn parse_timestamp(raw: &str) -> CliResult<DateAndTime> {
    let mut dt = DateAndTime::parse(raw)
        .map_err(|err| CliError::new(USAGE, err.to_string()))?;
    // Parsing yields a simulation start; pin the represented instant to it.
    dt.set_simulation_secs(0);
    Ok(dt)
}

/// Declares a slot in the sending direction (the remote block's inputs).
pub fn add_send_slot(params: &mut ConnectionParams, slot: SchemaSlot) {
    if slot.is_array() {
        params.add_input_array(slot.ty, slot.len);
    } else {
        params.add_input(slot.ty);
    }
}

/// Declares a slot in the receiving direction (the remote block's outputs).
pub fn add_recv_slot(params: &mut ConnectionParams, slot: SchemaSlot) {
    if slot.is_array() {
        params.add_output_array(slot.ty, slot.len);
    } else {
        params.add_output(slot.ty);
    }
}

/// Parses and applies a `--time-reference` argument, if given.
pub fn apply_time_reference(socket: &mut FbSocket, spec: Option<&str>) -> CliResult<()> {
    if let Some(spec) = spec {
        let reference =
            DateAndTime::parse(spec).map_err(|err| CliError::new(USAGE, err.to_string()))?;
        socket.set_time_reference(&reference);
    }
    Ok(())
}

/// Stages one value into the socket's outgoing frame.
pub fn stage(socket: &mut FbSocket, value: &Value) {
    match value {
        Value::Bool(v) => socket.put_bool(*v),
        Value::Int(v) => socket.put_int(*v),
        Value::Long(v) => socket.put_long(*v),
        Value::Float(v) => socket.put_float(*v),
        Value::Double(v) => socket.put_double(*v),
        Value::DateAndTime(v) => socket.put_date_and_time(v),
        Value::Str(v) => socket.put_str(v),
        Value::BoolArray(v) => socket.put_bool_array(v),
        Value::IntArray(v) => socket.put_int_array(v),
        Value::LongArray(v) => socket.put_long_array(v),
        Value::FloatArray(v) => socket.put_float_array(v),
        Value::DoubleArray(v) => socket.put_double_array(v),
        Value::DateAndTimeArray(v) => socket.put_date_and_time_array(v),
        Value::StrArray(v) => socket.put_str_array(v),
    };
}

/// Consumes every received slot in schema order. Stops early at an
/// acknowledgement (empty) frame.
pub fn drain(socket: &mut FbSocket) -> CliResult<Vec<Value>> {
    let slots: Vec<SchemaSlot> = socket.output_schema().slots().to_vec();
    let mut values = Vec::with_capacity(slots.len());
    for slot in slots {
        if slot.ty == WireType::None {
            break;
        }
        match fetch(socket, slot) {
            Ok(value) => values.push(value),
            Err(SessionError::Codec(CodecError::EmptySlot { .. })) => break,
            Err(err) => return Err(session_error("receive failed", err)),
        }
    }
    Ok(values)
}

fn fetch(socket: &mut FbSocket, slot: SchemaSlot) -> fblink_session::Result<Value> {
    let value = match (slot.ty, slot.is_array()) {
        (WireType::Bool, false) => Value::Bool(socket.get_bool()?),
        (WireType::Bool, true) => Value::BoolArray(socket.get_bool_array()?),
        (WireType::Lint | WireType::Ulint, false) => Value::Long(socket.get_long()?),
        (WireType::Lint | WireType::Ulint, true) => Value::LongArray(socket.get_long_array()?),
        (WireType::Real, false) => Value::Float(socket.get_float()?),
        (WireType::Real, true) => Value::FloatArray(socket.get_float_array()?),
        (WireType::Lreal, false) => Value::Double(socket.get_double()?),
        (WireType::Lreal, true) => Value::DoubleArray(socket.get_double_array()?),
        (WireType::DateAndTime, false) => Value::DateAndTime(socket.get_date_and_time()?),
        (WireType::DateAndTime, true) => {
            Value::DateAndTimeArray(socket.get_date_and_time_array()?)
        }
        (WireType::String, false) => Value::Str(socket.get_str()?),
        (WireType::String, true) => Value::StrArray(socket.get_str_array()?),
        (_, false) => Value::Int(socket.get_int()?),
        (_, true) => Value::IntArray(socket.get_int_array()?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_specs_cover_scalars_and_arrays() {
        let slot = parse_slot("lreal").unwrap();
        assert_eq!(slot.ty, WireType::Lreal);
        assert!(!slot.is_array());

        let slot = parse_slot("intx3").unwrap();
        assert_eq!(slot.ty, WireType::Int);
        assert_eq!(slot.len, 3);

        assert!(parse_slot("quux").is_err());
        assert!(parse_slot("lrealx1").is_err());
    }

    #[test]
    fn value_specs_parse_into_typed_values() {
        let (slot, value) = parse_value("lreal:5.0").unwrap();
        assert_eq!(slot.ty, WireType::Lreal);
        assert_eq!(value, Value::Double(5.0));

        let (_, value) = parse_value("bool:true").unwrap();
        assert_eq!(value, Value::Bool(true));

        let (_, value) = parse_value("sint:-7").unwrap();
        assert_eq!(value, Value::Int(-7));

        let (_, value) = parse_value("lint:5000000000").unwrap();
        assert_eq!(value, Value::Long(5_000_000_000));

        let (_, value) = parse_value("string:five").unwrap();
        assert_eq!(value, Value::Str("five".to_owned()));
    }

    #[test]
    fn array_specs_enforce_the_declared_arity() {
        let (slot, value) = parse_value("lrealx3:1.0,2.0,3.0").unwrap();
        assert_eq!(slot.len, 3);
        assert_eq!(value, Value::DoubleArray(vec![1.0, 2.0, 3.0]));

        assert!(parse_value("lrealx3:1.0,2.0").is_err());
        assert!(parse_value("boolx2:true,maybe").is_err());
    }

    #[test]
    fn timestamp_values_parse_the_legacy_format() {
        let (_, value) = parse_value("dt:01.01.2017 00:00:00").unwrap();
        match value {
            Value::DateAndTime(dt) => {
                assert_eq!(dt.to_string(), "01.01.2017 00:00:00");
                assert_eq!(dt.simulation_secs(), 0);
            }
            other => panic!("expected a timestamp, got {other:?}"),
        }

        assert!(parse_value("dt:2017-01-01").is_err());
    }

    #[test]
    fn value_spec_without_payload_is_rejected() {
        assert!(parse_value("lreal").is_err());
    }
}
