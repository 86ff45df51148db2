use fblink_session::{ConnectionParams, ServiceType};

use crate::cmd::{values, SendArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_values, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat, time_reference: Option<&str>) -> CliResult<i32> {
    let mut params = ConnectionParams::new(args.addr, ServiceType::Client);
    let mut staged = Vec::with_capacity(args.values.len());
    for spec in &args.values {
        let (slot, value) = values::parse_value(spec)?;
        values::add_send_slot(&mut params, slot);
        staged.push(value);
    }
    for spec in &args.expect {
        values::add_recv_slot(&mut params, values::parse_slot(spec)?);
    }

    let mut socket = params
        .make_socket()
        .map_err(|err| session_error("connect failed", err))?;
    values::apply_time_reference(&mut socket, time_reference)?;

    for value in &staged {
        values::stage(&mut socket, value);
    }
    socket
        .send_data()
        .map_err(|err| session_error("send failed", err))?;

    // A SERVER block always answers, with payload or a bare acknowledgement.
    socket
        .recv_data()
        .map_err(|err| session_error("receive failed", err))?;
    let received = values::drain(&mut socket)?;
    if !received.is_empty() {
        print_values(&received, format);
    }

    Ok(SUCCESS)
}
