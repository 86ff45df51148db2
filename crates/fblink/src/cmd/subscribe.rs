use fblink_session::{ConnectionParams, ServiceType};

use crate::cmd::{values, SubscribeArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_values, OutputFormat};

pub fn run(
    args: SubscribeArgs,
    format: OutputFormat,
    time_reference: Option<&str>,
) -> CliResult<i32> {
    let mut params = ConnectionParams::new(args.addr, ServiceType::Subscriber);
    for spec in &args.expect {
        values::add_recv_slot(&mut params, values::parse_slot(spec)?);
    }

    let mut socket = params
        .make_socket()
        .map_err(|err| session_error("join failed", err))?;
    values::apply_time_reference(&mut socket, time_reference)?;

    let mut printed = 0usize;
    loop {
        socket
            .recv_data()
            .map_err(|err| session_error("receive failed", err))?;
        let received = values::drain(&mut socket)?;
        print_values(&received, format);

        printed = printed.saturating_add(1);
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    Ok(SUCCESS)
}
