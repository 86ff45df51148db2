use std::io::ErrorKind;

use fblink_codec::CodecError;
use fblink_session::{ConnectionParams, ServiceType, SessionError};
use fblink_transport::TransportError;
use tracing::debug;

use crate::cmd::{values, ServeArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_values, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat, time_reference: Option<&str>) -> CliResult<i32> {
    let mut params = ConnectionParams::new(args.addr, ServiceType::Server);
    for spec in &args.expect {
        let slot = values::parse_slot(spec)?;
        values::add_recv_slot(&mut params, slot);
        if args.echo {
            values::add_send_slot(&mut params, slot);
        }
    }

    let mut socket = params
        .make_socket()
        .map_err(|err| session_error("accept failed", err))?;
    values::apply_time_reference(&mut socket, time_reference)?;

    let mut answered = 0usize;
    loop {
        match socket.recv_data() {
            Ok(()) => {}
            Err(err) if is_disconnect(&err) => {
                debug!("peer disconnected");
                break;
            }
            Err(err) => return Err(session_error("receive failed", err)),
        }

        let received = values::drain(&mut socket)?;
        print_values(&received, format);

        if args.echo {
            socket.rewind();
            for value in &received {
                values::stage(&mut socket, value);
            }
        }
        // Without --echo the sending schema is empty and this acknowledges.
        socket
            .send_data()
            .map_err(|err| session_error("send failed", err))?;

        answered = answered.saturating_add(1);
        if args.count.is_some_and(|count| answered >= count) {
            break;
        }
    }

    Ok(SUCCESS)
}

fn is_disconnect(err: &SessionError) -> bool {
    let io = match err {
        SessionError::Transport(TransportError::Io(io)) => io,
        SessionError::Codec(CodecError::Transport(TransportError::Io(io))) => io,
        _ => return false,
    };
    matches!(
        io.kind(),
        ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}
