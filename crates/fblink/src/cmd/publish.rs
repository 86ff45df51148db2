use std::thread;
use std::time::Duration;

use fblink_session::{ConnectionParams, ServiceType};
use tracing::info;

use crate::cmd::{values, PublishArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: PublishArgs) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;

    let mut params = ConnectionParams::new(args.addr, ServiceType::Publisher);
    let mut staged = Vec::with_capacity(args.values.len());
    for spec in &args.values {
        let (slot, value) = values::parse_value(spec)?;
        values::add_send_slot(&mut params, slot);
        staged.push(value);
    }

    let mut socket = params
        .make_socket()
        .map_err(|err| session_error("open failed", err))?;

    for sent in 0..args.count {
        for value in &staged {
            values::stage(&mut socket, value);
        }
        socket
            .send_data()
            .map_err(|err| session_error("send failed", err))?;
        if sent + 1 < args.count {
            thread::sleep(interval);
        }
    }

    info!(count = args.count, "published");
    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }
}
