mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fblink", version, about = "IEC 61499 communication services CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Reference timestamp for DATE_AND_TIME decoding (dd.MM.yyyy HH:mm:ss).
    #[arg(long, value_name = "TIMESTAMP", global = true)]
    time_reference: Option<String>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level for the fblink crates (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn run(self) -> i32 {
        let format = self.format.unwrap_or_else(OutputFormat::default_for_stdout);
        match cmd::run(self.command, format, self.time_reference.as_deref()) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {err}");
                err.code
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);
    std::process::exit(cli.run());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "fblink",
            "send",
            "127.0.0.1:61499",
            "--value",
            "lreal:5.0",
            "--expect",
            "lreal",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.values, vec!["lreal:5.0"]);
                assert_eq!(args.expect, vec!["lreal"]);
            }
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn parses_serve_with_echo_and_count() {
        let cli = Cli::try_parse_from([
            "fblink",
            "serve",
            "0.0.0.0:61499",
            "--expect",
            "lrealx5",
            "--echo",
            "--count",
            "3",
        ])
        .expect("serve args should parse");

        match cli.command {
            Command::Serve(args) => {
                assert!(args.echo);
                assert_eq!(args.count, Some(3));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_socket_addresses() {
        let err = Cli::try_parse_from(["fblink", "subscribe", "not-an-addr"])
            .expect_err("bad address should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn global_format_flag_applies_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "fblink",
            "publish",
            "239.0.0.1:61499",
            "--value",
            "bool:true",
            "--format",
            "json",
        ])
        .expect("global flag should parse anywhere");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn time_reference_is_a_global_flag() {
        let cli = Cli::try_parse_from([
            "fblink",
            "subscribe",
            "239.0.0.1:61499",
            "--expect",
            "dt",
            "--time-reference",
            "01.01.2017 00:00:00",
        ])
        .expect("global time reference should parse");
        assert_eq!(cli.time_reference.as_deref(), Some("01.01.2017 00:00:00"));
    }

    #[test]
    fn log_level_accepts_named_levels() {
        let cli = Cli::try_parse_from([
            "fblink",
            "serve",
            "0.0.0.0:61499",
            "--log-level",
            "debug",
        ])
        .expect("named level should parse");
        assert_eq!(cli.log_level, LevelFilter::DEBUG);

        Cli::try_parse_from(["fblink", "serve", "0.0.0.0:61499", "--log-level", "loud"])
            .expect_err("unknown level should fail");
    }
}
