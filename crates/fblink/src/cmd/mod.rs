use std::net::SocketAddr;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod publish;
pub mod send;
pub mod serve;
pub mod subscribe;
pub mod values;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a remote SERVER block, send a request, print the reply.
    Send(SendArgs),
    /// Accept a CLIENT connection and answer incoming requests.
    Serve(ServeArgs),
    /// Send datagrams towards SUBSCRIBE blocks on a multicast group.
    Publish(PublishArgs),
    /// Join a multicast group and print frames from a PUBLISH block.
    Subscribe(SubscribeArgs),
}

pub fn run(command: Command, format: OutputFormat, time_reference: Option<&str>) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format, time_reference),
        Command::Serve(args) => serve::run(args, format, time_reference),
        Command::Publish(args) => publish::run(args),
        Command::Subscribe(args) => subscribe::run(args, format, time_reference),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Remote address to connect to.
    pub addr: SocketAddr,
    /// Value to send, as TYPE:VALUE (repeatable, e.g. lreal:5.0, intx3:1,2,3).
    #[arg(long = "value", short = 'v', value_name = "SPEC")]
    pub values: Vec<String>,
    /// Reply slot to expect, as TYPE or TYPExLEN (repeatable).
    #[arg(long = "expect", short = 'e', value_name = "TYPE")]
    pub expect: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Local address to bind and accept one connection on.
    pub addr: SocketAddr,
    /// Request slot to expect, as TYPE or TYPExLEN (repeatable).
    #[arg(long = "expect", short = 'e', value_name = "TYPE")]
    pub expect: Vec<String>,
    /// Echo each received frame back instead of a bare acknowledgement.
    #[arg(long)]
    pub echo: bool,
    /// Exit after answering N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Multicast group and port to send towards.
    pub addr: SocketAddr,
    /// Value to send, as TYPE:VALUE (repeatable).
    #[arg(long = "value", short = 'v', value_name = "SPEC")]
    pub values: Vec<String>,
    /// Number of datagrams to send.
    #[arg(long, default_value = "1")]
    pub count: usize,
    /// Delay between datagrams (e.g. 5s, 500ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
}

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Multicast group and port to join.
    pub addr: SocketAddr,
    /// Payload slot to expect, as TYPE or TYPExLEN (repeatable).
    #[arg(long = "expect", short = 'e', value_name = "TYPE")]
    pub expect: Vec<String>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
}
