//!
//! Command-line front-end for reading and receiving LiDAR scan-segment telegrams.
//!
//! Two subcommands: `read` decodes telegrams from a file through the matching stream extractor,
//! and `receive` listens (UDP) or connects (TCP) for live telegrams. Neither belongs to the
//! decode/transport core; this binary is a thin collaborator that wires them to a socket and
//! stdout.
//!

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Env};
use log::info;
use scansegment_decode::compact::CompactStreamExtractor;
use scansegment_decode::msgpack::MsgpackStreamExtractor;
use scansegment_decode::{compact, msgpack, summarize};
use scansegment_transport::{
    CompactReceiver, DatagramTransport, MsgpackReceiver, StreamTransport,
};
use std::error::Error;
use std::fs;
use std::process::ExitCode;

/// Which telegram encoding to decode.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Encoding {
    Msgpack,
    Compact,
}

/// Which transport to receive telegrams over.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Protocol {
    Udp,
    Tcp,
}

#[derive(Parser)]
#[command(name = "scansegment", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed a file's bytes through the matching stream extractor and decoder, printing each
    /// decoded telegram's summary.
    Read {
        encoding: Encoding,

        /// Path to a file of one or more concatenated telegrams.
        #[arg(short, long)]
        input: String,
    },
    /// Listen (UDP) or connect (TCP) for live telegrams and print each one's summary.
    Receive {
        encoding: Encoding,

        #[arg(long, default_value = "localhost")]
        ip: String,

        #[arg(long, default_value_t = 2115)]
        port: u16,

        #[arg(long, default_value = "udp")]
        protocol: Protocol,
    },
}

const MAX_DATAGRAM_BYTES: usize = 64 * 1024;
const STREAM_CHUNK_BYTES: usize = 4096;

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Read { encoding, input } => read_file(encoding, &input),
        Command::Receive {
            encoding,
            ip,
            port,
            protocol,
        } => receive_live(encoding, &ip, port, protocol),
    }
}

fn read_file(encoding: Encoding, input: &str) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(input)?;
    info!("read {} bytes from {input}", bytes.len());

    match encoding {
        Encoding::Compact => {
            let mut extractor = CompactStreamExtractor::new();
            extractor.feed(&bytes);
            let mut count = 0;
            while let Some(telegram) = extractor.next_telegram() {
                let segment = compact::decode(&telegram)?;
                println!("{}", summarize::compact(&segment));
                count += 1;
            }
            info!("decoded {count} telegram(s)");
        }
        Encoding::Msgpack => {
            let mut extractor = MsgpackStreamExtractor::new();
            extractor.feed(&bytes);
            let mut count = 0;
            while let Some(telegram) = extractor.next_telegram() {
                let segment = msgpack::decode(&telegram)?;
                println!("{}", summarize::msgpack(&segment));
                count += 1;
            }
            info!("decoded {count} telegram(s)");
        }
    }

    Ok(())
}

fn receive_live(
    encoding: Encoding,
    ip: &str,
    port: u16,
    protocol: Protocol,
) -> Result<(), Box<dyn Error>> {
    match (encoding, protocol) {
        (Encoding::Compact, Protocol::Udp) => {
            let transport = DatagramTransport::bind((ip, port), MAX_DATAGRAM_BYTES)?;
            let mut receiver = CompactReceiver::new(transport);
            loop {
                let outcome = receiver.receive_segments(1);
                for segment in &outcome.segments {
                    println!("{}", summarize::compact(segment));
                }
                if let Some(err) = outcome.error {
                    return Err(Box::new(err));
                }
            }
        }
        (Encoding::Compact, Protocol::Tcp) => {
            let transport =
                StreamTransport::connect((ip, port), CompactStreamExtractor::new(), STREAM_CHUNK_BYTES)?;
            let mut receiver = CompactReceiver::new(transport);
            loop {
                let outcome = receiver.receive_segments(1);
                for segment in &outcome.segments {
                    println!("{}", summarize::compact(segment));
                }
                if let Some(err) = outcome.error {
                    return Err(Box::new(err));
                }
            }
        }
        (Encoding::Msgpack, Protocol::Udp) => {
            let transport = DatagramTransport::bind((ip, port), MAX_DATAGRAM_BYTES)?;
            let mut receiver = MsgpackReceiver::new(transport);
            loop {
                let outcome = receiver.receive_segments(1);
                for segment in &outcome.segments {
                    println!("{}", summarize::msgpack(segment));
                }
                if let Some(err) = outcome.error {
                    return Err(Box::new(err));
                }
            }
        }
        (Encoding::Msgpack, Protocol::Tcp) => {
            let transport =
                StreamTransport::connect((ip, port), MsgpackStreamExtractor::new(), STREAM_CHUNK_BYTES)?;
            let mut receiver = MsgpackReceiver::new(transport);
            loop {
                let outcome = receiver.receive_segments(1);
                for segment in &outcome.segments {
                    println!("{}", summarize::msgpack(segment));
                }
                if let Some(err) = outcome.error {
                    return Err(Box::new(err));
                }
            }
        }
    }

    Ok(())
}
