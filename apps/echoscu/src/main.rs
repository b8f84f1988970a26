use clap::Parser;
use dcmnet_dimse::Status;
use dcmnet_scu::Destination;
use snafu::{prelude::*, Whatever};
use std::time::Duration;
use tracing::{warn, Level};

/// DICOM C-ECHO SCU
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// host of the SCP to verify
    host: String,
    /// port of the SCP to verify
    port: u16,
    /// verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// the calling Application Entity title
    #[arg(long = "calling-ae-title", default_value = "ECHOSCU")]
    calling_ae_title: String,
    /// the called Application Entity title
    #[arg(long = "called-ae-title", default_value = "ANY-SCP")]
    called_ae_title: String,
    /// association timeout, in seconds
    #[arg(long = "timeout", default_value = "30")]
    timeout: u64,
}

fn main() {
    run().unwrap_or_else(|err| {
        tracing::error!("{}", snafu::Report::from_error(err));
        std::process::exit(-2);
    });
}

fn run() -> Result<(), Whatever> {
    let App { host, port, verbose, calling_ae_title, called_ae_title, timeout } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("could not set up global logging subscriber")?;

    let dest = Destination::new(host, port, calling_ae_title, called_ae_title).with_timeout(Duration::from_secs(timeout));

    let status = dcmnet_scu::c_echo(&dest).whatever_context("C-ECHO failed")?;
    match status {
        Status::Success => {
            if verbose {
                println!("C-ECHO successful");
            }
        }
        other => warn!("C-ECHO returned a non-success status {:#06x}H", other.code()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
