use std::{ffi::OsString, process::ExitCode, time::Duration};

use clap::Parser;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8888;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Check that a Minecraft server accepts connections and answers status pings.
#[derive(Debug, Clone, Parser)]
#[command(name = "mcprobe", version, long_about = None)]
pub struct Cli {
    /// Hostname or IP address of the server.
    #[arg(default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port of the server.
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds to wait for the port to accept a connection.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Print the final report as JSON instead of step-by-step text.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Parse arguments, or hand back the exit code to leave with.
///
/// Usage errors print their message and map to failure; `--help` and
/// `--version` print their text and map to success.
pub fn parse_from<I, T>(args: I) -> Result<Cli, ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|error| {
        let code = exit_code_for(&error);
        if let Err(print_error) = error.print() {
            debug!(%print_error, "could not print argument error");
        }
        code
    })
}

fn exit_code_for(error: &clap::Error) -> ExitCode {
    if error.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("mcprobe").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.host, DEFAULT_HOST);
        assert_eq!(cli.port, DEFAULT_PORT);
        assert_eq!(cli.connect_timeout(), Duration::from_secs(5));
        assert!(!cli.json);
    }

    #[test]
    fn host_only() {
        let cli = parse(&["192.168.1.100"]).unwrap();
        assert_eq!(cli.host, "192.168.1.100");
        assert_eq!(cli.port, DEFAULT_PORT);
    }

    #[test]
    fn host_and_port() {
        let cli = parse(&["localhost", "25565", "--timeout", "2", "--json"]).unwrap();
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, 25565);
        assert_eq!(cli.timeout, 2);
        assert!(cli.json);
    }

    #[test]
    fn non_numeric_port_is_a_failure() {
        let error = parse(&["localhost", "abc"]).unwrap_err();
        assert!(error.use_stderr());
    }

    #[test]
    fn out_of_range_port_is_a_failure() {
        assert!(parse(&["localhost", "70000"]).is_err());
        assert!(parse(&["localhost", "-1"]).is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(parse(&["--timeout", "0"]).is_err());
    }

    #[test]
    fn help_is_not_a_failure() {
        let error = parse(&["--help"]).unwrap_err();
        assert!(!error.use_stderr());
    }
}
