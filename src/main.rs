#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
use std::process::ExitCode;

use mcprobe::{cli, executor::JavaStatusQuery, probe};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match cli::parse_from(std::env::args_os()) {
        Ok(args) => args,
        Err(code) => return code,
    };
    start_tracing();
    let mut stdout = std::io::stdout();
    match probe::run(&args, &JavaStatusQuery::default(), &mut stdout).await {
        Ok(report) => report.exit_code(),
        Err(error) => {
            eprintln!("failed to write results: {error}");
            ExitCode::FAILURE
        }
    }
}

fn start_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("LOG")
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}
