//! Runs the port probe and then the status probe, reporting as it goes.

use std::io::{self, Write};

use crate::{cli::Cli, executor::StatusQuery, port::probe_port, structures::ProbeReport};

const RULE: &str = "--------------------------------------------------";

/// Run both probes against the target named in `cli`.
///
/// The status query only runs once the port has accepted a connection. In
/// text mode each step is written to `out` as it finishes; with `--json` only
/// the final report is written.
///
/// # Errors
/// Only if writing to `out` fails.
pub async fn run<Q, W>(cli: &Cli, query: &Q, out: &mut W) -> io::Result<ProbeReport>
where
    Q: StatusQuery,
    W: Write,
{
    let mut report = ProbeReport::new(cli.host.clone(), cli.port);
    let mut text = Text {
        out: &mut *out,
        enabled: !cli.json,
    };
    text.header(&report)?;

    text.line("1. Testing port connectivity...")?;
    report.reachable = probe_port(&cli.host, cli.port, cli.connect_timeout()).await;
    if report.reachable {
        text.line("✅ Port is accessible")?;
        text.line("")?;
        text.line("2. Testing Minecraft server...")?;
        text.line(&format!(
            "Testing Minecraft server at {}:{}...",
            cli.host, cli.port
        ))?;
        match query.query(&cli.host, cli.port).await {
            Ok(status) => {
                report.record_status(&status);
                text.status(&report)?;
                text.line("")?;
                text.line("🎉 All tests passed! Server is ready for connections.")?;
            }
            Err(error) => {
                info!(%error, "status query failed");
                report.record_failure(&error);
                text.line(&format!("❌ Failed to connect to Minecraft server: {error}"))?;
                text.line("")?;
                text.line("💥 Server test failed!")?;
                text.line("   Make sure the Minecraft server is fully started")?;
            }
        }
    } else {
        report.record_unreachable();
        text.line("❌ Port is not accessible")?;
        text.line("   Make sure the server is running and the port is open")?;
    }

    if cli.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    }
    Ok(report)
}

struct Text<'a, W: Write> {
    out: &'a mut W,
    enabled: bool,
}

impl<W: Write> Text<'_, W> {
    fn line(&mut self, line: &str) -> io::Result<()> {
        if self.enabled {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn header(&mut self, report: &ProbeReport) -> io::Result<()> {
        self.line("Testing Minecraft server connectivity...")?;
        self.line(&format!("Host: {}", report.host))?;
        self.line(&format!("Port: {}", report.port))?;
        self.line(RULE)
    }

    fn status(&mut self, report: &ProbeReport) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        writeln!(self.out, "✅ Server is online!")?;
        if let Some(version) = &report.version {
            writeln!(self.out, "   Version: {version}")?;
        }
        if let (Some(online), Some(max)) = (report.players_online, report.players_max) {
            writeln!(self.out, "   Players: {online}/{max}")?;
        }
        if let Some(description) = &report.description {
            writeln!(self.out, "   Description: {description}")?;
        }
        if let Some(latency) = report.latency_ms {
            writeln!(self.out, "   Latency: {latency:.2}ms")?;
        }
        if let Some(sample) = &report.player_sample {
            writeln!(self.out, "   Online players:")?;
            for name in sample {
                writeln!(self.out, "     - {name}")?;
            }
        }
        Ok(())
    }
}
