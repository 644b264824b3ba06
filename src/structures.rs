use std::process::ExitCode;

use serde::Serialize;

/// Status of a server as reported by one successful status query.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServerStatus {
    /// Round trip of the ping packet, in milliseconds.
    pub latency: f64,
    pub players: Players,
    pub motd: String,
    pub version: Version,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub protocol: i64,
    pub broadcast: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Players {
    pub online: i64,
    pub maximum: i64,
    pub sample: Vec<PlayerSample>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerSample {
    pub uuid: String,
    pub name: String,
}

/// Outcome of one run of both probes.
///
/// Status fields are only filled in once the status query succeeds, and
/// `online` is never set unless `reachable` already is.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub host: String,
    pub port: u16,
    pub reachable: bool,
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players_online: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_sample: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            reachable: false,
            online: false,
            version: None,
            players_online: None,
            players_max: None,
            player_sample: None,
            description: None,
            latency_ms: None,
            error: None,
        }
    }

    pub fn record_unreachable(&mut self) {
        self.reachable = false;
        self.error = Some("port is not accessible".to_owned());
    }

    pub fn record_status(&mut self, status: &ServerStatus) {
        debug_assert!(self.reachable, "status recorded for an unreachable port");
        self.online = true;
        self.version = Some(status.version.broadcast.clone());
        self.players_online = Some(status.players.online);
        self.players_max = Some(status.players.maximum);
        self.description = Some(status.motd.clone());
        self.latency_ms = Some(status.latency);
        self.player_sample = (status.players.online > 0 && !status.players.sample.is_empty())
            .then(|| {
                status
                    .players
                    .sample
                    .iter()
                    .map(|player| player.name.clone())
                    .collect()
            });
        self.error = None;
    }

    pub fn record_failure(&mut self, error: impl ToString) {
        self.online = false;
        self.error = Some(error.to_string());
    }

    /// Both probes succeeded.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.reachable && self.online
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
