use crate::config::{logging_allowed, LoggingConfig};
use crate::peer::types::IceEvent;
use tracing::{debug, trace, warn};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Installs the global subscriber. Returns false when logging is compiled out,
/// disabled in settings, or a subscriber is already installed.
pub fn init(cfg: &LoggingConfig) -> bool {
    if !logging_allowed(cfg) {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Per-type tally of discovered local candidates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSummary {
    pub host: usize,
    pub srflx: usize,
    pub relay: usize,
    pub other: usize,
}

impl CandidateSummary {
    pub fn record(&mut self, candidate: &str) {
        if candidate.contains("typ host") {
            self.host += 1;
        } else if candidate.contains("typ srflx") {
            self.srflx += 1;
        } else if candidate.contains("typ relay") {
            self.relay += 1;
        } else {
            self.other += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.host + self.srflx + self.relay + self.other
    }
}

pub fn log_ice_event(label: &str, event: &IceEvent) {
    match event {
        IceEvent::Candidate(c) => trace!(label, candidate = %c, "local candidate"),
        IceEvent::GatheringComplete => debug!(label, "candidate gathering complete"),
    }
}

pub fn log_candidate_summary(label: &str, summary: &CandidateSummary) {
    debug!(
        label,
        host = summary.host,
        srflx = summary.srflx,
        relay = summary.relay,
        "candidate analysis"
    );
    if summary.relay == 0 {
        warn!(label, "no TURN relay candidates found, connection through NAT may fail");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_by_type() {
        let mut s = CandidateSummary::default();
        s.record("candidate:1 1 udp 2130706431 192.168.1.2 50000 typ host");
        s.record("candidate:2 1 udp 1694498815 203.0.113.5 50001 typ srflx raddr 0.0.0.0 rport 0");
        s.record("candidate:3 1 udp 16777215 198.51.100.7 3478 typ relay raddr 0.0.0.0 rport 0");
        s.record("candidate:4 1 udp 1 10.0.0.1 9 typ prflx");
        assert_eq!(
            s,
            CandidateSummary {
                host: 1,
                srflx: 1,
                relay: 1,
                other: 1
            }
        );
        assert_eq!(s.total(), 4);
    }

    #[test]
    fn init_respects_disabled_flag() {
        let cfg = LoggingConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!init(&cfg));
    }
}
