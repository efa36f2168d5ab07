//! Active Health Prober
//!
//! Issues periodic liveness probes against every registered target on a
//! dedicated ticker, independent of request traffic. Outcomes feed the
//! registry's single state-update path, the same one passive proxy
//! observations use.

use crate::domain::entities::{ProbeOutcome, Target};
use crate::domain::ports::TargetRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Prober configuration.
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Interval between probe rounds
    pub interval: Duration,
    /// Timeout for each probe request
    pub timeout: Duration,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Periodic health prober for registered targets.
pub struct HealthProber {
    config: ProberConfig,
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new(config: ProberConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// Start the probe loop. The task stops when the shutdown channel
    /// fires; no new probe round starts after that.
    pub fn start(
        &self,
        registry: Arc<dyn TargetRegistry>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        let client = self.client.clone();
        let interval = self.config.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("health prober stopping");
                        break;
                    }
                }

                for target in registry.get_all().await {
                    let outcome = Self::probe(&client, &target).await;
                    registry.record_outcome(&target.id, outcome).await;
                }
            }
        });
    }

    /// Issue one liveness probe against a target.
    async fn probe(client: &reqwest::Client, target: &Target) -> ProbeOutcome {
        let url = format!(
            "{}{}",
            target.endpoint_base.trim_end_matches('/'),
            target.probe_path
        );
        let started = Instant::now();

        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => ProbeOutcome::Success {
                latency_ms: started.elapsed().as_millis() as u64,
            },
            Ok(response) => ProbeOutcome::Failure {
                error: format!("probe status: {}", response.status()),
            },
            Err(e) if e.is_timeout() => ProbeOutcome::Failure {
                error: "probe timeout".to_string(),
            },
            Err(e) => ProbeOutcome::Failure {
                error: format!("probe failed: {}", e),
            },
        }
    }

    /// Probe a single target once (for testing and warm-up).
    pub async fn probe_once(&self, target: &Target) -> ProbeOutcome {
        Self::probe(&self.client, target).await
    }
}
