// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic connection-quality sampling.
//!
//! A [`QualityMonitor`] is either idle or monitoring. While monitoring, one
//! tokio task reads the attached peer connection's statistics on a fixed
//! interval and publishes the reduced sample. The peer handle is re-read on
//! every tick, so a handle swapped in with [`QualityMonitor::attach`] takes
//! effect on the next sample.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use telerelay_config::model::MonitorConfig;
use telerelay_core::{ConnectionState, PeerConnection, QualityGrade};

use crate::sample::{parse_report, ConnectionSample, DetailedStats};

/// Callbacks fired from the sampling task.
///
/// Implementations must not block; hand work off to a channel or task.
pub trait MonitorObserver: Send + Sync + 'static {
    /// Every published sample.
    fn on_sample(&self, _sample: &ConnectionSample) {}

    /// The grade differs from the previous sample's. The first sample of a
    /// monitor always counts as a change.
    fn on_quality_change(&self, _grade: QualityGrade, _sample: &ConnectionSample) {}
}

/// Timing and reporting knobs for the monitor family.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub sample_interval: Duration,
    pub report_interval: Duration,
    pub auto_report: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(1000),
            report_interval: Duration::from_millis(5000),
            auto_report: true,
        }
    }
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            sample_interval: Duration::from_millis(config.sample_interval_ms),
            report_interval: Duration::from_millis(config.report_interval_ms),
            auto_report: config.auto_report,
        }
    }
}

#[derive(Default)]
struct Shared {
    peer: RwLock<Option<Arc<dyn PeerConnection>>>,
    latest: RwLock<Option<(ConnectionSample, DetailedStats)>>,
    previous_grade: Mutex<Option<QualityGrade>>,
    observers: RwLock<Vec<Arc<dyn MonitorObserver>>>,
}

impl Shared {
    /// Take one sample from the current peer. Read failures are logged and
    /// leave the previous sample in place.
    async fn sample_once(&self) {
        let Some(peer) = self.peer.read().await.clone() else {
            debug!("no peer connection attached, skipping sample");
            return;
        };

        let report = match peer.get_stats().await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "failed to read connection stats");
                return;
            }
        };

        let now = chrono::Utc::now().timestamp_millis();
        let (sample, detailed) = parse_report(&report, peer.connection_state(), now);
        telerelay_prometheus::record_quality_sample(&sample.quality.to_string());

        let changed = {
            let mut previous = self.previous_grade.lock().await;
            let changed = *previous != Some(sample.quality);
            *previous = Some(sample.quality);
            changed
        };

        *self.latest.write().await = Some((sample.clone(), detailed));

        let observers = self.observers.read().await.clone();
        for observer in &observers {
            observer.on_sample(&sample);
        }
        if changed {
            info!(quality = %sample.quality, bitrate = sample.bitrate, latency = sample.latency, "connection quality changed");
            for observer in &observers {
                observer.on_quality_change(sample.quality, &sample);
            }
        }
    }
}

struct Session {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Samples a peer connection's quality on a fixed interval.
pub struct QualityMonitor {
    shared: Arc<Shared>,
    interval: Duration,
    session: Mutex<Option<Session>>,
}

impl QualityMonitor {
    /// A monitor sampling every `interval`. `interval` must be non-zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            interval,
            session: Mutex::new(None),
        }
    }

    pub fn from_settings(settings: &MonitorSettings) -> Self {
        Self::new(settings.sample_interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Set or replace the peer connection sampled on each tick.
    pub async fn attach(&self, peer: Arc<dyn PeerConnection>) {
        *self.shared.peer.write().await = Some(peer);
    }

    /// Drop the peer handle; ticks become no-ops until one is attached again.
    pub async fn detach(&self) {
        *self.shared.peer.write().await = None;
    }

    pub async fn add_observer(&self, observer: Arc<dyn MonitorObserver>) {
        self.shared.observers.write().await.push(observer);
    }

    /// Start monitoring once the connection reports `connected`.
    pub async fn notify_connection_state(&self, state: ConnectionState) -> bool {
        if state == ConnectionState::Connected {
            self.start().await
        } else {
            false
        }
    }

    /// Take one sample immediately, then keep sampling on the interval.
    ///
    /// Returns `false` without doing anything when already monitoring or when
    /// no peer connection is attached.
    pub async fn start(&self) -> bool {
        let mut session = self.session.lock().await;
        if session.is_some() {
            debug!("quality monitor already running");
            return false;
        }
        if self.shared.peer.read().await.is_none() {
            debug!("quality monitor has no peer connection, not starting");
            return false;
        }

        self.shared.sample_once().await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(sampling_loop(
            Arc::clone(&self.shared),
            self.interval,
            cancel.clone(),
        ));
        *session = Some(Session { cancel, task });
        info!(interval_ms = self.interval.as_millis() as u64, "quality monitoring started");
        true
    }

    /// Stop sampling and wait for the task to exit. The last sample stays
    /// readable; the next session's first sample counts as a grade change.
    pub async fn stop(&self) -> bool {
        let Some(session) = self.session.lock().await.take() else {
            return false;
        };
        session.cancel.cancel();
        if let Err(e) = session.task.await {
            warn!(error = %e, "quality sampling task failed");
        }
        *self.shared.previous_grade.lock().await = None;
        info!("quality monitoring stopped");
        true
    }

    pub async fn is_monitoring(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// A token cancelled when the current monitoring session ends, or `None`
    /// while idle.
    pub async fn session_token(&self) -> Option<CancellationToken> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.cancel.child_token())
    }

    pub async fn latest_sample(&self) -> Option<ConnectionSample> {
        self.shared.latest.read().await.as_ref().map(|(s, _)| s.clone())
    }

    pub async fn detailed_stats(&self) -> Option<DetailedStats> {
        self.shared.latest.read().await.as_ref().map(|(_, d)| d.clone())
    }
}

async fn sampling_loop(shared: Arc<Shared>, every: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; start() already sampled.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("quality sampling shutting down");
                break;
            }
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = shared.sample_once() => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use telerelay_test_utils::{synthetic_report, MockPeerConnection};
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn settings_from_config() {
        let settings = MonitorSettings::from(&MonitorConfig {
            sample_interval_ms: 250,
            report_interval_ms: 2000,
            auto_report: false,
        });
        assert_eq!(settings.sample_interval, Duration::from_millis(250));
        assert_eq!(settings.report_interval, Duration::from_secs(2));
        assert!(!settings.auto_report);
    }

    #[tokio::test]
    async fn start_without_peer_is_noop() {
        let monitor = QualityMonitor::new(Duration::from_millis(100));
        assert!(!monitor.start().await);
        assert!(!monitor.is_monitoring().await);
        assert!(monitor.session_token().await.is_none());
        assert!(!monitor.stop().await);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn stats_failures_are_logged_and_keep_previous_sample() {
        let peer = Arc::new(MockPeerConnection::new());
        peer.push_failure("connection closed").await;
        peer.push_report(synthetic_report(1000.0, 50.0, 0.0, 5.0)).await;

        let monitor = QualityMonitor::new(Duration::from_millis(1000));
        monitor.attach(peer.clone()).await;
        assert!(monitor.start().await);
        assert!(logs_contain("failed to read connection stats"));
        assert!(monitor.latest_sample().await.is_none());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let good = monitor.latest_sample().await.unwrap();
        assert_eq!(good.quality, QualityGrade::Excellent);

        peer.push_failure("connection closed").await;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(peer.stats_calls(), 3);
        assert_eq!(monitor.latest_sample().await.unwrap(), good);
        assert!(monitor.is_monitoring().await);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn non_connected_states_do_not_start() {
        let monitor = QualityMonitor::new(Duration::from_millis(100));
        for state in [
            ConnectionState::New,
            ConnectionState::Connecting,
            ConnectionState::Failed,
        ] {
            assert!(!monitor.notify_connection_state(state).await);
        }
    }
}
