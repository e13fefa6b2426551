// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`QualityMonitor`] that also pushes its samples to a [`QualitySink`].
//!
//! Reports go out on their own interval while monitoring. A change to a
//! degraded grade re-sends the last delivered report straight away instead of
//! waiting for the next tick, and stopping sends one final report.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use telerelay_core::{ConnectionState, PeerConnection, QualityGrade, QualitySink};

use crate::monitor::{MonitorObserver, MonitorSettings, QualityMonitor};
use crate::sample::{ConnectionSample, DetailedStats};

struct Reporter {
    sink: Arc<dyn QualitySink>,
    participant_id: Option<String>,
    last_reported: Mutex<Option<ConnectionSample>>,
}

impl Reporter {
    async fn report(&self, sample: &ConnectionSample) {
        let Some(participant_id) = self.participant_id.as_deref() else {
            return;
        };
        if sample.quality == QualityGrade::Disconnected {
            debug!(participant_id, "connection disconnected, skipping quality report");
            return;
        }

        match self.sink.report_quality(participant_id, &sample.to_report()).await {
            Ok(()) => {
                telerelay_prometheus::record_quality_report(true);
                *self.last_reported.lock().await = Some(sample.clone());
            }
            Err(e) => {
                telerelay_prometheus::record_quality_report(false);
                warn!(participant_id, error = %e, "failed to report connection quality");
            }
        }
    }

    async fn escalate(&self, grade: QualityGrade) {
        let last = self.last_reported.lock().await.clone();
        if let Some(sample) = last {
            info!(quality = %grade, "connection degraded, re-sending last quality report");
            self.report(&sample).await;
        }
    }
}

/// Forwards degrading grade changes from the sampling task to the reporter.
struct Escalations(mpsc::UnboundedSender<QualityGrade>);

impl MonitorObserver for Escalations {
    fn on_quality_change(&self, grade: QualityGrade, _sample: &ConnectionSample) {
        if grade.is_degraded() {
            // The receiver lives as long as the monitor that owns this observer.
            let _ = self.0.send(grade);
        }
    }
}

/// Quality monitor composed with a reporting sink.
pub struct ReportingMonitor {
    monitor: Arc<QualityMonitor>,
    reporter: Arc<Reporter>,
    report_interval: Duration,
    auto_report: bool,
    escalations: Arc<Mutex<mpsc::UnboundedReceiver<QualityGrade>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReportingMonitor {
    /// Reports are sent only when `participant_id` is set and
    /// `settings.auto_report` is on; sampling runs regardless.
    pub async fn new(
        settings: &MonitorSettings,
        sink: Arc<dyn QualitySink>,
        participant_id: Option<String>,
    ) -> Self {
        let monitor = Arc::new(QualityMonitor::from_settings(settings));
        let (tx, rx) = mpsc::unbounded_channel();
        monitor.add_observer(Arc::new(Escalations(tx))).await;

        Self {
            monitor,
            reporter: Arc::new(Reporter {
                sink,
                participant_id,
                last_reported: Mutex::new(None),
            }),
            report_interval: settings.report_interval,
            auto_report: settings.auto_report,
            escalations: Arc::new(Mutex::new(rx)),
            task: Mutex::new(None),
        }
    }

    /// The underlying sampling monitor.
    pub fn monitor(&self) -> &Arc<QualityMonitor> {
        &self.monitor
    }

    fn reporting_enabled(&self) -> bool {
        self.auto_report && self.reporter.participant_id.is_some()
    }

    pub async fn attach(&self, peer: Arc<dyn PeerConnection>) {
        self.monitor.attach(peer).await;
    }

    pub async fn notify_connection_state(&self, state: ConnectionState) -> bool {
        if state == ConnectionState::Connected {
            self.start().await
        } else {
            false
        }
    }

    /// Start sampling and, when enabled, the reporting loop.
    pub async fn start(&self) -> bool {
        let started = self.monitor.start().await;
        if !started || !self.reporting_enabled() {
            return started;
        }

        let Some(cancel) = self.monitor.session_token().await else {
            return started;
        };
        let handle = tokio::spawn(reporting_loop(
            Arc::clone(&self.reporter),
            Arc::clone(&self.monitor),
            Arc::clone(&self.escalations),
            self.report_interval,
            cancel,
        ));
        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
        started
    }

    /// Stop sampling and reporting, then send one final report of the last sample.
    pub async fn stop(&self) -> bool {
        let stopped = self.monitor.stop().await;
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "quality reporting task failed");
            }
        }

        // Escalations left unhandled belong to the session that just ended.
        let mut escalations = self.escalations.lock().await;
        let mut discarded = 0usize;
        while escalations.try_recv().is_ok() {
            discarded += 1;
        }
        drop(escalations);
        if discarded > 0 {
            debug!(discarded, "dropped pending quality escalations");
        }

        if stopped && self.reporting_enabled() {
            if let Some(sample) = self.monitor.latest_sample().await {
                self.reporter.report(&sample).await;
            }
        }
        stopped
    }

    pub async fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring().await
    }

    pub async fn latest_sample(&self) -> Option<ConnectionSample> {
        self.monitor.latest_sample().await
    }

    pub async fn detailed_stats(&self) -> Option<DetailedStats> {
        self.monitor.detailed_stats().await
    }

    /// The last sample the sink accepted.
    pub async fn last_reported(&self) -> Option<ConnectionSample> {
        self.reporter.last_reported.lock().await.clone()
    }
}

async fn reporting_loop(
    reporter: Arc<Reporter>,
    monitor: Arc<QualityMonitor>,
    escalations: Arc<Mutex<mpsc::UnboundedReceiver<QualityGrade>>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut escalations = escalations.lock().await;
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("quality reporting shutting down");
                break;
            }
            Some(grade) = escalations.recv() => {
                reporter.escalate(grade).await;
            }
            _ = interval.tick() => {
                if let Some(sample) = monitor.latest_sample().await {
                    reporter.report(&sample).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use telerelay_core::{QualityReport, TelerelayError};
    use telerelay_test_utils::{synthetic_report, MockPeerConnection, RecordingSink};
    use tracing_test::traced_test;

    use super::*;

    /// Records reports, but each one waits for `gate` to be free first.
    #[derive(Default)]
    struct GatedSink {
        gate: Mutex<()>,
        grades: std::sync::Mutex<Vec<QualityGrade>>,
    }

    #[async_trait]
    impl QualitySink for GatedSink {
        async fn report_quality(
            &self,
            _participant_id: &str,
            report: &QualityReport,
        ) -> Result<(), TelerelayError> {
            let _open = self.gate.lock().await;
            self.grades.lock().unwrap().push(report.quality);
            Ok(())
        }
    }

    fn settings() -> MonitorSettings {
        MonitorSettings {
            sample_interval: Duration::from_millis(1000),
            report_interval: Duration::from_millis(5000),
            auto_report: true,
        }
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn sink_failures_are_logged_and_sampling_continues() {
        let peer = Arc::new(MockPeerConnection::steady(synthetic_report(
            1000.0, 50.0, 0.0, 5.0,
        )));
        let sink = Arc::new(RecordingSink::new());
        sink.set_failing(true);

        let monitor = ReportingMonitor::new(&settings(), sink.clone(), Some("pt-luis".into())).await;
        monitor.attach(peer.clone()).await;
        assert!(monitor.start().await);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(peer.stats_calls(), 3);

        // The final report runs on the caller's task.
        assert!(monitor.stop().await);
        assert!(logs_contain("failed to report connection quality"));
        assert!(monitor.last_reported().await.is_none());
        assert_eq!(sink.count().await, 0);
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn disconnected_samples_are_not_reported() {
        let peer = Arc::new(MockPeerConnection::steady(synthetic_report(0.0, 0.0, 0.0, 0.0)));
        let sink = Arc::new(RecordingSink::new());

        let monitor = ReportingMonitor::new(&settings(), sink.clone(), Some("pt-luis".into())).await;
        monitor.attach(peer).await;
        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(6000)).await;
        monitor.stop().await;

        assert_eq!(
            monitor.latest_sample().await.unwrap().quality,
            QualityGrade::Disconnected
        );
        assert_eq!(sink.count().await, 0);
        assert!(logs_contain("skipping quality report"));
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_left_from_previous_session_is_not_replayed() {
        let peer = Arc::new(MockPeerConnection::new());
        peer.push_report(synthetic_report(1000.0, 50.0, 0.0, 5.0)).await;
        peer.push_report(synthetic_report(50.0, 0.0, 0.0, 0.0)).await;
        peer.push_report(synthetic_report(1000.0, 50.0, 0.0, 5.0)).await;
        let sink = Arc::new(GatedSink::default());
        let monitor = Arc::new(
            ReportingMonitor::new(&settings(), sink.clone(), Some("pt-luis".into())).await,
        );
        monitor.attach(peer.clone()).await;

        // Hold the sink so the reporting loop is stuck in its first report
        // while the next sample degrades and queues an escalation.
        let gate = sink.gate.lock().await;
        assert!(monitor.start().await);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(peer.stats_calls(), 2);

        let stopping = tokio::spawn({
            let monitor = Arc::clone(&monitor);
            async move { monitor.stop().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(gate);
        assert!(stopping.await.unwrap());
        assert_eq!(
            *sink.grades.lock().unwrap(),
            vec![QualityGrade::Excellent, QualityGrade::Poor]
        );

        assert!(monitor.start().await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        monitor.stop().await;

        assert_eq!(
            *sink.grades.lock().unwrap(),
            vec![
                QualityGrade::Excellent,
                QualityGrade::Poor,
                QualityGrade::Excellent,
                QualityGrade::Excellent,
            ]
        );
    }
}
