// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality sink that records what it is sent.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use telerelay_core::{QualityReport, QualitySink, TelerelayError};

/// Captures every report. Can be switched to fail on demand.
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<(String, QualityReport)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every report is rejected and not recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn reports(&self) -> Vec<(String, QualityReport)> {
        self.reports.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.reports.lock().await.len()
    }
}

#[async_trait]
impl QualitySink for RecordingSink {
    async fn report_quality(
        &self,
        participant_id: &str,
        report: &QualityReport,
    ) -> Result<(), TelerelayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TelerelayError::Report {
                message: "sink unavailable".to_string(),
                source: None,
            });
        }
        self.reports
            .lock()
            .await
            .push((participant_id.to_string(), report.clone()));
        Ok(())
    }
}
