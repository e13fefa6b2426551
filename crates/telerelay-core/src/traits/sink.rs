// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting sink for connection quality.

use async_trait::async_trait;

use crate::error::TelerelayError;
use crate::types::QualityReport;

/// An external, durable destination for quality reports (typically a database).
///
/// Writes are assumed idempotent and fire-and-forget; callers log failures and
/// move on.
#[async_trait]
pub trait QualitySink: Send + Sync {
    async fn report_quality(
        &self,
        participant_id: &str,
        report: &QualityReport,
    ) -> Result<(), TelerelayError>;
}
