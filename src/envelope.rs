// =============================================================================
// Analysis Envelope — auditable wrapper around every served report
// =============================================================================
//
// The engine itself never reads the clock. The envelope is where the service
// stamps an id and the wall-clock time the report was handed out.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::engine::AnalysisReport;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEnvelope {
    /// Unique identifier for this response (UUID v4).
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    /// RFC 3339 timestamp of when the envelope was created.
    pub generated_at: String,

    /// True when the report was served from the cache.
    pub cached: bool,

    pub report: Arc<AnalysisReport>,
}

impl AnalysisEnvelope {
    pub fn new(symbol: Option<String>, report: Arc<AnalysisReport>, cached: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol,
            generated_at: chrono::Utc::now().to_rfc3339(),
            cached,
            report,
        }
    }
}
