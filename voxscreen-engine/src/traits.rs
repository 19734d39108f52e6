use async_trait::async_trait;
use voxscreen_core::AnalysisReport;
use voxscreen_providers::gemini::EncodedAudio;

/// The analysis boundary: one request/response call mapping encoded audio
/// to a structured risk report. Implementations must not retry.
#[async_trait]
pub trait Analyst: Send + Sync {
    async fn analyze(&self, audio: &EncodedAudio) -> anyhow::Result<AnalysisReport>;
}
