use voxscreen_core::AnalysisReport;
use voxscreen_engine::traits::Analyst;
use voxscreen_providers::gemini::{
    EncodedAudio, GeminiAnalysisConfig, build_generate_content_request,
};
use voxscreen_providers::parse::parse_analysis_report;
use voxscreen_providers::runtime;

/// Gemini-backed analysis boundary: one request, one response, no retries.
pub struct GeminiAnalyst {
    cfg: GeminiAnalysisConfig,
}

impl GeminiAnalyst {
    pub fn new(cfg: GeminiAnalysisConfig) -> Self {
        Self { cfg }
    }
}

#[async_trait::async_trait]
impl Analyst for GeminiAnalyst {
    async fn analyze(&self, audio: &EncodedAudio) -> anyhow::Result<AnalysisReport> {
        let req = build_generate_content_request(&self.cfg, audio);
        log::debug!("analysis request: {req:?}");

        let resp = runtime::execute(&req).await?;
        if !(200..=299).contains(&resp.status) {
            return Err(anyhow::anyhow!(
                "analysis request failed: status={} body={}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            ));
        }

        parse_analysis_report(&resp.body)
    }
}
