use std::sync::Arc;

use voxscreen_core::{ApiKey, AppPhase, AudioPayload, RiskLevel};
use voxscreen_engine::engine::ScreeningEngine;
use voxscreen_engine::machine::ANALYSIS_FAILED_MESSAGE;
use voxscreen_engine::traits::Analyst;
use voxscreen_providers::gemini::{
    DEFAULT_MODEL, EncodedAudio, GeminiAnalysisConfig, build_generate_content_request,
};
use voxscreen_providers::parse::parse_analysis_report;
use voxscreen_providers::runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct GeminiAnalyst {
    cfg: GeminiAnalysisConfig,
}

#[async_trait::async_trait]
impl Analyst for GeminiAnalyst {
    async fn analyze(
        &self,
        audio: &EncodedAudio,
    ) -> anyhow::Result<voxscreen_core::AnalysisReport> {
        let req = build_generate_content_request(&self.cfg, audio);
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

fn engine_against(server: &MockServer) -> ScreeningEngine {
    let cfg = GeminiAnalysisConfig {
        base_url: server.uri(),
        api_key: ApiKey::new("k"),
        model: DEFAULT_MODEL.into(),
    };
    ScreeningEngine::new(Arc::new(GeminiAnalyst { cfg }))
}

fn report_body() -> serde_json::Value {
    let report = serde_json::json!({
        "summary": "Overall your voice sounds healthy.",
        "conditions": [{
            "conditionName": "Throat Issues",
            "riskLevel": "Low",
            "explanation": "Mild hoarseness on sustained vowels.",
            "symptoms": ["slight hoarseness"]
        }]
    });

    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": report.to_string() }] } }]
    })
}

#[tokio::test]
async fn recording_to_results_with_a_well_formed_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{DEFAULT_MODEL}:generateContent")))
        .and(header("x-goog-api-key", "k"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = engine_against(&server);
    engine.start_recording().unwrap();
    engine
        .analyze(&AudioPayload::wav(vec![1, 2, 3, 4]))
        .await
        .unwrap();

    assert_eq!(engine.phase(), AppPhase::Results);
    let report = engine.report().unwrap();
    assert_eq!(report.summary, "Overall your voice sounds healthy.");
    assert_eq!(report.conditions[0].condition_name, "Throat Issues");
    assert_eq!(report.conditions[0].risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn service_error_drives_the_error_phase_and_reset_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let mut engine = engine_against(&server);
    engine.start_recording().unwrap();
    engine.analyze(&AudioPayload::wav(vec![0; 8])).await.unwrap();

    assert_eq!(engine.phase(), AppPhase::Error);
    assert_eq!(engine.error_message(), Some(ANALYSIS_FAILED_MESSAGE));
    assert!(engine.report().is_none());

    engine.reset().unwrap();
    assert_eq!(engine.phase(), AppPhase::Idle);
    assert!(engine.error_message().is_none());
}

#[tokio::test]
async fn malformed_candidate_text_is_treated_like_a_failed_call() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": "not a json report" }] } }]
    });

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let mut engine = engine_against(&server);
    engine.start_recording().unwrap();
    engine.analyze(&AudioPayload::wav(vec![9])).await.unwrap();

    assert_eq!(engine.phase(), AppPhase::Error);
    assert_eq!(engine.error_message(), Some(ANALYSIS_FAILED_MESSAGE));
}

#[tokio::test]
async fn starting_a_new_recording_is_gated_until_reset() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body()))
        .mount(&server)
        .await;

    let mut engine = engine_against(&server);
    engine.start_recording().unwrap();
    engine.analyze(&AudioPayload::wav(vec![7])).await.unwrap();
    assert_eq!(engine.phase(), AppPhase::Results);

    // Results is not Idle; a new session needs an explicit reset first.
    assert!(engine.start_recording().is_err());
    engine.reset().unwrap();
    engine.start_recording().unwrap();
    assert_eq!(engine.phase(), AppPhase::Recording);
}
