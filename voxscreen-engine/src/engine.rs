use std::sync::Arc;

use base64::Engine as _;
use voxscreen_core::{AnalysisReport, AppPhase, AudioPayload};
use voxscreen_providers::gemini::EncodedAudio;

use crate::machine::{ANALYSIS_FAILED_MESSAGE, AppMachine, PhaseError};
use crate::traits::Analyst;

/// Sequences the user-visible phases and mediates the hand-off between the
/// recording controller and the analysis boundary.
///
/// The analysis call is made exactly once per payload: no retries, no
/// timeout beyond the transport's own, no cancellation.
pub struct ScreeningEngine {
    analyst: Arc<dyn Analyst>,
    machine: AppMachine,
}

impl ScreeningEngine {
    pub fn new(analyst: Arc<dyn Analyst>) -> Self {
        Self {
            analyst,
            machine: AppMachine::new(),
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.machine.phase()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.machine.report()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.machine.error_message()
    }

    pub fn start_recording(&mut self) -> Result<(), PhaseError> {
        self.machine.start_recording()
    }

    pub fn recording_failed(&mut self) -> Result<(), PhaseError> {
        self.machine.recording_failed()
    }

    /// Run the analysis hand-off for a finished recording.
    ///
    /// Converts the payload to its transport encoding, invokes the analyst
    /// once, and lands in Results or Error. The returned error only covers
    /// phase misuse; analysis failures are absorbed into the Error phase
    /// with a user-facing message, the cause going to the log.
    pub async fn analyze(&mut self, payload: &AudioPayload) -> Result<(), PhaseError> {
        self.machine.begin_analysis()?;

        let audio = EncodedAudio {
            data_base64: base64::engine::general_purpose::STANDARD.encode(&payload.bytes),
            mime_type: payload.mime_type.clone(),
        };

        match self.analyst.analyze(&audio).await {
            Ok(report) => self.machine.analysis_succeeded(report),
            Err(e) => {
                log::warn!("analysis failed: {e:#}");
                self.machine.analysis_failed(ANALYSIS_FAILED_MESSAGE)
            }
        }
    }

    pub fn reset(&mut self) -> Result<(), PhaseError> {
        self.machine.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use voxscreen_core::{ConditionReport, RiskLevel};

    struct FixedAnalyst {
        report: AnalysisReport,
    }

    #[async_trait]
    impl Analyst for FixedAnalyst {
        async fn analyze(&self, _audio: &EncodedAudio) -> anyhow::Result<AnalysisReport> {
            Ok(self.report.clone())
        }
    }

    struct FailingAnalyst;

    #[async_trait]
    impl Analyst for FailingAnalyst {
        async fn analyze(&self, _audio: &EncodedAudio) -> anyhow::Result<AnalysisReport> {
            Err(anyhow::anyhow!("service unavailable"))
        }
    }

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            summary: "Steady voice.".into(),
            conditions: vec![ConditionReport {
                condition_name: "Asthma".into(),
                risk_level: RiskLevel::NotDetected,
                explanation: "No wheezing heard.".into(),
                symptoms: vec!["clear airflow".into()],
            }],
        }
    }

    #[tokio::test]
    async fn success_path_lands_in_results_with_the_report() {
        let mut engine = ScreeningEngine::new(Arc::new(FixedAnalyst {
            report: sample_report(),
        }));

        engine.start_recording().unwrap();
        engine
            .analyze(&AudioPayload::wav(vec![1, 2, 3]))
            .await
            .unwrap();

        assert_eq!(engine.phase(), AppPhase::Results);
        assert_eq!(engine.report(), Some(&sample_report()));
        assert!(engine.error_message().is_none());
    }

    #[tokio::test]
    async fn analyst_failure_lands_in_error_and_reset_clears_it() {
        let mut engine = ScreeningEngine::new(Arc::new(FailingAnalyst));

        engine.start_recording().unwrap();
        engine
            .analyze(&AudioPayload::wav(vec![0; 16]))
            .await
            .unwrap();

        assert_eq!(engine.phase(), AppPhase::Error);
        let msg = engine.error_message().unwrap();
        assert!(!msg.is_empty());
        assert!(engine.report().is_none());

        engine.reset().unwrap();
        assert_eq!(engine.phase(), AppPhase::Idle);
        assert!(engine.error_message().is_none());
    }

    #[tokio::test]
    async fn analyze_is_gated_on_the_recording_phase() {
        let mut engine = ScreeningEngine::new(Arc::new(FailingAnalyst));

        // Not recording yet: the hand-off must be rejected without
        // touching the analyst.
        let err = engine
            .analyze(&AudioPayload::wav(vec![1]))
            .await
            .unwrap_err();
        assert_eq!(err.from, AppPhase::Idle);
        assert_eq!(engine.phase(), AppPhase::Idle);
    }
}
