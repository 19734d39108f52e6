use thiserror::Error;
use voxscreen_core::{AnalysisReport, AppPhase};

/// User-facing message for a microphone/capture failure.
pub const RECORDING_FAILED_MESSAGE: &str =
    "Recording failed. Please check microphone permissions and try again.";

/// User-facing message for any analysis-call, schema, or parse failure.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to get analysis from AI. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal phase transition: {from:?} -> {to:?}")]
pub struct PhaseError {
    pub from: AppPhase,
    pub to: AppPhase,
}

/// The application state machine.
///
/// Holds the single active `AppPhase` plus the data each terminal phase
/// exposes (the report in Results, the message in Error). Every mutation
/// funnels through `transition`, so an illegal edge can never change state.
#[derive(Debug, Default)]
pub struct AppMachine {
    phase: AppPhase,
    report: Option<AnalysisReport>,
    error: Option<String>,
}

impl AppMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// User starts recording. Only legal from Idle; the phase value is the
    /// sole lock preventing overlapping sessions.
    pub fn start_recording(&mut self) -> Result<(), PhaseError> {
        self.transition(AppPhase::Recording)
    }

    /// The recording controller signalled failure instead of a payload.
    pub fn recording_failed(&mut self) -> Result<(), PhaseError> {
        self.transition(AppPhase::Error)?;
        self.error = Some(RECORDING_FAILED_MESSAGE.into());
        Ok(())
    }

    /// The controller delivered a payload; the analysis call is starting.
    pub fn begin_analysis(&mut self) -> Result<(), PhaseError> {
        self.transition(AppPhase::Analyzing)
    }

    pub fn analysis_succeeded(&mut self, report: AnalysisReport) -> Result<(), PhaseError> {
        self.transition(AppPhase::Results)?;
        self.report = Some(report);
        Ok(())
    }

    pub fn analysis_failed(&mut self, message: impl Into<String>) -> Result<(), PhaseError> {
        self.transition(AppPhase::Error)?;
        self.error = Some(message.into());
        Ok(())
    }

    /// Clears the report and message and returns to Idle.
    pub fn reset(&mut self) -> Result<(), PhaseError> {
        self.transition(AppPhase::Idle)?;
        self.report = None;
        self.error = None;
        Ok(())
    }

    fn transition(&mut self, to: AppPhase) -> Result<(), PhaseError> {
        use AppPhase::*;

        let legal = matches!(
            (self.phase, to),
            (Idle, Recording)
                | (Recording, Analyzing)
                | (Recording, Error)
                | (Analyzing, Results)
                | (Analyzing, Error)
                | (Results, Idle)
                | (Error, Idle)
        );

        if !legal {
            return Err(PhaseError {
                from: self.phase,
                to,
            });
        }

        log::debug!("phase {:?} -> {:?}", self.phase, to);
        self.phase = to;
        Ok(())
    }
}
