use voxscreen_core::AnalysisReport;

pub const DISCLAIMER: &str = "This tool does not provide a medical diagnosis. \
Results are potential risk indicators only; consult a healthcare professional \
about any concerns.";

pub const INSTRUCTIONS: &str = "For the best analysis, please speak clearly for \
at least 20-30 seconds. You can describe your day, read a paragraph, or talk \
about how you are feeling.";

/// Render the report as plain terminal text.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str("Analysis Results\n");
    out.push_str("================\n\n");
    out.push_str(&report.summary);
    out.push('\n');

    for condition in &report.conditions {
        out.push('\n');
        out.push_str(&format!(
            "{} [{}]\n",
            condition.condition_name, condition.risk_level
        ));
        out.push_str(&format!("  {}\n", condition.explanation));
        if !condition.symptoms.is_empty() {
            out.push_str("  Vocal indicators:\n");
            for symptom in &condition.symptoms {
                out.push_str(&format!("    - {symptom}\n"));
            }
        }
    }

    out.push('\n');
    out.push_str(DISCLAIMER);
    out.push('\n');
    out
}
