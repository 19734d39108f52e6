use anyhow::{Context, anyhow};
use serde::Deserialize;
use voxscreen_core::AnalysisReport;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Joined text of the first candidate, trimmed.
pub fn extract_generated_text(body: &[u8]) -> anyhow::Result<String> {
    let resp: GenerateContentResponse =
        serde_json::from_slice(body).context("decode generateContent JSON")?;

    let text = resp
        .candidates
        .and_then(|c| c.into_iter().next())
        .map(|c| {
            c.content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(anyhow!("no text in generateContent response"));
    }
    Ok(text.to_string())
}

/// Parse a generateContent response into the structured report.
///
/// The service is asked to enforce the schema server-side; any shape
/// violation here is an error, treated upstream like a failed call.
pub fn parse_analysis_report(body: &[u8]) -> anyhow::Result<AnalysisReport> {
    let text = extract_generated_text(body)?;
    serde_json::from_str(&text).context("decode analysis report JSON")
}
