//! PDF report artifact for a completed diagnosis.
//!
//! Layout follows a single A4 page with a manual cursor; identifiers are
//! title-cased for display and confidence is printed to two decimals.
//! Failure here is never fatal to the diagnostic flow — callers keep the
//! on-screen result and only lose the downloadable artifact.

use std::io::BufWriter;
use std::path::Path;

use printpdf::*;
use thiserror::Error;

use crate::engine::DiagnosisSession;
use crate::models::Account;
use crate::vocabulary::display_name;

pub const DISCLAIMER: &str = "Disclaimer: This system provides potential diagnoses based on \
symptoms and is not a substitute for professional medical advice. Always consult a qualified \
healthcare provider for any health concerns.";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF build failed: {0}")]
    Pdf(String),

    #[error("Could not write report to {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Everything the report renders, snapshotted from account + session.
#[derive(Debug, Clone)]
pub struct DiagnosisReport {
    pub patient_name: String,
    pub age: Option<i64>,
    pub weight: Option<i64>,
    pub conditions: String,
    pub symptoms: Vec<String>,
    pub diagnosis_id: String,
    pub confidence: f64,
    pub test: String,
    pub treatment: Vec<String>,
    pub advice: String,
    pub personalized_advice: String,
}

impl DiagnosisReport {
    /// Snapshot a completed session. `None` unless results are ready.
    pub fn from_session(account: &Account, session: &DiagnosisSession) -> Option<Self> {
        let top = session.top_candidate()?;
        let detail = session.detail.as_ref()?;
        if !session.has_results() {
            return None;
        }
        Some(Self {
            patient_name: account.name.clone(),
            age: account.age,
            weight: account.weight,
            conditions: account.conditions_text().to_string(),
            symptoms: session.symptoms.clone(),
            diagnosis_id: top.diagnosis_id.clone(),
            confidence: top.confidence,
            test: detail.test.clone(),
            treatment: detail.treatment.clone(),
            advice: detail.advice.clone(),
            personalized_advice: session
                .personalized_advice
                .clone()
                .unwrap_or_default(),
        })
    }

    fn conditions_display(&self) -> String {
        let trimmed = self.conditions.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            "None".to_string()
        } else if trimmed.eq_ignore_ascii_case("normal") {
            "Normal (no pre-existing)".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Render the report as PDF bytes.
pub fn render_pdf(report: &DiagnosisReport) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new("Medical Diagnosis Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let italic = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

    let mut y = Mm(280.0);

    layer.use_text("Medical Diagnosis Report", 16.0, Mm(20.0), y, &bold);
    y -= Mm(7.0);
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    layer.use_text(format!("Report generated: {generated}"), 9.0, Mm(20.0), y, &font);
    y -= Mm(10.0);

    // Patient information
    layer.use_text("PATIENT INFORMATION", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(format!("Name: {}", report.patient_name), 10.0, Mm(25.0), y, &font);
    y -= Mm(5.0);
    let age = report.age.map_or("N/A".to_string(), |a| a.to_string());
    layer.use_text(format!("Age: {age}"), 10.0, Mm(25.0), y, &font);
    y -= Mm(5.0);
    let weight = report.weight.map_or("N/A".to_string(), |w| format!("{w} kg"));
    layer.use_text(format!("Weight: {weight}"), 10.0, Mm(25.0), y, &font);
    y -= Mm(5.0);
    for line in wrap_text(
        &format!("Reported conditions: {}", report.conditions_display()),
        90,
    ) {
        layer.use_text(&line, 10.0, Mm(25.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(5.0);

    // Reported symptoms
    layer.use_text("REPORTED SYMPTOMS", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    let symptoms = report
        .symptoms
        .iter()
        .map(|s| display_name(s))
        .collect::<Vec<_>>()
        .join(", ");
    for line in wrap_text(&symptoms, 90) {
        layer.use_text(&line, 10.0, Mm(25.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(5.0);

    // Diagnosis outcome
    layer.use_text("DIAGNOSIS OUTCOME", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Possible diagnosis: {}", display_name(&report.diagnosis_id)),
        10.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(
        format!("Confidence: {:.2}%", report.confidence),
        10.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(
        format!("Recommended test: {}", display_name(&report.test)),
        10.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    // Suggested treatment
    layer.use_text("SUGGESTED TREATMENT", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for step in &report.treatment {
        layer.use_text(format!("- {}", display_name(step)), 10.0, Mm(25.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(5.0);

    // General advice
    layer.use_text("GENERAL ADVICE", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for line in wrap_text(&report.advice, 90) {
        layer.use_text(&line, 10.0, Mm(25.0), y, &font);
        y -= Mm(5.0);
    }
    y -= Mm(5.0);

    // Personalized advice
    layer.use_text("PERSONALIZED ADVICE", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for line in report.personalized_advice.lines() {
        for wrapped in wrap_text(line, 90) {
            layer.use_text(&wrapped, 10.0, Mm(25.0), y, &font);
            y -= Mm(5.0);
        }
    }
    y -= Mm(8.0);

    for line in wrap_text(DISCLAIMER, 100) {
        layer.use_text(&line, 8.0, Mm(20.0), y, &italic);
        y -= Mm(4.0);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
}

/// Render and write the report into `dir`, returning the file name that
/// serves as the storage reference.
pub fn write_report(dir: &Path, report: &DiagnosisReport) -> Result<String, ReportError> {
    let bytes = render_pdf(report)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_name = format!(
        "Report_{}_{}.pdf",
        safe_file_stem(&report.diagnosis_id),
        timestamp
    );
    let path = dir.join(&file_name);

    std::fs::create_dir_all(dir).map_err(|e| ReportError::Write {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    std::fs::write(&path, bytes).map_err(|e| ReportError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::info!(file = %file_name, "Diagnosis report written");
    Ok(file_name)
}

fn safe_file_stem(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Greedy word wrap by character count (built-in fonts, no metrics).
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
