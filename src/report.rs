use serde::Serialize;

use crate::assemble::PageOutcome;
use crate::error::Severity;
use crate::loader::LoadFailure;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub page: String,
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

/// Everything one check/build run found, across all pages.
#[derive(Debug)]
pub struct BuildReport {
    pub load_failures: Vec<LoadFailure>,
    pub outcomes: Vec<PageOutcome>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    ok: bool,
    pages: usize,
    rendered: usize,
    failed: usize,
    errors: usize,
    warnings: usize,
    load_failures: &'a [LoadFailure],
    diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for outcome in &self.outcomes {
            for p in outcome.problems() {
                out.push(Diagnostic {
                    page: outcome.id.clone(),
                    severity: p.severity(),
                    code: p.code(),
                    message: p.to_string(),
                });
            }
        }
        out
    }

    pub fn rendered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.rendered()
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics()
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error) + self.load_failures.len()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// True when the run must fail the build.
    pub fn has_fatal(&self) -> bool {
        self.error_count() > 0
    }

    /// Human-readable listing grouped by page.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for f in &self.load_failures {
            out.push_str(&format!("{}\n  error   {:<22} {}\n", f.path.display(), "LoadFailure", f.error));
        }

        let mut current: Option<&str> = None;
        let diagnostics = self.diagnostics();
        for d in &diagnostics {
            if current != Some(d.page.as_str()) {
                out.push_str(&format!("{}\n", d.page));
                current = Some(d.page.as_str());
            }
            let sev = match d.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            out.push_str(&format!("  {:<7} {:<22} {}\n", sev, d.code, d.message));
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!(
            "{} pages: {} rendered, {} failed ({} errors, {} warnings)\n",
            self.outcomes.len(),
            self.rendered(),
            self.failed(),
            self.error_count(),
            self.warning_count()
        ));
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let report = JsonReport {
            ok: !self.has_fatal(),
            pages: self.outcomes.len(),
            rendered: self.rendered(),
            failed: self.failed(),
            errors: self.error_count(),
            warnings: self.warning_count(),
            load_failures: &self.load_failures,
            diagnostics: self.diagnostics(),
        };
        serde_json::to_string_pretty(&report)
    }
}
