//! Translation run reporting.

use serde::{Deserialize, Serialize};

/// Outcome of translating one resource instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Type and every field rule applied cleanly.
    Translated,
    /// Type translated, but one or more substitutions had no equivalent;
    /// each entry names the specific missing sub-mapping.
    PartiallyTranslated(Vec<String>),
    /// No mapping for the resource type; passed through unchanged.
    Untranslated(String),
}

/// A resource whose type had no mapping entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntranslatedResource {
    pub address: String,
    pub type_name: String,
    pub reason: String,
}

/// A resource translated with one or more missing sub-mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResource {
    pub address: String,
    pub type_name: String,
    pub missing: Vec<String>,
}

/// Accumulated counts and degradations for one translation run.
///
/// The report is the only channel through which "your estimate may be
/// inaccurate" reaches the caller; the engine itself never aborts a run
/// because resources were untranslatable. No timing is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    /// Resources processed.
    pub total: usize,
    /// Resources translated with every rule applied cleanly.
    pub translated: usize,
    pub partial: Vec<PartialResource>,
    pub untranslated: Vec<UntranslatedResource>,
}

impl TranslationReport {
    /// Fold one resource outcome into the report.
    pub fn record(&mut self, address: &str, type_name: &str, status: ResourceStatus) {
        self.total += 1;
        match status {
            ResourceStatus::Translated => self.translated += 1,
            ResourceStatus::PartiallyTranslated(missing) => self.partial.push(PartialResource {
                address: address.to_string(),
                type_name: type_name.to_string(),
                missing,
            }),
            ResourceStatus::Untranslated(reason) => self.untranslated.push(UntranslatedResource {
                address: address.to_string(),
                type_name: type_name.to_string(),
                reason,
            }),
        }
    }

    /// Merge another report into this one (parallel shards).
    pub fn merge(&mut self, other: TranslationReport) {
        self.total += other.total;
        self.translated += other.translated;
        self.partial.extend(other.partial);
        self.untranslated.extend(other.untranslated);
    }

    /// Whether every resource translated without degradation.
    pub fn is_clean(&self) -> bool {
        self.partial.is_empty() && self.untranslated.is_empty()
    }

    /// Generate a human-readable summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Resources: {} total, {} translated, {} partial, {} untranslated\n",
            self.total,
            self.translated,
            self.partial.len(),
            self.untranslated.len()
        ));

        if !self.partial.is_empty() {
            out.push_str("\nPartially translated:\n");
            for entry in &self.partial {
                out.push_str(&format!("  ~ {} ({})\n", entry.address, entry.type_name));
                for miss in &entry.missing {
                    out.push_str(&format!("      missing: {miss}\n"));
                }
            }
        }

        if !self.untranslated.is_empty() {
            out.push_str("\nUntranslated:\n");
            for entry in &self.untranslated {
                out.push_str(&format!(
                    "  - {} ({}): {}\n",
                    entry.address, entry.type_name, entry.reason
                ));
            }
        }

        if self.is_clean() {
            out.push_str("\nEvery resource translated cleanly.\n");
        }

        out
    }
}
