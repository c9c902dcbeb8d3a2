use classclash_common::{ArchivePairKey, Collision};
use classclash_core::{AnalysisResult, PathCollision};
use serde::Serialize;
use std::fmt;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

struct Palette {
    use_color: bool,
}

impl Palette {
    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Human-readable report of a bundle analysis
pub struct TextReport<'a> {
    pub left: &'a str,
    pub right: &'a str,
    pub result: &'a AnalysisResult,
    pub threshold: f64,
    pub passed: bool,
    pub use_color: bool,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let palette = Palette { use_color: self.use_color };
        let result = self.result;

        writeln!(f, "\n{}", "=".repeat(80))?;
        writeln!(f, "Collision Report")?;
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(f, "Left:  {}", self.left)?;
        writeln!(f, "Right: {}", self.right)?;

        if !result.identical_archive_pairs.is_empty() {
            writeln!(f, "\n{}", palette.paint(GREEN, "Identical libraries (harmless):"))?;
            for key in &result.identical_archive_pairs {
                let shared = result.superseded.get(key).copied().unwrap_or(0);
                writeln!(f, "  (==) {} sharing {} classes", key, shared)?;
            }
        }

        if !result.identical_content_in_differing_archives.is_empty() {
            writeln!(
                f,
                "\n{}",
                palette.paint(YELLOW, "Identical classes in differing libraries (harmless):")
            )?;
            for (key, collisions) in &result.identical_content_in_differing_archives {
                writeln!(f, "  {} {} classes", key, collisions.len())?;
                for collision in collisions {
                    writeln!(f, "    (==) {}", collision.name())?;
                }
            }
        }

        if !result.true_collisions_in_archives.is_empty() {
            writeln!(f, "\n{}", palette.paint(RED, "Conflicting classes in libraries:"))?;
            for report in result.archive_pair_reports(self.threshold) {
                if report.same_artifact {
                    writeln!(
                        f,
                        "  (!=) {} looks like the same artifact in different versions ({} of {}/{} classes differ)",
                        report.key,
                        report.collisions.len(),
                        report.left_units,
                        report.right_units
                    )?;
                    continue;
                }
                writeln!(f, "  {} {} classes", report.key, report.collisions.len())?;
                for collision in report.collisions {
                    writeln!(f, "    (!=) {}", collision.name())?;
                }
            }
        }

        if !result.other_collisions.is_empty() {
            writeln!(f, "\n{}", palette.paint(RED, "Other collisions:"))?;
            for collision in &result.other_collisions {
                writeln!(
                    f,
                    "  (!=) {} [{} x {}]",
                    collision.name(),
                    collision.left.location.describe(),
                    collision.right.location.describe()
                )?;
            }
        }

        let summary = result.summary();
        writeln!(f, "\n{}", "=".repeat(80))?;
        writeln!(f, "Summary:")?;
        writeln!(f, "  Name collisions:        {}", summary.raw_collisions)?;
        writeln!(
            f,
            "  Identical libraries:    {} ({} classes)",
            summary.identical_archive_pairs, summary.superseded
        )?;
        writeln!(f, "  Identical classes:      {}", summary.identical_content)?;
        writeln!(f, "  Conflicting classes:    {}", summary.true_collisions)?;
        writeln!(f, "  Other collisions:       {}", summary.other_collisions)?;
        let verdict = if self.passed {
            palette.paint(GREEN, "PASSED")
        } else {
            palette.paint(RED, "FAILED")
        };
        writeln!(f, "  Result:                 {}", verdict)?;
        writeln!(f, "{}", "=".repeat(80))
    }
}

#[derive(Serialize)]
pub struct JsonReport {
    pub left: String,
    pub right: String,
    pub passed: bool,
    pub summary: JsonSummary,
    pub identical_archive_pairs: Vec<JsonIdenticalPair>,
    pub identical_content_in_differing_archives: Vec<JsonArchivePair>,
    pub true_collisions_in_archives: Vec<JsonArchivePair>,
    pub other_collisions: Vec<JsonCollision>,
}

#[derive(Serialize)]
pub struct JsonSummary {
    pub raw_collisions: usize,
    pub identical_archive_pairs: usize,
    pub superseded: usize,
    pub identical_content: usize,
    pub true_collisions: usize,
    pub other_collisions: usize,
}

#[derive(Serialize)]
pub struct JsonIdenticalPair {
    pub left_archive: String,
    pub right_archive: String,
    pub shared_classes: usize,
}

#[derive(Serialize)]
pub struct JsonArchivePair {
    pub left_archive: String,
    pub right_archive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_artifact: Option<bool>,
    pub classes: Vec<String>,
}

#[derive(Serialize)]
pub struct JsonCollision {
    pub class: String,
    pub left: String,
    pub right: String,
}

fn archive_pair(key: &ArchivePairKey, collisions: &[Collision], same_artifact: Option<bool>) -> JsonArchivePair {
    JsonArchivePair {
        left_archive: key.left.clone(),
        right_archive: key.right.clone(),
        same_artifact,
        classes: collisions.iter().map(|c| c.name().to_string()).collect(),
    }
}

pub fn build_json_report(
    left: &str,
    right: &str,
    result: &AnalysisResult,
    threshold: f64,
    passed: bool,
) -> JsonReport {
    let summary = result.summary();

    JsonReport {
        left: left.to_string(),
        right: right.to_string(),
        passed,
        summary: JsonSummary {
            raw_collisions: summary.raw_collisions,
            identical_archive_pairs: summary.identical_archive_pairs,
            superseded: summary.superseded,
            identical_content: summary.identical_content,
            true_collisions: summary.true_collisions,
            other_collisions: summary.other_collisions,
        },
        identical_archive_pairs: result
            .identical_archive_pairs
            .iter()
            .map(|key| JsonIdenticalPair {
                left_archive: key.left.clone(),
                right_archive: key.right.clone(),
                shared_classes: result.superseded.get(key).copied().unwrap_or(0),
            })
            .collect(),
        identical_content_in_differing_archives: result
            .identical_content_in_differing_archives
            .iter()
            .map(|(key, collisions)| archive_pair(key, collisions, None))
            .collect(),
        true_collisions_in_archives: result
            .archive_pair_reports(threshold)
            .into_iter()
            .map(|report| archive_pair(report.key, report.collisions, Some(report.same_artifact)))
            .collect(),
        other_collisions: result
            .other_collisions
            .iter()
            .map(|collision| JsonCollision {
                class: collision.name().to_string(),
                left: collision.left.location.describe(),
                right: collision.right.location.describe(),
            })
            .collect(),
    }
}

/// Log lines for classpath collisions, one entry per colliding path
pub fn classpath_messages(
    label: &str,
    collisions: &[PathCollision],
    roots: &[classclash_core::ClasspathRoot],
    as_class_names: bool,
) -> Vec<String> {
    collisions
        .iter()
        .map(|collision| {
            let subject = if as_class_names {
                collision.class_name()
            } else {
                collision.path.clone()
            };
            collision.describe(label, roots, &subject)
        })
        .collect()
}
