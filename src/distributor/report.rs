//! Per-node outcomes of a distribution round

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use uuid::Uuid;

/// Result of dispatching to one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NodeOutcome {
    /// Node built its archive and reported the password
    Success { password: String },

    /// Node could not be reached or refused the payload
    Failure { reason: String },
}

/// Outcome for one node, in node order
#[derive(Debug, Clone, Serialize)]
pub struct DistributionResult {
    /// Node address as configured
    pub node: String,

    /// Position of the node (and of its shards)
    pub index: usize,

    #[serde(flatten)]
    pub outcome: NodeOutcome,
}

impl DistributionResult {
    /// Whether the node accepted its shards
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, NodeOutcome::Success { .. })
    }

    /// Password reported by the node, if it succeeded
    pub fn password(&self) -> Option<&str> {
        match &self.outcome {
            NodeOutcome::Success { password } => Some(password),
            NodeOutcome::Failure { .. } => None,
        }
    }

    /// Failure reason, if the node failed
    pub fn reason(&self) -> Option<&str> {
        match &self.outcome {
            NodeOutcome::Success { .. } => None,
            NodeOutcome::Failure { reason } => Some(reason),
        }
    }
}

/// Aggregated report of one distribution round
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub round_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<DistributionResult>,
}

impl DistributionReport {
    /// Number of nodes that accepted their shards
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of nodes that failed
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// True when every node succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Render the report as a plain-text table
    pub fn render_table(&self) -> String {
        const HEADERS: [&str; 3] = ["Node", "Status", "ZIP Password / Error"];

        let rows: Vec<[&str; 3]> = self
            .results
            .iter()
            .map(|r| match &r.outcome {
                NodeOutcome::Success { password } => [r.node.as_str(), "OK", password.as_str()],
                NodeOutcome::Failure { reason } => [r.node.as_str(), "FAIL", reason.as_str()],
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "Flag distribution results (round {})", self.round_id);
        push_row(&mut out, &HEADERS, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        let _ = write!(
            out,
            "{} succeeded, {} failed",
            self.succeeded(),
            self.failed()
        );
        out
    }
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}
