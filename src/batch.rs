//! Batch classification over JSON lines
//!
//! One `FinancialProfile` per input line, one result per output line in the
//! same order. A bad line produces an error record and never stops the batch.

use std::io::{BufRead, Write};
use std::thread;

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{DecisionEngine, DecisionReport};
use crate::error::{Error, Result};
use crate::types::FinancialProfile;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Report(Box<DecisionReport>),
    Error { code: String, message: String },
}

/// One output line.
#[derive(Debug, Serialize)]
pub struct BatchRecord {
    /// 1-based input line number
    pub line: usize,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Evaluate every non-blank line of `reader` on up to `threads` threads and
/// write the records to `writer` in input order.
pub fn run_batch<R: BufRead, W: Write>(
    engine: &DecisionEngine,
    reader: R,
    mut writer: W,
    threads: usize,
) -> Result<BatchSummary> {
    let mut lines = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((idx + 1, line));
        }
    }

    let threads = threads.clamp(1, lines.len().max(1));
    let chunk_size = (lines.len() + threads - 1) / threads.max(1);
    info!(lines = lines.len(), threads, "Starting batch");

    let records: Vec<BatchRecord> = if lines.is_empty() {
        Vec::new()
    } else {
        thread::scope(|scope| {
            let handles: Vec<_> = lines
                .chunks(chunk_size.max(1))
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|(line_no, text)| evaluate_line(engine, *line_no, text))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let mut records = Vec::with_capacity(lines.len());
            for handle in handles {
                let chunk = handle
                    .join()
                    .map_err(|_| Error::Internal("Batch worker panicked".to_string()))?;
                records.extend(chunk);
            }
            Ok::<_, Error>(records)
        })?
    };

    let mut summary = BatchSummary {
        total: records.len(),
        ..Default::default()
    };
    for record in &records {
        match record.outcome {
            BatchOutcome::Report(_) => summary.succeeded += 1,
            BatchOutcome::Error { .. } => summary.failed += 1,
        }
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch finished"
    );
    Ok(summary)
}

fn evaluate_line(engine: &DecisionEngine, line: usize, text: &str) -> BatchRecord {
    let result = serde_json::from_str::<FinancialProfile>(text)
        .map_err(Error::from)
        .and_then(|profile| engine.evaluate_profile(&profile));

    let outcome = match result {
        Ok(report) => BatchOutcome::Report(Box::new(report)),
        Err(e) => {
            warn!(line, error = %e.format_for_log(), "Batch line failed");
            BatchOutcome::Error {
                code: e.code().as_str(),
                message: e.client_message(),
            }
        }
    };

    BatchRecord { line, outcome }
}
