//! Backend exchange transcripts.
//!
//! Every recorded generate attempt appends one summary line to
//! `transcript.jsonl` as newline-delimited JSON, and stores the full
//! request/response bodies next to it:
//!
//! - `exchange_NNN_request.json`
//! - `exchange_NNN_response.json`
//!
//! Transcripts exist for transparency and bug reports; nothing in the
//! generate path reads them back.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::backend::TransportError;
use crate::util::truncate_string;

/// Current schema version for transcript.jsonl entries.
pub const TRANSCRIPT_SCHEMA_VERSION: u32 = 1;

const RESPONSE_PREVIEW_BYTES: usize = 500;

/// Outcome of one recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// The call settled with a response body (which may still fail shape
    /// validation downstream).
    Completed,
    /// The call could not complete.
    TransportFailed,
}

/// One summary line of the transcript log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub schema_version: u32,

    /// Unix timestamp in milliseconds when the exchange settled.
    pub ts: u64,

    /// Sequence number within this transcript directory (1-indexed).
    pub seq: u32,

    /// Remote function that was invoked.
    pub function: String,

    pub duration_ms: u64,

    pub outcome: ExchangeOutcome,

    /// First bytes of the response, for quick inspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,

    /// Transport error message when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Append-only transcript log rooted at one directory.
pub struct TranscriptLog {
    dir: PathBuf,
}

impl TranscriptLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join("transcript.jsonl")
    }

    /// Record one settled exchange: summary line plus full bodies.
    pub fn record(
        &self,
        function: &str,
        request: &Value,
        result: &Result<Value, TransportError>,
        duration: Duration,
    ) -> Result<()> {
        let seq = self.next_seq()?;
        let entry = match result {
            Ok(response) => TranscriptEntry {
                schema_version: TRANSCRIPT_SCHEMA_VERSION,
                ts: now_epoch_ms(),
                seq,
                function: function.to_string(),
                duration_ms: duration.as_millis() as u64,
                outcome: ExchangeOutcome::Completed,
                response_preview: Some(truncate_string(
                    &response.to_string(),
                    RESPONSE_PREVIEW_BYTES,
                )),
                error: None,
            },
            Err(err) => TranscriptEntry {
                schema_version: TRANSCRIPT_SCHEMA_VERSION,
                ts: now_epoch_ms(),
                seq,
                function: function.to_string(),
                duration_ms: duration.as_millis() as u64,
                outcome: ExchangeOutcome::TransportFailed,
                response_preview: None,
                error: Some(err.to_string()),
            },
        };
        self.append(&entry)?;
        self.store_bodies(seq, request, result.as_ref().ok())?;
        Ok(())
    }

    /// Append a summary entry to the log file.
    pub fn append(&self, entry: &TranscriptEntry) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create transcript dir {}", self.dir.display()))?;
        let path = self.log_path();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open transcript for append: {}", path.display()))?;
        let line = serde_json::to_string(entry).context("serialize transcript entry")?;
        writeln!(file, "{line}").context("write transcript entry")?;
        Ok(())
    }

    /// Load all entries, skipping corrupt lines.
    pub fn load(&self) -> Result<Vec<TranscriptEntry>> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file =
            File::open(&path).with_context(|| format!("open transcript: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line =
                line.with_context(|| format!("read line {} of transcript", line_num + 1))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TranscriptEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(
                        line = line_num + 1,
                        error = %err,
                        "skip corrupt transcript entry"
                    );
                }
            }
        }
        Ok(entries)
    }

    fn next_seq(&self) -> Result<u32> {
        let entries = self.load()?;
        Ok(entries.iter().map(|entry| entry.seq).max().unwrap_or(0) + 1)
    }

    fn store_bodies(&self, seq: u32, request: &Value, response: Option<&Value>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create transcript dir {}", self.dir.display()))?;
        let request_path = self.dir.join(format!("exchange_{seq:03}_request.json"));
        let text = serde_json::to_string_pretty(request).context("serialize request body")?;
        fs::write(&request_path, text)
            .with_context(|| format!("write request: {}", request_path.display()))?;
        if let Some(response) = response {
            let response_path = self.dir.join(format!("exchange_{seq:03}_response.json"));
            let text =
                serde_json::to_string_pretty(response).context("serialize response body")?;
            fs::write(&response_path, text)
                .with_context(|| format!("write response: {}", response_path.display()))?;
        }
        Ok(())
    }
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
