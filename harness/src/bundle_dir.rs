//! Report directory persistence: write/read/verify a [`RunReport`] on disk.
//!
//! # Directory layout
//!
//! ```text
//! <dir>/
//!   report.json          canonical JSON, the full report
//!   report_digest.txt    ASCII digest string ("sha256:...")
//!   plan.txt             plan text plus newline, empty without a plan
//!   trace.json           canonical JSON, only when a trace was recorded
//! ```
//!
//! The directory path is never part of any hash surface.
//!
//! # Fail-closed semantics
//!
//! - Missing metadata file → error
//! - Extra undeclared file → error
//! - Non-canonical `report.json` or `trace.json` → error
//! - Stored digest differs from the recomputed one → error
//! - Trace or plan file not bound to the report → error (verify only)

use std::collections::BTreeSet;
use std::path::Path;

use meridian_kernel::proof::canon::{canonical_json_bytes, CanonError};
use meridian_kernel::proof::hash::{canonical_hash, ContentHash};
use meridian_kernel::proof::hash_domain::HashDomain;
use serde_json::Value;

use crate::report::RunReport;

const REPORT_FILENAME: &str = "report.json";
const DIGEST_FILENAME: &str = "report_digest.txt";
const PLAN_FILENAME: &str = "plan.txt";
const TRACE_FILENAME: &str = "trace.json";

/// Files every report directory carries.
const REQUIRED_FILENAMES: &[&str] = &[REPORT_FILENAME, DIGEST_FILENAME, PLAN_FILENAME];

const REPORT_SCHEMA_VERSION: &str = "run_report.v1";

/// Error writing a report directory.
#[derive(Debug, thiserror::Error)]
pub enum BundleDirWriteError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("canonical JSON error: {0}")]
    Canon(#[from] CanonError),
}

/// Error reading a report directory.
#[derive(Debug, thiserror::Error)]
pub enum BundleDirReadError {
    #[error("I/O error: {detail}")]
    Io { detail: String },
    #[error("missing metadata file: {filename}")]
    MissingMetadata { filename: String },
    #[error("undeclared extra file: {name}")]
    ExtraFile { name: String },
    #[error("{filename} parse error: {detail}")]
    ParseError { filename: String, detail: String },
    #[error("{filename} is not canonical JSON")]
    NotCanonical { filename: String },
    #[error("report schema version mismatch: {found}")]
    SchemaMismatch { found: String },
    #[error("digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
    #[error("canonical JSON error: {0}")]
    Canon(#[from] CanonError),
}

/// Error verifying a report directory.
#[derive(Debug, thiserror::Error)]
pub enum BundleDirVerifyError {
    #[error("read error: {0}")]
    Read(#[from] BundleDirReadError),
    #[error("trace digest mismatch: report={declared}, file={actual}")]
    TraceMismatch { declared: String, actual: String },
    #[error("report declares a trace but trace.json is missing")]
    MissingTrace,
    #[error("trace.json present but the report declares no trace")]
    UndeclaredTrace,
    #[error("plan.txt does not match the report plan")]
    PlanMismatch,
}

/// A report directory loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedReport {
    /// Parsed `report.json`.
    pub report: Value,
    /// Raw canonical bytes of `report.json`.
    pub report_bytes: Vec<u8>,
    pub trace_bytes: Option<Vec<u8>>,
    pub plan_text: String,
    /// Digest recomputed from `report_bytes`.
    pub digest: ContentHash,
}

impl LoadedReport {
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.report["status"].as_str()
    }

    #[must_use]
    pub fn engine(&self) -> Option<&str> {
        self.report["engine"].as_str()
    }
}

/// Write `report` to `dir`, creating the directory if needed.
///
/// Returns the digest stored in `report_digest.txt`.
///
/// # Errors
///
/// Returns [`BundleDirWriteError`] on I/O failure or canonical JSON error.
pub fn write_report_dir(
    report: &RunReport,
    dir: &Path,
) -> Result<ContentHash, BundleDirWriteError> {
    std::fs::create_dir_all(dir).map_err(|e| BundleDirWriteError::Io {
        detail: format!("create_dir_all: {e}"),
    })?;

    let report_bytes = report.to_canonical_json_bytes()?;
    let digest = canonical_hash(HashDomain::RunReport, &report_bytes);

    if let Some(trace) = &report.trace {
        write_atomic(dir.join(TRACE_FILENAME), &trace.to_canonical_json_bytes()?)?;
    }
    let plan_text = report
        .plan
        .as_ref()
        .map(|p| format!("{}\n", p.text))
        .unwrap_or_default();
    write_atomic(dir.join(PLAN_FILENAME), plan_text.as_bytes())?;
    write_atomic(dir.join(REPORT_FILENAME), &report_bytes)?;
    write_atomic(dir.join(DIGEST_FILENAME), digest.as_str().as_bytes())?;

    Ok(digest)
}

/// Read a report directory.
///
/// Checks the file set, canonical form of every JSON file, the schema
/// version and the stored digest.
///
/// # Errors
///
/// Returns [`BundleDirReadError`] on any validation failure.
pub fn read_report_dir(dir: &Path) -> Result<LoadedReport, BundleDirReadError> {
    let report_bytes = read_required(dir, REPORT_FILENAME)?;
    let digest_bytes = read_required(dir, DIGEST_FILENAME)?;
    let plan_bytes = read_required(dir, PLAN_FILENAME)?;

    for name in list_files(dir)? {
        if !REQUIRED_FILENAMES.contains(&name.as_str()) && name != TRACE_FILENAME {
            return Err(BundleDirReadError::ExtraFile { name });
        }
    }

    let report = parse_canonical(REPORT_FILENAME, &report_bytes)?;
    let schema = report["schema_version"].as_str().unwrap_or("");
    if schema != REPORT_SCHEMA_VERSION {
        return Err(BundleDirReadError::SchemaMismatch {
            found: schema.to_string(),
        });
    }

    let trace_bytes = match std::fs::read(dir.join(TRACE_FILENAME)) {
        Ok(bytes) => {
            parse_canonical(TRACE_FILENAME, &bytes)?;
            Some(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(BundleDirReadError::Io {
                detail: format!("read {TRACE_FILENAME}: {e}"),
            })
        }
    };

    let digest = canonical_hash(HashDomain::RunReport, &report_bytes);
    let stored = String::from_utf8_lossy(&digest_bytes).trim().to_string();
    if digest.as_str() != stored {
        return Err(BundleDirReadError::DigestMismatch {
            stored,
            recomputed: digest.as_str().to_string(),
        });
    }

    let plan_text = String::from_utf8(plan_bytes).map_err(|e| BundleDirReadError::ParseError {
        filename: PLAN_FILENAME.into(),
        detail: format!("{e}"),
    })?;

    Ok(LoadedReport {
        report,
        report_bytes,
        trace_bytes,
        plan_text,
        digest,
    })
}

/// Read a report directory and check that the trace and plan files are the
/// ones the report binds.
///
/// # Errors
///
/// Returns [`BundleDirVerifyError`] on read failure or a binding mismatch.
pub fn verify_report_dir(dir: &Path) -> Result<LoadedReport, BundleDirVerifyError> {
    let loaded = read_report_dir(dir)?;

    match (loaded.report["trace_digest"].as_str(), &loaded.trace_bytes) {
        (Some(declared), Some(bytes)) => {
            let actual = canonical_hash(HashDomain::SearchTrace, bytes);
            if actual.as_str() != declared {
                return Err(BundleDirVerifyError::TraceMismatch {
                    declared: declared.to_string(),
                    actual: actual.as_str().to_string(),
                });
            }
        }
        (Some(_), None) => return Err(BundleDirVerifyError::MissingTrace),
        (None, Some(_)) => return Err(BundleDirVerifyError::UndeclaredTrace),
        (None, None) => {}
    }

    let expected_plan = loaded.report["plan"]["text"]
        .as_str()
        .map(|t| format!("{t}\n"))
        .unwrap_or_default();
    if loaded.plan_text != expected_plan {
        return Err(BundleDirVerifyError::PlanMismatch);
    }

    Ok(loaded)
}

fn parse_canonical(filename: &str, bytes: &[u8]) -> Result<Value, BundleDirReadError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| BundleDirReadError::ParseError {
            filename: filename.to_string(),
            detail: format!("{e}"),
        })?;
    if canonical_json_bytes(&value)? != bytes {
        return Err(BundleDirReadError::NotCanonical {
            filename: filename.to_string(),
        });
    }
    Ok(value)
}

/// Write bytes via temp file + rename.
fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<(), BundleDirWriteError> {
    let path = path.as_ref();
    let dir = path.parent().ok_or_else(|| BundleDirWriteError::Io {
        detail: "no parent directory".into(),
    })?;

    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| BundleDirWriteError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| BundleDirWriteError::Io {
        detail: format!("rename {} → {}: {e}", temp_path.display(), path.display()),
    })?;
    Ok(())
}

fn read_required(dir: &Path, filename: &str) -> Result<Vec<u8>, BundleDirReadError> {
    std::fs::read(dir.join(filename)).map_err(|_| BundleDirReadError::MissingMetadata {
        filename: filename.to_string(),
    })
}

/// Regular file names in `dir`, skipping in-flight temp files.
fn list_files(dir: &Path) -> Result<BTreeSet<String>, BundleDirReadError> {
    let io = |what: &str, e: std::io::Error| BundleDirReadError::Io {
        detail: format!("{what}: {e}"),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io("read_dir", e))? {
        let entry = entry.map_err(|e| io("dir entry", e))?;
        if !entry.file_type().map_err(|e| io("file_type", e))?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(".tmp_") {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
