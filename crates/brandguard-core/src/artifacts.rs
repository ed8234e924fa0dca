//! Persisted run artifacts.
//!
//! Layout per run:
//! - `<dir>/<run_id>/bundle.json` + `bundle.digest` (only when a bundle exists)
//! - `<dir>/<run_id>/audit.json` + `audit.digest`
//!
//! Digests are SHA-256 over the exact JSON bytes and are checked on read. A
//! digest file that is not 64 hex characters is a storage error.

use std::path::{Path, PathBuf};

use brandguard_store::ContentDigest;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{AuditLog, ContentBundle, GuardError, Result};

const BUNDLE_FILE: &str = "bundle";
const AUDIT_FILE: &str = "audit";

fn write_with_digest<T: Serialize>(run_dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = run_dir.join(format!("{}.json", name));
    let digest_path = run_dir.join(format!("{}.digest", name));
    let json = serde_json::to_vec_pretty(value)?;
    let digest = ContentDigest::from_bytes(&json);

    std::fs::write(&path, &json)?;
    std::fs::write(&digest_path, digest.as_str().as_bytes())?;
    Ok(path)
}

fn read_verified<T: DeserializeOwned>(run_dir: &Path, name: &str) -> Result<T> {
    let path = run_dir.join(format!("{}.json", name));
    let digest_path = run_dir.join(format!("{}.digest", name));
    if !path.exists() {
        return Err(GuardError::ArtifactNotFound(path.display().to_string()));
    }

    let json = std::fs::read(&path)?;
    let stored = std::fs::read_to_string(&digest_path)?;
    let expected = ContentDigest::try_from(stored.trim().to_string())?;
    let actual = ContentDigest::from_bytes(&json);
    if expected != actual {
        return Err(GuardError::DigestMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(serde_json::from_slice(&json)?)
}

/// Persist a run's bundle (if any) and audit log. Returns the run directory.
pub fn write_run_artifacts(
    dir: &Path,
    run_id: &str,
    bundle: Option<&ContentBundle>,
    audit: &AuditLog,
) -> Result<PathBuf> {
    let run_dir = dir.join(run_id);
    std::fs::create_dir_all(&run_dir)?;

    if let Some(bundle) = bundle {
        write_with_digest(&run_dir, BUNDLE_FILE, bundle)?;
    }
    write_with_digest(&run_dir, AUDIT_FILE, audit)?;
    Ok(run_dir)
}

/// Read and verify `<dir>/<run_id>/bundle.json`.
pub fn read_bundle_artifact(run_id: &str, dir: &Path) -> Result<ContentBundle> {
    read_verified(&dir.join(run_id), BUNDLE_FILE)
}

/// Read and verify `<dir>/<run_id>/audit.json`.
pub fn read_audit_artifact(run_id: &str, dir: &Path) -> Result<AuditLog> {
    read_verified(&dir.join(run_id), AUDIT_FILE)
}
