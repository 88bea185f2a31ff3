use crate::config::app_paths;
use crate::planner::{DuplicateFile, RenamePlan};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UndoLog {
    operations: Vec<RenameOperation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RenameOperation {
    from: PathBuf,
    to: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApplyResult {
    pub renamed: usize,
    pub skipped_existing: usize,
    pub permission_denied: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrashResult {
    pub trashed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResult {
    pub restored: usize,
}

pub fn apply_plan(plan: &RenamePlan) -> Result<ApplyResult> {
    let paths = app_paths()?;
    apply_with_undo_path(plan, &paths.undo_path)
}

fn apply_with_undo_path(plan: &RenamePlan, undo_path: &Path) -> Result<ApplyResult> {
    let mut result = ApplyResult::default();
    let mut operations = Vec::<RenameOperation>::new();

    for candidate in &plan.candidates {
        if candidate.target_path.exists() {
            warn!(
                "target already exists, skipping: {}",
                candidate.target_path.display()
            );
            result.skipped_existing += 1;
            continue;
        }

        match fs::rename(&candidate.original_path, &candidate.target_path) {
            Ok(()) => {
                info!(
                    "renamed: {} -> {}",
                    candidate.original_path.display(),
                    candidate.target_path.display()
                );
                result.renamed += 1;
                operations.push(RenameOperation {
                    from: candidate.original_path.clone(),
                    to: candidate.target_path.clone(),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                warn!("permission denied: {}", candidate.original_path.display());
                result.permission_denied.push(candidate.original_path.clone());
            }
            Err(err) => {
                let rename_err = anyhow::Error::from(err).context(format!(
                    "failed to rename {} -> {}",
                    candidate.original_path.display(),
                    candidate.target_path.display()
                ));
                if let Err(persist_err) = persist_undo(&operations, undo_path) {
                    return Err(rename_err.context(format!(
                        "also failed to record the undo log: {persist_err}"
                    )));
                }
                return Err(rename_err);
            }
        }
    }

    persist_undo(&operations, undo_path)?;
    Ok(result)
}

pub fn trash_duplicates(duplicates: &[DuplicateFile]) -> Result<TrashResult> {
    let mut trashed = 0usize;
    for duplicate in duplicates {
        trash::delete(&duplicate.path)
            .with_context(|| format!("failed to move {} to the trash", duplicate.path.display()))?;
        info!(
            "moved to trash: {} (kept {})",
            duplicate.path.display(),
            duplicate.kept.display()
        );
        trashed += 1;
    }
    Ok(TrashResult { trashed })
}

pub fn undo_last() -> Result<UndoResult> {
    let paths = app_paths()?;
    undo_with_path(&paths.undo_path)
}

fn undo_with_path(undo_path: &Path) -> Result<UndoResult> {
    if !undo_path.exists() {
        anyhow::bail!("there is no rename to undo");
    }

    let raw = fs::read_to_string(undo_path)
        .with_context(|| format!("failed to read the undo log at {}", undo_path.display()))?;
    let log = serde_json::from_str::<UndoLog>(&raw).context("the undo log is corrupted")?;

    let mut restored = 0usize;
    for op in log.operations.iter().rev() {
        if !op.to.exists() {
            continue;
        }
        fs::rename(&op.to, &op.from).with_context(|| {
            format!(
                "failed to restore {} -> {}",
                op.to.display(),
                op.from.display()
            )
        })?;
        info!("restored: {} -> {}", op.to.display(), op.from.display());
        restored += 1;
    }

    fs::remove_file(undo_path)
        .with_context(|| format!("failed to remove the undo log at {}", undo_path.display()))?;

    Ok(UndoResult { restored })
}

/// An empty batch leaves any previous undo log in place.
fn persist_undo(operations: &[RenameOperation], undo_path: &Path) -> Result<()> {
    if operations.is_empty() {
        return Ok(());
    }

    if let Some(parent) = undo_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let log = UndoLog {
        operations: operations.to_vec(),
    };
    let body = serde_json::to_string_pretty(&log).context("failed to serialize the undo log")?;
    fs::write(undo_path, body)
        .with_context(|| format!("failed to write the undo log at {}", undo_path.display()))?;
    Ok(())
}
