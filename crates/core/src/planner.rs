use crate::collision::{resolve_name, NameRegistry, Resolution};
use crate::exif_reader::read_photo_exif;
use crate::metadata::{PhotoMetadata, RawMetadata, SkipReason};
use crate::namer::{build_base_name, target_filename};
use crate::tags::{TagKind, TagResolver, TagStore};
use crate::DEFAULT_EXTENSIONS;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub input: PathBuf,
    pub extensions: Vec<String>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub new_base: String,
    pub metadata: PhotoMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateFile {
    pub path: PathBuf,
    pub kept: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanStats {
    pub scanned_files: usize,
    pub photo_files: usize,
    pub skipped_non_photo: usize,
    pub skipped_no_metadata: usize,
    pub planned: usize,
    pub already_named: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub candidates: Vec<RenameCandidate>,
    pub duplicates: Vec<DuplicateFile>,
    pub skipped: Vec<SkippedFile>,
    pub stats: ScanStats,
}

pub fn generate_plan(
    options: &PlanOptions,
    store: &mut TagStore,
    resolver: &mut dyn TagResolver,
) -> Result<RenamePlan> {
    if !options.input.is_dir() {
        anyhow::bail!(
            "the photo directory does not exist: {}",
            options.input.display()
        );
    }

    let mut stats = ScanStats::default();
    let files = collect_photo_files(&options.input, &options.extensions, &mut stats)?;
    assemble_plan(&options.input, files, store, resolver, stats)
}

fn collect_photo_files(
    root: &Path,
    extensions: &[String],
    stats: &mut ScanStats,
) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to walk the directory at {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        stats.scanned_files += 1;

        if has_photo_extension(path, extensions) {
            stats.photo_files += 1;
            out.push(path.to_path_buf());
        } else {
            stats.skipped_non_photo += 1;
        }
    }

    Ok(out)
}

fn assemble_plan(
    root: &Path,
    files: Vec<PathBuf>,
    store: &mut TagStore,
    resolver: &mut dyn TagResolver,
    mut stats: ScanStats,
) -> Result<RenamePlan> {
    let mut registry = NameRegistry::new();
    let mut candidates = Vec::new();
    let mut duplicates = Vec::new();
    let mut skipped = Vec::new();

    for path in files {
        let raw = match read_photo_exif(&path) {
            Ok(raw) => raw,
            Err(err) => {
                info!("skipping {}: {}", path.display(), err);
                stats.skipped_no_metadata += 1;
                skipped.push(SkippedFile {
                    path,
                    reason: err.skip_reason(),
                });
                continue;
            }
        };

        let metadata = normalize_metadata(raw, store, resolver)?;
        let base = build_base_name(&metadata);

        match resolve_name(&mut registry, &path, &base)? {
            Resolution::Assigned { base: new_base } => {
                let target_path = path
                    .parent()
                    .unwrap_or_else(|| Path::new(""))
                    .join(target_filename(&new_base));
                info!(
                    "planned rename: {} -> {}",
                    path.display(),
                    target_path.display()
                );
                stats.planned += 1;
                candidates.push(RenameCandidate {
                    original_path: path,
                    target_path,
                    new_base,
                    metadata,
                });
            }
            Resolution::AlreadyNamed => {
                info!("already named: {}", path.display());
                stats.already_named += 1;
                skipped.push(SkippedFile {
                    path,
                    reason: SkipReason::AlreadyNamed,
                });
            }
            Resolution::Duplicate { existing } => {
                info!("duplicate: {} matches {}", path.display(), existing.display());
                stats.duplicates += 1;
                duplicates.push(DuplicateFile {
                    path,
                    kept: existing,
                });
            }
        }
    }

    Ok(RenamePlan {
        root: root.to_path_buf(),
        candidates,
        duplicates,
        skipped,
        stats,
    })
}

fn normalize_metadata(
    raw: RawMetadata,
    store: &mut TagStore,
    resolver: &mut dyn TagResolver,
) -> Result<PhotoMetadata> {
    Ok(PhotoMetadata {
        taken_at: raw.taken_at,
        camera_make: normalize_field(store, resolver, TagKind::CameraMake, raw.camera_make)?,
        camera_model: normalize_field(store, resolver, TagKind::CameraModel, raw.camera_model)?,
        lens_make: normalize_field(store, resolver, TagKind::LensMake, raw.lens_make)?,
        lens_model: normalize_field(store, resolver, TagKind::LensModel, raw.lens_model)?,
    })
}

fn normalize_field(
    store: &mut TagStore,
    resolver: &mut dyn TagResolver,
    kind: TagKind,
    value: Option<String>,
) -> Result<Option<String>> {
    let raw = match value {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let normal = store.normalize(kind, &raw, resolver)?.trim().to_string();
    Ok((!normal.is_empty()).then_some(normal))
}

fn has_photo_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
