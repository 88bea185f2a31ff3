mod apply;
mod collision;
mod config;
mod exif_reader;
mod logging;
mod metadata;
mod namer;
mod planner;
mod sanitize;
mod tags;

pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

pub use apply::{apply_plan, trash_duplicates, undo_last, ApplyResult, TrashResult, UndoResult};
pub use collision::files_identical;
pub use config::{app_paths, load_config, AppConfig, AppPaths};
pub use exif_reader::{read_all_tags, read_photo_exif, ExifError};
pub use logging::init_file_logging;
pub use metadata::{PhotoMetadata, RawMetadata, SkipReason};
pub use namer::{build_base_name, target_filename, TARGET_EXTENSION};
pub use planner::{
    generate_plan, DuplicateFile, PlanOptions, RenameCandidate, RenamePlan, ScanStats, SkippedFile,
};
pub use tags::{AcceptRaw, TagDecision, TagKind, TagResolver, TagStore, BUILTIN_NAMES};
