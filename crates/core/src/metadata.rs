use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    Unreadable,
    NoExif,
    NoCaptureDate,
    BadCaptureDate,
    AlreadyNamed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::Unreadable => "file could not be read",
            SkipReason::NoExif => "no EXIF data",
            SkipReason::NoCaptureDate => "no DateTimeOriginal tag",
            SkipReason::BadCaptureDate => "capture date could not be parsed",
            SkipReason::AlreadyNamed => "already has its final name",
        };
        f.write_str(text)
    }
}

/// Vendor fields as read from the file, before the tag store maps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMetadata {
    pub taken_at: NaiveDateTime,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens_make: Option<String>,
    pub lens_model: Option<String>,
}

/// The same fields after the tag store mapped the vendor names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub taken_at: NaiveDateTime,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens_make: Option<String>,
    pub lens_model: Option<String>,
}

impl PhotoMetadata {
    pub fn name_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.camera_make.as_deref(),
            self.camera_model.as_deref(),
            self.lens_make.as_deref(),
            self.lens_model.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}
