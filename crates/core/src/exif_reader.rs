use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use exif::Reader;
use thiserror::Error;

use crate::metadata::{RawMetadata, SkipReason};

#[derive(Debug, Error)]
pub enum ExifError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no EXIF data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: exif::Error,
    },
    #[error("no capture date in {}", path.display())]
    NoCaptureDate { path: PathBuf },
    #[error("capture date {value:?} in {} cannot be parsed", path.display())]
    BadCaptureDate { path: PathBuf, value: String },
}

impl ExifError {
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            ExifError::Open { .. } => SkipReason::Unreadable,
            ExifError::Parse { .. } => SkipReason::NoExif,
            ExifError::NoCaptureDate { .. } => SkipReason::NoCaptureDate,
            ExifError::BadCaptureDate { .. } => SkipReason::BadCaptureDate,
        }
    }
}

pub fn read_photo_exif(path: &Path) -> Result<RawMetadata, ExifError> {
    let file = File::open(path).map_err(|source| ExifError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|source| ExifError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let raw_date = find_field_value(&exif, &["DateTimeOriginal"]).ok_or_else(|| {
        ExifError::NoCaptureDate {
            path: path.to_path_buf(),
        }
    })?;
    let taken_at =
        parse_timestamp(&raw_date).ok_or_else(|| ExifError::BadCaptureDate {
            path: path.to_path_buf(),
            value: raw_date,
        })?;

    Ok(RawMetadata {
        taken_at,
        camera_make: normalize(find_field_value(&exif, &["Make"])),
        camera_model: normalize(find_field_value(&exif, &["Model"])),
        lens_make: normalize(find_field_value(&exif, &["LensMake"])),
        lens_model: normalize(find_field_value(&exif, &["LensModel"])),
    })
}

pub fn read_all_tags(path: &Path) -> Result<Vec<(String, String)>, ExifError> {
    let file = File::open(path).map_err(|source| ExifError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|source| ExifError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(exif
        .fields()
        .map(|field| {
            (
                format!("{:?}", field.tag),
                field.display_value().with_unit(&exif).to_string(),
            )
        })
        .collect())
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn find_field_value(exif: &exif::Exif, names: &[&str]) -> Option<String> {
    exif.fields().find_map(|field| {
        let tag_name = format!("{:?}", field.tag);
        if names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&tag_name))
        {
            Some(field.display_value().with_unit(exif).to_string())
        } else {
            None
        }
    })
}

fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let normalized = input.trim();

    let candidates = [
        "%Y:%m:%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%.f%:z",
    ];

    for fmt in candidates {
        if let Ok(naive) = NaiveDateTime::parse_from_str(normalized, fmt) {
            return Some(naive);
        }
    }

    None
}
