use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::namer::target_filename;

const COMPARE_CHUNK: usize = 64 * 1024;

#[derive(Debug, Default)]
pub struct NameRegistry {
    assigned: BTreeMap<String, PathBuf>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn holder(&self, base: &str) -> Option<&Path> {
        self.assigned.get(base).map(PathBuf::as_path)
    }

    fn claim(&mut self, base: &str, path: &Path) {
        self.assigned.insert(base.to_string(), path.to_path_buf());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Assigned { base: String },
    AlreadyNamed,
    Duplicate { existing: PathBuf },
}

/// Tries `base`, then `base[2]`, `base[3]` and so on until a name is free.
/// A name is taken when an earlier photo of this run claimed it, anywhere
/// in the tree, or when a file with that name sits next to the photo; a
/// byte-identical taker makes the photo a duplicate instead.
pub fn resolve_name(registry: &mut NameRegistry, path: &Path, base: &str) -> Result<Resolution> {
    let current_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let directory = path.parent().unwrap_or_else(|| Path::new(""));

    let mut ordinal = 0u32;
    loop {
        let candidate = if ordinal == 0 {
            base.to_string()
        } else {
            format!("{base}[{}]", ordinal + 1)
        };
        ordinal += 1;
        let filename = target_filename(&candidate);

        if filename.eq_ignore_ascii_case(current_name) {
            return Ok(Resolution::AlreadyNamed);
        }

        if let Some(holder) = registry.holder(&candidate) {
            if files_identical(path, holder)? {
                return Ok(Resolution::Duplicate {
                    existing: holder.to_path_buf(),
                });
            }
            continue;
        }

        let on_disk = directory.join(&filename);
        if on_disk.exists() {
            if files_identical(path, &on_disk)? {
                return Ok(Resolution::Duplicate { existing: on_disk });
            }
            continue;
        }

        registry.claim(&candidate, path);
        return Ok(Resolution::Assigned { base: candidate });
    }
}

pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a)
        .with_context(|| format!("failed to stat {}", a.display()))?
        .len();
    let len_b = fs::metadata(b)
        .with_context(|| format!("failed to stat {}", b.display()))?
        .len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut reader_a = File::open(a).with_context(|| format!("failed to open {}", a.display()))?;
    let mut reader_b = File::open(b).with_context(|| format!("failed to open {}", b.display()))?;
    let mut chunk_a = vec![0u8; COMPARE_CHUNK];
    let mut chunk_b = vec![0u8; COMPARE_CHUNK];
    loop {
        let read = reader_a
            .read(&mut chunk_a)
            .with_context(|| format!("failed to read {}", a.display()))?;
        if read == 0 {
            return Ok(true);
        }
        reader_b
            .read_exact(&mut chunk_b[..read])
            .with_context(|| format!("failed to read {}", b.display()))?;
        if chunk_a[..read] != chunk_b[..read] {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{files_identical, resolve_name, NameRegistry, Resolution};
    use anyhow::Result;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn burst_shots_get_ordinal_suffixes() -> Result<()> {
        let dir = tempdir()?;
        let first = write_file(dir.path(), "IMG_0001.jpg", "one");
        let second = write_file(dir.path(), "IMG_0002.jpg", "two two");
        let third = write_file(dir.path(), "IMG_0003.jpg", "three three three");
        let mut registry = NameRegistry::new();
        let base = "2020-01-01 10-00-00 Canon";

        assert_eq!(
            resolve_name(&mut registry, &first, base)?,
            Resolution::Assigned {
                base: base.to_string()
            }
        );
        assert_eq!(
            resolve_name(&mut registry, &second, base)?,
            Resolution::Assigned {
                base: format!("{base}[2]")
            }
        );
        assert_eq!(
            resolve_name(&mut registry, &third, base)?,
            Resolution::Assigned {
                base: format!("{base}[3]")
            }
        );
        Ok(())
    }

    #[test]
    fn identical_file_seen_earlier_is_a_duplicate() -> Result<()> {
        let dir = tempdir()?;
        let first = write_file(dir.path(), "IMG_0001.jpg", "same bytes");
        let copy = write_file(dir.path(), "IMG_0002.jpg", "same bytes");
        let mut registry = NameRegistry::new();

        resolve_name(&mut registry, &first, "2020-01-01 10-00-00")?;
        assert_eq!(
            resolve_name(&mut registry, &copy, "2020-01-01 10-00-00")?,
            Resolution::Duplicate { existing: first }
        );
        Ok(())
    }

    #[test]
    fn photo_already_carrying_its_name_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let photo = write_file(dir.path(), "2020-01-01 10-00-00.JPG", "bytes");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::AlreadyNamed
        );
        Ok(())
    }

    #[test]
    fn identical_neighbor_on_disk_is_a_duplicate() -> Result<()> {
        let dir = tempdir()?;
        let named = write_file(dir.path(), "2020-01-01 10-00-00.jpg", "dup");
        let photo = write_file(dir.path(), "IMG_0001.jpg", "dup");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::Duplicate { existing: named }
        );
        Ok(())
    }

    #[test]
    fn different_neighbor_on_disk_bumps_the_ordinal() -> Result<()> {
        let dir = tempdir()?;
        write_file(dir.path(), "2020-01-01 10-00-00.jpg", "other");
        let photo = write_file(dir.path(), "IMG_0001.jpg", "mine mine");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::Assigned {
                base: "2020-01-01 10-00-00[2]".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn disk_probe_stays_local_to_each_directory() -> Result<()> {
        let dir = tempdir()?;
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a)?;
        fs::create_dir_all(&sub_b)?;
        write_file(&sub_a, "2020-01-01 10-00-00.jpg", "taken");
        let photo_a = write_file(&sub_a, "IMG_0001.jpg", "one");
        let photo_b = write_file(&sub_b, "IMG_0002.jpg", "two two");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo_a, "2020-01-01 10-00-00")?,
            Resolution::Assigned {
                base: "2020-01-01 10-00-00[2]".to_string()
            }
        );
        // b/ has no such neighbor, so the plain name is still free there.
        assert_eq!(
            resolve_name(&mut registry, &photo_b, "2020-01-01 10-00-00")?,
            Resolution::Assigned {
                base: "2020-01-01 10-00-00".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn identical_copy_in_a_different_directory_is_a_duplicate() -> Result<()> {
        let dir = tempdir()?;
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a)?;
        fs::create_dir_all(&sub_b)?;
        let photo_a = write_file(&sub_a, "IMG_0001.jpg", "same bytes");
        let photo_b = write_file(&sub_b, "IMG_0002.jpg", "same bytes");
        let mut registry = NameRegistry::new();

        resolve_name(&mut registry, &photo_a, "2020-01-01 10-00-00")?;
        assert_eq!(
            resolve_name(&mut registry, &photo_b, "2020-01-01 10-00-00")?,
            Resolution::Duplicate { existing: photo_a }
        );
        Ok(())
    }

    #[test]
    fn bumps_past_every_taken_ordinal_on_disk() -> Result<()> {
        let dir = tempdir()?;
        write_file(dir.path(), "2020-01-01 10-00-00.jpg", "first");
        write_file(dir.path(), "2020-01-01 10-00-00[2].jpg", "second one");
        let photo = write_file(dir.path(), "IMG_0001.jpg", "the new photo");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::Assigned {
                base: "2020-01-01 10-00-00[3]".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn suffixed_file_moves_to_the_free_plain_name() -> Result<()> {
        let dir = tempdir()?;
        let photo = write_file(dir.path(), "2020-01-01 10-00-00[2].jpg", "bytes");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::Assigned {
                base: "2020-01-01 10-00-00".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn suffixed_file_keeps_its_name_when_the_plain_one_is_taken() -> Result<()> {
        let dir = tempdir()?;
        write_file(dir.path(), "2020-01-01 10-00-00.jpg", "other");
        let photo = write_file(dir.path(), "2020-01-01 10-00-00[2].jpg", "mine mine");
        let mut registry = NameRegistry::new();

        assert_eq!(
            resolve_name(&mut registry, &photo, "2020-01-01 10-00-00")?,
            Resolution::AlreadyNamed
        );
        Ok(())
    }

    #[test]
    fn files_identical_compares_bytes() -> Result<()> {
        let dir = tempdir()?;
        let a = write_file(dir.path(), "a.jpg", "payload");
        let b = write_file(dir.path(), "b.jpg", "payload");
        let c = write_file(dir.path(), "c.jpg", "payloae");
        let d = write_file(dir.path(), "d.jpg", "payload and more");

        assert!(files_identical(&a, &b)?);
        assert!(!files_identical(&a, &c)?);
        assert!(!files_identical(&a, &d)?);
        Ok(())
    }
}
