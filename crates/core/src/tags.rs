use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("FUJIFILM", "Fujifilm"),
    ("SAMSUNG", "Samsung"),
    ("LG Electronics", "LG"),
    ("OLYMPUS IMAGING CORP.", "Olympus"),
    ("SONY", "Sony"),
    ("NIKON CORPORATION", "NIKON"),
    ("motorola", "Motorola"),
    ("Canon EOS 400D DIGITAL", "EOS 400D"),
    ("SP570UZ", "SP-570 UZ"),
    ("Redmi Note3", "Redmi Note 3 Pro"),
    ("G8342", "Xperia XZ1"),
    ("G8341", "Xperia XZ1"),
    ("G8343", "Xperia XZ1"),
    ("chiron", "Mi Mix 2"),
    ("Moto G (5S)", "Moto G5S"),
    ("CPH1707", "R11"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    CameraMake,
    CameraModel,
    LensMake,
    LensModel,
}

impl TagKind {
    pub fn label(self) -> &'static str {
        match self {
            TagKind::CameraMake => "camera maker",
            TagKind::CameraModel => "camera model",
            TagKind::LensMake => "lens maker",
            TagKind::LensModel => "lens model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagDecision {
    KeepRaw,
    Replace(String),
}

pub trait TagResolver {
    fn resolve(&mut self, kind: TagKind, raw: &str) -> Result<TagDecision>;
}

pub struct AcceptRaw;

impl TagResolver for AcceptRaw {
    fn resolve(&mut self, _kind: TagKind, _raw: &str) -> Result<TagDecision> {
        Ok(TagDecision::KeepRaw)
    }
}

/// Persisted raw-to-normal vendor name mapping. Entries shadow
/// [`BUILTIN_NAMES`].
#[derive(Debug)]
pub struct TagStore {
    path: PathBuf,
    overrides: BTreeMap<String, String>,
    dirty: bool,
}

impl TagStore {
    pub fn load(path: &Path) -> Result<Self> {
        let overrides = match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text)
                .with_context(|| format!("invalid tag store at {}", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read tag store at {}", path.display()))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            overrides,
            dirty: false,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(&self.overrides)
            .context("failed to serialize tag store")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write tag store at {}", self.path.display()))?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lookup(&self, raw: &str) -> Option<&str> {
        if let Some(normal) = self.overrides.get(raw) {
            return Some(normal);
        }
        BUILTIN_NAMES
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
    }

    pub fn set(&mut self, raw: &str, normal: &str) {
        let previous = self.overrides.insert(raw.to_string(), normal.to_string());
        if previous.as_deref() != Some(normal) {
            self.dirty = true;
        }
    }

    pub fn unset(&mut self, raw: &str) -> bool {
        let removed = self.overrides.remove(raw).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides
            .iter()
            .map(|(raw, normal)| (raw.as_str(), normal.as_str()))
    }

    /// Asks `resolver` only on the first encounter of `raw`; the answer,
    /// raw included, is recorded so later runs never ask again.
    pub fn normalize(
        &mut self,
        kind: TagKind,
        raw: &str,
        resolver: &mut dyn TagResolver,
    ) -> Result<String> {
        if let Some(normal) = self.lookup(raw) {
            return Ok(normal.to_string());
        }
        let normal = match resolver.resolve(kind, raw)? {
            TagDecision::KeepRaw => raw.to_string(),
            TagDecision::Replace(value) => value,
        };
        self.set(raw, &normal);
        Ok(normal)
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptRaw, TagDecision, TagKind, TagResolver, TagStore};
    use anyhow::Result;
    use tempfile::tempdir;

    struct CountingResolver {
        calls: usize,
        reply: TagDecision,
    }

    impl TagResolver for CountingResolver {
        fn resolve(&mut self, _kind: TagKind, _raw: &str) -> Result<TagDecision> {
            self.calls += 1;
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn builtin_names_resolve_without_asking() -> Result<()> {
        let dir = tempdir()?;
        let mut store = TagStore::load(&dir.path().join("tags.toml"))?;
        let mut resolver = CountingResolver {
            calls: 0,
            reply: TagDecision::KeepRaw,
        };
        let normal = store.normalize(TagKind::CameraMake, "FUJIFILM", &mut resolver)?;
        assert_eq!(normal, "Fujifilm");
        assert_eq!(resolver.calls, 0);
        Ok(())
    }

    #[test]
    fn override_shadows_builtin() -> Result<()> {
        let dir = tempdir()?;
        let mut store = TagStore::load(&dir.path().join("tags.toml"))?;
        store.set("SONY", "Sony Alpha");
        assert_eq!(store.lookup("SONY"), Some("Sony Alpha"));
        Ok(())
    }

    #[test]
    fn unknown_tag_is_asked_once_then_remembered() -> Result<()> {
        let dir = tempdir()?;
        let mut store = TagStore::load(&dir.path().join("tags.toml"))?;
        let mut resolver = CountingResolver {
            calls: 0,
            reply: TagDecision::Replace("EOS 60D".to_string()),
        };
        let first = store.normalize(TagKind::CameraModel, "Canon EOS 60D", &mut resolver)?;
        let second = store.normalize(TagKind::CameraModel, "Canon EOS 60D", &mut resolver)?;
        assert_eq!(first, "EOS 60D");
        assert_eq!(second, "EOS 60D");
        assert_eq!(resolver.calls, 1);
        Ok(())
    }

    #[test]
    fn keep_raw_decision_is_persisted() -> Result<()> {
        let dir = tempdir()?;
        let mut store = TagStore::load(&dir.path().join("tags.toml"))?;
        store.normalize(TagKind::LensModel, "EF-S17-55mm", &mut AcceptRaw)?;
        assert_eq!(store.lookup("EF-S17-55mm"), Some("EF-S17-55mm"));
        Ok(())
    }

    #[test]
    fn save_and_reload_round_trips_overrides() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tags.toml");
        let mut store = TagStore::load(&path)?;
        store.set("NIKON D5100", "D5100");
        store.save()?;

        let reloaded = TagStore::load(&path)?;
        assert_eq!(reloaded.lookup("NIKON D5100"), Some("D5100"));
        Ok(())
    }

    #[test]
    fn save_without_changes_creates_no_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tags.toml");
        let mut store = TagStore::load(&path)?;
        store.save()?;
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn unset_removes_override() -> Result<()> {
        let dir = tempdir()?;
        let mut store = TagStore::load(&dir.path().join("tags.toml"))?;
        store.set("G8342", "Xperia");
        assert!(store.unset("G8342"));
        assert!(!store.unset("G8342"));
        assert_eq!(store.lookup("G8342"), Some("Xperia XZ1"));
        Ok(())
    }
}
