// Fragment cache and per-run state
//
// One file per entity under the cache directory. A file's existence is the
// only signal that the entity has been rendered; files are never rewritten.

use crate::error::Result;
use crate::model::RenderedFragment;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FRAGMENT_EXT: &str = "xml";

/// Persistent, append-only fragment store
#[derive(Debug, Clone)]
pub struct FragmentCache {
    dir: PathBuf,
}

impl FragmentCache {
    /// Open (creating if needed) the cache directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, FRAGMENT_EXT))
    }

    pub fn has(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    /// Store a fragment unless one already exists for `id`.
    ///
    /// Returns whether anything was written.
    pub fn put(&self, id: &str, fragment: &RenderedFragment) -> Result<bool> {
        let path = self.path_for(id);
        if path.exists() {
            debug!(id, "already cached");
            return Ok(false);
        }

        // Fragments appear under their final name only once complete.
        let tmp = self.dir.join(format!(".{}.{}.tmp", id, FRAGMENT_EXT));
        fs::write(&tmp, fragment.as_str())?;
        fs::rename(&tmp, &path)?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Result<RenderedFragment> {
        let markup = fs::read_to_string(self.path_for(id))?;
        Ok(RenderedFragment::new(id, markup))
    }

    /// Every cached fragment, ordered case-insensitively by identifier.
    /// Unreadable entries are skipped with a warning.
    pub fn get_all_sorted(&self) -> Result<Vec<RenderedFragment>> {
        let mut ids: Vec<String> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FRAGMENT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort_by_key(|id| id.to_lowercase());

        let mut fragments = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id) {
                Ok(fragment) => fragments.push(fragment),
                Err(e) => warn!("Skipping: couldn't read {}: {}", id, e),
            }
        }
        Ok(fragments)
    }

    /// Delete every cached fragment
    pub fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.dir)?;
        info!("cleared fragment cache at {}", self.dir.display());
        Ok(())
    }
}

/// State for one invocation; created at the start of a run and dropped at
/// the end
#[derive(Debug, Default)]
pub struct RunContext {
    dirty: bool,
    seen_methods: HashSet<String>,
    rendered: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any previously unseen entity was rendered in this run
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that `name` was not in the cache
    pub fn mark_new_entity(&mut self, name: &str) {
        if !self.dirty {
            info!("New entries for dictionary. Rebuilding dictionary.");
        }
        self.dirty = true;
        self.rendered.push(name.to_string());
    }

    /// True the first time a method full name is seen in this run.
    ///
    /// Matching is case-insensitive, so methods that differ only by case
    /// are rendered once.
    pub fn first_method_sighting(&mut self, full_name: &str) -> bool {
        self.seen_methods.insert(full_name.to_lowercase())
    }

    /// Entities rendered in this run, in order
    pub fn rendered(&self) -> &[String] {
        &self.rendered
    }
}
