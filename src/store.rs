// Documentation stores
//
// A store is one source of documented entities (ruby core, the stdlib, one
// installed gem). The catalog merges overlapping stores into one view.

use crate::error::{Error, Result};
use crate::markup::{convert, CommentNode};
use crate::model::{method_full_name, EntityKind, EntityRecord, MethodRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Read access to one documentation store
pub trait DocStore {
    /// Human-readable origin label
    fn label(&self) -> &str;

    /// Names of every entity documented here
    fn entity_names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool;

    fn load_entity(&self, name: &str) -> Result<EntityRecord>;

    fn load_method(&self, entity: &str, method_full_name: &str) -> Result<MethodRecord>;
}

/// On-disk entity layout used by `JsonStore`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredEntity {
    pub full_name: String,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub comment: Vec<CommentNode>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub constants: Vec<String>,
    #[serde(default)]
    pub class_methods: Vec<StoredMethod>,
    #[serde(default)]
    pub instance_methods: Vec<StoredMethod>,
}

/// On-disk method layout used by `JsonStore`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredMethod {
    pub name: String,
    #[serde(default)]
    pub params: String,
    #[serde(default)]
    pub comment: Vec<CommentNode>,
}

/// A directory of `*.json` files, one entity per file
pub struct JsonStore {
    label: String,
    entities: BTreeMap<String, (PathBuf, StoredEntity)>,
}

impl JsonStore {
    /// Open a store directory; files that fail to parse are skipped
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let label = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut entities = BTreeMap::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("json")
            {
                continue;
            }

            match read_entity(path) {
                Ok(stored) => {
                    debug!(store = %label, entity = %stored.full_name, "indexed");
                    entities.insert(stored.full_name.clone(), (path.to_path_buf(), stored));
                }
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }

        Ok(Self {
            label,
            entities,
        })
    }

    fn stored(&self, name: &str) -> Result<&(PathBuf, StoredEntity)> {
        self.entities
            .get(name)
            .ok_or_else(|| Error::EntityNotFound(name.to_string()))
    }
}

fn read_entity(path: &Path) -> Result<StoredEntity> {
    let contents = std::fs::read_to_string(path)?;
    let stored: StoredEntity =
        serde_json::from_str(&contents).map_err(|e| Error::store(path, e.to_string()))?;
    if stored.full_name.is_empty() {
        return Err(Error::store(path, "empty full_name"));
    }
    Ok(stored)
}

// Name the offending file in markup errors
fn locate(err: Error, path: &Path) -> Error {
    match err {
        Error::UnknownMarkup(kind) => Error::UnknownMarkup(format!("{} (in {})", kind, path.display())),
        other => other,
    }
}

impl DocStore for JsonStore {
    fn label(&self) -> &str {
        &self.label
    }

    fn entity_names(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    fn load_entity(&self, name: &str) -> Result<EntityRecord> {
        let (path, stored) = self.stored(name)?;
        let comment = convert(&stored.comment).map_err(|e| locate(e, path))?;

        let mut entity = EntityRecord::new(stored.full_name.clone(), stored.kind);
        entity.superclass = stored.superclass.clone();
        entity.comment = comment;
        entity.includes = stored.includes.clone();
        entity.constants = stored.constants.clone();
        entity.class_methods = stored.class_methods.iter().map(|m| m.name.clone()).collect();
        entity.instance_methods = stored
            .instance_methods
            .iter()
            .map(|m| m.name.clone())
            .collect();
        entity.sources = vec![self.label.clone()];
        Ok(entity)
    }

    fn load_method(&self, entity: &str, wanted: &str) -> Result<MethodRecord> {
        let (path, stored) = self.stored(entity)?;

        let found = stored
            .class_methods
            .iter()
            .map(|m| (m, true))
            .chain(stored.instance_methods.iter().map(|m| (m, false)))
            .find(|(m, singleton)| method_full_name(entity, &m.name, *singleton) == wanted);

        let (method, singleton) = found.ok_or_else(|| Error::method_not_found(entity, wanted))?;

        let comment = convert(&method.comment).map_err(|e| locate(e, path))?;

        Ok(MethodRecord {
            full_name: wanted.to_string(),
            name: method.name.clone(),
            singleton,
            params: method.params.clone(),
            comment,
            owner: entity.to_string(),
            origin: self.label.clone(),
        })
    }
}

/// Every configured store, in priority order
pub struct Catalog {
    stores: Vec<Box<dyn DocStore>>,
}

impl Catalog {
    pub fn new(stores: Vec<Box<dyn DocStore>>) -> Self {
        Self { stores }
    }

    /// Open a `JsonStore` for each path
    pub fn open(paths: &[PathBuf]) -> Result<Self> {
        let mut stores: Vec<Box<dyn DocStore>> = Vec::new();
        for path in paths {
            stores.push(Box::new(JsonStore::open(path)?));
        }
        Ok(Self::new(stores))
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Store labels, sorted and deduplicated
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.stores.iter().map(|s| s.label().to_string()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Entity names across all stores, ordered case-insensitively.
    ///
    /// Names that differ only by case collapse to the first one seen; this
    /// mirrors the cache living on a case-insensitive filesystem.
    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.iter().flat_map(|s| s.entity_names()).collect();
        names.sort_by_key(|n| n.to_lowercase());

        let mut seen = HashSet::new();
        names.retain(|n| seen.insert(n.to_lowercase()));
        names
    }

    fn defining(&self, name: &str) -> impl Iterator<Item = &dyn DocStore> {
        let name = name.to_string();
        self.stores
            .iter()
            .map(|s| s.as_ref())
            .filter(move |s| s.contains(&name))
    }

    /// Load an entity merged across every store that documents it
    pub fn load_entity(&self, name: &str) -> Result<EntityRecord> {
        let mut merged: Option<EntityRecord> = None;

        for store in self.defining(name) {
            let record = store.load_entity(name)?;
            if let Some(entity) = merged.as_mut() {
                merge_into(entity, record, store.label());
            } else {
                let mut first = record;
                first.sources = vec![store.label().to_string()];
                merged = Some(first);
            }
        }

        merged.ok_or_else(|| Error::EntityNotFound(name.to_string()))
    }

    /// Load the methods of an entity from every store that lists them.
    ///
    /// `first_sighting` is asked once per method full name and must return
    /// false for methods that were already taken from an earlier store.
    pub fn load_methods(
        &self,
        name: &str,
        mut first_sighting: impl FnMut(&str) -> bool,
    ) -> Result<Vec<MethodRecord>> {
        let mut methods = Vec::new();
        for store in self.defining(name) {
            let record = store.load_entity(name)?;
            for full_name in record.method_full_names() {
                if !first_sighting(&full_name) {
                    continue;
                }
                methods.push(store.load_method(name, &full_name)?);
            }
        }
        Ok(methods)
    }
}

fn merge_into(entity: &mut EntityRecord, other: EntityRecord, label: &str) {
    fn extend_unique(target: &mut Vec<String>, more: Vec<String>) {
        for item in more {
            if !target.contains(&item) {
                target.push(item);
            }
        }
    }

    if entity.superclass.is_none() {
        entity.superclass = other.superclass;
    }
    if entity.comment.is_empty() {
        entity.comment = other.comment;
    }
    extend_unique(&mut entity.includes, other.includes);
    extend_unique(&mut entity.constants, other.constants);
    extend_unique(&mut entity.class_methods, other.class_methods);
    extend_unique(&mut entity.instance_methods, other.instance_methods);
    extend_unique(&mut entity.sources, vec![label.to_string()]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, entity: &StoredEntity) {
        std::fs::write(dir.join(file), serde_json::to_string(entity).unwrap()).unwrap();
    }

    fn method(name: &str, comment: &str) -> StoredMethod {
        StoredMethod {
            name: name.to_string(),
            params: String::new(),
            comment: vec![CommentNode::paragraph(comment)],
        }
    }

    fn store_dir(root: &TempDir, label: &str) -> PathBuf {
        let dir = root.path().join(label);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_open_missing_dir() {
        assert!(matches!(
            JsonStore::open(Path::new("/nonexistent/store")),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_load_entity_and_method() {
        let root = TempDir::new().unwrap();
        let dir = store_dir(&root, "core");
        write(
            &dir,
            "Array.json",
            &StoredEntity {
                full_name: "Array".to_string(),
                superclass: Some("Object".to_string()),
                comment: vec![CommentNode::paragraph("Arrays.")],
                class_methods: vec![method("new", "makes one")],
                instance_methods: vec![method("each", "iterates")],
                ..Default::default()
            },
        );

        let store = JsonStore::open(&dir).unwrap();
        assert_eq!(store.label(), "core");
        assert_eq!(store.entity_names(), vec!["Array".to_string()]);

        let entity = store.load_entity("Array").unwrap();
        assert_eq!(entity.comment, vec![Markup::Paragraph("Arrays.".to_string())]);
        assert_eq!(entity.class_methods, vec!["new".to_string()]);
        assert_eq!(entity.sources, vec!["core".to_string()]);

        let each = store.load_method("Array", "Array#each").unwrap();
        assert!(!each.singleton);
        assert_eq!(each.owner, "Array");
        assert_eq!(each.origin, "core");

        let new = store.load_method("Array", "Array::new").unwrap();
        assert!(new.singleton);

        assert!(matches!(
            store.load_method("Array", "Array#nope"),
            Err(Error::MethodNotFound { .. })
        ));
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let root = TempDir::new().unwrap();
        let dir = store_dir(&root, "core");
        std::fs::write(dir.join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        write(
            &dir,
            "Hash.json",
            &StoredEntity {
                full_name: "Hash".to_string(),
                ..Default::default()
            },
        );

        let store = JsonStore::open(&dir).unwrap();
        assert_eq!(store.entity_names(), vec!["Hash".to_string()]);
    }

    #[test]
    fn test_unknown_markup_is_fatal_on_load() {
        let root = TempDir::new().unwrap();
        let dir = store_dir(&root, "core");
        write(
            &dir,
            "Odd.json",
            &StoredEntity {
                full_name: "Odd".to_string(),
                comment: vec![CommentNode::new("marquee", "x")],
                ..Default::default()
            },
        );

        let store = JsonStore::open(&dir).unwrap();
        assert!(matches!(store.load_entity("Odd"), Err(Error::UnknownMarkup(_))));
    }

    #[test]
    fn test_catalog_merges_stores() {
        let root = TempDir::new().unwrap();
        let core = store_dir(&root, "core");
        let ext = store_dir(&root, "activesupport");
        write(
            &core,
            "String.json",
            &StoredEntity {
                full_name: "String".to_string(),
                comment: vec![CommentNode::paragraph("Text.")],
                includes: vec!["Comparable".to_string()],
                instance_methods: vec![method("upcase", "loud")],
                ..Default::default()
            },
        );
        write(
            &ext,
            "String.json",
            &StoredEntity {
                full_name: "String".to_string(),
                comment: vec![CommentNode::paragraph("Extended text.")],
                includes: vec!["Comparable".to_string()],
                instance_methods: vec![method("UPCASE", "dup"), method("squish", "tidy")],
                ..Default::default()
            },
        );

        let catalog = Catalog::open(&[core, ext]).unwrap();
        let entity = catalog.load_entity("String").unwrap();
        assert_eq!(entity.sources, vec!["core".to_string(), "activesupport".to_string()]);
        assert_eq!(entity.includes, vec!["Comparable".to_string()]);
        assert_eq!(entity.comment, vec![Markup::Paragraph("Text.".to_string())]);
        assert_eq!(entity.instance_methods.len(), 3);

        let mut seen = HashSet::new();
        let methods = catalog
            .load_methods("String", |full| seen.insert(full.to_lowercase()))
            .unwrap();
        let names: Vec<&str> = methods.iter().map(|m| m.full_name.as_str()).collect();
        assert_eq!(names, vec!["String#upcase", "String#squish"]);
        assert_eq!(methods[1].origin, "activesupport");
    }

    #[test]
    fn test_catalog_entity_names_sorted_and_deduplicated() {
        let root = TempDir::new().unwrap();
        let a = store_dir(&root, "a");
        let b = store_dir(&root, "b");
        for (dir, name) in [(&a, "zlib"), (&a, "Array"), (&b, "ZLib"), (&b, "array"), (&b, "Bignum")] {
            write(
                dir,
                &format!("{}.json", name),
                &StoredEntity {
                    full_name: name.to_string(),
                    ..Default::default()
                },
            );
        }

        let catalog = Catalog::open(&[a, b]).unwrap();
        assert_eq!(catalog.entity_names(), vec!["Array", "Bignum", "zlib"]);
        assert_eq!(catalog.labels(), vec!["a", "b"]);
    }

    #[test]
    fn test_catalog_missing_entity() {
        let catalog = Catalog::new(Vec::new());
        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.load_entity("Nope"),
            Err(Error::EntityNotFound(_))
        ));
    }
}
