// Documentation records consumed by the renderer
//
// Records are built once by a store and never mutated afterwards.

use crate::markup::Markup;
use serde::{Deserialize, Serialize};

/// Whether an entity is a class or a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Class,
    Module,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Module => "module",
        }
    }
}

/// A documented class or module
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Fully-qualified name, e.g. `Net::HTTP`
    pub full_name: String,
    /// Last path component of `full_name`
    pub name: String,
    pub kind: EntityKind,
    pub superclass: Option<String>,
    pub comment: Vec<Markup>,
    pub includes: Vec<String>,
    pub constants: Vec<String>,
    /// Short names of class-level methods
    pub class_methods: Vec<String>,
    /// Short names of instance-level methods
    pub instance_methods: Vec<String>,
    /// Labels of the stores that document this entity
    pub sources: Vec<String>,
}

impl EntityRecord {
    /// Create an empty record; the short name is derived from `full_name`
    pub fn new(full_name: impl Into<String>, kind: EntityKind) -> Self {
        let full_name = full_name.into();
        let name = short_name(&full_name).to_string();
        Self {
            full_name,
            name,
            kind,
            superclass: None,
            comment: Vec::new(),
            includes: Vec::new(),
            constants: Vec::new(),
            class_methods: Vec::new(),
            instance_methods: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn is_class(&self) -> bool {
        self.kind == EntityKind::Class
    }

    /// Full names of every method, class methods first
    pub fn method_full_names(&self) -> Vec<String> {
        self.class_methods
            .iter()
            .map(|m| method_full_name(&self.full_name, m, true))
            .chain(
                self.instance_methods
                    .iter()
                    .map(|m| method_full_name(&self.full_name, m, false)),
            )
            .collect()
    }
}

/// A documented method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRecord {
    /// e.g. `Array#each` or `Array::new`
    pub full_name: String,
    pub name: String,
    /// Class-level method
    pub singleton: bool,
    /// Parameter signature text as documented
    pub params: String,
    pub comment: Vec<Markup>,
    /// Full name of the owning entity
    pub owner: String,
    /// Label of the store the method was loaded from
    pub origin: String,
}

/// Rendered markup for one entity or method, keyed by its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    id: String,
    markup: String,
}

impl RenderedFragment {
    pub fn new(id: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            markup: markup.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn as_str(&self) -> &str {
        &self.markup
    }

    pub fn into_string(self) -> String {
        self.markup
    }
}

/// Last `::` component of a qualified name
pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit("::").next().unwrap_or(full_name)
}

/// Method full name: `Owner::name` for class methods, `Owner#name` otherwise
pub fn method_full_name(owner: &str, name: &str, singleton: bool) -> String {
    let sep = if singleton { "::" } else { "#" };
    format!("{}{}{}", owner, sep, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Net::HTTP::Get"), "Get");
        assert_eq!(short_name("Array"), "Array");
    }

    #[test]
    fn test_new_entity_derives_short_name() {
        let entity = EntityRecord::new("Net::HTTP", EntityKind::Class);
        assert_eq!(entity.name, "HTTP");
        assert!(entity.is_class());
    }

    #[test]
    fn test_method_full_names() {
        let mut entity = EntityRecord::new("Array", EntityKind::Class);
        entity.class_methods = vec!["new".to_string()];
        entity.instance_methods = vec!["each".to_string(), "[]=".to_string()];
        assert_eq!(
            entity.method_full_names(),
            vec!["Array::new", "Array#each", "Array#[]="]
        );
    }

    #[test]
    fn test_kind_serde() {
        let kind: EntityKind = serde_json::from_str("\"module\"").unwrap();
        assert_eq!(kind, EntityKind::Module);
        assert_eq!(kind.as_str(), "module");
    }
}
