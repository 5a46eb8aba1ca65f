//! Entry rendering
//!
//! Turns entity and method records into self-contained `d:entry` fragments.
//! Rendering is pure: the same record and exclusion list always produce the
//! same bytes.

pub mod escape;
pub mod ident;
pub mod templates;

pub use escape::escape;
pub use ident::{entry_key, normalize, IdKind};
pub use templates::{EntityView, MethodView, Section, TemplateEngine};

use crate::config::RenderConfig;
use crate::error::Result;
use crate::markup::render_comment;
use crate::model::{EntityRecord, MethodRecord, RenderedFragment};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static RE_REDUCE_ACCESSOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_reduce_\d+").unwrap());
static RE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Comment used for entries whose source documentation is known to be broken
pub const IMPROPERLY_FORMATTED: &str = "Improperly formatted";

/// Comment used for methods without documentation
pub const UNDOCUMENTED: &str = "undocumented";

/// Title of the front/back matter entry
pub const DICTIONARY_TITLE: &str = "RubyGems Dictionary";

/// Entry renderer
pub struct Renderer {
    templates: TemplateEngine,
    excluded: HashSet<String>,
    root_class: String,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        Ok(Self {
            templates: TemplateEngine::new()?,
            excluded: config.excluded.iter().cloned().collect(),
            root_class: config.root_class.clone(),
        })
    }

    pub fn is_excluded(&self, full_name: &str) -> bool {
        self.excluded.contains(full_name)
    }

    /// Render the entry for a class or module
    pub fn render_entity(&self, entity: &EntityRecord) -> Result<RenderedFragment> {
        let id = normalize(entity.kind.into(), &[entity.full_name.as_str()]);

        let mut title = format!("{} {}", entity.kind.as_str(), entity.full_name);
        if entity.is_class() {
            if let Some(superclass) = entity
                .superclass
                .as_deref()
                .filter(|s| !s.is_empty() && *s != self.root_class)
            {
                title.push_str(" < ");
                title.push_str(superclass);
            }
        }

        let comment = if self.is_excluded(&entity.full_name) {
            IMPROPERLY_FORMATTED.to_string()
        } else {
            render_comment(&entity.comment)
        };

        let sections = self.entity_sections(entity);

        let (single_source, extensions): (Option<&str>, &[String]) = match entity.sources.as_slice() {
            [only] => (Some(only.as_str()), &[]),
            many => (None, many),
        };

        let view = EntityView {
            id: &id,
            full_name: &entity.full_name,
            short_name: (entity.name != entity.full_name).then_some(entity.name.as_str()),
            title: &title,
            single_source,
            extensions,
            comment: &comment,
            sections: &sections,
        };

        let markup = self.templates.render_entity(&view)?;
        Ok(RenderedFragment::new(id, markup))
    }

    fn entity_sections(&self, entity: &EntityRecord) -> Vec<Section> {
        let plain = |names: &[String]| -> String {
            names.iter().map(|n| escape(n)).collect::<Vec<_>>().join(", ")
        };
        let links = |names: &[String], singleton: bool| -> String {
            names
                .iter()
                .map(|n| {
                    format!(
                        "<a href=\"x-dictionary:r:{}\">{}</a>",
                        normalize(IdKind::method(singleton), &[entity.full_name.as_str(), n.as_str()]),
                        escape(n)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let candidates = [
            ("Includes", &entity.includes, plain(&entity.includes)),
            ("Constants", &entity.constants, plain(&entity.constants)),
            ("Class Methods", &entity.class_methods, links(&entity.class_methods, true)),
            (
                "Instance Methods",
                &entity.instance_methods,
                links(&entity.instance_methods, false),
            ),
        ];

        candidates
            .into_iter()
            .filter(|(_, names, _)| !names.is_empty())
            .map(|(label, _, body)| Section { label, body })
            .collect()
    }

    /// Render the entry for a method, or `None` for generated parser accessors
    pub fn render_method(&self, method: &MethodRecord) -> Result<Option<RenderedFragment>> {
        if is_synthetic_accessor(&method.name) {
            return Ok(None);
        }

        let id = normalize(
            IdKind::method(method.singleton),
            &[method.owner.as_str(), method.name.as_str()],
        );

        let comment = if self.is_excluded(&method.full_name) {
            IMPROPERLY_FORMATTED.to_string()
        } else {
            let html = render_comment(&method.comment);
            if html.is_empty() {
                UNDOCUMENTED.to_string()
            } else {
                html
            }
        };

        let signature = signature(&method.name, &method.params);

        let view = MethodView {
            id: &id,
            full_name: &method.full_name,
            name: &method.name,
            origin: &method.origin,
            signature: &signature,
            comment: &comment,
        };

        let markup = self.templates.render_method(&view)?;
        Ok(Some(RenderedFragment::new(id, markup)))
    }

    pub fn render_header(&self) -> Result<String> {
        self.templates.render_header()
    }

    pub fn render_footer(&self, sources: &[String], entities: &[String]) -> Result<String> {
        self.templates.render_footer(DICTIONARY_TITLE, sources, entities)
    }
}

/// Racc-generated reduce actions, e.g. `_reduce_12`
pub fn is_synthetic_accessor(name: &str) -> bool {
    RE_REDUCE_ACCESSOR.is_match(name)
}

/// Signature block body; the method name is prepended unless the
/// parameter text opens with a parenthesis
fn signature(name: &str, params: &str) -> String {
    let params = collapse_newlines(params);
    let mut out = String::new();
    if !params.trim_start().starts_with('(') {
        out.push_str(&format!("<b>{}</b>", escape(name)));
    }
    if !params.trim().is_empty() {
        out.push_str(&format!("<b>{}</b>", escape(&params)));
    }
    out
}

fn collapse_newlines(text: &str) -> String {
    RE_NEWLINES.replace_all(text, "\n").into_owned()
}
