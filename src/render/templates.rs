// Template engine for dictionary entries

use crate::error::Result;
use crate::render::escape::escape;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Heading and list body for one labeled entity section
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub label: &'static str,
    /// Already-escaped markup
    pub body: String,
}

/// Values for the entity entry template
#[derive(Debug, Serialize)]
pub struct EntityView<'a> {
    pub id: &'a str,
    pub full_name: &'a str,
    /// Present only when it differs from `full_name`
    pub short_name: Option<&'a str>,
    pub title: &'a str,
    pub single_source: Option<&'a str>,
    pub extensions: &'a [String],
    /// Already-rendered comment markup
    pub comment: &'a str,
    pub sections: &'a [Section],
}

/// Values for the method entry template
#[derive(Debug, Serialize)]
pub struct MethodView<'a> {
    pub id: &'a str,
    pub full_name: &'a str,
    pub name: &'a str,
    pub origin: &'a str,
    /// Already-escaped signature markup
    pub signature: &'a str,
    /// Already-rendered comment markup
    pub comment: &'a str,
}

/// Tera wrapper holding the embedded entry templates.
///
/// Autoescaping is off: user text goes through the `dict_escape` filter
/// exactly once, and pre-rendered markup is inserted as is.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("header.xml", include_str!("../../templates/header.xml.tera")),
            ("footer.xml", include_str!("../../templates/footer.xml.tera")),
            ("entity.xml", include_str!("../../templates/entity.xml.tera")),
            ("method.xml", include_str!("../../templates/method.xml.tera")),
        ])?;

        tera.register_filter("dict_escape", dict_escape);

        Ok(Self { tera })
    }

    pub fn render_entity(&self, view: &EntityView<'_>) -> Result<String> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render("entity.xml", &context)?)
    }

    pub fn render_method(&self, view: &MethodView<'_>) -> Result<String> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render("method.xml", &context)?)
    }

    /// Document prologue and root element
    pub fn render_header(&self) -> Result<String> {
        Ok(self.tera.render("header.xml", &Context::new())?)
    }

    /// Front/back matter entry and the closing root element
    pub fn render_footer(&self, title: &str, sources: &[String], entities: &[String]) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("sources", sources);
        context.insert("entities", entities);
        Ok(self.tera.render("footer.xml", &context)?)
    }
}

/// Escape a template value for embedding in entry markup
fn dict_escape(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let escaped = match value {
        Value::String(s) => escape(s),
        Value::Null => String::new(),
        other => escape(&other.to_string()),
    };
    Ok(Value::String(escaped))
}
