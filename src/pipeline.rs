//! Run orchestration
//!
//! enumerate entities → render anything not yet cached → assemble → build →
//! install. Downstream steps only happen when the run saw a new entity or
//! the caller forces them.

use crate::assemble::assemble;
use crate::cache::{FragmentCache, RunContext};
use crate::config::Config;
use crate::error::Result;
use crate::model::RenderedFragment;
use crate::render::{entry_key, Renderer};
use crate::store::Catalog;
use crate::toolchain::{self, CommandRunner};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use tracing::{debug, info};

/// Per-invocation switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Assemble and build even when nothing changed
    pub force: bool,
    /// Restrict processing to the configured quick patterns
    pub quick: bool,
    /// Delete all cached fragments first
    pub reset: bool,
    /// Per-entity logging instead of a progress bar
    pub verbose: bool,
}

/// What a run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub entities_seen: usize,
    pub entities_rendered: usize,
    pub methods_rendered: usize,
    pub dirty: bool,
    pub assembled: bool,
    pub built: bool,
    pub installed: bool,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "{} entities, {} rendered ({} methods), assembled: {}, built: {}, installed: {}",
            self.entities_seen,
            self.entities_rendered,
            self.methods_rendered,
            if self.assembled { "yes" } else { "no" },
            if self.built { "yes" } else { "no" },
            if self.installed { "yes" } else { "no" }
        )
    }
}

/// Dictionary build pipeline
pub struct Pipeline<'a> {
    config: &'a Config,
    catalog: &'a Catalog,
    renderer: Renderer,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, catalog: &'a Catalog) -> Result<Self> {
        Ok(Self {
            config,
            catalog,
            renderer: Renderer::new(&config.render)?,
        })
    }

    /// Execute one run
    pub fn run(&self, options: RunOptions, runner: &mut dyn CommandRunner) -> Result<RunReport> {
        let mut report = RunReport::default();
        let cache = FragmentCache::open(self.config.paths.cache_dir())?;
        if options.reset {
            cache.reset()?;
        }

        let names = self.selected_entities(options.quick)?;
        report.entities_seen = names.len();

        let mut ctx = RunContext::new();
        let progress = progress_bar(names.len() as u64, options.verbose);

        for name in &names {
            progress.inc(1);
            let key = entry_key(name);
            if cache.has(&key) {
                continue;
            }

            ctx.mark_new_entity(name);
            progress.set_message(name.clone());
            debug!(entity = %name, "rendering");

            let (fragment, methods) = self.render_entry(name, &key, &mut ctx)?;
            cache.put(&key, &fragment)?;
            report.methods_rendered += methods;
        }
        progress.finish_and_clear();

        report.entities_rendered = ctx.rendered().len();
        report.dirty = ctx.is_dirty();

        if ctx.is_dirty() {
            info!("rendered {} new entries", report.entities_rendered);
        } else if !options.force {
            info!("dictionary is up to date");
            return Ok(report);
        }

        let header = self.renderer.render_header()?;
        let footer = self
            .renderer
            .render_footer(&self.catalog.labels(), &self.catalog.entity_names())?;
        let document = assemble(&header, &names, &cache, &footer);

        let source = self.config.paths.source_document();
        fs::write(&source, document)?;
        report.assembled = true;
        info!("wrote {}", source.display());

        toolchain::build(self.config, runner)?;
        report.built = true;

        if self.config.build.install {
            toolchain::install(self.config, runner)?;
            report.installed = true;
        }

        Ok(report)
    }

    /// Entity names to process, in assembly order
    fn selected_entities(&self, quick: bool) -> Result<Vec<String>> {
        let names = self.catalog.entity_names();
        if !quick {
            return Ok(names);
        }

        let patterns = self.config.quick_patterns()?;
        Ok(names
            .into_iter()
            .filter(|n| patterns.iter().any(|p| p.matches(n)))
            .collect())
    }

    /// Render an entity and its methods into one cacheable fragment
    fn render_entry(
        &self,
        name: &str,
        key: &str,
        ctx: &mut RunContext,
    ) -> Result<(RenderedFragment, usize)> {
        let entity = self.catalog.load_entity(name)?;
        let mut markup = self.renderer.render_entity(&entity)?.into_string();

        let methods = self
            .catalog
            .load_methods(name, |full_name| ctx.first_method_sighting(full_name))?;

        let mut rendered = 0;
        for method in &methods {
            if let Some(fragment) = self.renderer.render_method(method)? {
                if !markup.ends_with('\n') {
                    markup.push('\n');
                }
                markup.push_str(fragment.as_str());
                rendered += 1;
            }
        }

        Ok((RenderedFragment::new(key, markup), rendered))
    }
}

fn progress_bar(len: u64, verbose: bool) -> ProgressBar {
    if verbose {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
