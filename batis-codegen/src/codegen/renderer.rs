//! Handlebars template rendering with a per-kind compiled-template cache

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::CodegenConfig;
use crate::error::Result;

const ENTITY_TEMPLATE: &str = include_str!("../../templates/entity.hbs");
const MAPPER_TEMPLATE: &str = include_str!("../../templates/mapper.hbs");
const XML_TEMPLATE: &str = include_str!("../../templates/xml.hbs");

/// Indent unit the built-in templates are written with
const TEMPLATE_INDENT: usize = 4;

/// The templates a generation run renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Entity class
    Entity,
    /// Mapper interface (declaration artifact)
    Mapper,
    /// Mapper XML (mapping document)
    Xml,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Entity, TemplateKind::Mapper, TemplateKind::Xml];

    /// Template identifier, also the custom template file stem
    pub fn id(&self) -> &'static str {
        match self {
            TemplateKind::Entity => "entity",
            TemplateKind::Mapper => "mapper",
            TemplateKind::Xml => "xml",
        }
    }

    /// Built-in template source
    pub fn builtin(&self) -> &'static str {
        match self {
            TemplateKind::Entity => ENTITY_TEMPLATE,
            TemplateKind::Mapper => MAPPER_TEMPLATE,
            TemplateKind::Xml => XML_TEMPLATE,
        }
    }

    fn custom_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.hbs", self.id()))
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where a compiled template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Builtin,
    Custom(PathBuf),
}

/// Output of a single render
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub origin: TemplateOrigin,
    /// Non-fatal problems, e.g. an unreadable custom template
    pub warnings: Vec<String>,
}

/// A compiled template together with the exact source it was compiled from
#[derive(Debug, Clone)]
struct CachedTemplate {
    source: String,
    origin: TemplateOrigin,
}

/// Renders artifacts from built-in or custom Handlebars templates
///
/// Compiled templates are cached per kind. Each render re-reads the custom
/// template source (cheap next to compiling) and recompiles only when it
/// differs from what the cache was built from, so an edited template is
/// always picked up.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
    template_dir: Option<PathBuf>,
    indent_size: usize,
    cache: HashMap<TemplateKind, CachedTemplate>,
}

impl TemplateRenderer {
    pub fn new(template_dir: Option<PathBuf>, indent_size: usize) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self {
            registry,
            template_dir,
            indent_size,
            cache: HashMap::new(),
        }
    }

    pub fn from_config(config: &CodegenConfig) -> Self {
        Self::new(config.template_dir.clone(), config.indent_size)
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    /// Point at a different custom template directory, dropping every cached template
    pub fn set_template_dir(&mut self, template_dir: Option<PathBuf>) {
        self.template_dir = template_dir;
        self.clear();
    }

    /// Drop the cached template for one kind
    pub fn invalidate(&mut self, kind: TemplateKind) {
        if self.cache.remove(&kind).is_some() {
            self.registry.unregister_template(kind.id());
            debug!("Invalidated cached template `{}`", kind);
        }
    }

    /// Drop every cached template
    pub fn clear(&mut self) {
        for kind in TemplateKind::ALL {
            self.invalidate(kind);
        }
    }

    pub fn is_cached(&self, kind: TemplateKind) -> bool {
        self.cache.contains_key(&kind)
    }

    /// Read the source for a kind: the custom file if configured and readable, else built-in
    fn load_source(&self, kind: TemplateKind, warnings: &mut Vec<String>) -> (String, TemplateOrigin) {
        let builtin = (kind.builtin().to_string(), TemplateOrigin::Builtin);
        let Some(dir) = &self.template_dir else {
            return builtin;
        };

        if !dir.is_dir() {
            let message = format!(
                "Custom template directory {} not found, using built-in `{}` template",
                dir.display(),
                kind
            );
            warn!("{}", message);
            warnings.push(message);
            return builtin;
        }

        let path = kind.custom_path(dir);
        match std::fs::read_to_string(&path) {
            Ok(source) => (source, TemplateOrigin::Custom(path)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No custom `{}` template in {}", kind, dir.display());
                builtin
            }
            Err(e) => {
                let message = format!(
                    "Failed to load custom template {}: {}, using built-in",
                    path.display(),
                    e
                );
                warn!("{}", message);
                warnings.push(message);
                builtin
            }
        }
    }

    /// Make sure the registry holds a template compiled from the current source
    fn ensure_compiled(&mut self, kind: TemplateKind, warnings: &mut Vec<String>) -> Result<TemplateOrigin> {
        let (source, origin) = self.load_source(kind, warnings);

        if let Some(cached) = self.cache.get(&kind) {
            if cached.source == source && cached.origin == origin {
                return Ok(origin);
            }
            debug!("Template `{}` source changed, recompiling", kind);
        }

        let (source, origin) = match self.registry.register_template_string(kind.id(), &source) {
            Ok(()) => (source, origin),
            Err(e) if origin != TemplateOrigin::Builtin => {
                let message = format!(
                    "Failed to compile custom `{}` template: {}, using built-in",
                    kind, e
                );
                warn!("{}", message);
                warnings.push(message);
                self.registry
                    .register_template_string(kind.id(), kind.builtin())?;
                (kind.builtin().to_string(), TemplateOrigin::Builtin)
            }
            Err(e) => return Err(e.into()),
        };

        self.cache.insert(
            kind,
            CachedTemplate {
                source,
                origin: origin.clone(),
            },
        );
        Ok(origin)
    }

    /// Render a template kind against a serializable model
    pub fn render<T: Serialize>(&mut self, kind: TemplateKind, data: &T) -> Result<Rendered> {
        let mut warnings = Vec::new();
        let origin = self.ensure_compiled(kind, &mut warnings)?;
        let text = self.registry.render(kind.id(), data)?;
        Ok(Rendered {
            text: reindent(&text, self.indent_size),
            origin,
            warnings,
        })
    }
}

/// Convert leading indentation from 4-space units to `width`-space units
pub fn reindent(text: &str, width: usize) -> String {
    if width == TEMPLATE_INDENT {
        return text.to_string();
    }
    text.split_inclusive('\n')
        .map(|line| {
            let body = line.trim_start_matches(' ');
            let leading = line.len() - body.len();
            let units = leading / TEMPLATE_INDENT;
            let rest = leading % TEMPLATE_INDENT;
            format!("{}{}", " ".repeat(units * width + rest), body)
        })
        .collect()
}
