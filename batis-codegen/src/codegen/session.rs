//! Generation session - drives one or more generation runs over a schema provider

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::CodegenConfig;
use crate::error::Result;
use crate::parser::{SchemaProvider, TableDescriptor};
use crate::watchdog::MemoryWatchdog;

use super::artifacts::{ArtifactKind, GeneratedArtifact};
use super::model::{ModelOptions, RenderModel};
use super::renderer::TemplateRenderer;

/// Cooperative cancellation shared between a run and its caller
///
/// Checked between tables only; artifacts already written stay on disk.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A table that could not be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    pub table: String,
    pub message: String,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Tables whose artifacts were all rendered (and written, unless dry run)
    pub tables: Vec<String>,
    /// Artifact paths written, or that would be written in dry run mode
    pub artifacts: Vec<PathBuf>,
    pub failures: Vec<TableFailure>,
    pub warnings: Vec<String>,
    pub cancelled: bool,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Rendered artifacts of a single table
#[derive(Debug, Clone)]
pub struct TableOutput {
    pub model: RenderModel,
    pub artifacts: Vec<GeneratedArtifact>,
    pub warnings: Vec<String>,
}

impl TableOutput {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// Owns the renderer and its cache for the lifetime of a generation session
///
/// Create with [`GenerationSession::new`], call [`run`](Self::run) as often as
/// needed, and release with [`dispose`](Self::dispose) (or drop).
pub struct GenerationSession {
    config: CodegenConfig,
    options: ModelOptions,
    renderer: TemplateRenderer,
    watchdog: Option<MemoryWatchdog>,
}

impl GenerationSession {
    pub fn new(config: CodegenConfig) -> Self {
        let options = ModelOptions::from_config(&config);
        let renderer = TemplateRenderer::from_config(&config);
        Self {
            config,
            options,
            renderer,
            watchdog: None,
        }
    }

    /// Poll `watchdog` between tables and drop the template cache under memory pressure
    pub fn with_watchdog(mut self, watchdog: MemoryWatchdog) -> Self {
        self.watchdog = Some(watchdog);
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    pub fn renderer_mut(&mut self) -> &mut TemplateRenderer {
        &mut self.renderer
    }

    /// Render the three artifacts of a table without touching the filesystem
    pub fn render_table(&mut self, table: &TableDescriptor) -> Result<TableOutput> {
        let model = RenderModel::build(table, &self.options)?;
        let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
        let mut warnings = Vec::new();

        for kind in ArtifactKind::ALL {
            let rendered = self.renderer.render(kind.template(), &model)?;
            warnings.extend(rendered.warnings);
            let path = self
                .config
                .output_dir
                .join(kind.relative_path(&model.package_name, &model.class_name));
            debug!("Rendered {} for {} -> {}", kind, table.name, path.display());
            artifacts.push(GeneratedArtifact {
                kind,
                table_name: table.name.clone(),
                path,
                content: rendered.text,
            });
        }

        Ok(TableOutput {
            model,
            artifacts,
            warnings,
        })
    }

    /// Generate artifacts for every selected table of `provider`
    ///
    /// A table that cannot be read, rendered or written is recorded in the
    /// report and the run moves on to the next table.
    pub fn run(
        &mut self,
        provider: &dyn SchemaProvider,
        cancel: &CancellationFlag,
    ) -> Result<GenerationReport> {
        let names = provider.table_names()?;
        info!("Found {} tables", names.len());

        let names = crate::filter_tables(
            names,
            &self.config.include_tables,
            &self.config.exclude_tables,
        );
        debug!(
            "After filtering: {} tables (include={}, exclude={})",
            names.len(),
            self.config.include_tables,
            self.config.exclude_tables
        );

        let mut report = GenerationReport::default();
        for name in names {
            if cancel.is_cancelled() {
                info!("Generation cancelled before table `{}`", name);
                report.cancelled = true;
                break;
            }

            if let Some(watchdog) = &self.watchdog {
                if watchdog.check() {
                    self.renderer.clear();
                    report
                        .warnings
                        .push("Memory threshold exceeded, template cache cleared".to_string());
                }
            }

            match self.generate_table(provider, &name) {
                Ok(output) => {
                    report.warnings.extend(output.warnings);
                    report
                        .artifacts
                        .extend(output.artifacts.into_iter().map(|a| a.path));
                    report.tables.push(name);
                }
                Err(e) => {
                    warn!("Skipping table `{}`: {}", name, e);
                    report.failures.push(TableFailure {
                        table: name,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Generated {} tables ({} failed)",
            report.tables.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn generate_table(&mut self, provider: &dyn SchemaProvider, name: &str) -> Result<TableOutput> {
        let table = provider.describe_table(name)?;
        // Render all three before writing any, so a template failure leaves no partial set
        let output = self.render_table(&table)?;

        for artifact in &output.artifacts {
            if self.config.dry_run {
                info!("[dry run] Would write {}", artifact.path.display());
            } else {
                artifact.write()?;
            }
        }
        Ok(output)
    }

    /// End the session, releasing cached templates
    pub fn dispose(mut self) {
        self.renderer.clear();
        debug!("Generation session disposed");
    }
}
