//! CLI entry point for batis-codegen

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use batis_codegen::config::CodegenConfig;
use batis_codegen::xref::{
    scaffold_file, ArtifactRole, CrossReferenceResolver, Resolution, Scaffold,
};

#[derive(Parser)]
#[command(name = "batis-codegen")]
#[command(about = "Generate MyBatis entities, mapper interfaces and mapper XML from MySQL schema metadata")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to SQL schema file (overrides config)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Path to JSON metadata snapshot (overrides config and --schema)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Output root (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base Java package (overrides config)
    #[arg(short, long)]
    package: Option<String>,

    /// Custom template directory (overrides config)
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Dry run - show what would be generated without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate entity, mapper interface and mapper XML for every table
    Generate,
    /// Inspect schema (show parsed tables for debugging)
    Inspect,
    /// Find the paired mapper interface / mapper XML of a file
    Jump {
        /// Workspace root to search
        root: PathBuf,
        /// A mapper interface (.java) or mapper XML (.xml)
        file: PathBuf,
        /// Resolve the member declared on this line (1-based)
        #[arg(long, conflicts_with = "member")]
        line: Option<usize>,
        /// Resolve this method name / statement id
        #[arg(long)]
        member: Option<String>,
    },
    /// Add a stub statement for a declared method to its mapper XML
    Scaffold {
        /// Workspace root to search
        root: PathBuf,
        /// The mapper interface or its mapper XML
        file: PathBuf,
        /// Method name / statement id
        method: String,
    },
    /// Rebuild executable SQL from the `Preparing:`/`Parameters:` lines of a MyBatis log
    FormatSql {
        /// Log file (reads stdin when omitted)
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = CodegenConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Apply CLI overrides
    if let Some(schema) = cli.schema {
        config.schema_file = schema;
    }
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_file = Some(snapshot);
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(package) = cli.package {
        config.package_name = package;
    }
    if let Some(dir) = cli.template_dir {
        config.template_dir = Some(dir);
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    match cli.command {
        None | Some(Commands::Generate) => generate(&config),
        Some(Commands::Inspect) => inspect_schema(&config),
        Some(Commands::Jump {
            root,
            file,
            line,
            member,
        }) => jump(&root, &file, line, member.as_deref()),
        Some(Commands::Scaffold { root, file, method }) => scaffold(&root, &file, &method),
        Some(Commands::FormatSql { input }) => format_sql(input.as_deref()),
    }
}

fn generate(config: &CodegenConfig) -> Result<()> {
    config.validate()?;

    info!("Generating mapper code into {:?}", config.output_dir);
    let report = batis_codegen::generate(config)?;

    if config.dry_run {
        println!("Dry run mode - would generate:");
        for path in &report.artifacts {
            println!("  {}", path.display());
        }
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for failure in &report.failures {
        println!("failed: {}: {}", failure.table, failure.message);
    }
    if !report.failures.is_empty() {
        bail!(
            "{} of {} tables failed",
            report.failures.len(),
            report.failures.len() + report.tables.len()
        );
    }

    info!("Code generation completed successfully");
    Ok(())
}

fn inspect_schema(config: &CodegenConfig) -> Result<()> {
    let provider = batis_codegen::open_provider(config)?;
    let names = provider.table_names()?;

    println!("Parsed {} tables:\n", names.len());
    for name in &names {
        let table = match provider.describe_table(name) {
            Ok(table) => table,
            Err(e) => {
                println!("Table: {} (unreadable: {})\n", name, e);
                continue;
            }
        };
        println!("Table: {}", table.name);
        if !table.comment.is_empty() {
            println!("  Comment: {}", table.comment);
        }
        println!("  Columns:");
        for col in &table.columns {
            let key = if col.is_primary_key { " PRIMARY KEY" } else { "" };
            println!("    - {} {}{}", col.name, col.source_type, key);
        }
        if !table.has_declared_key() {
            if let Some(key) = table.key_column() {
                println!("  No primary key, `{}` will be used", key.name);
            }
        }
        println!();
    }

    Ok(())
}

fn print_resolution(member: &str, resolution: &Resolution) {
    match resolution {
        Resolution::Found { artifact, position } => println!(
            "{}:{}:{}  {}",
            artifact.display(),
            position.line,
            position.column,
            member
        ),
        Resolution::MemberMissing { artifact } => {
            println!("`{}` not found in {}", member, artifact.display())
        }
        Resolution::ArtifactMissing { expected } => println!("{} not found", expected),
    }
}

fn jump(root: &Path, file: &Path, line: Option<usize>, member: Option<&str>) -> Result<()> {
    let resolver = CrossReferenceResolver::new(root)?;

    if let Some(line) = line {
        match resolver.resolve_at_line(file, line)? {
            Some((member, resolution)) => print_resolution(&member, &resolution),
            None => println!("Nothing declared on line {}", line),
        }
        return Ok(());
    }
    if let Some(member) = member {
        print_resolution(member, &resolver.resolve(file, member)?);
        return Ok(());
    }

    let Some(paired) = resolver.find_paired_artifact(file)? else {
        bail!("No paired artifact found for {}", file.display());
    };
    println!("{}", paired.display());

    // For a declaration, list which methods the mapping document implements
    if ArtifactRole::from_path(file) == Some(ArtifactRole::Declaration) {
        let declaration = std::fs::read_to_string(file)?;
        let mapping = std::fs::read_to_string(&paired)?;
        for entry in resolver.audit(&declaration, &mapping) {
            let status = if entry.implemented { "ok" } else { "missing" };
            println!("  {:>4}  {:<8} {}", entry.position.line, status, entry.name);
        }
    }
    Ok(())
}

fn scaffold(root: &Path, file: &Path, method: &str) -> Result<()> {
    let resolver = CrossReferenceResolver::new(root)?;
    let mapping = match ArtifactRole::from_path(file) {
        Some(ArtifactRole::Mapping) => file.to_path_buf(),
        Some(ArtifactRole::Declaration) => resolver
            .find_paired_artifact(file)?
            .with_context(|| format!("No mapper XML found for {}", file.display()))?,
        None => bail!("{} is neither a .java nor a .xml file", file.display()),
    };

    match scaffold_file(resolver.syntax(ArtifactRole::Mapping), &mapping, method)? {
        Scaffold::Inserted { kind, position, .. } => println!(
            "Added <{}> `{}` at {}:{}",
            kind,
            method,
            mapping.display(),
            position.line
        ),
        Scaffold::AlreadyPresent { position } => println!(
            "`{}` already exists at {}:{}",
            method,
            mapping.display(),
            position.line
        ),
    }
    Ok(())
}

fn format_sql(input: Option<&Path>) -> Result<()> {
    let log = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    for statement in batis_codegen::sql_log::extract_sql_statements(&log)? {
        println!("{};", statement);
    }
    Ok(())
}
