use anyhow::{Context as _, Result};
use casely::config::CaselyConfig;
use casely::export::{ExportOptions, ExportOrchestrator, validate_store};
use casely::ingest::{import_xlsx, split_table};
use casely::record::RecordStore;
use casely::report::BatchReport;
use casely::schema::{
    ExtractOptions, SCHEMA_FILE_NAME, StyleSchema, extract_schema, load_schema,
    render_style_guide, save_schema,
};
use casely::table::parse_table;
use casely::workspace::ProjectLayout;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "casely",
    version,
    about = "Style-guide-driven test case tables: schema inference, atomic records, XLSX export"
)]
pub struct Cli {
    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file. Defaults to the platform config directory.
    #[arg(long, env = "CASELY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export every text artifact to its own spreadsheet
    Convert {
        /// Directory of `.md` artifacts. Defaults to `results/` of the latest project.
        source: Option<PathBuf>,

        /// Destination directory. Defaults to `exports/` of the latest project.
        dest: Option<PathBuf>,

        /// Style schema. Defaults to the project's `style_schema.json`.
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Render artifacts in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Infer the style schema from example tables
    ExtractSchema {
        /// Example tables. Defaults to `processed/examples/*.md` of the latest project.
        examples: Vec<PathBuf>,

        /// Where to write the schema. Defaults to the project's `style_schema.json`.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Largest distinct-value count for an enumerated column
        #[arg(long)]
        enum_threshold: Option<usize>,

        /// Replace an existing schema file
        #[arg(long)]
        force: bool,
    },
    /// Inspect the persisted style schema
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
    /// Check every artifact in a directory against the style schema
    Validate {
        /// Directory of `.md` artifacts. Defaults to `results/` of the latest project.
        source: Option<PathBuf>,

        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Split a multi-row table into one artifact per row
    Split {
        /// File holding one table with many rows
        table: PathBuf,

        /// Destination artifact directory
        dest: PathBuf,

        /// The `{type}` part of each artifact name, e.g. `functional`
        #[arg(long)]
        kind: String,

        #[arg(long)]
        schema: Option<PathBuf>,

        /// Replace existing artifacts
        #[arg(long)]
        overwrite: bool,
    },
    /// Read a spreadsheet artifact back into a text artifact
    Import {
        /// `.xlsx` file named `{type}_{id}_{shortDescription}.xlsx`
        xlsx: PathBuf,

        /// Destination artifact directory
        dest: PathBuf,

        #[arg(long)]
        schema: Option<PathBuf>,

        /// Replace an existing artifact
        #[arg(long)]
        overwrite: bool,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum SchemaAction {
    /// Print the schema as a Markdown style guide
    Show {
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Write a configuration file with default values
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// How a command ended when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// At least one artifact failed; the rest were processed.
    PartialFailure,
}

impl From<&BatchReport> for Outcome {
    fn from(report: &BatchReport) -> Self {
        if report.is_success() {
            Self::Success
        } else {
            Self::PartialFailure
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<CaselyConfig> {
    let config = match path {
        Some(p) => CaselyConfig::load_from(p)?,
        None => CaselyConfig::load()?,
    };
    Ok(config)
}

pub fn run_command(cli: Cli, config: &CaselyConfig) -> Result<Outcome> {
    match cli.command {
        Commands::Convert {
            source,
            dest,
            schema,
            parallel,
        } => handle_convert(config, source, dest, schema, parallel),
        Commands::ExtractSchema {
            examples,
            out,
            enum_threshold,
            force,
        } => handle_extract_schema(config, examples, out, enum_threshold, force),
        Commands::Schema {
            action: SchemaAction::Show { schema },
        } => {
            let path = resolve_schema_path(config, schema, None)?;
            let schema = load_schema(&path)?;
            println!("{}", render_style_guide(&schema));
            Ok(Outcome::Success)
        }
        Commands::Validate { source, schema } => handle_validate(config, source, schema),
        Commands::Split {
            table,
            dest,
            kind,
            schema,
            overwrite,
        } => handle_split(config, &table, dest, &kind, schema, overwrite),
        Commands::Import {
            xlsx,
            dest,
            schema,
            overwrite,
        } => handle_import(config, &xlsx, dest, schema, overwrite),
        Commands::Config { action } => handle_config(cli.config.as_deref(), config, action),
    }
}

/// Explicit path, else `style_schema.json` next to `near`, else the latest project's schema.
fn resolve_schema_path(
    config: &CaselyConfig,
    explicit: Option<PathBuf>,
    near: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(candidate) = near
        .and_then(Path::parent)
        .map(|parent| parent.join(SCHEMA_FILE_NAME))
        .filter(|p| p.is_file())
    {
        return Ok(candidate);
    }
    Ok(ProjectLayout::discover(&config.projects_dir)?.schema_path())
}

fn load_snapshot(path: &Path) -> Result<Arc<StyleSchema>> {
    let schema =
        load_schema(path).with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(Arc::new(schema))
}

fn print_report(report: &BatchReport) -> Result<Outcome> {
    println!("{}", report.to_json()?);
    Ok(Outcome::from(report))
}

fn handle_convert(
    config: &CaselyConfig,
    source: Option<PathBuf>,
    dest: Option<PathBuf>,
    schema: Option<PathBuf>,
    parallel: bool,
) -> Result<Outcome> {
    let (source, dest) = match (source, dest) {
        (Some(source), Some(dest)) => (source, dest),
        (source, dest) => {
            let layout = ProjectLayout::discover(&config.projects_dir)?;
            tracing::info!("Auto-detected project: {}", layout.name());
            (
                source.unwrap_or_else(|| layout.results_dir()),
                dest.unwrap_or_else(|| layout.exports_dir()),
            )
        }
    };

    let schema = load_snapshot(&resolve_schema_path(config, schema, Some(&source))?)?;
    let store = RecordStore::open(&source)?;
    let options = ExportOptions {
        parallel: parallel || config.parallel,
        width_bounds: config.width_bounds(),
        cancel: None,
    };

    let report = ExportOrchestrator::new(schema)
        .with_options(options)
        .run(&store, &dest)?;
    print_report(&report)
}

fn handle_extract_schema(
    config: &CaselyConfig,
    examples: Vec<PathBuf>,
    out: Option<PathBuf>,
    enum_threshold: Option<usize>,
    force: bool,
) -> Result<Outcome> {
    let (examples, out) = if examples.is_empty() || out.is_none() {
        let layout = ProjectLayout::discover(&config.projects_dir)?;
        let examples = if examples.is_empty() {
            layout.example_files()?
        } else {
            examples
        };
        (examples, out.unwrap_or_else(|| layout.schema_path()))
    } else {
        let out = out.context("output path is required")?;
        (examples, out)
    };

    if examples.is_empty() {
        anyhow::bail!("No example tables found");
    }

    let tables = examples
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_table(&text).with_context(|| format!("Failed to parse {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let options = ExtractOptions {
        enum_threshold: enum_threshold.unwrap_or(config.extract_options().enum_threshold),
    };
    let schema = extract_schema(&tables, &options)?;
    save_schema(&schema, &out, force)?;

    println!("{}", render_style_guide(&schema));
    tracing::info!("Style schema written to {}", out.display());
    Ok(Outcome::Success)
}

fn handle_validate(
    config: &CaselyConfig,
    source: Option<PathBuf>,
    schema: Option<PathBuf>,
) -> Result<Outcome> {
    let source = match source {
        Some(s) => s,
        None => ProjectLayout::discover(&config.projects_dir)?.results_dir(),
    };
    let schema = load_snapshot(&resolve_schema_path(config, schema, Some(&source))?)?;
    let report = validate_store(&schema, &RecordStore::open(&source)?)?;
    print_report(&report)
}

fn handle_split(
    config: &CaselyConfig,
    table: &Path,
    dest: PathBuf,
    kind: &str,
    schema: Option<PathBuf>,
    overwrite: bool,
) -> Result<Outcome> {
    let schema = load_snapshot(&resolve_schema_path(config, schema, Some(&dest))?)?;
    let text = std::fs::read_to_string(table)
        .with_context(|| format!("Failed to read {}", table.display()))?;
    let parsed = parse_table(&text).with_context(|| format!("Failed to parse {}", table.display()))?;

    let store = RecordStore::create(dest)?.with_overwrite(overwrite || config.overwrite);
    let report = split_table(&parsed, kind, &schema, &store)?;
    print_report(&report)
}

fn handle_import(
    config: &CaselyConfig,
    xlsx: &Path,
    dest: PathBuf,
    schema: Option<PathBuf>,
    overwrite: bool,
) -> Result<Outcome> {
    let schema = load_snapshot(&resolve_schema_path(config, schema, Some(&dest))?)?;
    let store = RecordStore::create(dest)?.with_overwrite(overwrite || config.overwrite);
    let path = import_xlsx(xlsx, &schema, &store)?;
    println!("{}", path.display());
    Ok(Outcome::Success)
}

fn handle_config(
    path: Option<&Path>,
    config: &CaselyConfig,
    action: ConfigAction,
) -> Result<Outcome> {
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Init { force } => {
            let path = match path {
                Some(p) => p.to_path_buf(),
                None => CaselyConfig::config_path()?,
            };
            if path.exists() && !force {
                anyhow::bail!("{} already exists; pass --force to replace it", path.display());
            }
            CaselyConfig::default().save_to(&path)?;
            println!("{}", path.display());
        }
    }
    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_paths_are_optional() {
        let cli = Cli::try_parse_from(["casely", "convert"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Convert {
                source: None,
                dest: None,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["casely", "-v", "convert", "results", "exports", "--parallel"])
            .unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Convert { parallel: true, .. }));
    }

    #[test]
    fn test_split_requires_kind() {
        assert!(Cli::try_parse_from(["casely", "split", "table.md", "results"]).is_err());
    }
}
