//! Mob Proto Editor CLI
//!
//! Command-line tool for viewing, searching and mass-editing Metin2 mob_proto tables.

use clap::{Parser, Subcommand, ValueEnum};
use mob_core::{
    editable_columns, Editor, MassEditFile, MassEditSpec, MassEditSummary, RowSelection,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mob-cli")]
#[command(about = "Metin2 mob_proto editor", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a mob_proto file and display it with resolved names
    Show {
        /// Path to mob_proto.txt
        proto: PathBuf,

        /// Path to mob_names.txt (defaults to the file beside mob_proto.txt)
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Columns to display (comma-separated)
        #[arg(short, long)]
        columns: Option<String>,

        /// Only show rows whose VNUM or name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Find rows by VNUM or name
    Search {
        /// Path to mob_proto.txt
        proto: PathBuf,

        /// Text to look for (case-insensitive)
        query: String,

        /// Path to mob_names.txt
        #[arg(short, long)]
        names: Option<PathBuf>,
    },

    /// List the numeric columns available for mass editing
    Columns {
        /// Path to mob_proto.txt
        proto: PathBuf,
    },

    /// Apply bulk edits and save with a backup
    MassEdit {
        /// Path to mob_proto.txt
        proto: PathBuf,

        /// Path to mob_names.txt
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Edit as COLUMN:operation:value (operation is multiply, add or set)
        #[arg(short, long = "edit")]
        edits: Vec<String>,

        /// Mass-edit file (JSON)
        #[arg(long)]
        spec: Option<PathBuf>,

        /// Row indices to edit (comma-separated, default: all rows)
        #[arg(short, long, value_delimiter = ',')]
        rows: Vec<usize>,

        /// Write to this path instead of overwriting mob_proto.txt
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Repair mis-encoded names in mob_names.txt and rewrite it as UTF-8
    FixNames {
        /// Path to mob_names.txt
        names: PathBuf,
    },

    /// Create a mass-edit file template
    CreateEdit {
        /// Output path for the mass-edit file
        #[arg(short, long)]
        output: PathBuf,

        /// Edits to include (COLUMN:operation:value)
        #[arg(short, long = "edit")]
        edits: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so table output on stdout stays clean
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> mob_core::Result<()> {
    match command {
        Commands::Show {
            proto,
            names,
            limit,
            columns,
            search,
            format,
        } => cmd_show(&proto, names.as_deref(), limit, columns, search, format),
        Commands::Search {
            proto,
            query,
            names,
        } => cmd_search(&proto, &query, names.as_deref()),
        Commands::Columns { proto } => cmd_columns(&proto),
        Commands::MassEdit {
            proto,
            names,
            edits,
            spec,
            rows,
            output,
            dry_run,
        } => cmd_mass_edit(
            &proto,
            names.as_deref(),
            &edits,
            spec.as_deref(),
            rows,
            output.as_deref(),
            dry_run,
        ),
        Commands::FixNames { names } => cmd_fix_names(&names),
        Commands::CreateEdit { output, edits } => cmd_create_edit(&output, &edits),
    }
}

fn open_editor(proto: &Path, names: Option<&Path>) -> mob_core::Result<Editor> {
    let mut editor = match names {
        Some(path) => Editor::with_names_file(path),
        None => Editor::new(),
    };
    let report = editor.open(proto)?;
    tracing::debug!(names = ?editor.names_path(), lookup = editor.names().len(), "editor ready");

    eprintln!(
        "Loaded {} mobs from {} ({} encoding, {} names from lookup)",
        report.rows,
        report.path.display(),
        report.encoding,
        report.names_from_lookup
    );
    Ok(editor)
}

fn cmd_show(
    proto: &Path,
    names: Option<&Path>,
    limit: Option<usize>,
    columns: Option<String>,
    search: Option<String>,
    format: OutputFormat,
) -> mob_core::Result<()> {
    let editor = open_editor(proto, names)?;
    let table = editor.table().ok_or(mob_core::Error::NoTableLoaded)?;

    let rows = editor.search(search.as_deref().unwrap_or(""));

    // Filter columns if specified
    let col_filter: Option<Vec<&str>> = columns.as_ref().map(|c| c.split(',').collect());
    let display_cols: Vec<&mob_core::Column> = match &col_filter {
        Some(filter) => table
            .columns
            .iter()
            .filter(|c| filter.contains(&c.name.as_str()))
            .collect(),
        None => table.columns.iter().collect(),
    };

    let row_limit = limit.unwrap_or(rows.len());

    if let OutputFormat::Json = format {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
            .iter()
            .take(row_limit)
            .map(|&row| {
                display_cols
                    .iter()
                    .map(|col| {
                        let value = editor.display_cell(row, col.index).unwrap_or_default();
                        (col.name.clone(), serde_json::Value::from(value))
                    })
                    .collect()
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    // Print header
    let header: Vec<&str> = display_cols.iter().map(|c| c.name.as_str()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    for &row in rows.iter().take(row_limit) {
        let values: Vec<&str> = display_cols
            .iter()
            .map(|col| editor.display_cell(row, col.index).unwrap_or_default())
            .collect();
        println!("{}", values.join("\t"));
    }

    if rows.len() > row_limit {
        println!("... ({} more rows)", rows.len() - row_limit);
    }

    Ok(())
}

fn cmd_search(proto: &Path, query: &str, names: Option<&Path>) -> mob_core::Result<()> {
    let editor = open_editor(proto, names)?;
    let rows = editor.search(query);

    for &row in &rows {
        println!(
            "{}\t{}\t{}",
            row,
            editor.display_cell(row, 0).unwrap_or_default(),
            editor.display_cell(row, 1).unwrap_or_default()
        );
    }
    println!("{} matching mobs", rows.len());

    Ok(())
}

fn cmd_columns(proto: &Path) -> mob_core::Result<()> {
    let table = mob_core::load_proto(proto)?;
    let columns = editable_columns(&table);

    if columns.is_empty() {
        println!("No editable columns found in {}", proto.display());
        return Ok(());
    }

    for column in columns {
        let presets: Vec<String> = column
            .presets
            .iter()
            .map(|p| format!("{} ({} {})", p.label, p.operation, p.operand))
            .collect();
        if presets.is_empty() {
            println!("{:<14}{}", column.name, column.description);
        } else {
            println!(
                "{:<14}{}  [presets: {}]",
                column.name,
                column.description,
                presets.join(", ")
            );
        }
    }

    Ok(())
}

fn collect_specs(edits: &[String], spec_file: Option<&Path>) -> mob_core::Result<Vec<MassEditSpec>> {
    let mut specs = Vec::new();

    if let Some(path) = spec_file {
        let file = MassEditFile::load(path)?;
        if let Some(description) = &file.description {
            eprintln!("Mass edit: {}", description);
        }
        specs.extend(file.edits);
    }

    for edit in edits {
        specs.push(MassEditSpec::parse_triple(edit)?);
    }

    for spec in &specs {
        spec.validate()?;
    }

    Ok(specs)
}

fn print_summary(summary: &MassEditSummary) {
    for (reason, count) in summary.skip_counts() {
        println!("  skipped {} cells: {:?}", count, reason);
    }
}

fn cmd_mass_edit(
    proto: &Path,
    names: Option<&Path>,
    edits: &[String],
    spec_file: Option<&Path>,
    rows: Vec<usize>,
    output: Option<&Path>,
    dry_run: bool,
) -> mob_core::Result<()> {
    let specs = collect_specs(edits, spec_file)?;
    if specs.is_empty() {
        println!("No edits given.");
        return Ok(());
    }

    let mut editor = open_editor(proto, names)?;
    let selection = RowSelection::from_rows(rows);
    let summary = editor.mass_edit(&specs, &selection)?;

    if summary.no_changes() {
        println!("No changes were applied");
        print_summary(&summary);
        return Ok(());
    }

    println!("Applied {} changes", summary.applied());
    print_summary(&summary);

    if dry_run {
        for outcome in &summary.outcomes {
            if let mob_core::CellOutcome::Applied {
                row,
                column,
                old,
                new,
            } = outcome
            {
                println!("  row {} {}: {} -> {}", row, column, old, new);
            }
        }
        return Ok(());
    }

    let report = match output {
        Some(path) => editor.save_as(path)?,
        None => editor.save()?,
    };

    println!("Saved {} rows to {}", report.rows_written, report.path.display());
    if let Some(backup) = &report.backup {
        println!("Backup created: {}", backup.display());
    }

    Ok(())
}

fn cmd_fix_names(names: &Path) -> mob_core::Result<()> {
    let (report, _) = mob_core::repair_names_file(names)?;

    println!("Fixed {} encoding issues in {}", report.lines_changed, report.path.display());
    println!("Read as {}, saved as UTF-8", report.encoding);
    println!("Backup created: {}", report.backup.display());
    println!("{} names loaded", report.names_loaded);

    Ok(())
}

fn cmd_create_edit(output: &Path, edits: &[String]) -> mob_core::Result<()> {
    let mut file = MassEditFile::new();

    for edit in edits {
        match MassEditSpec::parse_triple(edit) {
            Ok(spec) => file.add_edit(spec),
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    // If no edits provided, add a placeholder
    if file.edits.is_empty() {
        file.description = Some("Double experience for all mobs".to_string());
        file.add_edit(MassEditSpec::new("EXP", "multiply", "2"));
    }

    file.save(output)?;
    println!("Created mass-edit file: {}", output.display());
    println!("Edits: {}", file.edits.len());
    println!();
    println!("Edit the file to add your changes, then run:");
    println!(
        "  mob-cli mass-edit <mob_proto.txt> --spec {}",
        output.display()
    );

    Ok(())
}
