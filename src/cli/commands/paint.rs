//! `botes paint` command - Paint can management

use clap::{Subcommand, ValueEnum};
use console::{style, Term};
use csv::ReaderBuilder;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::cli::commands::utils::{resolve_reference, Workspace};
use crate::cli::helpers::{format_short_id, truncate_str};
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::wizard::PaintWizard;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::color::{ColorHex, ColorMode, ColorResolver};
use crate::core::identity::RecordId;
use crate::core::project::Project;
use crate::core::query::{MixFilter, Query, SortKey};
use crate::core::shortid::ShortIdIndex;
use crate::entities::paint::{check_percent, Paint, PERCENT_MAX};

#[derive(Subcommand, Debug)]
pub enum PaintCommands {
    /// List paint cans with search, filtering and sorting
    List(ListArgs),

    /// Add a new paint can
    New(NewArgs),

    /// Show a paint can's details
    Show(ShowArgs),

    /// Change fields of a paint can
    Edit(EditArgs),

    /// Remove a paint can
    Delete(DeleteArgs),

    /// Add paint cans from a CSV file
    Import(ImportArgs),
}

/// Mix-state filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MixArg {
    /// Every can
    All,
    /// Only cans not mixed with water
    Pure,
    /// Only cans mixed with water
    Diluted,
}

impl From<MixArg> for MixFilter {
    fn from(arg: MixArg) -> Self {
        match arg {
            MixArg::All => MixFilter::All,
            MixArg::Pure => MixFilter::PureOnly,
            MixArg::Diluted => MixFilter::DilutedOnly,
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    /// Store order (oldest first)
    Default,
    /// Name, A to Z
    Name,
    /// Fullest cans first
    PercentDesc,
    /// Emptiest cans first
    PercentAsc,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Default => SortKey::Default,
            SortArg::Name => SortKey::NameAscending,
            SortArg::PercentDesc => SortKey::PercentDescending,
            SortArg::PercentAsc => SortKey::PercentAscending,
        }
    }
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Name,
    Code,
    Color,
    Mix,
    Percent,
}

impl ListColumn {
    fn key(self) -> &'static str {
        match self {
            ListColumn::Id => "id",
            ListColumn::Name => "name",
            ListColumn::Code => "code",
            ListColumn::Color => "color",
            ListColumn::Mix => "mix",
            ListColumn::Percent => "percent",
        }
    }
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

const PAINT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 17),
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("code", "CODE", 22),
    ColumnDef::new("color", "COLOR", 11),
    ColumnDef::new("mix", "MIX", 6),
    ColumnDef::new("percent", "LEFT", 6),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in name and code (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by mix state
    #[arg(long, short = 'm', default_value = "all")]
    pub mix: MixArg,

    /// Sort order
    #[arg(long, default_value = "default")]
    pub sort: SortArg,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Name,
        ListColumn::Code,
        ListColumn::Color,
        ListColumn::Mix,
        ListColumn::Percent
    ])]
    pub columns: Vec<ListColumn>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Can name (required unless interactive)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Manufacturer code (required unless interactive)
    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Paint is mixed with water
    #[arg(long)]
    pub mixed: bool,

    /// Remaining quantity, 0-100 in steps of 5
    #[arg(long, short = 'p', value_parser = parse_percent, default_value_t = PERCENT_MAX)]
    pub percent: u8,

    /// Display color as #RRGGBB (only with color_mode: picker)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<ColorHex>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Can id, id prefix, short id (@N) or name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Can id, id prefix, short id (@N) or name
    pub id: String,

    /// New name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// New manufacturer code
    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Mark as mixed with water
    #[arg(long, conflicts_with = "pure")]
    pub mixed: bool,

    /// Mark as not mixed with water
    #[arg(long)]
    pub pure: bool,

    /// Remaining quantity, 0-100 in steps of 5
    #[arg(long, short = 'p', value_parser = parse_percent)]
    pub percent: Option<u8>,

    /// Display color as #RRGGBB (only with color_mode: picker)
    #[arg(long, value_parser = parse_color)]
    pub color: Option<ColorHex>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Can id, id prefix, short id (@N) or name
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with columns name,code,mixed,percent[,color]
    pub file: PathBuf,

    /// Validate CSV without creating cans
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

fn parse_percent(s: &str) -> std::result::Result<u8, String> {
    let value: u32 = s
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", s))?;
    check_percent(value).map_err(|e| e.to_string())
}

fn parse_color(s: &str) -> std::result::Result<ColorHex, String> {
    s.parse().map_err(|e: crate::core::color::ColorError| e.to_string())
}

/// Run a paint subcommand
pub fn run(cmd: PaintCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PaintCommands::List(args) => run_list(args, global),
        PaintCommands::New(args) => run_new(args, global),
        PaintCommands::Show(args) => run_show(args, global),
        PaintCommands::Edit(args) => run_edit(args, global),
        PaintCommands::Delete(args) => run_delete(args, global),
        PaintCommands::Import(args) => run_import(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let store = ws.store()?;
    let cans = store.find_all()?;

    let query = Query::new()
        .search(args.search.unwrap_or_default())
        .mix(args.mix.into())
        .sort(args.sort.into());
    let mut cans = query.apply(&cans);
    tracing::debug!(?query, matched = cans.len(), "query applied");

    if let Some(limit) = args.limit {
        cans.truncate(limit);
    }

    if args.count {
        println!("{}", cans.len());
        return Ok(());
    }

    if cans.is_empty() {
        if !global.quiet {
            println!("No paint cans found.");
        }
        return Ok(());
    }

    // @N follows the rows the user just saw
    let mut short_ids = ShortIdIndex::load(&ws.project);
    short_ids.rebuild(cans.iter().map(|c| c.id));
    save_short_ids(&short_ids, &ws.project);

    let format = global
        .format
        .resolve(ws.config.default_format.as_deref(), OutputFormat::Tsv);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&cans).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&cans).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows = cans.iter().map(|can| {
                TableRow::new(can.id, &short_ids)
                    .cell("id", CellValue::Id(can.id))
                    .cell("name", CellValue::Text(can.paint.name.clone()))
                    .cell("code", CellValue::Text(can.paint.code.clone()))
                    .cell("color", CellValue::Swatch(can.paint.color))
                    .cell("mix", CellValue::Mix(can.paint.mix_state()))
                    .cell("percent", CellValue::Percent(can.paint.percent))
            });
            let visible: Vec<&str> = args.columns.iter().map(|c| c.key()).collect();

            let mut formatter = TableFormatter::new(PAINT_COLUMNS, "paint can");
            if global.quiet {
                formatter = formatter.with_config(TableConfig::for_pipe());
            }
            formatter.output(rows, format, &visible);
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let resolver = ws.config.resolver();
    let mode = ws.config.color_mode();

    let paint = if args.interactive {
        // Refuse before prompting; the wizard would otherwise drop the color
        mode.check_picked(args.color).map_err(|e| miette::miette!("{}", e))?;
        let defaults = Paint::new(
            args.name.unwrap_or_default(),
            args.code.unwrap_or_default(),
            args.color.unwrap_or_default(),
        )
        .with_mixed(args.mixed)
        .with_percent(args.percent);
        PaintWizard::new(&resolver, mode).run(&defaults)?
    } else {
        let name = args.name.ok_or_else(|| {
            miette::miette!("Name is required (use --name or -i for interactive)")
        })?;
        let code = args.code.ok_or_else(|| {
            miette::miette!("Code is required (use --code or -i for interactive)")
        })?;
        let color = resolver
            .assign(mode, &code, args.color)
            .map_err(|e| miette::miette!("{}", e))?;
        Paint::new(name.trim(), code.trim(), color)
            .with_mixed(args.mixed)
            .with_percent(args.percent)
    };

    paint.validate().map_err(|e| miette::miette!("{}", e))?;

    let mut store = ws.store()?;
    let id = store.insert(paint.clone())?;
    tracing::info!(%id, name = %paint.name, "paint can created");

    let mut short_ids = ShortIdIndex::load(&ws.project);
    let short_id = short_ids.add(id);
    save_short_ids(&short_ids, &ws.project);

    if matches!(global.format, OutputFormat::Id) {
        println!("{}", id);
        return Ok(());
    }

    println!(
        "{} Created paint can {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan()
    );
    if !global.quiet {
        println!("   {}", style(id).dim());
        print_summary(&paint);
    }

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let cans = ws.store()?.find_all()?;
    let short_ids = ShortIdIndex::load(&ws.project);
    let can = resolve_reference(&cans, &short_ids, &args.id)?;

    match global.format {
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(can).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(can).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Id => {
            println!("{}", can.id);
        }
        OutputFormat::ShortId => {
            if let Some(n) = short_ids.get_short_id(&can.id) {
                println!("@{}", n);
            }
        }
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!(
                "{}: {}",
                style("ID").bold(),
                style(&can.id.to_string()).cyan()
            );
            if let Some(n) = short_ids.get_short_id(&can.id) {
                println!("{}: {}", style("Short").bold(), style(format!("@{}", n)).cyan());
            }
            println!(
                "{}: {}",
                style("Name").bold(),
                style(&can.paint.name).yellow()
            );
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("Code").bold(), can.paint.code);
            println!(
                "{}: {} {}",
                style("Color").bold(),
                style("■■■").color256(can.paint.color.ansi256()),
                can.paint.color
            );
            println!("{}: {}", style("Mix").bold(), can.paint.mix_state());
            println!(
                "{}: {} {}%",
                style("Remaining").bold(),
                percent_bar(can.paint.percent),
                can.paint.percent
            );
            println!("{}", style("─".repeat(60)).dim());
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut store = ws.store()?;
    let cans = store.find_all()?;
    let short_ids = ShortIdIndex::load(&ws.project);
    let can = resolve_reference(&cans, &short_ids, &args.id)?;

    let updated = apply_edit(
        &can.paint,
        &args,
        &ws.config.resolver(),
        ws.config.color_mode(),
    )?;
    updated.validate().map_err(|e| miette::miette!("{}", e))?;

    store.update(&can.id, updated.clone())?;
    tracing::info!(id = %can.id, "paint can updated");

    println!(
        "{} Updated paint can {}",
        style("✓").green(),
        style(display_ref(&can.id, &short_ids)).cyan()
    );
    if !global.quiet {
        print_summary(&updated);
    }

    Ok(())
}

/// Overlay the changed fields on the stored record
///
/// The result is the complete replacement record. In code mode the color is
/// always derived again from the (possibly new) code.
fn apply_edit(
    current: &Paint,
    args: &EditArgs,
    resolver: &ColorResolver,
    mode: ColorMode,
) -> Result<Paint> {
    let mut paint = current.clone();

    if let Some(name) = &args.name {
        paint.name = name.trim().to_string();
    }
    if let Some(code) = &args.code {
        paint.code = code.trim().to_string();
    }
    if args.mixed {
        paint.mixed = true;
    }
    if args.pure {
        paint.mixed = false;
    }
    if let Some(percent) = args.percent {
        paint.percent = percent;
    }

    paint.color = match mode {
        ColorMode::Code => resolver
            .assign(mode, &paint.code, args.color)
            .map_err(|e| miette::miette!("{}", e))?,
        ColorMode::Picker => args.color.unwrap_or(current.color),
    };

    Ok(paint)
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let mut store = ws.store()?;
    let cans = store.find_all()?;
    let short_ids = ShortIdIndex::load(&ws.project);
    let can = resolve_reference(&cans, &short_ids, &args.id)?;

    if !args.yes {
        if !Term::stderr().is_term() {
            return Err(miette::miette!(
                "Refusing to delete '{}' without confirmation. Re-run with --yes.",
                can.paint.name
            ));
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete {} ({})?",
                style(&can.paint.name).yellow(),
                display_ref(&can.id, &short_ids)
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(&can.id)?;
    tracing::info!(id = %can.id, "paint can deleted");

    println!(
        "{} Deleted paint can {} ({})",
        style("✓").green(),
        style(&can.paint.name).yellow(),
        style(format_short_id(&can.id)).dim()
    );

    Ok(())
}

/// Import statistics
#[derive(Debug, Default, PartialEq, Eq)]
struct ImportStats {
    rows_processed: usize,
    created: usize,
    errors: usize,
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let ws = Workspace::open(global)?;
    let resolver = ws.config.resolver();
    let mode = ws.config.color_mode();

    println!(
        "{} Importing paint cans from {}{}",
        style("→").blue(),
        style(args.file.display()).yellow(),
        if args.dry_run { style(" (dry run)").dim().to_string() } else { String::new() }
    );
    println!();

    let rows = read_import_rows(&args.file)?;
    let mut store = ws.store()?;
    let mut short_ids = ShortIdIndex::load(&ws.project);
    let mut stats = ImportStats::default();
    let mut warned_color = false;

    for (row_num, row) in rows {
        stats.rows_processed += 1;

        let paint = match row.and_then(|row| {
            if mode == ColorMode::Code && row.color.is_some() && !warned_color {
                warned_color = true;
                eprintln!(
                    "{} Ignoring the color column: colors come from the code (color_mode: code)",
                    style("!").yellow()
                );
            }
            row.into_paint(&resolver, mode)
        }) {
            Ok(paint) => paint,
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                stats.errors += 1;
                if !args.skip_errors {
                    // Rows before this one are already stored
                    if !args.dry_run {
                        save_short_ids(&short_ids, &ws.project);
                    }
                    return Err(miette::miette!(
                        "Import stopped at row {} after creating {} can(s): {}",
                        row_num,
                        stats.created,
                        e
                    ));
                }
                continue;
            }
        };

        if args.dry_run {
            println!(
                "{} Row {}: Would create {} ({}) {}",
                style("○").dim(),
                row_num,
                truncate_str(&paint.name, 30),
                paint.code,
                paint.color
            );
            continue;
        }

        let id = store.insert(paint.clone())?;
        let short_id = short_ids.add(id);
        stats.created += 1;
        println!(
            "{} Row {}: Created {} - {} ({})",
            style("✓").green(),
            row_num,
            style(format!("@{}", short_id)).cyan(),
            truncate_str(&paint.name, 30),
            paint.code
        );
    }

    if !args.dry_run {
        save_short_ids(&short_ids, &ws.project);
    }
    tracing::info!(?stats, "import finished");

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed: {}", style(stats.rows_processed).cyan());
    println!("  Cans created:   {}", style(stats.created).green());
    if stats.errors > 0 {
        println!("  Errors:         {}", style(stats.errors).red());
    }

    if args.dry_run {
        println!();
        println!("{}", style("Dry run complete. No cans were created.").yellow());
    }

    Ok(())
}

/// One CSV row, parsed but not yet validated
#[derive(Debug)]
struct ImportRow {
    name: String,
    code: String,
    mixed: bool,
    percent: u8,
    color: Option<ColorHex>,
}

impl ImportRow {
    fn into_paint(self, resolver: &ColorResolver, mode: ColorMode) -> std::result::Result<Paint, String> {
        let picked = match mode {
            ColorMode::Code => None,
            ColorMode::Picker => self.color,
        };
        let color = resolver
            .assign(mode, &self.code, picked)
            .map_err(|e| e.to_string())?;
        let paint = Paint::new(self.name, self.code, color)
            .with_mixed(self.mixed)
            .with_percent(self.percent);
        paint.validate().map_err(|e| e.to_string())?;
        Ok(paint)
    }
}

/// Read every data row; row numbers count the header as row 1
fn read_import_rows(path: &Path) -> Result<Vec<(usize, std::result::Result<ImportRow, String>)>> {
    let file = File::open(path).into_diagnostic()?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    for required in ["name", "code"] {
        if !header_map.contains_key(required) {
            return Err(miette::miette!(
                "CSV header is missing the '{}' column (expected name,code,mixed,percent[,color])",
                required
            ));
        }
    }

    let rows = rdr
        .records()
        .enumerate()
        .map(|(idx, result)| {
            let row = result
                .map_err(|e| format!("CSV parse error: {}", e))
                .and_then(|record| parse_row(&record, &header_map));
            (idx + 2, row)
        })
        .collect();
    Ok(rows)
}

fn parse_row(
    record: &csv::StringRecord,
    header_map: &HashMap<String, usize>,
) -> std::result::Result<ImportRow, String> {
    let name = get_field(record, header_map, "name")
        .ok_or_else(|| "Missing required field 'name'".to_string())?;
    let code = get_field(record, header_map, "code")
        .ok_or_else(|| "Missing required field 'code'".to_string())?;
    let mixed = match get_field(record, header_map, "mixed") {
        Some(value) => parse_flag(&value)?,
        None => false,
    };
    let percent = match get_field(record, header_map, "percent") {
        Some(value) => parse_percent(&value)?,
        None => PERCENT_MAX,
    };
    let color = get_field(record, header_map, "color")
        .map(|value| parse_color(&value))
        .transpose()?;

    Ok(ImportRow {
        name,
        code,
        mixed,
        percent,
        color,
    })
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "y" | "si" | "sí" | "1" | "x" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(format!("'{}' is not a yes/no value for 'mixed'", value)),
    }
}

/// Build a map of header names to column indices
fn build_header_map(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
fn get_field(
    record: &csv::StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn save_short_ids(short_ids: &ShortIdIndex, project: &Project) {
    if let Err(e) = short_ids.save(project) {
        tracing::warn!(error = %e, "could not save short id index");
    }
}

fn display_ref(id: &RecordId, short_ids: &ShortIdIndex) -> String {
    short_ids
        .get_short_id(id)
        .map(|n| format!("@{}", n))
        .unwrap_or_else(|| format_short_id(id))
}

fn print_summary(paint: &Paint) {
    println!("   Name: {}", style(&paint.name).yellow());
    println!("   Code: {}", paint.code);
    println!(
        "   Color: {} {}",
        style("■").color256(paint.color.ansi256()),
        paint.color
    );
    println!("   Mix: {} | Remaining: {}%", paint.mix_state(), paint.percent);
}

/// Twenty-cell gauge, one cell per 5%
fn percent_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(PERCENT_MAX) / 5);
    format!("{}{}", "█".repeat(filled), style("░".repeat(20 - filled)).dim())
}
