//! Headless commands for scripting and batch runs
//!
//! Usage:
//!   abook scan <src>                   List audiobook units
//!   abook preview <src> <dest>         Show what organize would do
//!   abook organize <src> <dest>        Copy/move/link units into place
//!   abook reorganize <library>         Move misplaced units within a library
//!   abook duplicates <src>             Report near-identical author/narrator names
//!   abook sidecar <unit-dir>           Write a sidecar from extracted metadata
//!
//! Options:
//!   --op <kind>              copy, move, hardlink or symlink
//!   --preserve-diacritics    Keep accents in generated paths
//!   --threshold <0..1>       Similarity threshold for duplicate names
//!   --verify <mode>          none, size or checksum
//!   --no-cleanup             Keep empty source directories after moves
//!   --json                   Output in JSON format
//!   --csv <file>             Also export the preview to CSV
//!   --verbose                Debug logging on stderr

use std::path::{Path, PathBuf};
use std::thread;

use abook_core::dedup::{find_key_collisions, tally, DuplicateDetector, DuplicateGroup, DuplicateKey};
use abook_core::overrides::{AbsMetadataFormatter, NfoFormatter, LIST_SEPARATOR};
use abook_core::preview::{export, IssueSeverity, PreviewAction, PreviewResult};
use abook_core::utils::format_bytes;
use abook_core::{
    progress, DirectoryScanner, FileOrganizer, MetadataExtractor, MetadataOverride,
    OperationKind, OrganizationResult, OrganizeProgress, OrganizerConfig, PreviewGenerator,
    PreviewOptions, ScanOptions, SidecarWriter, VerifyMode, WriteStatus,
};
use anyhow::{bail, Context};
use tracing::{debug, warn};

/// Sidecar format written by `abook sidecar`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SidecarKind {
    #[default]
    BookInfo,
    Abs,
    Nfo,
}

/// CLI command to execute
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Scan {
        source: PathBuf,
    },
    Preview {
        source: PathBuf,
        destination: PathBuf,
    },
    Organize {
        source: PathBuf,
        destination: PathBuf,
    },
    Reorganize {
        library: PathBuf,
    },
    Duplicates {
        source: PathBuf,
    },
    Sidecar {
        unit_dir: PathBuf,
        force: bool,
        kind: SidecarKind,
    },
}

/// CLI options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub json: bool,
    pub verbose: bool,
    pub operation: Option<OperationKind>,
    pub preserve_diacritics: bool,
    pub threshold: Option<f64>,
    pub verify: Option<VerifyMode>,
    pub no_cleanup: bool,
    pub csv: Option<PathBuf>,
    /// Library root used for folder-hierarchy analysis by `sidecar`
    pub root: Option<PathBuf>,
}

impl CliOptions {
    /// Persistent config with command-line overrides applied
    pub fn apply(&self, mut config: OrganizerConfig) -> OrganizerConfig {
        if let Some(op) = self.operation {
            config.operation = op;
        }
        if self.preserve_diacritics {
            config.preserve_diacritics = true;
        }
        if let Some(threshold) = self.threshold {
            config.duplicate_threshold = threshold;
        }
        if let Some(verify) = self.verify {
            config.verify = verify;
        }
        if self.no_cleanup {
            config.cleanup_empty_dirs = false;
        }
        config
    }
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<String> = None;
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut force = false;
    let mut kind = SidecarKind::BookInfo;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--verbose" | "-v" => options.verbose = true,
            "--preserve-diacritics" => options.preserve_diacritics = true,
            "--no-cleanup" => options.no_cleanup = true,
            "--force" => force = true,
            "--nfo" => kind = SidecarKind::Nfo,
            "--abs" => kind = SidecarKind::Abs,
            "--op" => {
                let value = take_value(args, &mut i, "--op")?;
                options.operation = Some(value.parse().map_err(|e| format!("{}", e))?);
            }
            "--verify" => {
                let value = take_value(args, &mut i, "--verify")?;
                options.verify = Some(value.parse().map_err(|e| format!("{}", e))?);
            }
            "--threshold" => {
                let value = take_value(args, &mut i, "--threshold")?;
                options.threshold = Some(parse_threshold(value)?);
            }
            "--csv" => {
                options.csv = Some(PathBuf::from(take_value(args, &mut i, "--csv")?));
            }
            "--root" => {
                options.root = Some(PathBuf::from(take_value(args, &mut i, "--root")?));
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ if command.is_none() => command = Some(arg.clone()),
            _ => positional.push(PathBuf::from(arg)),
        }
        i += 1;
    }

    let Some(name) = command else {
        return Err(
            "No command specified. Use: scan, preview, organize, reorganize, duplicates or sidecar"
                .to_string(),
        );
    };

    let expect = |count: usize, usage: &str| -> Result<Vec<PathBuf>, String> {
        if positional.len() != count {
            return Err(format!("Usage: abook {}", usage));
        }
        Ok(positional.clone())
    };

    let command = match name.as_str() {
        "scan" => {
            let mut p = expect(1, "scan <src>")?;
            CliCommand::Scan { source: p.remove(0) }
        }
        "preview" => {
            let mut p = expect(2, "preview <src> <dest>")?;
            let source = p.remove(0);
            CliCommand::Preview {
                source,
                destination: p.remove(0),
            }
        }
        "organize" => {
            let mut p = expect(2, "organize <src> <dest>")?;
            let source = p.remove(0);
            CliCommand::Organize {
                source,
                destination: p.remove(0),
            }
        }
        "reorganize" => {
            let mut p = expect(1, "reorganize <library>")?;
            CliCommand::Reorganize { library: p.remove(0) }
        }
        "duplicates" => {
            let mut p = expect(1, "duplicates <src>")?;
            CliCommand::Duplicates { source: p.remove(0) }
        }
        "sidecar" => {
            let mut p = expect(1, "sidecar <unit-dir> [--force] [--nfo|--abs]")?;
            CliCommand::Sidecar {
                unit_dir: p.remove(0),
                force,
                kind,
            }
        }
        other => return Err(format!("Unknown command: {}", other)),
    };

    Ok((command, options))
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid threshold: {}", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("Threshold must be within 0 and 1, got {}", s));
    }
    Ok(value)
}

/// Run CLI command
pub fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    let config = options.apply(OrganizerConfig::load());
    config.validate()?;
    debug!("Effective config: {:?}", config);

    match command {
        CliCommand::Scan { source } => run_scan(&source, &config, &options),
        CliCommand::Preview {
            source,
            destination,
        } => run_preview(&source, &destination, config, &options),
        CliCommand::Organize {
            source,
            destination,
        } => run_organize(&source, &destination, config, &options),
        CliCommand::Reorganize { library } => run_reorganize(&library, config, &options),
        CliCommand::Duplicates { source } => run_duplicates(&source, &config, &options),
        CliCommand::Sidecar {
            unit_dir,
            force,
            kind,
        } => run_sidecar(&unit_dir, force, kind, &config, &options),
    }
}

fn scan_options(config: &OrganizerConfig) -> ScanOptions {
    ScanOptions {
        strict_volume_names: config.strict_volume_names,
        split_single_file_books: config.split_single_file_books,
    }
}

fn run_scan(source: &Path, config: &OrganizerConfig, options: &CliOptions) -> anyhow::Result<()> {
    let summary = DirectoryScanner::new(source)
        .with_options(scan_options(config))
        .scan_summary()?;

    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "root": source.to_string_lossy(),
                "directories_scanned": summary.directories_scanned,
                "skipped_directories": summary.skipped_directories,
                "audio_files": summary.audio_files_found,
                "units": summary.units,
            })
        );
        return Ok(());
    }

    println!("Scan of {}:", source.display());
    println!("  Units:       {}", summary.units.len());
    println!("  Audio files: {}", summary.audio_files_found);
    println!("  Directories: {}", summary.directories_scanned);
    if summary.skipped_directories > 0 {
        println!("  Unreadable:  {}", summary.skipped_directories);
    }
    println!();
    for unit in &summary.units {
        let mut flags = Vec::new();
        if unit.is_multi_volume {
            flags.push(format!("{} volumes", unit.volumes.len()));
        }
        if unit.is_single_file {
            flags.push("single file".to_string());
        }
        if unit.markers.ignored {
            flags.push("ignored".to_string());
        }
        if unit.markers.published {
            flags.push("published".to_string());
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {} ({} files, {}){}",
            unit.name(),
            unit.file_count(),
            format_bytes(unit.total_size),
            flags
        );
    }
    Ok(())
}

fn build_preview(
    source: &Path,
    destination: &Path,
    config: OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<PreviewResult> {
    let preview_options = PreviewOptions::from_config(&config);
    let result = PreviewGenerator::new(config).preview(source, destination, &preview_options)?;

    if let Some(ref csv) = options.csv {
        export::to_csv(&result, csv)
            .with_context(|| format!("Failed to export preview to {}", csv.display()))?;
    }
    Ok(result)
}

fn run_preview(
    source: &Path,
    destination: &Path,
    config: OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<()> {
    let result = build_preview(source, destination, config, options)?;
    print_preview_result(&result, options);
    Ok(())
}

fn run_organize(
    source: &Path,
    destination: &Path,
    config: OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<()> {
    let preview = build_preview(source, destination, config.clone(), options)?;
    if preview.has_errors() {
        warn!("Refusing to organize {}: preview has errors", source.display());
        print_preview_result(&preview, options);
        bail!(
            "Preview reported {} error(s); nothing was changed",
            preview.statistics.error_count
        );
    }

    let plans = preview.plans();
    let (organizer, printer) = organizer_with_progress(config, !options.json);
    let result = organizer.organize(&plans, source);
    drop(organizer);
    finish_progress(printer);

    let result = result?;
    print_organization_result(&result, options);
    if !result.success() {
        bail!("{} unit(s) failed", result.failed);
    }
    Ok(())
}

fn run_reorganize(
    library: &Path,
    mut config: OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<()> {
    config.operation = OperationKind::Move;
    let (organizer, printer) = organizer_with_progress(config, !options.json);
    let result = organizer.reorganize(library);
    drop(organizer);
    finish_progress(printer);

    let result = result?;
    print_organization_result(&result, options);
    if !result.success() {
        bail!("{} unit(s) failed", result.failed);
    }
    Ok(())
}

/// Organizer whose progress goes through a lossy channel to a printer thread.
///
/// The printer ends once the organizer (and with it the sender) is dropped.
fn organizer_with_progress(
    config: OrganizerConfig,
    show_progress: bool,
) -> (FileOrganizer, Option<thread::JoinHandle<()>>) {
    let (callback, rx) = progress::channel::<OrganizeProgress>(64);
    let printer = show_progress.then(|| {
        thread::spawn(move || {
            for update in rx {
                eprint!(
                    "\r[{}/{}] {:>5.1}% {}",
                    (update.unit_index + 1).min(update.unit_total),
                    update.unit_total,
                    update.percent,
                    update.unit_name
                );
            }
        })
    });
    let organizer = FileOrganizer::from_config(config).with_progress_callback(callback);
    (organizer, printer)
}

fn finish_progress(printer: Option<thread::JoinHandle<()>>) {
    if let Some(handle) = printer {
        let _ = handle.join();
        eprintln!();
    }
}

fn run_duplicates(
    source: &Path,
    config: &OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<()> {
    let units = DirectoryScanner::new(source)
        .with_options(scan_options(config))
        .scan()?;
    let extractor = MetadataExtractor::from_config(source, config);
    let metadata: Vec<_> = units.iter().map(|u| extractor.extract(u)).collect();

    let detector = DuplicateDetector::new();
    let separator = LIST_SEPARATOR.trim();
    let authors = tally(
        metadata
            .iter()
            .filter_map(|m| m.consolidated.author())
            .flat_map(|a| a.split(separator)),
    );
    let narrators = tally(
        metadata
            .iter()
            .filter_map(|m| m.consolidated.narrator())
            .flat_map(|n| n.split(separator)),
    );
    let author_groups = detector.group(&authors, config.duplicate_threshold);
    let narrator_groups = detector.group(&narrators, config.duplicate_threshold);

    let books = find_key_collisions(metadata.iter().filter_map(|m| {
        let author = m.consolidated.author()?;
        let title = m.consolidated.title()?;
        Some((DuplicateKey::new(author, title), m.unit_path.clone()))
    }));

    if options.json {
        let books: Vec<_> = books
            .iter()
            .map(|m| {
                serde_json::json!({
                    "key": m.key.as_str(),
                    "existing": m.existing.to_string_lossy(),
                    "duplicate": m.duplicate.to_string_lossy(),
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "threshold": config.duplicate_threshold,
                "authors": author_groups,
                "narrators": narrator_groups,
                "books": books,
            })
        );
        return Ok(());
    }

    print_groups("Authors", &author_groups);
    print_groups("Narrators", &narrator_groups);
    if books.is_empty() {
        println!("No duplicate books.");
    } else {
        println!("Duplicate books:");
        for m in &books {
            println!("  {}", m.duplicate.display());
            println!("    same author and title as {}", m.existing.display());
        }
    }
    Ok(())
}

fn print_groups(role: &str, groups: &[DuplicateGroup]) {
    if groups.is_empty() {
        println!("{}: no similar spellings.", role);
        println!();
        return;
    }
    println!("{}:", role);
    for group in groups {
        println!("  {} ({} units)", group.canonical, group.total_count());
        for variant in &group.variants {
            if variant.name != group.canonical {
                println!("    ~ {} ({})", variant.name, variant.count);
            }
        }
    }
    println!();
}

fn run_sidecar(
    unit_dir: &Path,
    force: bool,
    kind: SidecarKind,
    config: &OrganizerConfig,
    options: &CliOptions,
) -> anyhow::Result<()> {
    let scan = ScanOptions {
        split_single_file_books: false,
        ..scan_options(config)
    };
    let unit = DirectoryScanner::new(unit_dir)
        .with_options(scan)
        .scan()?
        .into_iter()
        .find(|u| u.directory_path() == unit_dir)
        .with_context(|| format!("No audiobook found in {}", unit_dir.display()))?;

    let root = options
        .root
        .clone()
        .or_else(|| unit_dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| unit_dir.to_path_buf());
    let metadata = MetadataExtractor::from_config(root, config).extract(&unit);
    let values = MetadataOverride::from_consolidated(&metadata.consolidated);

    let writer = match kind {
        SidecarKind::BookInfo => SidecarWriter::new(),
        SidecarKind::Abs => SidecarWriter::with_formatter(Box::new(AbsMetadataFormatter)),
        SidecarKind::Nfo => SidecarWriter::with_formatter(Box::new(NfoFormatter)),
    };
    write_sidecar(writer, unit_dir, &values, force, options)
}

fn write_sidecar(
    writer: SidecarWriter,
    unit_dir: &Path,
    values: &MetadataOverride,
    force: bool,
    options: &CliOptions,
) -> anyhow::Result<()> {
    let status = writer.write(unit_dir, values, force)?;
    let file = unit_dir.join(writer.file_name());

    if options.json {
        println!(
            "{}",
            serde_json::json!({
                "file": file.to_string_lossy(),
                "status": status,
                "values": values,
            })
        );
        return Ok(());
    }

    match status {
        WriteStatus::Written => println!("Wrote {}", file.display()),
        WriteStatus::SkippedExisting => {
            println!("{} already exists (use --force to overwrite)", file.display())
        }
        WriteStatus::Protected => println!(
            "{} holds manually curated metadata; left untouched",
            unit_dir.display()
        ),
    }
    Ok(())
}

fn print_preview_result(result: &PreviewResult, options: &CliOptions) {
    if options.json {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize preview: {}", e),
        }
        return;
    }

    let stats = &result.statistics;
    println!("Preview ({}):", result.operation);
    println!("  Units:       {}", stats.total_units);
    println!("  To organize: {} ({})", stats.to_process, format_bytes(stats.bytes_to_process));
    println!("  Skip:        {}", stats.to_skip);
    println!(
        "  Issues:      {} errors, {} warnings, {} info",
        stats.error_count, stats.warning_count, stats.info_count
    );
    println!("  Confidence:  {:.0}%", stats.average_confidence * 100.0);
    println!();

    for op in &result.operations {
        let marker = match op.action {
            PreviewAction::Organize => "->",
            PreviewAction::Skip => "--",
        };
        println!("  {} {}", marker, op.display_name());
        println!("       {}", op.source.display());
        println!("    {} {}", marker, op.destination.display());
        for issue in &op.issues {
            println!("       {}: {}", issue.severity, issue.message);
        }
    }

    if !result.issues.is_empty() {
        println!();
        println!("Library issues:");
        for issue in &result.issues {
            println!("  {}: {}", issue.severity, issue.message);
        }
    }

    let errors = result.operations_with(IssueSeverity::Error).count();
    if errors > 0 {
        println!();
        println!("{} unit(s) have errors and block organizing.", errors);
    }
}

fn print_organization_result(result: &OrganizationResult, options: &CliOptions) {
    if options.json {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize result: {}", e),
        }
        return;
    }

    println!("Organize {}:", if result.cancelled { "Cancelled" } else { "Complete" });
    println!("  Succeeded: {}", result.succeeded);
    println!("  Failed:    {}", result.failed);
    println!("  Skipped:   {}", result.skipped);
    println!("  Files:     {} ({})", result.files, result.size_display());
    if result.removed_directories > 0 {
        println!("  Removed:   {} empty directories", result.removed_directories);
    }
    println!("  Took:      {:.1}s", result.duration.as_secs_f64());

    let failures: Vec<_> = result.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("Errors:");
        for outcome in failures {
            println!(
                "  - {}: {}",
                outcome.source.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Print CLI help
pub fn print_help() {
    println!("abook v{}", env!("CARGO_PKG_VERSION"));
    println!("Organize audiobook folders into Author/[Series/]Title");
    println!();
    println!("USAGE:");
    println!("    abook <command> [options]");
    println!();
    println!("COMMANDS:");
    println!("    scan <src>                  List audiobook units");
    println!("    preview <src> <dest>        Show what organize would do");
    println!("    organize <src> <dest>       Copy/move/link units into place");
    println!("    reorganize <library>        Move misplaced units within a library");
    println!("    duplicates <src>            Report near-identical names and books");
    println!("    sidecar <unit-dir>          Write bookinfo.json from extracted metadata");
    println!();
    println!("OPTIONS:");
    println!("    --op <kind>                 copy, move, hardlink or symlink");
    println!("    --preserve-diacritics       Keep accents in generated paths");
    println!("    --threshold <0..1>          Similarity threshold for duplicate names");
    println!("    --verify <mode>             none, size or checksum");
    println!("    --no-cleanup                Keep empty source directories after moves");
    println!("    --json                      Output in JSON format");
    println!("    --csv <file>                Export the preview to CSV");
    println!("    --verbose                   Debug logging on stderr");
    println!();
    println!("SIDECAR OPTIONS:");
    println!("    --force                     Overwrite an existing generated sidecar");
    println!("    --nfo                       Write metadata.nfo instead");
    println!("    --abs                       Write metadata.json instead");
    println!("    --root <library>            Library root for folder analysis");
    println!();
    println!("EXAMPLES:");
    println!("    abook preview ~/incoming ~/Audiobooks --csv preview.csv");
    println!("    abook organize ~/incoming ~/Audiobooks --op move --verify checksum");
    println!("    abook duplicates ~/Audiobooks --threshold 0.9 --json");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_scan() {
        let (cmd, _) = parse_args(&args(&["scan", "/books"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Scan {
                source: PathBuf::from("/books")
            }
        );
    }

    #[test]
    fn test_parse_args_organize_with_options() {
        let (cmd, options) = parse_args(&args(&[
            "organize",
            "/in",
            "--op",
            "move",
            "/out",
            "--verify",
            "checksum",
            "--no-cleanup",
        ]))
        .unwrap();
        assert_eq!(
            cmd,
            CliCommand::Organize {
                source: PathBuf::from("/in"),
                destination: PathBuf::from("/out"),
            }
        );
        assert_eq!(options.operation, Some(OperationKind::Move));
        assert_eq!(options.verify, Some(VerifyMode::Checksum));
        assert!(options.no_cleanup);
    }

    #[test]
    fn test_parse_args_sidecar_flags() {
        let (cmd, _) = parse_args(&args(&["sidecar", "/lib/A/B", "--force", "--nfo"])).unwrap();
        assert_eq!(
            cmd,
            CliCommand::Sidecar {
                unit_dir: PathBuf::from("/lib/A/B"),
                force: true,
                kind: SidecarKind::Nfo,
            }
        );
    }

    #[test]
    fn test_parse_args_json_and_csv() {
        let (_, options) =
            parse_args(&args(&["preview", "/in", "/out", "--json", "--csv", "out.csv"])).unwrap();
        assert!(options.json);
        assert_eq!(options.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["sync", "/in"])).is_err());
        assert!(parse_args(&args(&["preview", "/in"])).is_err());
        assert!(parse_args(&args(&["scan", "/in", "--op"])).is_err());
        assert!(parse_args(&args(&["scan", "/in", "--op", "teleport"])).is_err());
        assert!(parse_args(&args(&["scan", "/in", "--bogus"])).is_err());
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.9").unwrap(), 0.9);
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_options_override_config() {
        let options = CliOptions {
            operation: Some(OperationKind::HardLink),
            preserve_diacritics: true,
            threshold: Some(0.8),
            no_cleanup: true,
            ..Default::default()
        };
        let config = options.apply(OrganizerConfig::default());
        assert_eq!(config.operation, OperationKind::HardLink);
        assert!(config.preserve_diacritics);
        assert_eq!(config.duplicate_threshold, 0.8);
        assert!(!config.cleanup_empty_dirs);
    }

    #[test]
    fn test_sidecar_command_writes_bookinfo() {
        let temp = tempfile::tempdir().unwrap();
        let unit = temp.path().join("Frank Herbert").join("Dune");
        std::fs::create_dir_all(&unit).unwrap();
        std::fs::write(unit.join("01.mp3"), b"not really audio").unwrap();

        let options = CliOptions {
            json: true,
            root: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        run_sidecar(&unit, false, SidecarKind::BookInfo, &OrganizerConfig::default(), &options)
            .unwrap();

        let written = MetadataOverride::from_file(&unit.join("bookinfo.json")).unwrap();
        assert_eq!(written.title.as_deref(), Some("Dune"));
        assert!(!written.is_manual());
    }
}
