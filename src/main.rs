use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use underwater_patcher::backup::{backup_path_for, restore_all, RestoreOutcome};
use underwater_patcher::config::{
    apply_to_files, inspect_file, load_from_path, resolve, ApplyOptions, FileInspection,
    PartialParameters, PatchResult, ResolveError,
};
use underwater_patcher::locator::list_config_files;
use underwater_patcher::prompt::{parse_yes_no, InputError, Prompter};
use underwater_patcher::safety::DirectoryGuard;

/// Exit status after Ctrl-C or end of input at a prompt.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "underwater-patcher")]
#[command(
    about = "Adds automatic underwater outfit swapping to merged mod INI files",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch every INI file in a mod directory
    Apply {
        /// Mod directory containing the merged INI files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        parameters: ParameterArgs,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(long)]
        diff: bool,
    },

    /// Report whether each INI file can be patched
    Check {
        /// Mod directory containing the merged INI files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Put every `<file>.bak` back in place of its INI file
    Restore {
        /// Mod directory containing the merged INI files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

/// Run parameters; anything left out comes from the preset or a prompt.
#[derive(Args)]
struct ParameterArgs {
    /// TOML file with default answers
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Number of underwater outfits
    #[arg(long, alias = "num_outfits")]
    outfits: Option<usize>,

    /// Value of $swapvar for each underwater outfit
    #[arg(long, alias = "swapvar_values", num_args = 1.., value_delimiter = ',')]
    swap_values: Option<Vec<i64>>,

    /// Key toggling the automatic swap on and off
    #[arg(long, alias = "toggle_key")]
    toggle_key: Option<String>,

    /// Key cycling between underwater outfits (defaults to the [KeySwap] key)
    #[arg(long)]
    cycle_key: Option<String>,

    /// Frames to wait after leaving the water before restoring the outfit
    #[arg(long)]
    delay: Option<u32>,

    /// Only offer the underwater outfits underwater or with the swap off (y/n)
    #[arg(long, alias = "aks", value_parser = parse_yes_no)]
    underwater_only: Option<bool>,

    /// Read water detection from the global RemoveUnderwaterCensorship mod (y/n)
    #[arg(long, alias = "global_detection", value_parser = parse_yes_no)]
    global_detection: Option<bool>,

    /// Add the ORFix shader compatibility line (y/n)
    #[arg(long, value_parser = parse_yes_no)]
    shader_patch: Option<bool>,

    /// Game version is 4.0 or newer (y/n)
    #[arg(long, value_parser = parse_yes_no)]
    modern_game_version: Option<bool>,

    /// Restore the backups right after patching (y/n)
    #[arg(long, value_parser = parse_yes_no)]
    revert: Option<bool>,
}

impl From<ParameterArgs> for PartialParameters {
    fn from(args: ParameterArgs) -> Self {
        PartialParameters {
            outfits: args.outfits,
            swap_values: args.swap_values,
            toggle_key: args.toggle_key,
            cycle_key: args.cycle_key,
            delay: args.delay,
            underwater_only: args.underwater_only,
            global_detection: args.global_detection,
            shader_patch: args.shader_patch,
            modern_game_version: args.modern_game_version,
            revert: args.revert,
        }
    }
}

fn main() -> Result<()> {
    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Files are only replaced by atomic rename, so exiting mid-run leaves
    // each one either untouched or fully patched.
    ctrlc::set_handler(|| {
        eprintln!("{}", "Interrupted by user.".yellow());
        std::process::exit(EXIT_INTERRUPTED);
    })?;

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply {
            dir,
            parameters,
            dry_run,
            diff,
        } => cmd_apply(&dir, parameters, dry_run, diff),

        Commands::Check { dir, json } => cmd_check(&dir, json),

        Commands::Restore { dir } => cmd_restore(&dir),
    };

    // End of input at a prompt is reported like Ctrl-C
    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) if is_interrupt(&e) => {
            eprintln!("{}", "Interrupted by user.".yellow());
            std::process::exit(EXIT_INTERRUPTED)
        }
        Err(e) => Err(e),
    }
}

fn is_interrupt(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        matches!(cause.downcast_ref::<InputError>(), Some(InputError::Interrupted))
            || matches!(
                cause.downcast_ref::<ResolveError>(),
                Some(ResolveError::Input(InputError::Interrupted))
            )
    })
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

/// Split located files into patchable ones and the rest, with reasons.
fn gate(files: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for file in files {
        match inspect_file(&file) {
            Ok(inspection) => match inspection.missing {
                None => valid.push(file),
                Some(missing) => invalid.push((file, missing.to_string())),
            },
            Err(e) => invalid.push((file, e.to_string())),
        }
    }

    (valid, invalid)
}

fn cmd_apply(dir: &Path, parameters: ParameterArgs, dry_run: bool, show_diff: bool) -> Result<i32> {
    // 1. Locate and validate files
    let files = list_config_files(dir)?;
    let guard = DirectoryGuard::new(dir)?;
    println!("Mod directory: {}", guard.root().display());

    let (files, invalid) = gate(files);
    if !invalid.is_empty() {
        println!(
            "{}",
            "INFO: This tool only works on INI files generated by genshin_merge_mods.py".yellow()
        );
        println!("Invalid INI files:");
        for (file, reason) in &invalid {
            println!("  {} {} ({})", "✗".red(), file.display(), reason.dimmed());
        }
        println!();
    }
    if files.is_empty() {
        eprintln!("{}", "No valid INI files to patch.".red());
        return Ok(1);
    }

    // 2. Collect parameters: flags, then preset, then prompts
    let preset = match &parameters.preset {
        Some(path) => load_from_path(path)?,
        None => PartialParameters::default(),
    };
    let parameters = PartialParameters::from(parameters).or(preset);
    let mut prompter = Prompter::stdio();
    let run = resolve(parameters, &mut prompter)?;
    debug!(files = files.len(), dry_run, "applying");

    // 3. Patch
    if dry_run {
        println!("{}", "[DRY RUN - showing what would be applied]".cyan());
    }
    let results = apply_to_files(&files, &run.plan, &guard, ApplyOptions { dry_run });

    // 4. Report results
    let mut backups = Vec::new();
    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_failed = 0;

    for (file, result) in results {
        match result {
            Ok(PatchResult::Applied {
                backup,
                original,
                patched,
                notes,
                ..
            }) => {
                let verb = if dry_run { "Would patch" } else { "Patched" };
                println!("{} {} {}", "✓".green(), verb, file.display());
                if let Some(backup) = backup {
                    println!("  {}", format!("Created backup: {}", backup.display()).dimmed());
                    backups.push((file.clone(), backup));
                }
                for note in &notes {
                    println!("  {}", format!("note: {}", note).dimmed());
                }
                total_applied += 1;

                if show_diff {
                    display_diff(&file, &original, &patched);
                }
            }
            Ok(PatchResult::AlreadyApplied { .. }) => {
                println!("{} Already patched: {}", "⊙".yellow(), file.display());
                total_already_applied += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), file.display(), e);
                total_failed += 1;
            }
        }
    }

    // 5. Summary
    println!();
    if total_applied > 0 {
        let count = run.plan.outfits.outfit_count();
        if dry_run {
            println!("Would add {} Underwater Outfits", count);
        } else {
            println!(
                "{}",
                format!("Successfully added {} Underwater Outfits", count).green()
            );
        }
    }
    println!("{}", "Summary:".bold());
    println!("  {} patched", format!("{}", total_applied).green());
    println!(
        "  {} already patched",
        format!("{}", total_already_applied).yellow()
    );
    println!("  {} failed", format!("{}", total_failed).red());

    // 6. Offer to undo this run
    if !backups.is_empty() {
        let revert = match run.revert {
            Some(answer) => answer,
            None => prompter
                .ask_yes_no("Do you want to revert changes and restore backups? (yes/no):")?,
        };
        if revert {
            let pairs = backups.iter().map(|(file, backup)| (file.as_path(), backup.as_path()));
            for (file, backup, result) in restore_all(pairs) {
                match result {
                    Ok(RestoreOutcome::Restored) => {
                        println!("{} Restored backup: {}", "✓".green(), file.display())
                    }
                    Ok(RestoreOutcome::Missing) => {
                        println!("{} Backup not found: {}", "⊙".yellow(), backup.display())
                    }
                    Err(e) => {
                        eprintln!("{} {}: Error - {}", "✗".red(), file.display(), e);
                        total_failed += 1;
                    }
                }
            }
        }
    }

    Ok(if total_failed > 0 { 1 } else { 0 })
}

fn cmd_check(dir: &Path, json: bool) -> Result<i32> {
    let files = list_config_files(dir)?;
    let inspections = files
        .iter()
        .map(|file| inspect_file(file))
        .collect::<Result<Vec<FileInspection>, _>>()?;
    let invalid = inspections.iter().filter(|i| !i.is_valid()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&inspections)?);
        return Ok(if invalid > 0 { 1 } else { 0 });
    }

    println!("{}", "INI Check Report".bold());
    println!("Mod directory: {}", dir.display());
    println!();

    for inspection in &inspections {
        let file = inspection.file.display();
        if let Some(missing) = &inspection.missing {
            println!("{} {}", "✗".red(), file);
            for marker in &missing.missing {
                println!("  - {}", marker);
            }
            continue;
        }

        if inspection.already_patched {
            println!("{} {} (already patched)", "⊙".yellow(), file);
        } else {
            println!("{} {}", "✓".green(), file);
        }

        if let Some(report) = &inspection.report {
            let sections: Vec<&str> = report.texture_overrides.found().collect();
            if sections.is_empty() {
                println!("  texture overrides: {}", "none".dimmed());
            } else {
                println!("  texture overrides: {}", sections.join(", "));
            }
        }
        let keyswap = &inspection.keyswap;
        println!(
            "  [KeySwap] key = {}, back = {}, type = {}, $swapvar = {}",
            keyswap.key(),
            keyswap.back(),
            keyswap.swap_type(),
            keyswap.swap_values()
        );
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} valid",
        format!("{}", inspections.len() - invalid).green()
    );
    println!("  {} invalid", format!("{}", invalid).red());

    Ok(if invalid > 0 { 1 } else { 0 })
}

fn cmd_restore(dir: &Path) -> Result<i32> {
    let files = list_config_files(dir)?;

    let mut restored = 0;
    let mut missing = 0;
    let mut failed = 0;

    let backups: Vec<PathBuf> = files.iter().map(|file| backup_path_for(file)).collect();
    let pairs = files.iter().map(PathBuf::as_path).zip(backups.iter().map(PathBuf::as_path));

    for (file, backup, result) in restore_all(pairs) {
        match result {
            Ok(RestoreOutcome::Restored) => {
                println!("{} Restored backup: {}", "✓".green(), file.display());
                restored += 1;
            }
            Ok(RestoreOutcome::Missing) => {
                println!("{} Backup not found: {}", "⊙".yellow(), backup.display());
                missing += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), file.display(), e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} restored", format!("{}", restored).green());
    println!("  {} without backup", format!("{}", missing).yellow());
    println!("  {} failed", format!("{}", failed).red());

    Ok(if failed > 0 { 1 } else { 0 })
}
