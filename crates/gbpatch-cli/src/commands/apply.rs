//! Apply command implementation.
//!
//! Selects patches (by name, `--all`, or interactively), checks the
//! selection for overlapping writes, copies the input ROM to the output and
//! replays every patch into the copy.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use gbpatch_core::{
    ApplyReport, CONFIG_FILE, ConflictCheck, PatchCatalog, Patcher, PatcherConfig,
    find_first_conflict, prepare_output,
};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::cli::ApplyArgs;
use crate::commands::list;
use crate::interrupt::InterruptState;
use crate::prompter::{CliPrompter, Prompter};
use crate::selection::interactive_select;

/// Run the default command: list, or select and apply patches
pub fn run(args: &ApplyArgs, interrupt: Arc<InterruptState>) -> Result<()> {
    let config = resolve_config(args)?;
    debug!("Using {:?}", config);

    // A missing directory is reported by discovery and yields an empty catalog
    let catalog = PatchCatalog::discover(&config.patches_dir)?;

    if args.list {
        list::run(&catalog);
        return Ok(());
    }

    let prompter = CliPrompter;

    let Some(selected) = select_patches(args, &catalog, &prompter)? else {
        println!("No patches specified. Use --help for usage information.");
        return Ok(());
    };
    if selected.is_empty() {
        println!("No patches selected.");
        return Ok(());
    }

    if !config.input.exists() {
        bail!("Input ROM file '{}' not found.", config.input.display());
    }

    let selection = catalog.resolve(&selected)?;

    if !config.force && !confirm_conflicts(find_first_conflict(&selection), &prompter) {
        println!("Operation cancelled.");
        return Ok(());
    }

    // From here on Ctrl+C no longer cancels: writes are under way.
    interrupt.commit();

    match prepare_output(&config.input, &config.output)? {
        Some(backup) => println!("Creating backup: {}", backup.display()),
        None => println!(
            "Copying {} to {}",
            config.input.display(),
            config.output.display()
        ),
    }

    let mut patcher = Patcher::open(&config.output)
        .with_context(|| format!("Failed to open {}", config.output.display()))?;

    println!("\nApplying {} patch(es):", selection.len());
    let report = patcher.apply_all(&selection);
    drop(patcher);

    print_report(&report, &config.output);
    if interrupt.is_interrupted() {
        println!("Interrupted during writes; the batch was completed.");
    }
    Ok(())
}

/// Merge defaults, the config file and command-line flags (flags win).
pub fn resolve_config(args: &ApplyArgs) -> Result<PatcherConfig> {
    let mut builder = PatcherConfig::builder();
    if let Some(input) = &args.input {
        builder = builder.input(input);
    }
    if let Some(output) = &args.output {
        builder = builder.output(output);
    }
    if let Some(dir) = &args.patches_dir {
        builder = builder.patches_dir(dir);
    }
    if args.force {
        builder = builder.force(true);
    }

    match &args.config {
        Some(path) => {
            builder = builder
                .file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
        }
        None if Path::new(CONFIG_FILE).is_file() => {
            builder = builder
                .file(CONFIG_FILE)
                .with_context(|| format!("Failed to load config {}", CONFIG_FILE))?;
        }
        None => {}
    }

    Ok(builder.build())
}

/// Work out which patches were asked for.
///
/// Returns `Ok(None)` when no selection mode was given at all.
fn select_patches<P: Prompter>(
    args: &ApplyArgs,
    catalog: &PatchCatalog,
    prompter: &P,
) -> Result<Option<Vec<String>>> {
    if args.all {
        return Ok(Some(catalog.names().map(str::to_string).collect()));
    }
    if args.interactive {
        return Ok(Some(interactive_select(catalog, prompter)));
    }
    if args.patches.is_empty() {
        return Ok(None);
    }

    if let Some(unknown) = args.patches.iter().find(|name| !catalog.contains(name)) {
        bail!(
            "Patch '{}' not found.\nAvailable patches: {}",
            unknown,
            catalog.names().collect::<Vec<_>>().join(", ")
        );
    }
    Ok(Some(args.patches.clone()))
}

/// Report the conflict check and ask whether to go on.
///
/// A check that could not finish is treated like a conflict: the user has
/// to agree explicitly before anything is written.
fn confirm_conflicts<P: Prompter>(check: ConflictCheck, prompter: &P) -> bool {
    match check {
        ConflictCheck::Clear => true,
        ConflictCheck::Conflict { first, second } => {
            prompter.display_message(&format!(
                "{} Warning: Conflict detected between {} and {}",
                "⚠".yellow(),
                first,
                second
            ));
            prompter.confirm("Conflicts detected. Continue anyway? (y/N): ")
        }
        ConflictCheck::Failed { name, error } => {
            prompter.display_message(&format!(
                "{} Error checking patch conflicts: {}: {}",
                "⚠".yellow(),
                name,
                error
            ));
            prompter.confirm("Conflict check failed. Continue anyway? (y/N): ")
        }
    }
}

fn print_report(report: &ApplyReport, output: &Path) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(_) => println!("{} Successfully applied {}", "✓".green(), outcome.name),
            Err(e) => println!("{} Failed to apply {}: {}", "✗".red(), outcome.name, e),
        }
    }

    println!(
        "\nCompleted: {}/{} patches applied successfully.",
        report.success_count(),
        report.total()
    );
    if report.success_count() > 0 {
        println!("Modified ROM saved as: {}", output.display());
    }
}
