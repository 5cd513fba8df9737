//! `dirstate changed` and `dirstate status`: change detection against a state file.

use std::io::Write;
use std::path::PathBuf;

use dirstate_cache::SnapshotStore;

use crate::{GlobalArgs, StateArgs};

fn resolve_state_file(
    args: &StateArgs,
    global: &GlobalArgs,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &args.state_file {
        Some(path) => Ok(path.clone()),
        None => Ok(global.load_config()?.state.file),
    }
}

/// Runs the `dirstate changed` command.
///
/// Prints `changed` or `unchanged`. A detected change overwrites the state
/// file; a missing state file reports `changed` and is left missing.
pub fn run_changed(
    args: &StateArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> Result<i32, Box<dyn std::error::Error>> {
    let state_file = resolve_state_file(args, global)?;
    let changed = SnapshotStore::new().has_changed(&args.directory, &state_file)?;
    writeln!(out, "{}", if changed { "changed" } else { "unchanged" })?;
    Ok(0)
}

/// Runs the `dirstate status` command.
///
/// Prints `+`, `-`, or `~` followed by each added, removed, or modified
/// path. Never writes the state file.
pub fn run_status(
    args: &StateArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> Result<i32, Box<dyn std::error::Error>> {
    let state_file = resolve_state_file(args, global)?;
    let diff = SnapshotStore::new().diff(&args.directory, &state_file)?;

    for path in &diff.added {
        writeln!(out, "+ {path}")?;
    }
    for path in &diff.removed {
        writeln!(out, "- {path}")?;
    }
    for path in &diff.modified {
        writeln!(out, "~ {path}")?;
    }
    if diff.is_empty() && !global.quiet {
        eprintln!("  No changes in {}", args.directory.display());
    }
    Ok(0)
}
