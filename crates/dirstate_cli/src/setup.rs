//! `dirstate setup`: create the configured directories.

use crate::GlobalArgs;

/// Runs the `dirstate setup` command.
///
/// Ensures every path under `[directories]` exists. Returns exit code 1 if any
/// directory could not be created.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    if config.directories.is_empty() {
        if !global.quiet {
            eprintln!("warning: no directories configured");
        }
        return Ok(0);
    }

    if !dirstate_cache::setup_directories(&config.directories) {
        return Ok(1);
    }
    if !global.quiet {
        for (name, path) in &config.directories {
            eprintln!("     Ensured {name} at {}", path.display());
        }
    }
    Ok(0)
}
