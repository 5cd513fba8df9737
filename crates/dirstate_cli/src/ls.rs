//! `dirstate ls`: glob listing relative to a directory.

use std::io::Write;

use crate::LsArgs;

/// Runs the `dirstate ls` command, printing one relative path per line.
///
/// Listing failures are logged and produce no output rather than an error.
pub fn run(args: &LsArgs, out: &mut impl Write) -> Result<i32, Box<dyn std::error::Error>> {
    for path in dirstate_cache::list_files(&args.directory, &args.pattern, args.recursive) {
        writeln!(out, "{}", path.display())?;
    }
    Ok(0)
}
