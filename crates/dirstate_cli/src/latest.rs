//! `dirstate latest`: newest files in a directory.

use std::io::Write;

use dirstate_cache::{LatestFilesCache, LatestQuery};
use dirstate_config::{resolve_query, QueryOverrides, ResolvedQuery};

use crate::{GlobalArgs, LatestArgs};

/// Runs the `dirstate latest` command.
///
/// Merges the flags over the configured defaults and prints one path per
/// line, newest first. Each invocation is a fresh process, so a state file
/// left by an earlier run that still matches leads to a relisting instead of
/// a cache-miss error. Returns exit code 0 on success.
pub fn run(
    args: &LatestArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    let overrides = QueryOverrides {
        max_count: args.count,
        extension: args.ext.clone(),
        state_file: args.state_file.clone(),
    };
    let query = to_latest_query(resolve_query(&config, &overrides)?);
    tracing::debug!("resolved query: {query:?}");

    let cache = LatestFilesCache::new().with_rebuild_on_miss(true);
    for path in cache.get_latest_files(&args.directory, &query)? {
        writeln!(out, "{}", path.display())?;
    }
    Ok(0)
}

fn to_latest_query(resolved: ResolvedQuery) -> LatestQuery {
    LatestQuery {
        max_count: resolved.max_count,
        extension: resolved.extension,
        state_file: resolved.state_file,
    }
}
