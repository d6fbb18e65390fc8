//! Get command - fetch a component file through the cache

use crate::cache::{CacheStore, PathKey};
use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::error::{PartsbinError, PartsbinResult};
use crate::remote::{fetch_through, Fetched, HttpFetcher};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Execute the get command
pub async fn execute(args: GetArgs, config: &Config, cache_root: &Path) -> PartsbinResult<()> {
    let remote = args
        .remote
        .or_else(|| config.general.default_remote.clone())
        .ok_or_else(|| {
            PartsbinError::User(
                "No remote given. Pass --remote or set general.default_remote".to_string(),
            )
        })?;
    let key = PathKey::parse(&args.path)?;

    let ctx = UiContext::detect();
    let mut spinner = TaskSpinner::new(&ctx);
    if args.out.is_some() {
        spinner.start(&format!("Fetching {}...", key.display_path()));
    }

    let root = cache_root.to_path_buf();
    let write_mode = config.cache.write_mode();
    let timeout = Duration::from_secs(config.general.fetch_timeout_secs);
    let task_key = key.clone();

    // Cache and HTTP calls block
    let result = tokio::task::spawn_blocking(move || -> PartsbinResult<Fetched> {
        let mut store = CacheStore::open(root, write_mode)?;
        let fetcher = HttpFetcher::new(timeout);
        fetch_through(&mut store, &fetcher, &remote, &task_key, args.refresh)
    })
    .await
    .map_err(|e| PartsbinError::Internal(format!("fetch task failed: {}", e)))?;

    let fetched = match result {
        Ok(fetched) => fetched,
        Err(e) => {
            if args.out.is_some() {
                spinner.stop_error("Fetch failed");
            }
            return Err(e);
        }
    };

    let Some(out) = args.out else {
        print!("{}", fetched.content);
        return Ok(());
    };

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PartsbinError::io(format!("creating {}", parent.display()), e))?;
    }
    fs::write(&out, &fetched.content)
        .await
        .map_err(|e| PartsbinError::io(format!("writing {}", out.display()), e))?;

    let source = if fetched.from_cache { "cache hit" } else { "fetched" };
    spinner.stop(&format!("{} ready", key.display_path()));
    ui::step_ok_detail(&ctx, &format!("Saved {}", out.display()), source);
    Ok(())
}
