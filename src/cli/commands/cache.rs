//! Cache command - inspect and manage the local cache

use crate::cache::diagnostics::{self, format_bytes, RemoteSummary};
use crate::cache::{hash, CacheStore, PathKey, TTL_MILLIS};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::PartsbinResult;
use crate::ui::{self, TaskSpinner, UiContext};
use chrono::{Duration, Utc};
use console::style;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config, cache_root: &Path) -> PartsbinResult<()> {
    match args.action {
        CacheAction::Size { format } => show_size(cache_root, config, format),
        CacheAction::Tree { format } => show_tree(cache_root, config, format),
        CacheAction::Rm { remote, path } => remove_file(cache_root, config, &remote, &path),
        CacheAction::Clear { yes } => clear_cache(cache_root, yes).await,
        CacheAction::Path => {
            println!("{}", cache_root.display());
            Ok(())
        }
    }
}

fn open_store(cache_root: &Path, config: &Config) -> PartsbinResult<CacheStore> {
    debug!("Opening cache at {}", cache_root.display());
    CacheStore::open(cache_root, config.cache.write_mode())
}

/// Show total size plus a per-remote breakdown
fn show_size(cache_root: &Path, config: &Config, format: OutputFormat) -> PartsbinResult<()> {
    // Measure before opening, since opening creates the index
    let total = diagnostics::total_size_bytes(cache_root)?;

    let mut remotes = BTreeMap::new();
    if cache_root.exists() {
        let store = open_store(cache_root, config)?;
        for (remote_hash, entry) in store.index().iter() {
            let size = diagnostics::remote_size_bytes(store.root(), remote_hash)?;
            remotes.insert(entry.remote_id.clone(), size);
        }
    }

    match format {
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::key_value(&ctx, "Total", &format_bytes(total));
            for (remote, size) in &remotes {
                ui::key_value(&ctx, remote, &format_bytes(*size));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "total": total, "remotes": remotes });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => println!("{}", total),
    }

    Ok(())
}

/// List cached files per remote
fn show_tree(cache_root: &Path, config: &Config, format: OutputFormat) -> PartsbinResult<()> {
    let tree = if cache_root.exists() {
        diagnostics::build_tree(&open_store(cache_root, config)?)?
    } else {
        BTreeMap::new()
    };

    if tree.is_empty() {
        match format {
            OutputFormat::Json => println!("{{}}"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "Cache is empty");
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_tree_table(&tree),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tree)?),
        OutputFormat::Plain => print_tree_plain(&tree),
    }

    Ok(())
}

fn print_tree_table(tree: &BTreeMap<String, RemoteSummary>) {
    let ttl = Duration::milliseconds(TTL_MILLIS);
    let now = Utc::now();

    println!(
        "{:<50} {:>10} {:<18}",
        style("REMOTE / FILE").bold(),
        style("SIZE").bold(),
        style("CACHED").bold()
    );
    println!("{}", "-".repeat(80));

    for (remote, summary) in tree {
        println!(
            "{:<50} {:>10} {}",
            style(remote).cyan(),
            format_bytes(summary.size),
            style(format!(
                "touched {}",
                summary.last_touched.format("%Y-%m-%d %H:%M")
            ))
            .dim()
        );

        for (key, file) in &summary.files {
            let cached = file.cached_at.format("%Y-%m-%d %H:%M").to_string();
            let cached = if now - file.cached_at > ttl {
                style(format!("{} (expired)", cached)).yellow().to_string()
            } else {
                cached
            };
            println!(
                "  {:<48} {:>10} {}",
                key.display_path(),
                format_bytes(file.size),
                cached
            );
        }
    }

    let files: usize = tree.values().map(|s| s.files.len()).sum();
    println!();
    println!("Total: {} remote(s), {} file(s)", tree.len(), files);
}

fn print_tree_plain(tree: &BTreeMap<String, RemoteSummary>) {
    for (remote, summary) in tree {
        for key in summary.files.keys() {
            println!("{}\t{}", remote, key.display_path());
        }
    }
}

/// Remove one cached file
fn remove_file(cache_root: &Path, config: &Config, remote: &str, path: &str) -> PartsbinResult<()> {
    let key = PathKey::parse(path)?;
    let ctx = UiContext::detect();

    // Opening a handle creates the remote, so look it up in the index first
    if !cache_root.exists() {
        return not_cached(&ctx, path, remote);
    }
    let mut store = open_store(cache_root, config)?;
    let cached = store
        .index()
        .entry(&hash::digest(remote))
        .is_some_and(|entry| entry.files.contains_key(&key));
    if !cached {
        return not_cached(&ctx, path, remote);
    }

    store.remote(remote)?.remove_file(&key)?;
    ui::step_ok(&ctx, &format!("Removed {} from {}", key.display_path(), remote));
    Ok(())
}

fn not_cached(ctx: &UiContext, path: &str, remote: &str) -> PartsbinResult<()> {
    ui::step_info(ctx, &format!("{} is not cached for {}", path, remote));
    Ok(())
}

/// Delete the whole cache after confirmation
async fn clear_cache(cache_root: &Path, skip_confirm: bool) -> PartsbinResult<()> {
    let ctx = UiContext::detect().with_auto_yes(skip_confirm);

    if !cache_root.exists() {
        ui::step_info(&ctx, "Cache is already empty");
        return Ok(());
    }

    // Clear works without loading the index so it can recover a broken cache
    let total = diagnostics::total_size_bytes(cache_root)?;

    ui::intro(&ctx, "Clear cache");
    ui::key_value(&ctx, "Location", &cache_root.display().to_string());
    ui::key_value(&ctx, "Size", &format_bytes(total));

    if !ui::confirm(&ctx, "Delete all cached files?", false).await? {
        ui::outro_warn(&ctx, "Aborted");
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Clearing cache...");
    if let Err(e) = diagnostics::clear(cache_root) {
        spinner.stop_error("Failed to clear cache");
        return Err(e);
    }
    spinner.stop(&format!("Freed {}", format_bytes(total)));

    ui::outro_success(&ctx, "Cache cleared");
    Ok(())
}
