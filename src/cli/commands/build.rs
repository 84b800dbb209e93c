use std::path::Path;

use anyhow::Result;

use crate::{
    provider::Catalog,
    state::{history, manifest, Config, CredentialSource},
    sync::{PlaylistManifest, PreparedSync, Reconciler, ReconciliationResult, SyncAction, SyncPlan},
};

use super::utils;

pub async fn run(
    file: &Path,
    dry_run: bool,
    source: Option<CredentialSource>,
    state_dir: &Path,
) -> Result<()> {
    let manifest = manifest::load(file)?;
    let config = Config::load_or_default(state_dir)?;
    let catalog = utils::open_catalog(source.unwrap_or(config.default_source), &config, state_dir)?;

    let reconciler = Reconciler::for_current_user(&catalog)
        .await?
        .public(config.public);
    println!("Authenticated as {}", reconciler.owner_id());

    let Some(result) = build(&reconciler, &manifest, dry_run).await? else {
        return Ok(());
    };

    let entry = history::HistoryEntry::new(&manifest.name, manifest.tracks.len(), &result);
    history::append(&history::history_path(state_dir), &entry)?;

    Ok(())
}

/// Plan the manifest against the remote account and, unless `dry_run`, apply it.
async fn build<C: Catalog + ?Sized>(
    reconciler: &Reconciler<'_, C>,
    manifest: &PlaylistManifest,
    dry_run: bool,
) -> Result<Option<ReconciliationResult>> {
    println!(
        "Resolving {} track(s) for '{}'...",
        manifest.tracks.len(),
        manifest.name
    );

    let prepared = reconciler
        .plan(&manifest.tracks, &manifest.name, &manifest.description)
        .await?;
    print_plan(&prepared);

    if dry_run {
        println!("\nDry run: no changes made.");
        return Ok(None);
    }

    let result = reconciler.execute(prepared).await?;
    print_result(&result);

    Ok(Some(result))
}

fn print_plan(prepared: &PreparedSync) {
    let resolved = prepared.desired.uris.len();
    let unresolved = prepared.desired.unresolved.len();
    println!("\nResolved {} of {} track(s)", resolved, resolved + unresolved);

    match &prepared.plan {
        SyncPlan::Create => println!(
            "Playlist '{}' does not exist: will create it and add {} track(s) in {} request(s)",
            prepared.name,
            resolved,
            prepared.add_calls()
        ),
        SyncPlan::Unchanged(current) => println!(
            "Playlist '{}' ({}) is already up to date",
            prepared.name, current.id
        ),
        SyncPlan::Rewrite(current) => println!(
            "Playlist '{}' ({}) differs: will remove {} track(s) in {} request(s), then add {} in {} request(s)",
            prepared.name,
            current.id,
            current.track_uris.len(),
            prepared.remove_calls(),
            resolved,
            prepared.add_calls()
        ),
    }
}

fn print_result(result: &ReconciliationResult) {
    let verb = match result.action {
        SyncAction::Created => "Created",
        SyncAction::Updated => "Updated",
        SyncAction::Unchanged => "No changes to",
    };
    println!("\n{} playlist: https://open.spotify.com/playlist/{}", verb, result.playlist_id);

    if !result.unresolved.is_empty() {
        println!("\nCould not find {} track(s):", result.unresolved.len());
        for label in &result.unresolved {
            println!("  - {}", label);
        }
    }
}
