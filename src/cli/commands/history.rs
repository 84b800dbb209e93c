use std::path::Path;

use anyhow::Result;

use crate::state::history;

pub async fn run(limit: usize, state_dir: &Path) -> Result<()> {
    let entries = history::read_all(&history::history_path(state_dir))?;

    if entries.is_empty() {
        println!("No builds recorded yet");
        return Ok(());
    }

    let skip = entries.len().saturating_sub(limit);
    for entry in entries.iter().skip(skip).rev() {
        println!(
            "{}  {:<9}  {}  ({})",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            entry.playlist_name,
            entry.playlist_id
        );
        println!(
            "    {} requested, {} unresolved",
            entry.tracks, entry.unresolved
        );
    }

    Ok(())
}
