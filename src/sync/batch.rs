use std::fmt;

use thiserror::Error;

use crate::provider::{Catalog, CatalogError};

/// Most items the catalog accepts in one add/remove call.
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Remove,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Add => f.pad("add"),
            Mutation::Remove => f.pad("remove"),
        }
    }
}

/// A chunk failed. Chunks `0..chunk` were applied and are not undone.
#[derive(Error, Debug)]
#[error("{mutation} batch {} of {total} failed: {source}", .chunk + 1)]
pub struct BatchError {
    pub mutation: Mutation,
    pub chunk: usize,
    pub total: usize,
    #[source]
    pub source: CatalogError,
}

/// Number of calls needed to send `len` items.
pub fn batch_count(len: usize, max_batch_size: usize) -> usize {
    len.div_ceil(max_batch_size.max(1))
}

/// Send `uris` in order as contiguous chunks of at most `max_batch_size`, one call at a
/// time, stopping at the first failure. Returns the number of calls made.
pub async fn apply<C: Catalog + ?Sized>(
    catalog: &C,
    playlist_id: &str,
    uris: &[String],
    mutation: Mutation,
    max_batch_size: usize,
) -> Result<usize, BatchError> {
    let max_batch_size = max_batch_size.clamp(1, MAX_BATCH_SIZE);
    let total = batch_count(uris.len(), max_batch_size);

    for (chunk, batch) in uris.chunks(max_batch_size).enumerate() {
        tracing::debug!(%mutation, playlist_id, chunk, total, items = batch.len(), "sending batch");

        let sent = match mutation {
            Mutation::Add => catalog.add_items(playlist_id, batch).await,
            Mutation::Remove => catalog.remove_items(playlist_id, batch).await,
        };

        sent.map_err(|source| BatchError {
            mutation,
            chunk,
            total,
            source,
        })?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{uris, Call, FakeCatalog};

    #[test]
    fn test_batch_count() {
        assert_eq!(batch_count(0, 100), 0);
        assert_eq!(batch_count(1, 100), 1);
        assert_eq!(batch_count(100, 100), 1);
        assert_eq!(batch_count(101, 100), 2);
        assert_eq!(batch_count(250, 100), 3);
    }

    #[tokio::test]
    async fn test_chunks_preserve_order() {
        let catalog = FakeCatalog::new("alice").with_playlist("p1", "Mix", "alice", vec![]);
        let items = uris("t", 250);

        let calls = apply(&catalog, "p1", &items, Mutation::Add, MAX_BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(calls, 3);
        let sizes: Vec<_> = catalog
            .calls()
            .iter()
            .map(|c| match c {
                Call::Add { uris, .. } => uris.len(),
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(catalog.playlist_uris("p1").unwrap(), items);
    }

    #[tokio::test]
    async fn test_exactly_one_full_batch() {
        let catalog = FakeCatalog::new("alice").with_playlist("p1", "Mix", "alice", uris("t", 100));

        let calls = apply(&catalog, "p1", &uris("t", 100), Mutation::Remove, MAX_BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(catalog.calls().len(), 1);
        assert!(catalog.playlist_uris("p1").unwrap().is_empty());
    }

    #[test]
    fn test_mutation_display_honours_width() {
        assert_eq!(format!("[{:>6}]", Mutation::Add), "[   add]");
    }

    #[tokio::test]
    async fn test_empty_sequence_makes_no_calls() {
        let catalog = FakeCatalog::new("alice");

        let calls = apply(&catalog, "p1", &[], Mutation::Remove, MAX_BATCH_SIZE)
            .await
            .unwrap();

        assert_eq!(calls, 0);
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_batch_size_is_capped() {
        let catalog = FakeCatalog::new("alice").with_playlist("p1", "Mix", "alice", vec![]);

        let calls = apply(&catalog, "p1", &uris("t", 150), Mutation::Add, 500)
            .await
            .unwrap();

        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_failure_stops_and_reports_chunk() {
        let catalog = FakeCatalog::new("alice")
            .with_playlist("p1", "Mix", "alice", vec![])
            .fail_on(1, |c| matches!(c, Call::Add { .. }));

        let err = apply(&catalog, "p1", &uris("t", 350), Mutation::Add, MAX_BATCH_SIZE)
            .await
            .unwrap_err();

        assert_eq!(err.chunk, 1);
        assert_eq!(err.total, 4);
        assert_eq!(err.to_string(), "add batch 2 of 4 failed: catalog API error 502: bad gateway");
        // First chunk stays applied, nothing after the failure is sent
        assert_eq!(catalog.calls().len(), 2);
        assert_eq!(catalog.playlist_uris("p1").unwrap().len(), 100);
    }
}
