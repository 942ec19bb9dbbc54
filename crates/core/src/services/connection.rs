//! Connection resolver - paginates an ordered identifier list.
//!
//! Resolution happens in two stages so that callers only pay for what
//! they select:
//!
//! 1. [`open`] fetches the full identifier list once and computes the
//!    window. `total_count` and `page_info` are answered from that alone.
//! 2. [`ConnectionPage::edges`] batch-loads the windowed nodes in a
//!    single storage call and wraps them with absolute-offset cursors.
//!
//! Storage is passed explicitly into both stages; a page holds no handle
//! and no state beyond the identifiers of one request. Dropping either
//! future cancels the outstanding storage call and no further fetch is
//! issued.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::error::{ResolveError, ResolveResult};
use crate::metrics::{record_connection_error, record_connection_resolved, ResolutionTimer};
use crate::models::{EntityId, Node};
use crate::ports::{
    Connection, ConnectionArgs, Cursor, Edge, NodeLoader, PageInfo, RelatedIds, Window,
};

/// One page of a connection: the identifier list plus its window.
#[derive(Debug, Clone)]
pub struct ConnectionPage {
    relation: &'static str,
    ids: Vec<EntityId>,
    window: Window,
}

/// Fetch the identifier list for `parent_id` and compute the page window.
#[instrument(skip(source, args), fields(relation = source.relation()))]
pub async fn open<S>(source: &S, parent_id: EntityId, args: &ConnectionArgs) -> ResolveResult<ConnectionPage>
where
    S: RelatedIds + ?Sized,
{
    let relation = source.relation();
    let _timer = ResolutionTimer::new(relation, "ids");

    let page = async {
        let ids = source.related_ids(parent_id).await?;
        ConnectionPage::new(relation, ids, args)
    }
    .await
    .inspect_err(|e| record_connection_error(relation, e.code()))?;

    record_connection_resolved(relation, page.window.len());
    Ok(page)
}

/// Resolve a full connection eagerly: identifiers, window and edges.
pub async fn resolve<N, S>(source: &S, parent_id: EntityId, args: &ConnectionArgs) -> ResolveResult<Connection<N>>
where
    N: Node + Clone,
    S: RelatedIds + NodeLoader<N> + ?Sized,
{
    let page = open(source, parent_id, args).await?;
    let edges = page.edges(source).await?;

    Ok(Connection {
        edges,
        page_info: page.page_info(),
        total_count: page.total_count(),
    })
}

impl ConnectionPage {
    /// Window an already fetched identifier list.
    pub fn new(relation: &'static str, ids: Vec<EntityId>, args: &ConnectionArgs) -> ResolveResult<Self> {
        let window = Window::for_args(ids.len(), args)?;

        if window.from() > ids.len() {
            warn!(
                relation,
                from = window.from(),
                len = ids.len(),
                "Cursor points past the end of the list, returning empty page"
            );
        } else {
            debug!(relation, from = window.from(), to = window.to(), len = ids.len(), "Window computed");
        }

        Ok(Self { relation, ids, window })
    }

    /// Total number of related items, independent of the window.
    pub fn total_count(&self) -> usize {
        self.ids.len()
    }

    /// Identifiers inside the window, in list order.
    pub fn window_ids(&self) -> &[EntityId] {
        self.window.slice(&self.ids)
    }

    pub fn page_info(&self) -> PageInfo {
        self.window.page_info(self.ids.len())
    }

    /// Batch-load the windowed nodes and wrap them as edges.
    ///
    /// Nodes are matched back to the window by identifier, so the loader
    /// may return them in any order. A windowed identifier with no node
    /// is a storage inconsistency and fails the whole page.
    #[instrument(skip(self, loader), fields(relation = self.relation, from = self.window.from(), to = self.window.to()))]
    pub async fn edges<N, L>(&self, loader: &L) -> ResolveResult<Vec<Edge<N>>>
    where
        N: Node + Clone,
        L: NodeLoader<N> + ?Sized,
    {
        let ids = self.window_ids();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let _timer = ResolutionTimer::new(self.relation, "edges");

        let result = async {
            let nodes: HashMap<EntityId, N> = loader
                .load_nodes(ids)
                .await?
                .into_iter()
                .map(|node| (node.id(), node))
                .collect();

            ids.iter()
                .enumerate()
                .map(|(i, id)| -> ResolveResult<Edge<N>> {
                    let node = nodes.get(id).cloned().ok_or_else(|| {
                        ResolveError::NotFound(format!("{} {} vanished from storage", N::TYPE_NAME, id))
                    })?;
                    Ok(Edge {
                        node,
                        cursor: Cursor::encode(self.window.from() + i),
                    })
                })
                .collect::<ResolveResult<Vec<_>>>()
        }
        .await;

        result.inspect_err(|e| record_connection_error(self.relation, e.code()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use ::metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, SharedString, Unit};
    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::{StorageError, StorageResult};
    use crate::models::Pet;

    /// In-memory source: one parent with a fixed pet list.
    struct FakePets {
        ids: Vec<EntityId>,
        missing: Vec<EntityId>,
        fail_ids: bool,
        fail_loads: bool,
        id_calls: AtomicUsize,
        load_calls: Mutex<Vec<Vec<EntityId>>>,
    }

    impl FakePets {
        fn new(ids: &[EntityId]) -> Self {
            Self {
                ids: ids.to_vec(),
                missing: Vec::new(),
                fail_ids: false,
                fail_loads: false,
                id_calls: AtomicUsize::new(0),
                load_calls: Mutex::new(Vec::new()),
            }
        }
    }

    fn pet(id: EntityId) -> Pet {
        let now = Utc::now();
        Pet {
            id,
            owner_id: 1,
            name: format!("pet-{id}"),
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl RelatedIds for FakePets {
        fn relation(&self) -> &'static str {
            "test_pets"
        }

        async fn related_ids(&self, _parent_id: EntityId) -> StorageResult<Vec<EntityId>> {
            self.id_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_ids {
                return Err(StorageError::ConnectionError("pool timed out".into()));
            }
            Ok(self.ids.clone())
        }
    }

    #[async_trait]
    impl NodeLoader<Pet> for FakePets {
        async fn load_nodes(&self, ids: &[EntityId]) -> StorageResult<Vec<Pet>> {
            self.load_calls.lock().unwrap().push(ids.to_vec());
            if self.fail_loads {
                return Err(StorageError::QueryError("connection reset by peer".into()));
            }
            // Reverse to prove edges don't depend on batch order
            Ok(ids
                .iter()
                .rev()
                .copied()
                .filter(|id| !self.missing.contains(id))
                .map(pet)
                .collect())
        }
    }

    fn args(first: Option<usize>, after: Option<usize>) -> ConnectionArgs {
        ConnectionArgs::new(first, after.map(|o| Cursor::encode(o).value))
    }

    #[tokio::test]
    async fn pages_through_related_ids() {
        let source = FakePets::new(&[11, 22, 33, 44, 55]);

        let first = resolve::<Pet, _>(&source, 1, &args(Some(2), None)).await.unwrap();
        assert_eq!(first.total_count, 5);
        assert_eq!(first.edges.iter().map(|e| e.node.id).collect::<Vec<_>>(), [11, 22]);
        assert_eq!(
            first.edges.iter().map(|e| e.cursor.clone()).collect::<Vec<_>>(),
            [Cursor::encode(0), Cursor::encode(1)]
        );
        assert!(first.page_info.has_next_page);
        assert!(!first.page_info.has_previous_page);

        let after = first.page_info.end_cursor.unwrap().value;
        let second = resolve::<Pet, _>(&source, 1, &ConnectionArgs::new(Some(2), Some(after)))
            .await
            .unwrap();
        assert_eq!(second.edges.iter().map(|e| e.node.id).collect::<Vec<_>>(), [33, 44]);
        assert!(second.page_info.has_next_page);
        assert!(second.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn edge_cursors_are_absolute_offsets() {
        let source = FakePets::new(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);

        let conn = resolve::<Pet, _>(&source, 1, &args(Some(3), Some(2))).await.unwrap();
        let cursors: Vec<Cursor> = conn.edges.iter().map(|e| e.cursor.clone()).collect();
        assert_eq!(cursors, [Cursor::encode(3), Cursor::encode(4), Cursor::encode(5)]);
        assert_eq!(conn.edges.iter().map(|e| e.node.id).collect::<Vec<_>>(), [4, 5, 6]);
        // Only the windowed identifiers were requested, in one batch
        assert_eq!(*source.load_calls.lock().unwrap(), vec![vec![4, 5, 6]]);
    }

    #[tokio::test]
    async fn count_and_page_info_do_not_load_nodes() {
        let source = FakePets::new(&[11, 22, 33]);

        let page = open(&source, 1, &args(Some(1), None)).await.unwrap();
        assert_eq!(page.total_count(), 3);
        assert_eq!(page.window_ids(), &[11]);
        assert!(page.page_info().has_next_page);
        assert!(source.load_calls.lock().unwrap().is_empty());
        assert_eq!(source.id_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_cursor_yields_empty_page() {
        let source = FakePets::new(&[11, 22, 33, 44, 55]);

        let conn = resolve::<Pet, _>(&source, 1, &args(Some(3), Some(10))).await.unwrap();
        assert!(conn.edges.is_empty());
        assert_eq!(conn.total_count, 5);
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.page_info.end_cursor, None);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
        assert!(source.load_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_list_resolves_to_empty_connection() {
        let source = FakePets::new(&[]);

        let conn = resolve::<Pet, _>(&source, 1, &ConnectionArgs::default()).await.unwrap();
        assert_eq!(conn.total_count, 0);
        assert!(conn.edges.is_empty());
        assert!(!conn.page_info.has_next_page && !conn.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn vanished_node_fails_the_page() {
        let mut source = FakePets::new(&[11, 22, 33]);
        source.missing = vec![22];

        let err = resolve::<Pet, _>(&source, 1, &ConnectionArgs::default()).await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(ref m) if m.contains("Pet 22")));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_without_loading_nodes() {
        let mut source = FakePets::new(&[11, 22]);
        source.fail_ids = true;

        let err = resolve::<Pet, _>(&source, 1, &ConnectionArgs::default()).await.unwrap_err();
        assert!(matches!(err, ResolveError::StorageUnavailable(_)));
        assert!(source.load_calls.lock().unwrap().is_empty());
    }

    /// Counts `connection_errors_total` increments labelled `STORAGE_UNAVAILABLE`.
    #[derive(Default)]
    struct UnavailableErrors {
        count: Arc<AtomicU64>,
    }

    impl ::metrics::Recorder for UnavailableErrors {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let unavailable = key
                .labels()
                .any(|l| l.key() == "kind" && l.value() == "STORAGE_UNAVAILABLE");
            if key.name() == "connection_errors_total" && unavailable {
                Counter::from_arc(self.count.clone())
            } else {
                Counter::noop()
            }
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn failed_batch_load_fails_the_page_and_is_counted() {
        let mut source = FakePets::new(&[11, 22, 33]);
        source.fail_loads = true;
        let recorder = UnavailableErrors::default();

        let result = ::metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(resolve::<Pet, _>(&source, 1, &args(Some(2), None)))
        });

        let err = result.unwrap_err();
        assert!(matches!(err, ResolveError::StorageUnavailable(_)), "{err}");
        assert_eq!(err.code(), "STORAGE_UNAVAILABLE");
        assert_eq!(*source.load_calls.lock().unwrap(), vec![vec![11, 22]]);
        assert_eq!(recorder.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_cursor_is_rejected_before_loading() {
        let source = FakePets::new(&[11, 22]);
        let bad = ConnectionArgs::new(Some(1), Some("not-a-valid-cursor".into()));

        let err = resolve::<Pet, _>(&source, 1, &bad).await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCursor(_)));
        assert!(source.load_calls.lock().unwrap().is_empty());
    }
}
