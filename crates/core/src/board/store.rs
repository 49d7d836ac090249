//! Shared board store
//!
//! Owns the board and the drag session for a running application. Every
//! committed change is written to the key-value store and announced to
//! subscribers. Persistence is best-effort: a failed write is logged and
//! the in-memory board stays authoritative.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::drag::{DragMove, DragOutcome, DragPhase, DragSession};
use crate::storage::KeyValueStore;
use crate::Result;

use super::codec;
use super::model::{Board, Card, Column};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Notification sent after every committed change
#[derive(Debug, Clone)]
pub struct BoardChanged {
    pub board: Board,
}

/// Result of a column deletion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDeletion {
    Deleted(Column),
    Declined,
    NotFound,
}

struct StoreState {
    board: Board,
    drag: DragSession,
    /// Client that started the current drag
    drag_owner: Option<String>,
}

/// Thread-safe board store with key-value persistence
#[derive(Clone)]
pub struct BoardStore {
    state: Arc<RwLock<StoreState>>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    changes: broadcast::Sender<BoardChanged>,
}

impl BoardStore {
    /// Load the board saved under `key`, starting from the default board
    /// when nothing is saved yet.
    pub async fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        Self::load_or(storage, key, codec::default_board).await
    }

    /// Load the board saved under `key`, starting from `initial()` when
    /// nothing is saved yet. A saved board that cannot be decoded is an
    /// error, so it is never silently overwritten.
    pub async fn load_or(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        initial: impl FnOnce() -> Board,
    ) -> Result<Self> {
        let key = key.into();
        let saved = storage.get(&key).await?;
        let (board, fresh) = match saved {
            Some(content) => (codec::decode(&content)?, false),
            None => (initial(), true),
        };
        info!(
            "Loaded board with {} columns and {} cards",
            board.columns().len(),
            board.card_count()
        );

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let store = Self {
            state: Arc::new(RwLock::new(StoreState {
                board,
                drag: DragSession::new(),
                drag_owner: None,
            })),
            storage,
            key,
            changes,
        };

        if fresh {
            let state = store.state.read().await;
            store.persist(&state.board).await;
        }

        Ok(store)
    }

    /// Get the current board
    pub async fn snapshot(&self) -> Board {
        self.state.read().await.board.clone()
    }

    /// Receive a notification after every committed change
    pub fn subscribe(&self) -> broadcast::Receiver<BoardChanged> {
        self.changes.subscribe()
    }

    /// Append a column. `None` for a blank title.
    pub async fn add_column(&self, title: &str) -> Option<Column> {
        let mut state = self.state.write().await;
        let column = state.board.add_column(title).cloned();
        match &column {
            Some(column) => {
                info!("Added column {} ({})", column.id, column.title);
                self.commit(&mut state).await;
            }
            None => warn!("Rejected column with blank title"),
        }
        column
    }

    /// Delete a column and its cards once `confirm` agrees
    pub async fn delete_column(
        &self,
        column_id: &str,
        confirm: impl FnOnce(&Column) -> bool,
    ) -> ColumnDeletion {
        let mut state = self.state.write().await;
        let Some(column) = state.board.column(column_id) else {
            return ColumnDeletion::NotFound;
        };
        if !confirm(column) {
            info!("Deletion of column {} declined", column_id);
            return ColumnDeletion::Declined;
        }

        match state.board.delete_column(column_id) {
            Some(column) => {
                info!(
                    "Deleted column {} with {} cards",
                    column.id,
                    column.cards.len()
                );
                self.commit(&mut state).await;
                ColumnDeletion::Deleted(column)
            }
            None => ColumnDeletion::NotFound,
        }
    }

    /// Append a card to a column. `None` for a blank title or unknown
    /// column.
    pub async fn add_card(&self, column_id: &str, title: &str) -> Option<Card> {
        let mut state = self.state.write().await;
        let card = state.board.add_card(column_id, title).cloned();
        match &card {
            Some(card) => {
                info!("Added card {} to {}", card.id, column_id);
                self.commit(&mut state).await;
            }
            None => warn!("Rejected card for column {}", column_id),
        }
        card
    }

    /// Remove a card from a column
    pub async fn delete_card(&self, column_id: &str, card_id: &str) -> Option<Card> {
        let mut state = self.state.write().await;
        let card = state.board.delete_card(column_id, card_id);
        if card.is_some() {
            info!("Deleted card {} from {}", card_id, column_id);
            self.commit(&mut state).await;
        }
        card
    }

    /// Move a card to an index in a column. Returns `true` if it moved.
    pub async fn move_card(&self, card_id: &str, column_id: &str, index: usize) -> bool {
        let mut state = self.state.write().await;
        let moved = state.board.move_card(card_id, column_id, index);
        if moved {
            info!("Moved card {} to {} at {}", card_id, column_id, index);
            self.commit(&mut state).await;
        }
        moved
    }

    /// Begin dragging a card on behalf of client `owner`
    pub async fn drag_start(&self, owner: &str, active_id: &str) -> DragOutcome {
        let mut guard = self.state.write().await;
        guard.drag_owner = Some(owner.to_string());
        self.apply_drag(&mut guard, |board, drag| drag.start(board, active_id))
            .await
    }

    /// Cancel the drag in flight if `owner` started it. Called when a client
    /// goes away mid-gesture.
    pub async fn release_drag(&self, owner: &str) -> DragOutcome {
        let mut guard = self.state.write().await;
        if guard.drag_owner.as_deref() != Some(owner) {
            return DragOutcome::Ignored;
        }
        info!("Releasing drag held by {}", owner);
        self.apply_drag(&mut guard, |board, drag| drag.cancel(board))
            .await
    }

    /// Pointer moved during a drag
    pub async fn drag_over(&self, event: &DragMove) -> DragOutcome {
        self.drag(|board, drag| drag.over(board, event)).await
    }

    /// Pointer released
    pub async fn drag_end(&self, event: &DragMove) -> DragOutcome {
        self.drag(|board, drag| drag.end(board, event)).await
    }

    /// Gesture aborted by the UI
    pub async fn drag_cancel(&self) -> DragOutcome {
        self.drag(|board, drag| drag.cancel(board)).await
    }

    async fn drag(
        &self,
        apply: impl FnOnce(&mut Board, &mut DragSession) -> DragOutcome,
    ) -> DragOutcome {
        let mut guard = self.state.write().await;
        self.apply_drag(&mut guard, apply).await
    }

    async fn apply_drag(
        &self,
        state: &mut StoreState,
        apply: impl FnOnce(&mut Board, &mut DragSession) -> DragOutcome,
    ) -> DragOutcome {
        let outcome = apply(&mut state.board, &mut state.drag);
        if state.drag.phase() == DragPhase::Idle {
            state.drag_owner = None;
        }
        debug!("Drag event: {:?}", outcome);
        if outcome.board_changed() {
            self.persist(&state.board).await;
            self.notify(&state.board);
        }
        outcome
    }

    /// Persist and announce a command mutation. A drag in flight is
    /// forgotten, since its saved origin no longer matches the board.
    async fn commit(&self, state: &mut StoreState) {
        if state.drag.abandon() {
            debug!("Board edited during a drag, dropping the drag session");
        }
        state.drag_owner = None;
        self.persist(&state.board).await;
        self.notify(&state.board);
    }

    async fn persist(&self, board: &Board) {
        let content = match codec::encode(board) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to encode board: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &content).await {
            warn!("Failed to persist board: {}", e);
        }
    }

    fn notify(&self, board: &Board) {
        // No subscribers is fine
        let _ = self.changes.send(BoardChanged {
            board: board.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::default_board;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore, DEFAULT_BOARD_KEY};
    use crate::Error;
    use async_trait::async_trait;
    use tempfile::tempdir;

    async fn memory_store() -> (BoardStore, Arc<MemoryKeyValueStore>) {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = BoardStore::load(kv.clone(), DEFAULT_BOARD_KEY).await.unwrap();
        (store, kv)
    }

    async fn saved_board(kv: &MemoryKeyValueStore) -> Board {
        let content = kv.get(DEFAULT_BOARD_KEY).await.unwrap().unwrap();
        codec::decode(&content).unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }
    }

    #[tokio::test]
    async fn test_load_seeds_default_board() {
        let (store, kv) = memory_store().await;
        assert_eq!(store.snapshot().await, default_board());
        assert_eq!(saved_board(&kv).await, default_board());
    }

    #[tokio::test]
    async fn test_load_with_custom_initial_board() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = BoardStore::load_or(kv, DEFAULT_BOARD_KEY, Board::new)
            .await
            .unwrap();
        assert!(store.snapshot().await.columns().is_empty());
    }

    #[tokio::test]
    async fn test_load_rejects_corrupt_board() {
        let kv = Arc::new(MemoryKeyValueStore::with_entry(DEFAULT_BOARD_KEY, "[{]"));
        assert!(BoardStore::load(kv.clone(), DEFAULT_BOARD_KEY).await.is_err());
        // Saved data is left alone
        assert_eq!(
            kv.get(DEFAULT_BOARD_KEY).await.unwrap().as_deref(),
            Some("[{]")
        );
    }

    #[tokio::test]
    async fn test_mutations_persist() {
        let (store, kv) = memory_store().await;

        let column = store.add_column("Review").await.unwrap();
        let card = store.add_card(&column.id, "Check PR").await.unwrap();
        assert!(store.move_card("Card1", &column.id, 0).await);
        store.delete_card("Column2", "Card4").await.unwrap();

        let saved = saved_board(&kv).await;
        assert_eq!(saved, store.snapshot().await);
        let review = saved.column(&column.id).unwrap();
        assert_eq!(review.cards[0].id, "Card1");
        assert_eq!(review.cards[1], card);
        assert!(saved.find_column("Card4").is_none());
    }

    #[tokio::test]
    async fn test_rejected_commands_do_not_notify() {
        let (store, _kv) = memory_store().await;
        let mut changes = store.subscribe();

        assert!(store.add_column("  ").await.is_none());
        assert!(store.add_card("Column1", "").await.is_none());
        assert!(store.add_card("Missing", "Task").await.is_none());
        assert!(store.delete_card("Column1", "Card3").await.is_none());
        assert!(!store.move_card("Card1", "Column1", 0).await);

        assert!(changes.try_recv().is_err());
        assert_eq!(store.snapshot().await, default_board());
    }

    #[tokio::test]
    async fn test_delete_column_requires_confirmation() {
        let (store, _kv) = memory_store().await;

        let outcome = store.delete_column("Column1", |_| false).await;
        assert_eq!(outcome, ColumnDeletion::Declined);
        assert_eq!(store.snapshot().await.columns().len(), 2);

        let outcome = store
            .delete_column("Column1", |column| column.title == "Column1")
            .await;
        match outcome {
            ColumnDeletion::Deleted(column) => assert_eq!(column.cards.len(), 2),
            other => panic!("Expected deletion, got: {:?}", other),
        }
        let board = store.snapshot().await;
        assert_eq!(board.columns().len(), 1);
        assert!(board.find_column("Card1").is_none());

        assert_eq!(
            store.delete_column("Column1", |_| true).await,
            ColumnDeletion::NotFound
        );
    }

    #[tokio::test]
    async fn test_drag_flow_notifies_and_persists() {
        let (store, kv) = memory_store().await;
        let mut changes = store.subscribe();

        store.drag_start("client-a", "Card2").await;
        let outcome = store.drag_over(&DragMove::new("Card2", Some("Card3"))).await;
        assert!(outcome.board_changed());

        let changed = changes.recv().await.unwrap();
        let column2: Vec<String> = changed.board.column("Column2").unwrap().cards.iter().map(|c| c.id.clone()).collect();
        assert_eq!(column2, vec!["Card2", "Card3", "Card4"]);

        store.drag_end(&DragMove::new("Card2", Some("Card2"))).await;
        assert_eq!(saved_board(&kv).await, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_drag_cancel_restores_saved_board() {
        let (store, kv) = memory_store().await;

        store.drag_start("client-a", "Card1").await;
        store.drag_over(&DragMove::new("Card1", Some("Column2"))).await;
        let outcome = store.drag_cancel().await;

        assert_eq!(outcome, DragOutcome::Cancelled { restored: true });
        assert_eq!(store.snapshot().await, default_board());
        assert_eq!(saved_board(&kv).await, default_board());
    }

    #[tokio::test]
    async fn test_restart_restore_is_persisted_and_notified() {
        let (store, kv) = memory_store().await;

        store.drag_start("client-a", "Card1").await;
        store.drag_over(&DragMove::new("Card1", Some("Column2"))).await;
        let mut changes = store.subscribe();

        let outcome = store.drag_start("client-a", "Card3").await;
        assert!(outcome.board_changed());

        let board = store.snapshot().await;
        assert_eq!(board, default_board());
        assert_eq!(saved_board(&kv).await, board);
        assert_eq!(changes.try_recv().unwrap().board, board);
    }

    #[tokio::test]
    async fn test_release_drag_cancels_only_for_owner() {
        let (store, kv) = memory_store().await;

        store.drag_start("client-a", "Card1").await;
        store.drag_over(&DragMove::new("Card1", Some("Column2"))).await;

        assert_eq!(store.release_drag("client-b").await, DragOutcome::Ignored);
        assert_eq!(store.snapshot().await.find_column("Card1").unwrap().id, "Column2");

        let outcome = store.release_drag("client-a").await;
        assert_eq!(outcome, DragOutcome::Cancelled { restored: true });
        assert_eq!(store.snapshot().await, default_board());
        assert_eq!(saved_board(&kv).await, default_board());

        // Nothing left to release
        assert_eq!(store.release_drag("client-a").await, DragOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_release_after_drop_is_ignored() {
        let (store, _kv) = memory_store().await;

        store.drag_start("client-a", "Card1").await;
        store.drag_end(&DragMove::new("Card1", Some("Card3"))).await;
        let board = store.snapshot().await;
        assert_eq!(board.find_column("Card1").unwrap().id, "Column2");

        assert_eq!(store.release_drag("client-a").await, DragOutcome::Ignored);
        assert_eq!(store.snapshot().await, board);
    }

    #[tokio::test]
    async fn test_command_during_drag_drops_session() {
        let (store, _kv) = memory_store().await;

        store.drag_start("client-a", "Card1").await;
        store.drag_over(&DragMove::new("Card1", Some("Column2"))).await;
        store.delete_card("Column2", "Card1").await.unwrap();

        // The drop no longer restores the deleted card
        let outcome = store.drag_end(&DragMove::new("Card1", None)).await;
        assert_eq!(outcome, DragOutcome::Ignored);
        assert!(store.snapshot().await.find_column("Card1").is_none());
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_change() {
        let store = BoardStore::load(Arc::new(FailingStore), DEFAULT_BOARD_KEY)
            .await
            .unwrap();

        let column = store.add_column("Later").await;
        assert!(column.is_some());
        assert_eq!(store.snapshot().await.columns().len(), 3);
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        {
            let kv = Arc::new(FileKeyValueStore::new(&path).await.unwrap());
            let store = BoardStore::load(kv, DEFAULT_BOARD_KEY).await.unwrap();
            store.move_card("Card4", "Column1", 1).await;
        }

        let kv = Arc::new(FileKeyValueStore::new(&path).await.unwrap());
        let store = BoardStore::load(kv, DEFAULT_BOARD_KEY).await.unwrap();
        let board = store.snapshot().await;
        let column1: Vec<&str> = board.column("Column1").unwrap().cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(column1, vec!["Card1", "Card4", "Card2"]);
    }
}
