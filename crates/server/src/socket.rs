//! Socket.IO event handlers for real-time communication
//!
//! Browsers send board commands and drag gestures over the socket. Every
//! committed change is pushed to all clients as `board:sync` by a relay task
//! that follows the board store's change notifications.

use serde::{Deserialize, Serialize};
use socketioxide::extract::{Data, SocketRef, State};
use socketioxide::{SocketIo, TransportType};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use kanban_core::board::{Board, BoardChanged, BoardStore, ColumnDeletion};
use kanban_core::drag::{DragMove, DragOutcome};

/// Shared state for Socket.IO handlers
#[derive(Clone)]
pub struct SocketState {
    pub board_store: BoardStore,
}

// ============ Event Payloads ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddColumnPayload {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumnPayload {
    pub column_id: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardPayload {
    pub column_id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCardPayload {
    pub column_id: String,
    pub card_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardPayload {
    pub card_id: String,
    pub column_id: String,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragStartPayload {
    pub active_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}

// ============ Event Handlers ============

/// Handle new socket connection
pub async fn on_connect(socket: SocketRef, State(state): State<SocketState>) {
    info!("Client connected: {}", socket.id);

    // Clients render from the first sync
    send_sync(&socket, &state.board_store.snapshot().await);

    socket.on(
        "board:request-sync",
        |socket: SocketRef, State(state): State<SocketState>| async move {
            info!("Client {} requested sync", socket.id);
            send_sync(&socket, &state.board_store.snapshot().await);
        },
    );

    socket.on(
        "board:add-column",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<AddColumnPayload>| async move {
            if state.board_store.add_column(&data.title).await.is_none() {
                send_error(&socket, "Column title cannot be empty");
            }
        },
    );

    socket.on(
        "board:delete-column",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<DeleteColumnPayload>| async move {
            let confirmed = data.confirmed;
            match state.board_store.delete_column(&data.column_id, |_| confirmed).await {
                ColumnDeletion::Deleted(_) | ColumnDeletion::Declined => {}
                ColumnDeletion::NotFound => {
                    send_error(&socket, format!("Column not found: {}", data.column_id));
                }
            }
        },
    );

    socket.on(
        "board:add-card",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<AddCardPayload>| async move {
            if state
                .board_store
                .add_card(&data.column_id, &data.title)
                .await
                .is_none()
            {
                send_error(&socket, format!("Cannot add card to column {}", data.column_id));
            }
        },
    );

    socket.on(
        "board:delete-card",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<DeleteCardPayload>| async move {
            if state
                .board_store
                .delete_card(&data.column_id, &data.card_id)
                .await
                .is_none()
            {
                send_error(&socket, format!("Card not found: {}", data.card_id));
            }
        },
    );

    socket.on(
        "board:move-card",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<MoveCardPayload>| async move {
            let store = &state.board_store;
            if !store.move_card(&data.card_id, &data.column_id, data.index).await {
                let board = store.snapshot().await;
                if board.card(&data.card_id).is_none() || board.column(&data.column_id).is_none() {
                    send_error(&socket, format!("Cannot move card {}", data.card_id));
                }
            }
        },
    );

    socket.on(
        "drag:start",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<DragStartPayload>| async move {
            let outcome = state
                .board_store
                .drag_start(&socket.id.to_string(), &data.active_id)
                .await;
            log_drag(&socket, "start", &outcome);
        },
    );

    socket.on(
        "drag:over",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<DragMove>| async move {
            let outcome = state.board_store.drag_over(&data).await;
            log_drag(&socket, "over", &outcome);
        },
    );

    socket.on(
        "drag:end",
        |socket: SocketRef, State(state): State<SocketState>, Data(data): Data<DragMove>| async move {
            let outcome = state.board_store.drag_end(&data).await;
            log_drag(&socket, "end", &outcome);
            // Dropping in place changes nothing, but the client still needs
            // to settle its view
            if !outcome.board_changed() {
                send_sync(&socket, &state.board_store.snapshot().await);
            }
        },
    );

    socket.on(
        "drag:cancel",
        |socket: SocketRef, State(state): State<SocketState>| async move {
            let outcome = state.board_store.drag_cancel().await;
            log_drag(&socket, "cancel", &outcome);
        },
    );

    socket.on_disconnect(|socket: SocketRef, State(state): State<SocketState>| async move {
        info!("Client disconnected: {}", socket.id);
        // A gesture left unfinished would keep its preview on everyone's board
        let outcome = state.board_store.release_drag(&socket.id.to_string()).await;
        if outcome != DragOutcome::Ignored {
            log_drag(&socket, "release", &outcome);
        }
    });
}

fn log_drag(socket: &SocketRef, event: &str, outcome: &DragOutcome) {
    debug!("Client {} drag:{} -> {:?}", socket.id, event, outcome);
}

fn send_sync(socket: &SocketRef, board: &Board) {
    if let Err(e) = socket.emit("board:sync", board) {
        warn!("Failed to emit sync: {}", e);
    }
}

fn send_error(socket: &SocketRef, message: impl Into<String>) {
    let message = message.into();
    warn!("Client {}: {}", socket.id, message);
    if let Err(e) = socket.emit("board:error", &ErrorPayload { message }) {
        warn!("Failed to emit error: {}", e);
    }
}

/// Push every board change to all connected clients
pub fn spawn_sync_relay(store: BoardStore, io: SocketIo) -> tokio::task::JoinHandle<()> {
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        while let Some(board) = next_board(&mut changes, &store).await {
            if let Err(e) = io.emit("board:sync", &board) {
                warn!("Failed to relay sync: {}", e);
            }
        }
        info!("Sync relay stopped");
    })
}

/// Wait for the next board to relay. A relay that fell behind catches up
/// with the current board. `None` once the store is gone.
async fn next_board(
    changes: &mut broadcast::Receiver<BoardChanged>,
    store: &BoardStore,
) -> Option<Board> {
    match changes.recv().await {
        Ok(change) => Some(change.board),
        Err(RecvError::Lagged(skipped)) => {
            warn!("Sync relay skipped {} changes, sending latest board", skipped);
            Some(store.snapshot().await)
        }
        Err(RecvError::Closed) => None,
    }
}

/// Create and configure Socket.IO layer
pub fn create_socket_layer(state: SocketState) -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::builder()
        .with_state(state)
        // Only allow WebSocket transport to avoid CORS issues with polling
        .transports([TransportType::Websocket])
        .build_layer();

    io.ns("/", on_connect);

    (layer, io)
}
