//! Board API endpoints
//!
//! RESTful API for columns and cards.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use kanban_core::board::{Board, Card, Column, ColumnDeletion};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteColumnQuery {
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub column_id: String,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/board - Full board
async fn get_board(State(state): State<AppState>) -> Json<Board> {
    Json(state.board_store().snapshot().await)
}

/// POST /api/columns - Append a column
async fn create_column(
    State(state): State<AppState>,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Column>), ApiError> {
    let column = state
        .board_store()
        .add_column(&req.title)
        .await
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Title cannot be empty"))?;

    Ok((StatusCode::CREATED, Json(column)))
}

/// DELETE /api/columns/{id}?confirmed=true - Delete a column and its cards
async fn delete_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteColumnQuery>,
) -> Result<StatusCode, ApiError> {
    match state
        .board_store()
        .delete_column(&id, |_| query.confirmed)
        .await
    {
        ColumnDeletion::Deleted(_) => Ok(StatusCode::NO_CONTENT),
        ColumnDeletion::Declined => Err(api_error(
            StatusCode::CONFLICT,
            "Column deletion must be confirmed",
        )),
        ColumnDeletion::NotFound => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Column {} not found", id),
        )),
    }
}

/// POST /api/columns/{id}/cards - Append a card to a column
async fn create_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TitleRequest>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Title cannot be empty"));
    }

    let card = state
        .board_store()
        .add_card(&id, &req.title)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Column {} not found", id)))?;

    Ok((StatusCode::CREATED, Json(card)))
}

/// DELETE /api/columns/{id}/cards/{card_id} - Remove a card
async fn delete_card(
    State(state): State<AppState>,
    Path((id, card_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .board_store()
        .delete_card(&id, &card_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("Card {} not found in column {}", card_id, id),
            )
        })
}

/// POST /api/cards/{id}/move - Move a card to a column position
async fn move_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveCardRequest>,
) -> Result<Json<Board>, ApiError> {
    let store = state.board_store();
    if !store.move_card(&id, &req.column_id, req.index).await {
        // Not moving is fine as long as both ids exist
        let board = store.snapshot().await;
        if board.card(&id).is_none() {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Card {} not found", id),
            ));
        }
        if board.column(&req.column_id).is_none() {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Column {} not found", req.column_id),
            ));
        }
        return Ok(Json(board));
    }

    Ok(Json(store.snapshot().await))
}

/// Create the board router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/board", get(get_board))
        .route("/api/columns", post(create_column))
        .route("/api/columns/{id}", delete(delete_column))
        .route("/api/columns/{id}/cards", post(create_card))
        .route("/api/columns/{id}/cards/{card_id}", delete(delete_card))
        .route("/api/cards/{id}/move", post(move_card))
}
