use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub id: Uuid,
    pub rows: u32,
    pub cols: u32,
    pub mines: u32,
    pub paused: bool,
    pub revealed: Vec<Cell>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

#[derive(Deserialize)]
pub struct CreateGame {
    pub rows: u32,
    pub cols: u32,
    pub mines: u32,
}

#[derive(Deserialize)]
pub struct UpdateGame {
    pub paused: Option<bool>,
}

/// What the echo endpoint saw, so clients can assert on the wire format.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub accept_language: Vec<String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Game>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    let games = Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/{id}", get(get_game).put(update_game).delete(delete_game))
        .route("/games/{id}/reveal", post(reveal_cell))
        .with_state(db);
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/broken", any(broken))
        .nest("/v1", games)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Failure body in the shape the API uses everywhere.
pub fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "error": {
                "status": status.as_u16(),
                "type": status.canonical_reason().unwrap_or("Error"),
                "userMessage": message,
            }
        })),
    )
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        accept_language: headers
            .get_all("accept-language")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect(),
        content_type: header_str("content-type"),
        user_agent: header_str("user-agent"),
        body,
    })
}

async fn broken() -> &'static str {
    "this is not json"
}

async fn list_games(State(db): State<Db>) -> Json<Vec<Game>> {
    let games = db.read().await;
    Json(games.values().cloned().collect())
}

async fn create_game(
    State(db): State<Db>,
    Json(input): Json<CreateGame>,
) -> ApiResult<(StatusCode, Json<Game>)> {
    let cells = u64::from(input.rows) * u64::from(input.cols);
    if cells == 0 || u64::from(input.mines) >= cells {
        return Err(error_body(StatusCode::BAD_REQUEST, "invalid board dimensions"));
    }
    let game = Game {
        id: Uuid::new_v4(),
        rows: input.rows,
        cols: input.cols,
        mines: input.mines,
        paused: false,
        revealed: Vec::new(),
    };
    db.write().await.insert(game.id, game.clone());
    tracing::debug!(id = %game.id, "game created");
    Ok((StatusCode::CREATED, Json(game)))
}

async fn get_game(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<Json<Game>> {
    let games = db.read().await;
    games
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "game not found"))
}

async fn update_game(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateGame>,
) -> ApiResult<Json<Game>> {
    let mut games = db.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "game not found"))?;
    if let Some(paused) = input.paused {
        game.paused = paused;
    }
    Ok(Json(game.clone()))
}

async fn delete_game(State(db): State<Db>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    let mut games = db.write().await;
    games
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "game not found"))
}

async fn reveal_cell(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(cell): Json<Cell>,
) -> ApiResult<Json<Game>> {
    let mut games = db.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "game not found"))?;
    if cell.row >= game.rows || cell.col >= game.cols {
        return Err(error_body(StatusCode::BAD_REQUEST, "cell out of bounds"));
    }
    if game.paused {
        return Err(error_body(StatusCode::CONFLICT, "game is paused"));
    }
    if !game.revealed.contains(&cell) {
        game.revealed.push(cell);
    }
    Ok(Json(game.clone()))
}
