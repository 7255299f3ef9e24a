// Copyright 2024 Warden Project
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Demo server wiring warden abilities into an axum application.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use clap::Parser;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use warden_core::{args, Ability, Args, SubjectKey};
use warden_web::{
    with_authorization, AuthorizationBoundary, Enforcement, EnforcementConfig,
    RequestAuthorization, WebError,
};

/// Command line options; they override the environment.
#[derive(Parser, Debug)]
#[command(name = "warden-demo", about = "Serve a small API guarded by warden abilities")]
struct Cli {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Do not fail requests whose handler never authorized.
    #[arg(long)]
    skip_verification: bool,
}

#[tokio::main]
async fn main() -> Result<(), WebError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = EnforcementConfig::from_env()?;
    if cli.skip_verification {
        config.verify_authorized = false;
    }

    let app = app(AppState::seeded(), config);

    tracing::info!("listening on {}", cli.bind);
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct Comment {
    id: u64,
    author_id: u64,
    body: String,
}

#[derive(Debug, Clone, Serialize)]
struct PrivateMessage {
    id: u64,
    owner_id: u64,
    body: String,
}

#[derive(Clone)]
struct AppState {
    comments: Arc<RwLock<HashMap<u64, Comment>>>,
    messages: Arc<HashMap<u64, PrivateMessage>>,
}

impl AppState {
    fn seeded() -> Self {
        let comments = [
            Comment { id: 1, author_id: 7, body: "first!".to_string() },
            Comment { id: 2, author_id: 8, body: "agreed".to_string() },
        ];
        let messages = [
            PrivateMessage { id: 1, owner_id: 7, body: "see you at 5".to_string() },
            PrivateMessage { id: 2, owner_id: 8, body: "lunch?".to_string() },
        ];
        Self {
            comments: Arc::new(RwLock::new(comments.into_iter().map(|c| (c.id, c)).collect())),
            messages: Arc::new(messages.into_iter().map(|m| (m.id, m)).collect()),
        }
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: String,
}

fn actor_id(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

fn is_admin(headers: &HeaderMap) -> bool {
    headers
        .get("x-role")
        .map_or(false, |value| value.as_bytes() == b"admin")
}

/// The grants of the actor behind a request.
fn define_ability(headers: &HeaderMap) -> Ability {
    let actor = actor_id(headers);
    Ability::define(|ability| {
        if is_admin(headers) {
            ability.allow_anything();
        }
        ability.grant("read", SubjectKey::of::<Comment>());
        ability.grant_if("read", move |msg: &PrivateMessage, _: &Args<'_>| {
            actor == Some(msg.owner_id)
        });
        // authors delete their own comments; the caller passes the actor id
        ability.grant_if("delete", |comment: &Comment, args: &Args<'_>| {
            args.get::<u64>(0) == Some(&comment.author_id)
        });
    })
}

async fn health_check(Extension(auth): Extension<Arc<RequestAuthorization>>) -> impl IntoResponse {
    tracing::info!("Health check requested");
    auth.skip_authorization();
    let health = HealthStatus {
        status: "ok".to_string(),
    };
    (StatusCode::OK, Json(health))
}

async fn show_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<RequestAuthorization>>,
    Path(id): Path<u64>,
) -> Result<Json<Comment>, WebError> {
    let comments = state.comments.read().await;
    let comment = comments
        .get(&id)
        .ok_or_else(|| WebError::NotFound(format!("comment {}", id)))?;
    auth.authorize("read", comment, args![])?;
    Ok(Json(comment.clone()))
}

async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<RequestAuthorization>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, WebError> {
    let mut comments = state.comments.write().await;
    let comment = comments
        .get(&id)
        .ok_or_else(|| WebError::NotFound(format!("comment {}", id)))?;
    let actor = actor_id(auth.headers());
    auth.authorize("delete", comment, args![actor.unwrap_or_default()])?;
    comments.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn show_message(
    State(state): State<AppState>,
    Extension(auth): Extension<Arc<RequestAuthorization>>,
    Path(id): Path<u64>,
) -> Result<Json<PrivateMessage>, WebError> {
    let message = state
        .messages
        .get(&id)
        .ok_or_else(|| WebError::NotFound(format!("message {}", id)))?;
    auth.authorize("read", message, args![])?;
    Ok(Json(message.clone()))
}

// Forgets to authorize; verification turns this into a server error.
async fn list_messages(State(state): State<AppState>) -> Json<Vec<PrivateMessage>> {
    Json(state.messages.values().cloned().collect())
}

fn app(state: AppState, config: EnforcementConfig) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/comments/:id", get(show_comment).delete(delete_comment))
        .route("/messages", get(list_messages))
        .route("/messages/:id", get(show_message))
        .with_state(state);

    with_authorization(routes, Enforcement::new(define_ability, config))
        .layer(TraceLayer::new_for_http())
}
