//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use fiveby_core::schema::decode;
use fiveby_core::{SessionId, SessionSnapshot};
use serde_json::{json, Value};

pub const SESSION_A: &str = "0b6f9f0c-4a3e-4d8e-9c1f-2a3b4c5d6e7f";
pub const SESSION_B: &str = "7d1e2f3a-4b5c-4d6e-8f90-a1b2c3d4e5f6";

pub fn session_id(text: &str) -> SessionId {
    text.parse().unwrap()
}

fn cell_json(index: u8) -> Value {
    json!({
        "index": index,
        "row": index / 5,
        "col": index % 5,
        "revealed": false,
        "locked": false,
        "letter": null,
        "topics_used": [],
        "revealed_by": null
    })
}

fn player_json(number: u8, score: i64) -> Value {
    json!({
        "player_number": number,
        "name": format!("P{number}"),
        "score": score,
        "grid_id": "6f1c2a9e-3b4d-4c5e-8f7a-1b2c3d4e5f60",
        "completed": false,
        "cells": (0..25).map(cell_json).collect::<Vec<_>>()
    })
}

/// Valid in-progress snapshot; `marker` is stored as player 1's score so
/// tests can tell snapshots of the same session apart
pub fn snapshot_json(session: &str, marker: i64) -> Value {
    json!({
        "session_id": session,
        "status": "in_progress",
        "current_turn": 1,
        "topics": ["Politics", "Science", "History", "Art", "Current Affairs"],
        "players": [player_json(1, marker), player_json(2, 0)],
        "last_event": null
    })
}

pub fn snapshot(session: &str, marker: i64) -> SessionSnapshot {
    decode(snapshot_json(session, marker)).unwrap()
}

pub fn marker(snapshot: &SessionSnapshot) -> i64 {
    snapshot.players[0].score
}

pub async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    (base_url, handle)
}
