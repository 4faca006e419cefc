//! Shared test utilities for radstudy-server integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use radstudy_core::StorageConfig;
use radstudy_core::catalog::AssetPaths;
use radstudy_server::{AppState, ServerConfig, StudyServer};
use tokio::net::TcpListener;

/// Writes a four-case asset directory
pub fn write_assets(dir: &Path) {
    let cases = [
        r#"{"case": "Chest pain after exercise.", "topics": ["Chest Pain"]}"#,
        r#"{"case": "Headache with fever.", "topics": ["Headache"]}"#,
        r#"{"case": "Ankle twisted playing football.", "topics": ["Ankle Trauma"]}"#,
        r#"{"case": "Acute shortness of breath.", "topics": ["Chest Pain", "Dyspnea"]}"#,
    ];
    std::fs::write(dir.join("cases.jsonl"), cases.join("\n")).unwrap();
    std::fs::write(
        dir.join("demo.jsonl"),
        r#"{"case": "Demo case.", "topics": ["Chest Pain"]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("guidelines.jsonl"),
        concat!(
            r#"{"Topic": "Chest Pain", "Scenarios": [{"Scenario": "Initial imaging", "Studies": ["#,
            r#"{"Procedure": "Radiography chest", "Adult RRL": 1, "Appropriateness Category": "Usually appropriate"},"#,
            r#"{"Procedure": "CT chest with IV contrast", "Adult RRL": 3, "Appropriateness Category": "May be appropriate"}"#,
            r#"]}]}"#,
            "\n",
            r#"{"Topic": "Headache", "Scenarios": [{"Scenario": "Fever", "Studies": ["#,
            r#"{"Procedure": "MRI head without IV contrast", "Adult RRL": 0, "Appropriateness Category": "Usually appropriate"}"#,
            r#"]}]}"#,
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("studies.txt"),
        "Radiography chest\nCT chest with IV contrast\nMRI head without IV contrast\n",
    )
    .unwrap();
}

/// Loads state from `assets` with responses appended to `responses`
pub async fn load_state(assets: &Path, responses: &Path) -> AppState {
    AppState::load(
        &AssetPaths::in_dir(assets),
        &Default::default(),
        &Default::default(),
        &StorageConfig::Jsonl {
            path: responses.to_path_buf(),
        },
    )
    .await
    .unwrap()
}

/// Spawns server in background task, returns bound address
pub async fn spawn_server(state: AppState) -> (Arc<AppState>, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(state);

    let server = StudyServer::with_state(ServerConfig::default(), Arc::clone(&state));
    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    (state, addr)
}
