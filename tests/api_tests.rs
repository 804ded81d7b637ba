// tests/api_tests.rs

use std::{path::PathBuf, sync::Arc};

use quizroom::{
    config::{Config, StoreBackend},
    routes,
    state::AppState,
    store::{KvStore, MemoryStore, SqliteStore},
};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app_with(store: Arc<dyn KvStore>, lectures_dir: PathBuf) -> String {
    let config = Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
        store_backend: StoreBackend::Memory,
        database_url: None,
        lectures_dir,
    };

    let state = AppState { store, config };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn spawn_app() -> String {
    spawn_app_with(Arc::new(MemoryStore::new()), PathBuf::from("lectures")).await
}

fn room() -> String {
    format!("quiz_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

#[tokio::test]
async fn health_check_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);

    let health = client
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(health.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_room_reads_as_empty() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let room = room();

    let quiz: serde_json::Value = client
        .get(format!("{}/api/quiz?type=quiz&quizId={}", address, room))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert!(quiz.is_null());

    let students: serde_json::Value = client
        .get(format!("{}/api/quiz?type=students&quizId={}", address, room))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(students, json!([]));
}

#[tokio::test]
async fn saved_quiz_round_trips() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let room = room();
    let quiz = json!({
        "id": room,
        "name": "Networks",
        "questions": [{
            "text": "What is TCP?",
            "answers": [{"letter": "A", "text": "Transport"}, {"letter": "B", "text": "Filesystem"}],
            "correctAnswer": "A"
        }],
        "status": "waiting",
        "currentQuestionIndex": 0,
        "currentQuestionStartedAt": null,
        "startedAt": null
    });

    let saved: serde_json::Value = client
        .post(format!("{}/api/quiz?type=quiz&quizId={}", address, room))
        .json(&quiz)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(saved, json!({"success": true, "quizId": room}));

    let fetched: serde_json::Value = client
        .get(format!("{}/api/quiz?type=quiz&quizId={}", address, room))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, quiz);
}

#[tokio::test]
async fn students_save_reports_count() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let room = room();

    let response = client
        .post(format!("{}/api/quiz?type=students&quizId={}", address, room))
        .json(&json!([
            {"lastName": "Ivanov", "firstName": "Ivan", "joinedAt": "2025-01-01T10:00:00Z", "answers": [], "score": 0},
            {"lastName": "Petrova", "firstName": "Anna", "joinedAt": "2025-01-01T10:00:05Z", "answers": ["B"], "score": 0}
        ]))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true, "quizId": room, "count": 2}));
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Missing type
    let response = client
        .get(format!("{}/api/quiz?quizId=x", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("type"));

    // Unknown type
    let response = client
        .get(format!("{}/api/quiz?type=answers", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Students must be an array
    let response = client
        .post(format!("{}/api/quiz?type=students&quizId=x", address))
        .json(&json!({"lastName": "Ivanov"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Missing body
    let response = client
        .post(format!("{}/api/quiz?type=quiz&quizId=x", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Broken JSON
    let response = client
        .post(format!("{}/api/quiz?type=quiz&quizId=x", address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn missing_room_id_uses_default_room() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let saved: serde_json::Value = client
        .post(format!("{}/api/quiz?type=students", address))
        .json(&json!([]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved["quizId"], "default");
}

#[tokio::test]
async fn cors_is_open_and_options_succeeds() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("{}/api/quiz?type=quiz", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(response.text().await.unwrap().is_empty());

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("{}/api/quiz?type=quiz", address))
        .header("Origin", "https://lectures.example.org")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();
    assert_eq!(preflight.status().as_u16(), 200);
    assert_eq!(
        preflight.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );

    let get = client
        .get(format!("{}/api/quiz?type=quiz&quizId=x", address))
        .header("Origin", "https://lectures.example.org")
        .send()
        .await
        .unwrap();
    assert_eq!(
        get.headers()["access-control-allow-origin"].to_str().unwrap(),
        "*"
    );
}

#[tokio::test]
async fn delete_clears_the_record() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let room = room();
    let url = format!("{}/api/quiz?type=quiz&quizId={}", address, room);

    client.post(&url).json(&json!({"id": room})).send().await.unwrap();
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let fetched: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert!(fetched.is_null());
}

#[tokio::test]
async fn sqlite_backend_serves_the_same_contract() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite");
    let store = SqliteStore::new(pool);
    store.migrate().await.expect("Failed to migrate database");

    let address = spawn_app_with(Arc::new(store), PathBuf::from("lectures")).await;
    let client = reqwest::Client::new();
    let room = room();
    let url = format!("{}/api/quiz?type=students&quizId={}", address, room);

    let roster = json!([{"lastName": "Ivanov", "firstName": "Ivan", "joinedAt": "2025-01-01T10:00:00Z", "answers": [null, "C"], "score": 0}]);
    client.post(&url).json(&roster).send().await.unwrap();

    let fetched: serde_json::Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, roster);
}

#[tokio::test]
async fn lectures_and_manifest_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("intro.md"), "# Intro").unwrap();
    quizroom::utils::manifest::write_manifest(dir.path()).unwrap();

    let address = spawn_app_with(Arc::new(MemoryStore::new()), dir.path().to_path_buf()).await;
    let client = reqwest::Client::new();

    let lecture = client
        .get(format!("{}/lectures/intro.md", address))
        .send()
        .await
        .unwrap();
    assert_eq!(lecture.status().as_u16(), 200);
    assert_eq!(lecture.text().await.unwrap(), "# Intro");

    let index: serde_json::Value = client
        .get(format!("{}/lectures/index.json", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(index["files"][0]["path"], "intro.md");
    assert_eq!(index["files"][0]["size"], 7);
}
