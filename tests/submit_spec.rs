//! Wire-contract tests against a stub processor.
//!
//! The stub records every multipart field it receives and answers according
//! to the route: a redirect, a JSON body with a `url`, or something
//! unrecognizable.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::post,
    Json, Router,
};
use encrypty::manifest::ManifestStore;
use encrypty::models::{Action, FileHandle};
use encrypty::submit::{ProcessorClient, SubmissionError};
use encrypty::traversal::memory::MemoryEntry;
use encrypty::traversal::traverse;

/// One multipart field as seen by the server.
#[derive(Debug, Clone)]
struct Field {
    name: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

type Received = Arc<Mutex<Vec<Field>>>;

async fn record(received: &Received, mut multipart: Multipart) {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("bad multipart") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.expect("bad field").to_vec();
        fields.push(Field {
            name,
            file_name,
            data,
        });
    }
    *received.lock().expect("lock poisoned") = fields;
}

async fn redirect_handler(State(received): State<Received>, multipart: Multipart) -> Redirect {
    record(&received, multipart).await;
    Redirect::to("/results/42")
}

async fn json_handler(
    State(received): State<Received>,
    multipart: Multipart,
) -> impl IntoResponse {
    record(&received, multipart).await;
    Json(serde_json::json!({ "url": "/results/7" }))
}

async fn unrecognized_handler(
    State(received): State<Received>,
    multipart: Multipart,
) -> impl IntoResponse {
    record(&received, multipart).await;
    (StatusCode::OK, Json(serde_json::json!({ "status": "queued" })))
}

async fn error_handler(
    State(received): State<Received>,
    multipart: Multipart,
) -> impl IntoResponse {
    record(&received, multipart).await;
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Start the stub processor on an ephemeral port.
async fn start_stub() -> (SocketAddr, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/redirect", post(redirect_handler))
        .route("/json", post(json_handler))
        .route("/unrecognized", post(unrecognized_handler))
        .route("/error", post(error_handler))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });
    (addr, received)
}

fn client(addr: SocketAddr, route: &str) -> ProcessorClient {
    ProcessorClient::new(&format!("http://{}{}", addr, route)).expect("Invalid endpoint")
}

async fn docs_manifest() -> ManifestStore {
    let docs = MemoryEntry::dir(
        "docs",
        vec![
            MemoryEntry::file("a.txt", "alpha"),
            MemoryEntry::dir("sub", vec![MemoryEntry::file("b.txt", "bravo")]),
        ],
    );
    let mut store = ManifestStore::new();
    traverse(&docs, "", &mut store).await;
    store.append(FileHandle::in_memory("loose.bin", vec![1u8, 2, 3]), "loose.bin");
    store
}

fn values<'a>(fields: &'a [Field], name: &str) -> Vec<&'a Field> {
    fields.iter().filter(|f| f.name == name).collect()
}

fn text(field: &Field) -> String {
    String::from_utf8(field.data.clone()).expect("field is not utf-8")
}

mod navigation {
    use super::*;

    #[tokio::test]
    async fn follows_redirect_destination() {
        let (addr, _) = start_stub().await;
        let store = docs_manifest().await;

        let target = client(addr, "/redirect")
            .submit(&store, Action::Encrypt, "secret")
            .await
            .expect("submission failed");

        assert_eq!(target.as_str(), "/results/42");
    }

    #[tokio::test]
    async fn resolves_redirect_against_endpoint() {
        let (addr, _) = start_stub().await;
        let store = docs_manifest().await;
        let client = client(addr, "/redirect");

        let target = client.submit(&store, Action::Encrypt, "").await.unwrap();

        assert_eq!(
            target.resolve(client.endpoint()).unwrap().as_str(),
            format!("http://{}/results/42", addr)
        );
    }

    #[tokio::test]
    async fn uses_url_from_json_body() {
        let (addr, _) = start_stub().await;
        let store = docs_manifest().await;

        let target = client(addr, "/json")
            .submit(&store, Action::Decrypt, "secret")
            .await
            .expect("submission failed");

        assert_eq!(target.as_str(), "/results/7");
    }

    #[tokio::test]
    async fn unrecognized_answer_fails_and_leaves_manifest_alone() {
        let (addr, _) = start_stub().await;
        let store = docs_manifest().await;
        let before: Vec<_> = store.snapshot().to_vec();

        let err = client(addr, "/unrecognized")
            .submit(&store, Action::Encrypt, "secret")
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::UnrecognizedResponse { .. }));
        assert_eq!(err.user_message(), "Upload failed or unexpected response.");
        assert_eq!(store.snapshot(), before.as_slice());
    }

    #[tokio::test]
    async fn server_error_without_url_fails() {
        let (addr, _) = start_stub().await;
        let store = docs_manifest().await;

        let err = client(addr, "/error")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap_err();

        match err {
            SubmissionError::UnrecognizedResponse { status } => {
                assert_eq!(status.as_u16(), 500)
            }
            other => panic!("expected UnrecognizedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_processor_is_a_transport_fault() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let store = docs_manifest().await;

        let err = client(addr, "/process")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Http(_)));
        assert_eq!(err.user_message(), "Error while uploading/processing files.");
    }
}

mod wire_format {
    use super::*;

    #[tokio::test]
    async fn sends_action_and_password() {
        let (addr, received) = start_stub().await;
        let store = docs_manifest().await;

        client(addr, "/json")
            .submit(&store, Action::Decrypt, "hunter2")
            .await
            .unwrap();

        let fields = received.lock().unwrap().clone();
        assert_eq!(text(values(&fields, "action")[0]), "decrypt");
        assert_eq!(text(values(&fields, "password")[0]), "hunter2");
    }

    #[tokio::test]
    async fn files_and_relpaths_are_aligned_and_in_order() {
        let (addr, received) = start_stub().await;
        let store = docs_manifest().await;

        client(addr, "/json")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap();

        let fields = received.lock().unwrap().clone();
        let files = values(&fields, "files");
        let relpaths = values(&fields, "relpaths");
        assert_eq!(files.len(), store.len());
        assert_eq!(relpaths.len(), store.len());

        let relpaths: Vec<String> = relpaths.into_iter().map(text).collect();
        assert_eq!(relpaths, vec!["docs/a.txt", "docs/sub/b.txt", "loose.bin"]);

        let names: Vec<_> = files.iter().map(|f| f.file_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "loose.bin"]);
        assert_eq!(files[0].data, b"alpha");
        assert_eq!(files[1].data, b"bravo");
        assert_eq!(files[2].data, vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn each_file_part_is_followed_by_its_path() {
        let (addr, received) = start_stub().await;
        let store = docs_manifest().await;

        client(addr, "/json")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap();

        let names: Vec<String> = received
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(
            names,
            vec![
                "action", "password", "files", "relpaths", "files", "relpaths", "files",
                "relpaths"
            ]
        );
    }

    #[tokio::test]
    async fn removals_are_reflected_in_the_payload() {
        let (addr, received) = start_stub().await;
        let mut store = docs_manifest().await;
        store.remove_at(0).unwrap();

        client(addr, "/json")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap();

        let fields = received.lock().unwrap().clone();
        let relpaths: Vec<String> = values(&fields, "relpaths").into_iter().map(text).collect();
        assert_eq!(relpaths, vec!["docs/sub/b.txt", "loose.bin"]);
        assert_eq!(values(&fields, "files")[0].data, b"bravo");
    }

    #[tokio::test]
    async fn empty_password_is_still_sent() {
        let (addr, received) = start_stub().await;
        let store = docs_manifest().await;

        client(addr, "/json")
            .submit(&store, Action::Encrypt, "")
            .await
            .unwrap();

        let fields = received.lock().unwrap().clone();
        assert_eq!(text(values(&fields, "password")[0]), "");
    }
}
