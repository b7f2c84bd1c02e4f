use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todo_core::{Envelope, ErrorCode, SetDone, Todo, TodoApi};
use todo_server::{app, app_with_store, MemoryStore, ServerCaller, SqliteStore, TodoRouter};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn data<T: serde::de::DeserializeOwned>(envelope: Envelope) -> T {
    match envelope {
        Envelope::Success { data } => serde_json::from_value(data).unwrap(),
        Envelope::Failure(shape) => panic!("expected success, got {shape:?}"),
    }
}

fn error_code(envelope: &Envelope) -> ErrorCode {
    match envelope {
        Envelope::Failure(shape) => shape.data.code,
        Envelope::Success { data } => panic!("expected failure, got {data}"),
    }
}

// --- getTodos ---

#[tokio::test]
async fn get_todos_empty() {
    let resp = app().oneshot(get("/api/trpc/todo.getTodos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = data(body_json(resp).await);
    assert!(todos.is_empty());
}

#[tokio::test]
async fn get_todos_via_post_is_not_supported() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.getTodos", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(error_code(&envelope), ErrorCode::MethodNotSupported);
}

// --- addTodo ---

#[tokio::test]
async fn add_todo_returns_created_record() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.addTodo", r#""buy milk""#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todo: Todo = data(body_json(resp).await);
    assert_eq!(
        todo,
        Todo {
            id: 1,
            content: "buy milk".to_string(),
            done: false
        }
    );
}

#[tokio::test]
async fn add_todo_with_object_input_returns_400() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.addTodo", r#"{"content":"buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(error_code(&envelope), ErrorCode::BadRequest);
}

#[tokio::test]
async fn add_todo_malformed_json_returns_parse_error() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.addTodo", "buy milk"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(error_code(&envelope), ErrorCode::ParseError);
}

#[tokio::test]
async fn add_todo_via_get_is_not_supported() {
    let resp = app()
        .oneshot(get("/api/trpc/todo.addTodo?input=%22x%22"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// --- setDone ---

#[tokio::test]
async fn set_done_not_found() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.setDone", r#"{"id":1,"done":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(error_code(&envelope), ErrorCode::NotFound);
}

#[tokio::test]
async fn set_done_missing_field_returns_400() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.setDone", r#"{"id":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- unknown procedure ---

#[tokio::test]
async fn unknown_procedure_returns_404() {
    let resp = app()
        .oneshot(get("/api/trpc/todo.deleteTodo"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope: Envelope = body_json(resp).await;
    match envelope {
        Envelope::Failure(shape) => {
            assert_eq!(shape.message, r#"No "query"-procedure on path "todo.deleteTodo""#);
            assert_eq!(shape.data.path.as_deref(), Some("todo.deleteTodo"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

// --- batching ---

#[tokio::test]
async fn batch_of_mutations_runs_every_call() {
    let store = Arc::new(MemoryStore::new());
    let resp = app_with_store(store.clone())
        .oneshot(post(
            "/api/trpc/todo.addTodo,todo.addTodo?batch=1",
            r#"{"0":"first","1":"second"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelopes: Vec<Envelope> = body_json(resp).await;
    let created: Vec<Todo> = envelopes.into_iter().map(data).collect();
    assert_eq!(created[0].content, "first");
    assert_eq!(created[1].content, "second");
    assert_ne!(created[0].id, created[1].id);
}

#[tokio::test]
async fn batch_with_one_failure_is_multi_status() {
    let resp = app()
        .oneshot(post(
            "/api/trpc/todo.addTodo,todo.setDone?batch=1",
            r#"{"0":"a","1":{"id":99,"done":true}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 207);
    let envelopes: Vec<Envelope> = body_json(resp).await;
    assert_eq!(envelopes.len(), 2);
    let todo: Todo = data(envelopes[0].clone());
    assert_eq!(todo.content, "a");
    assert_eq!(error_code(&envelopes[1]), ErrorCode::NotFound);
}

#[tokio::test]
async fn batch_of_queries_reads_input_from_query_string() {
    let resp = app()
        .oneshot(get(
            "/api/trpc/todo.getTodos,todo.getTodos?batch=1&input=%7B%7D",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let envelopes: Vec<Envelope> = body_json(resp).await;
    assert_eq!(envelopes.len(), 2);
    for envelope in envelopes {
        let todos: Vec<Todo> = data(envelope);
        assert!(todos.is_empty());
    }
}

#[tokio::test]
async fn batch_input_must_be_an_object() {
    let resp = app()
        .oneshot(post("/api/trpc/todo.addTodo?batch=1", r#"["a"]"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(error_code(&envelope), ErrorCode::BadRequest);
}

// --- full lifecycle ---

#[tokio::test]
async fn todo_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // add
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(post("/api/trpc/todo.addTodo", r#""buy milk""#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Todo = data(body_json(resp).await);
    assert_eq!(created.id, 1);
    assert!(!created.done);

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/trpc/todo.getTodos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = data(body_json(resp).await);
    assert_eq!(todos, vec![created.clone()]);

    // set done
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(post("/api/trpc/todo.setDone", r#"{"id":1,"done":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = data(body_json(resp).await);
    assert_eq!(updated.content, "buy milk"); // unchanged
    assert!(updated.done);

    // set done again with the same value
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(post("/api/trpc/todo.setDone", r#"{"id":1,"done":true}"#))
        .await
        .unwrap();
    let again: Todo = data(body_json(resp).await);
    assert_eq!(again, updated);

    // missing id leaves the table alone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(post("/api/trpc/todo.setDone", r#"{"id":2,"done":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list reflects the update and nothing else
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/trpc/todo.getTodos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = data(body_json(resp).await);
    assert_eq!(todos, vec![updated]);
}

// --- in-process caller parity ---

#[tokio::test]
async fn caller_and_endpoint_agree() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let caller = ServerCaller::new(TodoRouter::new(store.clone()));
    let app = app_with_store(store);

    let via_caller = caller.add_todo("one".to_string()).await.unwrap();
    let resp = app
        .clone()
        .oneshot(post("/api/trpc/todo.addTodo", r#""two""#))
        .await
        .unwrap();
    let via_http: Todo = data(body_json(resp).await);
    assert_eq!(via_http.id, via_caller.id + 1);

    let caller_err = caller
        .set_done(SetDone { id: 42, done: true })
        .await
        .unwrap_err();
    let resp = app
        .clone()
        .oneshot(post("/api/trpc/todo.setDone", r#"{"id":42,"done":true}"#))
        .await
        .unwrap();
    let envelope: Envelope = body_json(resp).await;
    assert_eq!(caller_err.code(), Some(error_code(&envelope)));

    let resp = app.oneshot(get("/api/trpc/todo.getTodos")).await.unwrap();
    let via_http: Vec<Todo> = data(body_json(resp).await);
    assert_eq!(via_http, caller.get_todos().await.unwrap());
}

#[tokio::test]
async fn sqlite_backed_app_serves_procedures() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let app = app_with_store(store);

    let resp = app
        .clone()
        .oneshot(post("/api/trpc/todo.addTodo", r#""persist me""#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(get("/api/trpc/todo.getTodos")).await.unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(
        body,
        json!({"result": {"data": [{"id": 1, "content": "persist me", "done": false}]}})
    );
}
