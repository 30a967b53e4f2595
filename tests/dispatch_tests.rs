use serde_json::json;

mod common;
use common::{build_dispatcher, TestStore};

// Math and framework behavior driven end-to-end through the dispatcher.
// The retrieval endpoint is never contacted here; a dummy URL is enough.
const NO_RETRIEVAL: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn unknown_tool_yields_error_envelope() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let v = dispatcher.invoke("no_such_tool", &json!({})).await.to_value();
    assert_eq!(v["status"], "error");
    assert!(v["message"].as_str().unwrap().contains("unknown tool"));
}

#[tokio::test]
async fn divide_happy_path_and_by_zero() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);

    let v = dispatcher
        .invoke("divide", &json!({ "a": 10, "b": 2 }))
        .await
        .to_value();
    assert_eq!(v["status"], "success");
    assert_eq!(v["result"], 5.0);

    let v = dispatcher
        .invoke("divide", &json!({ "a": 10, "b": 0 }))
        .await
        .to_value();
    assert_eq!(v["status"], "error");
    assert!(v["message"].as_str().unwrap().contains("division by zero"));
}

#[tokio::test]
async fn factorial_through_dispatcher() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);

    let v = dispatcher
        .invoke("factorial", &json!({ "n": 5 }))
        .await
        .to_value();
    assert_eq!(v["status"], "success");
    assert_eq!(v["result"], 120);

    let v = dispatcher
        .invoke("factorial", &json!({ "n": -1 }))
        .await
        .to_value();
    assert_eq!(v["status"], "error");
    assert!(v["message"].as_str().unwrap().contains("negative"));

    // above the warn threshold: still a success
    let v = dispatcher
        .invoke("factorial", &json!({ "n": 21 }))
        .await
        .to_value();
    assert_eq!(v["status"], "success");
    assert_eq!(v["result"], "51090942171709440000");
}

#[tokio::test]
async fn missing_operands_are_reported_together() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let v = dispatcher.invoke("add", &json!({})).await.to_value();
    assert_eq!(v["status"], "error");
    let msg = v["message"].as_str().unwrap();
    assert!(msg.contains("required fields: a, b"), "{msg}");
}

#[tokio::test]
async fn numeric_strings_are_coerced() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let v = dispatcher
        .invoke("multiply", &json!({ "a": "6", "b": "7" }))
        .await
        .to_value();
    assert_eq!(v["status"], "success");
    assert_eq!(v["result"], 42.0);
}

#[tokio::test]
async fn non_numeric_operand_is_invalid_argument() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let v = dispatcher
        .invoke("add", &json!({ "a": "two", "b": 3 }))
        .await
        .to_value();
    assert_eq!(v["status"], "error");
    assert!(v["message"].as_str().unwrap().contains("must be a number"));
}

#[tokio::test]
async fn discovery_lists_every_tool_in_registration_order() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let names: Vec<String> = dispatcher
        .registry()
        .list()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "add",
            "subtract",
            "multiply",
            "divide",
            "power",
            "factorial",
            "add_task",
            "list_all_tasks",
            "list_tasks_by_priority",
            "update_task",
            "delete_task",
            "retrieve",
        ]
    );
}

#[tokio::test]
async fn descriptors_carry_tags_and_param_specs() {
    let ts = TestStore::new();
    let dispatcher = build_dispatcher(ts.store.clone(), NO_RETRIEVAL);
    let descriptors = dispatcher.registry().list();
    let add = descriptors.iter().find(|d| d.name == "add").unwrap();
    assert!(add.tags.contains(&"math".to_string()));
    assert_eq!(add.params.len(), 2);
    assert!(add.params.iter().all(|p| p.required));

    let add_task = descriptors.iter().find(|d| d.name == "add_task").unwrap();
    let status = add_task.params.iter().find(|p| p.name == "status").unwrap();
    assert_eq!(status.type_, "enum");
    assert_eq!(
        status.allowed.as_deref(),
        Some(&["pending".to_string(), "done".into(), "notneeded".into()][..])
    );
}

#[tokio::test]
async fn concurrent_invocations_do_not_interfere() {
    let ts = TestStore::new();
    let dispatcher = std::sync::Arc::new(build_dispatcher(ts.store.clone(), NO_RETRIEVAL));

    let mut handles = Vec::new();
    for i in 0..8i64 {
        let d = std::sync::Arc::clone(&dispatcher);
        handles.push(tokio::spawn(async move {
            d.invoke("add", &json!({ "a": i, "b": 1 })).await.to_value()
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        let v = handle.await.unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["result"], (i as f64) + 1.0);
    }
}
