//! Integration tests for tool task polling against a mock backend.

mod common;

use comicmaker_frontend::api::FormPayload;
use comicmaker_frontend::tasks::Backoff;
use comicmaker_frontend::{ApiClient, PollPolicy, TaskError, TaskPoller};
use comicmaker_types::TaskStatus;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn quick_policy(max_wait: Duration) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(20),
        backoff: Backoff::Fixed,
        max_wait,
    }
}

fn prompt() -> FormPayload {
    FormPayload::new().text("prompt", "a lighthouse")
}

#[tokio::test]
async fn test_run_polls_until_success_then_fetches_result() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));

    let payload = FormPayload::new().text("prompt", "a castle at dusk");
    let result = poller
        .run(
            "image",
            payload,
            &quick_policy(Duration::from_secs(5)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result["images"], json!(["outputs/frame_001.png"]));
    // queued, processing, completed
    assert_eq!(backend.count("GET", "/tasks/task-1/status"), 3);
    assert_eq!(backend.count("GET", "/tasks/task-1/result"), 1);

    let form = backend.last_form();
    assert_eq!(form[0].name, "prompt");
    assert_eq!(form[0].text.as_deref(), Some("a castle at dusk"));
}

#[tokio::test]
async fn test_status_is_tracked_between_polls() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));

    let id = poller.create_task("image", prompt()).await.unwrap();
    assert_eq!(poller.last_status(&id), Some(TaskStatus::Pending));

    assert_eq!(poller.poll_status(&id).await.unwrap(), TaskStatus::Pending);
    assert_eq!(poller.poll_status(&id).await.unwrap(), TaskStatus::Running);
    assert!(matches!(
        poller.get_result(&id).await,
        Err(TaskError::NotReady {
            status: Some(TaskStatus::Running),
            ..
        })
    ));
    assert_eq!(backend.count("GET", "/tasks/"), 2);

    assert_eq!(poller.poll_status(&id).await.unwrap(), TaskStatus::Succeeded);
    let result = poller.get_result(&id).await.unwrap();
    assert_eq!(poller.task(&id).unwrap().result, Some(result));
}

#[tokio::test]
async fn test_failed_task_reports_backend_message() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));

    let err = poller
        .run(
            "broken",
            prompt(),
            &quick_policy(Duration::from_secs(5)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        TaskError::Failed { message, .. } => assert_eq!(message, "GPU out of memory"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(backend.count("GET", "/tasks/task-1/result"), 0);
}

#[tokio::test]
async fn test_wait_gives_up_after_max_wait() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));

    let id = poller.create_task("slow", prompt()).await.unwrap();
    let err = poller
        .wait(
            &id,
            &quick_policy(Duration::from_millis(60)),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, TaskError::TimedOut { .. }));
    assert_eq!(poller.last_status(&id), Some(TaskStatus::Running));
}

#[tokio::test]
async fn test_cancel_stops_polling_locally() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));
    let id = poller.create_task("slow", prompt()).await.unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let err = poller
        .wait(&id, &quick_policy(Duration::from_secs(30)), &token)
        .await
        .unwrap_err();
    assert_eq!(err, TaskError::Cancelled(id.clone()));

    // A request already on the wire may still land once
    let polls = backend.count("GET", "/tasks/");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(backend.count("GET", "/tasks/") <= polls + 1);
}

#[tokio::test]
async fn test_unknown_task_surfaces_http_error() {
    let backend = common::spawn().await;
    let poller = TaskPoller::new(ApiClient::new(&backend.base_url));

    let err = poller
        .poll_status(&"missing".into())
        .await
        .unwrap_err();
    match err {
        TaskError::Api(api) => {
            assert_eq!(api.status(), Some(404));
            assert_eq!(api.message(), "Task missing not found");
        }
        other => panic!("unexpected error {:?}", other),
    }
}
