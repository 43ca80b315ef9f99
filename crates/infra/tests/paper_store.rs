//! Paper store caching, job polling and batch loading against a mock server.

mod support;

use std::time::Duration;

use futures::future::join_all;
use paperlens_domain::{ClientError, PaperQuery, TranslateRequest};
use paperlens_infra::PaperLensClient;
use serde_json::{json, Value};
use support::{envelope, json_response, logged_in_client, paper_body, Sequence};
use wiremock::matchers::{body_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAPER_ID: &str = "2301.00001";

fn task_status(task_id: &str, status: &str) -> Value {
    json!({"task_id": task_id, "status": status, "created_at": "2024-03-01T08:00:00"})
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

async fn mount_score_start(server: &MockServer, task_id: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/papers/{PAPER_ID}/ai-score/async")))
        .respond_with(json_response(200, envelope(json!({"task_id": task_id, "arxiv_id": PAPER_ID}))))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, task_id: &str, responder: Sequence) {
    Mock::given(method("GET"))
        .and(path(format!("/papers/ai-score/tasks/{task_id}")))
        .respond_with(responder)
        .mount(server)
        .await;
}

async fn client(server: &MockServer) -> PaperLensClient {
    logged_in_client(server, "A1", "R1").await
}

#[tokio::test]
async fn concurrent_detail_requests_hit_server_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/papers/{PAPER_ID}")))
        .respond_with(
            json_response(200, envelope(paper_body(PAPER_ID)))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let results = join_all((0..3).map(|_| client.get_paper_detail(PAPER_ID))).await;

    let details: Vec<_> = results.into_iter().map(|r| r.expect("detail")).collect();
    assert!(details.iter().all(|d| d == &details[0]));
    assert_eq!(client.store().peek_paper_detail(PAPER_ID), Some(details[0].clone()));
}

#[tokio::test]
async fn failed_detail_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/papers/{PAPER_ID}")))
        .respond_with(json_response(404, json!({"detail": "Paper not found"})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server).await;
    assert_eq!(client.get_paper_detail(PAPER_ID).await.unwrap_err().status(), Some(404));
    assert_eq!(client.get_paper_detail(PAPER_ID).await.unwrap_err().status(), Some(404));
    assert!(client.store().peek_paper_detail(PAPER_ID).is_none());
}

#[tokio::test]
async fn ai_score_is_polled_until_complete_then_stops() {
    let server = MockServer::start().await;
    mount_score_start(&server, "t-1", 1).await;
    let statuses = Sequence::new(vec![
        json_response(200, task_status("t-1", "pending")),
        json_response(200, task_status("t-1", "processing")),
        json_response(
            200,
            json!({"task_id": "t-1", "status": "completed", "result": {"score": 81.5}}),
        ),
    ]);
    mount_status(&server, "t-1", statuses.clone()).await;

    let client = client(&server).await;
    let summary = client.store().fetch_ai_score(PAPER_ID).await.expect("score");

    assert_eq!(summary.score, Some(81.5));
    assert_eq!(client.store().peek_ai_score(PAPER_ID), Some(summary));
    assert!(wait_until(|| client.store().active_polls() == 0).await);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(statuses.calls(), 3, "no status checks after completion");
}

#[tokio::test]
async fn get_ai_score_starts_job_in_background() {
    let server = MockServer::start().await;
    mount_score_start(&server, "t-2", 1).await;
    let statuses = Sequence::new(vec![
        json_response(200, task_status("t-2", "processing")),
        json_response(200, json!({"task_id": "t-2", "status": "completed", "result": {"score": 64.0}})),
    ]);
    mount_status(&server, "t-2", statuses).await;

    let client = client(&server).await;
    assert_eq!(client.get_ai_score(PAPER_ID).await.unwrap(), None);
    assert!(client.store().is_scoring(PAPER_ID));

    // A second caller joins the running job instead of starting another.
    let summary = client.get_ai_score(PAPER_ID).await.unwrap();
    assert_eq!(summary.and_then(|s| s.score), Some(64.0));

    let cached = client.get_ai_score(PAPER_ID).await.unwrap();
    assert_eq!(cached.and_then(|s| s.score), Some(64.0));
}

#[tokio::test]
async fn duplicate_starts_create_one_job() {
    let server = MockServer::start().await;
    mount_score_start(&server, "t-3", 1).await;
    mount_status(
        &server,
        "t-3",
        Sequence::new(vec![json_response(200, task_status("t-3", "processing"))]),
    )
    .await;

    let client = client(&server).await;
    let store = client.store();
    let (first, second) = tokio::join!(store.start_ai_score(PAPER_ID), store.start_ai_score(PAPER_ID));

    assert_eq!(
        [first.unwrap(), second.unwrap()].iter().filter(|created| **created).count(),
        1
    );
    assert_eq!(store.active_polls(), 1);

    store.clear_cache();
    assert!(wait_until(|| store.active_polls() == 0).await);
}

#[tokio::test]
async fn clear_cache_stops_polling() {
    let server = MockServer::start().await;
    mount_score_start(&server, "t-4", 1).await;
    let statuses = Sequence::new(vec![json_response(200, task_status("t-4", "pending"))]);
    mount_status(&server, "t-4", statuses.clone()).await;

    let client = client(&server).await;
    assert!(client.store().start_ai_score(PAPER_ID).await.unwrap());
    assert!(wait_until(|| statuses.calls() >= 2).await);

    client.store().clear_cache();
    assert!(wait_until(|| client.store().active_polls() == 0).await);

    let settled = statuses.calls();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(statuses.calls(), settled, "timer must not outlive the cache");
    assert!(client.store().peek_ai_score(PAPER_ID).is_none());
}

#[tokio::test]
async fn failed_job_surfaces_reason_without_retry() {
    let server = MockServer::start().await;
    mount_score_start(&server, "t-5", 1).await;
    let statuses = Sequence::new(vec![json_response(
        200,
        json!({"task_id": "t-5", "status": "failed", "error": "model overloaded"}),
    )]);
    mount_status(&server, "t-5", statuses.clone()).await;

    let client = client(&server).await;
    let err = client.store().fetch_ai_score(PAPER_ID).await.unwrap_err();

    assert_eq!(
        err,
        ClientError::JobFailed { job_id: "t-5".into(), reason: "model overloaded".into() }
    );
    assert!(!client.store().is_scoring(PAPER_ID));
    assert!(client.store().peek_ai_score(PAPER_ID).is_none());
    assert_eq!(statuses.calls(), 1);
}

#[tokio::test]
async fn batch_details_skip_cached_and_count_failures() {
    let server = MockServer::start().await;
    for id in ["2301.00002", "2301.00003"] {
        Mock::given(method("GET"))
            .and(path(format!("/papers/{id}")))
            .respond_with(json_response(200, paper_body(id)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/papers/2301.00004"))
        .respond_with(json_response(404, json!({"detail": "Paper not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let cached: paperlens_domain::PaperDetail =
        serde_json::from_value(paper_body(PAPER_ID)).unwrap();
    client.store().put_paper_detail(cached);

    let ids = ["2301.00001", "2301.00002", "2301.00003", "2301.00004", "2301.00002"]
        .map(String::from)
        .to_vec();
    let report = client.store().batch_get_paper_details(ids).await;

    assert_eq!(report.dispatched, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].0, "2301.00004");
    assert!(client.store().peek_paper_detail("2301.00003").is_some());
}

#[tokio::test]
async fn batch_ai_scores_only_start_jobs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/papers/[^/]+/ai-score/async$"))
        .respond_with(json_response(200, json!({"task_id": "t-batch", "arxiv_id": "any"})))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/papers/ai-score/tasks/t-batch"))
        .respond_with(json_response(200, task_status("t-batch", "processing")))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let ids = vec!["2301.00001".to_string(), "2301.00002".to_string(), "2301.00003".to_string()];
    let report = client.store().batch_get_ai_scores(ids.clone()).await;

    assert_eq!(report.succeeded, 3);
    assert_eq!(client.store().active_polls(), 3);

    // Everything is in flight now, so a second batch dispatches nothing.
    let again = client.store().batch_get_ai_scores(ids).await;
    assert_eq!(again.dispatched, 0);
    assert_eq!(again.skipped, 3);

    client.store().clear_cache();
    assert!(wait_until(|| client.store().active_polls() == 0).await);
}

#[tokio::test]
async fn identical_translations_share_one_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/papers/translate/async"))
        .and(body_json(json!({"text": "Attention is all you need", "target_language": "zh"})))
        .respond_with(json_response(200, envelope(json!({"task_id": "tr-1"}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/papers/translate/tasks/tr-1"))
        .respond_with(Sequence::new(vec![
            json_response(200, json!({"task_id": "tr-1", "status": "processing"})),
            json_response(
                200,
                json!({"task_id": "tr-1", "status": "completed", "result": {"translated_text": "注意力就是你所需要的"}}),
            ),
        ]))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let request = TranslateRequest::new("Attention is all you need").with_target_language("zh");

    let (first, second) = tokio::join!(
        client.store().translate(request.clone()),
        client.store().translate(request.clone())
    );
    assert_eq!(first.unwrap().translated_text, "注意力就是你所需要的");
    assert_eq!(second.unwrap().translated_text, "注意力就是你所需要的");

    let cached = client.store().translate(request).await.unwrap();
    assert_eq!(cached.translated_text, "注意力就是你所需要的");
}

#[tokio::test]
async fn list_papers_applies_default_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/papers/"))
        .and(query_param("max_results", "100"))
        .and(query_param("category", "cs.LG"))
        .respond_with(json_response(
            200,
            envelope(json!({
                "papers": [paper_body(PAPER_ID)],
                "total": 1,
                "date_range": "2023-01-01 to 2023-01-07"
            })),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let query = PaperQuery { category: Some("cs.LG".into()), ..PaperQuery::default() };
    let papers = client.papers().list_papers(&query).await.unwrap();

    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0].arxiv_id, PAPER_ID);
}

#[tokio::test]
async fn collections_list_tolerates_non_array_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections"))
        .respond_with(json_response(200, envelope(json!({"unexpected": true}))))
        .mount(&server)
        .await;

    let client = client(&server).await;
    assert!(client.collections().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn collection_papers_are_added_and_removed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/7/papers/{PAPER_ID}")))
        .respond_with(json_response(200, envelope(json!({"message": "added"}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/collections/7/papers/{PAPER_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    client.collections().add_paper(7, PAPER_ID).await.unwrap();
    client.collections().remove_paper(7, PAPER_ID).await.unwrap();
}
