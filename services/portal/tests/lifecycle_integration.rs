//! Applying, listing and withdrawing against a stateful fake backend

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use auth::models::AccountKind;
use portal::{ApplicationsView, ApplyOutcome, JobDetailsView, Notice, Phase, RemoveOutcome};
use serde_json::{Value, json};
use support::{posting, signed_in};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Applications stored server-side, shared by the three endpoints
#[derive(Clone, Default)]
struct Backend {
    applications: Arc<Mutex<Vec<Value>>>,
}

struct ApplyHandler(Backend);
struct ListHandler(Backend);
struct WithdrawHandler(Backend);

impl Respond for ApplyHandler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let job_id = body["jobId"].as_str().unwrap_or_default().to_string();

        let mut applications = self.0.applications.lock().unwrap();
        if applications.iter().any(|a| a["jobId"] == job_id.as_str()) {
            return ResponseTemplate::new(409)
                .set_body_json(json!({"message": "Already applied to this job"}));
        }

        let id = format!("app-{}", applications.len() + 1);
        applications.push(json!({
            "_id": id,
            "jobId": job_id,
            "userId": "u1",
            "appliedAt": "2024-05-01T10:00:00Z",
            "job": posting(&job_id, "Platform Engineer", "Full Time", "15 LPA"),
        }));
        ResponseTemplate::new(201).set_body_json(json!({"message": "Applied"}))
    }
}

impl Respond for ListHandler {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let applications = self.0.applications.lock().unwrap().clone();
        ResponseTemplate::new(200).set_body_json(json!({"applications": applications}))
    }
}

impl Respond for WithdrawHandler {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request.url.path().rsplit('/').next().unwrap_or_default();
        let mut applications = self.0.applications.lock().unwrap();
        let before = applications.len();
        applications.retain(|a| a["_id"] != id);

        if applications.len() == before {
            ResponseTemplate::new(404).set_body_json(json!({"message": "Application not found"}))
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"message": "Deleted"}))
        }
    }
}

async fn mount_backend(server: &MockServer) -> Backend {
    let backend = Backend::default();
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(ApplyHandler(backend.clone()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(ListHandler(backend.clone()))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/jobApplication/[^/]+$"))
        .respond_with(WithdrawHandler(backend.clone()))
        .mount(server)
        .await;
    backend
}

fn yes(_: &str) -> bool {
    true
}

fn no(_: &str) -> bool {
    false
}

#[tokio::test]
async fn test_apply_then_list_then_withdraw() {
    let server = MockServer::start().await;
    mount_backend(&server).await;
    let app = signed_in(&server, AccountKind::User);

    let details = JobDetailsView::open(&app, "job-42").entered().unwrap();
    assert_eq!(details.apply().await, ApplyOutcome::Applied);
    assert!(details.has_applied());
    assert!(matches!(details.notice(), Some(Notice::Success(_))));

    let mine = ApplicationsView::open(&app).entered().unwrap();
    assert_eq!(mine.load().await, Phase::Ready);
    let applications = mine.applications();
    let matching: Vec<_> = applications
        .iter()
        .filter(|a| a.job_ref() == Some("job-42"))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].title(), "Platform Engineer");

    let id = matching[0].id.clone();
    assert_eq!(mine.withdraw(&id, &yes).await, RemoveOutcome::Removed);
    assert!(!mine.contains(&id));

    mine.load().await;
    assert!(mine.applications().is_empty());
}

#[tokio::test]
async fn test_double_apply_sends_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"message": "Applied"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let details = JobDetailsView::open(&app, "job-1").entered().unwrap();

    let (first, second) = tokio::join!(details.apply(), details.apply());
    assert_eq!(first, ApplyOutcome::Applied);
    assert_eq!(second, ApplyOutcome::InFlight);

    // Known applied now, so nothing more is posted
    assert_eq!(details.apply().await, ApplyOutcome::AlreadyApplied);
    assert!(!details.is_applying());
}

#[tokio::test]
async fn test_details_flag_blocks_apply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/jobs/job-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job": posting("job-7", "QA Lead", "Part Time", "9 LPA"),
            "hasApplied": true,
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let details = JobDetailsView::open(&app, "job-7").entered().unwrap();

    assert_eq!(details.load().await, Phase::Ready);
    assert_eq!(details.job().map(|j| j.title), Some("QA Lead".to_string()));
    assert_eq!(details.apply().await, ApplyOutcome::AlreadyApplied);
}

#[tokio::test]
async fn test_conflict_marks_applied() {
    let server = MockServer::start().await;
    let backend = mount_backend(&server).await;
    let app = signed_in(&server, AccountKind::User);

    // Applied from somewhere else earlier
    let first = JobDetailsView::open(&app, "job-9").entered().unwrap();
    assert_eq!(first.apply().await, ApplyOutcome::Applied);

    let second = JobDetailsView::open(&app, "job-9").entered().unwrap();
    assert_eq!(second.apply().await, ApplyOutcome::AlreadyApplied);
    assert!(second.has_applied());
    assert_eq!(backend.applications.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_apply_failure_leaves_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Job is closed"})),
        )
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let details = JobDetailsView::open(&app, "job-3").entered().unwrap();

    assert_eq!(
        details.apply().await,
        ApplyOutcome::Failed("Job is closed".to_string())
    );
    assert!(!details.has_applied());
    assert_eq!(
        details.notice(),
        Some(Notice::Error("Job is closed".to_string()))
    );
}

#[tokio::test]
async fn test_answer_after_leaving_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let details = JobDetailsView::open(&app, "job-5").entered().unwrap();

    let (outcome, ()) = tokio::join!(details.apply(), async { details.leave() });

    assert_eq!(outcome, ApplyOutcome::Discarded);
    assert!(!details.has_applied());
}

#[tokio::test]
async fn test_withdraw_declined_sends_nothing() {
    let server = MockServer::start().await;
    let backend = mount_backend(&server).await;
    let app = signed_in(&server, AccountKind::User);

    let details = JobDetailsView::open(&app, "job-1").entered().unwrap();
    details.apply().await;

    let mine = ApplicationsView::open(&app).entered().unwrap();
    mine.load().await;
    let id = mine.applications()[0].id.clone();

    assert_eq!(mine.withdraw(&id, &no).await, RemoveOutcome::Cancelled);
    assert!(mine.contains(&id));
    assert_eq!(backend.applications.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_withdraw_failure_keeps_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [{"_id": "a1", "jobId": "j1", "userId": "u1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/jobApplication/a1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let mine = ApplicationsView::open(&app).entered().unwrap();
    mine.load().await;

    assert_eq!(
        mine.withdraw("a1", &yes).await,
        RemoveOutcome::Failed("Failed to delete application".to_string())
    );
    assert!(mine.contains("a1"));
    assert!(!mine.is_withdrawing("a1"));
    assert_eq!(mine.applications()[0].title(), "Job Title Not Available");
    assert_eq!(mine.withdraw("zzz", &yes).await, RemoveOutcome::NotFound);
}

#[tokio::test]
async fn test_withdraw_busy_only_for_same_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [
                {"_id": "a1", "jobId": "j1"},
                {"_id": "a2", "jobId": "j2"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/jobApplication/a[12]$"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(2)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let mine = ApplicationsView::open(&app).entered().unwrap();
    mine.load().await;

    let (a, again, b) = tokio::join!(
        mine.withdraw("a1", &yes),
        mine.withdraw("a1", &yes),
        mine.withdraw("a2", &yes)
    );

    assert_eq!(a, RemoveOutcome::Removed);
    assert_eq!(again, RemoveOutcome::Busy);
    assert_eq!(b, RemoveOutcome::Removed);
    assert!(mine.applications().is_empty());
}

#[tokio::test]
async fn test_slow_reload_keeps_confirmed_apply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/jobs/job-4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "job": posting("job-4", "SRE", "Full Time", "20 LPA"),
                    "hasApplied": false,
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobApplication/apply"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Applied"})))
        .expect(1)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let details = JobDetailsView::open(&app, "job-4").entered().unwrap();

    let (phase, outcome) = tokio::join!(details.load(), details.apply());

    assert_eq!(outcome, ApplyOutcome::Applied);
    assert_eq!(phase, Phase::Ready);
    assert!(details.has_applied());
    assert_eq!(details.apply().await, ApplyOutcome::AlreadyApplied);
}

#[tokio::test]
async fn test_applications_answer_after_leaving_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"applications": [{"_id": "a1", "jobId": "j1"}]}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let mine = ApplicationsView::open(&app).entered().unwrap();

    let (phase, ()) = tokio::join!(mine.load(), async { mine.leave() });

    assert_eq!(phase, Phase::Loading);
    assert!(mine.applications().is_empty());
}

#[tokio::test]
async fn test_withdraw_answer_after_leaving_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "applications": [{"_id": "a1", "jobId": "j1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/jobApplication/a1"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let mine = ApplicationsView::open(&app).entered().unwrap();
    mine.load().await;

    let (outcome, ()) = tokio::join!(mine.withdraw("a1", &yes), async { mine.leave() });

    assert_eq!(outcome, RemoveOutcome::Discarded);
    assert!(mine.contains("a1"));
    assert!(!mine.is_withdrawing("a1"));
}

#[tokio::test]
async fn test_stale_reload_does_not_restore_withdrawn_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobApplication/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "applications": [
                        {"_id": "a1", "jobId": "j1"},
                        {"_id": "a2", "jobId": "j2"}
                    ]
                }))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/jobApplication/a1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let app = signed_in(&server, AccountKind::User);
    let mine = ApplicationsView::open(&app).entered().unwrap();
    mine.load().await;

    // The reload was answered before the delete landed server-side
    let (phase, outcome) = tokio::join!(mine.load(), mine.withdraw("a1", &yes));

    assert_eq!(outcome, RemoveOutcome::Removed);
    assert_eq!(phase, Phase::Ready);
    let ids: Vec<_> = mine.applications().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, ["a2"]);
}

#[tokio::test]
async fn test_guest_cannot_enter_applications() {
    let server = MockServer::start().await;
    let app = support::guest(&server);

    let entry = ApplicationsView::open(&app);
    assert_eq!(entry.redirect(), Some("/"));
}
