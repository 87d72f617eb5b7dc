mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{success_response, valid_input, MockBackend, MockOutcome};
use serde_json::json;
use voltplan::advisor::{MaintenanceAdvisor, Phase};
use voltplan::notice::Notice;
use voltplan::progress::sequence;
use voltplan::request::{DetailLevel, RequestPatch, ScheduleRequest};

#[tokio::test]
async fn missing_description_skips_the_remote_call() {
    let backend = Arc::new(MockBackend::respond(success_response(1)));
    let advisor = MaintenanceAdvisor::new(backend.clone());
    advisor.update_request(RequestPatch {
        property_type: Some("domestic".to_string()),
        installation_description: Some(String::new()),
        postcode: Some("SW1A 1AA".to_string()),
        ..RequestPatch::default()
    });

    let notice = advisor.generate().await.expect("validation notice");

    match notice {
        Notice::ValidationFailed { missing } => {
            assert_eq!(missing, vec!["installation description"]);
        }
        other => panic!("expected validation notice, got {other:?}"),
    }
    assert_eq!(advisor.phase(), Phase::Input);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn whitespace_only_fields_fail_validation_without_a_call() {
    let backend = Arc::new(MockBackend::respond(success_response(1)));
    let advisor = MaintenanceAdvisor::new(backend.clone());
    advisor.update_request(RequestPatch {
        property_type: Some("  ".to_string()),
        installation_description: Some("\t\n".to_string()),
        postcode: Some(" ".to_string()),
        ..RequestPatch::default()
    });

    let notice = advisor.generate().await.expect("validation notice");

    assert!(notice.is_error());
    assert_eq!(backend.calls(), 0);
    assert_eq!(advisor.phase(), Phase::Input);
}

#[tokio::test]
async fn single_task_success_reaches_results_and_mentions_the_count() {
    let backend = Arc::new(MockBackend::respond(json!({
        "success": true,
        "schedule": {
            "schedule": [{"task": "Test insulation resistance", "interval": "every 5 years"}],
            "partial": false
        }
    })));
    let advisor = MaintenanceAdvisor::new(backend);
    advisor.update_request(valid_input());

    let notice = advisor.generate().await.expect("success notice");

    assert_eq!(advisor.phase(), Phase::Results);
    let plan = advisor.plan().expect("plan committed");
    assert_eq!(plan.schedule.len(), 1);
    assert_eq!(plan.schedule[0].task, "Test insulation resistance");
    assert!(notice.to_string().contains('1'));
    assert!(!notice.is_error());
}

#[tokio::test]
async fn empty_schedule_returns_to_input_without_a_plan() {
    let backend = Arc::new(MockBackend::respond(json!({
        "success": true,
        "schedule": {"schedule": [], "partial": false}
    })));
    let advisor = MaintenanceAdvisor::new(backend);
    advisor.update_request(valid_input());

    let notice = advisor.generate().await.expect("failure notice");

    assert!(notice.is_error());
    assert!(notice.to_string().contains("more detail"));
    assert_eq!(advisor.phase(), Phase::Input);
    assert!(advisor.plan().is_none());
}

#[tokio::test]
async fn partial_schedule_commits_but_warns_about_missing_sections() {
    let backend = Arc::new(MockBackend::respond(json!({
        "success": true,
        "schedule": {
            "schedule": [{"task": "Full EICR"}],
            "partial": true,
            "missingSections": ["costs", "parts"]
        }
    })));
    let advisor = MaintenanceAdvisor::new(backend);
    advisor.update_request(valid_input());

    let notice = advisor.generate().await.expect("warning notice");

    assert_eq!(advisor.phase(), Phase::Results);
    assert!(advisor.plan().is_some());
    assert!(!notice.is_error());
    assert!(notice.to_string().contains("costs, parts"));
}

#[tokio::test]
async fn transport_failure_returns_to_input_with_a_generic_notice() {
    let backend = Arc::new(MockBackend::transport_fail());
    let advisor = MaintenanceAdvisor::new(backend);
    advisor.update_request(valid_input());

    let notice = advisor.generate().await.expect("failure notice");

    assert!(notice.is_error());
    assert!(notice.to_string().contains("could not reach"));
    assert_eq!(advisor.phase(), Phase::Input);
    assert!(advisor.plan().is_none());
}

#[tokio::test]
async fn remote_failure_outranks_a_malformed_container() {
    // success:false and a broken schedule field at once: the explicit remote
    // failure must decide the classification.
    let backend = Arc::new(MockBackend::respond(json!({
        "success": false,
        "error": "quota exceeded",
        "code": "resource-exhausted",
        "schedule": 42
    })));
    let advisor = MaintenanceAdvisor::new(backend);
    advisor.update_request(valid_input());

    let notice = advisor.generate().await.expect("failure notice");

    let text = notice.to_string();
    assert!(text.contains("quota exceeded"));
    assert!(text.contains("resource-exhausted"));
    assert_eq!(advisor.phase(), Phase::Input);
}

#[tokio::test]
async fn every_outcome_clears_processing_and_progress() {
    let outcomes = vec![
        MockOutcome::Respond(success_response(3)),
        MockOutcome::Respond(json!({"success": false, "error": "boom"})),
        MockOutcome::Respond(json!({"success": true, "schedule": {"schedule": []}})),
        MockOutcome::Respond(json!("not an object")),
        MockOutcome::TransportFail,
    ];
    for outcome in outcomes {
        let backend = Arc::new(MockBackend::new(outcome, Duration::ZERO));
        let advisor = MaintenanceAdvisor::new(backend);
        advisor.update_request(valid_input());

        advisor.generate().await.expect("a notice per attempt");

        assert!(!advisor.is_processing());
        assert!(advisor.progress_message().is_none());
        assert!(matches!(advisor.phase(), Phase::Input | Phase::Results));
    }
}

#[tokio::test]
async fn reset_is_idempotent_from_any_phase() {
    let backend = Arc::new(MockBackend::respond(success_response(2)));
    let advisor = MaintenanceAdvisor::new(backend);

    // Reset from the input phase is a no-op.
    advisor.reset();
    assert_eq!(advisor.phase(), Phase::Input);

    advisor.update_request(valid_input());
    advisor.generate().await.expect("success notice");
    assert_eq!(advisor.phase(), Phase::Results);

    advisor.reset();
    assert_eq!(advisor.phase(), Phase::Input);
    assert_eq!(advisor.request(), ScheduleRequest::default());
    assert!(advisor.plan().is_none());
    assert!(advisor.progress_message().is_none());

    advisor.reset();
    assert_eq!(advisor.phase(), Phase::Input);
    assert_eq!(advisor.request(), ScheduleRequest::default());
    assert!(advisor.plan().is_none());
}

#[tokio::test(start_paused = true)]
async fn progress_messages_follow_step_order_until_the_call_settles() {
    let steps = sequence(DetailLevel::Detailed);
    // Settle just after the third step starts: the first two steps run in
    // full and the third is cut mid-wait.
    let settle_after = steps[0].duration + steps[1].duration + Duration::from_millis(100);
    let backend =
        Arc::new(MockBackend::respond(success_response(2)).with_delay(settle_after));
    let advisor = Arc::new(MaintenanceAdvisor::new(backend));
    advisor.update_request(valid_input());

    let mut progress = advisor.subscribe_progress();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let collector = {
        let seen = seen.clone();
        tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let message = progress.borrow_and_update().clone();
                if let Some(message) = message {
                    seen.lock().expect("seen lock").push(message);
                }
            }
        })
    };

    advisor.generate().await.expect("success notice");
    collector.abort();

    let seen = seen.lock().expect("seen lock").clone();
    let expected: Vec<String> = steps[..3]
        .iter()
        .map(|step| step.message.to_string())
        .collect();
    assert_eq!(seen, expected);
    assert!(advisor.progress_message().is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_discards_a_stale_in_flight_response() {
    let backend = Arc::new(
        MockBackend::respond(success_response(4)).with_delay(Duration::from_secs(5)),
    );
    let advisor = Arc::new(MaintenanceAdvisor::new(backend.clone()));
    advisor.update_request(valid_input());

    let in_flight = {
        let advisor = advisor.clone();
        tokio::spawn(async move { advisor.generate().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(advisor.is_processing());

    advisor.reset();

    let notice = in_flight.await.expect("task completes");
    assert!(notice.is_none());
    assert_eq!(backend.calls(), 1);
    assert_eq!(advisor.phase(), Phase::Input);
    assert!(advisor.plan().is_none());
}

#[tokio::test(start_paused = true)]
async fn a_newer_generate_supersedes_the_older_attempt() {
    let backend = Arc::new(
        MockBackend::respond(success_response(2)).with_delay(Duration::from_secs(5)),
    );
    let advisor = Arc::new(MaintenanceAdvisor::new(backend.clone()));
    advisor.update_request(valid_input());

    let first = {
        let advisor = advisor.clone();
        tokio::spawn(async move { advisor.generate().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = {
        let advisor = advisor.clone();
        tokio::spawn(async move { advisor.generate().await })
    };

    let first_notice = first.await.expect("first settles");
    let second_notice = second.await.expect("second settles");

    assert!(first_notice.is_none(), "older attempt must commit nothing");
    assert!(second_notice.is_some());
    assert_eq!(backend.calls(), 2);
    assert_eq!(advisor.phase(), Phase::Results);
}

#[tokio::test]
async fn request_body_is_trimmed_and_pins_the_detail_level() {
    let backend = Arc::new(MockBackend::respond(success_response(1)));
    let advisor = MaintenanceAdvisor::new(backend.clone());
    advisor.update_request(RequestPatch {
        property_type: Some(" domestic ".to_string()),
        installation_description: Some("  rewired 2015  ".to_string()),
        postcode: Some(" SW1A 1AA ".to_string()),
        detail_level: Some(DetailLevel::Standard),
        ..RequestPatch::default()
    });

    advisor.generate().await.expect("success notice");

    let body = backend.last_body().expect("backend saw a body");
    assert_eq!(body["propertyType"], "domestic");
    assert_eq!(body["postcode"], "SW1A 1AA");
    assert_eq!(body["detailLevel"], "detailed");
    assert!(body.get("knownIssues").is_none());
}
