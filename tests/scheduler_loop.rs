// tests/scheduler_loop.rs
//
// The per-feed cron loop driven on paused tokio time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{item, RecordingNotifier, ScriptedSource, NEWS_CONFIG};
use feed_notifier::config::parse_config_str;
use feed_notifier::ingest::scheduler::spawn_feed_scheduler;
use feed_notifier::FeedService;

fn every_second_service(
    source: Arc<ScriptedSource>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<FeedService> {
    let yaml = NEWS_CONFIG.replace(
        r#"defaultCronExpression: "*/5 * * * *""#,
        r#"defaultCronExpression: "* * * * * *""#,
    );
    let cfg = Arc::new(parse_config_str(&yaml, "yml").expect("config parses"));
    Arc::new(FeedService::new(cfg, source, notifier))
}

#[tokio::test(start_paused = true)]
async fn loop_keeps_ticking_after_a_failed_poll() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_err("upstream down");
    source.push_ok(vec![item("a", "1")]);
    source.push_ok(vec![item("a", "1"), item("b", "2")]);
    // Anything after this errors; the baseline must survive those ticks.

    let svc = every_second_service(source.clone(), notifier.clone());
    let handle = spawn_feed_scheduler(svc.clone(), "news".to_string());

    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        if source.calls.lock().len() >= 5 {
            break;
        }
    }
    handle.abort();

    assert!(source.calls.lock().len() >= 5);
    // Failed first tick, priming second tick, then exactly one new item.
    assert_eq!(notifier.titles(), vec!["b"]);
    assert_eq!(svc.status()[0].baseline_items, Some(2));
}

#[tokio::test(start_paused = true)]
async fn unknown_feed_stops_the_task() {
    let svc = every_second_service(ScriptedSource::new(), RecordingNotifier::new());
    let handle = spawn_feed_scheduler(svc, "missing".to_string());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("task finished")
        .expect("task did not panic");
}
