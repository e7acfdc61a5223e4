// tests/pipeline.rs
//
// End-to-end poll cycles through FeedService with a scripted source and a
// recording notifier (no network).

mod common;

use common::{item, news_config, RecordingNotifier, ScriptedSource};
use feed_notifier::{FeedService, PollOutcome, PollReport};
use std::sync::Arc;

fn completed(outcome: PollOutcome) -> PollReport {
    match outcome {
        PollOutcome::Completed(r) => r,
        PollOutcome::Skipped => panic!("poll unexpectedly skipped"),
    }
}

#[tokio::test]
async fn first_poll_primes_and_sends_nothing() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_ok((0..25).map(|i| item(&format!("item {i}"), "body")).collect());

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    let report = completed(svc.poll_feed("news").await.unwrap());

    assert!(report.primed);
    assert_eq!(report.fetched, 25);
    assert_eq!(report.new_items, 0);
    assert!(notifier.sent.lock().is_empty());
    // Both configured urls were handed to the source.
    assert_eq!(source.calls.lock()[0].len(), 2);
}

#[tokio::test]
async fn each_new_item_is_dispatched_exactly_once() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_ok(vec![item("old one", "a"), item("old two", "b")]);
    source.push_ok(vec![
        item("old one", "a"),
        item("fresh one", "c"),
        item("fresh two", "d"),
    ]);
    source.push_ok(vec![item("fresh one", "c"), item("fresh two", "d")]);

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    completed(svc.poll_feed("news").await.unwrap());

    let second = completed(svc.poll_feed("news").await.unwrap());
    assert!(!second.primed);
    assert_eq!(second.new_items, 2);
    assert_eq!(second.sent, 2);

    let third = completed(svc.poll_feed("news").await.unwrap());
    assert_eq!(third.new_items, 0);

    let mut titles = notifier.titles();
    titles.sort();
    assert_eq!(titles, vec!["fresh one", "fresh two"]);
}

#[tokio::test]
async fn fetch_failure_keeps_the_baseline() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_ok(vec![item("a", "1"), item("b", "2")]);
    source.push_err("connection reset");
    source.push_ok(vec![item("a", "1"), item("b", "2"), item("c", "3")]);

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    completed(svc.poll_feed("news").await.unwrap());

    let err = svc.poll_feed("news").await.unwrap_err();
    assert!(err.to_string().contains("connection reset"));

    // Only "c" is new: the failed tick neither cleared nor replaced the baseline.
    let report = completed(svc.poll_feed("news").await.unwrap());
    assert_eq!(report.new_items, 1);
    assert_eq!(notifier.titles(), vec!["c"]);
}

#[tokio::test]
async fn failure_on_first_fetch_does_not_prime() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_err("dns");
    source.push_ok(vec![item("a", "1")]);

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    assert!(svc.poll_feed("news").await.is_err());
    let report = completed(svc.poll_feed("news").await.unwrap());
    assert!(report.primed);
    assert!(notifier.sent.lock().is_empty());
}

#[tokio::test]
async fn classification_drives_priority_tags_and_suppression() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_ok(vec![]);
    source.push_ok(vec![
        item("Breaking: weather alert", "storm<br>  coming  "),
        item("Urgent offer", "sponsored content"),
        item("Quiet day", "nothing"),
    ]);

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    completed(svc.poll_feed("news").await.unwrap());
    let report = completed(svc.poll_feed("news").await.unwrap());
    assert_eq!(report.new_items, 3);
    assert_eq!(report.sent, 2);
    assert_eq!(report.suppressed, 1);

    let sent = notifier.sent.lock();
    let breaking = sent
        .iter()
        .find(|m| m.title.starts_with("Breaking"))
        .expect("breaking sent");
    assert_eq!(breaking.priority, 5);
    assert_eq!(breaking.body, "storm\ncoming");
    assert_eq!(breaking.tags, vec!["newspaper", "rotating_light", "cloud"]);
    assert_eq!(breaking.topic, "news");

    let quiet = sent.iter().find(|m| m.title == "Quiet day").expect("quiet sent");
    assert_eq!(quiet.priority, 1);
    assert_eq!(quiet.tags, vec!["newspaper"]);

    // super_ignore dominates the earlier priority-5 title match.
    assert!(sent.iter().all(|m| m.title != "Urgent offer"));
}

#[tokio::test]
async fn one_failed_push_does_not_block_siblings() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    notifier.fail_titles.lock().push("bad".into());
    source.push_ok(vec![]);
    source.push_ok(vec![item("good 1", "x"), item("bad", "y"), item("good 2", "z")]);
    source.push_ok(vec![item("good 1", "x"), item("bad", "y"), item("good 2", "z")]);

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    completed(svc.poll_feed("news").await.unwrap());
    let report = completed(svc.poll_feed("news").await.unwrap());
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 1);

    // No retry: the failed item is part of the baseline now.
    let report = completed(svc.poll_feed("news").await.unwrap());
    assert_eq!(report.new_items, 0);
    assert_eq!(notifier.sent.lock().len(), 2);
}

#[tokio::test]
async fn feeds_keep_independent_baselines() {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    source.push_ok(vec![item("a", "1")]); // news primes
    source.push_ok(vec![item("a", "1"), item("b", "2")]); // blog primes: nothing sent

    let svc = FeedService::new(news_config(), source.clone(), notifier.clone());
    assert!(completed(svc.poll_feed("news").await.unwrap()).primed);
    assert!(completed(svc.poll_feed("blog").await.unwrap()).primed);
    assert!(notifier.sent.lock().is_empty());

    let status = svc.status();
    assert_eq!(status.len(), 2);
    assert_eq!(status[0].baseline_items, Some(1));
    assert_eq!(status[1].baseline_items, Some(2));
    assert_eq!(status[1].schedule, "0 * * * *");
}

#[tokio::test]
async fn unknown_feed_is_an_error() {
    let svc = FeedService::new(news_config(), ScriptedSource::new(), RecordingNotifier::new());
    assert!(svc.poll_feed("missing").await.is_err());
}

mod overlap {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use feed_notifier::{FeedItem, FeedSource};
    use tokio::sync::Notify;

    /// Blocks inside `fetch` until released.
    struct GatedSource {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl FeedSource for GatedSource {
        async fn fetch(&self, _urls: &[String]) -> Result<Vec<FeedItem>> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn overlapping_poll_of_the_same_feed_is_skipped() {
        let source = Arc::new(GatedSource {
            started: Notify::new(),
            release: Notify::new(),
        });
        let svc = Arc::new(FeedService::new(
            news_config(),
            source.clone(),
            RecordingNotifier::new(),
        ));

        let first = tokio::spawn({
            let svc = svc.clone();
            async move { svc.poll_feed("news").await }
        });
        source.started.notified().await;

        // Same feed: skipped. The status view reports it as polling.
        assert_eq!(svc.poll_feed("news").await.unwrap(), PollOutcome::Skipped);
        assert!(svc.status()[0].polling);

        source.release.notify_one();
        let report = completed(first.await.unwrap().unwrap());
        assert!(report.primed);
        assert!(!svc.status()[0].polling);
    }
}
