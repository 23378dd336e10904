use std::sync::Arc;

use chrono::{TimeZone, Utc};
use harmwatch_core::{FeedbackLabel, FeedbackRecord, NormalizedPost, QueueEntry};
use serde_json::json;

use super::*;
use crate::store::MemoryStore;

fn post(text: &str) -> QueueEntry {
    QueueEntry::Post(NormalizedPost {
        platform: "generic".to_string(),
        post_id: None,
        user_id: None,
        timestamp: "2024-01-01T00:00:00.000Z".to_string(),
        post_text: text.to_string(),
        hashtags: Vec::new(),
        likes: 0,
        comments: 0,
        shares: 0,
        source_url: "https://example.com/".to_string(),
        category: None,
        sentiment: None,
    })
}

fn feedback(post_id: &str) -> QueueEntry {
    QueueEntry::Feedback(FeedbackRecord::new(
        "1-2-3-4".to_string(),
        post_id.to_string(),
        "snippet",
        FeedbackLabel::Spam,
        None,
        None,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ))
}

fn texts(entries: &[QueueEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| match e {
            QueueEntry::Post(p) => p.post_text.clone(),
            QueueEntry::Feedback(f) => f.post_id.clone(),
            QueueEntry::Opaque(raw) => raw.to_string(),
        })
        .collect()
}

fn queue() -> (Arc<MemoryStore>, DurableQueue<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Arc::clone(&store), DurableQueue::new(store))
}

#[tokio::test]
async fn append_then_take_is_fifo_and_exactly_once() {
    let (_, q) = queue();
    q.append(post("a")).await.unwrap();
    q.append(feedback("b")).await.unwrap();
    q.append(post("c")).await.unwrap();

    let first = q.take_batch(2).await.unwrap();
    assert_eq!(texts(&first), vec!["a", "b"]);
    let rest = q.take_batch(50).await.unwrap();
    assert_eq!(texts(&rest), vec!["c"]);
    assert!(q.take_batch(50).await.unwrap().is_empty());
    assert!(q.is_empty().await.unwrap());
}

#[tokio::test]
async fn zero_count_take_leaves_queue_alone() {
    let (_, q) = queue();
    q.append(post("a")).await.unwrap();
    assert!(q.take_batch(0).await.unwrap().is_empty());
    assert_eq!(q.len().await.unwrap(), 1);
}

#[tokio::test]
async fn requeue_front_goes_ahead_of_newer_entries() {
    let (_, q) = queue();
    for t in ["1", "2", "3"] {
        q.append(post(t)).await.unwrap();
    }
    let batch = q.take_batch(3).await.unwrap();
    q.append(post("late")).await.unwrap();
    q.requeue_front(batch).await.unwrap();

    let all = q.snapshot(10).await.unwrap();
    assert_eq!(texts(&all), vec!["1", "2", "3", "late"]);
}

#[tokio::test]
async fn persisted_shape_is_a_tagged_array() {
    let (store, q) = queue();
    q.append(post("a")).await.unwrap();
    let raw = store.get(BUFFER_KEY).await.unwrap().unwrap();
    assert_eq!(raw[0]["kind"], json!("post"));
    assert_eq!(raw[0]["post_text"], json!("a"));
}

#[tokio::test]
async fn bounded_queue_drops_oldest() {
    let store = Arc::new(MemoryStore::new());
    let q = DurableQueue::new(store).with_max_len(Some(2));
    assert_eq!(q.append(post("a")).await.unwrap(), 0);
    assert_eq!(q.append(post("b")).await.unwrap(), 0);
    assert_eq!(q.append(post("c")).await.unwrap(), 1);
    assert_eq!(texts(&q.snapshot(10).await.unwrap()), vec!["b", "c"]);
}

#[tokio::test]
async fn zero_max_len_means_unbounded() {
    let store = Arc::new(MemoryStore::new());
    let q = DurableQueue::new(store).with_max_len(Some(0));
    assert_eq!(q.max_len(), None);
}

#[tokio::test]
async fn store_failures_propagate() {
    let (store, q) = queue();
    q.append(post("a")).await.unwrap();

    store.fail_writes(true);
    assert!(q.append(post("b")).await.is_err());
    assert!(q.take_batch(10).await.is_err());
    store.fail_writes(false);

    // The failed drain did not remove anything.
    assert_eq!(texts(&q.snapshot(10).await.unwrap()), vec!["a"]);

    store.fail_reads(true);
    assert!(q.len().await.is_err());
}

#[tokio::test]
async fn non_array_value_is_corrupt() {
    let (store, q) = queue();
    store.set(BUFFER_KEY, json!({"oops": true})).await.unwrap();
    assert!(matches!(
        q.len().await,
        Err(BufferError::CorruptValue { .. })
    ));
}

#[tokio::test]
async fn unrecognised_entries_stay_in_place() {
    let (store, q) = queue();
    let legacy = json!({
        "anon_id": "1-2-3-4",
        "post_id": "old_post",
        "snippet": "old post",
        "label": "agree",
        "reason": null,
        "url": "https://example.com/",
        "ts": "2024-01-01T00:00:00.000Z"
    });
    store.set(BUFFER_KEY, json!([legacy.clone()])).await.unwrap();

    q.append(post("new")).await.unwrap();

    let raw = store.get(BUFFER_KEY).await.unwrap().unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(2));
    assert_eq!(raw[0], legacy);
    assert_eq!(raw[1]["post_text"], json!("new"));

    let batch = q.take_batch(1).await.unwrap();
    assert_eq!(batch, vec![QueueEntry::Opaque(legacy)]);
    assert_eq!(texts(&q.snapshot(10).await.unwrap()), vec!["new"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_and_drains_lose_nothing() {
    let (_, q) = queue();
    let q = Arc::new(q);

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let q = Arc::clone(&q);
            tokio::spawn(async move {
                for i in 0..25 {
                    q.append(post(&format!("{p}-{i}"))).await.unwrap();
                }
            })
        })
        .collect();

    let drainer = {
        let q = Arc::clone(&q);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..20 {
                seen.extend(q.take_batch(7).await.unwrap());
                tokio::task::yield_now().await;
            }
            seen
        })
    };

    for p in producers {
        p.await.unwrap();
    }
    let mut seen = texts(&drainer.await.unwrap());
    seen.extend(texts(&q.take_batch(usize::MAX).await.unwrap()));

    assert_eq!(seen.len(), 100);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 100);
}
