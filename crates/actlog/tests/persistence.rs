//! End-to-end persistence behaviour against the wall clock.

use std::sync::Arc;

use actlog::{Activity, ActivityLog, Clock, Principal, SystemClock};
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn read_array(path: &std::path::Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).unwrap();
    match serde_json::from_str(&text).unwrap() {
        Value::Array(items) => items,
        other => panic!("expected array, got {other}"),
    }
}

#[test]
fn reopened_log_sees_previous_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("spark/activity.json");
    let now = SystemClock.now_millis();
    let notch = Principal::player("Notch", Uuid::new_v4());

    {
        let log = ActivityLog::new(&path);
        log.load();
        assert!(log.get_log().is_empty());
        log.add_to_log(Activity::url(&notch, now, "profiler", "https://spark.lucko.me/a"));
        log.add_to_log(Activity::file(&Principal::other("Console"), now, "heapdump", "heap.hprof"));
    }

    let reopened = ActivityLog::new(&path);
    reopened.load();
    let records = reopened.get_log();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].activity_type(), "heapdump");
    assert!(!records[0].is_player());
    assert_eq!(records[1].user_id(), notch.id);
}

#[test]
fn expired_url_is_compacted_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("activity.json");
    let now = SystemClock.now_millis();

    std::fs::write(
        &path,
        serde_json::to_string_pretty(&json!([
            {
                "user": { "type": "other", "name": "Console" },
                "time": now - 8 * DAY_MS,
                "type": "profiler",
                "data": { "type": "url", "value": "https://spark.lucko.me/old" }
            },
            {
                "user": { "type": "other", "name": "Console" },
                "time": now - DAY_MS,
                "type": "profiler",
                "data": { "type": "url", "value": "https://spark.lucko.me/new" }
            }
        ]))
        .unwrap(),
    )
    .unwrap();

    let log = ActivityLog::new(&path);
    let report = log.try_load().unwrap();

    assert_eq!(report.loaded, 2);
    assert!(report.compacted);
    assert_eq!(log.get_log().len(), 2);

    let on_disk = read_array(&path);
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0]["data"]["value"], "https://spark.lucko.me/new");
}

#[test]
fn expired_url_is_dropped_on_save_but_kept_in_memory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("activity.json");
    let old = SystemClock.now_millis() - 8 * DAY_MS;
    let console = Principal::other("Console");

    let log = ActivityLog::new(&path);
    log.add_to_log(Activity::url(&console, old, "profiler", "https://x"));
    log.add_to_log(Activity::file(&console, old, "heapdump", "heap.hprof"));
    log.save();

    let on_disk = read_array(&path);
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0]["data"]["type"], "file");
    assert_eq!(log.get_log().len(), 2);
}

#[test]
fn missing_file_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let log = ActivityLog::new(temp_dir.path().join("absent.json"));
    log.load();
    assert!(log.get_log().is_empty());
}

#[test]
fn corrupt_element_does_not_discard_log() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("activity.json");
    std::fs::write(
        &path,
        json!([
            {
                "user": { "type": "other", "name": "Console" },
                "time": 1,
                "type": "heapdump",
                "data": { "type": "file", "value": "heap.hprof" }
            },
            {
                "user": { "type": "other", "name": "Console" },
                "time": 2,
                "type": "heapdump",
                "data": { "type": "file" }
            }
        ])
        .to_string(),
    )
    .unwrap();

    let log = ActivityLog::new(&path);
    log.load();

    let records = log.get_log();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].time(), 1);
}

#[test]
fn shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let log = Arc::new(ActivityLog::new(temp_dir.path().join("activity.json")));
    let now = SystemClock.now_millis();

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let log = Arc::clone(&log);
            std::thread::spawn(move || {
                log.add_to_log(Activity::file(
                    &Principal::other(format!("user-{n}")),
                    now,
                    "heapdump",
                    format!("heap-{n}.hprof"),
                ));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut users: Vec<_> = log.get_log().iter().map(|a| a.user().to_string()).collect();
    users.sort();
    let expected: Vec<_> = {
        let mut v: Vec<_> = (0..10).map(|n| format!("user-{n}")).collect();
        v.sort();
        v
    };
    assert_eq!(users, expected);
}
