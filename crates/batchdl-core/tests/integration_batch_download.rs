//! Integration test: real curl fetches against a local HTTP server.
//!
//! Submits batches through `BatchService`, polls until terminal, and checks
//! counters, outcome strings and files on disk.

mod common;

use std::path::Path;
use std::time::Duration;

use batchdl_core::config::BatchConfig;
use batchdl_core::job::JobSnapshot;
use batchdl_core::service::BatchService;
use common::http_server::{self, Route};
use tempfile::tempdir;

const POLL: Duration = Duration::from_millis(20);

fn config(download_dir: &Path, workers: usize) -> BatchConfig {
    BatchConfig {
        workers,
        download_dir: download_dir.to_path_buf(),
        connect_timeout_secs: 2,
        timeout_secs: 5,
        ..BatchConfig::default()
    }
}

async fn run_batch(svc: &BatchService, urls: &[String]) -> JobSnapshot {
    let id = svc.submit_text(&urls.join("\n")).expect("submit");
    svc.wait(&id, POLL, |snap| {
        assert!(snap.counters_consistent(), "invariant broken: {snap:?}");
    })
    .await
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn saved_file_and_404_are_reported_per_item() {
    let body: Vec<u8> = (0u8..=255).cycle().take(1024).collect();
    let server = http_server::start(vec![
        ("/a/song1.mp3", Route::ok(body.clone())),
        ("/a/", Route::status(404)),
    ]);
    let root = tempdir().unwrap();
    let download_dir = root.path().join("downloads");
    let svc = BatchService::new(&config(&download_dir, 5));

    let song = server.url("/a/song1.mp3");
    let missing = server.url("/a/");
    let snap = run_batch(&svc, &[song.clone(), missing.clone()]).await;

    assert_eq!(snap.total, 2);
    assert_eq!(snap.completed, 2);
    assert_eq!(snap.succeeded, 1);
    let saved = snap.result(&song).unwrap();
    assert!(saved.contains("song1.mp3"), "got {saved}");
    let failed = snap.result(&missing).unwrap();
    assert!(failed.starts_with("failed"), "got {failed}");
    assert!(failed.contains("404"), "got {failed}");

    assert_eq!(std::fs::read(download_dir.join("song1.mp3")).unwrap(), body);
    assert_eq!(files_in(&download_dir), vec!["song1.mp3"], "404 body must not be saved");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timeout_is_a_completed_failure() {
    let server = http_server::start(vec![
        ("/slow.bin", Route::ok(vec![1; 64]).delayed(Duration::from_secs(4))),
        ("/fast.bin", Route::ok(vec![2; 64])),
    ]);
    let dir = tempdir().unwrap();
    let cfg = BatchConfig {
        timeout_secs: 1,
        ..config(dir.path(), 2)
    };
    let svc = BatchService::new(&cfg);

    let slow = server.url("/slow.bin");
    let fast = server.url("/fast.bin");
    let snap = run_batch(&svc, &[slow.clone(), fast.clone()]).await;

    assert_eq!(snap.completed, 2);
    assert_eq!(snap.succeeded, 1);
    let msg = snap.result(&slow).unwrap();
    assert!(msg.starts_with("failed: timed out: "), "got {msg}");
    assert!(snap.result(&fast).unwrap().contains("fast.bin"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_body_is_a_failure() {
    let server = http_server::start(vec![("/empty.bin", Route::ok(Vec::new()))]);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 1));

    let url = server.url("/empty.bin");
    let snap = run_batch(&svc, &[url.clone()]).await;

    assert_eq!(snap.completed, 1);
    assert_eq!(snap.succeeded, 0);
    assert_eq!(snap.result(&url), Some("failed: empty response (HTTP 200)"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn redirects_are_followed_and_named_after_requested_url() {
    let server = http_server::start(vec![
        ("/old/report.pdf", Route::redirect("/new/location.bin")),
        ("/new/location.bin", Route::ok(b"%PDF-1.7".to_vec())),
    ]);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 1));

    let url = server.url("/old/report.pdf");
    let snap = run_batch(&svc, &[url.clone()]).await;

    assert_eq!(snap.succeeded, 1);
    assert_eq!(snap.result(&url), Some("saved report.pdf (8 bytes)"));
    assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"%PDF-1.7");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn trailing_slash_success_gets_random_name() {
    let server = http_server::start(vec![("/dir/", Route::ok(b"index".to_vec()))]);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 1));

    let url = server.url("/dir/");
    let snap = run_batch(&svc, &[url.clone()]).await;

    assert_eq!(snap.succeeded, 1);
    let files = files_in(dir.path());
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with(".bin"), "got {files:?}");
    assert!(snap.result(&url).unwrap().contains(&files[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unreachable_host_is_a_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 1));

    let url = format!("http://127.0.0.1:{}/gone.bin", port);
    let snap = run_batch(&svc, &[url.clone()]).await;

    assert_eq!(snap.completed, 1);
    assert_eq!(snap.succeeded, 0);
    let msg = snap.result(&url).unwrap();
    assert!(msg.starts_with("failed: "), "got {msg}");
    assert!(!msg.contains("HTTP"), "no status was received: {msg}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_budget_caps_concurrent_requests_across_jobs() {
    let routes: Vec<(String, Route)> = (0..12)
        .map(|i| {
            (
                format!("/f/{i}.bin"),
                Route::ok(vec![b'x'; 32]).delayed(Duration::from_millis(80)),
            )
        })
        .collect();
    let server = http_server::start(routes.iter().map(|(p, r)| (p.as_str(), r.clone())).collect());
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 2));

    let first: Vec<String> = (0..6).map(|i| server.url(&format!("/f/{i}.bin"))).collect();
    let second: Vec<String> = (6..12).map(|i| server.url(&format!("/f/{i}.bin"))).collect();
    let a = svc.submit_text(&first.join("\n")).unwrap();
    let b = svc.submit_text(&second.join("\n")).unwrap();
    svc.shutdown().await;

    assert_eq!(svc.poll(&a).succeeded, 6);
    assert_eq!(svc.poll(&b).succeeded, 6);
    assert_eq!(server.stats.requests(), 12);
    assert!(server.stats.peak() <= 2, "peak {}", server.stats.peak());
    assert!(svc.scheduler().peak_in_flight() <= 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_urls_share_one_result_slot() {
    let server = http_server::start(vec![("/dup.bin", Route::ok(vec![7; 10]))]);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 2));

    let url = server.url("/dup.bin");
    let snap = run_batch(&svc, &[url.clone(), url.clone()]).await;

    assert_eq!(snap.total, 2);
    assert_eq!(snap.completed, 2);
    assert_eq!(snap.succeeded, 2);
    assert_eq!(snap.results.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn completed_job_snapshot_is_stable() {
    let server = http_server::start(vec![("/s.bin", Route::ok(vec![1; 5]))]);
    let dir = tempdir().unwrap();
    let svc = BatchService::new(&config(dir.path(), 1));

    let id = svc.submit_text(&server.url("/s.bin")).unwrap();
    let done = svc.wait(&id, POLL, |_| {}).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(svc.poll(&id), done);
    assert_eq!(svc.poll(&id), done);
}
