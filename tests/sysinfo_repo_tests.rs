// SysinfoRepo against the live host: aggregate CPU reference point

use hostprobe::sysinfo_repo::SysinfoRepo;
use std::time::{Duration, Instant};

/// Keeps every available core busy for `duration`.
fn burn_cpu(duration: Duration) {
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            std::thread::spawn(move || {
                let started = Instant::now();
                let mut x: u64 = 0;
                while started.elapsed() < duration {
                    x = std::hint::black_box(x.wrapping_mul(31).wrapping_add(7));
                }
                x
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[tokio::test]
async fn first_aggregate_reading_is_zero() {
    let repo = SysinfoRepo::new();
    burn_cpu(Duration::from_millis(500));
    let first = repo.aggregate_cpu_percent().await.unwrap();
    assert_eq!(first, 0.0);
}

#[tokio::test]
async fn aggregate_reading_covers_interval_since_previous_call() {
    let repo = SysinfoRepo::new();
    repo.aggregate_cpu_percent().await.unwrap();
    burn_cpu(Duration::from_millis(600));
    let second = repo.aggregate_cpu_percent().await.unwrap();
    assert!(second > 0.0, "expected load after burn, got {second}");
}

#[tokio::test]
async fn frequency_read_does_not_reset_aggregate_reference() {
    let repo = SysinfoRepo::new();
    repo.aggregate_cpu_percent().await.unwrap();
    burn_cpu(Duration::from_millis(600));
    repo.cpu_frequencies().await.unwrap();
    let after = repo.aggregate_cpu_percent().await.unwrap();
    assert!(after > 0.0, "burn window lost after frequency read, got {after}");
}
