//! Protocol hot-path benchmark suite.
//!
//! Benchmarks the layers every announcement passes through:
//! - Line framing: chunked stdout bytes into complete lines
//! - Parsing: announcement lines into notifications
//! - Encoding: commands into wire lines
//! - End to end: a scripted frontend emitting a burst of updates
//!
//! Run with: cargo bench --bench line_framing
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use monkey_driver::protocol::{Command, Notification};
use monkey_driver::transport::LineBuffer;
use monkey_driver::{Session, WindowId};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const LINE_COUNTS: &[usize] = &[64, 1024];
const CHUNK_SIZE: usize = 4096;

// ============================================================================
// Corpus
// ============================================================================

fn announcement_corpus() -> Vec<String> {
    vec![
        "GENERIC POLL".to_owned(),
        "WINDOW SIZE WIN 1 WIDTH 1280 HEIGHT 720".to_owned(),
        "WINDOW TITLE WIN 1 STR Example Domain".to_owned(),
        "WINDOW SET_SCROLL WIN 1 X 0 Y 340".to_owned(),
        "WINDOW CONSOLE_LOG WIN 1 SOURCE console NOT-FOLDABLE LOG state changed".to_owned(),
        "PLOT TEXT X 10 Y 20 STR hello".to_owned(),
        "LOGIN USER LWIN 2 STR guest".to_owned(),
        "GENERIC POLL TRUE".to_owned(),
    ]
}

fn stdout_payload(lines: usize) -> Vec<u8> {
    let corpus = announcement_corpus();
    let mut payload = Vec::new();
    for i in 0..lines {
        payload.extend_from_slice(corpus[i % corpus.len()].as_bytes());
        payload.push(b'\n');
    }
    payload
}

// ============================================================================
// Benchmark: Line Framing
// ============================================================================

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");

    for &lines in LINE_COUNTS {
        let payload = stdout_payload(lines);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::new("drain", lines), &payload, |b, payload| {
            b.iter(|| {
                let mut buffer = LineBuffer::new();
                for chunk in payload.chunks(CHUNK_SIZE) {
                    buffer.push(chunk);
                    while let Some(line) = buffer.next_line() {
                        black_box(line);
                    }
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Announcement Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let corpus = announcement_corpus();

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.bench_function("announcements", |b| {
        b.iter(|| {
            for line in &corpus {
                black_box(Notification::parse(black_box(line)));
            }
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Command Encoding
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let commands = vec![
        Command::WindowNew {
            url: Some("https://example.com/".to_owned()),
        },
        Command::WindowGo {
            window: WindowId::new(1),
            url: "https://example.com/a/b/c?q=1".to_owned(),
            referer: None,
        },
        Command::WindowRedraw {
            window: WindowId::new(1),
            area: None,
        },
        Command::Quit,
    ];

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(commands.len() as u64));
    group.bench_function("commands", |b| {
        b.iter(|| {
            for command in &commands {
                black_box(command.encode());
            }
        });
    });

    group.finish();
}

// ============================================================================
// Benchmark: Scripted Session
// ============================================================================

#[cfg(unix)]
fn bench_scripted_session(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("session");
    group.sample_size(10); // Process spawns make each sample expensive

    group.bench_function("update_burst", |b| {
        b.to_async(&rt).iter(|| async { run_update_burst().await });
    });

    group.finish();
}

#[cfg(not(unix))]
fn bench_scripted_session(_c: &mut Criterion) {}

#[cfg(unix)]
async fn run_update_burst() {
    let script = "\
printf 'GENERIC STARTED\\n'
printf 'WINDOW NEW WIN 1 FOR 7 EXISTING NONE NEWTAB FALSE CLONE FALSE\\n'
i=0
while [ $i -lt 500 ]; do
  printf 'WINDOW SIZE WIN 1 WIDTH 800 HEIGHT 600\\n'
  i=$((i+1))
done
printf 'GENERIC LAUNCH URL done\\n'
read _ || true";

    let mut session = Session::builder()
        .binary("/bin/sh")
        .arg("-c")
        .arg(script)
        .launch()
        .await
        .unwrap();

    let drained = session
        .wait_until(|s: &Session| s.launch_url().is_some(), None)
        .await
        .unwrap();
    assert!(drained);
    let _ = session.quit_and_wait().await;
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_framing,
    bench_parse,
    bench_encode,
    bench_scripted_session
);
criterion_main!(benches);
