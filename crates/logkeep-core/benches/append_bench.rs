//! Benchmarks for the producer-side hot path
//!
//! Run with: cargo bench -p logkeep-core
//!
//! Producers should only pay for formatting and a short lock hold:
//! - Line formatting
//! - Buffer admission (accepted and dropped)
//! - Full `Logger::log_with_tag` calls with a running flush worker

use std::time::Duration;

use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use logkeep_core::naming::format_line;
use logkeep_core::{BufferedLogWriter, LoggerBuilder, PendingBuffer, WriterOptions};
use tempfile::TempDir;

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_format_line(c: &mut Criterion) {
    let now = Local::now().naive_local();
    c.bench_function("format_line", |b| {
        b.iter(|| black_box(format_line(now, "network", "request completed in 42ms")))
    });
}

// ============================================================================
// Buffer Benchmarks
// ============================================================================

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending_buffer");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("fill_1000", |b| {
        b.iter_batched(
            || PendingBuffer::new(1000),
            |mut buffer| {
                for i in 0..1000 {
                    black_box(buffer.push(format!("line {}", i)));
                }
                buffer
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("drop_when_full", |b| {
        let mut buffer = PendingBuffer::new(1);
        buffer.push("occupant".to_string());
        b.iter(|| black_box(buffer.push("overflow".to_string())))
    });

    group.finish();
}

// ============================================================================
// Writer Benchmarks
// ============================================================================

fn bench_writer_append(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let writer = BufferedLogWriter::start(
        temp.path().join("bench.log"),
        WriterOptions {
            capacity: 100_000,
            flush_interval: Duration::from_millis(50),
            ..WriterOptions::default()
        },
    )
    .unwrap();

    c.bench_function("writer_append", |b| {
        b.iter(|| black_box(writer.append("benchmark line")))
    });
    writer.flush_and_stop();
}

fn bench_logger_log(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let logger = LoggerBuilder::new(temp.path())
        .buffer_capacity(100_000)
        .flush_interval(Duration::from_millis(50))
        .build()
        .unwrap();

    c.bench_function("logger_log_with_tag", |b| {
        b.iter(|| logger.log_with_tag(black_box("bench"), black_box("a typical log message")))
    });
    logger.shutdown();
}

criterion_group!(
    benches,
    bench_format_line,
    bench_buffer,
    bench_writer_append,
    bench_logger_log,
);
criterion_main!(benches);
