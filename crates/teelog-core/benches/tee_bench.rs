//! Benchmarks for the logging write path
//!
//! Run with: cargo bench -p teelog-core
//!
//! These benchmarks establish baselines for:
//! - Record encoding (JSON and console)
//! - Fan-out through a tee to memory sinks
//! - Filtered-out writes
//! - Buffered file writes

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::tempdir;
use teelog_core::encoder::{ConsoleEncoder, JsonEncoder};
use teelog_core::{
    console_sink_to, file_sink, with_file_path, with_level, ConsoleTarget, EncoderConfig, Entry,
    Field, Handle, Level, MemoryWriter, SinkBuilder,
};

fn sample_entry() -> Entry {
    Entry::new(Level::Info, "request handled").with_fields([
        Field::new("method", "GET"),
        Field::new("status", 200),
        Field::new("latency_ms", 12.5),
    ])
}

fn memory_builders(count: usize, level: Level) -> Vec<SinkBuilder> {
    (0..count)
        .map(|_| console_sink_to(ConsoleTarget::Memory(MemoryWriter::new()), [with_level(level)]))
        .collect()
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let entry = sample_entry();

    let json = JsonEncoder::new(EncoderConfig::default());
    group.bench_function("json", |b| b.iter(|| black_box(json.encode(&entry).unwrap())));

    let console = ConsoleEncoder::new(EncoderConfig::default());
    group.bench_function("console", |b| {
        b.iter(|| black_box(console.encode(&entry).unwrap()))
    });

    group.finish();
}

// ============================================================================
// Fan-out Benchmarks
// ============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("fanout");

    for sinks in [1usize, 2, 4, 8] {
        let log = Handle::build(memory_builders(sinks, Level::Debug)).unwrap();
        group.throughput(Throughput::Elements(sinks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sinks), &sinks, |b, _| {
            b.iter(|| log.write(Level::Info, black_box("request handled"), [Field::new("status", 200)]))
        });
    }

    group.finish();
}

fn bench_filtered(c: &mut Criterion) {
    let log = Handle::build(memory_builders(2, Level::Error)).unwrap();
    c.bench_function("filtered_debug_write", |b| {
        b.iter(|| log.debug(black_box("never delivered")))
    });
}

// ============================================================================
// File Benchmarks
// ============================================================================

fn bench_file_write(c: &mut Criterion) {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("bench.log");
    let log = Handle::build([file_sink([with_file_path(&path)])]).unwrap();

    c.bench_function("file_write_buffered", |b| {
        b.iter(|| log.info(black_box("request handled")))
    });
}

criterion_group!(benches, bench_encode, bench_fanout, bench_filtered, bench_file_write);
criterion_main!(benches);
