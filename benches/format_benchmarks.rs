use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;
use sumo_log_shipper::LogOptions;
use sumo_log_shipper::app::{LoggerConfig, OutputFormat};
use sumo_log_shipper::buffer::{FlushPolicy, MessageFormatter, PendingQueue, pending_batch_size};

fn benchmark_formatting(c: &mut Criterion) {
    let formatter = MessageFormatter::new();
    let options = LogOptions::new();
    let json_config = LoggerConfig::new("https://x");
    let graphite_config = LoggerConfig {
        format: OutputFormat::Graphite,
        ..LoggerConfig::new("https://x")
    };

    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    group.bench_function("json_string", |b| {
        b.iter(|| {
            formatter.format(
                &json_config,
                std::hint::black_box(json!("GET /api/users 200 12ms")),
                &options,
                "session",
            )
        });
    });

    group.bench_function("json_object", |b| {
        b.iter(|| {
            formatter.format(
                &json_config,
                std::hint::black_box(json!({"msg": "checkout", "level": "info", "cart": 42})),
                &options,
                "session",
            )
        });
    });

    group.bench_function("graphite", |b| {
        b.iter(|| {
            formatter.format(
                &graphite_config,
                std::hint::black_box(json!({"path": "cpu.load", "value": 0.42})),
                &options,
                "session",
            )
        });
    });

    group.finish();
}

fn benchmark_policy(c: &mut Criterion) {
    let formatter = MessageFormatter::new();
    let config = LoggerConfig {
        batch_size: 1_000_000,
        ..LoggerConfig::new("https://x")
    };

    let mut queue = PendingQueue::new();
    for i in 0..1_000 {
        if let Ok(lines) = formatter.format(
            &config,
            json!(format!("request {} handled", i)),
            &LogOptions::new(),
            "session",
        ) {
            queue.extend(lines);
        }
    }

    let policy = FlushPolicy::new();
    c.bench_function("policy_1000_pending", |b| {
        b.iter(|| policy.evaluate(&config, std::hint::black_box(&queue)));
    });

    c.bench_function("pending_batch_size_1000", |b| {
        b.iter(|| pending_batch_size(std::hint::black_box(&queue).iter()));
    });
}

criterion_group!(benches, benchmark_formatting, benchmark_policy);
criterion_main!(benches);
