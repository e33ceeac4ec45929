use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use webhook_log_forwarder::buffer::{BatchPacker, SealReason};
use webhook_log_forwarder::parser::{LineClassifier, LineFormatter, format_line};

const SAMPLE_LINES: [&str; 5] = [
    "LOG  : General     , 1697040000000> 0> Server started on port 16261",
    "WARN core > > chunk save took 412ms",
    "ERROR db > connection lost, retrying",
    "[!] disk almost full",
    "plain line with **emphasis** and no separator",
];

fn benchmark_classification(c: &mut Criterion) {
    let classifier = LineClassifier::new();
    let bytes: usize = SAMPLE_LINES.iter().map(|line| line.len()).sum();

    let mut group = c.benchmark_group("classification");
    group.throughput(Throughput::Bytes(bytes as u64));

    group.bench_function("classify_mixed", |b| {
        b.iter(|| {
            for line in SAMPLE_LINES {
                std::hint::black_box(classifier.classify(std::hint::black_box(line)));
            }
        });
    });

    group.bench_function("format_mixed", |b| {
        let formatter = LineFormatter::default();
        b.iter(|| {
            for line in SAMPLE_LINES {
                std::hint::black_box(format_line(&classifier, &formatter, line));
            }
        });
    });

    group.finish();
}

fn benchmark_packing(c: &mut Criterion) {
    let classifier = LineClassifier::new();
    let formatter = LineFormatter::default();
    let formatted: Vec<String> = SAMPLE_LINES
        .iter()
        .cycle()
        .take(500)
        .filter_map(|line| format_line(&classifier, &formatter, line))
        .collect();

    c.bench_function("pack_500_lines", |b| {
        b.iter(|| {
            let mut packer = BatchPacker::new(2000);
            for line in &formatted {
                packer.push(line.clone());
            }
            std::hint::black_box(packer.drain(SealReason::WindowElapsed))
        });
    });
}

criterion_group!(benches, benchmark_classification, benchmark_packing);
criterion_main!(benches);
