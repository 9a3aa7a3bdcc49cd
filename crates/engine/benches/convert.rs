use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use endings_engine::{Convention, ScanOptions, convert_stream};

fn sample(ending: &[u8], lines: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..lines {
        data.extend_from_slice(format!("line number {i} with a bit of text").as_bytes());
        data.extend_from_slice(ending);
    }
    data
}

fn benchmark_stream_conversion(c: &mut Criterion) {
    let crlf_input = sample(b"\r\n", 10_000);
    let lf_input = sample(b"\n", 10_000);
    let options = ScanOptions {
        target: Convention::Lf,
        force_final_newline: false,
        stop_on_mismatch: false,
        stop_on_non_text: false,
    };

    c.bench_function("convert_crlf_to_lf", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(crlf_input.len());
            let report = convert_stream(black_box(crlf_input.as_slice()), &mut out, options);
            black_box((out, report));
        })
    });

    c.bench_function("scan_conforming_lf", |b| {
        b.iter(|| {
            let report = convert_stream(black_box(lf_input.as_slice()), std::io::sink(), options);
            black_box(report);
        })
    });
}

criterion_group!(benches, benchmark_stream_conversion);
criterion_main!(benches);
