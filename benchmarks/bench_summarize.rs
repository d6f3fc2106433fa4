use std::hint::black_box;
use std::io::Write;

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::NamedTempFile;

use txsum::generator::{write_csv, RecordGenerator};
use txsum::{summarize_file, summarize_reader, ParallelConfig, Period};

const ROWS: usize = 200_000;

fn generated_file() -> NamedTempFile {
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).expect("valid date");
    let records = RecordGenerator::new(17, end, 2)
        .expect("generator")
        .take(ROWS);
    let mut file = NamedTempFile::new().expect("temp file");
    {
        let mut writer = std::io::BufWriter::new(file.as_file_mut());
        write_csv(&mut writer, records).expect("write csv");
        writer.flush().expect("flush");
    }
    file
}

fn bench_workers(c: &mut Criterion) {
    let file = generated_file();
    let period = Period::new(2023, 6).expect("valid period");

    let mut group = c.benchmark_group("summarize_file");
    group.sample_size(20);
    for workers in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            let config = ParallelConfig::with_workers(w);
            b.iter(|| {
                let result = summarize_file(black_box(file.path()), period, &config)
                    .expect("summarize");
                black_box(result.summary.records.len());
            });
        });
    }
    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let content = std::fs::read(generated_file().path()).expect("read back");
    let period = Period::new(2023, 6).expect("valid period");
    c.bench_function("summarize_reader", |b| {
        b.iter(|| {
            let result = summarize_reader(black_box(content.as_slice()), period)
                .expect("summarize");
            black_box(result.summary.total_income);
        });
    });
}

criterion_group!(benches, bench_workers, bench_reader);
criterion_main!(benches);
