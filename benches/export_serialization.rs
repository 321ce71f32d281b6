//! Benchmark metadata export in every format.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vidiform::export::serialize;
use vidiform_common::{ExportFormat, MetadataRecord};

fn make_record(i: usize) -> MetadataRecord {
    let mut record = MetadataRecord::new(format!("Holiday Clip {i}, \"take\" <{}>", i % 7));
    record.year = Some(2000 + (i % 25) as i32);
    record.genre = Some("Documentary".to_string());
    record.description = Some("Footage used for benchmarking export".to_string());
    record.duration = "00:12:34".to_string();
    record.resolution = "3840x2160".to_string();
    record.frame_rate = "59.94".to_string();
    record.codec = Some("H.265".to_string());
    record
        .with_field("camera", "A7S III")
        .with_field("location", "Lisbon & Porto")
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for size in [1usize, 100, 1000] {
        let records: Vec<MetadataRecord> = (0..size).map(make_record).collect();
        for format in ExportFormat::ALL {
            group.bench_with_input(
                BenchmarkId::new(format.extension(), size),
                &records,
                |b, records| {
                    b.iter(|| serialize(black_box(records), format).unwrap());
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_export);
criterion_main!(benches);
