use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use fpc::{compress, helpers::ByteCounter, io::SliceSource, FpcCodec};

const LEN: usize = 1 << 16;
const LOG_TABLE_SIZE: u32 = 16;

fn series() -> Vec<f64> {
    (0..LEN).map(|i| (i as f64 / 256.0).sin() * 1e3 + (i % 7) as f64).collect()
}

fn bench_codec(c: &mut Criterion) {
    let values = series();
    let compressed = compress(&values, LOG_TABLE_SIZE).unwrap();

    let mut group = c.benchmark_group("fpc");
    group.throughput(Throughput::Bytes((LEN * 8) as u64));

    group.bench_function("encode", |b| {
        b.iter(|| {
            let mut codec = FpcCodec::new(LOG_TABLE_SIZE).unwrap();
            let mut sink = ByteCounter::new();
            codec.encode(black_box(&values), &mut sink).unwrap();
            sink.count()
        })
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut codec = FpcCodec::new(LOG_TABLE_SIZE).unwrap();
            let mut source = SliceSource::new(black_box(&compressed));
            codec.decode(&mut source, LEN).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
