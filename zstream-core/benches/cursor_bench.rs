use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use zstream_core::{InputCursor, OutputCursor, StagingBuffer};

fn bench_staged_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("staged_copy");

    for capacity in [64, 4096, 16 * 1024, 32 * 1024] {
        let data = vec![0x5Au8; 1_000_000];
        group.throughput(Throughput::Bytes(data.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &data,
            |b, data| {
                let mut staging = StagingBuffer::new(capacity);
                let mut sink = vec![0u8; capacity];
                b.iter(|| {
                    let mut input = InputCursor::new(data);
                    while !input.is_exhausted() {
                        let mut output = OutputCursor::new(staging.region_mut());
                        let n = output.write_from(input.unconsumed());
                        input.consume(n);
                        staging.set_filled(n);
                        black_box(staging.copy_to(&mut sink));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_staged_copy);
criterion_main!(benches);
