use commonware_primitives::{ctr, ExpandedKey};
use criterion::{criterion_group, BatchSize, Criterion, Throughput};
use rand::{rngs::StdRng, RngCore, SeedableRng};

fn benchmark_par_encrypt(c: &mut Criterion) {
    let mut sampler = StdRng::seed_from_u64(0);
    let mut raw = [0u8; 32];
    sampler.fill_bytes(&mut raw);
    let key = ExpandedKey::from(&raw);
    for len in [1 << 20, 16 << 20] {
        let mut data = vec![0u8; len];
        sampler.fill_bytes(&mut data);
        let mut group = c.benchmark_group(format!("{}/len={}", module_path!(), len));
        group.throughput(Throughput::Bytes(len as u64));
        group.sample_size(20);
        group.bench_function("sequential", |b| {
            b.iter_batched_ref(
                || data.clone(),
                |buf| ctr::encrypt_in_place(&key, 0, buf),
                BatchSize::LargeInput,
            );
        });
        group.bench_function("parallel", |b| {
            b.iter_batched_ref(
                || data.clone(),
                |buf| ctr::par_encrypt_in_place(&key, 0, buf),
                BatchSize::LargeInput,
            );
        });
        group.finish();
    }
}

criterion_group!(benches, benchmark_par_encrypt);
