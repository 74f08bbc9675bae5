use commonware_primitives::{Backend, Ctr, ExpandedKey};
use criterion::{criterion_group, BatchSize, Criterion, Throughput};
use rand::{rngs::StdRng, RngCore, SeedableRng};

fn benchmark_apply_keystream(c: &mut Criterion) {
    let mut sampler = StdRng::seed_from_u64(0);
    for key_len in [16, 32] {
        let mut raw = vec![0u8; key_len];
        sampler.fill_bytes(&mut raw);
        let key = ExpandedKey::new(&raw).unwrap();
        for len in [64, 4096, 1 << 20] {
            let mut data = vec![0u8; len];
            sampler.fill_bytes(&mut data);
            let mut group = c.benchmark_group(format!(
                "{}/key_len={} len={}",
                module_path!(),
                key_len,
                len
            ));
            group.throughput(Throughput::Bytes(len as u64));
            for backend in [Backend::Portable, Backend::Hardware] {
                if !backend.is_block_cipher_available() {
                    continue;
                }
                group.bench_function(format!("backend={backend:?}"), |b| {
                    b.iter_batched_ref(
                        || data.clone(),
                        |buf| Ctr::with_backend(&key, 0, backend).apply_keystream(buf),
                        BatchSize::SmallInput,
                    );
                });
            }
            group.finish();
        }
    }
}

criterion_group!(benches, benchmark_apply_keystream);
