//! SM2DSA benchmarks

use core::hint::black_box;
use criterion::{
    BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::Measurement,
};
use gm_sm2::{ContextConfig, PrivateKey, SignMode, Sm2Context};
use hex_literal::hex;

const SIGNING_KEY_BYTES: [u8; 32] =
    hex!("1cf6bc6c7f642a84994119e206c9f0753ff100709f4fd12f2338c1be60bf4175");
const ID: &[u8] = b"1234567812345678";

fn context() -> Sm2Context {
    Sm2Context::with_config(&ContextConfig::new().seed([0; 32])).unwrap()
}

fn bench_sign<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let mut ctx = context();
    let sk = black_box(PrivateKey::from_bytes(&SIGNING_KEY_BYTES).unwrap());
    let pk = sk.public_key();
    let msg = black_box(b"example message");
    group.bench_function("sign", |b| {
        b.iter(|| black_box(ctx.sign(msg, ID, &pk, &sk, SignMode::RsAsn1).unwrap()))
    });
}

fn bench_verify<M: Measurement>(group: &mut BenchmarkGroup<'_, M>) {
    let mut ctx = context();
    let sk = PrivateKey::from_bytes(&SIGNING_KEY_BYTES).unwrap();
    let pk = black_box(sk.public_key());
    let msg = black_box(b"example message");
    let sig = black_box(ctx.sign(msg, ID, &pk, &sk, SignMode::RsAsn1).unwrap());
    group.bench_function("verify", |b| {
        b.iter(|| ctx.verify(msg, ID, &sig, &pk, SignMode::RsAsn1))
    });

    ctx.bind_public_key(&pk);
    group.bench_function("verify (bound key)", |b| {
        b.iter(|| ctx.verify(msg, ID, &sig, &pk, SignMode::RsAsn1))
    });
}

fn bench_dsa(c: &mut Criterion) {
    let mut group = c.benchmark_group("SM2DSA");
    bench_sign(&mut group);
    bench_verify(&mut group);
    group.finish();
}

criterion_group!(benches, bench_dsa);
criterion_main!(benches);
