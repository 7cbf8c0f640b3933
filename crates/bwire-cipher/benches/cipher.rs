use bwire_cipher::{Aes256CbcEngine, RollingDecryptor, RollingEncryptor, StreamKey};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn engine() -> Aes256CbcEngine {
    Aes256CbcEngine::new(StreamKey::from_bytes([0xB7u8; 32]))
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_rolling_encrypt(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    let iv = [0u8; 16];
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench_local(|| {
            let mut enc = RollingEncryptor::new(engine(), &iv).unwrap();
            enc.process(divan::black_box(&data)).unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_rolling_decrypt(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    let iv = [0u8; 16];
    let ciphertext = RollingEncryptor::new(engine(), &iv)
        .unwrap()
        .process(&data)
        .unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench_local(|| {
            let mut dec = RollingDecryptor::new(engine(), &iv).unwrap();
            dec.process(divan::black_box(&ciphertext)).unwrap()
        });
}

fn main() {
    divan::main();
}
