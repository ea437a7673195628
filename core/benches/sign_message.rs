// benches/sign_message.rs
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pgpmime_core::engine::{EngineError, OpenPgpEngine};
use pgpmime_core::mime::{Message, MimeEntity};
use pgpmime_core::{PgpMimeSigner, SignerConfig};
use std::hint::black_box;

/// Answers with fixed-size armor so only the MIME work is measured.
struct FixedArmorEngine;

impl OpenPgpEngine for FixedArmorEngine {
    fn add_encrypt_key(&mut self, _key_id: &str) -> Result<(), EngineError> {
        Ok(())
    }

    fn add_sign_key(&mut self, _key_id: &str, _passphrase: Option<&str>) -> Result<(), EngineError> {
        Ok(())
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        // Roughly the size of real armor: base64 growth plus framing lines.
        let mut out = b"-----BEGIN PGP MESSAGE-----\r\n\r\n".to_vec();
        out.resize(out.len() + plaintext.len() * 4 / 3, b'A');
        out.extend_from_slice(b"\r\n-----END PGP MESSAGE-----\r\n");
        Ok(out)
    }

    fn encrypt_and_sign(&self, plaintext: &[u8]) -> Result<Vec<u8>, EngineError> {
        self.encrypt(plaintext)
    }
}

fn message_with_attachment(size: usize) -> Message {
    let mut message = Message::text("benchmark", "see attached");
    message.set_from("bob@example.com");
    message.add_to("alice@example.com");
    message.attach(MimeEntity::attachment(vec![0x5au8; size], Some("payload.bin"), None));
    message
}

fn bench_sign_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("sign_message");
    let signer = PgpMimeSigner::with_engine(FixedArmorEngine, &SignerConfig::new("alice@example.com")).unwrap();

    for &size in &[1024usize, 64 * 1024, 1024 * 1024] {
        let message = message_with_attachment(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("attachment", format_size(size)), &message, |b, message| {
            b.iter(|| {
                let encrypted = signer.encrypt_message(black_box(message)).unwrap();
                black_box(encrypted.to_bytes().unwrap())
            });
        });
    }

    group.finish();
}

fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    if bytes >= MB {
        format!("{} MiB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KiB", bytes / KB)
    } else {
        format!("{bytes} B")
    }
}

criterion_group!(benches, bench_sign_message);
criterion_main!(benches);
