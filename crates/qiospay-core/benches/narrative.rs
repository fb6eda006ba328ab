//! Benchmarks for narrative parsing and QRIS conversion

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qiospay_core::crc::checksum_hex;
use qiospay_core::{make_dynamic, normalize, FeeOptions, NarrativeFamily, NarrativeParser};

const CALLBACK: &str = "T#1899822 R#trx_1759243747, Alhamdulillah, SUKSES. DANA H2H-Saldo Dana 15.000.085155092922. SN: DanaTopup-DNID ANDXX SETXXXX\\/15000\\/2025093010121481030100166095304620436.. Saldo 73345 - 15075 = 58.270 @30\\/09\\/2025 21:55\r\nqiospay.id";
const SUBMISSION: &str = "R#trx_1758979420 Saldo Dana 10.000 DANA10.085155092922, diabaikan karena Harga Voucher 10.060 lebih besar dari Harga Max anda 1.000. Saldo 71.232 @27/09/2025 20:23";
// Falls through every submission rule
const UNMATCHED: &str = "R#trx_1759999999 sedang antri, mohon tunggu beberapa saat lagi";

fn sticker() -> String {
    let body = "00020101021126570011ID.DANA.WWW011893600915000000000102091234567890303UMI5204549953033605802ID5912TOKO QIOSPAY6008SURABAYA61056011162070703A016304";
    format!("{}{}", body, checksum_hex(body))
}

fn benchmark_normalize(c: &mut Criterion) {
    c.bench_function("normalize_callback", |b| {
        b.iter(|| normalize(black_box(CALLBACK)))
    });
}

fn benchmark_parse(c: &mut Criterion) {
    let parser = NarrativeParser::new();

    c.bench_function("parse_callback", |b| {
        b.iter(|| parser.parse(black_box(CALLBACK), NarrativeFamily::Callback))
    });

    c.bench_function("parse_submission_first_rule", |b| {
        b.iter(|| parser.parse(black_box(SUBMISSION), NarrativeFamily::Submission))
    });

    c.bench_function("parse_submission_unmatched", |b| {
        b.iter(|| parser.parse(black_box(UNMATCHED), NarrativeFamily::Submission))
    });
}

fn benchmark_dynamic_qris(c: &mut Criterion) {
    let sticker = sticker();
    let fee = FeeOptions::percentage(0.7);

    c.bench_function("make_dynamic", |b| {
        b.iter(|| make_dynamic(black_box(&sticker), 15000, None))
    });

    c.bench_function("make_dynamic_with_fee", |b| {
        b.iter(|| make_dynamic(black_box(&sticker), 15000, Some(&fee)))
    });
}

criterion_group!(benches, benchmark_normalize, benchmark_parse, benchmark_dynamic_qris);
criterion_main!(benches);
