//! Parses a few gateway narratives and builds a dynamic QRIS
//!
//! Usage: cargo run -p qiospay-core --example demo [amount]

use anyhow::Context;
use qiospay_core::crc::checksum_hex;
use qiospay_core::{create_qris, FeeOptions, NarrativeFamily, NarrativeParser, QrisConfig};

const SAMPLES: &[(NarrativeFamily, &str)] = &[
    (
        NarrativeFamily::Callback,
        "T#1901056 R#trx_1759291955, Alhamdulillah, SUKSES. Bank BCA-Saldo BCA 10.000.0953955315. SN: 2025100117611514797454387969. Saldo 48060 - 11900 = 36.160 @01\\/10\\/2025 11:12\r\nqiospay.id",
    ),
    (
        NarrativeFamily::Submission,
        "R#trx_1759238656 DANA15 6285155092922 Gagal, Voucher tidak tersedia, silakan pilih nominal lainnya.. Saldo 88.420 @ 30/09/2025 20:24",
    ),
    (
        NarrativeFamily::Submission,
        "R#trx_1758141872 cekd 085155092922, Mohon tunggu transaksi sedang diproses. Saldo 100.543 @ 18/09/2025 10:44",
    ),
];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let amount: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse().context("amount must be a positive integer")?,
        None => 15000,
    };

    let parser = NarrativeParser::new();
    for (family, text) in SAMPLES {
        let parsed = parser.parse_traced(text, *family);
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    }

    let body = "00020101021126570011ID.DANA.WWW011893600915000000000102091234567890303UMI5204549953033605802ID5912TOKO QIOSPAY6008SURABAYA61056011162070703A016304";
    let config = QrisConfig {
        static_payload: format!("{}{}", body, checksum_hex(body)),
        fee: Some(FeeOptions::rupiah(500.0)),
    };

    let qr = create_qris(&config, Some(amount), None, Some(6))?;
    println!("QRIS: {}", qr.qris_string);
    if let Some(image) = qr.qris_image {
        println!("Image: {} bytes of data URI", image.len());
    }

    Ok(())
}
