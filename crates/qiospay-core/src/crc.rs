//! CRC-16/CCITT-FALSE as used by EMV merchant-presented QR codes
//!
//! Poly: 0x1021, Init: 0xFFFF, MSB-first, no final XOR

pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        let x = ((crc >> 8) ^ (byte as u16)) & 0xFF;
        let x = x ^ (x >> 4);
        crc = (crc << 8) ^ (x << 12) ^ (x << 5) ^ x;
    }
    crc
}

/// Four uppercase hex digits, the form tag 63 carries
pub fn checksum_hex(data: &str) -> String {
    format!("{:04X}", crc16_ccitt_false(data.as_bytes()))
}
