/// FECF size in bytes.
pub const FECF_SIZE: usize = 2;

/// CRC-16-CCITT (polynomial 0x1021, init 0xFFFF, no reflection) as used for the
/// TC Frame Error Control Field.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
