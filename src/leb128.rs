//! Unsigned and signed LEB128 integer encoding and decoding.
//!
//! Every integer immediate in the binary format goes through this module.
//! Encodings are always minimal-length: no non-canonical padding groups are
//! ever produced, and `read_*(write_*(x)) == x` over the full value range.

const LOW_7_BITS: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;
const SIGN: u8 = 0x40;

/// Write `value` as unsigned LEB128.
pub fn write_u32(sink: &mut Vec<u8>, value: u32) {
    write_u64(sink, value.into());
}

/// Write `value` as unsigned LEB128.
///
/// Values all the way up to `u64::MAX` encode correctly (ten groups); the
/// shift is logical, so the high bit is never lost.
pub fn write_u64(sink: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        sink.push(value as u8 & LOW_7_BITS | CONTINUATION);
        value >>= 7;
    }
    sink.push(value as u8);
}

/// Write `value` as signed (two's complement) LEB128.
pub fn write_s64(sink: &mut Vec<u8>, mut value: i64) {
    loop {
        let byte = value as u8 & LOW_7_BITS;
        value >>= 7;
        let done = (value == 0 && byte & SIGN == 0) || (value == -1 && byte & SIGN != 0);
        if done {
            sink.push(byte);
            return;
        }
        sink.push(byte | CONTINUATION);
    }
}

/// Read an unsigned LEB128 value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if the input
/// ends before a terminating group or runs past the ten-group maximum.
pub fn read_u64(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut result = 0;
    let mut shift = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= 64 {
            return None;
        }
        result |= u64::from(byte & LOW_7_BITS) << shift;
        if byte & CONTINUATION == 0 {
            return Some((result, i + 1));
        }
        shift += 7;
    }
    None
}

/// Read a signed LEB128 value from the front of `bytes`.
///
/// Sign-extends from the bit position following the last group when that
/// group's sign bit is set.
pub fn read_s64(bytes: &[u8]) -> Option<(i64, usize)> {
    let mut result = 0;
    let mut shift = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if shift >= 64 {
            return None;
        }
        result |= i64::from(byte & LOW_7_BITS) << shift;
        shift += 7;
        if byte & CONTINUATION == 0 {
            if shift < 64 && byte & SIGN != 0 {
                result |= -1 << shift;
            }
            return Some((result, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(value: u64) -> Vec<u8> {
        let mut sink = Vec::new();
        write_u64(&mut sink, value);
        sink
    }

    fn signed(value: i64) -> Vec<u8> {
        let mut sink = Vec::new();
        write_s64(&mut sink, value);
        sink
    }

    #[test]
    fn unsigned_canonical_vectors() {
        assert_eq!(unsigned(0), [0x00]);
        assert_eq!(unsigned(42), [0x2A]);
        assert_eq!(unsigned(127), [0x7F]);
        assert_eq!(unsigned(128), [0x80, 0x01]);
        assert_eq!(unsigned(9001), [0xA9, 0x46]);
        assert_eq!(unsigned(624485), [0xE5, 0x8E, 0x26]);
    }

    #[test]
    fn unsigned_u64_boundary() {
        let mut expected = vec![0xFF; 9];
        expected.push(0x01);
        assert_eq!(unsigned(u64::MAX), expected);
        assert_eq!(read_u64(&unsigned(u64::MAX)), Some((u64::MAX, 10)));
    }

    #[test]
    fn signed_canonical_vectors() {
        assert_eq!(signed(0), [0x00]);
        assert_eq!(signed(-1), [0x7F]);
        assert_eq!(signed(63), [0x3F]);
        assert_eq!(signed(64), [0xC0, 0x00]);
        assert_eq!(signed(-64), [0x40]);
        assert_eq!(signed(-65), [0xBF, 0x7F]);
        assert_eq!(signed(-42), [0x56]);
        assert_eq!(signed(-9001), [0xD7, 0xB9, 0x7F]);
        assert_eq!(signed(-123456), [0xC0, 0xBB, 0x78]);
    }

    #[test]
    fn signed_i64_boundaries() {
        let mut min = vec![0x80; 9];
        min.push(0x7F);
        assert_eq!(signed(i64::MIN), min);

        let mut max = vec![0xFF; 9];
        max.push(0x00);
        assert_eq!(signed(i64::MAX), max);

        assert_eq!(read_s64(&signed(i64::MIN)), Some((i64::MIN, 10)));
        assert_eq!(read_s64(&signed(i64::MAX)), Some((i64::MAX, 10)));
    }

    #[test]
    fn unsigned_round_trip() {
        let mut samples = vec![0, 1, 2, 42, 9001, 624485, u64::from(u32::MAX)];
        for bit in 0..64 {
            let p = 1u64 << bit;
            samples.extend([p - 1, p, p.wrapping_add(1)]);
        }
        for value in samples {
            let bytes = unsigned(value);
            assert_eq!(read_u64(&bytes), Some((value, bytes.len())), "value {value}");
        }
    }

    #[test]
    fn signed_round_trip() {
        let mut samples = vec![0i64, 1, -1, 42, -42, 9001, -9001, -123456];
        for bit in 0..63 {
            let p = 1i64 << bit;
            samples.extend([p - 1, p, p + 1, -p, -p - 1, (-p).wrapping_add(1)]);
        }
        for value in samples {
            let bytes = signed(value);
            assert_eq!(read_s64(&bytes), Some((value, bytes.len())), "value {value}");
        }
    }

    #[test]
    fn encodings_are_minimal() {
        for (value, len) in [(0u64, 1), (0x7F, 1), (0x80, 2), (0x3FFF, 2), (0x4000, 3)] {
            assert_eq!(unsigned(value).len(), len);
        }
        // A padded encoding of 42 still decodes, but is never produced.
        assert_eq!(read_u64(&[0xAA, 0x00]), Some((42, 2)));
        assert_eq!(unsigned(42).len(), 1);
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(read_u64(&[]), None);
        assert_eq!(read_u64(&[0x80, 0x80]), None);
        assert_eq!(read_s64(&[0xFF]), None);
    }
}
