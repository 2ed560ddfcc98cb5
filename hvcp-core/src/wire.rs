//! LSB/MSB wire helpers
//!
//! The HVC protocol packs every multi-byte integer as little-endian,
//! least-significant byte first, regardless of host endianness. This is
//! the single numeric rule used everywhere multi-byte fields appear.

/// Reconstruct a 16-bit value from its wire bytes
///
/// # Examples
///
/// ```
/// use hvcp_core::wire;
///
/// assert_eq!(wire::u16_from_lsb_msb(0x34, 0x12), 0x1234);
/// ```
pub fn u16_from_lsb_msb(lsb: u8, msb: u8) -> u16 {
    lsb as u16 | ((msb as u16) << 8)
}

/// Split a 16-bit value into its wire bytes
///
/// Exact inverse of [`u16_from_lsb_msb`] on the full `u16` range.
pub fn u16_to_lsb_msb(value: u16) -> (u8, u8) {
    ((value & 0xFF) as u8, (value >> 8) as u8)
}

/// Read a 16-bit little-endian value out of a byte slice
///
/// # Panics
///
/// Panics if `buf` has fewer than `offset + 2` bytes. Callers size their
/// buffers from the fixed response shapes, so the bound is static.
pub fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16_from_lsb_msb(buf[offset], buf[offset + 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_u16_from_lsb_msb() {
        assert_eq!(u16_from_lsb_msb(0x00, 0x00), 0);
        assert_eq!(u16_from_lsb_msb(0xFF, 0x00), 255);
        assert_eq!(u16_from_lsb_msb(0x00, 0x01), 256);
        assert_eq!(u16_from_lsb_msb(0xFF, 0xFF), 65535);
    }

    #[test]
    fn test_u16_to_lsb_msb() {
        assert_eq!(u16_to_lsb_msb(0x1234), (0x34, 0x12));
        assert_eq!(u16_to_lsb_msb(0), (0, 0));
        assert_eq!(u16_to_lsb_msb(65535), (0xFF, 0xFF));
    }

    #[test]
    fn test_u16_at() {
        let buf = [0x00, 0x34, 0x12, 0x00];
        assert_eq!(u16_at(&buf, 1), 0x1234);
    }

    proptest! {
        #[test]
        fn prop_from_matches_shift_add(lsb: u8, msb: u8) {
            prop_assert_eq!(
                u16_from_lsb_msb(lsb, msb),
                lsb as u16 + ((msb as u16) << 8)
            );
        }

        #[test]
        fn prop_split_is_inverse(value: u16) {
            let (lsb, msb) = u16_to_lsb_msb(value);
            prop_assert_eq!(u16_from_lsb_msb(lsb, msb), value);
        }
    }
}
