/// Unsigned integer size class used to turn a digest into a table position.
///
/// The class is the smallest of 8, 16 or 32 bits that can hold the table's
/// entry count. Reading that many leading digest bytes gives just enough
/// resolution to land near the right slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthClass {
    U8,
    U16,
    U32,
}

impl WidthClass {
    /// Smallest class whose maximum holds `value`, or `None` past 32 bits.
    pub fn classify(value: u64) -> Option<Self> {
        if value <= u8::MAX as u64 {
            Some(Self::U8)
        } else if value <= u16::MAX as u64 {
            Some(Self::U16)
        } else if value <= u32::MAX as u64 {
            Some(Self::U32)
        } else {
            None
        }
    }

    /// Largest value representable in this class.
    pub const fn max_value(self) -> u64 {
        match self {
            Self::U8 => u8::MAX as u64,
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
        }
    }

    /// Width in bytes.
    pub const fn byte_width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    /// Read the leading bytes of `digest` as a big-endian integer.
    ///
    /// Digests shorter than the class width are zero-padded on the right.
    pub fn leading_value(self, digest: &[u8]) -> u64 {
        (0..self.byte_width()).fold(0u64, |acc, i| {
            (acc << 8) | digest.get(i).copied().unwrap_or(0) as u64
        })
    }

    /// Predicted position of `digest` in a table of `len` uniformly
    /// distributed entries, clamped to `[0, len - 1]`.
    ///
    /// `len` must fit this class; callers get the class from
    /// [`WidthClass::classify`] on the same length.
    pub fn predict(self, digest: &[u8], len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let seed = self.leading_value(digest) * len as u64 / self.max_value();
        (seed as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(WidthClass::classify(0), Some(WidthClass::U8));
        assert_eq!(WidthClass::classify(255), Some(WidthClass::U8));
        assert_eq!(WidthClass::classify(256), Some(WidthClass::U16));
        assert_eq!(WidthClass::classify(65_535), Some(WidthClass::U16));
        assert_eq!(WidthClass::classify(65_536), Some(WidthClass::U32));
        assert_eq!(WidthClass::classify(u32::MAX as u64), Some(WidthClass::U32));
        assert_eq!(WidthClass::classify(u32::MAX as u64 + 1), None);
    }

    #[test]
    fn leading_value_is_big_endian() {
        let digest = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert_eq!(WidthClass::U8.leading_value(&digest), 0x12);
        assert_eq!(WidthClass::U16.leading_value(&digest), 0x1234);
        assert_eq!(WidthClass::U32.leading_value(&digest), 0x1234_5678);
    }

    #[test]
    fn leading_value_pads_short_digest() {
        assert_eq!(WidthClass::U32.leading_value(&[0xAB]), 0xAB00_0000);
    }

    #[test]
    fn predict_spans_table() {
        assert_eq!(WidthClass::U8.predict(&[0x00], 10), 0);
        assert_eq!(WidthClass::U8.predict(&[0x80], 10), 5);
        assert_eq!(WidthClass::U8.predict(&[0xFF], 10), 9);
    }

    #[test]
    fn predict_empty_table() {
        assert_eq!(WidthClass::U8.predict(&[0xFF], 0), 0);
    }

    #[test]
    fn max_value_and_width_agree() {
        for class in [WidthClass::U8, WidthClass::U16, WidthClass::U32] {
            assert_eq!(class.max_value(), (1u64 << (class.byte_width() * 8)) - 1);
        }
    }
}
