//! Conversion-mode flag word.

bitflags::bitflags! {
    /// The IME's current input behavior, as a combinable bit set.
    ///
    /// An all-clear set means plain alphanumeric input. The subsystem does
    /// not enforce mutual exclusion between flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConversionMode: u32 {
        /// Native-language input.
        const NATIVE = 0x0001;
        /// Katakana input.
        const KATAKANA = 0x0002;
        /// Full-width character input.
        const FULL_SHAPE = 0x0008;
        /// Romanized input.
        const ROMAN = 0x0010;
        /// Character-code input.
        const CHAR_CODE = 0x0020;
        /// Hanja conversion.
        const HANJA_CONVERT = 0x0040;
        /// Software keyboard.
        const SOFT_KEYBOARD = 0x0080;
        /// No-conversion mode.
        const NO_CONVERSION = 0x0100;
        /// End-user-defined-character conversion.
        const EUDC = 0x0200;
        /// Symbol input.
        const SYMBOL = 0x0400;
    }
}

impl ConversionMode {
    /// Reinterpret the subsystem's conversion flag word. Bits with no named
    /// flag are dropped.
    pub fn from_word(word: u32) -> Self {
        Self::from_bits_truncate(word)
    }

    /// True when every flag is clear, i.e. plain alphanumeric input.
    pub fn is_alphanumeric(self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_katakana_word() {
        let mode = ConversionMode::from_word(0x0003);
        assert_eq!(mode, ConversionMode::NATIVE | ConversionMode::KATAKANA);
        assert!(!mode.is_alphanumeric());
    }

    #[test]
    fn zero_word_is_alphanumeric() {
        assert!(ConversionMode::from_word(0).is_alphanumeric());
    }

    #[test]
    fn unknown_bits_are_dropped() {
        let mode = ConversionMode::from_word(0x8001);
        assert_eq!(mode, ConversionMode::NATIVE);
    }

    #[test]
    fn flags_combine_without_exclusion() {
        let mode = ConversionMode::from_word(0x0001 | 0x0100 | 0x0400);
        assert!(mode.contains(ConversionMode::NATIVE));
        assert!(mode.contains(ConversionMode::NO_CONVERSION));
        assert!(mode.contains(ConversionMode::SYMBOL));
    }
}
