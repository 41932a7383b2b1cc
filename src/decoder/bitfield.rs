//! Bit-field extraction for raw CAEN event header words
//!
//! Header layout (4 words of 32 bits, little-endian):
//! - Word 0: sync nibble `0xA` in the top bits, event size in 32-bit words
//!   in the low 28 bits (header included)
//! - Word 1: board id in bits 27-31, ZLE flag in bit 24, active-channel
//!   bitmask for channels 0-7 in the low 8 bits
//! - Word 2: event counter in the low 24 bits; on 16-channel boards the
//!   top byte carries the bitmask for channels 8-15
//! - Word 3: 32-bit trigger time tag

/// Field masks and shifts
pub mod constants {
    /// Size of one header word in bytes
    pub const WORD_SIZE: usize = 4;
    /// Event header length in words
    pub const HEADER_WORDS: usize = 4;
    /// Event header length in bytes
    pub const HEADER_BYTES: usize = HEADER_WORDS * WORD_SIZE;

    // Word 0. The sync check constrains only bits 31 and 29; the DAQ has
    // always written 0xA and the weaker test is kept for compatibility.
    pub const SYNC_MASK: u32 = 0xA000_0000;
    pub const EVENT_SIZE_MASK: u32 = 0x0FFF_FFFF;

    // Word 1
    pub const BOARD_ID_SHIFT: u32 = 27;
    pub const BOARD_ID_MASK: u32 = 0x1F;
    pub const ZLE_FLAG_SHIFT: u32 = 24;
    pub const CHANNEL_MASK: u32 = 0xFF;

    // Word 2. The counter uses only the low 24 bits; the top byte holds
    // channels 8-15 of the bitmask on 16-channel boards.
    pub const COUNTER_MASK: u32 = 0x00FF_FFFF;
    pub const EXT_CHANNEL_MASK: u32 = 0xFF00_0000;
    pub const EXT_CHANNEL_SHIFT: u32 = 16;
}

use constants::*;

/// Check the sync pattern in header word 0
#[inline]
pub fn is_sync_word(w0: u32) -> bool {
    w0 & SYNC_MASK == SYNC_MASK
}

/// Total event size in 32-bit words, header included
#[inline]
pub fn event_size_words(w0: u32) -> u32 {
    w0 & EVENT_SIZE_MASK
}

/// Board identifier from header word 1
#[inline]
pub fn board_id(w1: u32) -> u8 {
    ((w1 >> BOARD_ID_SHIFT) & BOARD_ID_MASK) as u8
}

/// Whether the event body is zero-length encoded
#[inline]
pub fn zle_enabled(w1: u32) -> bool {
    (w1 >> ZLE_FLAG_SHIFT) & 0x1 == 1
}

/// Active-channel bitmask: channels 0-7 from the low byte of word 1,
/// channels 8-15 from the top byte of word 2
#[inline]
pub fn channel_mask(w1: u32, w2: u32) -> u16 {
    ((w1 & CHANNEL_MASK) | ((w2 & EXT_CHANNEL_MASK) >> EXT_CHANNEL_SHIFT)) as u16
}

/// Event counter from header word 2
#[inline]
pub fn event_counter(w2: u32) -> u32 {
    w2 & COUNTER_MASK
}

/// Channels set in the bitmask, ascending, bounded by the board's cardinality
pub fn active_channels(mask: u16, channel_count: u32) -> Vec<u8> {
    (0..channel_count.min(16) as u8)
        .filter(|ch| mask & (1 << ch) != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_word_accepts_0xa_nibble() {
        assert!(is_sync_word(0xA000_0018));
        assert!(is_sync_word(0xAFFF_FFFF));
    }

    #[test]
    fn sync_word_rejects_cleared_bits() {
        assert!(!is_sync_word(0x0000_0018));
        assert!(!is_sync_word(0x2000_0018));
        assert!(!is_sync_word(0x8000_0018));
    }

    #[test]
    fn sync_word_weakness() {
        // Only bits 31 and 29 are constrained, so 0xE and 0xB nibbles pass.
        assert!(is_sync_word(0xE000_0018));
        assert!(is_sync_word(0xB000_0018));
    }

    #[test]
    fn event_size_ignores_sync_nibble() {
        assert_eq!(event_size_words(0xA000_0018), 0x18);
        assert_eq!(event_size_words(0xAFFF_FFFF), 0x0FFF_FFFF);
    }

    #[test]
    fn board_id_from_top_bits() {
        assert_eq!(board_id(3 << 27), 3);
        assert_eq!(board_id(0xFFFF_FFFF), 0x1F);
        assert_eq!(board_id(0x00FF_FFFF), 0);
    }

    #[test]
    fn zle_flag_is_bit_24() {
        assert!(zle_enabled(1 << 24));
        assert!(!zle_enabled(0));
        assert!(!zle_enabled(1 << 23));
        assert!(!zle_enabled(1 << 25));
    }

    #[test]
    fn channel_mask_low_byte() {
        assert_eq!(channel_mask(0x0000_00C3, 0), 0xC3);
        assert_eq!(channel_mask(0xFFFF_FF00, 0), 0);
    }

    #[test]
    fn channel_mask_high_channels_from_word2() {
        // Channel 8 lives in bit 24 of word 2.
        assert_eq!(channel_mask(0, 0x0100_0000), 0x0100);
        assert_eq!(channel_mask(0x01, 0x8000_0000), 0x8001);
        // The counter bits of word 2 never leak into the mask.
        assert_eq!(channel_mask(0, 0x00FF_FFFF), 0);
    }

    #[test]
    fn counter_masks_to_24_bits() {
        assert_eq!(event_counter(0xFF00_0007), 7);
        assert_eq!(event_counter(0x00FF_FFFF), 0x00FF_FFFF);
    }

    #[test]
    fn active_channels_ascending() {
        assert_eq!(active_channels(0b0000_0101, 8), vec![0, 2]);
        assert_eq!(active_channels(0b1000_0001, 8), vec![0, 7]);
        assert_eq!(active_channels(0, 8), Vec::<u8>::new());
    }

    #[test]
    fn active_channels_above_eight() {
        assert_eq!(active_channels(0x0101, 16), vec![0, 8]);
        assert_eq!(active_channels(0x8000, 16), vec![15]);
    }

    #[test]
    fn active_channels_bounded_by_cardinality() {
        // Bits above the configured channel count are ignored.
        assert_eq!(active_channels(0b1111_0001, 4), vec![0]);
        assert_eq!(active_channels(0x0101, 8), vec![0]);
    }
}
