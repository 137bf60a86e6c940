//! Bit-field utilities
//!
//! Register values are handled as `u32` regardless of the device width;
//! callers widen with `u32::from`. `width + offset` must not exceed 32.
//!
//! ```text
//!   mask:   ....|f f f f f f|........
//!               ^ offset+width   ^ offset
//!   get_field(mask, width, offset) -> 00..0ffffff
//! ```

/// Mask covering the low `width` bits
#[inline]
pub const fn low_mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Extract `width` bits starting at `offset`, right-justified
#[inline]
pub const fn get_field(mask: u32, width: u32, offset: u32) -> u32 {
    debug_assert!(width + offset <= u32::BITS);
    if offset >= u32::BITS {
        return 0;
    }
    (mask >> offset) & low_mask(width)
}

/// Place the low `width` bits of `value` at `offset`, all other bits zero
#[inline]
pub const fn make_field(value: u32, width: u32, offset: u32) -> u32 {
    debug_assert!(width + offset <= u32::BITS);
    if offset >= u32::BITS {
        return 0;
    }
    (value & low_mask(width)) << offset
}

/// Length of the run of set bits starting at bit 0 of a `width`-bit field
///
/// Bits above `width` are ignored, so the result is at most `width`.
#[inline]
pub const fn contiguous_run(field: u32, width: u32) -> u32 {
    (field & low_mask(width)).trailing_ones()
}

/// Decode a thermometer-wired selector field to a linear position
///
/// A run of `k` set bits from the LSB maps to `(k + 1) % (width + 1)`,
/// so a completely set field (no contact pulled low) decodes to 0.
#[inline]
pub const fn thermometer_index(field: u32, width: u32) -> u32 {
    (contiguous_run(field, width) + 1) % (width + 1)
}
