//! Binarization helpers shared by several syntax elements, rather than
//! a single generic binarizer: the reference decoder writes one
//! bespoke decode function per element, and this crate follows the
//! same shape. Only the pieces genuinely reused across elements
//! (bypass fixed-length fields and k-th order Exp-Golomb) live here.

use crate::constants::CABAC_MAX_BIN;
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::{Error, Result};

/// Reads `n` bypass-coded bits, MSB first, as a fixed-length field.
pub fn fixed_length_bypass(engine: &mut Engine, n: u32) -> Result<u32> {
    engine.decode_bypass_bits(n)
}

/// Decodes a k-th order Exp-Golomb (EGk) value via bypass bins
/// (H.265 §9.3.3.3), used by `abs_mvd_minus2` (k=1) and the
/// coefficient-remainder suffix (k derived from the adaptive Rice
/// parameter). Bounded by `CABAC_MAX_BIN` total bins, matching every
/// other unary-prefixed element in this decoder.
pub fn egk_bypass(engine: &mut Engine, mut k: u32, syntax_element: &'static str) -> Result<u32> {
    let mut value: u32 = 0;
    let mut bins = 0u32;
    loop {
        if bins >= CABAC_MAX_BIN {
            return Err(Error::BinaryOverflow {
                syntax_element,
                limit: CABAC_MAX_BIN,
            });
        }
        bins += 1;
        if engine.decode_bypass()? == 1 {
            value += 1 << k;
            k += 1;
        } else {
            break;
        }
    }
    let suffix = if k > 0 {
        engine.decode_bypass_bits(k)?
    } else {
        0
    };
    Ok(value + suffix)
}

/// Decodes a truncated-unary prefix bounded by `c_max` bins, each bin
/// context-coded at `ctx_idx_for(bin_idx)` in `ctx`. Returns the
/// number of `1` bins read before the terminating `0` (or before
/// hitting `c_max`).
pub fn truncated_unary_context<F>(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    c_max: u32,
    mut ctx_idx_for: F,
) -> Result<u32>
where
    F: FnMut(u32) -> usize,
{
    let mut value = 0;
    while value < c_max {
        let state = ctx.get(ctx_idx_for(value));
        if engine.decode_bin(state)? == 0 {
            break;
        }
        value += 1;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egk_zero_value_is_single_terminating_bit() {
        let buf = [0x00, 0x00, 0x00, 0x00];
        let mut engine = Engine::new(&buf).unwrap();
        let v = egk_bypass(&mut engine, 0, "test").unwrap();
        assert_eq!(v, 0);
    }
}
