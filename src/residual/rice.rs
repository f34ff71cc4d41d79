//! Significance map, greater-than-one/two flags, sign hiding, and the
//! adaptive Golomb-Rice coefficient-remainder coding, grounded in
//! `get_sig_coeff_flag_idxs`, `coeff_abs_level_greater{1,2}_flag_decode`,
//! `get_greaterx_bits`, `coeff_abs_level_remaining_decode`'s portable
//! fallback, and `update_rice`'s portable fallback — the ARM-asm and
//! `get_cabac_bypeek22`-based batch-read variants of these are
//! nonfunctional optimizations, out of scope per the hardware-offload
//! non-goal; this module implements their plain per-position semantics.

use crate::constants::{Channel, ScanType, SyntaxElement, CABAC_MAX_BIN};
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::{Error, Result};

/// `ctx_idx_maps_ts2[scan_idx]`: the flat context-index map used for
/// 4x4 (`log2_trafo_size == 2`) blocks, one 16-entry map per scan
/// order, indexed `[Diag, Horiz, Vert]`.
#[rustfmt::skip]
const CTX_IDX_MAPS_TS2: [[u8; 16]; 3] = [
    [0, 2, 1, 6, 3, 4, 7, 6, 4, 5, 7, 8, 5, 8, 8, 8], // Diag
    [0, 1, 4, 5, 2, 3, 4, 5, 6, 6, 8, 8, 7, 7, 8, 8], // Horiz
    [0, 2, 6, 7, 1, 3, 6, 7, 4, 4, 8, 8, 5, 5, 8, 8], // Vert
];

/// `ctx_idx_maps[scan_idx][prev_sig]` for 8x8-and-larger blocks.
#[rustfmt::skip]
const CTX_IDX_MAPS: [[[u8; 16]; 4]; 3] = [
    [
        [1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        [2, 1, 2, 0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 0, 0, 0],
        [2, 2, 1, 2, 1, 0, 2, 1, 0, 0, 1, 0, 0, 0, 0, 0],
        [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    ], // Diag
    [
        [1, 1, 1, 0, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
        [2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        [2, 1, 0, 0, 2, 1, 0, 0, 2, 1, 0, 0, 2, 1, 0, 0],
        [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    ], // Horiz
    [
        [1, 1, 1, 0, 1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
        [2, 1, 0, 0, 2, 1, 0, 0, 2, 1, 0, 0, 2, 1, 0, 0],
        [2, 2, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0],
        [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
    ], // Vert
];

fn scan_index(scan: ScanType) -> usize {
    match scan {
        ScanType::Diag => 0,
        ScanType::Horiz => 1,
        ScanType::Vert => 2,
    }
}

/// Resolves `scf_offset` and the context-index-map slice for one
/// subblock's significance map, per `ff_hevc_hls_residual_coding`'s
/// `ctx_idx_map_p`/`scf_offset` derivation (lines covering both the
/// transform-skip-context-enabled flat path and the general path).
pub fn significance_context(
    log2_trafo_size: u32,
    scan: ScanType,
    channel: Channel,
    prev_sig: usize,
    x_cg: u32,
    y_cg: u32,
    transform_skip_context_enabled: bool,
    trans_skip_or_bypass: bool,
) -> (&'static [u8; 16], usize) {
    let is_chroma = !channel.is_luma();

    if transform_skip_context_enabled && trans_skip_or_bypass {
        let map = &CTX_IDX_MAPS[scan_index(scan)][3];
        let offset = if is_chroma { 14 + 27 } else { 40 };
        return (map, offset);
    }

    let mut offset = if is_chroma { 27 } else { 0 };
    if log2_trafo_size == 2 {
        return (&CTX_IDX_MAPS_TS2[scan_index(scan)], offset);
    }

    let map = &CTX_IDX_MAPS[scan_index(scan)][prev_sig];
    if !is_chroma {
        if x_cg > 0 || y_cg > 0 {
            offset += 3;
        }
        offset += if log2_trafo_size == 3 {
            if scan == ScanType::Diag {
                9
            } else {
                15
            }
        } else {
            21
        };
    } else {
        offset += if log2_trafo_size == 3 { 9 } else { 12 };
    }
    (map, offset)
}

/// The DC-position (subblock position 0) significance-flag offset,
/// used when `get_sig_coeff_flag_idxs` didn't already decide position 0
/// is non-zero (`implicit_non_zero_coeff`).
pub fn dc_significance_offset(
    channel: Channel,
    subblock_index: u32,
    transform_skip_context_enabled: bool,
    trans_skip_or_bypass: bool,
    prior_offset: usize,
) -> usize {
    let is_chroma = !channel.is_luma();
    if transform_skip_context_enabled && trans_skip_or_bypass {
        if is_chroma {
            16 + 27
        } else {
            42
        }
    } else if subblock_index == 0 {
        if is_chroma {
            27
        } else {
            0
        }
    } else {
        2 + prior_offset
    }
}

/// Decodes `significant_coeff_flag` at positions `n_end .. 1` (source
/// order is descending; `n must be > 0` on entry for the reference
/// function, mirrored here by requiring `n_end >= 1`), appending each
/// position whose flag decoded to 1 into `out`. Returns the count
/// appended.
pub fn get_sig_coeff_flag_idxs(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    base: usize,
    ctx_idx_map: &[u8; 16],
    n_end: u32,
    out: &mut Vec<u8>,
) -> Result<usize> {
    let mut n = n_end;
    let mut count = 0;
    loop {
        let state = ctx.get(base + ctx_idx_map[n as usize] as usize);
        if engine.decode_bin(state)? == 1 {
            out.push(n as u8);
            count += 1;
        }
        if n == 1 {
            break;
        }
        n -= 1;
    }
    Ok(count)
}

/// Result of one subblock's greater-than-one/two pass.
pub struct GreaterFlags {
    /// Base level per position (1, 2, or 3) for the first
    /// `n_end.min(8)` positions; positions beyond that are always 1
    /// (their gt1 flag isn't coded at all, per the 8-flag cap).
    pub levels: [u8; 8],
    /// The first position (if any) whose gt1 flag decoded to 1 — the
    /// one position for which gt2 was also decoded.
    pub first_gt1: Option<usize>,
    pub prev_subset_coded: bool,
}

impl GreaterFlags {
    /// Whether position `m` (0-indexed within the subblock's visited
    /// positions) needs a `coeff_abs_level_remaining` read: every
    /// position with gt1 == 1 needs one, *except* the single position
    /// where gt2 was decoded and came back 0 (its level of exactly 2 is
    /// already fully known). Positions at or beyond index 8 always need
    /// one — their gt1 flag was never coded at all.
    pub fn needs_remainder(&self, m: usize) -> bool {
        if m >= 8 {
            return true;
        }
        match self.first_gt1 {
            Some(i) if i == m => self.levels[m] == 3,
            _ => self.levels[m] >= 2,
        }
    }
}

/// One subblock's first-8-significant-coefficients greater-than-one
/// pass, decoded position by position (the reference decoder's
/// `get_greaterx_bits` batches this 8-at-a-time via a `clz` trick; the
/// per-position semantics below are equivalent and canonical). Decodes
/// gt2 only once, for the first position whose gt1 flag is 1.
pub fn greater1_greater2(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    n_end: usize,
    ctx_set: u32,
    channel: Channel,
) -> Result<GreaterFlags> {
    let n = n_end.min(8);
    let is_chroma = !channel.is_luma();
    let idx_delta = (if is_chroma { 4 } else { 0 }) + ctx_set as usize;
    let base_gt1 = SyntaxElement::CoeffAbsLevelGreater1Flag.offset() + (idx_delta << 2);
    let base_gt2 = SyntaxElement::CoeffAbsLevelGreater2Flag.offset() + idx_delta;

    let mut levels = [1u8; 8];
    let mut first_gt1: Option<usize> = None;
    for i in 0..n {
        let idx = if first_gt1.is_some() {
            0
        } else if i < 3 {
            i + 1
        } else {
            3
        };
        let state = ctx.get(base_gt1 + idx);
        let b = engine.decode_bin(state)?;
        if b == 1 {
            levels[i] = 2;
            if first_gt1.is_none() {
                first_gt1 = Some(i);
            }
        }
    }

    let prev_subset_coded = first_gt1.is_some();
    if let Some(i) = first_gt1 {
        let state = ctx.get(base_gt2);
        if engine.decode_bin(state)? == 1 {
            levels[i] = 3;
        }
    }

    Ok(GreaterFlags {
        levels,
        first_gt1,
        prev_subset_coded,
    })
}

/// `coeff_sign_flag`: `count` bypass sign bits, MSB first, packed into
/// the low `count` bits of the return value (bit `count-1` is the first
/// position's sign).
pub fn coeff_sign_flags(engine: &mut Engine, count: u32) -> Result<u32> {
    let mut flags = 0u32;
    for _ in 0..count {
        flags = (flags << 1) | engine.decode_bypass()?;
    }
    Ok(flags)
}

/// `coeff_abs_level_remaining_decode`'s portable fallback: a
/// bypass-coded unary prefix (capped at `CABAC_MAX_BIN`, fatal per this
/// crate's error taxonomy rather than the reference decoder's
/// log-and-return-0) followed by a Rice or Exp-Golomb suffix depending
/// on whether the prefix is below 3.
pub fn coeff_abs_level_remaining(engine: &mut Engine, rice_param: u32) -> Result<u32> {
    let mut prefix = 0u32;
    while prefix < CABAC_MAX_BIN && engine.decode_bypass()? == 1 {
        prefix += 1;
    }
    if prefix == CABAC_MAX_BIN {
        return Err(Error::BinaryOverflow {
            syntax_element: "coeff_abs_level_remaining",
            limit: CABAC_MAX_BIN,
        });
    }
    if prefix < 3 {
        let suffix = engine.decode_bypass_bits(rice_param)?;
        Ok((prefix << rice_param) + suffix)
    } else {
        let prefix_minus3 = prefix - 3;
        let suffix = engine.decode_bypass_bits(prefix_minus3 + rice_param)?;
        Ok((((1 << prefix_minus3) + 3 - 1) << rice_param) + suffix)
    }
}

/// `update_rice`'s portable fallback: bumps the persistent `stat_coeff`
/// bias up when the remainder's top bits suggest `k` should grow,
/// down (floor 0) when they suggest it should shrink. Clamped to the
/// byte range the reference `uint8_t` storage implies.
pub fn update_rice(stat_coeff: &mut i32, last_coeff_abs_level_remaining: u32, rice_param: u32) {
    let x = last_coeff_abs_level_remaining >> rice_param;
    if x >= 3 {
        *stat_coeff = (*stat_coeff + 1).min(255);
    } else if x == 0 && *stat_coeff > 0 {
        *stat_coeff -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_zero_prefix_on_all_zero_stream() {
        // Every bypass bit decodes to 0 when the stream (and hence
        // ivl_offset) never crosses the range, so the unary prefix
        // terminates immediately regardless of rice_param.
        let buf = [0x00, 0x00, 0x00, 0x00, 0x00];
        let mut engine = Engine::new(&buf).unwrap();
        let v = coeff_abs_level_remaining(&mut engine, 3).unwrap();
        assert_eq!(v, 0);
    }

    #[test]
    fn update_rice_increments_on_large_remainder() {
        let mut stat = 0;
        update_rice(&mut stat, 32, 0);
        assert_eq!(stat, 1);
    }

    #[test]
    fn update_rice_decrements_on_zero_remainder() {
        let mut stat = 2;
        update_rice(&mut stat, 0, 0);
        assert_eq!(stat, 1);
    }
}
