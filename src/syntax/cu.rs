//! Coding-unit-level syntax: split flags, prediction mode, partition
//! mode, intra-mode candidates, QP delta, and the CU-level termination
//! bins. Grounded in `hevc_cabac.c`'s `ff_hevc_split_coding_unit_flag_decode`,
//! `ff_hevc_part_mode_decode`, `ff_hevc_cu_qp_delta_abs`, and neighbors.

use crate::constants::{SyntaxElement, CABAC_MAX_BIN};
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::params::NeighborState;

pub fn end_of_slice_segment_flag(engine: &mut Engine) -> Result<bool> {
    Ok(engine.decode_terminate()? == 1)
}

pub fn pcm_flag(engine: &mut Engine) -> Result<bool> {
    Ok(engine.decode_terminate()? == 1)
}

pub fn cu_transquant_bypass_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::CuTransquantBypassFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

/// `ctb_left_flag`/`ctb_up_flag` tell the caller whether the CTB to
/// the left/above exists at all (slice/tile boundary); `x0b`/`y0b` are
/// `x0`/`y0` modulo the CTB size.
pub fn skip_flag(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    neighbors: &NeighborState,
    x_cb: usize,
    y_cb: usize,
    ctb_left_flag: bool,
    ctb_up_flag: bool,
    x0b: u32,
    y0b: u32,
) -> Result<bool> {
    let mut inc = 0u32;
    if (ctb_left_flag || x0b != 0) && x_cb > 0 {
        inc += neighbors.skip_flag_at(x_cb - 1, y_cb) as u32;
    }
    if (ctb_up_flag || y0b != 0) && y_cb > 0 {
        inc += neighbors.skip_flag_at(x_cb, y_cb - 1) as u32;
    }
    let state = ctx.get(SyntaxElement::SkipFlag.offset() + inc as usize);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn split_coding_unit_flag(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    neighbors: &NeighborState,
    ct_depth: u8,
    x_cb: usize,
    y_cb: usize,
    ctb_left_flag: bool,
    ctb_up_flag: bool,
    x0b: u32,
    y0b: u32,
) -> Result<bool> {
    let mut inc = 0u32;
    if (ctb_left_flag || x0b != 0) && x_cb > 0 {
        inc += (neighbors.ct_depth_at(x_cb - 1, y_cb) > ct_depth) as u32;
    }
    if (ctb_up_flag || y0b != 0) && y_cb > 0 {
        inc += (neighbors.ct_depth_at(x_cb, y_cb - 1) > ct_depth) as u32;
    }
    let state = ctx.get(SyntaxElement::SplitCodingUnitFlag.offset() + inc as usize);
    Ok(engine.decode_bin(state)? == 1)
}

/// `pred_mode_flag`: `false` = MODE_INTER, `true` = MODE_INTRA.
pub fn pred_mode(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::PredMode.offset());
    Ok(engine.decode_bin(state)? == 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartMode {
    Part2Nx2N,
    Part2NxN,
    PartNx2N,
    PartNxN,
    Part2NxnU,
    Part2NxnD,
    PartnLx2N,
    PartnRx2N,
}

/// `ff_hevc_part_mode_decode`'s binarization tree. `is_intra` is the
/// already-decoded `pred_mode`; `log2_cb_size` and `log2_min_cb_size`
/// select which branch of the tree applies.
pub fn part_mode(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    log2_cb_size: u32,
    log2_min_cb_size: u32,
    is_intra: bool,
    amp_enabled: bool,
) -> Result<PartMode> {
    let base = SyntaxElement::PartMode.offset();
    if engine.decode_bin(ctx.get(base))? == 1 {
        return Ok(PartMode::Part2Nx2N);
    }
    if log2_cb_size == log2_min_cb_size {
        if is_intra {
            return Ok(PartMode::PartNxN);
        }
        if engine.decode_bin(ctx.get(base + 1))? == 1 {
            return Ok(PartMode::Part2NxN);
        }
        if log2_cb_size == 3 {
            return Ok(PartMode::PartNx2N);
        }
        if engine.decode_bin(ctx.get(base + 2))? == 1 {
            return Ok(PartMode::PartNx2N);
        }
        return Ok(PartMode::PartNxN);
    }

    if !amp_enabled {
        if engine.decode_bin(ctx.get(base + 1))? == 1 {
            return Ok(PartMode::Part2NxN);
        }
        return Ok(PartMode::PartNx2N);
    }

    if engine.decode_bin(ctx.get(base + 1))? == 1 {
        if engine.decode_bin(ctx.get(base + 3))? == 1 {
            return Ok(PartMode::Part2NxN);
        }
        if engine.decode_bypass()? == 1 {
            return Ok(PartMode::Part2NxnD);
        }
        return Ok(PartMode::Part2NxnU);
    }
    if engine.decode_bin(ctx.get(base + 3))? == 1 {
        return Ok(PartMode::PartNx2N);
    }
    if engine.decode_bypass()? == 1 {
        return Ok(PartMode::PartnRx2N);
    }
    Ok(PartMode::PartnLx2N)
}

pub fn prev_intra_luma_pred_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::PrevIntraLumaPredMode.offset());
    Ok(engine.decode_bin(state)? == 1)
}

pub fn mpm_idx(engine: &mut Engine) -> Result<u32> {
    let mut i = 0;
    while i < 2 && engine.decode_bypass()? == 1 {
        i += 1;
    }
    Ok(i)
}

pub fn rem_intra_luma_pred_mode(engine: &mut Engine) -> Result<u32> {
    engine.decode_bypass_bits(5)
}

/// `4` means "derive from luma" (`DM` mode); `0..=3` selects the
/// explicit candidate list entry.
pub fn intra_chroma_pred_mode(engine: &mut Engine, ctx: &mut ContextTable) -> Result<u32> {
    let state = ctx.get(SyntaxElement::IntraChromaPredMode.offset());
    if engine.decode_bin(state)? == 0 {
        return Ok(4);
    }
    engine.decode_bypass_bits(2)
}

pub fn cu_qp_delta_abs(engine: &mut Engine, ctx: &mut ContextTable) -> Result<u32> {
    let base = SyntaxElement::CuQpDelta.offset();
    let mut prefix = 0u32;
    let mut inc = 0usize;
    while prefix < 5 && engine.decode_bin(ctx.get(base + inc))? == 1 {
        prefix += 1;
        inc = 1;
    }
    if prefix < 5 {
        return Ok(prefix);
    }
    let mut k = 0u32;
    let mut suffix = 0u32;
    while k < CABAC_MAX_BIN && engine.decode_bypass()? == 1 {
        suffix += 1 << k;
        k += 1;
    }
    if k == CABAC_MAX_BIN {
        return Err(Error::BinaryOverflow {
            syntax_element: "cu_qp_delta_abs",
            limit: CABAC_MAX_BIN,
        });
    }
    while k > 0 {
        k -= 1;
        suffix += engine.decode_bypass()? << k;
    }
    Ok(prefix + suffix)
}

pub fn cu_qp_delta_sign_flag(engine: &mut Engine) -> Result<bool> {
    Ok(engine.decode_bypass()? == 1)
}

pub fn cu_chroma_qp_offset_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::CuChromaQpOffsetFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

pub fn cu_chroma_qp_offset_idx(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    chroma_qp_offset_list_len_minus1: u32,
) -> Result<u32> {
    let c_max = chroma_qp_offset_list_len_minus1;
    let base = SyntaxElement::CuChromaQpOffsetIdx.offset();
    let mut i = 0;
    while i < c_max && engine.decode_bin(ctx.get(base))? == 1 {
        i += 1;
    }
    Ok(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InitType;

    #[test]
    fn cu_qp_delta_abs_short_prefix_decodes() {
        let buf = [0x00, 0x00, 0x00, 0x00];
        let mut engine = Engine::new(&buf).unwrap();
        let mut ctx = ContextTable::new(InitType::I, 26);
        let v = cu_qp_delta_abs(&mut engine, &mut ctx).unwrap();
        assert!(v <= 5 + 31);
    }

    #[test]
    fn mpm_idx_is_bounded_by_two() {
        let buf = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut engine = Engine::new(&buf).unwrap();
        let v = mpm_idx(&mut engine).unwrap();
        assert!(v <= 2);
    }
}
