//! Prediction-unit syntax: merge candidates, inter prediction
//! direction, reference indices, motion-vector predictor flag.
//! Grounded in `hevc_cabac.c`'s `ff_hevc_merge_*`, `ff_hevc_inter_pred_idc_decode`,
//! `ff_hevc_ref_idx_lx_decode`, `ff_hevc_mvp_lx_flag_decode`.

use crate::constants::SyntaxElement;
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::Result;

pub fn merge_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::MergeFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

pub fn merge_idx(engine: &mut Engine, ctx: &mut ContextTable, max_num_merge_cand: u32) -> Result<u32> {
    let state = ctx.get(SyntaxElement::MergeIdx.offset());
    let mut i = engine.decode_bin(state)?;
    if i != 0 {
        while i < max_num_merge_cand - 1 && engine.decode_bypass()? == 1 {
            i += 1;
        }
    }
    Ok(i)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterPredIdc {
    L0,
    L1,
    Bi,
}

/// `n_pb_w + n_pb_h == 12` is the 4x8/8x4 partition special case that
/// skips the depth-indexed bi-pred context entirely.
pub fn inter_pred_idc(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    n_pb_w: u32,
    n_pb_h: u32,
    ct_depth: usize,
) -> Result<InterPredIdc> {
    let base = SyntaxElement::InterPredIdc.offset();
    if n_pb_w + n_pb_h == 12 {
        return Ok(decode_l0_l1(engine, ctx.get(base + 4))?);
    }
    if engine.decode_bin(ctx.get(base + ct_depth))? == 1 {
        return Ok(InterPredIdc::Bi);
    }
    decode_l0_l1(engine, ctx.get(base + 4))
}

fn decode_l0_l1(engine: &mut Engine, state: &mut u8) -> Result<InterPredIdc> {
    if engine.decode_bin(state)? == 1 {
        Ok(InterPredIdc::L1)
    } else {
        Ok(InterPredIdc::L0)
    }
}

pub fn ref_idx_lx(engine: &mut Engine, ctx: &mut ContextTable, base_offset: usize, num_ref_idx_lx: u32) -> Result<u32> {
    let max = num_ref_idx_lx - 1;
    let max_ctx = max.min(2);
    let mut i = 0;
    while i < max_ctx && engine.decode_bin(ctx.get(base_offset + i as usize))? == 1 {
        i += 1;
    }
    if i == 2 {
        while i < max && engine.decode_bypass()? == 1 {
            i += 1;
        }
    }
    Ok(i)
}

pub fn mvp_lx_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::MvpLxFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

pub fn no_residual_data_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::NoResidualDataFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}
