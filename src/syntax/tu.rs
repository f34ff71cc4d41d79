//! Transform-unit syntax surrounding the residual coder itself:
//! split/cbf flags, transform-skip and RDPCM flags, and cross-component
//! residual prediction's scale/sign elements. Grounded in
//! `hevc_cabac.c`'s `ff_hevc_split_transform_flag_decode`,
//! `ff_hevc_cbf_luma_decode`, `ff_hevc_cbf_cb_cr_decode`,
//! `hevc_transform_skip_flag_decode`, `explicit_rdpcm_*_decode`,
//! `ff_hevc_log2_res_scale_abs`, `ff_hevc_res_scale_sign_flag`.

use crate::constants::SyntaxElement;
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::Result;

pub fn split_transform_flag(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    log2_trafo_size: u32,
) -> Result<bool> {
    let state = ctx.get(SyntaxElement::SplitTransformFlag.offset() + (5 - log2_trafo_size) as usize);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn cbf_luma(engine: &mut Engine, ctx: &mut ContextTable, trafo_depth: u32) -> Result<bool> {
    let inc = if trafo_depth == 0 { 1 } else { 0 };
    let state = ctx.get(SyntaxElement::CbfLuma.offset() + inc);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn cbf_cb_cr(engine: &mut Engine, ctx: &mut ContextTable, trafo_depth: u32) -> Result<bool> {
    let state = ctx.get(SyntaxElement::CbfCbCr.offset() + trafo_depth as usize);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn transform_skip_flag(engine: &mut Engine, ctx: &mut ContextTable, chroma: bool) -> Result<bool> {
    let inc = if chroma { 1 } else { 0 };
    let state = ctx.get(SyntaxElement::TransformSkipFlag.offset() + inc);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn explicit_rdpcm_flag(engine: &mut Engine, ctx: &mut ContextTable, chroma: bool) -> Result<bool> {
    let inc = if chroma { 1 } else { 0 };
    let state = ctx.get(SyntaxElement::ExplicitRdpcmFlag.offset() + inc);
    Ok(engine.decode_bin(state)? == 1)
}

pub fn explicit_rdpcm_dir_flag(engine: &mut Engine, ctx: &mut ContextTable, chroma: bool) -> Result<bool> {
    let inc = if chroma { 1 } else { 0 };
    let state = ctx.get(SyntaxElement::ExplicitRdpcmDirFlag.offset() + inc);
    Ok(engine.decode_bin(state)? == 1)
}

/// `idx` selects which of the (up to 2) chroma components' residual
/// prediction weight is being decoded.
pub fn log2_res_scale_abs(engine: &mut Engine, ctx: &mut ContextTable, idx: u32) -> Result<u32> {
    let base = SyntaxElement::Log2ResScaleAbs.offset() + 4 * idx as usize;
    let mut i = 0;
    while i < 4 && engine.decode_bin(ctx.get(base + i))? == 1 {
        i += 1;
    }
    Ok(i as u32)
}

pub fn res_scale_sign_flag(engine: &mut Engine, ctx: &mut ContextTable, idx: u32) -> Result<bool> {
    let state = ctx.get(SyntaxElement::ResScaleSignFlag.offset() + idx as usize);
    Ok(engine.decode_bin(state)? == 1)
}
