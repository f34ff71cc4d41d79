//! SAO syntax-element decoding. The SAO *filter* is out of scope; these
//! functions exist only so the bitstream stays bit-synchronized with
//! the rest of the slice (`ff_hevc_sao_*_decode` in the reference
//! decoder).

use crate::constants::SyntaxElement;
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::Result;

pub fn sao_merge_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::SaoMergeFlag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

/// Band offset (0) or edge offset (1) type, or `None` for "not applied".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaoType {
    NotApplied,
    Band,
    Edge,
}

pub fn sao_type_idx(engine: &mut Engine, ctx: &mut ContextTable) -> Result<SaoType> {
    let state = ctx.get(SyntaxElement::SaoTypeIdx.offset());
    if engine.decode_bin(state)? == 0 {
        return Ok(SaoType::NotApplied);
    }
    if engine.decode_bypass()? == 0 {
        Ok(SaoType::Band)
    } else {
        Ok(SaoType::Edge)
    }
}

pub fn sao_band_position(engine: &mut Engine) -> Result<u32> {
    engine.decode_bypass_bits(5)
}

/// `length = (1 << (min(bit_depth, 10) - 5)) - 1`.
pub fn sao_offset_abs(engine: &mut Engine, bit_depth: u32) -> Result<u32> {
    let length = (1u32 << (bit_depth.min(10) - 5)) - 1;
    let mut i = 0;
    while i < length && engine.decode_bypass()? == 1 {
        i += 1;
    }
    Ok(i)
}

pub fn sao_offset_sign(engine: &mut Engine) -> Result<bool> {
    Ok(engine.decode_bypass()? == 1)
}

pub fn sao_eo_class(engine: &mut Engine) -> Result<u32> {
    engine.decode_bypass_bits(2)
}
