//! Motion-vector-difference decoding (`ff_hevc_hls_mvd_coding`):
//! `abs_mvd_greater0_flag`, `abs_mvd_greater1_flag` (always read at
//! `ctx + 1`, never `ctx + 0` — see `SPEC_FULL.md` §4.8), the EG1
//! remainder, and the sign bit.

use crate::constants::{SyntaxElement, CABAC_MAX_BIN};
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct Mvd {
    pub x: i32,
    pub y: i32,
}

pub fn abs_mvd_greater0_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::AbsMvdGreater0Flag.offset());
    Ok(engine.decode_bin(state)? == 1)
}

/// Always decoded at `elem_offset[ABS_MVD_GREATER1_FLAG] + 1`, never
/// `+0`: the reference decoder reuses a single context for both MVD
/// components and never reads the first of the pair.
pub fn abs_mvd_greater1_flag(engine: &mut Engine, ctx: &mut ContextTable) -> Result<bool> {
    let state = ctx.get(SyntaxElement::AbsMvdGreater1Flag.offset() + 1);
    Ok(engine.decode_bin(state)? == 1)
}

/// `abs_mvd_minus2` plus its sign, combined the way the reference
/// decoder's `mvd_decode` folds them: EG1 magnitude (offset by 2),
/// then one bypass sign bit.
fn mvd_decode(engine: &mut Engine) -> Result<i32> {
    let mut ret: u32 = 2;
    let mut k = 1u32;
    while k < CABAC_MAX_BIN && engine.decode_bypass()? == 1 {
        ret += 1 << k;
        k += 1;
    }
    if k == CABAC_MAX_BIN {
        return Err(Error::BinaryOverflow {
            syntax_element: "mvd_coding.abs_mvd_minus2",
            limit: CABAC_MAX_BIN,
        });
    }
    while k > 0 {
        k -= 1;
        ret += engine.decode_bypass()? << k;
    }
    if engine.decode_bypass()? == 1 {
        Ok(-(ret as i32))
    } else {
        Ok(ret as i32)
    }
}

fn mvd_sign_only(engine: &mut Engine, magnitude: i32) -> Result<i32> {
    if engine.decode_bypass()? == 1 {
        Ok(-magnitude)
    } else {
        Ok(magnitude)
    }
}

/// Decodes one full `mvd_coding()` pair (H.265 §7.3.8.9): each
/// component independently reads `greater0`, conditionally
/// `greater1`, and (only when `greater0` holds) a magnitude — `1` when
/// `greater1` is false, `mvd_decode`'s EG1-plus-sign value otherwise.
pub fn mvd_coding(engine: &mut Engine, ctx: &mut ContextTable) -> Result<Mvd> {
    let greater0_x = abs_mvd_greater0_flag(engine, ctx)?;
    let greater0_y = abs_mvd_greater0_flag(engine, ctx)?;

    let greater1_x = if greater0_x {
        abs_mvd_greater1_flag(engine, ctx)?
    } else {
        false
    };
    let greater1_y = if greater0_y {
        abs_mvd_greater1_flag(engine, ctx)?
    } else {
        false
    };

    let x = if greater0_x {
        if greater1_x {
            mvd_decode(engine)?
        } else {
            mvd_sign_only(engine, 1)?
        }
    } else {
        0
    };
    let y = if greater0_y {
        if greater1_y {
            mvd_decode(engine)?
        } else {
            mvd_sign_only(engine, 1)?
        }
    } else {
        0
    };

    Ok(Mvd { x, y })
}
