//! QP derivation and dequantization, grounded in the QP-derivation and
//! scaling-matrix-selection preamble of `ff_hevc_hls_residual_coding`
//! and in `trans_scale_sat`'s portable (non-ARM-asm) fallback, which is
//! the canonical semantic reference — the ARM branch is a nonfunctional
//! optimization out of scope per this crate's hardware-offload non-goal.

use log::warn;

use crate::constants::Channel;
use crate::error::{Error, Result};
use crate::params::{Pps, ScalingLists, Sps};
use crate::util::clip;

/// `level_scale[qp % 6]`.
const LEVEL_SCALE: [u32; 6] = [40, 45, 51, 57, 64, 72];

/// Chroma QP mapping for `qp_i` in `[30, 43]`, `chroma_format_idc == 1`
/// only; outside that range the caller clamps or passes `qp_i` through.
const QP_C: [i32; 14] = [29, 30, 31, 32, 33, 33, 34, 34, 35, 35, 36, 36, 37, 37];

/// `qp % 6` for `qp` in `[0, 51 + 4*6]`.
#[rustfmt::skip]
const REM6: [u8; 76] = [
    0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2,
    3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5,
    0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3,
    4, 5, 0, 1, 2, 3, 4, 5, 0, 1,
];

/// `qp / 6` for `qp` in `[0, 51 + 4*6]`.
#[rustfmt::skip]
const DIV6: [u8; 76] = [
    0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 3, 3, 3,
    3, 3, 3, 4, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6,
    7, 7, 7, 7, 7, 7, 8, 8, 8, 8, 8, 8, 9, 9, 9, 9, 9, 9, 10, 10, 10, 10,
    10, 10, 11, 11, 11, 11, 11, 11, 12, 12,
];

/// The luma QP for a transform block at the containing CU's `qp_y`.
pub fn luma_qp(qp_y: i32, sps: &Sps) -> i32 {
    qp_y + sps.qp_bd_offset
}

/// The chroma QP for channel `Cb`/`Cr`, folding in PPS/slice/CU offsets
/// and (for 4:2:0) the piecewise `qp_c` remap.
pub fn chroma_qp(qp_y: i32, channel: Channel, pps: &Pps, sh_offset: i32, cu_offset: i32, sps: &Sps) -> i32 {
    let pps_offset = match channel {
        Channel::Cb => pps.cb_qp_offset,
        Channel::Cr => pps.cr_qp_offset,
        Channel::Luma => 0,
    };
    let qp_i = clip(qp_y + pps_offset + sh_offset + cu_offset, -sps.qp_bd_offset, 57);
    let qp = if sps.chroma_format_idc == 1 {
        if qp_i < 30 {
            qp_i
        } else if qp_i > 43 {
            qp_i - 6
        } else {
            QP_C[(qp_i - 30) as usize]
        }
    } else if qp_i > 51 {
        51
    } else {
        qp_i
    };
    qp + sps.qp_bd_offset
}

/// `(scale, shift)` for a transform block of size `1 << log2_trafo_size`
/// at dequant QP `qp`, given the sequence bit depth. Mirrors the
/// `#if 0`-guarded saturating-subtraction variant the reference decoder
/// actually compiles (the `scale = level_scale[...] << div6[...]`
/// one-liner above it is dead code left for documentation).
pub fn scale_and_shift(qp: i32, bit_depth: u32, log2_trafo_size: u32) -> (u32, u32) {
    let qp = qp.max(0) as usize;
    let mut shift = bit_depth as i32 + log2_trafo_size as i32 - 6;
    let mut scale = LEVEL_SCALE[REM6[qp] as usize];
    let div6 = DIV6[qp] as i32;
    if div6 >= shift {
        scale <<= (div6 - shift) as u32;
        shift = 0;
    } else {
        shift -= div6;
    }
    (scale, shift as u32)
}

/// The resolved per-block scaling matrix: either a caller-supplied
/// scaling list entry, the flat "16" matrix, or (bypass/transquant) the
/// flat "1" matrix with `scale = 2, shift = 0` baked in by the caller.
pub struct ScaleMatrix<'a> {
    matrix: &'a [u8],
    dc_scale: u8,
}

impl<'a> ScaleMatrix<'a> {
    /// Resolves which matrix applies for this block, following the
    /// reference decoder's `matrix_id = 3 * (pred_mode != INTRA) + c_idx`
    /// selection and its DC-override for 16x16/32x32 blocks.
    ///
    /// Returns `Error::IgnorableWarning` instead of indexing into an
    /// empty matrix if the caller's `ScalingLists` doesn't actually
    /// carry the entry this block needs (scaling list absent when
    /// `scaling_list_enabled_flag` said it should be present); the
    /// caller may retry with `ScalingLists::flat()`.
    pub fn select(
        lists: &'a ScalingLists,
        log2_trafo_size: u32,
        channel: Channel,
        is_intra: bool,
    ) -> Result<Self> {
        let c_idx = match channel {
            Channel::Luma => 0,
            Channel::Cb => 1,
            Channel::Cr => 2,
        };
        let matrix_id = 3 * (!is_intra as usize) + c_idx;
        let size_class = (log2_trafo_size - 2) as usize;
        let matrix = lists.matrices[size_class][matrix_id].as_slice();
        if matrix.is_empty() {
            warn!("scaling list absent for size_class={size_class} matrix_id={matrix_id}, caller should substitute flat");
            return Err(Error::IgnorableWarning {
                detail: format!("missing scaling list entry (size_class={size_class}, matrix_id={matrix_id})"),
            });
        }
        let dc_scale = if log2_trafo_size >= 4 {
            lists.dc_coeff[size_class - 2][matrix_id]
        } else {
            matrix[0]
        };
        Ok(ScaleMatrix { matrix, dc_scale })
    }

    /// A flat `scale_m = 1` matrix, used for cu_transquant_bypass blocks
    /// (paired with `scale = 2, shift = 0` at the call site).
    pub fn bypass() -> Self {
        ScaleMatrix {
            matrix: &BYPASS_MATRIX,
            dc_scale: 1,
        }
    }

    /// `scale_m` for flat position `t_offset = (yc << L) + xc`: the DC
    /// override at `t_offset == 0`, else a subsampled lookup for 8x8+
    /// matrices (`log2_trafo_size > 3`) or a direct lookup otherwise.
    pub fn scale_m(&self, t_offset: usize, xc: usize, yc: usize, log2_trafo_size: u32) -> u8 {
        if t_offset == 0 {
            return self.dc_scale;
        }
        let n_shr = log2_trafo_size as i32 - 3;
        if n_shr >= 0 {
            let n_shr = n_shr as u32;
            let pos = ((yc >> n_shr) << 3) + (xc >> n_shr);
            self.matrix[pos]
        } else {
            self.matrix[t_offset]
        }
    }
}

const BYPASS_MATRIX: [u8; 64] = [1; 64];

/// Canonical (portable, non-ARM-asm) dequantization: the ARM branch
/// implements identical saturating arithmetic in assembly and is a pure
/// optimization, not a semantic variant.
pub fn trans_scale_sat(level: i32, scale: u32, scale_m: u8, shift: u32) -> i16 {
    let product = level.wrapping_mul((scale * scale_m as u32) as i32);
    let trans_coeff_level = ((product >> shift) + 1) >> 1;
    trans_coeff_level.clamp(-32768, 32767) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_coefficient_dequant_matches_worked_example() {
        // qp=12, bit_depth=8, L=2: rem6=0 -> scale=40; div6=2 < shift_base(4)
        // -> shift=2. A single level-1 DC coefficient with dc_scale=16
        // dequantizes to sat16(((1*40*16)>>2 + 1)>>1) = 80.
        let (scale, shift) = scale_and_shift(12, 8, 2);
        assert_eq!(scale, 40);
        assert_eq!(shift, 2);
        let v = trans_scale_sat(1, scale, 16, shift);
        assert_eq!(v, 80);
    }

    #[test]
    fn bypass_scale_divides_by_two() {
        let v = trans_scale_sat(7, 2, 1, 0);
        assert_eq!(v, 7);
    }

    #[test]
    fn saturates_to_i16_range() {
        let v = trans_scale_sat(i32::MAX / 4, 72, 255, 0);
        assert_eq!(v, 32767);
        let v = trans_scale_sat(-(i32::MAX / 4), 72, 255, 0);
        assert_eq!(v, -32768);
    }
}
