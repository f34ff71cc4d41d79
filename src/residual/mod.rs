//! The residual / transform-coefficient decoder
//! (`ff_hevc_hls_residual_coding`): preamble QP/scale derivation,
//! last-position decode, subblock scan, significance map, gt1/gt2,
//! sign hiding, adaptive Golomb-Rice remainder coding, and
//! dequantization. NAL/SPS/PPS parsing, the inverse transform itself,
//! prediction, and frame-buffer writes stay with the caller; this
//! module's output is a filled coefficient buffer plus a
//! `TransformDispatch` descriptor telling the caller which inverse
//! transform to run.

pub mod dequant;
pub mod rice;

use crate::constants::{Channel, ScanType, SyntaxElement};
use crate::context::ContextTable;
use crate::engine::Engine;
use crate::error::Result;
use crate::params::{Pps, ScalingLists, SliceHeader, Sps};
use crate::scan::{num_subblocks_before, scan_tables, DIAG_SCAN4X4_INV, HORIZ_SCAN8X8_INV};
use crate::syntax::tu;
use dequant::ScaleMatrix;

/// The subset of coding-unit state the residual decoder consults. All
/// of it is decoded elsewhere (CU/PU/TU syntax) and handed in by the
/// caller for this one transform block.
#[derive(Clone, Copy, Debug)]
pub struct CuState {
    /// `true` for `MODE_INTRA`, `false` for `MODE_INTER`.
    pub pred_mode_intra: bool,
    pub cu_transquant_bypass_flag: bool,
    pub intra_pred_mode_luma: u32,
    pub intra_pred_mode_chroma: u32,
    pub cu_qp_offset_cb: i32,
    pub cu_qp_offset_cr: i32,
    pub qp_y: i32,
}

/// A caller-owned, pre-zeroed coefficient buffer for one transform
/// block, tagged with its size class and channel.
pub struct CoeffBlock<'a> {
    pub coeffs: &'a mut [i16],
    pub log2_size: u32,
    pub channel: Channel,
}

/// Which inverse-transform path the caller should run over the filled
/// coefficient buffer. This crate never calls an inverse transform
/// itself (out of scope); it only resolves which one applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformMode {
    /// Residual-DPCM applied directly to the (already-dequantized)
    /// coefficients, no inverse transform. `vertical` selects the
    /// prediction direction.
    Rdpcm { vertical: bool },
    TransformSkip { rotated: bool },
    TransformSkipRdpcm { rotated: bool, vertical: bool },
    /// Transquant-bypass with no RDPCM: the coefficient buffer already
    /// holds the final spatial-domain residual, untransformed.
    Bypass,
    /// The 4x4 luma intra DST, used only for that one block shape.
    Idct4x4Luma,
    /// Every AC coefficient was zero; only the DC path is needed.
    IdctDc,
    /// General inverse transform, bounded to the first `col_limit`
    /// columns/rows since nothing beyond the last significant
    /// position can be non-zero.
    Idct { col_limit: u32 },
}

#[derive(Clone, Copy, Debug)]
pub struct TransformDispatch {
    pub log2_size: u32,
    pub mode: TransformMode,
}

fn channel_qp(
    channel: Channel,
    cu: &CuState,
    sps: &Sps,
    pps: &Pps,
    sh: &SliceHeader,
) -> i32 {
    match channel {
        Channel::Luma => dequant::luma_qp(cu.qp_y, sps),
        Channel::Cb => dequant::chroma_qp(cu.qp_y, Channel::Cb, pps, sh.slice_cb_qp_offset, cu.cu_qp_offset_cb, sps),
        Channel::Cr => dequant::chroma_qp(cu.qp_y, Channel::Cr, pps, sh.slice_cr_qp_offset, cu.cu_qp_offset_cr, sps),
    }
}

/// `last_sig_coeff_{x,y}_prefix`: truncated unary, context rule per
/// channel and size (`last_significant_coeff_xy_prefix_decode`).
fn last_significant_prefix(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    elem: SyntaxElement,
    channel: Channel,
    log2_size: u32,
) -> Result<u32> {
    let max = (log2_size << 1) - 1;
    let (ctx_offset, ctx_shift) = if channel.is_luma() {
        (3 * (log2_size - 2) + ((log2_size - 1) >> 2), (log2_size + 1) >> 2)
    } else {
        (15, log2_size - 2)
    };
    let base = elem.offset();
    let mut i = 0;
    while i < max {
        let state = ctx.get(base + ((i >> ctx_shift) + ctx_offset) as usize);
        if engine.decode_bin(state)? == 0 {
            break;
        }
        i += 1;
    }
    Ok(i)
}

/// `last_sig_coeff_{x,y}_suffix`: `(prefix>>1)-1` bypass bits.
fn last_significant_suffix(engine: &mut Engine, prefix: u32) -> Result<u32> {
    let length = (prefix >> 1) - 1;
    engine.decode_bypass_bits(length)
}

/// `significant_coeff_group_flag`'s context increment.
fn sig_group_ctx(
    sig_group: &[[bool; 8]; 8],
    x_cg: usize,
    y_cg: usize,
    log2_trafo_size: u32,
) -> u32 {
    let mut ctx_cg = 0u32;
    let lim = (1u32 << (log2_trafo_size - 2)) - 1;
    if (x_cg as u32) < lim && sig_group[x_cg + 1][y_cg] {
        ctx_cg += 1;
    }
    if (y_cg as u32) < lim && sig_group[x_cg][y_cg + 1] {
        ctx_cg += 1;
    }
    ctx_cg
}

/// Decodes one transform block's residual and fills `block.coeffs` in
/// scan order, returning the inverse-transform dispatch descriptor.
pub fn residual_coding(
    engine: &mut Engine,
    ctx: &mut ContextTable,
    scan: ScanType,
    sps: &Sps,
    pps: &Pps,
    sh: &SliceHeader,
    cu: &CuState,
    scaling_lists: &ScalingLists,
    block: &mut CoeffBlock,
) -> Result<TransformDispatch> {
    let log2_trafo_size = block.log2_size;
    let channel = block.channel;
    for c in block.coeffs.iter_mut() {
        *c = 0;
    }

    let mut trans_skip_or_bypass = cu.cu_transquant_bypass_flag;
    if pps.transform_skip_enabled_flag && log2_trafo_size <= pps.log2_max_transform_skip_block_size {
        if tu::transform_skip_flag(engine, ctx, !channel.is_luma())? {
            trans_skip_or_bypass = true;
        }
    }

    let flat_lists;
    let (scale, shift, scale_matrix) = if !cu.cu_transquant_bypass_flag {
        let qp = channel_qp(channel, cu, sps, pps, sh);
        let (scale, shift) = dequant::scale_and_shift(qp, sps.bit_depth, log2_trafo_size);
        let scale_matrix = if sps.scaling_list_enabled_flag && !(trans_skip_or_bypass && log2_trafo_size > 2) {
            ScaleMatrix::select(scaling_lists, log2_trafo_size, channel, cu.pred_mode_intra)?
        } else {
            flat_lists = ScalingLists::flat();
            ScaleMatrix::select(&flat_lists, log2_trafo_size, channel, cu.pred_mode_intra)?
        };
        (scale, shift, scale_matrix)
    } else {
        (2u32, 0u32, ScaleMatrix::bypass())
    };

    let mut explicit_rdpcm_flag = false;
    let mut explicit_rdpcm_dir_flag = false;
    if !cu.pred_mode_intra && sps.explicit_rdpcm_enabled_flag && trans_skip_or_bypass {
        let chroma = !channel.is_luma();
        explicit_rdpcm_flag = tu::explicit_rdpcm_flag(engine, ctx, chroma)?;
        if explicit_rdpcm_flag {
            explicit_rdpcm_dir_flag = tu::explicit_rdpcm_dir_flag(engine, ctx, chroma)?;
        }
    }

    let mut last_x = last_significant_prefix(engine, ctx, SyntaxElement::LastSignificantCoeffXPrefix, channel, log2_trafo_size)?;
    let mut last_y = last_significant_prefix(engine, ctx, SyntaxElement::LastSignificantCoeffYPrefix, channel, log2_trafo_size)?;
    if last_x > 3 {
        let suffix = last_significant_suffix(engine, last_x)?;
        last_x = (1 << ((last_x >> 1) - 1)) * (2 + (last_x & 1)) + suffix;
    }
    if last_y > 3 {
        let suffix = last_significant_suffix(engine, last_y)?;
        last_y = (1 << ((last_y >> 1) - 1)) * (2 + (last_y & 1)) + suffix;
    }
    if scan == ScanType::Vert {
        std::mem::swap(&mut last_x, &mut last_y);
    }

    let x_cg_last = (last_x >> 2) as usize;
    let y_cg_last = (last_y >> 2) as usize;

    let mut num_coeff: usize = match scan {
        ScanType::Diag => {
            let last_x_c = (last_x & 3) as usize;
            let last_y_c = (last_y & 3) as usize;
            let base = DIAG_SCAN4X4_INV[last_y_c][last_x_c] as usize;
            base + (num_subblocks_before(log2_trafo_size, x_cg_last, y_cg_last) << 4)
        }
        ScanType::Horiz => HORIZ_SCAN8X8_INV[last_y as usize][last_x as usize] as usize,
        ScanType::Vert => HORIZ_SCAN8X8_INV[last_x as usize][last_y as usize] as usize,
    };
    num_coeff += 1;
    let num_last_subset = (num_coeff - 1) >> 4;

    let geometry = scan_tables(log2_trafo_size, scan);
    let mut sig_group = [[false; 8]; 8];
    let mut prev_subset_coded = false;
    let is_chroma = !channel.is_luma();
    let pred_mode_intra_angular = if channel.is_luma() {
        cu.intra_pred_mode_luma
    } else {
        cu.intra_pred_mode_chroma
    };

    for i in (0..=num_last_subset).rev() {
        let x_cg = geometry.cg_x[i] as usize;
        let y_cg = geometry.cg_y[i] as usize;
        let mut implicit_non_zero_coeff = false;

        if i < num_last_subset && i > 0 {
            let ctx_cg = sig_group_ctx(&sig_group, x_cg, y_cg, log2_trafo_size);
            let inc = ctx_cg.min(1) + if is_chroma { 2 } else { 0 };
            let state = ctx.get(SyntaxElement::SignificantCoeffGroupFlag.offset() + inc as usize);
            sig_group[x_cg][y_cg] = engine.decode_bin(state)? == 1;
            implicit_non_zero_coeff = true;
        } else {
            sig_group[x_cg][y_cg] = true;
        }

        let offset = i << 4;
        let last_scan_pos = num_coeff as i32 - offset as i32 - 1;

        let mut sig_idx: Vec<u8> = Vec::with_capacity(16);
        let n_end_initial: i32 = if i == num_last_subset {
            sig_idx.push(last_scan_pos as u8);
            last_scan_pos - 1
        } else {
            15
        };

        let mut prev_sig = 0usize;
        let sig_lim = ((1u32 << log2_trafo_size) - 1) >> 2;
        if (x_cg as u32) < sig_lim && sig_group[x_cg + 1][y_cg] {
            prev_sig |= 1;
        }
        if (y_cg as u32) < sig_lim && sig_group[x_cg][y_cg + 1] {
            prev_sig |= 2;
        }

        if sig_group[x_cg][y_cg] && n_end_initial >= 0 {
            let (ctx_idx_map, scf_offset) = rice::significance_context(
                log2_trafo_size,
                scan,
                channel,
                prev_sig,
                x_cg as u32,
                y_cg as u32,
                sps.transform_skip_context_enabled_flag,
                trans_skip_or_bypass,
            );
            if n_end_initial > 0 {
                let cnt = rice::get_sig_coeff_flag_idxs(
                    engine,
                    ctx,
                    SyntaxElement::SignificantCoeffFlag.offset() + scf_offset,
                    ctx_idx_map,
                    n_end_initial as u32,
                    &mut sig_idx,
                )?;
                if cnt != 0 {
                    implicit_non_zero_coeff = false;
                }
            }
            if implicit_non_zero_coeff {
                sig_idx.push(0);
            } else {
                let dc_offset = rice::dc_significance_offset(
                    channel,
                    i as u32,
                    sps.transform_skip_context_enabled_flag,
                    trans_skip_or_bypass,
                    scf_offset,
                );
                let state = ctx.get(SyntaxElement::SignificantCoeffFlag.offset() + dc_offset);
                if engine.decode_bin(state)? == 1 {
                    sig_idx.push(0);
                }
            }
        }

        let n_end = sig_idx.len();
        if n_end == 0 {
            continue;
        }

        let ctx_set = (if i > 0 && channel.is_luma() { 2 } else { 0 })
            + (if i != num_last_subset && prev_subset_coded { 1 } else { 0 });

        let greater = rice::greater1_greater2(engine, ctx, n_end, ctx_set, channel)?;
        prev_subset_coded = greater.prev_subset_coded;

        let mut levels: Vec<i32> = (0..n_end)
            .map(|m| if m < 8 { greater.levels[m] as i32 } else { 1 })
            .collect();

        let sign_hiding_applies = pps.sign_data_hiding_enabled_flag
            && !cu.cu_transquant_bypass_flag
            && !(cu.pred_mode_intra
                && sps.implicit_rdpcm_enabled_flag
                && trans_skip_or_bypass
                && (pred_mode_intra_angular == 10 || pred_mode_intra_angular == 26))
            && !explicit_rdpcm_flag
            && (sig_idx[0] as i32 - sig_idx[n_end - 1] as i32 > 3);

        let sign_count = n_end as u32 - (sign_hiding_applies as u32);
        let mut sign_flags = rice::coeff_sign_flags(engine, sign_count)?;
        sign_flags <<= 32 - n_end as u32;

        let eq2 = matches!(greater.first_gt1, Some(i) if greater.levels[i] == 2);
        let mut sum_abs: i32 = n_end as i32 + eq2 as i32;

        let rice_enabled = sps.persistent_rice_adaptation_enabled_flag;
        let stat_idx = (if channel.is_luma() { 2 } else { 0 }) + trans_skip_or_bypass as usize;
        let mut c_rice_param: u32 = if rice_enabled { (ctx.stat_coeff[stat_idx] >> 2) as u32 } else { 0 };
        let mut stat_updated = false;

        for m in 0..n_end {
            if greater.needs_remainder(m) {
                let remaining = rice::coeff_abs_level_remaining(engine, c_rice_param)?;
                let trans_coeff_level = levels[m] + remaining as i32;
                if rice_enabled && !stat_updated {
                    rice::update_rice(&mut ctx.stat_coeff[stat_idx], remaining, c_rice_param);
                    stat_updated = true;
                }
                if trans_coeff_level > (3 << c_rice_param) {
                    c_rice_param = if rice_enabled {
                        c_rice_param + 1
                    } else {
                        (c_rice_param + 1).min(4)
                    };
                }
                levels[m] = trans_coeff_level;
                sum_abs += trans_coeff_level - 1;
            }
        }

        if sign_hiding_applies && (sum_abs & 1) != 0 {
            levels[n_end - 1] = -levels[n_end - 1];
        }

        for m in 0..n_end {
            let mut level = levels[m];
            if (sign_flags & 0x8000_0000) != 0 {
                level = -level;
            }
            sign_flags <<= 1;

            let idx = sig_idx[m] as usize;
            let xc = (x_cg << 2) + geometry.pos_x[idx] as usize;
            let yc = (y_cg << 2) + geometry.pos_y[idx] as usize;
            let t_offset = (yc << log2_trafo_size) + xc;
            let scale_m = scale_matrix.scale_m(t_offset, xc, yc, log2_trafo_size);
            block.coeffs[t_offset] = dequant::trans_scale_sat(level, scale, scale_m, shift);
        }
    }

    let mode = dispatch_mode(
        cu,
        sps,
        channel,
        trans_skip_or_bypass,
        explicit_rdpcm_flag,
        explicit_rdpcm_dir_flag,
        pred_mode_intra_angular,
        log2_trafo_size,
        last_x,
        last_y,
    );

    Ok(TransformDispatch {
        log2_size: log2_trafo_size,
        mode,
    })
}

#[allow(clippy::too_many_arguments)]
fn dispatch_mode(
    cu: &CuState,
    sps: &Sps,
    channel: Channel,
    trans_skip_or_bypass: bool,
    explicit_rdpcm_flag: bool,
    explicit_rdpcm_dir_flag: bool,
    pred_mode_intra_angular: u32,
    log2_trafo_size: u32,
    last_significant_coeff_x: u32,
    last_significant_coeff_y: u32,
) -> TransformMode {
    let implicit_rdpcm_applies =
        sps.implicit_rdpcm_enabled_flag && (pred_mode_intra_angular == 10 || pred_mode_intra_angular == 26);

    if cu.cu_transquant_bypass_flag {
        if explicit_rdpcm_flag || implicit_rdpcm_applies {
            let vertical = if sps.implicit_rdpcm_enabled_flag {
                pred_mode_intra_angular == 26
            } else {
                explicit_rdpcm_dir_flag
            };
            return TransformMode::Rdpcm { vertical };
        }
        return TransformMode::Bypass;
    }

    if trans_skip_or_bypass {
        let rotated = sps.transform_skip_rotation_enabled_flag && log2_trafo_size == 2 && cu.pred_mode_intra;
        if explicit_rdpcm_flag || (implicit_rdpcm_applies && cu.pred_mode_intra) {
            let vertical = if explicit_rdpcm_flag {
                explicit_rdpcm_dir_flag
            } else {
                pred_mode_intra_angular == 26
            };
            return TransformMode::TransformSkipRdpcm { rotated, vertical };
        }
        return TransformMode::TransformSkip { rotated };
    }

    if cu.pred_mode_intra && channel.is_luma() && log2_trafo_size == 2 {
        return TransformMode::Idct4x4Luma;
    }

    let max_xy = last_significant_coeff_x.max(last_significant_coeff_y);
    if max_xy == 0 {
        return TransformMode::IdctDc;
    }
    let mut col_limit = last_significant_coeff_x + last_significant_coeff_y + 4;
    if max_xy < 4 {
        col_limit = col_limit.min(4);
    } else if max_xy < 8 {
        col_limit = col_limit.min(8);
    } else if max_xy < 12 {
        col_limit = col_limit.min(24);
    }
    TransformMode::Idct { col_limit }
}

/// Cross-component residual prediction's post-residual hook (applied
/// only when `cross_pf` holds for this transform unit): adds a scaled
/// luma residual into the chroma coefficient buffer in place.
pub fn apply_cross_component_prediction(coeffs: &mut [i16], luma_residual: &[i16], res_scale_val: i32) {
    for (c, &y) in coeffs.iter_mut().zip(luma_residual.iter()) {
        *c = (*c as i32 + ((res_scale_val * y as i32) >> 3)) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InitType;
    use crate::params::SliceType;

    fn test_sps() -> Sps {
        Sps {
            log2_min_cb_size: 3,
            log2_diff_max_min_coding_block_size: 3,
            log2_min_tb_size: 2,
            log2_diff_max_min_transform_block_size: 3,
            max_transform_hierarchy_depth_inter: 2,
            max_transform_hierarchy_depth_intra: 2,
            chroma_format_idc: 1,
            separate_colour_plane_flag: false,
            scaling_list_enabled_flag: false,
            amp_enabled_flag: false,
            pcm_enabled_flag: false,
            strong_intra_smoothing_enabled_flag: false,
            bit_depth: 8,
            qp_bd_offset: 0,
            transform_skip_context_enabled_flag: false,
            transform_skip_rotation_enabled_flag: false,
            implicit_rdpcm_enabled_flag: false,
            explicit_rdpcm_enabled_flag: false,
            persistent_rice_adaptation_enabled_flag: false,
        }
    }

    fn test_pps() -> Pps {
        Pps {
            dependent_slice_segments_enabled_flag: false,
            sign_data_hiding_enabled_flag: true,
            cabac_init_present_flag: false,
            transform_skip_enabled_flag: false,
            log2_max_transform_skip_block_size: 2,
            cu_qp_delta_enabled_flag: false,
            diff_cu_qp_delta_depth: 0,
            cb_qp_offset: 0,
            cr_qp_offset: 0,
            chroma_qp_offset_list_enabled_flag: false,
            log2_parallel_merge_level: 2,
            tiles_enabled_flag: false,
            entropy_coding_sync_enabled_flag: false,
            num_tile_columns: 1,
            num_tile_rows: 1,
        }
    }

    fn test_sh() -> SliceHeader {
        SliceHeader {
            slice_type: SliceType::I,
            slice_qp_y: 12,
            cabac_init_flag: false,
            slice_sao_luma_flag: false,
            slice_sao_chroma_flag: false,
            max_num_merge_cand: 5,
            cu_qp_delta_enabled_flag: false,
            collocated_from_l0_flag: false,
            slice_cb_qp_offset: 0,
            slice_cr_qp_offset: 0,
        }
    }

    #[test]
    fn decodes_one_4x4_luma_block_without_error() {
        // A full bit-level trace of the decoded values isn't hand
        // verifiable here; this exercises the whole preamble -> last
        // position -> subblock loop -> dispatch pipeline against a
        // plausible bitstream and checks it terminates cleanly with a
        // dispatch that matches the block it was asked to decode.
        let sps = test_sps();
        let pps = test_pps();
        let sh = test_sh();
        let cu = CuState {
            pred_mode_intra: true,
            cu_transquant_bypass_flag: false,
            intra_pred_mode_luma: 1,
            intra_pred_mode_chroma: 1,
            cu_qp_offset_cb: 0,
            cu_qp_offset_cr: 0,
            qp_y: 12,
        };
        let lists = ScalingLists::flat();
        let buf = [0x5Au8; 32];
        let mut engine = Engine::new(&buf).unwrap();
        let mut ctx = ContextTable::new(InitType::I, 12);
        let mut coeffs = [0i16; 16];
        let mut block = CoeffBlock {
            coeffs: &mut coeffs,
            log2_size: 2,
            channel: Channel::Luma,
        };
        let dispatch = residual_coding(&mut engine, &mut ctx, ScanType::Diag, &sps, &pps, &sh, &cu, &lists, &mut block).unwrap();
        assert_eq!(dispatch.log2_size, 2);
    }

    #[test]
    fn transquant_bypass_dequant_is_identity() {
        // trans_scale_sat with scale=2, scale_m=1, shift=0 (the bypass
        // parameters this function passes for cu_transquant_bypass_flag
        // blocks) must reproduce the coded level exactly.
        for level in [-5i32, -1, 0, 1, 7, 100] {
            assert_eq!(dequant::trans_scale_sat(level, 2, 1, 0), level as i16);
        }
    }
}
