//! Context-model table and its per-slice initialization.
//!
//! Grounded in `libavcodec/hevc_cabac.c`'s `init_values[3][HEVC_CONTEXTS]`
//! and `cabac_init_state`/`ff_hevc_cabac_init`: three initialization sets
//! (I, P, B slice) of one init value per context, each turned into a
//! `(pStateIdx, valMps)` pair by the slice QP at init time (H.265
//! §9.3.2.2).

use crate::constants::CONTEXT_COUNT;
use crate::engine::CtxState;
use crate::util::clip;

/// `CNU` ("context not used") in the reference decoder: a neutral
/// init value for contexts the I-slice table never actually reads
/// (skip_flag, merge_flag, ... are inter-only) but which still need a
/// byte in the flat array.
const CNU: u8 = 154;

/// Slice type, selecting which of the three init-value rows to use.
/// Named to match the reference decoder's `initType` derivation
/// (`cabac_init_flag` folds B into P for initType 1 in some slices;
/// this crate takes the resolved `initType` directly rather than
/// re-deriving it from `cabac_init_flag`, since that flag is a
/// caller-side slice-header concern).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitType {
    I,
    P,
    B,
}

impl InitType {
    fn row(self) -> usize {
        match self {
            InitType::I => 0,
            InitType::P => 1,
            InitType::B => 2,
        }
    }
}

#[rustfmt::skip]
static INIT_VALUES: [[u8; CONTEXT_COUNT]; 3] = [
    // initType 0 (I slice)
    [
        153, // sao_merge_flag
        200, // sao_type_idx
        139, 141, 157, // split_coding_unit_flag
        154, // cu_transquant_bypass_flag
        CNU, CNU, CNU, // skip_flag
        154, 154, 154, // cu_qp_delta
        CNU, // pred_mode
        184, CNU, CNU, CNU, // part_mode
        184, // prev_intra_luma_pred_mode
        63, 139, // intra_chroma_pred_mode
        CNU, // merge_flag
        CNU, // merge_idx
        CNU, CNU, CNU, CNU, CNU, // inter_pred_idc
        CNU, CNU, // ref_idx_l0
        CNU, CNU, // ref_idx_l1
        CNU, CNU, // abs_mvd_greater0_flag (2nd ctx never read; offset+1 reused below)
        CNU, CNU, // abs_mvd_greater1_flag (ctx+1 of its offset is the one actually used)
        CNU, // mvp_lx_flag
        CNU, // no_residual_data_flag
        153, 138, 138, // split_transform_flag
        111, 141, // cbf_luma
        94, 138, 182, 154, // cbf_cb, cbf_cr
        139, 139, // transform_skip_flag
        139, 139, // explicit_rdpcm_flag
        139, 139, // explicit_rdpcm_dir_flag
        110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111, 79, 108, 123, 63, // last_significant_coeff_x_prefix
        110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111, 79, 108, 123, 63, // last_significant_coeff_y_prefix
        91, 171, 134, 141, // significant_coeff_group_flag
        111, 111, 125, 110, 110, 94, 124, 108, 124, 107, 125, 141, 179, 153, 125, 107, 125, 141, 179, 153, 125, 107, 125, 141, 179, 153, 125, 140, 139, 182, 182, 152, 136, 152, 136, 153, 136, 139, 111, 136, 139, 111, 141, 111, // significant_coeff_flag
        140, 92, 137, 138, 140, 152, 138, 139, 153, 74, 149, 92, 139, 107, 122, 152, 140, 179, 166, 182, 140, 227, 122, 197, // coeff_abs_level_greater1_flag
        138, 153, 136, 167, 152, 152, // coeff_abs_level_greater2_flag
        154, 154, 154, 154, 154, 154, 154, 154, // log2_res_scale_abs
        154, 154, // res_scale_sign_flag
        154, // cu_chroma_qp_offset_flag
        154, // cu_chroma_qp_offset_idx
    ],
    // initType 1 (P slice)
    [
        153, // sao_merge_flag
        185, // sao_type_idx
        107, 139, 126, // split_coding_unit_flag
        154, // cu_transquant_bypass_flag
        197, 185, 201, // skip_flag
        154, 154, 154, // cu_qp_delta
        149, // pred_mode
        154, 139, 154, 154, // part_mode
        154, // prev_intra_luma_pred_mode
        152, 139, // intra_chroma_pred_mode
        110, // merge_flag
        122, // merge_idx
        95, 79, 63, 31, 31, // inter_pred_idc
        153, 153, // ref_idx_l0
        153, 153, // ref_idx_l1
        140, 198, // abs_mvd_greater0_flag (2nd ctx never read; offset+1 reused below)
        140, 198, // abs_mvd_greater1_flag (ctx+1 of its offset is the one actually used)
        168, // mvp_lx_flag
        79, // no_residual_data_flag
        124, 138, 94, // split_transform_flag
        153, 111, // cbf_luma
        149, 107, 167, 154, // cbf_cb, cbf_cr
        139, 139, // transform_skip_flag
        139, 139, // explicit_rdpcm_flag
        139, 139, // explicit_rdpcm_dir_flag
        125, 110, 94, 110, 95, 79, 125, 111, 110, 78, 110, 111, 111, 95, 94, 108, 123, 108, // last_significant_coeff_x_prefix
        125, 110, 94, 110, 95, 79, 125, 111, 110, 78, 110, 111, 111, 95, 94, 108, 123, 108, // last_significant_coeff_y_prefix
        121, 140, 61, 154, // significant_coeff_group_flag
        155, 154, 139, 153, 139, 123, 123, 63, 153, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 170, 153, 123, 123, 107, 121, 107, 121, 167, 151, 183, 140, 151, 183, 140, 140, 140, // significant_coeff_flag
        154, 196, 196, 167, 154, 152, 167, 182, 182, 134, 149, 136, 153, 121, 136, 137, 169, 194, 166, 167, 154, 167, 137, 182, // coeff_abs_level_greater1_flag
        107, 167, 91, 122, 107, 167, // coeff_abs_level_greater2_flag
        154, 154, 154, 154, 154, 154, 154, 154, // log2_res_scale_abs
        154, 154, // res_scale_sign_flag
        154, // cu_chroma_qp_offset_flag
        154, // cu_chroma_qp_offset_idx
    ],
    // initType 2 (B slice)
    [
        153, // sao_merge_flag
        160, // sao_type_idx
        107, 139, 126, // split_coding_unit_flag
        154, // cu_transquant_bypass_flag
        197, 185, 201, // skip_flag
        154, 154, 154, // cu_qp_delta
        134, // pred_mode
        154, 139, 154, 154, // part_mode
        183, // prev_intra_luma_pred_mode
        152, 139, // intra_chroma_pred_mode
        154, // merge_flag
        137, // merge_idx
        95, 79, 63, 31, 31, // inter_pred_idc
        153, 153, // ref_idx_l0
        153, 153, // ref_idx_l1
        169, 198, // abs_mvd_greater0_flag (2nd ctx never read; offset+1 reused below)
        169, 198, // abs_mvd_greater1_flag (ctx+1 of its offset is the one actually used)
        168, // mvp_lx_flag
        79, // no_residual_data_flag
        224, 167, 122, // split_transform_flag
        153, 111, // cbf_luma
        149, 92, 167, 154, // cbf_cb, cbf_cr
        139, 139, // transform_skip_flag
        139, 139, // explicit_rdpcm_flag
        139, 139, // explicit_rdpcm_dir_flag
        125, 110, 124, 110, 95, 94, 125, 111, 111, 79, 125, 126, 111, 111, 79, 108, 123, 93, // last_significant_coeff_x_prefix
        125, 110, 124, 110, 95, 94, 125, 111, 111, 79, 125, 126, 111, 111, 79, 108, 123, 93, // last_significant_coeff_y_prefix
        121, 140, 61, 154, // significant_coeff_group_flag
        170, 154, 139, 153, 139, 123, 123, 63, 124, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 166, 183, 140, 136, 153, 154, 170, 153, 138, 138, 122, 121, 122, 121, 167, 151, 183, 140, 151, 183, 140, 140, 140, // significant_coeff_flag
        154, 196, 167, 167, 154, 152, 167, 182, 182, 134, 149, 136, 153, 121, 136, 122, 169, 208, 166, 167, 154, 152, 167, 182, // coeff_abs_level_greater1_flag
        107, 167, 91, 107, 107, 167, // coeff_abs_level_greater2_flag
        154, 154, 154, 154, 154, 154, 154, 154, // log2_res_scale_abs
        154, 154, // res_scale_sign_flag
        154, // cu_chroma_qp_offset_flag
        154, // cu_chroma_qp_offset_idx
    ],
];

/// Derives the initial `(pStateIdx, valMps)` packed state for one
/// context from its init value and the slice QP (H.265 §9.3.2.2,
/// `cabac_init_state` in the reference decoder).
fn init_state(init_value: u8, qp: i32) -> CtxState {
    let qp = clip(qp, 0, 51);
    let slope = (init_value as i32 >> 4) * 5 - 45;
    let offset = ((init_value as i32 & 15) << 3) - 16;
    let pre_ctx_state = clip((slope * qp >> 4) + offset, 1, 126);
    let (p_state_idx, val_mps) = if pre_ctx_state <= 63 {
        (63 - pre_ctx_state as u8, 0u8)
    } else {
        (pre_ctx_state as u8 - 64, 1u8)
    };
    (p_state_idx << 1) | val_mps
}

/// The full context-model state for one slice segment, plus the
/// persistent Golomb-Rice adaptation counters that live alongside it.
pub struct ContextTable {
    states: [CtxState; CONTEXT_COUNT],
    /// `StatCoeff[4]`: per-category persistent Rice-parameter bias,
    /// reset at slice start and updated as coefficients are decoded
    /// (H.265 §9.3.3.10). Indexed by `[c_rice_param category]`.
    pub stat_coeff: [i32; 4],
}

impl ContextTable {
    /// Initializes every context from `init_type`'s row at slice QP
    /// `slice_qp_y`, and zeroes `stat_coeff`.
    pub fn new(init_type: InitType, slice_qp_y: i32) -> Self {
        let row = &INIT_VALUES[init_type.row()];
        let mut states = [0u8; CONTEXT_COUNT];
        for (i, &v) in row.iter().enumerate() {
            states[i] = init_state(v, slice_qp_y);
        }
        ContextTable {
            states,
            stat_coeff: [0; 4],
        }
    }

    #[inline]
    pub fn get(&mut self, ctx_idx: usize) -> &mut CtxState {
        &mut self.states[ctx_idx]
    }

    /// Snapshots all context state for WPP/tile save points.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            states: self.states,
            stat_coeff: self.stat_coeff,
        }
    }

    /// Restores previously-snapshotted context state.
    pub fn restore(&mut self, snap: &ContextSnapshot) {
        self.states = snap.states;
        self.stat_coeff = snap.stat_coeff;
    }
}

/// An opaque, copyable capture of `ContextTable`'s state, used by the
/// WPP/tile save-restore mechanism in `wpp.rs`.
#[derive(Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    states: [CtxState; CONTEXT_COUNT],
    stat_coeff: [i32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_state_is_within_valid_range() {
        for init_value in 0..=255u8 {
            for qp in [0, 26, 51] {
                let state = init_state(init_value, qp);
                assert!(state <= 127);
            }
        }
    }

    #[test]
    fn new_populates_every_context() {
        let table = ContextTable::new(InitType::I, 26);
        assert_eq!(table.states.len(), CONTEXT_COUNT);
        assert_eq!(table.stat_coeff, [0, 0, 0, 0]);
    }

    #[test]
    fn snapshot_restore_roundtrips() {
        let mut table = ContextTable::new(InitType::B, 30);
        let before = table.snapshot();
        *table.get(5) = 0;
        table.stat_coeff[0] = 3;
        table.restore(&before);
        assert_eq!(table.stat_coeff[0], 0);
    }
}
