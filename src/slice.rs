//! Per-slice-segment decoder object: owns the arithmetic engine and
//! context table for one slice segment (or, at a tile boundary, the
//! fresh engine/table after a hard reinit) and exposes one method per
//! syntax element, plus `residual_coding`/`mvd_coding`. Mirrors
//! `ff_hevc_cabac_init`'s role of gluing the engine, the context
//! table, and the WPP save/load protocol together for the caller's
//! CTB-by-CTB decode loop.

use crate::constants::ScanType;
use crate::context::{ContextTable, InitType};
use crate::engine::Engine;
use crate::error::Result;
use crate::params::{NeighborState, Pps, ScalingLists, SliceHeader, Sps};
use crate::residual::{self, CoeffBlock, CuState, TransformDispatch};
use crate::syntax::cu::{self, PartMode};
use crate::syntax::mvd::{self, Mvd};
use crate::syntax::pu::{self, InterPredIdc};
use crate::syntax::sao::{self, SaoType};
use crate::syntax::tu;
use crate::wpp::WppState;

pub struct SliceDecoder<'a> {
    engine: Engine<'a>,
    ctx: ContextTable,
    wpp: WppState,
}

impl<'a> SliceDecoder<'a> {
    /// Initializes a new slice segment's engine and context table
    /// (`cabac_init_decoder` + `cabac_init_state`).
    pub fn new(buf: &'a [u8], init_type: InitType, slice_qp_y: i32) -> Result<Self> {
        Ok(SliceDecoder {
            engine: Engine::new(buf)?,
            ctx: ContextTable::new(init_type, slice_qp_y),
            wpp: WppState::new(),
        })
    }

    /// Resumes an already-initialized context table (dependent slice
    /// segments, and WPP row restarts that loaded a saved snapshot
    /// before this object was constructed) against a fresh engine.
    pub fn resume(buf: &'a [u8], ctx: ContextTable) -> Result<Self> {
        Ok(SliceDecoder {
            engine: Engine::new(buf)?,
            ctx,
            wpp: WppState::new(),
        })
    }

    /// Hard-reinitializes both the engine (onto a new byte buffer) and
    /// the context table, at a tile boundary (`ff_hevc_cabac_init`'s
    /// `tile_id` branch).
    pub fn reinit_tile_boundary(&mut self, buf: &'a [u8], init_type: InitType, slice_qp_y: i32) -> Result<()> {
        self.engine.reinit_hard(buf)?;
        self.ctx = crate::wpp::reinit_tile_boundary(init_type, slice_qp_y);
        Ok(())
    }

    /// Snapshots context state after the second CTB of a WPP row.
    pub fn save_wpp_state(&mut self, ctb_col: u32, ctb_width: u32, entropy_coding_sync_enabled_flag: bool) {
        self.wpp.save_if_needed(&self.ctx, ctb_col, ctb_width, entropy_coding_sync_enabled_flag);
    }

    /// Restores (or reinitializes) context state at the start of a new
    /// WPP row.
    pub fn load_wpp_state(
        &mut self,
        ctb_col: u32,
        ctb_width: u32,
        first_ctb_in_picture: bool,
        init_type: InitType,
        slice_qp_y: i32,
    ) {
        self.wpp.load_row_start(&mut self.ctx, ctb_col, ctb_width, first_ctb_in_picture, init_type, slice_qp_y);
    }

    pub fn context_table(&self) -> &ContextTable {
        &self.ctx
    }

    pub fn bytes_consumed(&self) -> usize {
        self.engine.bytes_consumed()
    }

    // -- SAO --

    pub fn sao_merge_flag(&mut self) -> Result<bool> {
        sao::sao_merge_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn sao_type_idx(&mut self) -> Result<SaoType> {
        sao::sao_type_idx(&mut self.engine, &mut self.ctx)
    }

    pub fn sao_band_position(&mut self) -> Result<u32> {
        sao::sao_band_position(&mut self.engine)
    }

    pub fn sao_offset_abs(&mut self, bit_depth: u32) -> Result<u32> {
        sao::sao_offset_abs(&mut self.engine, bit_depth)
    }

    pub fn sao_offset_sign(&mut self) -> Result<bool> {
        sao::sao_offset_sign(&mut self.engine)
    }

    pub fn sao_eo_class(&mut self) -> Result<u32> {
        sao::sao_eo_class(&mut self.engine)
    }

    // -- Coding unit / prediction unit --

    pub fn end_of_slice_segment_flag(&mut self) -> Result<bool> {
        cu::end_of_slice_segment_flag(&mut self.engine)
    }

    pub fn pcm_flag(&mut self) -> Result<bool> {
        cu::pcm_flag(&mut self.engine)
    }

    pub fn cu_transquant_bypass_flag(&mut self) -> Result<bool> {
        cu::cu_transquant_bypass_flag(&mut self.engine, &mut self.ctx)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn skip_flag(
        &mut self,
        neighbors: &NeighborState,
        x_cb: usize,
        y_cb: usize,
        ctb_left_flag: bool,
        ctb_up_flag: bool,
        x0b: u32,
        y0b: u32,
    ) -> Result<bool> {
        cu::skip_flag(&mut self.engine, &mut self.ctx, neighbors, x_cb, y_cb, ctb_left_flag, ctb_up_flag, x0b, y0b)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn split_coding_unit_flag(
        &mut self,
        neighbors: &NeighborState,
        ct_depth: u8,
        x_cb: usize,
        y_cb: usize,
        ctb_left_flag: bool,
        ctb_up_flag: bool,
        x0b: u32,
        y0b: u32,
    ) -> Result<bool> {
        cu::split_coding_unit_flag(&mut self.engine, &mut self.ctx, neighbors, ct_depth, x_cb, y_cb, ctb_left_flag, ctb_up_flag, x0b, y0b)
    }

    pub fn pred_mode(&mut self) -> Result<bool> {
        cu::pred_mode(&mut self.engine, &mut self.ctx)
    }

    pub fn part_mode(&mut self, log2_cb_size: u32, log2_min_cb_size: u32, is_intra: bool, amp_enabled: bool) -> Result<PartMode> {
        cu::part_mode(&mut self.engine, &mut self.ctx, log2_cb_size, log2_min_cb_size, is_intra, amp_enabled)
    }

    pub fn prev_intra_luma_pred_flag(&mut self) -> Result<bool> {
        cu::prev_intra_luma_pred_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn mpm_idx(&mut self) -> Result<u32> {
        cu::mpm_idx(&mut self.engine)
    }

    pub fn rem_intra_luma_pred_mode(&mut self) -> Result<u32> {
        cu::rem_intra_luma_pred_mode(&mut self.engine)
    }

    pub fn intra_chroma_pred_mode(&mut self) -> Result<u32> {
        cu::intra_chroma_pred_mode(&mut self.engine, &mut self.ctx)
    }

    pub fn cu_qp_delta_abs(&mut self) -> Result<u32> {
        cu::cu_qp_delta_abs(&mut self.engine, &mut self.ctx)
    }

    pub fn cu_qp_delta_sign_flag(&mut self) -> Result<bool> {
        cu::cu_qp_delta_sign_flag(&mut self.engine)
    }

    pub fn cu_chroma_qp_offset_flag(&mut self) -> Result<bool> {
        cu::cu_chroma_qp_offset_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn cu_chroma_qp_offset_idx(&mut self, chroma_qp_offset_list_len_minus1: u32) -> Result<u32> {
        cu::cu_chroma_qp_offset_idx(&mut self.engine, &mut self.ctx, chroma_qp_offset_list_len_minus1)
    }

    pub fn merge_flag(&mut self) -> Result<bool> {
        pu::merge_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn merge_idx(&mut self, max_num_merge_cand: u32) -> Result<u32> {
        pu::merge_idx(&mut self.engine, &mut self.ctx, max_num_merge_cand)
    }

    pub fn inter_pred_idc(&mut self, n_pb_w: u32, n_pb_h: u32, ct_depth: usize) -> Result<InterPredIdc> {
        pu::inter_pred_idc(&mut self.engine, &mut self.ctx, n_pb_w, n_pb_h, ct_depth)
    }

    pub fn ref_idx_lx(&mut self, base_offset: usize, num_ref_idx_lx: u32) -> Result<u32> {
        pu::ref_idx_lx(&mut self.engine, &mut self.ctx, base_offset, num_ref_idx_lx)
    }

    pub fn mvp_lx_flag(&mut self) -> Result<bool> {
        pu::mvp_lx_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn no_residual_data_flag(&mut self) -> Result<bool> {
        pu::no_residual_data_flag(&mut self.engine, &mut self.ctx)
    }

    pub fn mvd_coding(&mut self) -> Result<Mvd> {
        mvd::mvd_coding(&mut self.engine, &mut self.ctx)
    }

    // -- Transform unit --

    pub fn split_transform_flag(&mut self, log2_trafo_size: u32) -> Result<bool> {
        tu::split_transform_flag(&mut self.engine, &mut self.ctx, log2_trafo_size)
    }

    pub fn cbf_luma(&mut self, trafo_depth: u32) -> Result<bool> {
        tu::cbf_luma(&mut self.engine, &mut self.ctx, trafo_depth)
    }

    pub fn cbf_cb_cr(&mut self, trafo_depth: u32) -> Result<bool> {
        tu::cbf_cb_cr(&mut self.engine, &mut self.ctx, trafo_depth)
    }

    pub fn transform_skip_flag(&mut self, chroma: bool) -> Result<bool> {
        tu::transform_skip_flag(&mut self.engine, &mut self.ctx, chroma)
    }

    pub fn explicit_rdpcm_flag(&mut self, chroma: bool) -> Result<bool> {
        tu::explicit_rdpcm_flag(&mut self.engine, &mut self.ctx, chroma)
    }

    pub fn explicit_rdpcm_dir_flag(&mut self, chroma: bool) -> Result<bool> {
        tu::explicit_rdpcm_dir_flag(&mut self.engine, &mut self.ctx, chroma)
    }

    pub fn log2_res_scale_abs(&mut self, idx: u32) -> Result<u32> {
        tu::log2_res_scale_abs(&mut self.engine, &mut self.ctx, idx)
    }

    pub fn res_scale_sign_flag(&mut self, idx: u32) -> Result<bool> {
        tu::res_scale_sign_flag(&mut self.engine, &mut self.ctx, idx)
    }

    /// Decodes one transform block's residual, per `ff_hevc_hls_residual_coding`.
    #[allow(clippy::too_many_arguments)]
    pub fn residual_coding(
        &mut self,
        scan: ScanType,
        sps: &Sps,
        pps: &Pps,
        sh: &SliceHeader,
        cu: &CuState,
        scaling_lists: &ScalingLists,
        block: &mut CoeffBlock,
    ) -> Result<TransformDispatch> {
        residual::residual_coding(&mut self.engine, &mut self.ctx, scan, sps, pps, sh, cu, scaling_lists, block)
    }

    pub fn apply_cross_component_prediction(&self, coeffs: &mut [i16], luma_residual: &[i16], res_scale_val: i32) {
        residual::apply_cross_component_prediction(coeffs, luma_residual, res_scale_val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_slice_decoder_decodes_end_of_slice_flag() {
        let buf = [0xFFu8; 8];
        let mut sd = SliceDecoder::new(&buf, InitType::I, 26).unwrap();
        let v = sd.end_of_slice_segment_flag();
        assert!(v.is_ok());
    }

    #[test]
    fn reinit_tile_boundary_resets_context_table() {
        let buf = [0x00u8; 8];
        let mut sd = SliceDecoder::new(&buf, InitType::I, 26).unwrap();
        *sd.ctx.get(12) = 0;
        let buf2 = [0x00u8; 8];
        sd.reinit_tile_boundary(&buf2, InitType::I, 26).unwrap();
        let fresh = ContextTable::new(InitType::I, 26);
        assert!(sd.ctx.snapshot() == fresh.snapshot());
    }
}
