//! A slice-segment-level walk through `SliceDecoder`: the CTB-loop
//! shape a caller drives this crate with (end-of-slice check, a
//! skip_flag read against neighbor state, a residual block), run
//! against a hand-built buffer rather than a conformance fixture.
//! Everything here is either off the CABAC engine entirely (the
//! neighbor-state bookkeeping) or only checked structurally, for the
//! same reason `tests/residual.rs` and `tests/mvd.rs` stick to
//! structural assertions: exact context-coded outcomes aren't hand
//! verifiable without running the decoder itself.

use hevc_cabac::constants::{Channel, ScanType};
use hevc_cabac::context::InitType;
use hevc_cabac::params::{NeighborState, Pps, ScalingLists, SliceHeader, SliceType, Sps};
use hevc_cabac::residual::{CoeffBlock, CuState};
use hevc_cabac::slice::SliceDecoder;

#[test]
fn walks_one_ctb_worth_of_syntax_without_error() {
    let buf = [0x7Bu8, 0x2E, 0x91, 0xC4, 0x58, 0x03, 0xAA, 0xF0, 0x6D, 0x1C, 0x99, 0x4B];
    let mut sd = SliceDecoder::new(&buf, InitType::I, 26).unwrap();
    let neighbors = NeighborState::new(8, 8);

    let _end_of_slice = sd.end_of_slice_segment_flag().unwrap();
    let _skip = sd.skip_flag(&neighbors, 0, 0, false, false, 0, 0).unwrap();

    let cu = CuState {
        pred_mode_intra: true,
        cu_transquant_bypass_flag: false,
        intra_pred_mode_luma: 1,
        intra_pred_mode_chroma: 1,
        cu_qp_offset_cb: 0,
        cu_qp_offset_cr: 0,
        qp_y: 26,
    };
    let sps = Sps {
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
    };
    let pps = Pps {
        dependent_slice_segments_enabled_flag: false,
        sign_data_hiding_enabled_flag: false,
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
    };
    let sh = SliceHeader {
        slice_type: SliceType::I,
        slice_qp_y: 26,
        cabac_init_flag: false,
        slice_sao_luma_flag: false,
        slice_sao_chroma_flag: false,
        max_num_merge_cand: 5,
        cu_qp_delta_enabled_flag: false,
        collocated_from_l0_flag: false,
        slice_cb_qp_offset: 0,
        slice_cr_qp_offset: 0,
    };
    let lists = ScalingLists::flat();
    let mut coeffs = [0i16; 16];
    let mut block = CoeffBlock {
        coeffs: &mut coeffs,
        log2_size: 2,
        channel: Channel::Luma,
    };
    let dispatch = sd.residual_coding(ScanType::Diag, &sps, &pps, &sh, &cu, &lists, &mut block).unwrap();
    assert_eq!(dispatch.log2_size, 2);

    // bytes_consumed only ever grows as the engine reads further into
    // the buffer, and can never exceed what was handed in.
    assert!(sd.bytes_consumed() <= buf.len());
}
