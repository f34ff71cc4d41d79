//! Read-only parameter structs the caller constructs from its own
//! NAL/SPS/PPS/slice-header parsing and hands to `SliceDecoder`.
//!
//! None of these are parsed by this crate; they mirror how the
//! reference Rust teacher's `ConfigRecord` holds already-parsed,
//! read-only configuration without owning its container format.

use crate::context::InitType;

/// The handful of sequence-parameter-set fields the entropy decoder
/// itself consults (block-size bounds, chroma format, scaling-list
/// presence). Everything else SPS carries is prediction/filter
/// configuration and stays with the caller.
#[derive(Clone, Debug)]
pub struct Sps {
    pub log2_min_cb_size: u32,
    pub log2_diff_max_min_coding_block_size: u32,
    pub log2_min_tb_size: u32,
    pub log2_diff_max_min_transform_block_size: u32,
    pub max_transform_hierarchy_depth_inter: u32,
    pub max_transform_hierarchy_depth_intra: u32,
    pub chroma_format_idc: u32,
    pub separate_colour_plane_flag: bool,
    pub scaling_list_enabled_flag: bool,
    pub amp_enabled_flag: bool,
    pub pcm_enabled_flag: bool,
    pub strong_intra_smoothing_enabled_flag: bool,
    /// Shared luma/chroma sample bit depth; the reference decoder keeps
    /// a single `bit_depth` field for the dequant shift derivation.
    pub bit_depth: u32,
    /// `6 * (bit_depth - 8)`, carried as a field rather than derived so
    /// callers that already parsed it don't need to recompute it.
    pub qp_bd_offset: i32,
    pub transform_skip_context_enabled_flag: bool,
    pub transform_skip_rotation_enabled_flag: bool,
    pub implicit_rdpcm_enabled_flag: bool,
    pub explicit_rdpcm_enabled_flag: bool,
    pub persistent_rice_adaptation_enabled_flag: bool,
}

impl Sps {
    pub fn log2_max_cb_size(&self) -> u32 {
        self.log2_min_cb_size + self.log2_diff_max_min_coding_block_size
    }

    pub fn log2_max_tb_size(&self) -> u32 {
        self.log2_min_tb_size + self.log2_diff_max_min_transform_block_size
    }
}

/// Picture-parameter-set fields the entropy decoder consults.
#[derive(Clone, Debug)]
pub struct Pps {
    pub dependent_slice_segments_enabled_flag: bool,
    pub sign_data_hiding_enabled_flag: bool,
    pub cabac_init_present_flag: bool,
    pub transform_skip_enabled_flag: bool,
    pub log2_max_transform_skip_block_size: u32,
    pub cu_qp_delta_enabled_flag: bool,
    pub diff_cu_qp_delta_depth: u32,
    pub cb_qp_offset: i32,
    pub cr_qp_offset: i32,
    pub chroma_qp_offset_list_enabled_flag: bool,
    pub log2_parallel_merge_level: u32,
    pub tiles_enabled_flag: bool,
    pub entropy_coding_sync_enabled_flag: bool,
    pub num_tile_columns: u32,
    pub num_tile_rows: u32,
}

/// The slice-header fields that shape CABAC initialization and its
/// syntax-element decode paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceType {
    B,
    P,
    I,
}

impl SliceType {
    pub fn init_type(self, cabac_init_flag: bool) -> InitType {
        match (self, cabac_init_flag) {
            (SliceType::I, _) => InitType::I,
            (SliceType::P, false) => InitType::P,
            (SliceType::P, true) => InitType::B,
            (SliceType::B, false) => InitType::B,
            (SliceType::B, true) => InitType::P,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SliceHeader {
    pub slice_type: SliceType,
    pub slice_qp_y: i32,
    pub cabac_init_flag: bool,
    pub slice_sao_luma_flag: bool,
    pub slice_sao_chroma_flag: bool,
    pub max_num_merge_cand: u32,
    pub cu_qp_delta_enabled_flag: bool,
    pub collocated_from_l0_flag: bool,
    pub slice_cb_qp_offset: i32,
    pub slice_cr_qp_offset: i32,
}

/// Per-min-coding-block-unit neighbor state the decoder reads for
/// context derivation (`split_coding_unit_flag`, `skip_flag`,
/// `cu_qp_delta_abs`'s implicit previous-value reset). Flat, indexed
/// by `min_cb_addr_zs` the way the reference decoder's own
/// `HEVCLocalContext` tracks them.
pub struct NeighborState {
    pub skip_flag: Vec<bool>,
    pub ct_depth: Vec<u8>,
    pub min_cb_width: usize,
}

impl NeighborState {
    pub fn new(min_cb_width: usize, min_cb_height: usize) -> Self {
        NeighborState {
            skip_flag: vec![false; min_cb_width * min_cb_height],
            ct_depth: vec![0; min_cb_width * min_cb_height],
            min_cb_width,
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.min_cb_width + x
    }

    pub fn skip_flag_at(&self, x: usize, y: usize) -> bool {
        self.skip_flag[self.index(x, y)]
    }

    pub fn set_skip_flag(&mut self, x: usize, y: usize, val: bool) {
        let i = self.index(x, y);
        self.skip_flag[i] = val;
    }

    pub fn ct_depth_at(&self, x: usize, y: usize) -> u8 {
        self.ct_depth[self.index(x, y)]
    }

    pub fn set_ct_depth(&mut self, x: usize, y: usize, val: u8) {
        let i = self.index(x, y);
        self.ct_depth[i] = val;
    }
}

/// Dequantization scaling matrices, indexed by size class (4x4, 8x8,
/// 16x16, 32x32) and up to 6 matrices per class (3 luma/chroma per
/// prediction mode for the smaller two classes). `None` means "flat",
/// i.e. every entry is 16.
#[derive(Clone)]
pub struct ScalingLists {
    pub matrices: [Vec<Vec<u8>>; 4],
    pub dc_coeff: [Vec<u8>; 2],
}

impl ScalingLists {
    /// A flat (all-16) scaling list set, used when
    /// `scaling_list_enabled_flag` is false.
    pub fn flat() -> Self {
        ScalingLists {
            matrices: [
                vec![vec![16; 16]; 6],
                vec![vec![16; 64]; 6],
                vec![vec![16; 64]; 6],
                vec![vec![16; 64]; 6],
            ],
            dc_coeff: [vec![16; 6], vec![16; 6]],
        }
    }
}
