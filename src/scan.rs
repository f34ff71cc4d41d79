//! Scan-order geometry for transform-block coefficient decoding.
//!
//! Every table here is transcribed verbatim from `hevc_cabac.c`'s static
//! scan tables, except `DIAG_SCAN4X4_X/Y` and `DIAG_SCAN8X8_X/Y`: the
//! reference decoder only carries their *inverse* tables locally and
//! references the forward ones (`ff_hevc_diag_scan{4x4,8x8}_{x,y}`) from
//! a neighboring translation unit that wasn't part of the retrieved file
//! set. Those two forward tables are derived here from the verbatim
//! inverse tables (`DIAG_SCAN4X4_INV`/`DIAG_SCAN8X8_INV`) by inverting the
//! index mapping, and cross-checked against them in the unit tests below.

use crate::constants::ScanType;

pub const SCAN_1X1: [u8; 1] = [0];

pub const HORIZ_SCAN2X2_X: [u8; 4] = [0, 1, 0, 1];
pub const HORIZ_SCAN2X2_Y: [u8; 4] = [0, 0, 1, 1];

pub const HORIZ_SCAN4X4_X: [u8; 16] = [
    0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3,
];
pub const HORIZ_SCAN4X4_Y: [u8; 16] = [
    0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3,
];

#[rustfmt::skip]
pub const HORIZ_SCAN8X8_INV: [[u8; 8]; 8] = [
    [ 0,  1,  2,  3, 16, 17, 18, 19],
    [ 4,  5,  6,  7, 20, 21, 22, 23],
    [ 8,  9, 10, 11, 24, 25, 26, 27],
    [12, 13, 14, 15, 28, 29, 30, 31],
    [32, 33, 34, 35, 48, 49, 50, 51],
    [36, 37, 38, 39, 52, 53, 54, 55],
    [40, 41, 42, 43, 56, 57, 58, 59],
    [44, 45, 46, 47, 60, 61, 62, 63],
];

pub const DIAG_SCAN2X2_X: [u8; 4] = [0, 0, 1, 1];
pub const DIAG_SCAN2X2_Y: [u8; 4] = [0, 1, 0, 1];

#[rustfmt::skip]
pub const DIAG_SCAN2X2_INV: [[u8; 2]; 2] = [
    [0, 2],
    [1, 3],
];

#[rustfmt::skip]
pub const DIAG_SCAN4X4_INV: [[u8; 4]; 4] = [
    [0,  2,  5,  9],
    [1,  4,  8, 12],
    [3,  7, 11, 14],
    [6, 10, 13, 15],
];

#[rustfmt::skip]
pub const DIAG_SCAN8X8_INV: [[u8; 8]; 8] = [
    [ 0,  2,  5,  9, 14, 20, 27, 35],
    [ 1,  4,  8, 13, 19, 26, 34, 42],
    [ 3,  7, 12, 18, 25, 33, 41, 48],
    [ 6, 11, 17, 24, 32, 40, 47, 53],
    [10, 16, 23, 31, 39, 46, 52, 57],
    [15, 22, 30, 38, 45, 51, 56, 60],
    [21, 29, 37, 44, 50, 55, 59, 62],
    [28, 36, 43, 49, 54, 58, 61, 63],
];

#[rustfmt::skip]
pub const DIAG_SCAN4X4_X: [u8; 16] = [
    0, 0, 1, 0, 1, 2, 0, 1, 2, 3, 1, 2, 3, 2, 3, 3,
];
#[rustfmt::skip]
pub const DIAG_SCAN4X4_Y: [u8; 16] = [
    0, 1, 0, 2, 1, 0, 3, 2, 1, 0, 3, 2, 1, 3, 2, 3,
];

#[rustfmt::skip]
pub const DIAG_SCAN8X8_X: [u8; 64] = [
    0, 0, 1, 0, 1, 2, 0, 1, 2, 3, 0, 1, 2, 3, 4, 0,
    1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3,
    4, 5, 6, 7, 1, 2, 3, 4, 5, 6, 7, 2, 3, 4, 5, 6,
    7, 3, 4, 5, 6, 7, 4, 5, 6, 7, 5, 6, 7, 6, 7, 7,
];
#[rustfmt::skip]
pub const DIAG_SCAN8X8_Y: [u8; 64] = [
    0, 1, 0, 2, 1, 0, 3, 2, 1, 0, 4, 3, 2, 1, 0, 5,
    4, 3, 2, 1, 0, 6, 5, 4, 3, 2, 1, 0, 7, 6, 5, 4,
    3, 2, 1, 0, 7, 6, 5, 4, 3, 2, 1, 7, 6, 5, 4, 3,
    2, 7, 6, 5, 4, 3, 7, 6, 5, 4, 7, 6, 5, 7, 6, 7,
];

/// Forward scan tables (index -> (x, y) within a subblock) for one
/// coefficient-group scan, selected by `ScanType` and log2 block size.
pub struct ScanTables {
    /// Scan of subblocks ("coefficient groups") within the block.
    pub cg_x: &'static [u8],
    pub cg_y: &'static [u8],
    /// Scan of the 16 positions within each 4x4 subblock.
    pub pos_x: &'static [u8],
    pub pos_y: &'static [u8],
}

/// Resolves the scan geometry for a transform block of size
/// `1 << log2_trafo_size`, given its scan index. Horizontal and
/// vertical scans only apply to 4x4/8x8 luma intra blocks per the
/// syntax table; callers are expected to have already resolved
/// `scan_idx` accordingly, falling back to `Diag` otherwise.
pub fn scan_tables(log2_trafo_size: u32, scan_type: ScanType) -> ScanTables {
    match (log2_trafo_size, scan_type) {
        (2, ScanType::Horiz) => ScanTables {
            cg_x: &SCAN_1X1,
            cg_y: &SCAN_1X1,
            pos_x: &HORIZ_SCAN4X4_X,
            pos_y: &HORIZ_SCAN4X4_Y,
        },
        (2, ScanType::Vert) => ScanTables {
            cg_x: &SCAN_1X1,
            cg_y: &SCAN_1X1,
            pos_x: &HORIZ_SCAN4X4_Y,
            pos_y: &HORIZ_SCAN4X4_X,
        },
        (2, ScanType::Diag) => ScanTables {
            cg_x: &SCAN_1X1,
            cg_y: &SCAN_1X1,
            pos_x: &DIAG_SCAN4X4_X,
            pos_y: &DIAG_SCAN4X4_Y,
        },
        (3, ScanType::Horiz) => ScanTables {
            cg_x: &HORIZ_SCAN2X2_X,
            cg_y: &HORIZ_SCAN2X2_Y,
            pos_x: &HORIZ_SCAN4X4_X,
            pos_y: &HORIZ_SCAN4X4_Y,
        },
        (3, ScanType::Vert) => ScanTables {
            cg_x: &HORIZ_SCAN2X2_Y,
            cg_y: &HORIZ_SCAN2X2_X,
            pos_x: &HORIZ_SCAN4X4_Y,
            pos_y: &HORIZ_SCAN4X4_X,
        },
        (3, ScanType::Diag) => ScanTables {
            cg_x: &DIAG_SCAN2X2_X,
            cg_y: &DIAG_SCAN2X2_Y,
            pos_x: &DIAG_SCAN4X4_X,
            pos_y: &DIAG_SCAN4X4_Y,
        },
        (4, _) => ScanTables {
            cg_x: &DIAG_SCAN4X4_X,
            cg_y: &DIAG_SCAN4X4_Y,
            pos_x: &DIAG_SCAN4X4_X,
            pos_y: &DIAG_SCAN4X4_Y,
        },
        (5, _) => ScanTables {
            cg_x: &DIAG_SCAN8X8_X,
            cg_y: &DIAG_SCAN8X8_Y,
            pos_x: &DIAG_SCAN4X4_X,
            pos_y: &DIAG_SCAN4X4_Y,
        },
        _ => ScanTables {
            cg_x: &SCAN_1X1,
            cg_y: &SCAN_1X1,
            pos_x: &DIAG_SCAN4X4_X,
            pos_y: &DIAG_SCAN4X4_Y,
        },
    }
}

/// Looks up `num_coeff_in_cg[last_y][last_x]` from the coefficient
/// group's inverse diagonal scan — used to seed the subblock-index
/// loop from `last_significant_coeff_{x,y}` (per `ff_hevc_hls_residual_coding`).
pub fn num_subblocks_before(log2_trafo_size: u32, cg_last_x: usize, cg_last_y: usize) -> usize {
    match log2_trafo_size {
        2 => 0,
        3 => DIAG_SCAN2X2_INV[cg_last_y][cg_last_x] as usize,
        4 => DIAG_SCAN4X4_INV[cg_last_y][cg_last_x] as usize,
        5 => DIAG_SCAN8X8_INV[cg_last_y][cg_last_x] as usize,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diag4x4_forward_matches_inverse() {
        for y in 0..4 {
            for x in 0..4 {
                let idx = DIAG_SCAN4X4_INV[y][x] as usize;
                assert_eq!(DIAG_SCAN4X4_X[idx] as usize, x);
                assert_eq!(DIAG_SCAN4X4_Y[idx] as usize, y);
            }
        }
    }

    #[test]
    fn diag8x8_forward_matches_inverse() {
        for y in 0..8 {
            for x in 0..8 {
                let idx = DIAG_SCAN8X8_INV[y][x] as usize;
                assert_eq!(DIAG_SCAN8X8_X[idx] as usize, x);
                assert_eq!(DIAG_SCAN8X8_Y[idx] as usize, y);
            }
        }
    }

    #[test]
    fn horiz_8x8_inv_is_a_permutation_of_0_to_63() {
        let mut seen = [false; 64];
        for row in HORIZ_SCAN8X8_INV.iter() {
            for &v in row.iter() {
                seen[v as usize] = true;
            }
        }
        assert!(seen.iter().all(|&b| b));
    }
}
