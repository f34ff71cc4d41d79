//! Wavefront (WPP) save/restore and tile-boundary reinitialization
//! (scenario seeds 5-6). No CABAC bitstream is involved here: the
//! context-table snapshot mechanism is pure state management, so these
//! run against the public `ContextTable`/`WppState` API directly.

use hevc_cabac::context::{ContextTable, InitType};
use hevc_cabac::wpp::{reinit_tile_boundary, WppState};

#[test]
fn wpp_row_restore_matches_the_snapshot_taken_after_ctb_two() {
    let mut ctx = ContextTable::new(InitType::P, 30);
    let mut wpp = WppState::new();

    // CTB 2 of row 0 in a 4-CTB-wide picture: snapshot is taken here.
    wpp.save_if_needed(&ctx, 2, 4, true);
    let snapshot_at_ctb_two = ctx.snapshot();

    // The rest of row 0 mutates context state.
    *ctx.get(20) = 0;
    *ctx.get(100) = 1;
    ctx.stat_coeff[2] = 9;

    // CTB 0 of row 1 (not the picture's first CTB): loads the snapshot.
    wpp.load_row_start(&mut ctx, 0, 4, false, InitType::P, 30);

    assert!(ctx.snapshot() == snapshot_at_ctb_two);
}

#[test]
fn wpp_does_not_touch_context_state_off_the_row_boundary() {
    let mut ctx = ContextTable::new(InitType::I, 26);
    let wpp = WppState::new();
    *ctx.get(0) = 3;
    let before = ctx.snapshot();
    // Neither at column 0, nor the picture's first CTB.
    wpp.load_row_start(&mut ctx, 1, 4, false, InitType::I, 26);
    assert!(ctx.snapshot() == before);
}

#[test]
fn single_ctb_wide_picture_reinitializes_each_row_instead_of_restoring() {
    let mut ctx = ContextTable::new(InitType::B, 22);
    *ctx.get(0) = 3;
    let wpp = WppState::new();
    wpp.load_row_start(&mut ctx, 0, 1, false, InitType::B, 22);
    let fresh = ContextTable::new(InitType::B, 22);
    assert!(ctx.snapshot() == fresh.snapshot());
}

#[test]
fn tile_boundary_reinitializes_context_state_regardless_of_wpp() {
    let mut ctx = ContextTable::new(InitType::P, 35);
    *ctx.get(50) = 7;
    ctx.stat_coeff[1] = 4;
    ctx = reinit_tile_boundary(InitType::P, 35);
    let fresh = ContextTable::new(InitType::P, 35);
    assert!(ctx.snapshot() == fresh.snapshot());
}
