//! The syntax-element catalog: a compile-time enumeration of every
//! CABAC-coded element this core decodes, together with its `ctxIdx`
//! offset into the context table.
//!
//! The ordering and offsets below are load-bearing: `ContextTable`
//! initialization indexes `InitTable[init_type][i]` by the same `i`
//! these offsets produce, so the catalog must stay in the order the
//! reference decoder defines it in, not alphabetical or grouped by
//! module.

/// Bins decode past this many consecutive `1`s are spec-illegal; any
/// unary prefix (last-position suffix length, MVD magnitude, coefficient
/// remainder) must terminate before reaching it.
pub const CABAC_MAX_BIN: u32 = 31;

/// Every syntax element this core can decode, in catalog order.
///
/// `CuContext`-less elements (the plain flags) still get a variant so
/// `ELEM_OFFSET[elem as usize]` is a single, uniform lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum SyntaxElement {
    SaoMergeFlag = 0,
    SaoTypeIdx,
    SaoEoClass,
    SaoBandPosition,
    SaoOffsetAbs,
    SaoOffsetSign,
    EndOfSliceFlag,
    SplitCodingUnitFlag,
    CuTransquantBypassFlag,
    SkipFlag,
    CuQpDelta,
    PredMode,
    PartMode,
    PcmFlag,
    PrevIntraLumaPredMode,
    MpmIdx,
    RemIntraLumaPredMode,
    IntraChromaPredMode,
    MergeFlag,
    MergeIdx,
    InterPredIdc,
    RefIdxL0,
    RefIdxL1,
    AbsMvdGreater0Flag,
    AbsMvdGreater1Flag,
    AbsMvdMinus2,
    MvdSignFlag,
    MvpLxFlag,
    NoResidualDataFlag,
    SplitTransformFlag,
    CbfLuma,
    CbfCbCr,
    TransformSkipFlag,
    ExplicitRdpcmFlag,
    ExplicitRdpcmDirFlag,
    LastSignificantCoeffXPrefix,
    LastSignificantCoeffYPrefix,
    LastSignificantCoeffXSuffix,
    LastSignificantCoeffYSuffix,
    SignificantCoeffGroupFlag,
    SignificantCoeffFlag,
    CoeffAbsLevelGreater1Flag,
    CoeffAbsLevelGreater2Flag,
    CoeffAbsLevelRemaining,
    CoeffSignFlag,
    Log2ResScaleAbs,
    ResScaleSignFlag,
    CuChromaQpOffsetFlag,
    CuChromaQpOffsetIdx,
}

/// Number of distinct syntax elements in the catalog.
pub const NUM_SYNTAX_ELEMENTS: usize = 48;

/// Total number of context states. Resolved from the catalog's own
/// offsets (the last element, `CuChromaQpOffsetIdx`, takes exactly one
/// context at offset 177) rather than the spec's rounded "188".
pub const CONTEXT_COUNT: usize = 178;

/// Offset to ctxIdx 0 in `InitTable`/`ContextTable::states`, indexed by
/// `SyntaxElement as usize`.
pub const ELEM_OFFSET: [usize; NUM_SYNTAX_ELEMENTS] = [
    0,   // SaoMergeFlag
    1,   // SaoTypeIdx
    2,   // SaoEoClass
    2,   // SaoBandPosition
    2,   // SaoOffsetAbs
    2,   // SaoOffsetSign
    2,   // EndOfSliceFlag
    2,   // SplitCodingUnitFlag
    5,   // CuTransquantBypassFlag
    6,   // SkipFlag
    9,   // CuQpDelta
    12,  // PredMode
    13,  // PartMode
    17,  // PcmFlag
    17,  // PrevIntraLumaPredMode
    18,  // MpmIdx
    18,  // RemIntraLumaPredMode
    18,  // IntraChromaPredMode
    20,  // MergeFlag
    21,  // MergeIdx
    22,  // InterPredIdc
    27,  // RefIdxL0
    29,  // RefIdxL1
    31,  // AbsMvdGreater0Flag
    33,  // AbsMvdGreater1Flag
    35,  // AbsMvdMinus2
    35,  // MvdSignFlag
    35,  // MvpLxFlag
    36,  // NoResidualDataFlag
    37,  // SplitTransformFlag
    40,  // CbfLuma
    42,  // CbfCbCr
    46,  // TransformSkipFlag
    48,  // ExplicitRdpcmFlag
    50,  // ExplicitRdpcmDirFlag
    52,  // LastSignificantCoeffXPrefix
    70,  // LastSignificantCoeffYPrefix
    88,  // LastSignificantCoeffXSuffix
    88,  // LastSignificantCoeffYSuffix
    88,  // SignificantCoeffGroupFlag
    92,  // SignificantCoeffFlag
    136, // CoeffAbsLevelGreater1Flag
    160, // CoeffAbsLevelGreater2Flag
    166, // CoeffAbsLevelRemaining
    166, // CoeffSignFlag
    166, // Log2ResScaleAbs
    174, // ResScaleSignFlag
    176, // CuChromaQpOffsetFlag
    177, // CuChromaQpOffsetIdx
];

impl SyntaxElement {
    #[inline]
    pub fn offset(self) -> usize {
        ELEM_OFFSET[self as usize]
    }
}

/// Picture/channel plane identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Luma,
    Cb,
    Cr,
}

impl Channel {
    #[inline]
    pub fn is_luma(self) -> bool {
        matches!(self, Channel::Luma)
    }
}

/// Coefficient scan order for a transform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanType {
    Diag,
    Horiz,
    Vert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_element_offset_plus_one_bin_matches_context_count() {
        assert_eq!(SyntaxElement::CuChromaQpOffsetIdx.offset() + 1, CONTEXT_COUNT);
    }

    #[test]
    fn offsets_are_non_decreasing() {
        for w in ELEM_OFFSET.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}
