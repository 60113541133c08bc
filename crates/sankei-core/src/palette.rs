use crate::{Error, Result};

/// Fixed node palette at 0.7 alpha: the tab20, Dark2 and Pastel1 qualitative
/// schemes concatenated, then tab20 once more. Order is part of the contract;
/// node `i` always receives `PALETTE[i]`.
pub const PALETTE: [&str; 57] = [
    // tab20
    "rgba(31, 119, 180, 0.7)",
    "rgba(174, 199, 232, 0.7)",
    "rgba(255, 127, 14, 0.7)",
    "rgba(255, 187, 120, 0.7)",
    "rgba(44, 160, 44, 0.7)",
    "rgba(152, 223, 138, 0.7)",
    "rgba(214, 39, 40, 0.7)",
    "rgba(255, 152, 150, 0.7)",
    "rgba(148, 103, 189, 0.7)",
    "rgba(197, 176, 213, 0.7)",
    "rgba(140, 86, 75, 0.7)",
    "rgba(196, 156, 148, 0.7)",
    "rgba(227, 119, 194, 0.7)",
    "rgba(247, 182, 210, 0.7)",
    "rgba(127, 127, 127, 0.7)",
    "rgba(199, 199, 199, 0.7)",
    "rgba(188, 189, 34, 0.7)",
    "rgba(219, 219, 141, 0.7)",
    "rgba(23, 190, 207, 0.7)",
    "rgba(158, 218, 229, 0.7)",
    // Dark2
    "rgba(27, 158, 119, 0.7)",
    "rgba(217, 95, 2, 0.7)",
    "rgba(117, 112, 179, 0.7)",
    "rgba(231, 41, 138, 0.7)",
    "rgba(102, 166, 30, 0.7)",
    "rgba(230, 171, 2, 0.7)",
    "rgba(166, 118, 29, 0.7)",
    "rgba(102, 102, 102, 0.7)",
    // Pastel1
    "rgba(251, 180, 174, 0.7)",
    "rgba(179, 205, 227, 0.7)",
    "rgba(204, 235, 197, 0.7)",
    "rgba(222, 203, 228, 0.7)",
    "rgba(254, 217, 166, 0.7)",
    "rgba(255, 255, 204, 0.7)",
    "rgba(229, 216, 189, 0.7)",
    "rgba(253, 218, 236, 0.7)",
    "rgba(242, 242, 242, 0.7)",
    // tab20 again
    "rgba(31, 119, 180, 0.7)",
    "rgba(174, 199, 232, 0.7)",
    "rgba(255, 127, 14, 0.7)",
    "rgba(255, 187, 120, 0.7)",
    "rgba(44, 160, 44, 0.7)",
    "rgba(152, 223, 138, 0.7)",
    "rgba(214, 39, 40, 0.7)",
    "rgba(255, 152, 150, 0.7)",
    "rgba(148, 103, 189, 0.7)",
    "rgba(197, 176, 213, 0.7)",
    "rgba(140, 86, 75, 0.7)",
    "rgba(196, 156, 148, 0.7)",
    "rgba(227, 119, 194, 0.7)",
    "rgba(247, 182, 210, 0.7)",
    "rgba(127, 127, 127, 0.7)",
    "rgba(199, 199, 199, 0.7)",
    "rgba(188, 189, 34, 0.7)",
    "rgba(219, 219, 141, 0.7)",
    "rgba(23, 190, 207, 0.7)",
    "rgba(158, 218, 229, 0.7)",
];

/// The first `k` palette entries. Fails once the palette runs out; colors are
/// never silently reused beyond the fixed list.
pub fn colors(k: usize) -> Result<Vec<String>> {
    if k > PALETTE.len() {
        return Err(Error::PaletteExhausted {
            needed: k,
            available: PALETTE.len(),
        });
    }
    Ok(PALETTE[..k].iter().map(|c| (*c).to_string()).collect())
}
