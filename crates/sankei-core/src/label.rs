/// Strips the literal `_a` / `_b` markers used to keep duplicate category
/// names unique across stages. Replacement applies everywhere in the string,
/// matching the original encoding convention.
pub fn display_label(raw: &str) -> String {
    raw.replace("_a", "").replace("_b", "")
}

/// Display label annotated with the node's aggregate total.
pub fn display_label_with_total(raw: &str, total: u64) -> String {
    format!("{} ({total})", display_label(raw))
}
