/// Spot and lot identifier normalization.
///
/// The provider is instructed to canonicalize identifiers ("spot a five" ->
/// "A5") but transcripts and model output both arrive noisy, so the same
/// rules are applied again on the way out.

/// Collapse whitespace out of a spoken spot id and uppercase it.
///
/// `"c 12"` becomes `"C12"`, `"lot_a-s5"` becomes `"LOT_A-S5"`.
pub fn normalize_spot_id(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Map a free-text lot name to its canonical internal id.
///
/// The table is fixed: the product has three canonical lots and the assistant
/// resolves common names onto them. Unrecognized names pass through untouched.
pub fn canonical_lot_id(name: &str) -> Option<&'static str> {
    let lowered = name.to_ascii_lowercase();
    CANONICAL_LOTS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, id)| *id)
}

const CANONICAL_LOTS: [(&str, &str); 3] = [
    ("downtown", "lot_A"),
    ("airport", "lot_B"),
    ("mall", "lot_C"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spoken_spot_ids() {
        assert_eq!(normalize_spot_id("c 12"), "C12");
        assert_eq!(normalize_spot_id(" lot_a-s5 "), "LOT_A-S5");
        assert_eq!(normalize_spot_id("A5"), "A5");
    }

    #[test]
    fn maps_known_lot_names() {
        assert_eq!(canonical_lot_id("Downtown Garage"), Some("lot_A"));
        assert_eq!(canonical_lot_id("the airport lot"), Some("lot_B"));
        assert_eq!(canonical_lot_id("Westfield Mall"), Some("lot_C"));
    }

    #[test]
    fn passes_unknown_lot_names_through() {
        assert_eq!(canonical_lot_id("Harbor Garage"), None);
    }
}
