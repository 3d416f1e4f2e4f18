//! Content-addressed decorative tags for endpoint groups.
//!
//! The tag is a pure function of the group key, so it survives refetches and
//! process restarts without a lookup table. Distinct keys may share a tag.
//! The key is summed over its UTF-16 code units, so characters outside the
//! Basic Multilingual Plane contribute both surrogate halves.

/// Fixed tag palette. Order is part of the contract.
pub const VISUAL_TAG_PALETTE: [&str; 20] = [
    "📊", "📈", "🚀", "💡", "✨", "🔍", "📱", "💻", "🎨", "🛠️", "⚙️", "🔧", "🔨", "📌", "📋", "📂",
    "📁", "🗃️", "🗄️", "📮",
];

/// Derive the display tag for a group key.
///
/// ```
/// use api_catalog::domain::visual_tag_for_key;
///
/// assert_eq!(visual_tag_for_key("/api/v1"), visual_tag_for_key("/api/v1"));
/// ```
#[must_use]
pub fn visual_tag_for_key(key: &str) -> &'static str {
    let sum = key
        .encode_utf16()
        .fold(0_u64, |acc, unit| acc.wrapping_add(u64::from(unit)));
    let palette_len = u64::try_from(VISUAL_TAG_PALETTE.len()).unwrap_or(u64::MAX);
    sum.checked_rem(palette_len)
        .and_then(|slot| usize::try_from(slot).ok())
        .and_then(|slot| VISUAL_TAG_PALETTE.get(slot).copied())
        .unwrap_or("📌")
}

#[cfg(test)]
mod tests {
    //! Stability checks for tag derivation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    // '/'+'a'+'p'+'i'+'/'+'v'+'1' = 575, 575 % 20 = 15
    #[case("/api/v1", "📂")]
    // '/' = 47, 47 % 20 = 7
    #[case("/", "💻")]
    // empty key sums to zero
    #[case("", "📊")]
    // surrogate pair 0xD83D + 0xDE00 = 112189, 112189 % 20 = 9
    #[case("😀", "🛠️")]
    fn maps_keys_to_palette_slots(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(visual_tag_for_key(key), expected);
    }

    #[test]
    fn same_key_yields_same_tag() {
        for key in ["/api/v1/users", "/admin/stats", "/health"] {
            let first = visual_tag_for_key(key);
            let again = visual_tag_for_key(&key.to_owned());
            assert_eq!(first, again);
        }
    }

    #[test]
    fn tags_come_from_palette() {
        for key in ["/a", "/b", "/api/v1/orders", "/ünïcode"] {
            assert!(VISUAL_TAG_PALETTE.contains(&visual_tag_for_key(key)));
        }
    }
}
