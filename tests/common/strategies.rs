use proptest::prelude::*;

/// Valid target names: 1..=255 characters
pub fn target_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._-]{0,254}"
}

/// Any casing of a valid state word
pub fn state_word_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("up"), Just("down")].prop_flat_map(|word| {
        proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
            word.chars()
                .zip(upper)
                .map(|(c, u)| if u { c.to_ascii_uppercase() } else { c })
                .collect::<String>()
        })
    })
}
