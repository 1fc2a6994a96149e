//! The 2048-word dictionary shared by mnemonics and the v1 word encoder.
//!
//! We use the standard BIP-39 English list as shipped by the `bip39`
//! crate, so a mnemonic written here can be checked by any BIP-39 tool.
//! Lookups are case-insensitive; the list itself is lowercase ASCII.

use bip39::Language;

use crate::config::WORDLIST_SIZE;

/// The full dictionary, index-ordered.
pub fn words() -> &'static [&'static str; WORDLIST_SIZE] {
    Language::English.word_list()
}

/// Dictionary word for an 11-bit index. Panics on out-of-range input, which
/// only an internal bit-packing bug could produce.
pub fn word_at(index: u32) -> &'static str {
    words()[index as usize]
}

/// Case-insensitive index lookup.
pub fn index_of(word: &str) -> Option<u16> {
    if word.bytes().any(|b| b.is_ascii_uppercase()) {
        Language::English.find_word(&word.to_ascii_lowercase())
    } else {
        Language::English.find_word(word)
    }
}

/// True if `word` is a dictionary entry, ignoring case.
pub fn contains(word: &str) -> bool {
    index_of(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_has_expected_bounds() {
        assert_eq!(words().len(), 2048);
        assert_eq!(word_at(0), "abandon");
        assert_eq!(word_at(3), "about");
        assert_eq!(word_at(2047), "zoo");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(index_of("abandon"), Some(0));
        assert_eq!(index_of("ABANDON"), Some(0));
        assert_eq!(index_of("Zoo"), Some(2047));
    }

    #[test]
    fn unknown_words_are_rejected() {
        assert!(!contains("covenant"));
        assert!(!contains(""));
        assert!(!contains("abandon "));
    }
}
