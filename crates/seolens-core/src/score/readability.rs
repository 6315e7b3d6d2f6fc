//! Flesch-Kincaid grade-level approximation.
//!
//! Syllables are approximated by counting vowel groups per word rather than
//! consulting a dictionary, which is accurate enough to bucket pages into
//! reading levels.

use crate::types::Readability;

/// Score the flattened page text.
pub fn analyze_readability(text: &str) -> Readability {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let words: Vec<&str> = text.split_whitespace().collect();

    if sentences.is_empty() || words.is_empty() {
        return Readability {
            reading_level: "Easy".to_string(),
            ..Default::default()
        };
    }

    let total_syllables: usize = words.iter().map(|w| syllable_count(w)).sum();

    let avg_words_per_sentence = words.len() as f64 / sentences.len() as f64;
    let avg_syllables_per_word = total_syllables as f64 / words.len() as f64;

    let raw = 0.39 * avg_words_per_sentence + 11.8 * avg_syllables_per_word - 15.59;
    let flesch_kincaid = (raw * 10.0).round() / 10.0;

    Readability {
        flesch_kincaid,
        avg_words_per_sentence,
        avg_syllables_per_word,
        sentence_count: sentences.len(),
        word_count: words.len(),
        reading_level: reading_level(flesch_kincaid).to_string(),
    }
}

/// Bucket a grade-level score into a reading-level label.
pub fn reading_level(score: f64) -> &'static str {
    if score >= 12.0 {
        "Very Difficult"
    } else if score >= 10.0 {
        "Difficult"
    } else if score >= 8.0 {
        "Fairly Difficult"
    } else if score >= 6.0 {
        "Standard"
    } else if score >= 4.0 {
        "Fairly Easy"
    } else {
        "Easy"
    }
}

/// Vowel-group count, minimum one syllable per word.
fn syllable_count(word: &str) -> usize {
    let mut groups = 0;
    let mut in_group = false;

    for ch in word.chars() {
        let is_vowel = matches!(
            ch.to_ascii_lowercase(),
            'a' | 'e' | 'i' | 'o' | 'u' | 'y'
        );
        if is_vowel && !in_group {
            groups += 1;
        }
        in_group = is_vowel;
    }

    groups.max(1)
}
