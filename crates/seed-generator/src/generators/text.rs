//! Filler text generators.

use super::pick;
use super::vocab::WORDS;
use rand::Rng;

/// A sentence of exactly `words` words, capitalized and ending in a period.
pub fn generate_sentence<R: Rng>(rng: &mut R, words: usize) -> String {
    let words = words.max(1);
    let mut sentence = String::new();
    for i in 0..words {
        let word = pick(rng, WORDS);
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                sentence.extend(first.to_uppercase());
                sentence.push_str(chars.as_str());
            }
        } else {
            sentence.push(' ');
            sentence.push_str(word);
        }
    }
    sentence.push('.');
    sentence
}

/// `sentences` sentences of 4 to 10 words each.
pub fn generate_paragraph<R: Rng>(rng: &mut R, sentences: usize) -> String {
    (0..sentences.max(1))
        .map(|_| {
            let words = rng.gen_range(4..=10);
            generate_sentence(rng, words)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sentences up to `max_chars` characters in total.
///
/// Always returns at least one sentence, cut to `max_chars` if a single
/// sentence would not fit.
pub fn generate_text<R: Rng>(rng: &mut R, max_chars: usize) -> String {
    let mut text = String::new();
    loop {
        let words = rng.gen_range(4..=10);
        let sentence = generate_sentence(rng, words);
        let needed = if text.is_empty() {
            sentence.chars().count()
        } else {
            text.chars().count() + 1 + sentence.chars().count()
        };
        if needed > max_chars {
            break;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&sentence);
    }
    if text.is_empty() {
        let sentence = generate_sentence(rng, 4);
        text = sentence.chars().take(max_chars).collect();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sentence_word_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let sentence = generate_sentence(&mut rng, 8);
        assert_eq!(sentence.split(' ').count(), 8);
        assert!(sentence.ends_with('.'));
        assert!(sentence.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_paragraph_sentence_count() {
        let mut rng = StdRng::seed_from_u64(42);
        let paragraph = generate_paragraph(&mut rng, 2);
        assert_eq!(paragraph.matches('.').count(), 2);
    }

    #[test]
    fn test_text_is_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let text = generate_text(&mut rng, 200);
            assert!(!text.is_empty());
            assert!(text.chars().count() <= 200);
        }
        let tiny = generate_text(&mut rng, 5);
        assert!(tiny.chars().count() <= 5);
    }
}
