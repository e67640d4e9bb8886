// Per-character text glitching.
// Visual: a few characters of a line are swapped for random symbols. The
// result is recomputed on every call, so a line drawn every frame shimmers
// even though its text never changes. Do not cache it per line.

use rand::Rng;

/// Returns a copy of `text` where every non-space character is replaced,
/// with probability `chance`, by a uniformly chosen member of `charset`.
/// `chance` is clamped to [0, 1]; an empty charset leaves the text untouched.
pub fn glitch<R: Rng + ?Sized>(text: &str, chance: f64, charset: &[char], rng: &mut R) -> String {
    let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
    if chance == 0.0 || charset.is_empty() {
        return text.to_string();
    }
    text.chars()
        .map(|c| {
            if c != ' ' && rng.random::<f64>() < chance {
                charset[rng.random_range(0..charset.len())]
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_GLITCH_CHARSET;
    use crate::rng::FxRng;
    use rand::SeedableRng;

    #[test]
    fn zero_chance_is_identity() {
        let mut rng = FxRng::seed_from_u64(1);
        let cs: Vec<char> = DEFAULT_GLITCH_CHARSET.chars().collect();
        assert_eq!(glitch("Memory Test: 16384K OK", 0.0, &cs, &mut rng), "Memory Test: 16384K OK");
    }

    #[test]
    fn full_chance_replaces_all_but_spaces() {
        let mut rng = FxRng::seed_from_u64(2);
        assert_eq!(glitch("AB CD", 1.0, &['#'], &mut rng), "## ##");
    }

    #[test]
    fn output_keeps_char_count() {
        let mut rng = FxRng::seed_from_u64(3);
        let cs: Vec<char> = "xyz".chars().collect();
        let out = glitch("  IDE0: Quantum Fireball 512MB", 0.5, &cs, &mut rng);
        assert_eq!(out.chars().count(), 30);
        assert!(out.starts_with("  "));
    }

    #[test]
    fn pattern_changes_between_calls() {
        let mut rng = FxRng::seed_from_u64(4);
        let cs: Vec<char> = DEFAULT_GLITCH_CHARSET.chars().collect();
        let line = "CYBERPUNK SYSTEMS BIOS v3.2 Copyright (C) 2045 Night City";
        let frames: Vec<String> = (0..10).map(|_| glitch(line, 0.3, &cs, &mut rng)).collect();
        assert!(frames.windows(2).any(|w| w[0] != w[1]));
    }
}
