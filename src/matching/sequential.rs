use strsim::sorensen_dice;
use unicode_normalization::UnicodeNormalization;

/// Score awarded when the candidate contains the query verbatim.
pub const CONTAINS_SCORE: f32 = 0.99;
/// Floor applied when every query character was found in order.
pub const IN_ORDER_FLOOR: f32 = 0.85;
const LENGTH_PENALTY_STEP: f32 = 0.1;

/// NFKC fold, trim, upper-case. Full-width OCR output compares equal to ASCII.
pub fn normalize(s: &str) -> String {
    s.nfkc().collect::<String>().trim().to_uppercase()
}

/// In-order character correspondence between a noisy query and a candidate.
///
/// Walks both strings once, advancing the query only on a match and the
/// candidate on every step. The matched fraction is reduced by 0.1 for each
/// character of length difference beyond the first, and floored at 0.85 when
/// the whole query was consumed.
pub fn sequential_character_match(query: &str, candidate: &str) -> f32 {
    let p = normalize(query);
    let c = normalize(candidate);
    if p == c {
        return 1.0;
    }
    if p.is_empty() || c.is_empty() {
        return 0.0;
    }
    if c.contains(&p) {
        return CONTAINS_SCORE;
    }

    let p: Vec<char> = p.chars().collect();
    let c: Vec<char> = c.chars().collect();
    let (mut i, mut j, mut matched) = (0usize, 0usize, 0usize);
    while i < p.len() && j < c.len() {
        if p[i] == c[j] {
            matched += 1;
            i += 1;
        }
        j += 1;
    }

    let base = matched as f32 / p.len() as f32;
    let length_diff = p.len().abs_diff(c.len());
    let penalty = if length_diff > 1 {
        (length_diff - 1) as f32 * LENGTH_PENALTY_STEP
    } else {
        0.0
    };
    let sim = (base - penalty).max(0.0);
    if matched == p.len() {
        sim.max(IN_ORDER_FLOOR)
    } else {
        sim
    }
}

/// Bigram Sørensen–Dice similarity over normalized strings.
pub fn dice_match(query: &str, candidate: &str) -> f32 {
    let p = normalize(query);
    let c = normalize(candidate);
    if p == c {
        return 1.0;
    }
    if p.is_empty() || c.is_empty() {
        return 0.0;
    }
    sorensen_dice(&p, &c) as f32
}
