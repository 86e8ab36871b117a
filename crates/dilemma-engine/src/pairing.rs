//! Round-robin pairing generation
//!
//! Every unordered pair `{a, b}` of roster indices maps to exactly one match
//! index through colexicographic ranking, so a match can be looked up in O(1)
//! without materialising the full schedule.

/// Matches in a complete round robin: `C(n, 2)`
///
/// Counted in `u64`, which holds `C(u32::MAX, 2)` exactly.
pub fn round_robin_match_count(participant_count: u32) -> u64 {
    if participant_count < 2 {
        return 0;
    }
    let n = u64::from(participant_count);
    n * (n - 1) / 2
}

/// Get the pairing for a specific match index
///
/// Returns `(index_a, index_b)` with `index_a < index_b`, or `None` when
/// `match_index` is past the end of the schedule.
pub fn pairing_for_match(participant_count: u32, match_index: u64) -> Option<(u32, u32)> {
    if match_index >= round_robin_match_count(participant_count) {
        return None;
    }
    Some(unrank_pair(match_index))
}

/// Generate every pairing in match-index order
pub fn all_pairings(participant_count: u32) -> Vec<(u32, u32)> {
    (0..round_robin_match_count(participant_count))
        .map(unrank_pair)
        .collect()
}

/// Colexicographic combination unranking: rank → (a, b) with a < b.
///
/// rank = C(b,2) + a = b*(b−1)/2 + a
fn unrank_pair(rank: u64) -> (u32, u32) {
    // Estimate b via integer floor(sqrt(1 + 8·rank)); 8·rank can pass u64
    let val = 1u128 + 8 * u128::from(rank);
    let mut s = val;
    let mut t = (s + 1) / 2;
    while t < s {
        s = t;
        t = (s + val / s) / 2;
    }
    let mut b = ((1 + s) / 2) as u64;

    while b > 0 && b * (b - 1) / 2 > rank {
        b -= 1;
    }
    while (b + 1) * b / 2 <= rank {
        b += 1;
    }

    let a = rank - b * (b - 1) / 2;
    (a as u32, b as u32)
}
