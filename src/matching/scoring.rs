/// Sequences shorter than this never match anything
pub const MIN_SEQUENCE_LENGTH: usize = 50;

/// Convert usize count to f64 with explicit precision loss allowance
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Positional sliding-window similarity of two sequences, in [0, 1].
///
/// Returns 0.0 when either sequence is shorter than [`MIN_SEQUENCE_LENGTH`].
/// Cost is O(n·m·min(n, m)); one of the two offset ranges always has a single
/// value because the window spans the whole shorter sequence.
#[must_use]
pub fn calculate_similarity(seq1: &[u8], seq2: &[u8]) -> f64 {
    if seq1.len() < MIN_SEQUENCE_LENGTH || seq2.len() < MIN_SEQUENCE_LENGTH {
        return 0.0;
    }

    let window = seq1.len().min(seq2.len());
    let mut max_matches = 0usize;

    'outer: for i in 0..=seq1.len() - window {
        let window1 = &seq1[i..i + window];

        for j in 0..=seq2.len() - window {
            let window2 = &seq2[j..j + window];

            max_matches = max_matches.max(count_matches(window1, window2));
            // No pair can score above the window width
            if max_matches == window {
                break 'outer;
            }
        }
    }

    count_to_f64(max_matches) / count_to_f64(window)
}

/// Number of positions holding the same symbol in both slices
fn count_matches(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x == y).count()
}
