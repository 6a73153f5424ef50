//! Score arithmetic for hybrid search. Lexical scores come from SQLite FTS5.

/// Cosine similarity; 0.0 for mismatched or zero-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Rescale into [0, 1]. A constant input maps to all ones when positive,
/// all zeros otherwise.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    scores
        .iter()
        .map(|&s| {
            if range > f32::EPSILON {
                (s - min) / range
            } else if max > 0.0 {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

/// `alpha * vector + (1 - alpha) * lexical` over normalized scores.
pub fn blend(vector: &[f32], lexical: &[f32], alpha: f32) -> Vec<f32> {
    let vector = min_max_normalize(vector);
    let lexical = min_max_normalize(lexical);

    vector
        .iter()
        .zip(&lexical)
        .map(|(v, l)| alpha * v + (1.0 - alpha) * l)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_min_max_normalize() {
        assert_eq!(min_max_normalize(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_normalize(&[0.7, 0.7]), vec![1.0, 1.0]);
        assert_eq!(min_max_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_blend_weights_vector_over_lexical() {
        // doc0 wins on vectors, doc1 wins on keywords
        let combined = blend(&[0.9, 0.1], &[0.0, 5.0], 0.7);
        assert!((combined[0] - 0.7).abs() < 1e-6);
        assert!((combined[1] - 0.3).abs() < 1e-6);
    }
}
