//! Cosine similarity against the hub document.

use crate::db::Chunk;
use crate::memory::paths;

/// Cosine similarity in `[-1, 1]`. A zero-magnitude input yields `0.0`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Element-wise mean. `None` for an empty set.
pub fn mean_vector<'a>(vectors: impl IntoIterator<Item = &'a [f64]>) -> Option<Vec<f64>> {
    let mut sum: Option<Vec<f64>> = None;
    let mut count = 0usize;
    for v in vectors {
        let acc = sum.get_or_insert_with(|| vec![0.0; v.len()]);
        for (a, x) in acc.iter_mut().zip(v) {
            *a += x;
        }
        count += 1;
    }
    sum.map(|mut acc| {
        for a in &mut acc {
            *a /= count as f64;
        }
        acc
    })
}

/// Similarity of every chunk to the mean hub embedding, rescaled to `[0, 1]`.
///
/// Hub chunks score `1.0`. Without any hub chunk every score is `0.0`.
pub fn hub_similarities(chunks: &[Chunk]) -> Vec<f64> {
    let hub_mean = mean_vector(
        chunks
            .iter()
            .filter(|c| paths::is_hub(&c.path))
            .map(|c| c.embedding.as_slice()),
    );

    let Some(hub_mean) = hub_mean else {
        return vec![0.0; chunks.len()];
    };

    chunks
        .iter()
        .map(|c| {
            if paths::is_hub(&c.path) {
                1.0
            } else {
                (cosine_similarity(&c.embedding, &hub_mean) + 1.0) / 2.0
            }
        })
        .collect()
}
