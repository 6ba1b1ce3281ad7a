//! Cosine similarity between query and content embeddings.
//!
//! [`SimilarityMatrix`] holds one row per query and one column per content vector, stored
//! row-major. Selection helpers ([`top_k`], [`argmax`]) operate on a single row.

#[cfg(test)]
mod tests;

use crate::embedding::Embedding;

/// Cosine similarity of two vectors.
///
/// Returns `0.0` for mismatched lengths, empty inputs and zero-norm vectors.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Dense `rows × cols` matrix of cosine similarities.
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Computes `matrix[i][j] = cosine(queries[i], contents[j])`.
    ///
    /// Either side empty yields an empty matrix.
    pub fn compute(queries: &[Embedding], contents: &[Embedding]) -> Self {
        if queries.is_empty() || contents.is_empty() {
            return Self::default();
        }

        let mut values = Vec::with_capacity(queries.len() * contents.len());
        for query in queries {
            for content in contents {
                values.push(cosine_similarity(query, content));
            }
        }

        Self {
            rows: queries.len(),
            cols: contents.len(),
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Similarities of query `index` against every content vector.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.cols;
        self.values.get(start..start + self.cols)
    }

    /// Single cell lookup.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.row(row).and_then(|r| r.get(col).copied())
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.cols.max(1)).take(self.rows)
    }
}

/// The `k` highest scores in `row` that are strictly above `min_score`.
///
/// Results are ordered by descending score; equal scores keep the lower index first.
pub fn top_k(row: &[f32], k: usize, min_score: f32) -> Vec<(usize, f32)> {
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score > min_score)
        .collect();

    // Stable sort keeps index order among equal scores.
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(k);
    candidates
}

/// Index of the first maximum in `row`, or `None` when empty.
pub fn argmax(row: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in row.iter().enumerate() {
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Largest value in `row` (`0.0` when empty).
pub fn row_max(row: &[f32]) -> f32 {
    argmax(row).map_or(0.0, |index| row[index])
}
