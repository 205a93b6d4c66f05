//! Row vectors and cosine similarity.
//!
//! Embeddings are dense; TF-IDF rows are sparse with strictly increasing
//! indices. Similarity between vectors of different kinds is `0.0`, as is
//! similarity involving a zero-norm vector, so scores are always finite.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs in any order. Duplicate indices are summed
    /// and explicit zeros dropped.
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_by_key(|(i, _)| *i);
        let mut out = Self::default();
        for (i, v) in pairs {
            if out.indices.last() == Some(&i) {
                if let Some(last) = out.values.last_mut() { *last += v; }
            } else {
                out.indices.push(i);
                out.values.push(v);
            }
        }
        let (indices, values): (Vec<u32>, Vec<f32>) = out
            .indices
            .into_iter()
            .zip(out.values)
            .filter(|(_, v)| *v != 0.0)
            .unzip();
        Self { indices, values }
    }

    pub fn nnz(&self) -> usize { self.indices.len() }

    pub fn norm(&self) -> f32 { self.values.iter().map(|v| v * v).sum::<f32>().sqrt() }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut acc) = (0usize, 0usize, 0f32);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Vector {
    Dense(Vec<f32>),
    Sparse(SparseVector),
}

impl Vector {
    pub fn norm(&self) -> f32 {
        match self {
            Vector::Dense(v) => v.iter().map(|x| x * x).sum::<f32>().sqrt(),
            Vector::Sparse(s) => s.norm(),
        }
    }

    pub fn is_zero(&self) -> bool { self.norm() == 0.0 }
}

/// `dot(a, b) / (|a| * |b|)`, or `0.0` when either norm is zero, the kinds
/// differ, dense lengths differ, or the result is not finite.
pub fn cosine_similarity(a: &Vector, b: &Vector) -> f32 {
    let dot = match (a, b) {
        (Vector::Dense(x), Vector::Dense(y)) if x.len() == y.len() => {
            x.iter().zip(y).map(|(p, q)| p * q).sum::<f32>()
        }
        (Vector::Sparse(x), Vector::Sparse(y)) => x.dot(y),
        _ => return 0.0,
    };
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    let sim = dot / denom;
    if sim.is_finite() { sim } else { 0.0 }
}
