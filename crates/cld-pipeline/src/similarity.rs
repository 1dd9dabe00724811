//! Embedding similarity: cosine math, transitive grouping, concurrent fetch
//!
//! Grouping uses a union-find over all candidate pairs rather than the
//! greedy first-match scan, so clustering is transitive and independent of
//! pair order.

use crate::error::PipelineError;
use cld_domain::Embedder;
use std::fmt::Display;
use std::sync::Arc;

/// Cosine similarity between two vectors.
///
/// Returns `None` when either vector has zero magnitude or the lengths
/// differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return None;
    }
    Some(dot / (mag_a * mag_b))
}

/// L2-normalize a vector; a zero vector comes back unchanged.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let mag = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / mag).collect()
}

/// Disjoint-set forest with path compression and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Cluster names whose pairwise cosine similarity reaches `threshold`.
///
/// Vectors are L2-normalized first, so the pairwise dot product equals the
/// cosine similarity. Groups are the connected components over candidate
/// pairs; only components with at least two members are returned, ordered by
/// their first member's position, members in input order.
pub fn similarity_groups(
    names: &[String],
    vectors: &[Vec<f32>],
    threshold: f64,
) -> Vec<Vec<String>> {
    debug_assert_eq!(names.len(), vectors.len());
    let normalized: Vec<Vec<f32>> = vectors.iter().map(|v| l2_normalize(v)).collect();

    let n = names.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let dot: f32 = normalized[i].iter().zip(&normalized[j]).map(|(a, b)| a * b).sum();
            if f64::from(dot) >= threshold {
                uf.union(i, j);
            }
        }
    }

    let mut groups: Vec<(usize, Vec<String>)> = Vec::new();
    for i in 0..n {
        let root = uf.find(i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(names[i].clone()),
            None => groups.push((root, vec![names[i].clone()])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(_, members)| members)
        .collect()
}

/// Fetch one embedding per input concurrently and await them jointly.
///
/// Each fetch is independent (one vector keyed by its input string), so the
/// calls fan out onto blocking tasks; results come back in input order.
pub async fn embed_all<E>(
    embedder: &Arc<E>,
    texts: &[String],
    model: Option<&str>,
) -> Result<Vec<Vec<f32>>, PipelineError>
where
    E: Embedder + Send + Sync + 'static,
    E::Error: Display,
{
    let mut handles = Vec::with_capacity(texts.len());
    for text in texts {
        let embedder = Arc::clone(embedder);
        let text = text.clone();
        let model = model.map(str::to_string);
        handles.push(tokio::task::spawn_blocking(move || {
            embedder
                .embed(&text, model.as_deref())
                .map_err(|e| PipelineError::Embedder(e.to_string()))
        }));
    }

    let mut vectors = Vec::with_capacity(handles.len());
    for handle in handles {
        let vector = handle
            .await
            .map_err(|e| PipelineError::Embedder(format!("Task join error: {}", e)))??;
        vectors.push(vector);
    }
    Ok(vectors)
}
