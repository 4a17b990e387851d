//! Small undirected graphs and their Laplacian spectra.
//!
//! Graphs here never exceed a few hundred nodes, so the Laplacian is
//! assembled from a sparse adjacency and then decomposed densely.

use crate::rng::choose_distinct;
use anyhow::{bail, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Eigenvalues at or below this are treated as the Laplacian null space.
const ZERO_EIGENVALUE_TOL: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    neighbors: Vec<BTreeSet<usize>>,
    weights: BTreeMap<(usize, usize), f64>,
}

fn edge_key(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Graph {
    pub fn empty(n: usize) -> Self {
        Self {
            neighbors: vec![BTreeSet::new(); n],
            weights: BTreeMap::new(),
        }
    }

    /// Small-world graph: a ring lattice where every node links to `k / 2`
    /// neighbours on each side, then each lattice edge is rewired with probability `p`.
    pub fn watts_strogatz(rng: &mut impl Rng, n: usize, k: usize, p: f64) -> Result<Self> {
        if k >= n {
            bail!("Watts-Strogatz needs k < n, got k = {k}, n = {n}.");
        }
        if !(0.0..=1.0).contains(&p) {
            bail!("Rewiring probability must lie in [0, 1], got {p}.");
        }
        let mut graph = Self::empty(n);
        let half = k / 2;
        for j in 1..=half {
            for u in 0..n {
                graph.add_edge(u, (u + j) % n)?;
            }
        }
        for j in 1..=half {
            for u in 0..n {
                let v = (u + j) % n;
                if rng.random::<f64>() >= p {
                    continue;
                }
                if graph.degree(u) >= n - 1 {
                    continue;
                }
                let mut w = rng.random_range(0..n);
                while w == u || graph.has_edge(u, w) {
                    w = rng.random_range(0..n);
                }
                graph.remove_edge(u, v);
                graph.add_edge(u, w)?;
            }
        }
        Ok(graph)
    }

    /// G(n, p) random graph.
    pub fn erdos_renyi(rng: &mut impl Rng, n: usize, p: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            bail!("Edge probability must lie in [0, 1], got {p}.");
        }
        let mut graph = Self::empty(n);
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.random::<f64>() < p {
                    graph.add_edge(u, v)?;
                }
            }
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn degree(&self, u: usize) -> usize {
        self.neighbors.get(u).map_or(0, BTreeSet::len)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.weights.contains_key(&edge_key(u, v))
    }

    /// Adds an unweighted edge. Adding an existing edge keeps its weight.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        let n = self.node_count();
        if u >= n || v >= n {
            bail!("Edge ({u}, {v}) is out of range for {n} nodes.");
        }
        if u == v {
            bail!("Self-loops are not allowed (node {u}).");
        }
        self.neighbors[u].insert(v);
        self.neighbors[v].insert(u);
        self.weights.entry(edge_key(u, v)).or_insert(1.0);
        Ok(())
    }

    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        if self.weights.remove(&edge_key(u, v)).is_none() {
            return false;
        }
        self.neighbors[u].remove(&v);
        self.neighbors[v].remove(&u);
        true
    }

    pub fn set_weight(&mut self, u: usize, v: usize, weight: f64) -> Result<()> {
        match self.weights.get_mut(&edge_key(u, v)) {
            Some(w) => {
                *w = weight;
                Ok(())
            }
            None => bail!("Edge ({u}, {v}) does not exist."),
        }
    }

    /// Edges as `(u, v)` with `u < v`, in ascending order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.weights.keys().copied().collect()
    }

    pub fn adjacency(&self) -> CsrMatrix<f64> {
        let n = self.node_count();
        let mut coo = CooMatrix::new(n, n);
        for (&(u, v), &w) in &self.weights {
            coo.push(u, v, w);
            coo.push(v, u, w);
        }
        CsrMatrix::from(&coo)
    }

    /// Weighted Laplacian `D - A`.
    pub fn laplacian(&self) -> DMatrix<f64> {
        let n = self.node_count();
        let mut laplacian = DMatrix::zeros(n, n);
        for (i, j, &w) in self.adjacency().triplet_iter() {
            laplacian[(i, j)] -= w;
            laplacian[(i, i)] += w;
        }
        laplacian
    }

    pub fn laplacian_spectrum(&self) -> DVector<f64> {
        SymmetricEigen::new(self.laplacian()).eigenvalues
    }

    /// Von Neumann entropy of the normalized non-zero Laplacian spectrum (natural log).
    pub fn spectral_entropy(&self) -> f64 {
        let positive: Vec<f64> = self
            .laplacian_spectrum()
            .iter()
            .copied()
            .filter(|&lambda| lambda > ZERO_EIGENVALUE_TOL)
            .collect();
        let total: f64 = positive.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        positive
            .iter()
            .map(|&lambda| {
                let p = lambda / total;
                -p * p.ln()
            })
            .sum::<f64>()
            .max(0.0)
    }

    /// Average inverse shortest-path length over ordered node pairs.
    /// Disconnected pairs contribute zero.
    pub fn global_efficiency(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for source in 0..n {
            for (target, dist) in self.bfs_distances(source).into_iter().enumerate() {
                if target != source {
                    if let Some(d) = dist {
                        total += 1.0 / d as f64;
                    }
                }
            }
        }
        total / (n * (n - 1)) as f64
    }

    fn bfs_distances(&self, source: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.node_count()];
        let mut queue = VecDeque::new();
        dist[source] = Some(0);
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let next = dist[u].map_or(0, |d| d + 1);
            for &v in &self.neighbors[u] {
                if dist[v].is_none() {
                    dist[v] = Some(next);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    /// Removes one random edge (if any) and links two distinct random nodes.
    pub fn rewire_random_edge(&mut self, rng: &mut impl Rng) -> Result<()> {
        let n = self.node_count();
        if n < 2 {
            bail!("Graph needs at least 2 nodes to rewire.");
        }
        let edges = self.edges();
        if !edges.is_empty() {
            let (u, v) = edges[rng.random_range(0..edges.len())];
            self.remove_edge(u, v);
        }
        let pair = choose_distinct(rng, n, 2)?;
        self.add_edge(pair[0], pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn complete(n: usize) -> Graph {
        let mut graph = Graph::empty(n);
        for u in 0..n {
            for v in (u + 1)..n {
                graph.add_edge(u, v).expect("valid edge");
            }
        }
        graph
    }

    #[test]
    fn ring_lattice_without_rewiring() {
        let mut rng = seeded(1);
        let graph = Graph::watts_strogatz(&mut rng, 20, 6, 0.0).expect("valid parameters");
        assert_eq!(graph.edge_count(), 20 * 3);
        for u in 0..20 {
            assert_eq!(graph.degree(u), 6);
        }
        assert!(graph.has_edge(0, 19));
        assert!(graph.has_edge(0, 3));
        assert!(!graph.has_edge(0, 4));
    }

    #[test]
    fn rewiring_preserves_edge_count() {
        let mut rng = seeded(137);
        let graph = Graph::watts_strogatz(&mut rng, 150, 6, 0.1).expect("valid parameters");
        assert_eq!(graph.edge_count(), 450);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let mut rng = seeded(1);
        assert!(Graph::watts_strogatz(&mut rng, 5, 6, 0.1).is_err());
        assert!(Graph::erdos_renyi(&mut rng, 5, 1.5).is_err());
        let mut graph = Graph::empty(3);
        assert!(graph.add_edge(1, 1).is_err());
        assert!(graph.add_edge(0, 3).is_err());
    }

    #[test]
    fn laplacian_rows_sum_to_zero() {
        let mut rng = seeded(42);
        let mut graph = Graph::erdos_renyi(&mut rng, 30, 0.2).expect("valid parameters");
        if let Some(&(u, v)) = graph.edges().first() {
            graph.set_weight(u, v, 0.37).expect("edge exists");
        }
        let laplacian = graph.laplacian();
        for i in 0..30 {
            let row_sum: f64 = laplacian.row(i).iter().sum();
            assert!(row_sum.abs() < 1e-12);
        }
        assert_eq!(laplacian, laplacian.transpose());
    }

    #[test]
    fn complete_graph_metrics() {
        let graph = complete(6);
        assert!((graph.global_efficiency() - 1.0).abs() < 1e-12);
        // K_n has spectrum {0, n (multiplicity n - 1)}: uniform over n - 1 values.
        let expected = (5.0f64).ln();
        assert!((graph.spectral_entropy() - expected).abs() < 1e-9);
    }

    #[test]
    fn efficiency_of_path_and_disconnected_graphs() {
        let mut path = Graph::empty(3);
        path.add_edge(0, 1).expect("valid edge");
        path.add_edge(1, 2).expect("valid edge");
        // Pairs: four at distance 1, two at distance 2.
        assert!((path.global_efficiency() - 5.0 / 6.0).abs() < 1e-12);

        let isolated = Graph::empty(4);
        assert_eq!(isolated.global_efficiency(), 0.0);
        assert_eq!(isolated.spectral_entropy(), 0.0);
    }

    #[test]
    fn rewire_keeps_graph_simple() {
        let mut rng = seeded(7);
        let mut graph = Graph::watts_strogatz(&mut rng, 40, 4, 0.2).expect("valid parameters");
        for _ in 0..50 {
            graph.rewire_random_edge(&mut rng).expect("rewire");
        }
        for (u, v) in graph.edges() {
            assert!(u < v);
            assert!(graph.neighbors[u].contains(&v));
            assert!(graph.neighbors[v].contains(&u));
        }
        assert!(graph.edge_count() <= 80);
    }
}
