// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Instinct Clustering
//!
//! Average-linkage agglomerative clustering over instincts.
//!
//! Pairwise similarity is a bounded sum of three signals:
//!
//! | Signal | Contribution |
//! |--------|--------------|
//! | same domain | `domain_weight` (0.4) |
//! | shared trigger words | `trigger_word_weight` per word (0.1), capped at 0.3 |
//! | shared action words | `action_word_weight` per word (0.05), capped at 0.3 |
//!
//! Words are lower-cased, split on whitespace and compared as sets; only
//! words longer than `min_word_len` (3) characters count.
//!
//! Clustering starts from singletons. Each iteration merges the pair of
//! clusters with the highest average pairwise member similarity, provided
//! that average reaches `similarity_threshold`; otherwise it halts. Equal
//! averages resolve to the lowest `(i, j)` pair so the result depends only
//! on input order.

use std::collections::HashSet;

use crate::domain::{ClusteringConfig, Instinct, InstinctCluster};

/// Absorbs float noise when comparing an average against the threshold
const THRESHOLD_EPSILON: f64 = 1e-9;

fn significant_words(text: &str, min_len: usize) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > min_len)
        .map(str::to_string)
        .collect()
}

/// Similarity of two instincts in `[0, 1]`
pub fn similarity(a: &Instinct, b: &Instinct, config: &ClusteringConfig) -> f64 {
    let mut score = 0.0;

    if a.domain == b.domain {
        score += config.domain_weight;
    }

    let shared = |x: &str, y: &str| {
        let x = significant_words(x, config.min_word_len);
        let y = significant_words(y, config.min_word_len);
        x.intersection(&y).count() as f64
    };

    score += (shared(&a.trigger, &b.trigger) * config.trigger_word_weight).min(config.trigger_cap);
    score += (shared(&a.action, &b.action) * config.action_word_weight).min(config.action_cap);

    score
}

pub struct InstinctClusterer {
    config: ClusteringConfig,
}

impl InstinctClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.config.min_cluster_size = min_cluster_size;
        self
    }

    /// Partition instinct indices into clusters of any size. Every index
    /// appears in exactly one group; groups keep ascending index order.
    pub fn partition(&self, instincts: &[Instinct]) -> Vec<Vec<usize>> {
        let n = instincts.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let s = similarity(&instincts[i], &instincts[j], &self.config);
                matrix[i][j] = s;
                matrix[j][i] = s;
            }
        }

        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        loop {
            let mut best: Option<(usize, usize, f64)> = None;

            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    let average = average_linkage(&clusters[i], &clusters[j], &matrix);
                    if best.is_none_or(|(_, _, score)| average > score) {
                        best = Some((i, j, average));
                    }
                }
            }

            match best {
                Some((i, j, score))
                    if score + THRESHOLD_EPSILON >= self.config.similarity_threshold =>
                {
                    let absorbed = clusters.remove(j);
                    clusters[i].extend(absorbed);
                    clusters[i].sort_unstable();
                    tracing::trace!(left = i, right = j, score, "Merged clusters");
                }
                _ => break,
            }
        }

        clusters
    }

    /// Clusters with at least `min_cluster_size` members
    pub fn cluster(&self, instincts: &[Instinct]) -> Vec<InstinctCluster> {
        let clusters: Vec<InstinctCluster> = self
            .partition(instincts)
            .into_iter()
            .filter(|group| group.len() >= self.config.min_cluster_size)
            .filter_map(|group| {
                InstinctCluster::new(group.into_iter().map(|i| instincts[i].clone()).collect())
            })
            .collect();

        tracing::debug!(
            instincts = instincts.len(),
            clusters = clusters.len(),
            min_size = self.config.min_cluster_size,
            "Clustering complete"
        );
        clusters
    }
}

fn average_linkage(left: &[usize], right: &[usize], matrix: &[Vec<f64>]) -> f64 {
    let total: f64 = left
        .iter()
        .flat_map(|&a| right.iter().map(move |&b| matrix[a][b]))
        .sum();
    total / (left.len() * right.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InstinctDomain, InstinctId};
    use chrono::NaiveDate;

    fn instinct(id: &str, domain: &str, trigger: &str, action: &str) -> Instinct {
        Instinct {
            id: InstinctId::new(id),
            trigger: trigger.to_string(),
            action: action.to_string(),
            domain: InstinctDomain::from(domain),
            confidence: 0.5,
            observation_count: 3,
            source: "personal".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        }
    }

    fn sample() -> Vec<Instinct> {
        vec![
            instinct("a", "workflow", "when editing files", "Follow the workflow pattern"),
            instinct("b", "testing", "when writing tests", "Run cargo test first"),
            instinct("c", "workflow", "when editing code", "Follow the workflow order"),
            instinct("d", "workflow", "when editing docs", "Follow the review workflow"),
            instinct("e", "security", "when handling secrets", "Never log tokens"),
        ]
    }

    #[test]
    fn test_similarity_components() {
        let config = ClusteringConfig::default();
        let a = instinct("a", "workflow", "when editing files", "Follow the workflow pattern");
        let c = instinct("c", "workflow", "when editing code", "Follow the workflow order");
        // domain 0.4 + trigger {when, editing} 0.2 + action {follow, workflow} 0.1
        assert!((similarity(&a, &c, &config) - 0.7).abs() < 1e-9);

        let e = instinct("e", "security", "when handling secrets", "Never log tokens");
        // only "when" is shared
        assert!((similarity(&a, &e, &config) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_caps() {
        let config = ClusteringConfig::default();
        let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
        let a = instinct("a", "x", text, text);
        let b = instinct("b", "x", text, text);
        assert!((similarity(&a, &b, &config) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partition_groups_related_instincts() {
        let clusterer = InstinctClusterer::new(ClusteringConfig::default());
        let groups = clusterer.partition(&sample());
        assert_eq!(groups, vec![vec![0, 2, 3], vec![1], vec![4]]);

        let clusters = clusterer.cluster(&sample());
        assert_eq!(clusters.len(), 1);
        let ids: Vec<_> = clusters[0].ids().into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let clusterer = InstinctClusterer::new(ClusteringConfig::default());
        let first = clusterer.partition(&sample());
        for _ in 0..5 {
            assert_eq!(clusterer.partition(&sample()), first);
        }
    }

    #[test]
    fn test_nothing_merges_below_threshold() {
        let config = ClusteringConfig::default();
        let instincts = vec![
            instinct("a", "one", "alpha", "bravo"),
            instinct("b", "two", "charlie", "delta"),
            instinct("c", "three", "echo", "foxtrot"),
        ];
        let groups = InstinctClusterer::new(config.clone()).partition(&instincts);
        assert_eq!(groups.len(), 3);

        // Different domains with three shared trigger words and one shared
        // action word score 0.35
        let near = vec![
            instinct("a", "one", "when editing rust files", "format code"),
            instinct("b", "two", "when editing rust modules", "review code"),
        ];
        assert!((similarity(&near[0], &near[1], &config) - 0.35).abs() < 1e-9);
        assert_eq!(InstinctClusterer::new(config.clone()).partition(&near).len(), 2);

        // Same domain alone sits exactly on the threshold and merges
        let same_domain = vec![
            instinct("a", "workflow", "alpha", "bravo"),
            instinct("b", "workflow", "charlie", "delta"),
        ];
        assert_eq!(
            InstinctClusterer::new(config).partition(&same_domain),
            vec![vec![0, 1]]
        );
    }

    #[test]
    fn test_empty_and_single_inputs_terminate() {
        let clusterer = InstinctClusterer::new(ClusteringConfig::default());
        assert!(clusterer.partition(&[]).is_empty());
        let one = vec![instinct("a", "workflow", "when", "do")];
        assert_eq!(clusterer.partition(&one), vec![vec![0]]);
        assert!(clusterer.cluster(&one).is_empty());
        assert_eq!(clusterer.with_min_cluster_size(1).cluster(&one).len(), 1);
    }
}
