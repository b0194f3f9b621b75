// regression_tree.rs
//
// Second-order regression tree fitted to squared-error gradients. With a
// hessian of 1 per sample the gradient sum of a node is its residual sum and
// the hessian sum is its sample count.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Splits whose loss reduction does not exceed this are not taken.
const MIN_SPLIT_GAIN: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; the root sits at depth 0.
    pub max_depth: usize,
    /// L2 regularisation on leaf weights.
    pub reg_lambda: f64,
    /// Minimum hessian sum (sample count) on each side of a split.
    pub min_child_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

impl TreeNode {
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fits a tree to `residuals` (target minus current prediction) over the
    /// rows of `x`. Rows are expected to be fully populated and equally wide.
    pub fn fit(x: &[Vec<f64>], residuals: &[f64], params: &TreeParams) -> Self {
        let indices: Vec<usize> = (0..residuals.len()).collect();
        Self {
            root: build_node(x, residuals, indices, 0, params),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Largest feature index referenced by a split, if any.
    pub fn max_feature_index(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            match node {
                TreeNode::Leaf { .. } => None,
                TreeNode::Split {
                    feature, left, right, ..
                } => [Some(*feature), walk(left), walk(right)].into_iter().flatten().max(),
            }
        }
        walk(&self.root)
    }
}

fn leaf_weight(grad_sum: f64, hess_sum: f64, reg_lambda: f64) -> f64 {
    grad_sum / (hess_sum + reg_lambda)
}

fn score(grad_sum: f64, hess_sum: f64, reg_lambda: f64) -> f64 {
    grad_sum * grad_sum / (hess_sum + reg_lambda)
}

fn build_node(
    x: &[Vec<f64>],
    residuals: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
) -> TreeNode {
    let grad_sum: f64 = indices.iter().map(|&i| residuals[i]).sum();
    let hess_sum = indices.len() as f64;
    let leaf = TreeNode::Leaf {
        value: leaf_weight(grad_sum, hess_sum, params.reg_lambda),
    };

    if depth >= params.max_depth || indices.len() < 2 {
        return leaf;
    }

    let Some(split) = find_best_split(x, residuals, &indices, grad_sum, params) else {
        return leaf;
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][split.feature] <= split.threshold);

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_node(x, residuals, left_idx, depth + 1, params)),
        right: Box::new(build_node(x, residuals, right_idx, depth + 1, params)),
    }
}

/// Exact greedy search over every feature and every boundary between
/// distinct sorted values.
fn find_best_split(
    x: &[Vec<f64>],
    residuals: &[f64],
    indices: &[usize],
    grad_sum: f64,
    params: &TreeParams,
) -> Option<SplitCandidate> {
    let n_features = x.get(indices[0]).map_or(0, Vec::len);
    let hess_sum = indices.len() as f64;
    let parent_score = score(grad_sum, hess_sum, params.reg_lambda);
    let mut best: Option<SplitCandidate> = None;

    let mut sorted = indices.to_vec();
    for feature in 0..n_features {
        sorted.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_grad = 0.0;
        for k in 0..sorted.len() - 1 {
            left_grad += residuals[sorted[k]];
            let here = x[sorted[k]][feature];
            let next = x[sorted[k + 1]][feature];
            if here == next {
                continue;
            }

            let left_hess = (k + 1) as f64;
            let right_hess = hess_sum - left_hess;
            if left_hess < params.min_child_weight || right_hess < params.min_child_weight {
                continue;
            }

            let right_grad = grad_sum - left_grad;
            let gain = 0.5
                * (score(left_grad, left_hess, params.reg_lambda)
                    + score(right_grad, right_hess, params.reg_lambda)
                    - parent_score);

            if gain > MIN_SPLIT_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (here + next) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
        }
    }

    #[test]
    fn separates_two_clusters_on_the_informative_feature() {
        let x = vec![
            vec![0.0, 5.0],
            vec![1.0, 5.0],
            vec![2.0, 5.0],
            vec![10.0, 5.0],
            vec![11.0, 5.0],
            vec![12.0, 5.0],
        ];
        let residuals = vec![-9.0, -9.0, -9.0, 9.0, 9.0, 9.0];
        let tree = RegressionTree::fit(&x, &residuals, &params(1));

        match tree.root() {
            TreeNode::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert!((*threshold - 6.0).abs() < 1e-12);
            }
            other => panic!("expected a split, got {:?}", other),
        }
        // Leaf weight = sum / (count + lambda) = -27 / 4
        assert!((tree.predict_row(&[1.0, 5.0]) + 6.75).abs() < 1e-12);
        assert!((tree.predict_row(&[11.0, 5.0]) - 6.75).abs() < 1e-12);
    }

    #[test]
    fn respects_max_depth() {
        let x: Vec<Vec<f64>> = (0..32).map(|i| vec![i as f64]).collect();
        let residuals: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();
        for depth in [0, 1, 3] {
            let tree = RegressionTree::fit(&x, &residuals, &params(depth));
            assert!(tree.depth() <= depth);
        }
    }

    #[test]
    fn constant_residuals_produce_a_single_leaf() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let residuals = vec![0.0; 8];
        let tree = RegressionTree::fit(&x, &residuals, &params(5));
        assert_eq!(tree.root(), &TreeNode::Leaf { value: 0.0 });
        assert_eq!(tree.max_feature_index(), None);
    }
}
