pub mod gradient_boosting;
pub mod regression_tree;

pub use gradient_boosting::{BoostingParams, GradientBoostingRegressor};
pub use regression_tree::{RegressionTree, TreeNode, TreeParams};
