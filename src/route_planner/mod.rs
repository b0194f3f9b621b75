pub mod cli;
pub mod export;
pub mod route_map;
pub mod session;

pub use cli::{run_cli, PlannerApp};
pub use session::{PlannedRoute, RouteComparison, RouteSession};
