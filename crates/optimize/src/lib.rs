//! Static LP, dynamic DP, and rolling-horizon voyage planners.

pub mod dynamic_dp;
pub mod error;
pub mod rolling_horizon;
pub mod speed_grid;
pub mod static_lp;
pub mod weather_lookup;

pub use dynamic_dp::{LegInstance, build_legs, solve_dynamic_dp};
pub use error::OptimizeError;
pub use rolling_horizon::{RollingHorizonOutcome, solve_rolling_horizon};
pub use speed_grid::{granularity_grid, linspace_grid};
pub use static_lp::{SegmentInstance, build_segments, check_segment_count, solve_static_lp};
pub use weather_lookup::{LookupKind, WeatherGrid};
