//! Physics kernel: speed-over-ground, fuel, and the inverse still-water-speed
//! search, shared by every optimization tier and the simulator.
//!
//! Every function in this crate is total, pure, and thread-safe.

pub mod beaufort;
pub mod inverse;
pub mod kernel;
pub mod ship;
pub mod weather;

pub use beaufort::wind_speed_to_beaufort;
pub use inverse::inverse_sws_from_sog;
pub use kernel::{co2_emissions_kg, fuel_consumption_rate, speed_over_ground, travel_time_hours};
pub use ship::{LoadingCondition, ShipParameters};
pub use weather::Weather;

/// Forward azimuth in degrees [0, 360) from one waypoint to the next.
pub use voyage_core::geo::bearing_deg as ship_heading_deg;
