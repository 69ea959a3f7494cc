//! Ship-hull parameters used by the speed-over-ground model.

/// Loading condition affecting the speed-reduction and ship-form
/// coefficients. The reference tables carry both branches; only `Normal`
/// is exercised by this workspace, but `Ballast` is kept so the function
/// signatures match the source tables exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingCondition {
    Normal,
    Ballast,
}

/// Hull and engine parameters for one vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipParameters {
    pub length_m: f64,
    pub beam_m: f64,
    pub draft_m: f64,
    pub displacement_tonnes: f64,
    pub block_coefficient: f64,
    pub wetted_surface_m2: f64,
    pub rated_power_kw: f64,
    pub min_speed_knots: f64,
    pub max_speed_knots: f64,
    pub loading: LoadingCondition,
}

impl ShipParameters {
    /// Parameters matching the legacy reference vessel used for smoke
    /// testing and scenario defaults.
    pub const fn reference() -> Self {
        ShipParameters {
            length_m: 200.0,
            beam_m: 32.0,
            draft_m: 12.0,
            displacement_tonnes: 50_000.0,
            block_coefficient: 0.75,
            wetted_surface_m2: 8_000.0,
            rated_power_kw: 10_000.0,
            min_speed_knots: 8.0,
            max_speed_knots: 14.0,
            loading: LoadingCondition::Normal,
        }
    }

    /// Displacement volume in m³ (Archimedes: mass / water density).
    pub fn displacement_volume_m3(&self) -> f64 {
        self.displacement_tonnes * 1000.0 / voyage_core::constants::WATER_DENSITY
    }

    /// Clamp a still-water speed request into the engine's operating range.
    pub fn clamp_speed(&self, sws_knots: f64) -> f64 {
        sws_knots.clamp(self.min_speed_knots, self.max_speed_knots)
    }
}
