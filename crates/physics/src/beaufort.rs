//! Beaufort wind-force classification.

/// Classify a wind speed given in km/h into a Beaufort number (0..12).
///
/// Thresholds are applied to the speed converted to m/s.
pub fn wind_speed_to_beaufort(wind_speed_kmh: f64) -> u8 {
    let ms = wind_speed_kmh / 3.6;
    if ms < 0.5 {
        0
    } else if ms < 1.6 {
        1
    } else if ms < 3.4 {
        2
    } else if ms < 5.5 {
        3
    } else if ms < 8.0 {
        4
    } else if ms < 10.8 {
        5
    } else if ms < 13.9 {
        6
    } else if ms < 17.2 {
        7
    } else if ms < 20.8 {
        8
    } else if ms < 24.5 {
        9
    } else if ms < 28.5 {
        10
    } else if ms < 32.7 {
        11
    } else {
        12
    }
}
