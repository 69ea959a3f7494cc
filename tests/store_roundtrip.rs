//! Round-trip fidelity of the weather store: metadata and weather rows
//! written to disk must read back identical, strings verbatim and floats
//! bitwise.

use voyage_store::{GlobalAttributes, NodeMetadata, PredictedWeatherRow, WeatherRow, WeatherStore};

fn sample_metadata() -> Vec<NodeMetadata> {
    vec![
        NodeMetadata {
            node_id: 0,
            lat: 12.5,
            lon: -45.25,
            name: "waypoint_0".to_string(),
            is_original: true,
            cumulative_distance_nm: 0.0,
            segment: 0,
        },
        NodeMetadata {
            node_id: 1,
            lat: 12.75,
            lon: -44.0,
            name: "waypoint_1".to_string(),
            is_original: false,
            cumulative_distance_nm: 55.0,
            segment: 0,
        },
        NodeMetadata {
            node_id: 2,
            lat: 13.0,
            lon: -43.0,
            name: "waypoint_2".to_string(),
            is_original: true,
            cumulative_distance_nm: 110.0,
            segment: 0,
        },
    ]
}

#[test]
fn metadata_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.h5");
    let metadata = sample_metadata();
    let attrs = GlobalAttributes { route_name: "benchmark-route".to_string(), total_distance_nm: 110.0 };

    WeatherStore::create(&path, &metadata, &attrs).unwrap();
    let store = WeatherStore::open(&path).unwrap();

    let read_back = store.read_metadata().unwrap();
    assert_eq!(read_back, metadata);

    let read_attrs = store.read_attrs().unwrap();
    assert_eq!(read_attrs.route_name, attrs.route_name);
    assert_eq!(read_attrs.total_distance_nm.to_bits(), attrs.total_distance_nm.to_bits());
}

#[test]
fn actual_and_predicted_weather_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.h5");
    let metadata = sample_metadata();
    let attrs = GlobalAttributes { route_name: "benchmark-route".to_string(), total_distance_nm: 110.0 };
    let store = WeatherStore::create(&path, &metadata, &attrs).unwrap();

    let actual_rows = vec![
        WeatherRow {
            node_id: 0,
            sample_hour: 0,
            wind_speed_kmh: 12.34,
            wind_direction_deg: 271.5,
            beaufort: 3,
            wave_height_m: 1.2,
            current_speed_kmh: 2.0,
            current_direction_deg: 90.0,
        },
        WeatherRow {
            node_id: 1,
            sample_hour: 0,
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
    ];
    store.append_actual(&actual_rows).unwrap();

    let predicted_rows = vec![PredictedWeatherRow {
        node_id: 0,
        forecast_hour: 6,
        sample_hour: 0,
        wind_speed_kmh: 20.0,
        wind_direction_deg: 180.0,
        beaufort: 5,
        wave_height_m: 2.5,
        current_speed_kmh: 1.0,
        current_direction_deg: 45.0,
    }];
    store.append_predicted(&predicted_rows).unwrap();

    let read_actual = store.read_actual(None, None).unwrap();
    assert_eq!(read_actual.len(), 2);
    let node0 = read_actual.iter().find(|r| r.node_id == 0).unwrap();
    assert_eq!(node0.wind_speed_kmh.to_bits(), 12.34f64.to_bits());
    assert_eq!(node0.wind_direction_deg.to_bits(), 271.5f64.to_bits());
    assert_eq!(node0.beaufort, 3);

    let read_predicted = store.read_predicted(None, None, None).unwrap();
    assert_eq!(read_predicted.len(), 1);
    assert_eq!(read_predicted[0].forecast_hour, 6);
    assert_eq!(read_predicted[0].current_direction_deg.to_bits(), 45.0f64.to_bits());

    let completed = store.get_completed_sample_hours().unwrap();
    assert_eq!(completed, vec![0]);
}

#[test]
fn actual_weather_filters_by_sample_hour_and_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.h5");
    let metadata = sample_metadata();
    let attrs = GlobalAttributes { route_name: "benchmark-route".to_string(), total_distance_nm: 110.0 };
    let store = WeatherStore::create(&path, &metadata, &attrs).unwrap();

    let rows = vec![
        WeatherRow {
            node_id: 0,
            sample_hour: 0,
            wind_speed_kmh: 1.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
        WeatherRow {
            node_id: 0,
            sample_hour: 6,
            wind_speed_kmh: 2.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
        WeatherRow {
            node_id: 1,
            sample_hour: 0,
            wind_speed_kmh: 3.0,
            wind_direction_deg: 0.0,
            beaufort: 0,
            wave_height_m: 0.0,
            current_speed_kmh: 0.0,
            current_direction_deg: 0.0,
        },
    ];
    store.append_actual(&rows).unwrap();

    let at_hour_0 = store.read_actual(Some(0), None).unwrap();
    assert_eq!(at_hour_0.len(), 2);
    assert!(at_hour_0.iter().all(|r| r.sample_hour == 0));

    let node0_only = store.read_actual(None, Some(0)).unwrap();
    assert_eq!(node0_only.len(), 2);
    assert!(node0_only.iter().all(|r| r.node_id == 0));
}
