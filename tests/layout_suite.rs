use std::collections::BTreeSet;
use std::path::Path;

use subway_map_renderer::layout::{PlacementStrategy, bundle_order, calculate_priority};
use subway_map_renderer::model::{EdgeKey, RuleViolation};
use subway_map_renderer::{
    Error, LayoutConfig, MapView, RenderOptions, RouteColor, RouteId, StationId, SubwayMap,
    Theme, compute_layout, render_with_options,
};

fn fixture_text(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture read failed")
}

fn load_fixture(name: &str) -> SubwayMap {
    let mut map = SubwayMap::default();
    map.from_json(&fixture_text(name)).expect("fixture load failed");
    map
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = ["junction.json", "ring.json", "hand_edited.json5"];
    for name in candidates {
        let text = fixture_text(name);
        for options in [RenderOptions::classic(), RenderOptions::modern().with_grid()] {
            let svg = render_with_options(&text, &options).expect("render failed");
            assert_valid_svg(&svg, name);
        }
    }
}

#[test]
fn junction_bundle_keeps_turn_order() {
    let map = load_fixture("junction.json");
    let edge = EdgeKey::new(StationId(0), StationId(1));
    // Green bends south-east, blue runs straight on, red bends north-east.
    assert_eq!(
        bundle_order(edge, &map).unwrap(),
        vec![RouteId(2), RouteId(1), RouteId(0)]
    );
}

#[test]
fn lanes_are_a_bijection_on_every_edge() {
    let map = load_fixture("junction.json");
    for edge in map.edges() {
        let routes = map.routes_on(edge.first(), edge.second()).unwrap();
        let lanes: BTreeSet<usize> = routes
            .iter()
            .map(|route| calculate_priority(*route, edge, &map).unwrap())
            .collect();
        assert_eq!(lanes, (0..routes.len()).collect::<BTreeSet<_>>());
    }
}

#[test]
fn unknown_edge_is_an_invariant_error() {
    let map = load_fixture("junction.json");
    let edge = EdgeKey::new(StationId(0), StationId(5));
    assert!(matches!(
        calculate_priority(RouteId(0), edge, &map),
        Err(Error::EdgeNotFound { .. })
    ));
}

#[test]
fn labels_avoid_lines_and_other_stations() {
    let mut map = load_fixture("junction.json");
    let (layout, occupied) = compute_layout(&mut map, &LayoutConfig::default()).unwrap();
    assert_eq!(layout.labels.len(), 6);
    for label in &layout.labels {
        if label.strategy == PlacementStrategy::Forced {
            continue;
        }
        for dx in 0..label.width {
            for dy in 0..label.height {
                let cell = (label.x + dx, label.y + dy);
                assert!(!occupied.is_route_cell(cell), "label {} on a line", label.station);
                for station in &layout.stations {
                    if station.id == label.station {
                        assert!(!station.bounds.contains(cell));
                    } else {
                        assert!(!station.bounds.surrounds(cell));
                    }
                }
            }
        }
        let stored = map.station(label.station).unwrap().label().position();
        assert_eq!(stored, (label.x, label.y));
    }
}

#[test]
fn shared_edge_station_becomes_a_bundle() {
    let mut map = load_fixture("junction.json");
    let mut view = MapView::new(LayoutConfig::default(), Theme::classic());
    let layout = view.redraw_map(&mut map).unwrap();
    let central = layout.station(StationId(1)).unwrap();
    assert!(matches!(
        central.shape,
        subway_map_renderer::layout::StationShape::Rect { .. }
    ));
    let north = layout.station(StationId(2)).unwrap();
    assert!(matches!(
        north.shape,
        subway_map_renderer::layout::StationShape::Circle { .. }
    ));
    // Yellow/black is drawn twice: solid then dashed.
    assert_eq!(layout.route_segments(RouteId(3)).count(), 4);
}

/// Route station sequences and colors with station ids replaced by their
/// rank, which is what export renumbering produces.
fn dense_routes(map: &SubwayMap) -> Vec<(Vec<usize>, RouteColor)> {
    let rank: Vec<StationId> = map.stations().keys().copied().collect();
    map.routes()
        .map(|route| {
            let stations = route
                .stations()
                .iter()
                .map(|id| rank.iter().position(|known| known == id).unwrap())
                .collect();
            (stations, route.color().clone())
        })
        .collect()
}

fn assert_round_trip(original: &SubwayMap, label: &str) {
    let json = original.to_json().unwrap();
    let mut restored = SubwayMap::default();
    restored
        .from_json(&json)
        .unwrap_or_else(|err| panic!("{label}: reload failed: {err}"));

    assert_eq!(restored.name(), original.name(), "{label}");
    assert_eq!(restored.settings(), original.settings(), "{label}");
    assert_eq!(restored.stations().len(), original.stations().len(), "{label}");
    assert_eq!(restored.route_count(), original.route_count(), "{label}");
    assert_eq!(restored.edge_count(), original.edge_count(), "{label}");
    assert_eq!(dense_routes(&restored), dense_routes(original), "{label}");
    for (before, after) in original.stations().values().zip(restored.stations().values()) {
        assert_eq!(after.position(), before.position(), "{label}");
        assert_eq!(after.label().name(), before.label().name(), "{label}");
        assert_eq!(after.label().is_pinned(), before.label().is_pinned(), "{label}");
    }
}

#[test]
fn round_trip_preserves_structure() {
    for name in ["junction.json", "ring.json", "hand_edited.json5"] {
        assert_round_trip(&load_fixture(name), name);
    }

    let mut restored = SubwayMap::default();
    restored
        .from_json(&load_fixture("hand_edited.json5").to_json().unwrap())
        .unwrap();
    let route = restored.route(RouteId(0)).unwrap();
    assert_eq!(route.stations(), &[StationId(0), StationId(1)]);
    assert_eq!(route.color(), &RouteColor::Single("#0a0".to_string()));
}

#[test]
fn edited_maps_still_round_trip() {
    let mut ring = load_fixture("ring.json");
    ring.remove_station(StationId(1)).unwrap();
    assert_eq!(
        ring.route(RouteId(0)).unwrap().stations(),
        &[StationId(0), StationId(2), StationId(3), StationId(0)]
    );
    assert_round_trip(&ring, "ring without station 1");

    // [0, 1, 2, 0] minus 1 would run over 0-2 twice.
    let mut triangle = load_fixture("ring.json");
    triangle.remove_station(StationId(3)).unwrap();
    triangle.remove_station(StationId(1)).unwrap();
    assert_eq!(
        triangle.route(RouteId(0)).unwrap().stations(),
        &[StationId(0), StationId(2)]
    );
    assert_eq!(triangle.edge_count(), 1);
    assert_round_trip(&triangle, "ring reduced to one edge");

    let mut junction = load_fixture("junction.json");
    junction.remove_station(StationId(1)).unwrap();
    junction.rename_station(StationId(0), Vec::new()).unwrap();
    assert_round_trip(&junction, "junction without its hub");
}

#[test]
fn pinned_labels_survive_redraw_and_export() {
    let mut map = load_fixture("ring.json");
    let (layout, _) = compute_layout(&mut map, &LayoutConfig::default()).unwrap();
    let pinned = layout.label(StationId(3)).unwrap();
    assert_eq!(pinned.strategy, PlacementStrategy::Pinned);
    assert_eq!((pinned.x, pinned.y), (2, 12));
    assert!(map.to_json().unwrap().contains("\"pinned\": true"));
}

#[test]
fn ring_station_removal_cleans_the_index() {
    let mut map = load_fixture("ring.json");
    let ring = RouteId(0);
    assert_eq!(map.edge_count(), 4);
    let removed = map.remove_station_from_route(ring, StationId(0)).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(
        map.route(ring).unwrap().stations(),
        &[StationId(1), StationId(2), StationId(3)]
    );
    assert_eq!(map.edge_count(), 2);
    for edge in map.edges() {
        assert!(!edge.touches(StationId(0)));
    }
    let mut view = MapView::new(LayoutConfig::default(), Theme::modern());
    assert_eq!(view.redraw_map(&mut map).unwrap().segments.len(), 2);
}

#[test]
fn rule_violations_leave_the_map_unchanged() {
    let mut map = SubwayMap::default();
    let a = map.new_station(1, 1, vec!["A".into()]);
    let b = map.new_station(4, 1, vec!["B".into()]);
    let route = map.new_route(RouteColor::Single("red".into()));
    map.new_connection(route, a).unwrap();

    let err = map.new_connection(route, a).unwrap_err();
    assert!(matches!(err, RuleViolation::LoopToSelf { .. }));
    assert!(err.to_string().contains("loop"));
    assert_eq!(map.route(route).unwrap().stations(), &[a]);

    map.new_connection(route, b).unwrap();
    assert!(matches!(
        map.new_connection(route, a),
        Err(RuleViolation::DuplicateConnection { .. })
    ));
    assert_eq!(map.routes_on(a, b).unwrap(), vec![route]);
    assert_eq!(map.route(route).unwrap().stations(), &[a, b]);
}

#[test]
fn invalid_document_keeps_previous_map() {
    let mut map = load_fixture("junction.json");
    let broken = fixture_text("junction.json").replace("\"gridSize\": 20, ", "");
    let err = map.from_json(&broken).unwrap_err();
    assert_eq!(err.to_string(), "missing property \"gridSize\" in settings");
    assert_eq!(map.name(), "Junction");
    assert_eq!(map.route_count(), 4);
}
