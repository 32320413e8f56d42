use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use subway_map_renderer::config::LayoutConfig;
use subway_map_renderer::layout::compute_layout;
use subway_map_renderer::render::render_svg;
use subway_map_renderer::theme::Theme;
use subway_map_renderer::{RouteColor, SubwayMap};

const PALETTE: [&str; 6] = ["#d62728", "#1f77b4", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b"];

/// `routes` lines sharing a horizontal trunk of `trunk` stations, each
/// branching off diagonally at the end.
fn trunk_map(trunk: usize, routes: usize) -> SubwayMap {
    let grid = (trunk * 3 + routes * 3 + 8) as i32;
    let mut map = SubwayMap::default();
    map.set_name("Bench");
    let mut settings = *map.settings();
    settings.grid_size = grid as u32;
    settings.canvas_size = grid as u32 * 20;
    map.set_settings(settings).expect("settings");

    let middle = grid / 2;
    let stations: Vec<_> = (0..trunk)
        .map(|idx| map.new_station(2 + idx as i32 * 3, middle, vec![format!("Trunk {idx}")]))
        .collect();
    let last_x = 2 + (trunk as i32 - 1) * 3;
    for route in 0..routes {
        let color = if route % 4 == 3 {
            RouteColor::Dual(PALETTE[route % PALETTE.len()].into(), "#000000".into())
        } else {
            RouteColor::Single(PALETTE[route % PALETTE.len()].into())
        };
        let id = map.new_route(color);
        for station in &stations {
            map.new_connection(id, *station).expect("trunk");
        }
        let step = route as i32 + 1;
        let sign = if route % 2 == 0 { 1 } else { -1 };
        let branch = map.new_station(
            last_x + step * 2,
            middle + sign * step * 2,
            vec![format!("Branch {route}")],
        );
        map.new_connection(id, branch).expect("branch");
    }
    map
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (trunk, routes) in [(4, 2), (8, 4), (16, 6), (32, 8)] {
        let map = trunk_map(trunk, routes);
        let json = map.to_json().expect("export");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("trunk{trunk}_routes{routes}")),
            &json,
            |b, json| {
                let mut map = SubwayMap::default();
                map.from_json(json).expect("load");
                b.iter(|| {
                    let (layout, _) = compute_layout(&mut map, &config).expect("layout");
                    black_box(layout.segments.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::modern();
    let config = LayoutConfig {
        draw_grid: true,
        ..Default::default()
    };
    for (trunk, routes) in [(8, 4), (32, 8)] {
        let mut map = trunk_map(trunk, routes);
        let (layout, _) = compute_layout(&mut map, &config).expect("layout");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("trunk{trunk}_routes{routes}")),
            &layout,
            |b, layout| {
                b.iter(|| {
                    let svg = render_svg(black_box(layout), &theme, &config);
                    black_box(svg.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let json = trunk_map(16, 6).to_json().expect("export");
    c.bench_function("end_to_end/trunk16_routes6", |b| {
        b.iter(|| {
            let svg = subway_map_renderer::render(black_box(&json)).expect("render");
            black_box(svg.len());
        });
    });
}

criterion_group!(benches, bench_layout, bench_render, bench_end_to_end);
criterion_main!(benches);
