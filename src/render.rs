use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::layout::{ElementId, LabelLayout, Layout, RouteSegment, StationShape};
use crate::model::RouteId;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    if !layout.grid.is_empty() {
        svg.push_str(&format!(
            "<g id=\"grid\" stroke=\"{}\" stroke-width=\"0.5\">",
            theme.grid_color
        ));
        for line in &layout.grid {
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"/>",
                line.from.0, line.from.1, line.to.0, line.to.1
            ));
        }
        svg.push_str("</g>");
    }

    let mut routes: Vec<(RouteId, Vec<&RouteSegment>)> = Vec::new();
    for segment in &layout.segments {
        match routes.last_mut() {
            Some((id, segments)) if *id == segment.route => segments.push(segment),
            _ => routes.push((segment.route, vec![segment])),
        }
    }
    for (id, segments) in &routes {
        svg.push_str(&format!("<g id=\"{}\">", ElementId::Route(*id)));
        for segment in segments.iter().filter(|segment| segment.selected && !segment.dashed) {
            svg.push_str(&segment_svg(
                segment,
                &theme.selected_color,
                layout.line_width * 2.0,
                None,
            ));
        }
        for segment in segments {
            let dash = segment
                .dashed
                .then(|| format!("{:.2} {:.2}", layout.line_width, layout.line_width));
            let color = if segment.color.is_empty() {
                theme.default_route_color.as_str()
            } else {
                segment.color.as_str()
            };
            svg.push_str(&segment_svg(segment, color, layout.line_width, dash.as_deref()));
        }
        svg.push_str("</g>");
    }

    for station in &layout.stations {
        let id = ElementId::Station(station.id);
        match station.shape {
            StationShape::Circle { center, radius } => svg.push_str(&format!(
                "<circle id=\"{id}\" cx=\"{:.2}\" cy=\"{:.2}\" r=\"{radius:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
                center.0,
                center.1,
                theme.station_fill,
                theme.station_stroke,
                layout.line_width / 2.0
            )),
            StationShape::Rect {
                center,
                width,
                height,
                angle,
            } => svg.push_str(&format!(
                "<rect id=\"{id}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\" transform=\"rotate({angle:.2} {:.2} {:.2})\"/>",
                center.0 - width / 2.0,
                center.1 - height / 2.0,
                width.min(height) / 2.0,
                theme.station_fill,
                theme.station_stroke,
                layout.line_width / 2.0,
                center.0,
                center.1
            )),
        }
    }

    for label in &layout.labels {
        svg.push_str(&label_svg(label, layout.cell_size, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn segment_svg(segment: &RouteSegment, color: &str, width: f32, dash: Option<&str>) -> String {
    let dash = dash
        .map(|pattern| format!(" stroke-dasharray=\"{pattern}\""))
        .unwrap_or_default();
    format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{width:.2}\" stroke-linecap=\"round\"{dash}/>",
        segment.from.0,
        segment.from.1,
        segment.to.0,
        segment.to.1,
        escape_xml(color)
    )
}

/// Left-aligned text block filling the label's cells from the top.
fn label_svg(label: &LabelLayout, cell_size: f32, theme: &Theme, config: &LayoutConfig) -> String {
    let x = label.x as f32 * cell_size;
    let line_height = theme.font_size * config.label_line_height;
    let block_height = label.lines.len() as f32 * line_height;
    let top = label.y as f32 * cell_size + (label.height as f32 * cell_size - block_height) / 2.0;
    let mut text = format!(
        "<text id=\"{}\" x=\"{x:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        ElementId::Label(label.station),
        top + theme.font_size,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.label_color
    );
    for (idx, line) in label.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

/// Drawn segments per route, overlays included.
pub fn segments_per_route(layout: &Layout) -> BTreeMap<RouteId, usize> {
    let mut counts = BTreeMap::new();
    for segment in &layout.segments {
        *counts.entry(segment.route).or_insert(0) += 1;
    }
    counts
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Helvetica".to_string());
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid raster size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
