use crate::config::Config;
use crate::dxf::{
    Attachment, DxfWriter, EntityOptions, HAlign, MTextOptions, Point, TextOptions, Units, VAlign,
    point,
};
use crate::ir::{Borehole, InputError};
use crate::layout::{TrackLayout, compute_track_layout, resolve_label};
use anyhow::Result;
use std::path::Path;

const SCALE_LAYER: &str = "scaleLayer";
const TITLES_LAYER: &str = "titlesLayer";
const FINAL_DEPTH_LAYER: &str = "finalDepthLayer";
const WATER_SHAPE_LAYER: &str = "waterLevelShapeLayer";
const WATER_TEXT_LAYER: &str = "waterLevelTextLayer";
const DEPTH_LINES_LAYER: &str = "depthsLineLayer";
const DESCRIPTION_LAYER: &str = "descriptionTextLayer";

const DASHED_LINE_TYPE: &str = "DASHED";
const SCALE_BLOCK: &str = "scaleBlock";
const WATER_LEVEL_BLOCK: &str = "waterLevelBlock";

// Water marker triangle, in block-local coordinates.
const WATER_MARKER_HALF_WIDTH: f64 = 0.2754;
const WATER_MARKER_HEIGHT: f64 = 0.4406;
const WATER_MARKER_LEADER_END: f64 = 1.574;

/// Outcome of one batch: which holes rendered, which were skipped, and any
/// per-layer data warnings collected along the way.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub total: usize,
    pub rendered: usize,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

/// Render a batch of boreholes into one DXF drawing, one track per hole at
/// its horizontal slot. A borehole whose layout fails is skipped entirely
/// (its layout is computed before any of its entities are emitted) and
/// reported by id; the rest of the batch completes normally.
pub fn render_dxf(boreholes: &[Borehole], config: &Config) -> (String, RenderReport) {
    let mut dxf = DxfWriter::new();
    setup_drawing(&mut dxf, config);

    let mut report = RenderReport {
        total: boreholes.len(),
        ..RenderReport::default()
    };
    let sheet = &config.render.sheet;
    for (slot, hole) in boreholes.iter().enumerate() {
        let origin = point(
            sheet.origin_x + sheet.track_gap * slot as f64,
            sheet.origin_y,
        );
        match render_borehole(&mut dxf, hole, origin, config, &mut report.warnings) {
            Ok(()) => report.rendered += 1,
            Err(err) => {
                report.warnings.push(err.to_string());
                report.failed.push(hole.hole_id.clone());
            }
        }
    }
    (dxf.stringify(), report)
}

pub fn write_output(dxf: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, dxf)?;
        }
        None => {
            print!("{}", dxf);
        }
    }
    Ok(())
}

fn setup_drawing(dxf: &mut DxfWriter, config: &Config) {
    let theme = &config.theme;
    dxf.set_units(Units::Meters);
    dxf.add_line_type(DASHED_LINE_TYPE, "__ __ __", &[0.25, -0.125]);

    dxf.add_layer(SCALE_LAYER, theme.scale_color, "Continuous");
    dxf.add_layer(TITLES_LAYER, theme.title_color, "Continuous");
    dxf.add_layer(FINAL_DEPTH_LAYER, theme.final_depth_color, "Continuous");
    dxf.add_layer(WATER_SHAPE_LAYER, theme.water_shape_color, "Continuous");
    dxf.add_layer(WATER_TEXT_LAYER, theme.water_text_color, "Continuous");
    dxf.add_layer(DEPTH_LINES_LAYER, theme.depth_line_color, DASHED_LINE_TYPE);
    dxf.add_layer(DESCRIPTION_LAYER, theme.description_color, "Continuous");

    dxf.add_text_style(&theme.text_style, &theme.font_file);

    define_blocks(dxf, config);
}

fn define_blocks(dxf: &mut DxfWriter, config: &Config) {
    let theme = &config.theme;
    let rail = config.render.scale.rail_width;

    // One metre of the alternating scale: a filled box with a closing foot.
    dxf.begin_block(SCALE_BLOCK, SCALE_LAYER);
    dxf.add_solid_hatch(
        &[
            point(0.0, 0.0),
            point(rail, 0.0),
            point(rail, -1.0),
            point(0.0, -1.0),
        ],
        &EntityOptions::colored(theme.scale_color),
    );
    dxf.add_line(
        point(0.0, -1.0),
        point(rail, -1.0),
        &EntityOptions::default(),
    );
    dxf.end_block();

    dxf.begin_block(WATER_LEVEL_BLOCK, WATER_SHAPE_LAYER);
    dxf.add_solid_hatch(
        &[
            point(0.0, 0.0),
            point(-WATER_MARKER_HALF_WIDTH, WATER_MARKER_HEIGHT),
            point(WATER_MARKER_HALF_WIDTH, WATER_MARKER_HEIGHT),
        ],
        &EntityOptions::default(),
    );
    dxf.add_line(
        point(-WATER_MARKER_HALF_WIDTH, WATER_MARKER_HEIGHT),
        point(WATER_MARKER_LEADER_END, WATER_MARKER_HEIGHT),
        &EntityOptions::default(),
    );
    dxf.end_block();
}

fn render_borehole(
    dxf: &mut DxfWriter,
    hole: &Borehole,
    origin: Point,
    config: &Config,
    warnings: &mut Vec<String>,
) -> Result<(), InputError> {
    // The only failable step. Nothing is drawn for a hole that fails here.
    let track = compute_track_layout(hole, &config.layout)?;
    let max_depth = hole.final_depth();

    draw_header(dxf, hole, origin, config);
    draw_scale(dxf, origin, max_depth, config);
    draw_layer_rows(dxf, hole, &track, origin, config, warnings);
    draw_nspt_column(dxf, hole, origin, config);
    draw_water_level(dxf, hole, origin, max_depth, config);
    draw_final_depth(dxf, origin, max_depth, track.track_bottom, config);
    Ok(())
}

fn draw_header(dxf: &mut DxfWriter, hole: &Borehole, origin: Point, config: &Config) {
    let header = &config.render.header;
    let theme = &config.theme;
    let titles = EntityOptions::on_layer(TITLES_LAYER);

    dxf.add_line(
        point(origin.x + header.rule_offset_x, origin.y),
        point(origin.x + header.rule_offset_x, origin.y + header.rule_height),
        &titles,
    );
    dxf.add_line(
        point(origin.x + header.rule_offset_x, origin.y + header.rule_height),
        point(origin.x - header.rule_reach, origin.y + header.rule_height),
        &titles,
    );

    let title_opts = TextOptions {
        layer: Some(TITLES_LAYER.to_string()),
        style: Some(theme.text_style.clone()),
        h_align: HAlign::Right,
        v_align: VAlign::Bottom,
        ..TextOptions::default()
    };
    dxf.add_text(
        point(origin.x - header.text_offset_x, origin.y + header.title_offset_y),
        header.title_text_height,
        &hole.hole_id.to_uppercase(),
        &title_opts,
    );

    let elevation = match hole.z {
        Some(z) => format!("COTA={}", format_measure(z)),
        None => "COTA=0".to_string(),
    };
    dxf.add_text(
        point(
            origin.x - header.text_offset_x,
            origin.y + header.elevation_offset_y,
        ),
        header.elevation_text_height,
        &elevation,
        &title_opts,
    );
}

fn draw_scale(dxf: &mut DxfWriter, origin: Point, max_depth: f64, config: &Config) {
    let scale = &config.render.scale;
    let color = EntityOptions::colored(config.theme.scale_color);

    dxf.add_line(origin, point(origin.x, origin.y - max_depth), &color);
    dxf.add_line(
        point(origin.x + scale.rail_width, origin.y),
        point(origin.x + scale.rail_width, origin.y - max_depth),
        &color,
    );

    let mut mark = 0.0;
    while mark < max_depth - 1.0 {
        dxf.add_insert(SCALE_BLOCK, point(origin.x, origin.y - mark), &color);
        mark += scale.block_step;
    }

    // A fractional final metre falling on an unfilled stripe gets its own
    // partial fill so the scale never ends on a gap.
    let depth_floor = max_depth.floor();
    if depth_floor != max_depth && (depth_floor as i64) % 2 == 0 {
        dxf.add_solid_hatch(
            &[
                point(origin.x, origin.y - depth_floor),
                point(origin.x + scale.rail_width, origin.y - depth_floor),
                point(origin.x + scale.rail_width, origin.y - max_depth),
                point(origin.x, origin.y - max_depth),
            ],
            &color,
        );
    }
    dxf.add_line(
        point(origin.x, origin.y - max_depth),
        point(origin.x + scale.rail_width, origin.y - max_depth),
        &color,
    );
}

fn draw_layer_rows(
    dxf: &mut DxfWriter,
    hole: &Borehole,
    track: &TrackLayout,
    origin: Point,
    config: &Config,
    warnings: &mut Vec<String>,
) {
    for cluster in &track.clusters {
        let mut current_y = cluster.start_depth();
        let mut cumulative = cluster.start_depth();
        for size in &cluster.layer_sizes {
            let center_y = current_y + size.final_height / 2.0;
            // A reshuffled cluster relocates every boundary to its running
            // allocated offset; unchanged clusters keep physical depths.
            let corrected = if cluster.unchanged {
                None
            } else {
                cumulative += size.final_height;
                Some(cumulative)
            };
            draw_depth_tick(dxf, origin, size.to, corrected, config);

            let interp = hole
                .interp
                .as_ref()
                .map(|entries| entries[size.layer_index].as_str());
            let label = resolve_label(&hole.geology[size.layer_index], interp);
            if label.is_empty() {
                warnings.push(format!(
                    "{}: empty description for layer {}",
                    hole.hole_id, size.layer_index
                ));
            } else {
                let description = &config.render.description;
                dxf.add_mtext(
                    point(
                        origin.x - description.offset_x,
                        origin.y - center_y + size.text_height / 2.0,
                    ),
                    description.char_height,
                    &label,
                    &MTextOptions {
                        layer: Some(DESCRIPTION_LAYER.to_string()),
                        style: Some(config.theme.text_style.clone()),
                        attachment: Attachment::TopRight,
                        width: description.column_width,
                    },
                );
            }
            current_y += size.final_height;
        }
    }
}

fn draw_depth_tick(
    dxf: &mut DxfWriter,
    origin: Point,
    depth: f64,
    corrected: Option<f64>,
    config: &Config,
) {
    let line = &config.render.depth_line;
    let tick = EntityOptions::on_layer(DEPTH_LINES_LAYER);
    match corrected {
        // Bent connector: physical depth at the scale, relocated boundary
        // at the description column.
        Some(corrected) => dxf.add_lw_polyline(
            &[
                point(origin.x, origin.y - depth),
                point(origin.x - line.break_x, origin.y - depth),
                point(origin.x - line.straighten_x, origin.y - corrected),
                point(origin.x - line.reach, origin.y - corrected),
            ],
            &tick,
        ),
        None => dxf.add_lw_polyline(
            &[
                point(origin.x, origin.y - depth),
                point(origin.x - line.reach, origin.y - depth),
            ],
            &tick,
        ),
    }

    dxf.add_text(
        point(
            origin.x - line.text_offset_x,
            origin.y - depth - line.text_offset_y,
        ),
        line.text_height,
        &format_measure(depth),
        &TextOptions {
            layer: Some(DEPTH_LINES_LAYER.to_string()),
            style: Some(config.theme.text_style.clone()),
            h_align: HAlign::Right,
            v_align: VAlign::Bottom,
            ..TextOptions::default()
        },
    );
}

fn draw_nspt_column(dxf: &mut DxfWriter, hole: &Borehole, origin: Point, config: &Config) {
    let nspt = &config.render.nspt;
    let step = if hole.nspt.interval > 0.0 {
        hole.nspt.interval
    } else {
        1.0
    };
    let opts = TextOptions {
        layer: Some(DEPTH_LINES_LAYER.to_string()),
        style: Some(config.theme.text_style.clone()),
        h_align: HAlign::Left,
        v_align: VAlign::Top,
        ..TextOptions::default()
    };
    let mut depth = hole.nspt.start_depth;
    for value in &hole.nspt.values {
        dxf.add_text(
            point(origin.x + nspt.offset_x, origin.y - depth - nspt.offset_y),
            nspt.text_height,
            value,
            &opts,
        );
        depth += step;
    }
}

fn draw_water_level(
    dxf: &mut DxfWriter,
    hole: &Borehole,
    origin: Point,
    max_depth: f64,
    config: &Config,
) {
    let water = &config.render.water_level;
    let level = hole.water_level.unwrap_or(max_depth);
    let (label, text_offset_x) = match hole.water_level {
        Some(level) => (format!("NA={}", format_measure(level)), water.text_offset_x_wet),
        None => ("NA SECO".to_string(), water.text_offset_x_dry),
    };

    dxf.add_insert(
        WATER_LEVEL_BLOCK,
        point(origin.x + water.marker_offset_x, origin.y - level),
        &EntityOptions::default(),
    );
    dxf.add_text(
        point(
            origin.x + text_offset_x,
            origin.y - level + water.text_offset_y,
        ),
        water.text_height,
        &label,
        &TextOptions {
            layer: Some(WATER_TEXT_LAYER.to_string()),
            style: Some(config.theme.text_style.clone()),
            h_align: HAlign::Left,
            v_align: VAlign::Bottom,
            ..TextOptions::default()
        },
    );
}

fn draw_final_depth(
    dxf: &mut DxfWriter,
    origin: Point,
    max_depth: f64,
    track_bottom: f64,
    config: &Config,
) {
    let note = &config.render.final_depth;
    dxf.add_text(
        point(
            origin.x - note.offset_x,
            origin.y - note.offset_y - track_bottom,
        ),
        note.text_height,
        &format!("PROFUNDIDADE FINAL = {} m.", format_measure(max_depth)),
        &TextOptions {
            layer: Some(FINAL_DEPTH_LAYER.to_string()),
            style: Some(config.theme.text_style.clone()),
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            ..TextOptions::default()
        },
    );
}

/// Depths and elevations render with the comma decimal separator.
fn format_measure(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NsptColumn;

    fn hole(id: &str) -> Borehole {
        Borehole {
            hole_id: id.to_string(),
            max_depth: None,
            z: Some(812.4),
            water_level: Some(2.3),
            depths: vec![0.0, 1.3, 4.0, 7.45],
            geology: vec![
                "aterro argiloso".into(),
                "silte arenoso pouco compacto".into(),
                "argila siltosa media".into(),
            ],
            interp: None,
            nspt: NsptColumn {
                start_depth: 1.0,
                interval: 1.0,
                values: vec!["2".into(), "4".into(), "7".into(), "12".into()],
            },
        }
    }

    #[test]
    fn renders_single_borehole() {
        let (out, report) = render_dxf(&[hole("sp-01")], &Config::default());
        assert_eq!(report.rendered, 1);
        assert!(report.failed.is_empty());
        assert!(out.contains("SP-01"));
        assert!(out.contains("COTA=812,40"));
        assert!(out.contains("NA=2,30"));
        assert!(out.contains("PROFUNDIDADE FINAL = 7,45 m."));
        assert!(out.contains("ATERRO ARGILOSO"));
        assert!(out.contains(DEPTH_LINES_LAYER));
    }

    #[test]
    fn dry_hole_renders_na_seco() {
        let mut dry = hole("sp-02");
        dry.water_level = None;
        let (out, _) = render_dxf(&[dry], &Config::default());
        assert!(out.contains("NA SECO"));
    }

    #[test]
    fn malformed_borehole_is_skipped_and_reported() {
        let mut bad = hole("sp-03");
        bad.geology.pop();
        let batch = [hole("sp-01"), bad, hole("sp-04")];
        let (out, report) = render_dxf(&batch, &Config::default());
        assert_eq!(report.total, 3);
        assert_eq!(report.rendered, 2);
        assert_eq!(report.failed, vec!["sp-03".to_string()]);
        assert!(out.contains("SP-01"));
        assert!(out.contains("SP-04"));
        assert!(!out.contains("SP-03"));
    }

    #[test]
    fn empty_description_warns_but_keeps_rendering() {
        let mut sparse = hole("sp-05");
        sparse.geology[1] = "   ".into();
        let (_, report) = render_dxf(&[sparse], &Config::default());
        assert_eq!(report.rendered, 1);
        assert!(report.warnings.iter().any(|w| w.contains("sp-05")));
    }

    #[test]
    fn overflowing_layer_produces_bent_tick() {
        let mut cramped = hole("sp-06");
        cramped.depths = vec![0.0, 0.2, 4.0];
        cramped.geology = vec![
            "argila organica mole cinza escura com turfa e materia vegetal em decomposicao".into(),
            "areia".into(),
        ];
        let (out, _) = render_dxf(&[cramped], &Config::default());
        // Bent connectors have four vertices, straight ones two.
        assert!(out.contains("90\n4\n"));
    }

    #[test]
    fn nspt_readings_follow_declared_interval() {
        let mut spaced = hole("sp-07");
        spaced.nspt.interval = 2.0;
        spaced.nspt.values = vec!["3".into(), "9".into()];
        let (out, _) = render_dxf(&[spaced], &Config::default());
        // start 1.0 then 3.0: origin.y(100) - depth - 0.12
        assert!(out.contains("98.88"));
        assert!(out.contains("96.88"));
    }
}
