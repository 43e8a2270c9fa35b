use crate::color::{parse_color, Rgb};
use crate::config::{MarkerSymbol, PlotLayout};
use crate::ir::{PlotRequest, RenderRecord};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian3d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

/// Camera elevation above the x/y plane, degrees
const ELEVATION: f64 = 14.0;
/// Camera rotation around the vertical axis, degrees
const AZIMUTH: f64 = -120.0;
const MARKER_ALPHA: f64 = 0.4;

type Chart3d<'a, DB> = ChartContext<'a, DB, Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>>;

/// Draw a plot request as a static 3D scatter plot and return the encoded image
pub fn render_request(request: &PlotRequest, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 {
        anyhow::bail!("Image size must be positive (got {}x{})", width, height);
    }

    match options.format {
        OutputFormat::Png => {
            let len = (width as usize)
                .checked_mul(height as usize)
                .and_then(|pixels| pixels.checked_mul(3))
                .with_context(|| format!("Image size {}x{} is too large", width, height))?;
            let mut buffer = vec![0u8; len];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
                draw_scatter(&root, request)?;
                root.present().context("Failed to present drawing")?;
            }
            encode_png(&buffer, width, height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                draw_scatter(&root, request)?;
                root.present().context("Failed to present drawing")?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

fn draw_scatter<DB>(root: &DrawingArea<DB, Shift>, request: &PlotRequest) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let bounds = Bounds::from_request(request)?;

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if let Some(title) = request.layout.title.as_deref().filter(|t| !t.is_empty()) {
        builder.caption(title, ("sans-serif", 20));
    }

    // plotters draws its y axis vertically, so data z goes there
    let mut chart = builder
        .build_cartesian_3d(bounds.x.clone(), bounds.z.clone(), bounds.y.clone())
        .context("Failed to build chart")?;

    chart.with_projection(|mut pb| {
        pb.pitch = ELEVATION.to_radians();
        pb.yaw = AZIMUTH.to_radians();
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()
        .context("Failed to draw axes")?;

    draw_axis_titles(&mut chart, &request.layout, &bounds)?;

    for record in &request.records {
        draw_record(&mut chart, record)?;
    }

    if !request.records.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font(FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .context("Failed to draw legend")?;
    }

    Ok(())
}

fn draw_axis_titles<DB>(chart: &mut Chart3d<'_, DB>, layout: &PlotLayout, bounds: &Bounds) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let [x_title, y_title, z_title] = layout.axis_titles();
    let font = FontDesc::new(FontFamily::SansSerif, 14.0, FontStyle::Normal);
    let anchors = [
        (x_title, (bounds.x.end, bounds.z.start, bounds.y.start)),
        (y_title, (bounds.x.start, bounds.z.start, bounds.y.end)),
        (z_title, (bounds.x.start, bounds.z.end, bounds.y.start)),
    ];
    for (title, anchor) in anchors {
        chart
            .draw_series(std::iter::once(Text::new(title.to_string(), anchor, font.clone())))
            .context("Failed to draw axis title")?;
    }
    Ok(())
}

/// Marker radius in pixels for a matplotlib-style area size (points squared)
fn marker_radius(size: f64) -> i32 {
    ((size.max(0.0).sqrt() / 2.0).round() as i32).max(1)
}

fn draw_record<DB>(chart: &mut Chart3d<'_, DB>, record: &RenderRecord) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let rgb = parse_color(&record.color).unwrap_or(Rgb(0, 0, 255));
    let color = RGBColor(rgb.0, rgb.1, rgb.2);
    let style = if record.symbol.is_open() {
        color.stroke_width(1)
    } else {
        color.mix(MARKER_ALPHA).filled()
    };
    let line = color.stroke_width(2);

    // matplotlib drops points it cannot place or size
    let points: Vec<((f64, f64, f64), i32)> = record
        .points()
        .filter(|(x, y, z, s)| x.is_finite() && y.is_finite() && z.is_finite() && s.is_finite())
        .map(|(x, y, z, s)| ((x, z, y), marker_radius(s)))
        .collect();

    let annotation = match record.symbol {
        MarkerSymbol::Circle | MarkerSymbol::CircleOpen => chart.draw_series(
            points
                .iter()
                .map(|&(p, r)| EmptyElement::at(p) + Circle::new((0, 0), r, style)),
        ),
        MarkerSymbol::Square | MarkerSymbol::SquareOpen => chart.draw_series(
            points
                .iter()
                .map(|&(p, r)| EmptyElement::at(p) + Rectangle::new([(-r, -r), (r, r)], style)),
        ),
        MarkerSymbol::Diamond => chart.draw_series(
            points
                .iter()
                .map(|&(p, r)| EmptyElement::at(p) + Polygon::new(vec![(0, -r), (r, 0), (0, r), (-r, 0)], style)),
        ),
        MarkerSymbol::DiamondOpen => chart.draw_series(points.iter().map(|&(p, r)| {
            EmptyElement::at(p) + PathElement::new(vec![(0, -r), (r, 0), (0, r), (-r, 0), (0, -r)], style)
        })),
        MarkerSymbol::Cross => chart.draw_series(points.iter().map(|&(p, r)| {
            EmptyElement::at(p)
                + PathElement::new(vec![(-r, 0), (r, 0)], line)
                + PathElement::new(vec![(0, -r), (0, r)], line)
        })),
        MarkerSymbol::X => chart.draw_series(
            points
                .iter()
                .map(|&(p, r)| EmptyElement::at(p) + Cross::new((0, 0), r, line)),
        ),
    }
    .with_context(|| format!("Failed to draw markers for '{}'", record.label))?;

    annotation
        .label(record.label.clone())
        .legend(move |(x, y)| Circle::new((x, y), 4, style));

    Ok(())
}

/// Axis ranges in data space
#[derive(Debug, Clone, PartialEq)]
struct Bounds {
    x: Range<f64>,
    y: Range<f64>,
    z: Range<f64>,
}

impl Bounds {
    fn from_request(request: &PlotRequest) -> Result<Self> {
        let records = &request.records;
        let layout = &request.layout;
        Ok(Self {
            x: axis_range(records.iter().flat_map(|r| r.x.iter().copied()), layout.x.range, "x")?,
            y: axis_range(records.iter().flat_map(|r| r.y.iter().copied()), layout.y.range, "y")?,
            z: axis_range(records.iter().flat_map(|r| r.z.iter().copied()), layout.z.range, "z")?,
        })
    }
}

/// Padded data range, with configured bounds taking precedence
fn axis_range<I>(values: I, configured: [Option<f64>; 2], axis: &str) -> Result<Range<f64>>
where
    I: Iterator<Item = f64>,
{
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let (data_min, data_max) = if min > max {
        // no data at all
        (0.0, 1.0)
    } else if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    };

    let lo = configured[0].unwrap_or(data_min);
    let hi = configured[1].unwrap_or(data_max);
    if !(lo < hi) {
        anyhow::bail!("Invalid {} axis range: {} .. {}", axis, lo, hi);
    }
    Ok(lo..hi)
}
