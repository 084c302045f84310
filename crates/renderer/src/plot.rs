//! Offscreen raster plot.
//!
//! Draws a [`Frame`] with `embedded-graphics` primitives into an in-memory
//! [`RgbImage`], which the exporter then encodes as PNG.

use crate::frame::{ChannelFrame, Frame, Trace};
use embedded_graphics::{
    mono_font::{
        iso_8859_1::{FONT_10X20, FONT_6X10},
        MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use hygro_core::{Channel, Mode};
use hygro_theme::{Color, Stroke, Theme};
use image::{Rgb, RgbImage};
use std::convert::Infallible;

const TICKS: usize = 5;
const MARKER_DIAMETER: u32 = 6;
const LEGEND_ROW: i32 = 14;

/// [`DrawTarget`] backed by an [`RgbImage`].  Pixels outside the image are
/// silently dropped.
pub struct PlotCanvas {
    image: RgbImage,
}

impl PlotCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl OriginDimensions for PlotCanvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for PlotCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.image.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

/// Maps data coordinates onto the pixel rectangle of the plot area.
#[derive(Debug, Clone, Copy)]
struct Projection {
    area:    Rectangle,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Projection {
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let span = |(lo, hi): (f64, f64)| if hi - lo > f64::EPSILON { hi - lo } else { 1.0 };
        let left = f64::from(self.area.top_left.x);
        let top = f64::from(self.area.top_left.y);
        let width = f64::from(self.area.size.width);
        let height = f64::from(self.area.size.height);

        (
            left + (x - self.x_range.0) / span(self.x_range) * width,
            top + height - (y - self.y_range.0) / span(self.y_range) * height,
        )
    }

    fn point(&self, x: f64, y: f64) -> Point {
        let (px, py) = self.project(x, y);
        Point::new(px.round() as i32, py.round() as i32)
    }
}

/// Render `frame` into a fresh `width × height` image.
pub fn render_plot(frame: &Frame, theme: &Theme, width: u32, height: u32) -> RgbImage {
    let mut canvas = PlotCanvas::new(width, height);
    draw_plot(&mut canvas, frame, theme).unwrap_or_else(|never| match never {});
    canvas.into_image()
}

/// Draw `frame` onto any RGB target: background, grid, axes, series, legend.
pub fn draw_plot<D>(target: &mut D, frame: &Frame, theme: &Theme) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    target.clear(theme.background.to_rgb888())?;

    let size = target.size();
    let (w, h) = (size.width as i32, size.height as i32);
    let area = Rectangle::new(
        Point::new(w / 12 + 8, h / 10 + 10),
        Size::new(
            (w - w / 12 - 8 - w / 40).max(1) as u32,
            (h - h / 10 - 10 - h / 8 - 10).max(1) as u32,
        ),
    );
    let projection = Projection {
        area,
        x_range: frame.x_range,
        y_range: frame.y_range,
    };

    draw_grid(target, &projection, theme)?;
    draw_labels(target, frame, &projection, theme)?;

    for channel in &frame.channels {
        draw_channel(target, frame, channel, &projection, theme)?;
    }

    area.into_styled(PrimitiveStyle::with_stroke(theme.foreground.to_rgb888(), 1))
        .draw(target)?;
    draw_legend(target, frame, &projection, theme)
}

fn draw_grid<D>(target: &mut D, projection: &Projection, theme: &Theme) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let grid = PrimitiveStyle::with_stroke(theme.grid.to_rgb888(), 1);
    let font = MonoTextStyle::new(&FONT_6X10, theme.foreground.to_rgb888());
    let area = projection.area;
    let bottom = area.top_left.y + area.size.height as i32;
    let right = area.top_left.x + area.size.width as i32;

    for x in ticks(projection.x_range) {
        let p = projection.point(x, projection.y_range.0);
        Line::new(Point::new(p.x, area.top_left.y), Point::new(p.x, bottom))
            .into_styled(grid)
            .draw(target)?;
        Text::with_alignment(&format!("{x:.1}"), Point::new(p.x, bottom + 14), font, Alignment::Center)
            .draw(target)?;
    }

    for y in ticks(projection.y_range) {
        let p = projection.point(projection.x_range.0, y);
        Line::new(Point::new(area.top_left.x, p.y), Point::new(right, p.y))
            .into_styled(grid)
            .draw(target)?;
        Text::with_alignment(
            &format!("{y:.1}"),
            Point::new(area.top_left.x - 6, p.y + 3),
            font,
            Alignment::Right,
        )
        .draw(target)?;
    }
    Ok(())
}

fn draw_labels<D>(
    target: &mut D,
    frame: &Frame,
    projection: &Projection,
    theme: &Theme,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888> + OriginDimensions,
{
    let fg = theme.foreground.to_rgb888();
    let title = MonoTextStyle::new(&FONT_10X20, fg);
    let label = MonoTextStyle::new(&FONT_6X10, fg);
    let top = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();

    let width = target.size().width as i32;
    let height = target.size().height as i32;
    let area = projection.area;

    Text::with_text_style(
        &format!("REAL-TIME · {}", frame.mode.as_str().to_uppercase()),
        Point::new(width / 2, 4),
        title,
        top,
    )
    .draw(target)?;

    Text::with_text_style(
        "Time (s)",
        Point::new(area.center().x, height - 14),
        label,
        top,
    )
    .draw(target)?;

    Text::with_baseline(
        frame.mode.axis_label(),
        Point::new(4, area.top_left.y - 14),
        label,
        Baseline::Top,
    )
    .draw(target)?;
    Ok(())
}

fn draw_channel<D>(
    target: &mut D,
    frame: &Frame,
    channel: &ChannelFrame,
    projection: &Projection,
    theme: &Theme,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let marker = PrimitiveStyle::with_fill(theme.channel(channel.channel).to_rgb888());
    for (&t, &v) in frame.time.iter().zip(&channel.values) {
        Circle::with_center(projection.point(t, v), MARKER_DIAMETER)
            .into_styled(marker)
            .draw(target)?;
    }

    if let Some(trace) = &channel.linear {
        draw_trace(target, trace, projection, theme.linear_stroke(frame.mode, channel.channel))?;
    }
    if let Some(trace) = &channel.quadratic {
        draw_trace(target, trace, projection, theme.quadratic_stroke(frame.mode, channel.channel))?;
    }
    Ok(())
}

fn draw_trace<D>(
    target: &mut D,
    trace: &Trace,
    projection: &Projection,
    stroke: Stroke,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let points: Vec<(f64, f64)> = trace
        .xs
        .iter()
        .zip(&trace.ys)
        .map(|(&x, &y)| projection.project(x, y))
        .collect();
    draw_polyline(target, &points, stroke)
}

/// Stroke a polyline, carrying the dash phase across vertices.
fn draw_polyline<D>(target: &mut D, points: &[(f64, f64)], stroke: Stroke) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let style = PrimitiveStyle::with_stroke(stroke.color.to_rgb888(), stroke.width);
    let mut dash = DashPhase::new(stroke.dash.pattern());
    let to_point = |(x, y): (f64, f64)| Point::new(x.round() as i32, y.round() as i32);

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        let lerp = |s: f64| {
            let k = if length > 0.0 { s / length } else { 0.0 };
            (a.0 + (b.0 - a.0) * k, a.1 + (b.1 - a.1) * k)
        };

        let mut start = 0.0;
        while start < length {
            let run = dash.left.min(length - start);
            if dash.on() {
                Line::new(to_point(lerp(start)), to_point(lerp(start + run)))
                    .into_styled(style)
                    .draw(target)?;
            }
            start += run;
            dash.advance(run);
        }
    }
    Ok(())
}

/// Position inside a repeating on/off dash pattern.
struct DashPhase {
    pattern: &'static [u32],
    index:   usize,
    left:    f64,
}

impl DashPhase {
    fn new(pattern: &'static [u32]) -> Self {
        Self {
            pattern,
            index: 0,
            left: pattern.first().map_or(f64::INFINITY, |&n| f64::from(n)),
        }
    }

    fn on(&self) -> bool {
        self.index % 2 == 0
    }

    fn advance(&mut self, run: f64) {
        self.left -= run;
        if self.left <= 1e-9 {
            self.index = (self.index + 1) % self.pattern.len();
            self.left = f64::from(self.pattern[self.index]);
        }
    }
}

fn draw_legend<D>(
    target: &mut D,
    frame: &Frame,
    projection: &Projection,
    theme: &Theme,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let entries = legend_entries(frame, theme);
    if entries.is_empty() {
        return Ok(());
    }

    let font = MonoTextStyle::new(&FONT_6X10, theme.foreground.to_rgb888());
    let longest = entries.iter().map(|(text, _)| text.len()).max().unwrap_or(0) as i32;
    let box_width = 36 + longest * 6;
    let area = projection.area;
    let origin = Point::new(
        area.top_left.x + area.size.width as i32 - box_width - 8,
        area.top_left.y + 8,
    );

    Rectangle::new(
        origin,
        Size::new(box_width as u32, (entries.len() as i32 * LEGEND_ROW + 6) as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(theme.background.to_rgb888()))
    .draw(target)?;

    for (row, (text, swatch)) in entries.iter().enumerate() {
        let y = origin.y + 10 + row as i32 * LEGEND_ROW;
        match swatch {
            Swatch::Marker(color) => {
                Circle::with_center(Point::new(origin.x + 14, y), MARKER_DIAMETER)
                    .into_styled(PrimitiveStyle::with_fill(color.to_rgb888()))
                    .draw(target)?;
            }
            Swatch::Line(stroke) => {
                let x0 = f64::from(origin.x + 4);
                draw_polyline(target, &[(x0, f64::from(y)), (x0 + 22.0, f64::from(y))], *stroke)?;
            }
        }
        Text::new(text, Point::new(origin.x + 32, y + 3), font).draw(target)?;
    }
    Ok(())
}

enum Swatch {
    Marker(Color),
    Line(Stroke),
}

fn legend_entries(frame: &Frame, theme: &Theme) -> Vec<(String, Swatch)> {
    let name = |channel: Channel| match (frame.mode, channel) {
        (Mode::Both, Channel::Humidity) => "Humidity ",
        (Mode::Both, Channel::Temperature) => "Temperature ",
        _ => "",
    };
    let capitalize = |prefix: &str, what: &str| {
        if prefix.is_empty() {
            let mut chars = what.chars();
            chars
                .next()
                .map(|c| c.to_ascii_uppercase().to_string() + chars.as_str())
                .unwrap_or_default()
        } else {
            format!("{prefix}{what}")
        }
    };

    let mut entries = Vec::new();
    for c in &frame.channels {
        entries.push((
            capitalize(name(c.channel), "data"),
            Swatch::Marker(theme.channel(c.channel)),
        ));
    }
    for c in frame.channels.iter().filter(|c| c.linear.is_some()) {
        entries.push((
            capitalize(name(c.channel), "linear"),
            Swatch::Line(theme.linear_stroke(frame.mode, c.channel)),
        ));
    }
    for c in frame.channels.iter().filter(|c| c.quadratic.is_some()) {
        entries.push((
            capitalize(name(c.channel), "quadratic"),
            Swatch::Line(theme.quadratic_stroke(frame.mode, c.channel)),
        ));
    }
    entries
}

/// `TICKS` evenly spaced values covering `range`.
fn ticks((lo, hi): (f64, f64)) -> impl Iterator<Item = f64> {
    let step = (hi - lo) / (TICKS - 1) as f64;
    (0..TICKS).map(move |i| lo + step * i as f64)
}
