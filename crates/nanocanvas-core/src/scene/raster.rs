//! Pixel export on tiny-skia. Text goes through resvg so glyphs are real.

use super::{SceneError, SceneResult};
use crate::shapes::{Image, SerializableColor, Shape, ShapeStyle, ShapeTrait, Text};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect};
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};

/// Fill shown where a video frame or an undecodable image would be.
const VIDEO_PLACEHOLDER: SerializableColor = SerializableColor {
    r: 0x1e,
    g: 0x29,
    b: 0x3b,
    a: 0xff,
};
const BROKEN_IMAGE_PLACEHOLDER: SerializableColor = SerializableColor {
    r: 0xcb,
    g: 0xd5,
    b: 0xe1,
    a: 0xff,
};

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> SceneResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| SceneError::Encode(e.to_string()))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| SceneError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

/// Scene-to-pixel mapping for one export.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    origin: Point,
    scale: f64,
}

impl Viewport {
    fn transform(&self) -> Transform {
        Transform::from_row(
            self.scale as f32,
            0.0,
            0.0,
            self.scale as f32,
            (-self.origin.x * self.scale) as f32,
            (-self.origin.y * self.scale) as f32,
        )
    }

    /// Mapping for content laid out in an object's unscaled local space.
    fn local_transform(&self, shape: &Shape) -> Transform {
        let frame = shape.frame();
        Transform::from_row(
            (frame.scale_x * self.scale) as f32,
            0.0,
            0.0,
            (frame.scale_y * self.scale) as f32,
            ((frame.position.x - self.origin.x) * self.scale) as f32,
            ((frame.position.y - self.origin.y) * self.scale) as f32,
        )
    }
}

fn paint_for(color: peniko::Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

/// Rasterize `shapes` (back to front) inside `region` and encode as PNG.
pub(crate) fn render_png(
    shapes: &[&Shape],
    region: Rect,
    scale: f64,
    background: Option<SerializableColor>,
) -> SceneResult<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SceneError::EmptyRegion);
    }
    let width = (region.width() * scale).round();
    let height = (region.height() * scale).round();
    if width < 1.0 || height < 1.0 {
        return Err(SceneError::EmptyRegion);
    }
    let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or(SceneError::EmptyRegion)?;
    if let Some(background) = background {
        let rgba = peniko::Color::from(background).to_rgba8();
        pixmap.fill(tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a));
    }

    let viewport = Viewport {
        origin: region.origin(),
        scale,
    };
    for shape in shapes.iter().filter(|s| s.frame().visible) {
        paint_shape(&mut pixmap, shape, viewport);
    }
    log::debug!(
        "Rasterized {} objects into {}x{} pixels",
        shapes.len(),
        pixmap.width(),
        pixmap.height()
    );

    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    encode_png(&rgba, pixmap.width(), pixmap.height())
}

fn paint_shape(pixmap: &mut Pixmap, shape: &Shape, viewport: Viewport) {
    let style = shape.style();
    let transform = viewport.transform();
    match shape {
        Shape::Rectangle(_) => {
            if let Some(path) = rect_path(shape.bounds()) {
                fill_and_stroke(pixmap, &path, shape, style, transform);
            }
        }
        Shape::Ellipse(_) => {
            let path = to_skia_rect(shape.bounds()).and_then(PathBuilder::from_oval);
            if let Some(path) = path {
                fill_and_stroke(pixmap, &path, shape, style, transform);
            }
        }
        Shape::Line(line) => {
            let (a, b) = line.world_points();
            stroke_polyline(pixmap, &[a, b], shape, style, transform);
        }
        Shape::Freehand(path) => {
            stroke_polyline(pixmap, &path.world_points(), shape, style, transform);
        }
        Shape::Text(text) => paint_text(pixmap, text, viewport.local_transform(shape)),
        Shape::Image(img) => paint_image(pixmap, img, shape, viewport),
        Shape::Video(_) => fill_placeholder(pixmap, shape, VIDEO_PLACEHOLDER, transform),
    }
}

fn to_skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_ltrb(rect.x0 as f32, rect.y0 as f32, rect.x1 as f32, rect.y1 as f32)
}

fn rect_path(rect: Rect) -> Option<tiny_skia::Path> {
    to_skia_rect(rect).map(PathBuilder::from_rect)
}

fn stroke_for(shape: &Shape) -> Stroke {
    Stroke {
        width: shape.scaled_stroke_width() as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

fn fill_and_stroke(
    pixmap: &mut Pixmap,
    path: &tiny_skia::Path,
    shape: &Shape,
    style: &ShapeStyle,
    transform: Transform,
) {
    if let Some(fill) = style.fill_color() {
        pixmap.fill_path(path, &paint_for(fill), FillRule::Winding, transform, None);
    }
    if let Some(stroke) = style.stroke_color() {
        if style.stroke_width > 0.0 {
            pixmap.stroke_path(path, &paint_for(stroke), &stroke_for(shape), transform, None);
        }
    }
}

fn stroke_polyline(
    pixmap: &mut Pixmap,
    points: &[Point],
    shape: &Shape,
    style: &ShapeStyle,
    transform: Transform,
) {
    let Some(color) = style.stroke_color() else {
        return;
    };
    let stroke = stroke_for(shape);
    let paint = paint_for(color);
    match points {
        [] => {}
        // A single click still leaves a round dot
        [only] => {
            let radius = (stroke.width / 2.0).max(0.5);
            if let Some(dot) = PathBuilder::from_circle(only.x as f32, only.y as f32, radius) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
            }
        }
        [first, rest @ ..] => {
            let mut pb = PathBuilder::new();
            pb.move_to(first.x as f32, first.y as f32);
            for p in rest {
                pb.line_to(p.x as f32, p.y as f32);
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
    }
}

fn fill_placeholder(
    pixmap: &mut Pixmap,
    shape: &Shape,
    color: SerializableColor,
    transform: Transform,
) {
    if let Some(path) = rect_path(shape.bounds()) {
        pixmap.fill_path(&path, &paint_for(color.into()), FillRule::Winding, transform, None);
    }
}

/// Decode the stored bitmap into a premultiplied tiny-skia pixmap.
fn decode_bitmap(img: &Image) -> Result<Pixmap, String> {
    let bytes = STANDARD.decode(&img.data_base64).map_err(|e| e.to_string())?;
    let rgba = image::load_from_memory(&bytes)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let mut bitmap = Pixmap::new(rgba.width(), rgba.height())
        .ok_or_else(|| "image has no pixels".to_string())?;
    for (dst, src) in bitmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(bitmap)
}

fn paint_image(pixmap: &mut Pixmap, img: &Image, shape: &Shape, viewport: Viewport) {
    match decode_bitmap(img) {
        Ok(bitmap) => {
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            pixmap.draw_pixmap(
                0,
                0,
                bitmap.as_ref(),
                &paint,
                viewport.local_transform(shape),
                None,
            );
        }
        Err(e) => {
            log::warn!("Image {} could not be decoded for export: {}", img.id, e);
            fill_placeholder(pixmap, shape, BROKEN_IMAGE_PLACEHOLDER, viewport.transform());
        }
    }
}

/// System fonts, loaded once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            #[cfg(not(target_arch = "wasm32"))]
            db.load_system_fonts();
            log::debug!("Loaded {} font faces for export", db.len());
            Arc::new(db)
        })
        .clone()
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// SVG document for a text object in its unscaled local space.
fn text_svg(text: &Text) -> Option<String> {
    let fill = text.style.fill?;
    let size = text.size();
    let line_height = text.line_height();
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">",
        size.width.max(1.0),
        size.height.max(1.0),
    );
    for (i, line) in text.content.lines().enumerate() {
        // Baseline sits one font size below the top of each line box
        let baseline = i as f64 * line_height + text.font_size;
        let _ = write!(
            svg,
            "<text x=\"0\" y=\"{baseline}\" font-family=\"{}, sans-serif\" font-size=\"{}\" \
             fill=\"#{:02x}{:02x}{:02x}\" fill-opacity=\"{}\" xml:space=\"preserve\">{}</text>",
            escape_xml(&text.font_family),
            text.font_size,
            fill.r,
            fill.g,
            fill.b,
            f64::from(fill.a) / 255.0,
            escape_xml(line),
        );
    }
    svg.push_str("</svg>");
    Some(svg)
}

fn paint_text(pixmap: &mut Pixmap, text: &Text, transform: Transform) {
    let Some(svg) = text_svg(text) else {
        return;
    };
    let mut options = usvg::Options::default();
    options.fontdb = font_database();
    match usvg::Tree::from_str(&svg, &options) {
        Ok(tree) => resvg::render(&tree, transform, &mut pixmap.as_mut()),
        Err(e) => log::warn!("Text {} could not be laid out for export: {}", text.id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Ellipse, Freehand, ImageFormat, Line, Rectangle};

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    fn white() -> Option<SerializableColor> {
        Some(SerializableColor::white())
    }

    #[test]
    fn test_encode_png_roundtrip_size() {
        let png = encode_png(&[255u8; 2 * 3 * 4], 2, 3).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (2, 3));
    }

    #[test]
    fn test_render_filled_rect_on_white() {
        let rect = Shape::Rectangle(
            Rectangle::new(Point::new(10.0, 10.0), 10.0, 10.0)
                .with_style(ShapeStyle::filled(SerializableColor::rgb(255, 0, 0))),
        );
        let png = render_png(&[&rect], Rect::new(0.0, 0.0, 40.0, 40.0), 1.0, white()).unwrap();
        let img = decode(&png);
        assert_eq!(img.dimensions(), (40, 40));
        assert_eq!(img.get_pixel(15, 15).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(35, 35).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_outline_leaves_interior_clear() {
        let rect = Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 20.0, 20.0));
        let png = render_png(&[&rect], Rect::new(0.0, 0.0, 40.0, 40.0), 1.0, white()).unwrap();
        let img = decode(&png);
        assert_eq!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(10, 20).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_circle_fill() {
        let circle = Shape::Ellipse(
            Ellipse::new(Point::ZERO, 10.0)
                .with_style(ShapeStyle::filled(SerializableColor::rgb(0, 0, 255))),
        );
        let png = render_png(&[&circle], circle.bounds(), 1.0, None).unwrap();
        let img = decode(&png);
        assert_eq!(img.get_pixel(10, 10).0, [0, 0, 255, 255]);
        // Corners are outside the circle and stay transparent
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_vertical_line_paints_stroke() {
        let line = Shape::Line(Line::new(Point::new(5.0, 0.0), Point::new(5.0, 20.0)));
        let png = render_png(&[&line], Rect::new(0.0, 0.0, 10.0, 20.0), 1.0, white()).unwrap();
        let img = decode(&png);
        assert_eq!(img.get_pixel(5, 10).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(9, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_single_point_stroke_is_a_dot() {
        let mut dot = Freehand::from_points(vec![Point::new(10.0, 10.0)]);
        dot.style.stroke_width = 6.0;
        let dot = Shape::Freehand(dot);
        let png = render_png(&[&dot], Rect::new(0.0, 0.0, 20.0, 20.0), 1.0, white()).unwrap();
        assert_eq!(decode(&png).get_pixel(10, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_image_drawn_scaled() {
        let rgba: Vec<u8> = [10u8, 200, 30, 255].repeat(4 * 4);
        let bytes = encode_png(&rgba, 4, 4).unwrap();
        let mut img = Image::decode(Point::new(2.0, 2.0), &bytes).unwrap();
        img.frame.scale_x = 4.0;
        img.frame.scale_y = 4.0;
        let shape = Shape::Image(img);
        let png = render_png(&[&shape], Rect::new(0.0, 0.0, 20.0, 20.0), 1.0, white()).unwrap();
        let out = decode(&png);
        assert_eq!(out.get_pixel(10, 10).0, [10, 200, 30, 255]);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_broken_image_uses_placeholder() {
        let img = Image::from_parts(Point::ZERO, 10, 10, ImageFormat::Png, "AAAA".to_string());
        let shape = Shape::Image(img);
        let png = render_png(&[&shape], shape.bounds(), 1.0, None).unwrap();
        assert_eq!(decode(&png).get_pixel(5, 5).0, [0xcb, 0xd5, 0xe1, 0xff]);
    }

    #[test]
    fn test_text_svg_escapes_and_stacks_lines() {
        let mut text = Text::new(Point::ZERO, "a<b\nc & d");
        text.font_size = 10.0;
        let svg = text_svg(&text).unwrap();
        assert!(svg.contains(">a&lt;b</text>"));
        assert!(svg.contains(">c &amp; d</text>"));
        assert!(svg.contains("y=\"10\""));
        assert_eq!(svg.matches("<text ").count(), 2);
        assert!(svg.contains("font-family=\"Inter, sans-serif\""));

        text.style.fill = None;
        assert!(text_svg(&text).is_none());
    }

    #[test]
    fn test_text_export_keeps_dimensions() {
        let text = Shape::Text(Text::new(Point::new(4.0, 4.0), "hello"));
        let png = render_png(&[&text], Rect::new(0.0, 0.0, 120.0, 50.0), 2.0, white()).unwrap();
        assert_eq!(decode(&png).dimensions(), (240, 100));
    }

    #[test]
    fn test_hidden_objects_skipped() {
        let mut rect = Rectangle::new(Point::ZERO, 10.0, 10.0)
            .with_style(ShapeStyle::filled(SerializableColor::black()));
        rect.frame.visible = false;
        let rect = Shape::Rectangle(rect);
        let png = render_png(&[&rect], Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, white()).unwrap();
        assert_eq!(decode(&png).get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_multiplier_scales_output() {
        let rect = Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 5.0));
        let png = render_png(&[&rect], rect.bounds(), 4.0, None).unwrap();
        assert_eq!(decode(&png).dimensions(), (40, 20));
    }

    #[test]
    fn test_empty_region_rejected() {
        assert!(matches!(
            render_png(&[], Rect::new(0.0, 0.0, 0.1, 10.0), 1.0, None),
            Err(SceneError::EmptyRegion)
        ));
    }
}
