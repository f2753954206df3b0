//! Conversions between tiny-skia pixmaps and `image` buffers, and SVG
//! rasterization via resvg.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{ColorU8, IntSize, Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Renders an SVG string to an RGBA image fitting within `size x size`.
///
/// Aspect ratio is preserved. Returns `None` if the SVG cannot be parsed or
/// has no area.
pub fn render_svg(svg_data: &str, size: u32) -> Option<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).ok()?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    Some(pixmap_to_rgba_image(&pixmap))
}

/// Converts a premultiplied tiny-skia pixmap to a straight-alpha image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let height = pixmap.height();
    let mut img = RgbaImage::new(width, height);

    for (pixel, out) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        if pixel.alpha() == 0 {
            continue;
        }
        let c = pixel.demultiply();
        *out = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    img
}

/// Converts a straight-alpha image into a premultiplied pixmap.
pub fn rgba_image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut pixmap = Pixmap::new(size.width(), size.height())?;

    for (src, dst) in img.pixels().zip(pixmap.pixels_mut()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    Some(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="#ff0000"/></svg>"##;

    #[test]
    fn render_simple_svg() {
        let img = render_svg(SIMPLE_SVG, 40).unwrap();
        assert_eq!(img.width(), 40);
        assert_eq!(img.height(), 20);
        assert_eq!(img.get_pixel(20, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn render_invalid_svg() {
        assert!(render_svg("<not-svg", 40).is_none());
    }

    #[test]
    fn pixmap_conversion_unpremultiplies() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([200, 100, 0, 255]));
        let pixmap = rgba_image_to_pixmap(&img).unwrap();
        assert_eq!(pixmap.width(), 3);
        let back = pixmap_to_rgba_image(&pixmap);
        assert_eq!(back, img);

        let clear = RgbaImage::new(2, 2);
        let back = pixmap_to_rgba_image(&rgba_image_to_pixmap(&clear).unwrap());
        assert_eq!(back.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
