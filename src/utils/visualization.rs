//! Preview rendering for detected page regions.
//!
//! Debug and UI surfaces want the detected regions painted over the page
//! image. Colors come from a [`PreviewPalette`] value passed in by the
//! caller, so different frontends can theme previews without touching any
//! global state.

use crate::processors::geometry::Contour;
use image::{Pixel, Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use serde::{Deserialize, Serialize};

/// Region classes a page segmentation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageClass {
    /// Anything not covered by another class.
    Background,
    /// Illustrations and figures.
    Image,
    /// Text lines.
    Line,
    /// Margin annotations.
    Margin,
    /// Captions attached to illustrations.
    Caption,
}

/// Overlay colors per region class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPalette {
    /// Color for illustration regions.
    pub image: [u8; 3],
    /// Color for text-line regions.
    pub line: [u8; 3],
    /// Color for margin regions.
    pub margin: [u8; 3],
    /// Color for caption regions.
    pub caption: [u8; 3],
}

impl Default for PreviewPalette {
    fn default() -> Self {
        Self {
            image: [45, 255, 0],
            line: [255, 100, 0],
            margin: [255, 0, 0],
            caption: [255, 100, 243],
        }
    }
}

impl PreviewPalette {
    /// Returns the overlay color for a class; background regions are never
    /// painted.
    pub fn color(&self, class: PageClass) -> Option<Rgb<u8>> {
        match class {
            PageClass::Background => None,
            PageClass::Image => Some(Rgb(self.image)),
            PageClass::Line => Some(Rgb(self.line)),
            PageClass::Margin => Some(Rgb(self.margin)),
            PageClass::Caption => Some(Rgb(self.caption)),
        }
    }
}

/// Default overlay opacity for page previews.
pub const DEFAULT_PREVIEW_ALPHA: f32 = 0.4;

/// Paints classified regions over a copy of the page image.
///
/// Each contour is filled with its class color on a transparent overlay,
/// which is then alpha-blended onto the page.
///
/// # Arguments
///
/// * `image` - The page image to annotate.
/// * `regions` - Contours paired with their region class.
/// * `palette` - Overlay colors.
/// * `alpha` - Overlay opacity in `[0, 1]`.
pub fn create_page_preview(
    image: &RgbImage,
    regions: &[(PageClass, Contour)],
    palette: &PreviewPalette,
    alpha: f32,
) -> RgbImage {
    let mut overlay = RgbImage::new(image.width(), image.height());
    let mut painted = vec![false; (image.width() * image.height()) as usize];

    for (class, contour) in regions {
        let Some(color) = palette.color(*class) else {
            continue;
        };
        fill_contour(&mut overlay, contour, color);
    }

    for (idx, pixel) in overlay.pixels().enumerate() {
        painted[idx] = pixel.0 != [0, 0, 0];
    }

    let alpha = alpha.clamp(0.0, 1.0);
    let mut preview = image.clone();
    for (idx, (dst, src)) in preview.pixels_mut().zip(overlay.pixels()).enumerate() {
        if painted[idx] {
            dst.apply2(src, |page, over| {
                (page as f32 * (1.0 - alpha) + over as f32 * alpha).round() as u8
            });
        }
    }

    preview
}

/// Renders line contours as filled regions on a black canvas, in the
/// palette's line color.
pub fn create_line_preview(
    width: u32,
    height: u32,
    contours: &[Contour],
    palette: &PreviewPalette,
) -> RgbImage {
    let mut preview = RgbImage::new(width, height);
    for contour in contours {
        fill_contour(&mut preview, contour, Rgb(palette.line));
    }
    preview
}

fn fill_contour(canvas: &mut RgbImage, contour: &Contour, color: Rgb<u8>) {
    if contour.len() < 3 {
        return;
    }

    let mut poly = contour.to_imageproc_points();
    // draw_polygon_mut rejects an explicitly closed polygon.
    if poly.first() == poly.last() {
        poly.pop();
    }
    if poly.len() < 3 {
        return;
    }

    draw_polygon_mut(canvas, &poly, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::Point;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point::new(x, y),
            Point::new(x + w - 1, y),
            Point::new(x + w - 1, y + h - 1),
            Point::new(x, y + h - 1),
        ])
    }

    #[test]
    fn test_preview_blends_only_inside_regions() {
        let image = RgbImage::from_pixel(100, 100, Rgb([100, 100, 100]));
        let regions = vec![(PageClass::Line, rect_contour(10, 10, 40, 20))];
        let preview =
            create_page_preview(&image, &regions, &PreviewPalette::default(), 0.5);

        // Inside: blend of page gray and the line color.
        assert_eq!(preview.get_pixel(20, 15).0, [178, 100, 50]);
        // Outside: untouched.
        assert_eq!(preview.get_pixel(80, 80).0, [100, 100, 100]);
    }

    #[test]
    fn test_background_class_is_never_painted() {
        let image = RgbImage::from_pixel(50, 50, Rgb([10, 10, 10]));
        let regions = vec![(PageClass::Background, rect_contour(0, 0, 50, 50))];
        let preview =
            create_page_preview(&image, &regions, &PreviewPalette::default(), 0.5);
        assert_eq!(preview.get_pixel(25, 25).0, [10, 10, 10]);
    }

    #[test]
    fn test_line_preview_paints_line_color() {
        let palette = PreviewPalette::default();
        let preview = create_line_preview(100, 100, &[rect_contour(10, 10, 30, 15)], &palette);
        assert_eq!(preview.get_pixel(20, 15).0, palette.line);
        assert_eq!(preview.get_pixel(80, 80).0, [0, 0, 0]);
    }
}
