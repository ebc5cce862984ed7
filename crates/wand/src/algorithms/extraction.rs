use image::{imageops, GrayImage};
use imageproc::contours::BorderType;
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use strum::{Display, EnumString, IntoStaticStr};
use crate::types::{Contour, PixelOffset};

/// How traced boundary pixels are stored
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChainApproximation {
    /// Every boundary pixel
    None,
    /// Only the end points of straight horizontal, vertical and diagonal runs
    #[default]
    Simple,
}

impl ChainApproximation {
    pub fn apply(self, points: Vec<PixelOffset>) -> Vec<PixelOffset> {
        match self {
            Self::None => points,
            Self::Simple => compress_runs(points),
        }
    }
}

fn step(from: PixelOffset, to: PixelOffset) -> (i64, i64) {
    (
        (i64::from(to.x) - i64::from(from.x)).signum(),
        (i64::from(to.y) - i64::from(from.y)).signum(),
    )
}

/// Drop ring points whose incoming and outgoing steps point the same way
fn compress_runs(points: Vec<PixelOffset>) -> Vec<PixelOffset> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}

/// Outer borders of the top-level foreground blobs, in traced order.
///
/// Blobs touching the image edge are traced too: the tracer only starts a
/// border after a background pixel, so the image is traced inside a one
/// pixel background frame and the points are shifted back.
pub fn external_contours(filled: &GrayImage, approximation: ChainApproximation) -> Vec<Contour> {
    let mut framed = GrayImage::new(filled.width() + 2, filled.height() + 2);
    imageops::replace(&mut framed, filled, 1, 1);

    imageproc::contours::find_contours::<u32>(&framed)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            let points = contour.points
                .iter()
                .map(|p| PixelOffset::new(p.x.saturating_sub(1), p.y.saturating_sub(1)))
                .collect();
            Contour::new(approximation.apply(points))
        })
        .collect()
}

/// Pick the largest valid contour that encloses `seed`. Ties keep the first
/// traced contour.
pub fn select_region(contours: Vec<Contour>, seed: PixelOffset) -> Option<Contour> {
    let mut best: Option<(f64, Contour)> = None;

    for contour in contours {
        if !contour.is_valid() || !contour.contains(seed) {
            continue;
        }

        let area = contour.area();
        match &best {
            Some((best_area, _)) if *best_area >= area => {}
            _ => best = Some((area, contour)),
        }
    }

    best.map(|(_, contour)| contour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn filled_rect(width: u32, height: u32, from: (u32, u32), to: (u32, u32)) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if x >= from.0 && x <= to.0 && y >= from.1 && y <= to.1 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    #[test]
    fn test_simple_chain_keeps_rectangle_corners() {
        let image = filled_rect(20, 20, (3, 4), (12, 9));
        let contours = external_contours(&image, ChainApproximation::Simple);
        assert_eq!(contours.len(), 1);

        let mut corners = contours[0].points.clone();
        corners.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            corners,
            vec![
                PixelOffset::new(3, 4),
                PixelOffset::new(12, 4),
                PixelOffset::new(3, 9),
                PixelOffset::new(12, 9),
            ]
        );
    }

    #[test]
    fn test_no_approximation_keeps_every_border_pixel() {
        let image = filled_rect(20, 20, (3, 4), (12, 9));
        let contours = external_contours(&image, ChainApproximation::None);
        assert_eq!(contours.len(), 1);
        // Perimeter of a 10x6 block
        assert_eq!(contours[0].len(), 2 * (10 + 6) - 4);
    }

    #[test]
    fn test_holes_are_not_reported() {
        let mut image = filled_rect(30, 30, (2, 2), (27, 27));
        for y in 10..20 {
            for x in 10..20 {
                image.put_pixel(x, y, Luma([0u8]));
            }
        }
        let contours = external_contours(&image, ChainApproximation::Simple);
        assert_eq!(contours.len(), 1);
        let (min, max) = contours[0].bounding_box().expect("Non-empty contour");
        assert_eq!((min.x, min.y, max.x, max.y), (2, 2, 27, 27));
    }

    #[test]
    fn test_full_image_blob_is_traced() {
        let image = GrayImage::from_pixel(8, 6, Luma([255u8]));
        let contours = external_contours(&image, ChainApproximation::Simple);
        assert_eq!(contours.len(), 1);
        let (min, max) = contours[0].bounding_box().expect("Non-empty contour");
        assert_eq!((min.x, min.y, max.x, max.y), (0, 0, 7, 5));
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn test_blob_touching_top_left_edges_is_traced() {
        let mut image = filled_rect(12, 10, (0, 0), (6, 4));
        image.put_pixel(11, 9, Luma([255u8]));
        let contours = external_contours(&image, ChainApproximation::None);

        let region = select_region(contours, PixelOffset::new(0, 0)).expect("Seed corner is on the blob");
        let (min, max) = region.bounding_box().expect("Non-empty contour");
        assert_eq!((min.x, min.y, max.x, max.y), (0, 0, 6, 4));
        assert_eq!(region.len(), 2 * (7 + 5) - 4);
    }

    #[test]
    fn test_compress_runs_keeps_turns_only() {
        let ring = vec![
            PixelOffset::new(0, 0),
            PixelOffset::new(1, 0),
            PixelOffset::new(2, 0),
            PixelOffset::new(2, 1),
            PixelOffset::new(2, 2),
            PixelOffset::new(1, 1),
        ];
        let compressed = compress_runs(ring);
        assert_eq!(
            compressed,
            vec![PixelOffset::new(0, 0), PixelOffset::new(2, 0), PixelOffset::new(2, 2)]
        );
    }

    #[test]
    fn test_select_region_prefers_contour_with_seed() {
        let small = Contour::new(vec![
            PixelOffset::new(0, 0),
            PixelOffset::new(4, 0),
            PixelOffset::new(4, 4),
            PixelOffset::new(0, 4),
        ]);
        let large = Contour::new(vec![
            PixelOffset::new(10, 10),
            PixelOffset::new(40, 10),
            PixelOffset::new(40, 40),
            PixelOffset::new(10, 40),
        ]);

        let chosen = select_region(vec![large.clone(), small.clone()], PixelOffset::new(2, 2));
        assert_eq!(chosen, Some(small.clone()));

        let chosen = select_region(vec![small.clone(), large.clone()], PixelOffset::new(20, 20));
        assert_eq!(chosen, Some(large));

        assert_eq!(select_region(vec![small], PixelOffset::new(8, 8)), None);
        assert_eq!(select_region(Vec::new(), PixelOffset::new(0, 0)), None);
    }
}
