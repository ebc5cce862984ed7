//! Bordered fill mask and the seeded, mask-only flood fill that grows the
//! clicked region up to the detected walls.

use std::collections::VecDeque;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use strum::{Display, EnumString, IntoStaticStr};

/// Mask value marking a wall copied from the edge map
pub const WALL_VALUE: u8 = 1;

/// Mask value written by the flood fill
pub const FILL_VALUE: u8 = 255;

/// Neighbourhood used when growing the fill
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Connectivity {
    /// Edge-adjacent neighbours only; diagonal wall gaps do not leak
    #[default]
    Four,
    /// Edge- and corner-adjacent neighbours
    Eight,
}

impl Connectivity {
    fn neighbours(self) -> &'static [(i64, i64)] {
        const FOUR: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const EIGHT: [(i64, i64); 8] = [
            (1, 0), (-1, 0), (0, 1), (0, -1),
            (1, 1), (1, -1), (-1, 1), (-1, -1),
        ];
        match self {
            Self::Four => &FOUR,
            Self::Eight => &EIGHT,
        }
    }
}

/// Build a zeroed mask one pixel larger than `walls` on every side and copy
/// the walls into its interior.
pub fn build_mask(walls: &GrayImage) -> GrayImage {
    let (width, height) = walls.dimensions();
    let mut mask = GrayImage::new(width + 2, height + 2);

    for (x, y, pixel) in walls.enumerate_pixels() {
        if pixel[0] != 0 {
            mask.put_pixel(x + 1, y + 1, Luma([WALL_VALUE]));
        }
    }

    mask
}

/// Fill the zero-valued region of `mask` connected to `seed` (mask
/// coordinates) with [`FILL_VALUE`]. The one-pixel border is never filled.
///
/// Returns the number of newly filled cells; 0 when the seed sits on a wall,
/// on an already filled cell or outside the interior.
pub fn flood_fill(mask: &mut GrayImage, seed: (u32, u32), connectivity: Connectivity) -> usize {
    let (width, height) = mask.dimensions();
    if width < 3 || height < 3 {
        return 0;
    }

    let (max_x, max_y) = (i64::from(width) - 2, i64::from(height) - 2);
    let inside = |x: i64, y: i64| x >= 1 && y >= 1 && x <= max_x && y <= max_y;

    let (seed_x, seed_y) = (i64::from(seed.0), i64::from(seed.1));
    if !inside(seed_x, seed_y) || mask.get_pixel(seed.0, seed.1)[0] != 0 {
        return 0;
    }

    let mut queue = VecDeque::new();
    mask.put_pixel(seed.0, seed.1, Luma([FILL_VALUE]));
    queue.push_back((seed_x, seed_y));
    let mut filled = 1;

    while let Some((x, y)) = queue.pop_front() {
        for &(dx, dy) in connectivity.neighbours() {
            let (nx, ny) = (x + dx, y + dy);
            if !inside(nx, ny) {
                continue;
            }

            // Bounded by the interior check above
            let (ux, uy) = (nx as u32, ny as u32);
            if mask.get_pixel(ux, uy)[0] == 0 {
                mask.put_pixel(ux, uy, Luma([FILL_VALUE]));
                queue.push_back((nx, ny));
                filled += 1;
            }
        }
    }

    filled
}

/// Strip the border and keep only filled cells, as a 0/255 image of the
/// original tile size.
pub fn crop_filled(mask: &GrayImage) -> GrayImage {
    let width = mask.width().saturating_sub(2);
    let height = mask.height().saturating_sub(2);

    GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x + 1, y + 1)[0] == FILL_VALUE {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
