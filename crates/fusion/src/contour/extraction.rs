use image::GrayImage;
use sketch_kit_common::Point;

use crate::{error::Result, traits::BoundaryExtractor};

/// Neighbor-scanning boundary extractor.
///
/// A foreground pixel is a boundary point iff at least one of its
/// 8-connected neighbors is background or out of bounds. Points come out
/// in scan order, so the result is a best-effort display aid rather than
/// a verified simple polygon; true connected-component tracing would be
/// an improvement but is not required here.
#[derive(Debug, Clone, Default)]
pub struct NeighborScanBoundary;

impl BoundaryExtractor for NeighborScanBoundary {
    fn extract_boundary(&self, mask: &GrayImage) -> Result<Vec<Point>> {
        let (width, height) = mask.dimensions();
        let is_foreground = |x: i64, y: i64| -> bool {
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                return false;
            }
            mask.get_pixel(x as u32, y as u32)[0] > 0
        };

        let mut boundary = Vec::new();
        for y in 0..height {
            for x in 0..width {
                if mask.get_pixel(x, y)[0] == 0 {
                    continue;
                }
                let (xi, yi) = (x as i64, y as i64);
                let mut on_boundary = false;
                'neighbors: for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        if !is_foreground(xi + dx, yi + dy) {
                            on_boundary = true;
                            break 'neighbors;
                        }
                    }
                }
                if on_boundary {
                    boundary.push(Point::new(x as f64, y as f64));
                }
            }
        }
        Ok(boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_filled_block_keeps_only_its_rim() {
        // 4x4 foreground block inside a 10x10 mask
        let mask = GrayImage::from_fn(10, 10, |x, y| {
            Luma([if (3..7).contains(&x) && (3..7).contains(&y) {
                255
            } else {
                0
            }])
        });
        let boundary = NeighborScanBoundary.extract_boundary(&mask).unwrap();
        // 4x4 block: 16 pixels, 4 interior, 12 rim
        assert_eq!(boundary.len(), 12);
        assert!(!boundary.contains(&Point::new(4.0, 4.0)));
        assert!(boundary.contains(&Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_image_border_counts_as_background() {
        let mask = GrayImage::from_pixel(3, 3, Luma([255u8]));
        let boundary = NeighborScanBoundary.extract_boundary(&mask).unwrap();
        // Every pixel touches the border except the center, which is
        // surrounded by foreground
        assert_eq!(boundary.len(), 8);
    }

    #[test]
    fn test_empty_mask_yields_no_points() {
        let mask = GrayImage::new(8, 8);
        let boundary = NeighborScanBoundary.extract_boundary(&mask).unwrap();
        assert!(boundary.is_empty());
    }
}
