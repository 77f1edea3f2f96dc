//! Tests for patch reconstruction and merging

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use ndarray::array;
    use poissonblend::algorithm::compositor::{OPAQUE, TRANSPARENT, merge_patch, reconstruct};
    use poissonblend::spatial::coordinate::{BoundingBox, Coordinate};

    fn bounds() -> BoundingBox {
        BoundingBox {
            x_min: 4,
            y_min: 2,
            x_max: 6,
            y_max: 4,
        }
    }

    // Tests interior pixels are rounded, clamped and placed relative to the origin
    // Verified by writing at absolute canvas coordinates
    #[test]
    fn test_reconstruct_places_and_quantizes() {
        let u = array![[12.5, -3.0, 300.0], [0.49, 254.6, 100.0]];
        let area = [Coordinate::new(5, 3), Coordinate::new(6, 4)];

        let patch = reconstruct(&u, &area, bounds());

        assert_eq!(patch.dimensions(), (3, 3));
        assert_eq!(*patch.get_pixel(1, 1), Rgba([13, 0, 255, OPAQUE]));
        assert_eq!(*patch.get_pixel(2, 2), Rgba([0, 255, 100, OPAQUE]));
        assert_eq!(patch.get_pixel(0, 0).0[3], TRANSPARENT);
    }

    // Tests non-finite values never panic and map to channel bounds
    // Verified by casting NaN directly to u8 after rounding
    #[test]
    fn test_reconstruct_non_finite_values() {
        let u = array![[f64::NAN, f64::INFINITY, f64::NEG_INFINITY]];
        let area = [Coordinate::new(4, 2)];

        let patch = reconstruct(&u, &area, bounds());

        assert_eq!(*patch.get_pixel(0, 0), Rgba([0, 255, 0, OPAQUE]));
    }

    // Tests merging copies only opaque pixels
    // Verified by copying every patch pixel
    #[test]
    fn test_merge_skips_transparent() {
        let mut canvas = RgbaImage::from_pixel(8, 6, Rgba([9, 9, 9, 255]));
        let u = array![[100.0, 110.0, 120.0]];
        let patch = reconstruct(&u, &[Coordinate::new(5, 3)], bounds());

        merge_patch(&mut canvas, &patch, bounds().origin());

        assert_eq!(*canvas.get_pixel(5, 3), Rgba([100, 110, 120, 255]));
        assert_eq!(*canvas.get_pixel(4, 2), Rgba([9, 9, 9, 255]));
        assert_eq!(*canvas.get_pixel(6, 4), Rgba([9, 9, 9, 255]));
    }

    // Tests pixels falling off the canvas are dropped
    // Verified by wrapping negative coordinates
    #[test]
    fn test_merge_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        let patch = RgbaImage::from_pixel(2, 2, Rgba([50, 60, 70, OPAQUE]));

        merge_patch(&mut canvas, &patch, Coordinate::new(-1, 2));

        assert_eq!(*canvas.get_pixel(0, 2), Rgba([50, 60, 70, OPAQUE]));
        assert_eq!(*canvas.get_pixel(1, 2), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(0, 1), Rgba([0, 0, 0, 255]));
    }
}
