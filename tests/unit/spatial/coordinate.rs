//! Tests for lattice coordinates and inclusive bounding boxes

#[cfg(test)]
mod tests {
    use poissonblend::spatial::coordinate::{BoundingBox, Coordinate};

    // Tests canvas membership at every edge
    // Verified by using <= instead of < on the far edges
    #[test]
    fn test_within_canvas_edges() {
        assert!(Coordinate::new(0, 0).within(4, 3));
        assert!(Coordinate::new(3, 2).within(4, 3));
        assert!(!Coordinate::new(4, 2).within(4, 3));
        assert!(!Coordinate::new(3, 3).within(4, 3));
        assert!(!Coordinate::new(-1, 0).within(4, 3));
    }

    // Tests parity follows x + y including negative positions
    // Verified by using % instead of rem_euclid
    #[test]
    fn test_parity_of_negative_coordinates() {
        assert!(Coordinate::new(2, 4).is_even());
        assert!(!Coordinate::new(2, 3).is_even());
        assert!(Coordinate::new(-1, -1).is_even());
        assert!(!Coordinate::new(-1, 0).is_even());
    }

    // Tests the enclosing box and its inclusive extent
    // Verified by computing width as x_max - x_min
    #[test]
    fn test_enclosing_box_extent() {
        let points = [
            Coordinate::new(3, 7),
            Coordinate::new(5, 2),
            Coordinate::new(4, 4),
        ];
        let bounds = BoundingBox::enclosing(&points).unwrap_or(BoundingBox {
            x_min: 0,
            y_min: 0,
            x_max: 0,
            y_max: 0,
        });

        assert_eq!(bounds.origin(), Coordinate::new(3, 2));
        assert_eq!(bounds.width(), 3);
        assert_eq!(bounds.height(), 6);
        assert!(bounds.contains(Coordinate::new(5, 7)));
        assert!(!bounds.contains(Coordinate::new(6, 7)));
    }

    // Tests an empty point set has no bounding box
    // Verified by returning a zero box for empty input
    #[test]
    fn test_enclosing_empty_is_none() {
        assert_eq!(BoundingBox::enclosing(&[]), None);
    }

    // Tests translation moves both corners
    // Verified by offsetting only the minimum corner
    #[test]
    fn test_offset_box_and_coordinate() {
        let bounds = BoundingBox {
            x_min: 1,
            y_min: 2,
            x_max: 4,
            y_max: 6,
        };
        let Some(moved) = bounds.checked_offset(-1, 3) else {
            unreachable!("small offsets stay in range");
        };

        assert_eq!(moved.origin(), Coordinate::new(0, 5));
        assert_eq!((moved.x_max, moved.y_max), (3, 9));
        assert_eq!(moved.width(), bounds.width());
        assert_eq!(Coordinate::new(2, 2).offset(-3, 1), Coordinate::new(-1, 3));
        assert_eq!(Coordinate::from([7, 8]).to_string(), "(7, 8)");
    }

    // Tests overflowing shifts are reported instead of wrapping
    // Verified by using wrapping_add in checked_offset
    #[test]
    fn test_checked_offset_overflow() {
        let bounds = BoundingBox {
            x_min: 0,
            y_min: 0,
            x_max: 5,
            y_max: 5,
        };

        assert_eq!(Coordinate::new(i32::MAX, 0).checked_offset(1, 0), None);
        assert_eq!(Coordinate::new(0, i32::MIN).checked_offset(0, -1), None);
        assert_eq!(bounds.checked_offset(i32::MAX - 5, 0).map(|b| b.x_max), Some(i32::MAX));
        assert_eq!(bounds.checked_offset(i32::MAX - 4, 0), None);
    }

    // Tests extents of huge boxes saturate and are flagged unaddressable
    // Verified by subtracting the corners in i32
    #[test]
    fn test_extent_of_huge_box() {
        let full = BoundingBox {
            x_min: i32::MIN,
            y_min: 0,
            x_max: i32::MAX,
            y_max: 0,
        };
        let inverted = BoundingBox {
            x_min: 3,
            y_min: 0,
            x_max: 1,
            y_max: 0,
        };

        assert_eq!(full.width(), u32::MAX);
        assert_eq!(full.height(), 1);
        assert!(!full.is_addressable());
        assert_eq!(inverted.width(), 0);
        assert!(!inverted.is_addressable());
        assert!(
            BoundingBox {
                x_min: -10,
                y_min: -10,
                x_max: 10,
                y_max: 10,
            }
            .is_addressable()
        );
    }
}
