// tests/property_tests.rs

use ebahqr::{classify, entropy, entropy_grid, EncodingScheme, Image};
use proptest::prelude::*;

fn image_strategy() -> impl Strategy<Value = Image> {
    (1usize..4, 1usize..4, 0u16..=255).prop_flat_map(|(rows, cols, spread)| {
        let len = rows * cols * 16;
        prop::collection::vec(0u16..=spread, len)
            .prop_map(move |pixels| Image::new(rows * 4, cols * 4, pixels).unwrap())
    })
}

proptest! {
    #[test]
    fn prop_entropy_bounded_by_block_area(image in image_strategy()) {
        let grid = image.block_grid(4).unwrap();
        for block in image.blocks(&grid) {
            let h = entropy(&block).unwrap();
            prop_assert!(h >= 0.0);
            prop_assert!(h <= 4.0 + 1e-9, "entropy {} above log2(16)", h);
        }
    }

    #[test]
    fn prop_uniform_block_has_zero_entropy(value in 0u16..=u16::MAX, size in 1usize..9) {
        let image = Image::filled(size, size, value).unwrap();
        let grid = image.block_grid(size).unwrap();
        prop_assert_eq!(entropy(&image.block(&grid, 0, 0)).unwrap(), 0.0);
    }

    #[test]
    fn prop_distinct_values_reach_log2_area(offset in 0u16..1000, size in 1usize..9) {
        let image = Image::from_fn(size, size, |y, x| offset + (y * size + x) as u16).unwrap();
        let grid = image.block_grid(size).unwrap();
        let h = entropy(&image.block(&grid, 0, 0)).unwrap();
        prop_assert!((h - ((size * size) as f64).log2()).abs() < 1e-9);
    }

    #[test]
    fn prop_raising_threshold_never_adds_exact_blocks(
        image in image_strategy(),
        low in 0.0f64..4.0,
        delta in 0.0f64..2.0,
    ) {
        let grid = entropy_grid(&image, 4).unwrap();
        let strict = classify(&grid, low + delta).unwrap();
        let loose = classify(&grid, low).unwrap();
        for (a, b) in strict.cells().iter().zip(loose.cells()) {
            if *a == EncodingScheme::Exact {
                prop_assert_eq!(*b, EncodingScheme::Exact);
            }
        }
        prop_assert!(strict.count(EncodingScheme::Exact) <= loose.count(EncodingScheme::Exact));
    }
}
