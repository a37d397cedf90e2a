use squeeze_compare::processing::fit_within;
use squeeze_compare::result::{compression_ratio, size_reduction_percent};
use squeeze_compare::settings::quality_to_percent;
use squeeze_compare::{
    CompressionSettings, CompressionStats, EncodeResult, EncodedImage, EncoderId, OutputFormat,
    SourceImage,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn ratio_matches_formula(source in 1u64..=50_000_000, result in 1u64..=50_000_000) {
        let ratio = compression_ratio(source, result).unwrap();
        let expected = source as f64 / result as f64;
        prop_assert!((ratio - expected).abs() <= expected * 1e-12);
    }

    #[test]
    fn reduction_matches_formula(source in 1u64..=50_000_000, result in 1u64..=50_000_000) {
        let reduction = size_reduction_percent(source, result);
        let expected = (source as f64 - result as f64) / source as f64 * 100.0;
        prop_assert!((reduction - expected).abs() < 1e-9);
        prop_assert!(reduction < 100.0);
    }

    #[test]
    fn stats_follow_stored_sizes(source_len in 1usize..20_000, result_len in 1usize..20_000) {
        let source = SourceImage::from_parts(vec![0u8; source_len], "image/png", 10, 10).unwrap();
        let result = EncodeResult::new(
            EncoderId::A,
            EncodedImage { bytes: vec![1u8; result_len], format: OutputFormat::Jpeg },
            CompressionSettings::default(),
        )
        .unwrap();

        let stats = CompressionStats::compute(&source, &result);
        prop_assert_eq!(stats.size_bytes, result_len as u64);
        prop_assert!((stats.ratio * result_len as f64 - source_len as f64).abs() < 1e-6);
    }

    #[test]
    fn settings_accept_unit_interval(quality in 0.0f32..=1.0f32) {
        let settings = CompressionSettings::new(Some(quality), None, None, None).unwrap();
        prop_assert_eq!(settings.quality, quality);
        let percent = quality_to_percent(quality);
        prop_assert!((1..=100).contains(&percent));
    }

    #[test]
    fn settings_reject_out_of_range(quality in prop_oneof![-100.0f32..-0.001f32, 1.001f32..100.0f32]) {
        prop_assert!(CompressionSettings::new(Some(quality), None, None, None).is_err());
    }

    #[test]
    fn fit_within_respects_bounds(
        width in 1u32..=5000,
        height in 1u32..=5000,
        max_width in proptest::option::of(1u32..=4000),
        max_height in proptest::option::of(1u32..=4000),
    ) {
        let (w, h) = fit_within(width, height, max_width, max_height);

        prop_assert!(w >= 1 && h >= 1);
        prop_assert!(w <= width && h <= height);
        if let Some(max_w) = max_width {
            prop_assert!(w <= max_w.max(1));
        }
        if let Some(max_h) = max_height {
            prop_assert!(h <= max_h.max(1));
        }
    }

    #[test]
    fn fit_within_keeps_aspect_ratio(
        width in 100u32..=4000,
        height in 100u32..=4000,
        max_width in 50u32..=2000,
    ) {
        let (w, h) = fit_within(width, height, Some(max_width), None);
        let original = width as f64 / height as f64;
        let fitted = w as f64 / h as f64;
        // rounding to whole pixels moves the ratio by at most one pixel per side
        let tolerance = original / h as f64 + 1.0 / h as f64;
        prop_assert!((original - fitted).abs() <= tolerance);
    }
}
