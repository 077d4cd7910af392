use labelreview::scale::{compute_scale, DisplayPolicy, RadiusScale, ScaleContext};
use labelreview::store::ShapeStore;
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn display_fits_frame_and_never_enlarges(
        (w, h) in proptest_helpers::arb_image_dims(),
        (max_w, max_h) in proptest_helpers::arb_max_dims(),
    ) {
        let ctx = compute_scale(w, h, max_w, max_h).expect("positive dims");

        prop_assert!(ctx.display_width >= 1 && ctx.display_height >= 1);
        prop_assert!(ctx.display_width <= w && ctx.display_height <= h);
        prop_assert!(ctx.display_width <= max_w);
        prop_assert!(ctx.display_height <= max_h);
        prop_assert!(ctx.ratio_w >= 1.0 && ctx.ratio_h >= 1.0);
    }

    #[test]
    fn images_within_frame_are_unchanged(
        (max_w, max_h) in proptest_helpers::arb_max_dims(),
        fw in 0.0..=1.0f64,
        fh in 0.0..=1.0f64,
    ) {
        let w = ((f64::from(max_w) * fw) as u32).max(1);
        let h = ((f64::from(max_h) * fh) as u32).max(1);
        let ctx = compute_scale(w, h, max_w, max_h).expect("positive dims");

        prop_assert_eq!((ctx.display_width, ctx.display_height), (w, h));
        prop_assert!(ctx.is_identity());
    }

    #[test]
    fn round_trip_moves_each_coordinate_by_less_than_its_ratio(
        ((w, h), draft) in proptest_helpers::arb_image_dims()
            .prop_flat_map(|(w, h)| (Just((w, h)), proptest_helpers::arb_draft(w, h))),
        geometric_mean in any::<bool>(),
    ) {
        let policy = DisplayPolicy {
            radius: if geometric_mean { RadiusScale::GeometricMean } else { RadiusScale::Width },
            ..DisplayPolicy::default()
        };
        let ctx = ScaleContext::for_image(w, h, &policy).expect("positive dims");

        let mut store = ShapeStore::new("img.jpg");
        let id = store.add(draft).expect("id available");
        let original = store.get_by_id(id).expect("stored").clone();

        let back = ctx.to_original(&ctx.to_display(&original));
        prop_assert_eq!(back.id(), original.id());
        prop_assert_eq!(back.kind(), original.kind());

        let before = proptest_helpers::coords_with_ratios(
            &original.geometry, ctx.ratio_w, ctx.ratio_h, ctx.ratio_r());
        let after = proptest_helpers::coords_with_ratios(
            &back.geometry, ctx.ratio_w, ctx.ratio_h, ctx.ratio_r());
        prop_assert_eq!(before.len(), after.len());
        for ((v0, ratio), (v1, _)) in before.iter().zip(&after) {
            prop_assert!(*v1 <= *v0 + 1e-9, "round trip grew {} to {}", v0, v1);
            prop_assert!(v0 - v1 < ratio + 1e-9, "moved {} to {} with ratio {}", v0, v1, ratio);
        }
    }
}
