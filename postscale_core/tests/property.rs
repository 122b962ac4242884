use postscale_core::{Measurement, Mode, ScaleError, Stability, decode};
use proptest::prelude::*;

fn recognized_mode() -> impl Strategy<Value = i8> {
    prop_oneof![Just(2i8), Just(11i8)]
}

prop_compose! {
    fn report(always_three: BoxedStrategy<i8>, stability: BoxedStrategy<i8>, mode: BoxedStrategy<i8>)(
        a in always_three,
        s in stability,
        m in mode,
        f in any::<i8>(),
        minor in any::<u8>(),
        major in any::<u8>(),
        tail in any::<[u8; 2]>(),
    ) -> [u8; 8] {
        [a as u8, s as u8, m as u8, f as u8, minor, major, tail[0], tail[1]]
    }
}

proptest! {
    #[test]
    fn short_input_never_decodes(bytes in proptest::collection::vec(any::<u8>(), 0..8)) {
        let err = decode(&bytes).expect_err("short input");
        let is_truncated = matches!(err, ScaleError::DecodeTruncated { .. });
        prop_assert!(is_truncated);
        let m = decode(&bytes).unwrap_or_default();
        prop_assert_eq!(m.grams(), Err(ScaleError::InvalidRead));
    }

    #[test]
    fn bad_sentinel_is_always_invalid(
        r in report(any::<i8>().prop_filter("not 3", |a| *a != 3).boxed(), any::<i8>().boxed(), any::<i8>().boxed())
    ) {
        let m = decode(&r).unwrap();
        prop_assert_eq!(m.classify(), Err(ScaleError::InvalidRead));
    }

    #[test]
    fn needs_tare_wins_in_every_mode(
        r in report(Just(3i8).boxed(), Just(5i8).boxed(), recognized_mode().boxed())
    ) {
        prop_assert_eq!(decode(&r).unwrap().grams(), Err(ScaleError::NeedsTare));
    }

    #[test]
    fn loaded_ounces_is_wrong_mode(
        r in report(Just(3i8).boxed(), Just(4i8).boxed(), Just(11i8).boxed())
    ) {
        prop_assert_eq!(decode(&r).unwrap().grams(), Err(ScaleError::WrongMode));
    }

    #[test]
    fn empty_platform_passes_any_recognized_mode(
        m in recognized_mode(),
        f in any::<i8>(),
    ) {
        let r = [3u8, 2, m as u8, f as u8, 0, 0, 0, 0];
        prop_assert_eq!(decode(&r).unwrap().grams(), Ok(0));
    }

    #[test]
    fn grams_mode_is_exact_magnitude(
        r in report(Just(3i8).boxed(), prop_oneof![Just(2i8), Just(4i8)].boxed(), Just(2i8).boxed())
    ) {
        let m = decode(&r).unwrap();
        let expected = u16::from(r[4]) + u16::from(r[5]) * 256;
        prop_assert_eq!(m.grams(), Ok(expected));
    }

    #[test]
    fn classification_never_mutates(r in any::<[u8; 8]>()) {
        let m: Measurement = decode(&r).unwrap();
        let before = m;
        let _ = m.classify();
        let _ = m.grams();
        prop_assert_eq!(m, before);
        prop_assert_eq!(Stability::from(r[1] as i8).raw(), r[1] as i8);
        prop_assert_eq!(Mode::from(r[2] as i8).raw(), r[2] as i8);
    }
}
