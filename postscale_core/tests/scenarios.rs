use postscale_core::{Measurement, ScaleError, decode};
use rstest::rstest;

#[rstest]
#[case::empty_platform_ounces(&[3, 2, 11, 255, 0, 0, 0, 0], Ok(0))]
#[case::needs_tare(&[3, 5, 11, 255, 0, 0, 0, 0], Err(ScaleError::NeedsTare))]
#[case::stable_grams(&[3, 4, 2, 0, 136, 0, 0, 0], Ok(136))]
#[case::loaded_ounces(&[3, 4, 11, 255, 147, 0, 0, 0], Err(ScaleError::WrongMode))]
#[case::major_byte(&[3, 4, 2, 0, 104, 5, 0, 0], Ok(1384))]
#[case::empty_platform_grams(&[3, 2, 2, 0, 0, 0, 0, 0], Ok(0))]
#[case::bad_sentinel(&[2, 4, 2, 0, 136, 0, 0, 0], Err(ScaleError::InvalidRead))]
#[case::zero_stability(&[3, 0, 2, 0, 136, 0, 0, 0], Err(ScaleError::InvalidRead))]
#[case::zero_mode(&[3, 4, 0, 0, 136, 0, 0, 0], Err(ScaleError::InvalidRead))]
fn full_reports(#[case] bytes: &[u8], #[case] expected: Result<u16, ScaleError>) {
    let m = decode(bytes).expect("8-byte report decodes");
    assert_eq!(m.grams(), expected);
}

#[test]
fn truncated_report_falls_back_to_invalid_zero() {
    let err = decode(&[1, 2]).expect_err("two bytes cannot decode");
    assert_eq!(err.to_string(), "unexpected end of input");

    let m = decode(&[1, 2]).unwrap_or_default();
    assert_eq!(m, Measurement::default());
    assert_eq!(m.raw_weight(), 0);
    assert_eq!(m.grams(), Err(ScaleError::InvalidRead));
}

#[test]
fn empty_ounces_platform_is_no_weight() {
    let m = decode(&[3, 2, 11, 255, 0, 0, 0, 0]).unwrap();
    assert!(m.is_no_weight());
    assert_eq!(m.classify(), Ok(()));
}
