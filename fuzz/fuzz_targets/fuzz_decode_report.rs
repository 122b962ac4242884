#![no_main]
use libfuzzer_sys::fuzz_target;
use postscale_core::{ScaleError, decode};

fuzz_target!(|data: &[u8]| {
    match decode(data) {
        Ok(m) => {
            assert!(data.len() >= 8);
            if let Ok(g) = m.grams() {
                assert_eq!(g, u16::from(data[4]) + u16::from(data[5]) * 256);
            }
        }
        Err(ScaleError::DecodeTruncated { got, .. }) => assert_eq!(got, data.len()),
        Err(other) => panic!("decode produced {other:?}"),
    }
});
