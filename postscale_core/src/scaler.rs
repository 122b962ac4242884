use crate::error::Result;
use crate::measurement::Measurement;

/// Read surface of an open scale, split out so polling code can run
/// against a scripted scale in tests.
pub trait Scaler {
    /// One raw packet, exactly as received.
    fn read_raw(&mut self) -> Result<Vec<u8>>;

    /// One packet decoded into a `Measurement`.
    fn read_measurement(&mut self) -> Result<Measurement>;

    /// One reading in grams; read and classification errors pass through
    /// unchanged.
    fn read_grams(&mut self) -> Result<u16> {
        self.read_measurement()?.grams()
    }
}

impl<S: Scaler + ?Sized> Scaler for &mut S {
    fn read_raw(&mut self) -> Result<Vec<u8>> {
        (**self).read_raw()
    }

    fn read_measurement(&mut self) -> Result<Measurement> {
        (**self).read_measurement()
    }

    fn read_grams(&mut self) -> Result<u16> {
        (**self).read_grams()
    }
}
