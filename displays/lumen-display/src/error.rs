//! Display driver errors

/// Display driver errors
///
/// `E` is the error type of the underlying [`I2cBus`](lumen_hal::I2cBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// A bus transaction failed
    Bus(E),
    /// Column, page or buffer index outside the panel
    InvalidCoordinates,
    /// Scroll window or area does not fit the panel
    InvalidScrollArea,
    /// Command bytes do not fit one command frame
    FrameTooLong,
}

impl<E> From<E> for DisplayError<E> {
    fn from(e: E) -> Self {
        DisplayError::Bus(e)
    }
}

impl<E> DisplayError<E> {
    /// The bus error, if this is one
    pub fn bus(&self) -> Option<&E> {
        match self {
            DisplayError::Bus(e) => Some(e),
            _ => None,
        }
    }
}
