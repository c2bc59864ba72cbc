//! I2C bus abstractions
//!
//! Byte-level transaction primitives. A transaction on the wire looks like
//!
//! ```text
//! [START] [ADDRESS+RW] [ACK] ({CONTROL|DATA} [ACK])* [STOP|RESTART]
//! ```
//!
//! and a driver builds it by calling [`I2cBus::start`], [`I2cBus::request`],
//! one or more transfer methods, and finally [`I2cBus::stop`]. Calling
//! `start` again before `stop` produces a repeated start.

/// Transfer direction encoded in bit 0 of the header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Initiator writes to the addressed device (R/W = 0)
    Write,
    /// Initiator reads from the addressed device (R/W = 1)
    Read,
}

/// Address phase byte: 7-bit address shifted left with the R/W bit appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header(u8);

impl Header {
    /// Build a header for a 7-bit device address
    pub const fn new(address: u8, direction: Direction) -> Self {
        let rw = match direction {
            Direction::Write => 0,
            Direction::Read => 1,
        };
        Self(((address & 0x7F) << 1) | rw)
    }

    /// Header addressing `address` for writing
    pub const fn write(address: u8) -> Self {
        Self::new(address, Direction::Write)
    }

    /// Header addressing `address` for reading
    pub const fn read(address: u8) -> Self {
        Self::new(address, Direction::Read)
    }

    /// Wrap an already shifted address+direction byte
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// The byte clocked out on the wire
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// 7-bit address without the direction bit
    pub const fn address(self) -> u8 {
        self.0 >> 1
    }

    /// Direction encoded in bit 0
    pub const fn direction(self) -> Direction {
        if self.0 & 0x01 == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }
}

/// Which side of the transfer this peripheral plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Drives the clock and the address phase (master)
    Initiator,
    /// Answers when its own address is matched (slave)
    Responder,
}

/// I2C bus controller
///
/// Implementations own the peripheral and enforce the hardware handshake
/// for each primitive. All methods block until the hardware reaches the
/// expected state or the implementation's wait budget runs out.
pub trait I2cBus {
    /// Error type for bus operations
    type Error;

    /// Issue a start condition (a repeated start if the bus is already held)
    fn start(&mut self);

    /// Issue a stop condition, releasing the bus
    fn stop(&mut self);

    /// Send the address phase after a start and wait for it to be acknowledged
    fn request(&mut self, header: Header) -> Result<(), Self::Error>;

    /// Transmit a single byte; the caller issues the stop
    fn write_byte(&mut self, data: u8) -> Result<(), Self::Error>;

    /// Transmit a run of bytes in the given role
    fn write_burst(&mut self, role: Role, data: &[u8]) -> Result<(), Self::Error>;

    /// Receive exactly one byte; the receive sequence issues its own stop
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Receive into `buf` in the given role
    ///
    /// As initiator the whole buffer is filled and the sequence issues its
    /// own stop. As responder bytes are stored until the remote initiator
    /// stops the transfer. Returns the number of bytes stored.
    fn read_burst(&mut self, role: Role, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn start(&mut self) {
        T::start(self)
    }

    fn stop(&mut self) {
        T::stop(self)
    }

    fn request(&mut self, header: Header) -> Result<(), Self::Error> {
        T::request(self, header)
    }

    fn write_byte(&mut self, data: u8) -> Result<(), Self::Error> {
        T::write_byte(self, data)
    }

    fn write_burst(&mut self, role: Role, data: &[u8]) -> Result<(), Self::Error> {
        T::write_burst(self, role, data)
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        T::read_byte(self)
    }

    fn read_burst(&mut self, role: Role, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_burst(self, role, buf)
    }
}
