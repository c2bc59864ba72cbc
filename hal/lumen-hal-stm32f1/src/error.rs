//! Bus controller errors

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::regs::sr1;

/// SR1 status flag a transfer step waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    /// SB - start condition generated
    StartBit,
    /// ADDR - address sent/matched
    AddressSent,
    /// TXE - data register empty
    TxEmpty,
    /// BTF - byte transfer finished
    ByteTransferFinished,
    /// RXNE - data register not empty
    RxNotEmpty,
    /// AF - acknowledge failure (peer NACK)
    AckFailure,
    /// STOPF - stop detected
    StopDetected,
}

impl Flag {
    /// SR1 bit for this flag
    pub const fn mask(self) -> u16 {
        match self {
            Flag::StartBit => sr1::SB,
            Flag::AddressSent => sr1::ADDR,
            Flag::TxEmpty => sr1::TXE,
            Flag::ByteTransferFinished => sr1::BTF,
            Flag::RxNotEmpty => sr1::RXNE,
            Flag::AckFailure => sr1::AF,
            Flag::StopDetected => sr1::STOPF,
        }
    }
}

/// Invalid bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Speed is zero or above 400 kHz
    SpeedOutOfRange,
    /// APB1 clock outside the 2..=36 MHz range the peripheral accepts
    PeripheralClockOutOfRange,
    /// Own address does not fit the addressing mode
    OwnAddressOutOfRange,
    /// Poll budget must allow at least one status read
    ZeroPollBudget,
}

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// A status flag did not appear within the poll budget
    Timeout(Flag),
    /// Burst receive needs at least two bytes
    InvalidLength,
    /// Instance/pin combination not available
    UnsupportedInstance,
    /// Configuration rejected before touching the peripheral
    InvalidConfig(ConfigError),
    /// Responder receive got more bytes than the buffer holds
    BufferOverflow,
    /// Operation order the receive sequences cannot express
    UnsupportedSequence,
}

impl From<ConfigError> for I2cError {
    fn from(e: ConfigError) -> Self {
        I2cError::InvalidConfig(e)
    }
}

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            I2cError::Timeout(Flag::AddressSent) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            I2cError::Timeout(Flag::AckFailure) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            }
            I2cError::BufferOverflow => ErrorKind::Overrun,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::Error as _;

    #[test]
    fn test_address_timeout_is_nack() {
        assert_eq!(
            I2cError::Timeout(Flag::AddressSent).kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(I2cError::Timeout(Flag::TxEmpty).kind(), ErrorKind::Other);
        assert_eq!(I2cError::BufferOverflow.kind(), ErrorKind::Overrun);
    }

    #[test]
    fn test_config_error_conversion() {
        let e: I2cError = ConfigError::SpeedOutOfRange.into();
        assert_eq!(e, I2cError::InvalidConfig(ConfigError::SpeedOutOfRange));
    }
}
