//! NAU7802 register map and bit positions.
//!
//! These values are fixed by the chip and must match the datasheet byte for byte.

#![allow(clippy::upper_case_acronyms)]

use crate::config::InvalidParameter;

/// Last valid register address.
pub(crate) const LAST_ADDRESS: u8 = 0x1F;

/// Represents the register addresses in the NAU7802 ADC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Power-Up Control Register
    PuCtrl = 0x00,
    /// Control Register 1
    Ctrl1,
    /// Control Register 2
    Ctrl2,
    /// Channel 1 Offset Calibration MSB
    Ocal1B2,
    /// Channel 1 Offset Calibration Middle Byte
    Ocal1B1,
    /// Channel 1 Offset Calibration LSB
    Ocal1B0,
    /// Channel 1 Gain Calibration MSB
    Gcal1B3,
    /// Channel 1 Gain Calibration Byte 2
    Gcal1B2,
    /// Channel 1 Gain Calibration Byte 1
    Gcal1B1,
    /// Channel 1 Gain Calibration LSB
    Gcal1B0,
    /// Channel 2 Offset Calibration MSB
    Ocal2B2,
    /// Channel 2 Offset Calibration Middle Byte
    Ocal2B1,
    /// Channel 2 Offset Calibration LSB
    Ocal2B0,
    /// Channel 2 Gain Calibration MSB
    Gcal2B3,
    /// Channel 2 Gain Calibration Byte 2
    Gcal2B2,
    /// Channel 2 Gain Calibration Byte 1
    Gcal2B1,
    /// Channel 2 Gain Calibration LSB
    Gcal2B0,
    /// I2C Control Register
    I2CControl,
    /// ADC Conversion Result MSB
    AdcoB2,
    /// ADC Conversion Result Middle Byte
    AdcoB1,
    /// ADC Conversion Result LSB
    AdcoB0,
    /// ADC Register (shared with OTP[32:24])
    Adc = 0x15,
    /// OTP Value Byte 1 (23:16 or 7:0 depending on mode)
    OtpB1,
    /// OTP Value Byte 0 (15:8)
    OtpB0,
    /// PGA Configuration Register
    Pga = 0x1B,
    /// PGA Power Configuration Register
    PgaPwr = 0x1C,
    /// Device Revision Code Register
    DeviceRev = 0x1F,
}

impl Register {
    /// The register's bus address.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Returns the address `offset` bytes after this register, if it is still in the map.
    pub(crate) fn offset(self, offset: u8) -> Result<u8, InvalidParameter> {
        match self.addr().checked_add(offset) {
            Some(addr) if addr <= LAST_ADDRESS => Ok(addr),
            _ => Err(InvalidParameter),
        }
    }
}

/// A single bit inside a register byte.
pub trait RegisterBit {
    /// Bit number, 0 being the least significant bit.
    fn position(&self) -> u8;

    /// Single-bit mask. Only meaningful for positions below 8.
    fn mask(&self) -> u8 {
        1 << self.position()
    }
}

/// Raw bit numbers. Positions of 8 or more are rejected by the bit accessors.
impl RegisterBit for u8 {
    fn position(&self) -> u8 {
        *self
    }
}

macro_rules! register_bits {
    ($($name:ident),* $(,)?) => {
        $(
            impl RegisterBit for $name {
                fn position(&self) -> u8 {
                    *self as u8
                }
            }
        )*
    };
}

register_bits!(PuCtrl, Ctrl1, Ctrl2, I2cControl, Pga, PgaPwr);

/// Bit definitions for the `PuCtrl` (Power-Up Control) register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PuCtrl {
    /// Reset all registers except `RR`.
    RR = 0,
    /// Power up digital circuit.
    PUD,
    /// Power up analog circuit.
    PUA,
    /// Power-up ready (Read-Only Status).
    PUR,
    /// Start a conversion cycle.
    CS,
    /// Cycle ready (ADC Data Ready; Read-Only).
    CR,
    /// Select system clock source: 0 = Internal RC, 1 = External Crystal.
    OSCS,
    /// Select AVDD source: 0 = External input, 1 = Internal LDO.
    AVDDS,
}

/// Single-bit flags of the `Ctrl1` register. Gain and LDO voltage are [`BitField`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Ctrl1 {
    /// DRDY pin function: 0 = conversion ready, 1 = clock output.
    DrdySel = 6,
    /// DRDY polarity: 0 = active high, 1 = active low.
    Crp = 7,
}

/// Single-bit flags of the `Ctrl2` register. Calibration mode and conversion rate are
/// [`BitField`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Ctrl2 {
    /// Start a calibration. Reads back as 1 while calibration runs.
    Cals = 2,
    /// Calibration error flag (Read-Only).
    CalError = 3,
    /// Select analog input channel: 0 = Channel 1, 1 = Channel 2.
    Chs = 7,
}

/// Bit definitions for the `I2CControl` register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum I2cControl {
    /// Disable bandgap chopper.
    Bgpcp = 0,
    /// Switch PGA input to the temperature sensor.
    Ts,
    /// Enable the 2.5uA burnout current source on the PGA positive input.
    Bopga,
    /// Short the inputs together to measure offset.
    Si,
    /// Disable the weak pull-up on SCLK and SDA.
    Wpd,
    /// Enable the strong pull-up on SCLK and SDA.
    Spe,
    /// Fast read of ADC data (non-standard I2C).
    Frd,
    /// Pull SDA low on conversion complete while the bus is idle (non-standard I2C).
    Crsd,
}

/// Bit definitions for the `Pga` (Programmable Gain Amplifier) register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pga {
    /// Disable chopper stabilization.
    ChpDis = 0,
    /// Invert PGA input phase.
    Inv = 3,
    /// Enable PGA bypass.
    BypassEn,
    /// Enable PGA output buffer.
    OutEn,
    /// Select LDO mode: Improved stability or accuracy.
    LdoMode,
    /// Read OTP or ADC registers (shared access).
    RdOtpSel,
}

/// Bit definitions for the `PgaPwr` (PGA Power Control) register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PgaPwr {
    /// Enable PGA output bypass capacitor.
    CapEn = 7,
}

/// A run of `width` bits starting at `position` inside one register byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    register: Register,
    position: u8,
    width: u8,
}

impl BitField {
    /// `Ctrl1[2:0]`: PGA gain select.
    pub const GAIN: BitField = BitField::new(Register::Ctrl1, 0, 3);
    /// `Ctrl1[5:3]`: LDO voltage select.
    pub const VLDO: BitField = BitField::new(Register::Ctrl1, 3, 3);
    /// `Ctrl2[1:0]`: calibration mode.
    pub const CALMOD: BitField = BitField::new(Register::Ctrl2, 0, 2);
    /// `Ctrl2[6:4]`: conversion rate select.
    pub const CRS: BitField = BitField::new(Register::Ctrl2, 4, 3);

    /// Build-time constructor for the fields above. Out of range fields fail const
    /// evaluation.
    pub(crate) const fn new(register: Register, position: u8, width: u8) -> Self {
        assert!(width >= 1 && position < 8 && width <= 8 - position);
        Self {
            register,
            position,
            width,
        }
    }

    /// Builds a field from runtime values.
    pub fn try_new(register: Register, position: u8, width: u8) -> Result<Self, InvalidParameter> {
        if width == 0 || position.checked_add(width).map_or(true, |end| end > 8) {
            return Err(InvalidParameter);
        }
        Ok(Self {
            register,
            position,
            width,
        })
    }

    pub const fn register(&self) -> Register {
        self.register
    }

    pub const fn position(&self) -> u8 {
        self.position
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Largest value the field can hold.
    pub const fn max_value(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Mask of the field's bits within the register byte.
    pub const fn mask(&self) -> u8 {
        self.max_value() << self.position
    }

    /// Extracts the field from a register byte.
    pub const fn extract(&self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.position
    }

    /// Replaces the field inside `byte`, leaving other bits untouched.
    pub fn insert(&self, byte: u8, value: u8) -> Result<u8, InvalidParameter> {
        if value > self.max_value() {
            return Err(InvalidParameter);
        }
        Ok((byte & !self.mask()) | (value << self.position))
    }
}
