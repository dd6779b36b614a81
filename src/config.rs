//! Device configuration values and the setters that write them.

use crate::clock::Clock;
use crate::registers::*;
use crate::{Error, Nau7802};
use core::result::Result;
use embedded_hal_async::{delay, i2c};

/// A value outside the chip's documented set, or a register access outside the map.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidParameter;

/// Internal LDO output voltage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Voltage {
    L2v4 = 0b111,
    L2v7 = 0b110,
    L3v0 = 0b101,
    L3v3 = 0b100,
    L3v6 = 0b011,
    L3v9 = 0b010,
    L4v2 = 0b001,
    L4v5 = 0b000,
}

/// Voltage in tenths of a volt, e.g. `33` for 3.3V.
impl TryFrom<u8> for Voltage {
    type Error = InvalidParameter;

    fn try_from(decivolts: u8) -> Result<Self, Self::Error> {
        match decivolts {
            24 => Ok(Voltage::L2v4),
            27 => Ok(Voltage::L2v7),
            30 => Ok(Voltage::L3v0),
            33 => Ok(Voltage::L3v3),
            36 => Ok(Voltage::L3v6),
            39 => Ok(Voltage::L3v9),
            42 => Ok(Voltage::L4v2),
            45 => Ok(Voltage::L4v5),
            _ => Err(InvalidParameter),
        }
    }
}

/// PGA gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    G128 = 0b111,
    G64 = 0b110,
    G32 = 0b101,
    G16 = 0b100,
    G8 = 0b011,
    G4 = 0b010,
    G2 = 0b001,
    G1 = 0b000,
}

/// Gain multiplier, e.g. `128`.
impl TryFrom<u8> for Gain {
    type Error = InvalidParameter;

    fn try_from(multiplier: u8) -> Result<Self, Self::Error> {
        match multiplier {
            1 => Ok(Gain::G1),
            2 => Ok(Gain::G2),
            4 => Ok(Gain::G4),
            8 => Ok(Gain::G8),
            16 => Ok(Gain::G16),
            32 => Ok(Gain::G32),
            64 => Ok(Gain::G64),
            128 => Ok(Gain::G128),
            _ => Err(InvalidParameter),
        }
    }
}

/// ADC conversion rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SamplesPerSecond {
    SPS320 = 0b111,
    SPS80 = 0b011,
    SPS40 = 0b010,
    SPS20 = 0b001,
    SPS10 = 0b000,
}

impl TryFrom<u16> for SamplesPerSecond {
    type Error = InvalidParameter;

    fn try_from(rate: u16) -> Result<Self, Self::Error> {
        match rate {
            10 => Ok(SamplesPerSecond::SPS10),
            20 => Ok(SamplesPerSecond::SPS20),
            40 => Ok(SamplesPerSecond::SPS40),
            80 => Ok(SamplesPerSecond::SPS80),
            320 => Ok(SamplesPerSecond::SPS320),
            _ => Err(InvalidParameter),
        }
    }
}

/// Analog input selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch1,
    Ch2,
    /// Internal temperature sensor routed to the PGA.
    Temperature,
}

/// Channel index as numbered by the chip: 0, 1, or 2 for the temperature sensor.
impl TryFrom<u8> for Channel {
    type Error = InvalidParameter;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Channel::Ch1),
            1 => Ok(Channel::Ch2),
            2 => Ok(Channel::Temperature),
            _ => Err(InvalidParameter),
        }
    }
}

/// LDO regulation mode, selected by the external capacitor's ESR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LdoMode {
    /// Higher DC gain, needs an output capacitor ESR below 1 ohm.
    Accuracy,
    /// Lower DC gain, tolerates ESR below 5 ohm.
    Stability,
}

/// Level of the DRDY pin when a conversion is ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrdyPolarity {
    ActiveHigh,
    ActiveLow,
}

/// Settings applied by [`Nau7802::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub gain: Gain,
    pub sample_rate: SamplesPerSecond,
    /// Internal LDO voltage. `None` runs AVDD from the external supply.
    pub ldo_voltage: Option<Voltage>,
    /// Settling time after LDO configuration, before the AFE is calibrated.
    pub ldo_ramp_delay_ms: u32,
    /// Enable the PGA output bypass capacitor (needs a cap across VIN2P/VIN2N).
    pub pga_output_bypass_cap: bool,
    /// Soft reset all registers first.
    pub reset: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gain: Gain::G128,
            sample_rate: SamplesPerSecond::SPS80,
            ldo_voltage: Some(Voltage::L3v3),
            ldo_ramp_delay_ms: crate::DEFAULT_LDO_RAMP_DELAY_MS,
            pga_output_bypass_cap: true,
            reset: true,
        }
    }
}

impl<D, DELAY, CLOCK, I2cErr> Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c<Error = I2cErr>,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    /// Sets the ADC sample rate.
    pub async fn set_sample_rate(
        &mut self,
        sample_rate: SamplesPerSecond,
    ) -> Result<(), Error<I2cErr>> {
        self.write_field(BitField::CRS, sample_rate as u8).await
    }

    /// Sets the instrumentation amplifier gain.
    pub async fn set_gain(&mut self, gain: Gain) -> Result<(), Error<I2cErr>> {
        self.write_field(BitField::GAIN, gain as u8).await
    }

    /// Sets the LDO voltage (used for the ADC and analog circuitry) and switches AVDD
    /// to the internal LDO.
    pub async fn set_ldo_voltage(&mut self, ldo_voltage: Voltage) -> Result<(), Error<I2cErr>> {
        self.write_field(BitField::VLDO, ldo_voltage as u8).await?;
        self.set_bit(Register::PuCtrl, PuCtrl::AVDDS).await
    }

    /// Runs AVDD from the external supply pin instead of the internal LDO.
    pub async fn use_external_avdd(&mut self) -> Result<(), Error<I2cErr>> {
        self.clear_bit(Register::PuCtrl, PuCtrl::AVDDS).await
    }

    pub async fn set_ldo_mode(&mut self, mode: LdoMode) -> Result<(), Error<I2cErr>> {
        match mode {
            LdoMode::Accuracy => self.clear_bit(Register::Pga, Pga::LdoMode).await,
            LdoMode::Stability => self.set_bit(Register::Pga, Pga::LdoMode).await,
        }
    }

    /// Selects the analog input routed to the PGA.
    pub async fn set_channel(&mut self, channel: Channel) -> Result<(), Error<I2cErr>> {
        match channel {
            Channel::Ch1 => {
                self.clear_bit(Register::I2CControl, I2cControl::Ts).await?;
                self.clear_bit(Register::Ctrl2, Ctrl2::Chs).await
            }
            Channel::Ch2 => {
                self.clear_bit(Register::I2CControl, I2cControl::Ts).await?;
                self.set_bit(Register::Ctrl2, Ctrl2::Chs).await
            }
            Channel::Temperature => self.set_bit(Register::I2CControl, I2cControl::Ts).await,
        }
    }

    /// Enables the PGA output bypass capacitor for improved ENOB in single channel applications.
    /// Requires an external capacitor be connected across VIN2P and VIN2N,
    /// See application circuit note 9.4.
    pub async fn set_pga_cap_enable(&mut self, enabled: bool) -> Result<(), Error<I2cErr>> {
        self.write_register_bit(Register::PgaPwr, PgaPwr::CapEn, enabled)
            .await
    }

    /// Routes the input straight to the ADC, bypassing the PGA.
    pub async fn set_pga_bypass(&mut self, enabled: bool) -> Result<(), Error<I2cErr>> {
        self.write_register_bit(Register::Pga, Pga::BypassEn, enabled)
            .await
    }

    pub async fn set_drdy_polarity(&mut self, polarity: DrdyPolarity) -> Result<(), Error<I2cErr>> {
        let active_low = polarity == DrdyPolarity::ActiveLow;
        self.write_register_bit(Register::Ctrl1, Ctrl1::Crp, active_low)
            .await
    }
}
