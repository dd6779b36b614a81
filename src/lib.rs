//! # Nuvoton NAU7802 Driver
//!
//! Async driver for the two-channel NAU7802 24-bit load cell ADC, built on
//! `embedded-hal-async`.
//!
//! The driver keeps no copy of the chip's registers: every accessor is a bus round
//! trip. Read-modify-write sequences are not atomic, so one [`Nau7802`] must be the
//! only user of the device; wrap it in a mutex to share it between tasks.
//!
//! Polling loops ([`Nau7802::wait_for_calibration`], [`Nau7802::read_average`]) take
//! their deadline from an injected [`Clock`] and sleep on the injected delay provider.

#![cfg_attr(not(test), no_std)]

use crate::registers::*;
use core::result::Result;
use embedded_hal_async::{delay, i2c};

mod calibration;
mod clock;
mod codec;
mod config;
mod conversion;
pub mod registers;
#[cfg(test)]
mod testing;

pub use calibration::{CalibrationMode, CalibrationStatus};
pub use clock::Clock;
pub use config::{
    Channel, Config, DrdyPolarity, Gain, InvalidParameter, LdoMode, SamplesPerSecond, Voltage,
};
pub use conversion::Average;

/// I2C device address. The NAU7802 has no address select pins.
pub const DEVICE_ADDRESS: u8 = 0x2A;

/// Default settling time after configuring the LDO.
pub const DEFAULT_LDO_RAMP_DELAY_MS: u32 = 250;

/// Sleep between status polls.
pub(crate) const POLL_INTERVAL_MS: u32 = 1;

/// Number of `PUR` polls, 1ms apart, before power up is considered failed.
const POWER_UP_ATTEMPTS: u32 = 100;

/// Errors that can occur when using the NAU7802 driver.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<I2cErr> {
    /// Bus transfer failed (no acknowledge, short read, ...).
    I2c(I2cErr),
    /// Value outside the chip's documented set. Nothing was written.
    InvalidParameter,
    PowerupFailed,
    /// The chip set `CAL_ERROR`.
    CalibrationFailed,
    Timeout,
}

impl<I2cErr> From<InvalidParameter> for Error<I2cErr> {
    fn from(_: InvalidParameter) -> Self {
        Error::InvalidParameter
    }
}

/// NAU7802 async driver.
pub struct Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    i2c_dev: D,
    delay: DELAY,
    clock: CLOCK,
    ldo_ramp_delay_ms: u32,
}

impl<D, DELAY, CLOCK, I2cErr> Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c<Error = I2cErr>,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    /// Creates a driver without touching the bus. Call [`Nau7802::begin`] before
    /// taking readings.
    pub fn new(i2c_dev: D, delay: DELAY, clock: CLOCK) -> Self {
        Self {
            i2c_dev,
            delay,
            clock,
            ldo_ramp_delay_ms: DEFAULT_LDO_RAMP_DELAY_MS,
        }
    }

    /// Creates a driver and runs the full initialization sequence.
    ///
    /// # Arguments
    /// i2c_dev: The I2C device.
    /// delay: The delay provider.
    /// clock: Millisecond time source for timeouts.
    /// config: Settings applied before the AFE calibration.
    ///
    pub async fn try_new(
        i2c_dev: D,
        delay: DELAY,
        clock: CLOCK,
        config: Config,
    ) -> Result<Self, Error<I2cErr>> {
        let mut adc = Self::new(i2c_dev, delay, clock);
        adc.begin(&config).await?;
        Ok(adc)
    }

    /// Initializes the chip: probe, reset, power up, configure, wait for the LDO to
    /// settle, then run an internal AFE calibration.
    pub async fn begin(&mut self, config: &Config) -> Result<(), Error<I2cErr>> {
        self.probe().await?;
        if config.reset {
            self.reset().await?;
        }
        self.power_up().await?;

        match config.ldo_voltage {
            Some(voltage) => self.set_ldo_voltage(voltage).await?,
            None => self.use_external_avdd().await?,
        }
        self.set_gain(config.gain).await?;
        self.set_sample_rate(config.sample_rate).await?;

        // Turn off CLK_CHP. From 9.1 power on sequencing.
        const TURN_OFF_CLK_CHP: u8 = 0x30;
        self.write_register(Register::Adc, TURN_OFF_CLK_CHP).await?;

        self.set_pga_cap_enable(config.pga_output_bypass_cap)
            .await?;

        // AVDD must settle before calibration, even with an external supply.
        self.ldo_ramp_delay_ms = config.ldo_ramp_delay_ms;
        self.delay.delay_ms(self.ldo_ramp_delay_ms).await;

        self.calibrate_afe(CalibrationMode::Internal).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!("NAU7802 ready: {}", config);

        Ok(())
    }

    /// Returns `true` if the chip acknowledges its address.
    pub async fn is_connected(&mut self) -> bool {
        self.probe().await.is_ok()
    }

    /// Performs a soft reset of the NAU7802 device.
    pub async fn reset(&mut self) -> Result<(), Error<I2cErr>> {
        self.set_bit(Register::PuCtrl, PuCtrl::RR).await?;
        self.delay.delay_ms(1).await;
        self.clear_bit(Register::PuCtrl, PuCtrl::RR).await
    }

    /// Powers up the digital and analog sections and waits for power-up ready.
    pub async fn power_up(&mut self) -> Result<(), Error<I2cErr>> {
        // Get the current power-up control register value.
        let mut pu_ctrl = self.read_register(Register::PuCtrl).await?;

        // Enable digital and analog power-up (and clear power-up ready bit).
        pu_ctrl |= PuCtrl::PUD.mask() | PuCtrl::PUA.mask();
        pu_ctrl &= !PuCtrl::PUR.mask();

        self.write_register(Register::PuCtrl, pu_ctrl).await?;

        // PUR sets about 200us after power up; poll it every 1ms.
        for _ in 0..POWER_UP_ATTEMPTS {
            if self.get_bit(Register::PuCtrl, PuCtrl::PUR).await? {
                return Ok(());
            }
            self.delay.delay_ms(1).await;
        }

        #[cfg(feature = "defmt")]
        defmt::error!("NAU7802 power-up ready bit never set");
        Err(Error::PowerupFailed)
    }

    /// Puts the chip into its low-power state.
    pub async fn power_down(&mut self) -> Result<(), Error<I2cErr>> {
        let mut pu_ctrl = self.read_register(Register::PuCtrl).await?;
        pu_ctrl &= !(PuCtrl::PUD.mask() | PuCtrl::PUA.mask());
        self.write_register(Register::PuCtrl, pu_ctrl).await
    }

    /// Chip revision, the low nibble of `DeviceRev`.
    pub async fn revision_code(&mut self) -> Result<u8, Error<I2cErr>> {
        Ok(self.read_register(Register::DeviceRev).await? & 0x0F)
    }

    /// Time waited after LDO configuration before calibrating, in milliseconds.
    pub fn ldo_ramp_delay(&self) -> u32 {
        self.ldo_ramp_delay_ms
    }

    pub fn set_ldo_ramp_delay(&mut self, delay_ms: u32) {
        self.ldo_ramp_delay_ms = delay_ms;
    }

    /// Consumes the driver and returns the bus.
    pub fn release(self) -> D {
        self.i2c_dev
    }

    async fn probe(&mut self) -> Result<(), Error<I2cErr>> {
        self.i2c_dev
            .write(DEVICE_ADDRESS, &[])
            .await
            .map_err(Error::I2c)
    }
}
