//! Analog front end calibration.
//!
//! A calibration is started by writing `CALMOD` and setting `CALS`. The chip clears
//! `CALS` when it is done and sets `CAL_ERROR` if the procedure failed. Status is
//! always read back from the chip, never tracked locally.

use crate::clock::{Clock, Deadline};
use crate::config::{Channel, InvalidParameter};
use crate::registers::*;
use crate::{Error, Nau7802, POLL_INTERVAL_MS};
use core::result::Result;
use embedded_hal_async::{delay, i2c};

/// Which calibration procedure the chip runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CalibrationMode {
    /// Internal offset calibration.
    Internal = 0,
    /// System offset calibration. Inputs must be at the zero point.
    Offset = 2,
    /// System gain calibration. Inputs must be at full scale.
    Gain = 3,
}

/// Decoded `CALS` / `CAL_ERROR` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStatus {
    Success,
    InProgress,
    Failure,
}

impl CalibrationStatus {
    /// Decodes a `Ctrl2` register value.
    pub fn from_ctrl2(ctrl2: u8) -> Self {
        if ctrl2 & Ctrl2::Cals.mask() != 0 {
            CalibrationStatus::InProgress
        } else if ctrl2 & Ctrl2::CalError.mask() != 0 {
            CalibrationStatus::Failure
        } else {
            CalibrationStatus::Success
        }
    }
}

/// Offset and gain calibration registers of an input channel.
fn calibration_registers(channel: Channel) -> Result<(Register, Register), InvalidParameter> {
    match channel {
        Channel::Ch1 => Ok((Register::Ocal1B2, Register::Gcal1B3)),
        Channel::Ch2 => Ok((Register::Ocal2B2, Register::Gcal2B3)),
        Channel::Temperature => Err(InvalidParameter),
    }
}

impl<D, DELAY, CLOCK, I2cErr> Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c<Error = I2cErr>,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    /// Calibrates the analog front end and blocks until the chip reports the outcome.
    pub async fn calibrate_afe(&mut self, mode: CalibrationMode) -> Result<(), Error<I2cErr>> {
        self.begin_calibration(mode).await?;
        self.wait_for_calibration(0).await
    }

    /// Starts a calibration and returns as soon as the start command is written.
    ///
    /// Poll with [`Nau7802::calibration_status`] or wait with
    /// [`Nau7802::wait_for_calibration`].
    pub async fn begin_calibration(&mut self, mode: CalibrationMode) -> Result<(), Error<I2cErr>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("starting AFE calibration: {}", mode);

        self.write_field(BitField::CALMOD, mode as u8).await?;
        self.set_bit(Register::Ctrl2, Ctrl2::Cals).await
    }

    /// Reads the calibration status. Does not change device state.
    pub async fn calibration_status(&mut self) -> Result<CalibrationStatus, Error<I2cErr>> {
        let ctrl2 = self.read_register(Register::Ctrl2).await?;
        Ok(CalibrationStatus::from_ctrl2(ctrl2))
    }

    /// Polls until a running calibration completes.
    ///
    /// A `timeout_ms` of zero waits with no deadline.
    pub async fn wait_for_calibration(&mut self, timeout_ms: u32) -> Result<(), Error<I2cErr>> {
        let deadline = Deadline::after(&mut self.clock, timeout_ms);
        loop {
            match self.calibration_status().await? {
                CalibrationStatus::Success => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("AFE calibration complete");
                    return Ok(());
                }
                CalibrationStatus::Failure => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("AFE calibration reported CAL_ERROR");
                    return Err(Error::CalibrationFailed);
                }
                CalibrationStatus::InProgress => {}
            }

            if deadline.expired(&mut self.clock) {
                #[cfg(feature = "defmt")]
                defmt::warn!("AFE calibration timed out after {} ms", timeout_ms);
                return Err(Error::Timeout);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }
    }

    /// Offset calibration value of an input channel.
    pub async fn channel_offset(&mut self, channel: Channel) -> Result<i32, Error<I2cErr>> {
        let (offset, _) = calibration_registers(channel)?;
        self.read_register_i24(offset).await
    }

    pub async fn set_channel_offset(
        &mut self,
        channel: Channel,
        value: i32,
    ) -> Result<(), Error<I2cErr>> {
        let (offset, _) = calibration_registers(channel)?;
        self.write_register_i24(offset, value).await
    }

    /// Gain calibration value of an input channel.
    pub async fn channel_gain(&mut self, channel: Channel) -> Result<u32, Error<I2cErr>> {
        let (_, gain) = calibration_registers(channel)?;
        self.read_register_u32(gain).await
    }

    pub async fn set_channel_gain(
        &mut self,
        channel: Channel,
        value: u32,
    ) -> Result<(), Error<I2cErr>> {
        let (_, gain) = calibration_registers(channel)?;
        self.write_register_u32(gain, value).await
    }
}
