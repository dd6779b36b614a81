//! Conversion results.

use crate::clock::{Clock, Deadline};
use crate::registers::*;
use crate::{Error, Nau7802, POLL_INTERVAL_MS};
use core::result::Result;
use embedded_hal_async::{delay, i2c};

/// Mean of several conversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Average {
    /// Truncating integer mean of the samples taken.
    pub value: i32,
    /// Number of conversions that went into `value`.
    pub samples: u16,
    /// Number of conversions asked for.
    pub requested: u16,
}

impl Average {
    /// `true` if the deadline passed before every requested sample was taken.
    pub fn is_partial(&self) -> bool {
        self.samples < self.requested
    }
}

impl<D, DELAY, CLOCK, I2cErr> Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c<Error = I2cErr>,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    /// Checks the cycle ready bit.
    pub async fn is_data_ready(&mut self) -> Result<bool, Error<I2cErr>> {
        self.get_bit(Register::PuCtrl, PuCtrl::CR).await
    }

    /// Reads the latest ADC conversion.
    ///
    /// Does not wait: check [`Nau7802::is_data_ready`] first, otherwise the previous
    /// result is read again.
    pub async fn read_conversion(&mut self) -> Result<i32, Error<I2cErr>> {
        self.read_register_i24(Register::AdcoB2).await
    }

    /// Averages `samples` conversions, waiting for each one to become ready.
    ///
    /// All samples share one `timeout_ms` budget. If it runs out after at least one
    /// sample the partial average is returned, see [`Average::is_partial`]. With no
    /// sample at all the result is [`Error::Timeout`].
    pub async fn read_average(
        &mut self,
        samples: u16,
        timeout_ms: u32,
    ) -> Result<Average, Error<I2cErr>> {
        if samples == 0 {
            return Err(Error::InvalidParameter);
        }

        let deadline = Deadline::budget(&mut self.clock, timeout_ms);
        let mut sum: i64 = 0;
        let mut taken: u16 = 0;

        loop {
            if self.is_data_ready().await? {
                sum += i64::from(self.read_conversion().await?);
                taken += 1;
                if taken == samples {
                    break;
                }
            }

            if deadline.expired(&mut self.clock) {
                break;
            }
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }

        if taken == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("no conversion ready within {} ms", timeout_ms);
            return Err(Error::Timeout);
        }

        #[cfg(feature = "defmt")]
        if taken < samples {
            defmt::warn!("averaged {} of {} samples before timeout", taken, samples);
        }

        Ok(Average {
            value: (sum / i64::from(taken)) as i32,
            samples: taken,
            requested: samples,
        })
    }
}
