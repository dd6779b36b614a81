//! Shared helpers for the unit tests.

use crate::clock::Clock;
use crate::registers::Register;
use crate::{Error, Nau7802, DEVICE_ADDRESS};
use embedded_hal_async::i2c::ErrorKind;
use embedded_hal_mock::eh1::{
    delay::NoopDelay,
    i2c::{Mock as MockI2c, Transaction as I2cTransaction},
};

pub(crate) type MockDriver = Nau7802<MockI2c, NoopDelay, StepClock>;
pub(crate) type MockError = Error<ErrorKind>;

/// Clock that advances by a fixed step every time it is read.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepClock {
    now: u64,
    step: u64,
}

impl StepClock {
    pub(crate) fn new(step: u64) -> Self {
        Self { now: 0, step }
    }
}

impl Clock for StepClock {
    fn now_ms(&mut self) -> u64 {
        self.now += self.step;
        self.now
    }
}

/// Driver over a mocked bus whose clock advances 1ms per reading.
pub(crate) fn mock_driver(expectations: &[I2cTransaction]) -> (MockDriver, MockI2c) {
    mock_driver_with_clock(expectations, StepClock::new(1))
}

pub(crate) fn mock_driver_with_clock(
    expectations: &[I2cTransaction],
    clock: StepClock,
) -> (MockDriver, MockI2c) {
    let mock_i2c = MockI2c::new(expectations);
    let driver = Nau7802::new(mock_i2c.clone(), NoopDelay, clock);
    (driver, mock_i2c)
}

/// Single register read.
pub(crate) fn read(reg: Register, value: u8) -> I2cTransaction {
    I2cTransaction::write_read(DEVICE_ADDRESS, vec![reg as u8], vec![value])
}

/// Burst read starting at `reg`.
pub(crate) fn read_burst(reg: Register, values: &[u8]) -> I2cTransaction {
    I2cTransaction::write_read(DEVICE_ADDRESS, vec![reg as u8], values.to_vec())
}

/// Single register write.
pub(crate) fn write(reg: Register, value: u8) -> I2cTransaction {
    I2cTransaction::write(DEVICE_ADDRESS, vec![reg as u8, value])
}

/// Burst write starting at `reg`.
pub(crate) fn write_burst(reg: Register, values: &[u8]) -> I2cTransaction {
    let mut bytes = vec![reg as u8];
    bytes.extend_from_slice(values);
    I2cTransaction::write(DEVICE_ADDRESS, bytes)
}

/// Empty write used to probe for the device.
pub(crate) fn probe() -> I2cTransaction {
    I2cTransaction::write(DEVICE_ADDRESS, vec![])
}
