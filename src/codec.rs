//! Register codec and bit-field accessor.
//!
//! Every call is a bus round trip; nothing is cached. Multi-byte values are big-endian
//! on the wire.

use crate::clock::Clock;
use crate::config::InvalidParameter;
use crate::registers::*;
use crate::{Error, Nau7802, DEVICE_ADDRESS};
use byteorder::{BigEndian, ByteOrder};
use core::result::Result;
use embedded_hal_async::{delay, i2c};

const I24_MASK: u32 = 0x00FF_FFFF;

impl<D, DELAY, CLOCK, I2cErr> Nau7802<D, DELAY, CLOCK>
where
    D: i2c::I2c<Error = I2cErr>,
    DELAY: delay::DelayNs,
    CLOCK: Clock,
{
    /// Reads a single register from the NAU7802.
    pub async fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2cErr>> {
        let mut buf = [0u8];
        self.read_registers(reg, &mut buf).await?;
        Ok(buf[0])
    }

    /// Writes a value to a single register.
    pub async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I2cErr>> {
        self.write_burst(&[reg.addr(), value]).await
    }

    /// Reads a 24-bit two's complement register (conversion result, offset calibration),
    /// sign-extended from bit 23.
    pub async fn read_register_i24(&mut self, reg: Register) -> Result<i32, Error<I2cErr>> {
        reg.offset(2)?;
        let mut buf = [0u8; 3];
        self.read_registers(reg, &mut buf).await?;
        Ok(BigEndian::read_i24(&buf))
    }

    /// Writes the low 24 bits of `value` to `reg` and the two registers after it, in a
    /// single burst.
    pub async fn write_register_i24(
        &mut self,
        reg: Register,
        value: i32,
    ) -> Result<(), Error<I2cErr>> {
        reg.offset(2)?;
        let mut buf = [reg.addr(), 0, 0, 0];
        BigEndian::write_u24(&mut buf[1..], value as u32 & I24_MASK);
        self.write_burst(&buf).await
    }

    /// Reads a 32-bit unsigned register (gain calibration).
    pub async fn read_register_u32(&mut self, reg: Register) -> Result<u32, Error<I2cErr>> {
        reg.offset(3)?;
        let mut buf = [0u8; 4];
        self.read_registers(reg, &mut buf).await?;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Writes `value` to `reg` and the three registers after it, in a single burst.
    pub async fn write_register_u32(
        &mut self,
        reg: Register,
        value: u32,
    ) -> Result<(), Error<I2cErr>> {
        reg.offset(3)?;
        let mut buf = [reg.addr(), 0, 0, 0, 0];
        BigEndian::write_u32(&mut buf[1..], value);
        self.write_burst(&buf).await
    }

    /// Sets a single bit, leaving the rest of the register untouched.
    pub async fn set_bit<B: RegisterBit>(
        &mut self,
        reg: Register,
        bit: B,
    ) -> Result<(), Error<I2cErr>> {
        self.write_register_bit(reg, bit, true).await
    }

    /// Clears a single bit, leaving the rest of the register untouched.
    pub async fn clear_bit<B: RegisterBit>(
        &mut self,
        reg: Register,
        bit: B,
    ) -> Result<(), Error<I2cErr>> {
        self.write_register_bit(reg, bit, false).await
    }

    /// Reads a single bit. A failed read is an error, never a clear bit.
    pub async fn get_bit<B: RegisterBit>(
        &mut self,
        reg: Register,
        bit: B,
    ) -> Result<bool, Error<I2cErr>> {
        check_bit(&bit)?;
        let value = self.read_register(reg).await?;
        Ok(value & bit.mask() != 0)
    }

    /// Reads a multi-bit field.
    pub async fn read_field(&mut self, field: BitField) -> Result<u8, Error<I2cErr>> {
        let value = self.read_register(field.register()).await?;
        Ok(field.extract(value))
    }

    /// Replaces a multi-bit field, leaving the rest of the register untouched.
    pub async fn write_field(&mut self, field: BitField, value: u8) -> Result<(), Error<I2cErr>> {
        if value > field.max_value() {
            return Err(Error::InvalidParameter);
        }
        let current = self.read_register(field.register()).await?;
        let updated = field.insert(current, value)?;
        self.write_register(field.register(), updated).await
    }

    /// Writes a single bit in a register.
    pub(crate) async fn write_register_bit<B: RegisterBit>(
        &mut self,
        reg: Register,
        bit: B,
        enabled: bool,
    ) -> Result<(), Error<I2cErr>> {
        check_bit(&bit)?;
        let mut value = self.read_register(reg).await?;
        if enabled {
            value |= bit.mask();
        } else {
            value &= !bit.mask();
        }
        self.write_register(reg, value).await
    }

    /// Reads multiple registers starting from a specific address.
    async fn read_registers(
        &mut self,
        start_reg: Register,
        buf: &mut [u8],
    ) -> Result<(), Error<I2cErr>> {
        self.i2c_dev
            .write_read(DEVICE_ADDRESS, &[start_reg.addr()], buf)
            .await
            .map_err(Error::I2c)
    }

    /// Writes `frame[1..]` starting at register address `frame[0]`. The chip
    /// auto-increments the address after each byte.
    async fn write_burst(&mut self, frame: &[u8]) -> Result<(), Error<I2cErr>> {
        self.i2c_dev
            .write(DEVICE_ADDRESS, frame)
            .await
            .map_err(Error::I2c)
    }
}

fn check_bit<B: RegisterBit>(bit: &B) -> Result<(), InvalidParameter> {
    if bit.position() < 8 {
        Ok(())
    } else {
        Err(InvalidParameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use embedded_hal_async::i2c::ErrorKind;

    #[tokio::test]
    async fn read_i24_sign_extends_bit_23() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            read_burst(Register::AdcoB2, &[0x1E, 0x84, 0x00]),
            read_burst(Register::AdcoB2, &[0xFF, 0xFF, 0xFF]),
            read_burst(Register::Ocal1B2, &[0x80, 0x00, 0x00]),
            read_burst(Register::Ocal2B2, &[0x7F, 0xFF, 0xFF]),
        ]);

        assert_eq!(driver.read_register_i24(Register::AdcoB2).await, Ok(1_999_872));
        assert_eq!(driver.read_register_i24(Register::AdcoB2).await, Ok(-1));
        assert_eq!(
            driver.read_register_i24(Register::Ocal1B2).await,
            Ok(-8_388_608)
        );
        assert_eq!(
            driver.read_register_i24(Register::Ocal2B2).await,
            Ok(8_388_607)
        );

        mock_i2c.done();
    }

    #[tokio::test]
    async fn write_i24_sends_low_24_bits_big_endian() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            write_burst(Register::Ocal1B2, &[0xFF, 0xFF, 0xFE]),
            // High byte of 0x1234_5678 is dropped.
            write_burst(Register::Ocal2B2, &[0x34, 0x56, 0x78]),
        ]);

        driver
            .write_register_i24(Register::Ocal1B2, -2)
            .await
            .unwrap();
        driver
            .write_register_i24(Register::Ocal2B2, 0x1234_5678)
            .await
            .unwrap();

        mock_i2c.done();
    }

    #[tokio::test]
    async fn u32_registers_are_unsigned_big_endian() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            read_burst(Register::Gcal1B3, &[0xF0, 0x00, 0x00, 0x01]),
            write_burst(Register::Gcal2B3, &[0x00, 0x80, 0x00, 0x00]),
        ]);

        assert_eq!(
            driver.read_register_u32(Register::Gcal1B3).await,
            Ok(0xF000_0001)
        );
        driver
            .write_register_u32(Register::Gcal2B3, 0x0080_0000)
            .await
            .unwrap();

        mock_i2c.done();
    }

    #[tokio::test]
    async fn failed_multi_byte_write_is_one_transaction() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            write_burst(Register::Ocal1B2, &[0xFF, 0xFF, 0xFF]).with_error(ErrorKind::Other),
            write_burst(Register::Gcal1B3, &[0x01, 0x02, 0x03, 0x04]).with_error(ErrorKind::Other),
        ]);

        assert_eq!(
            driver.write_register_i24(Register::Ocal1B2, -1).await,
            Err(Error::I2c(ErrorKind::Other))
        );
        assert_eq!(
            driver.write_register_u32(Register::Gcal1B3, 0x0102_0304).await,
            Err(Error::I2c(ErrorKind::Other))
        );

        mock_i2c.done();
    }

    #[tokio::test]
    async fn multi_byte_access_past_register_map_is_rejected() {
        let (mut driver, mut mock_i2c) = mock_driver(&[]);

        assert_eq!(
            driver.read_register_u32(Register::DeviceRev).await,
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            driver.write_register_i24(Register::DeviceRev, 1).await,
            Err(Error::InvalidParameter)
        );

        mock_i2c.done();
    }

    #[tokio::test]
    async fn set_and_clear_bit_only_touch_that_bit() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            read(Register::Pga, 0b1000_0001),
            write(Register::Pga, 0b1000_1001),
            read(Register::Pga, 0b1000_1001),
            write(Register::Pga, 0b0000_1001),
        ]);

        driver.set_bit(Register::Pga, Pga::Inv).await.unwrap();
        driver.clear_bit(Register::Pga, 7u8).await.unwrap();

        mock_i2c.done();
    }

    #[tokio::test]
    async fn get_bit_propagates_read_failure() {
        let (mut driver, mut mock_i2c) = mock_driver(&[
            read(Register::PuCtrl, 0x00).with_error(ErrorKind::Other),
            read(Register::PuCtrl, PuCtrl::PUR.mask()),
        ]);

        assert_eq!(
            driver.get_bit(Register::PuCtrl, PuCtrl::PUR).await,
            Err(Error::I2c(ErrorKind::Other))
        );
        assert_eq!(driver.get_bit(Register::PuCtrl, PuCtrl::PUR).await, Ok(true));

        mock_i2c.done();
    }

    #[tokio::test]
    async fn failed_read_skips_the_write() {
        let (mut driver, mut mock_i2c) =
            mock_driver(&[read(Register::Ctrl1, 0x00).with_error(ErrorKind::Other)]);

        assert_eq!(
            driver.set_bit(Register::Ctrl1, Ctrl1::Crp).await,
            Err(Error::I2c(ErrorKind::Other))
        );

        mock_i2c.done();
    }

    #[tokio::test]
    async fn bit_positions_past_the_byte_are_rejected() {
        let (mut driver, mut mock_i2c) = mock_driver(&[]);

        assert_eq!(
            driver.set_bit(Register::Pga, 8u8).await,
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            driver.get_bit(Register::Pga, 200u8).await,
            Err(Error::InvalidParameter)
        );

        mock_i2c.done();
    }

    #[tokio::test]
    async fn write_field_rejects_oversized_value_before_bus() {
        let (mut driver, mut mock_i2c) = mock_driver(&[read(Register::Ctrl2, 0b0111_0000)]);

        assert_eq!(
            driver.write_field(BitField::CALMOD, 0b100).await,
            Err(Error::InvalidParameter)
        );
        assert_eq!(driver.read_field(BitField::CRS).await, Ok(0b111));

        mock_i2c.done();
    }
}
