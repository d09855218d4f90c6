use std::fmt;

use crate::isa::Cond;

/// Status byte: `S Z 0 A 0 P 1 C` from bit 7 down.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Flags(u8);

impl Flags {
    pub const SIGN: u8 = 0x80;
    pub const ZERO: u8 = 0x40;
    pub const AUX_CARRY: u8 = 0x10;
    pub const PARITY: u8 = 0x04;
    pub const CARRY: u8 = 0x01;

    /// Bit 1 always reads 1 once pushed.
    const FIXED_SET: u8 = 0x02;
    /// Bits 3 and 5 always read 0 once pushed.
    const FIXED_CLEAR: u8 = 0x28;

    /// Raw byte, as restored by `POP PSW`. Fixed bits are not checked.
    pub fn from_bits(bits: u8) -> Self {
        Flags(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Force the fixed bits, as done before `PUSH PSW`.
    pub fn normalize(&mut self) {
        self.0 = (self.0 | Self::FIXED_SET) & !Self::FIXED_CLEAR;
    }

    fn get(self, mask: u8) -> bool {
        self.0 & mask != 0
    }

    fn set(&mut self, mask: u8, value: bool) {
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    pub fn sign(self) -> bool {
        self.get(Self::SIGN)
    }

    pub fn zero(self) -> bool {
        self.get(Self::ZERO)
    }

    pub fn aux_carry(self) -> bool {
        self.get(Self::AUX_CARRY)
    }

    pub fn parity(self) -> bool {
        self.get(Self::PARITY)
    }

    pub fn carry(self) -> bool {
        self.get(Self::CARRY)
    }

    pub fn set_carry(&mut self, value: bool) {
        self.set(Self::CARRY, value);
    }

    pub fn set_aux_carry(&mut self, value: bool) {
        self.set(Self::AUX_CARRY, value);
    }

    /// Zero, sign and parity of a result byte. Parity is set for an even number of ones.
    pub fn set_zsp(&mut self, value: u8) {
        self.set(Self::ZERO, value == 0);
        self.set(Self::SIGN, value & 0x80 != 0);
        self.set(Self::PARITY, value.count_ones() % 2 == 0);
    }

    pub fn test(self, cond: Cond) -> bool {
        match cond {
            Cond::NotZero => !self.zero(),
            Cond::Zero => self.zero(),
            Cond::NoCarry => !self.carry(),
            Cond::Carry => self.carry(),
            Cond::ParityOdd => !self.parity(),
            Cond::ParityEven => self.parity(),
            Cond::Plus => !self.sign(),
            Cond::Minus => self.sign(),
        }
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags(Self::FIXED_SET)
    }
}

/// `SZAPC`, with `-` for each clear flag.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.sign(), 'S'),
            (self.zero(), 'Z'),
            (self.aux_carry(), 'A'),
            (self.parity(), 'P'),
            (self.carry(), 'C'),
        ];
        for (set, name) in flags {
            write!(f, "{}", if set { name } else { '-' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_value() {
        assert_eq!(Flags::default().bits(), 0x02);
    }

    #[test]
    fn normalize_forces_fixed_bits() {
        let mut flags = Flags::from_bits(0xFF);
        flags.normalize();
        assert_eq!(flags.bits(), 0xD7);
        let mut flags = Flags::from_bits(0x00);
        flags.normalize();
        assert_eq!(flags.bits(), 0x02);
    }

    #[test]
    fn zsp() {
        let mut flags = Flags::default();
        flags.set_zsp(0);
        assert!(flags.zero() && flags.parity() && !flags.sign());
        flags.set_zsp(0x80);
        assert!(!flags.zero() && !flags.parity() && flags.sign());
        flags.set_zsp(0x03);
        assert!(flags.parity());
    }

    #[test]
    fn conditions() {
        let flags = Flags::from_bits(Flags::ZERO | Flags::CARRY);
        assert!(flags.test(Cond::Zero));
        assert!(!flags.test(Cond::NotZero));
        assert!(flags.test(Cond::Carry));
        assert!(flags.test(Cond::ParityOdd));
        assert!(flags.test(Cond::Plus));
        assert_eq!(flags.to_string(), "-Z--C");
    }
}
