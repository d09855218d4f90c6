use super::Cpu;
use crate::isa::AluOp;

/// Carry out of `bit` when adding `a`, `b` and a carry in.
///
/// XOR of the sum with both operands leaves exactly the carries into each bit position.
#[inline]
fn carry(bit: u32, a: u8, b: u8, carry_in: bool) -> bool {
    let sum = a as u16 + b as u16 + carry_in as u16;
    (sum ^ a as u16 ^ b as u16) & (1 << bit) != 0
}

impl Cpu {
    pub(crate) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.add(value, false),
            AluOp::Adc => self.add(value, self.flags.carry()),
            AluOp::Sub => self.sub(value, false),
            AluOp::Sbb => self.sub(value, self.flags.carry()),
            AluOp::Ana => self.ana(value),
            AluOp::Xra => self.logic(self.a ^ value),
            AluOp::Ora => self.logic(self.a | value),
            AluOp::Cmp => self.cmp(value),
        }
    }

    pub(crate) fn add(&mut self, value: u8, carry_in: bool) {
        let a = self.a;
        let result = a.wrapping_add(value).wrapping_add(carry_in as u8);
        self.flags.set_zsp(result);
        self.flags.set_carry(carry(8, a, value, carry_in));
        self.flags.set_aux_carry(carry(4, a, value, carry_in));
        self.a = result;
    }

    /// Two's complement subtract. Carry ends up meaning borrow.
    pub(crate) fn sub(&mut self, value: u8, borrow: bool) {
        self.add(!value, !borrow);
        self.flags.set_carry(!self.flags.carry());
    }

    pub(crate) fn cmp(&mut self, value: u8) {
        let a = self.a;
        self.sub(value, false);
        self.a = a;
    }

    fn ana(&mut self, value: u8) {
        let result = self.a & value;
        self.flags.set_zsp(result);
        self.flags.set_carry(false);
        self.flags.set_aux_carry((self.a | value) & 0x08 != 0);
        self.a = result;
    }

    /// XRA/ORA
    fn logic(&mut self, result: u8) {
        self.flags.set_zsp(result);
        self.flags.set_carry(false);
        self.flags.set_aux_carry(false);
        self.a = result;
    }

    pub(crate) fn inr(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.flags.set_zsp(result);
        self.flags.set_aux_carry(result & 0x0F == 0);
        result
    }

    pub(crate) fn dcr(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.flags.set_zsp(result);
        self.flags.set_aux_carry(result & 0x0F != 0x0F);
        result
    }

    pub(crate) fn dad(&mut self, value: u16) {
        let sum = self.hl as u32 + value as u32;
        self.flags.set_carry(sum > 0xFFFF);
        self.hl = sum as u16;
    }

    pub(crate) fn daa(&mut self) {
        let a = self.a;
        let low = a & 0x0F;
        let mut carry = self.flags.carry();
        let mut correction = 0;
        if self.flags.aux_carry() || low > 9 {
            correction |= 0x06;
        }
        if carry || a > 0x99 || (a > 0x89 && low > 9) {
            correction |= 0x60;
            carry = true;
        }
        self.add(correction, false);
        self.flags.set_carry(carry);
    }

    pub(crate) fn rlc(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = self.a.rotate_left(1);
        self.flags.set_carry(carry);
    }

    pub(crate) fn rrc(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = self.a.rotate_right(1);
        self.flags.set_carry(carry);
    }

    /// Rotate left through carry
    pub(crate) fn ral(&mut self) {
        let carry = self.a & 0x80 != 0;
        self.a = (self.a << 1) | self.flags.carry() as u8;
        self.flags.set_carry(carry);
    }

    /// Rotate right through carry
    pub(crate) fn rar(&mut self) {
        let carry = self.a & 0x01 != 0;
        self.a = (self.a >> 1) | ((self.flags.carry() as u8) << 7);
        self.flags.set_carry(carry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Flags;

    fn cpu(a: u8) -> Cpu {
        Cpu {
            a,
            ..Cpu::default()
        }
    }

    #[test]
    fn add_flags_all_pairs() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut cpu = cpu(a);
                cpu.alu(AluOp::Add, b);
                let result = a.wrapping_add(b);
                assert_eq!(cpu.a, result);
                assert_eq!(cpu.flags.carry(), a as u16 + b as u16 > 255, "{a} + {b}");
                assert_eq!(cpu.flags.aux_carry(), (a & 0xF) + (b & 0xF) > 15, "{a} + {b}");
                assert_eq!(cpu.flags.zero(), result == 0);
                assert_eq!(cpu.flags.parity(), result.count_ones() % 2 == 0);
                assert_eq!(cpu.flags.sign(), result & 0x80 != 0);
            }
        }
    }

    #[test]
    fn sub_borrow_all_pairs() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut cpu = cpu(a);
                cpu.alu(AluOp::Sub, b);
                assert_eq!(cpu.a, a.wrapping_sub(b));
                assert_eq!(cpu.flags.carry(), b > a, "{a} - {b}");

                let mut cpu = self::cpu(a);
                cpu.alu(AluOp::Cmp, b);
                assert_eq!(cpu.a, a);
                assert_eq!(cpu.flags.zero(), a == b);
                assert_eq!(cpu.flags.carry(), b > a);
            }
        }
    }

    #[test]
    fn carry_chains() {
        let mut cpu = cpu(0xFF);
        cpu.flags.set_carry(true);
        cpu.alu(AluOp::Adc, 0x00);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flags.carry() && cpu.flags.zero() && cpu.flags.aux_carry());

        let mut cpu = self::cpu(0x00);
        cpu.flags.set_carry(true);
        cpu.alu(AluOp::Sbb, 0x00);
        assert_eq!(cpu.a, 0xFF);
        assert!(cpu.flags.carry());

        let mut cpu = self::cpu(0x05);
        cpu.flags.set_carry(true);
        cpu.alu(AluOp::Sbb, 0x04);
        assert_eq!(cpu.a, 0x00);
        assert!(!cpu.flags.carry() && cpu.flags.zero());
    }

    #[test]
    fn logic_ops() {
        let mut cpu = cpu(0b1100_1010);
        cpu.flags.set_carry(true);
        cpu.alu(AluOp::Ana, 0b0000_0110);
        assert_eq!(cpu.a, 0b0000_0010);
        assert!(!cpu.flags.carry());
        assert!(cpu.flags.aux_carry());

        let mut cpu = self::cpu(0x01);
        cpu.alu(AluOp::Ana, 0x02);
        assert!(!cpu.flags.aux_carry());
        assert!(cpu.flags.zero());

        let mut cpu = self::cpu(0xFF);
        cpu.flags.set_carry(true);
        cpu.flags.set_aux_carry(true);
        cpu.alu(AluOp::Xra, 0xFF);
        assert_eq!(cpu.a, 0);
        assert!(cpu.flags.zero() && !cpu.flags.carry() && !cpu.flags.aux_carry());

        let mut cpu = self::cpu(0x80);
        cpu.alu(AluOp::Ora, 0x01);
        assert_eq!(cpu.a, 0x81);
        assert!(cpu.flags.sign() && cpu.flags.parity());
    }

    #[test]
    fn increment_decrement() {
        let mut cpu = Cpu::default();
        cpu.flags.set_carry(true);
        assert_eq!(cpu.inr(0x0F), 0x10);
        assert!(cpu.flags.aux_carry());
        assert!(cpu.flags.carry());
        assert_eq!(cpu.inr(0xFF), 0x00);
        assert!(cpu.flags.zero());
        assert_eq!(cpu.inr(0x01), 0x02);
        assert!(!cpu.flags.aux_carry());

        assert_eq!(cpu.dcr(0x10), 0x0F);
        assert!(!cpu.flags.aux_carry());
        assert_eq!(cpu.dcr(0x02), 0x01);
        assert!(cpu.flags.aux_carry());
        assert_eq!(cpu.dcr(0x00), 0xFF);
        assert!(cpu.flags.sign());
        assert!(cpu.flags.carry());
    }

    #[test]
    fn daa() {
        let mut cpu = cpu(0x9B);
        cpu.daa();
        assert_eq!(cpu.a, 0x01);
        assert!(cpu.flags.carry());

        // 0x19 + 0x28 = 0x41, adjusted to BCD 47
        let mut cpu = self::cpu(0x19);
        cpu.alu(AluOp::Add, 0x28);
        cpu.daa();
        assert_eq!(cpu.a, 0x47);
        assert!(!cpu.flags.carry());

        // 0x99 + 0x01 = 0x9A, adjusted to 00 with carry
        let mut cpu = self::cpu(0x99);
        cpu.alu(AluOp::Add, 0x01);
        cpu.daa();
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flags.carry() && cpu.flags.zero());
    }

    #[test]
    fn dad_carry() {
        let mut cpu = Cpu {
            hl: 0xFFFF,
            ..Cpu::default()
        };
        cpu.dad(0x0002);
        assert_eq!(cpu.hl, 0x0001);
        assert!(cpu.flags.carry());
        cpu.dad(0x0001);
        assert_eq!(cpu.hl, 0x0002);
        assert!(!cpu.flags.carry());
    }

    #[test]
    fn rotates_touch_only_carry() {
        let mut cpu = cpu(0x81);
        cpu.flags = Flags::from_bits(Flags::ZERO | 0x02);
        cpu.rlc();
        assert_eq!(cpu.a, 0x03);
        assert!(cpu.flags.carry() && cpu.flags.zero());
        cpu.rrc();
        assert_eq!(cpu.a, 0x81);
        assert!(cpu.flags.carry());
        cpu.flags.set_carry(false);
        cpu.ral();
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.flags.carry());
        cpu.rar();
        assert_eq!(cpu.a, 0x81);
        assert!(!cpu.flags.carry());
        assert!(cpu.flags.zero());
    }
}
