use crate::hex::{Record, RecordKind};

/// Addressable memory. Every address is valid and wraps at 64KB.
pub trait Memory {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    /// Little-endian, as two byte reads.
    fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    fn write_word(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(addr, lo);
        self.write(addr.wrapping_add(1), hi);
    }
}

/// 8080 can address 64KB of memory.
const MEMORY_MAX: usize = 0x10000;

/// Flat 64KB of RAM.
pub struct Ram {
    mem: Box<[u8]>,
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            mem: vec![0; MEMORY_MAX].into_boxed_slice(),
        }
    }

    /// Copy `bytes` in from `addr`, wrapping past the top of memory.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut addr = addr;
        for byte in bytes {
            self.write(addr, *byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// Load every data record. Returns the address of the first one.
    pub fn load_records(&mut self, records: &[Record]) -> Option<u16> {
        let mut entry = None;
        for record in records.iter().filter(|r| r.kind == RecordKind::Data) {
            entry.get_or_insert(record.address);
            self.load(record.address, &record.data);
        }
        entry
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for Ram {
    #[inline]
    fn read(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    #[inline]
    fn write(&mut self, addr: u16, value: u8) {
        self.mem[addr as usize] = value;
    }
}

/// 8-bit I/O ports reached by `IN` and `OUT`.
pub trait Ports {
    fn input(&mut self, port: u8) -> u8;
    fn output(&mut self, port: u8, value: u8);
}

/// Something that shows the address and data lines, updated after every instruction.
pub trait Panel {
    fn update(&mut self, address: u16, data: u8);
}

/// No display attached.
impl Panel for () {
    fn update(&mut self, _address: u16, _data: u8) {}
}
