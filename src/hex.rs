//! Intel HEX records: building them from emitted bytes, printing them and reading them back.

use std::fmt::{self, Display};
use std::ops::Range;
use std::str::FromStr;

/// Largest payload written into a single data record.
pub const RECORD_LEN: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RecordKind {
    Data = 0x00,
    EndOfFile = 0x01,
}

/// Single `:LLAAAATT[DD...]CC` line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Record {
    pub kind: RecordKind,
    pub address: u16,
    pub data: Vec<u8>,
}

impl Record {
    pub fn data(address: u16, data: Vec<u8>) -> Self {
        Record {
            kind: RecordKind::Data,
            address,
            data,
        }
    }

    pub fn end_of_file() -> Self {
        Record {
            kind: RecordKind::EndOfFile,
            address: 0,
            data: Vec::new(),
        }
    }

    /// Every byte of the record before the checksum.
    fn body(&self) -> impl Iterator<Item = u8> + '_ {
        let [hi, lo] = self.address.to_be_bytes();
        [self.data.len() as u8, hi, lo, self.kind as u8]
            .into_iter()
            .chain(self.data.iter().copied())
    }

    /// Two's complement of the byte sum, so that the whole record sums to zero.
    pub fn checksum(&self) -> u8 {
        self.body()
            .fold(0u8, |sum, byte| sum.wrapping_add(byte))
            .wrapping_neg()
    }

    /// Addresses covered by the payload. Kept as `u32` so a record ending at 0xFFFF fits.
    pub fn range(&self) -> Range<u32> {
        let start = self.address as u32;
        start..start + self.data.len() as u32
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(":")?;
        for byte in self.body() {
            write!(f, "{byte:02X}")?;
        }
        write!(f, "{:02X}", self.checksum())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RecordError {
    MissingColon,
    BadDigit,
    TooShort,
    LengthMismatch,
    Checksum,
    UnsupportedType(u8),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingColon => f.write_str("record does not start with `:`"),
            RecordError::BadDigit => f.write_str("record contains a non-hex digit"),
            RecordError::TooShort => f.write_str("record is too short"),
            RecordError::LengthMismatch => f.write_str("byte count does not match payload"),
            RecordError::Checksum => f.write_str("checksum mismatch"),
            RecordError::UnsupportedType(kind) => write!(f, "unsupported record type {kind:02X}"),
        }
    }
}

impl std::error::Error for RecordError {}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix(':').ok_or(RecordError::MissingColon)?;
        if digits.len() % 2 != 0 {
            return Err(RecordError::BadDigit);
        }
        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| {
                digits
                    .get(i..i + 2)
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            })
            .collect::<Option<Vec<u8>>>()
            .ok_or(RecordError::BadDigit)?;

        // Count, address, type and checksum
        if bytes.len() < 5 {
            return Err(RecordError::TooShort);
        }
        let count = bytes[0] as usize;
        if bytes.len() != count + 5 {
            return Err(RecordError::LengthMismatch);
        }
        if bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte)) != 0 {
            return Err(RecordError::Checksum);
        }
        let kind = match bytes[3] {
            0x00 => RecordKind::Data,
            0x01 => RecordKind::EndOfFile,
            other => return Err(RecordError::UnsupportedType(other)),
        };
        Ok(Record {
            kind,
            address: u16::from_be_bytes([bytes[1], bytes[2]]),
            data: bytes[4..4 + count].to_vec(),
        })
    }
}

/// Failure to read an image, with the 1-based line it happened on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HexError {
    pub line: usize,
    pub kind: RecordError,
}

impl Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for HexError {}

/// Read every record up to and including the end-of-file record. Blank lines are skipped.
pub fn parse(src: &str) -> Result<Vec<Record>, HexError> {
    let mut records = Vec::new();
    for (i, line) in src.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = line
            .parse::<Record>()
            .map_err(|kind| HexError { line: i + 1, kind })?;
        let done = record.kind == RecordKind::EndOfFile;
        records.push(record);
        if done {
            break;
        }
    }
    Ok(records)
}

/// Contiguous address ranges covered by the data records, merged where they touch.
pub fn spans(records: &[Record]) -> Vec<Range<u32>> {
    let mut spans: Vec<Range<u32>> = Vec::new();
    for record in records.iter().filter(|r| r.kind == RecordKind::Data) {
        let range = record.range();
        match spans.last_mut() {
            Some(last) if last.end == range.start => last.end = range.end,
            _ => spans.push(range),
        }
    }
    spans
}

/// Batches bytes into data records.
#[derive(Debug, Default)]
pub struct Emitter {
    start: u16,
    buf: Vec<u8>,
    records: Vec<Record>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a byte for `address`. A full buffer or a gap in addresses starts a new record.
    pub fn push(&mut self, address: u16, byte: u8) {
        let next = self.start.wrapping_add(self.buf.len() as u16);
        if self.buf.len() == RECORD_LEN || (!self.buf.is_empty() && address != next) {
            self.flush();
        }
        if self.buf.is_empty() {
            self.start = address;
        }
        self.buf.push(byte);
    }

    pub fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let data = std::mem::take(&mut self.buf);
        self.records.push(Record::data(self.start, data));
    }

    /// Flush what is left and terminate the image.
    pub fn finish(mut self) -> Vec<Record> {
        self.flush();
        self.records.push(Record::end_of_file());
        self.records
    }
}
