use std::collections::VecDeque;
use std::io::{self, stdin, IsTerminal, Read};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::runtime::{Panel, Ports};

pub const PORT_SERIAL_STATUS: u8 = 0x00;
pub const PORT_SERIAL_DATA: u8 = 0x01;
pub const PORT_SENSE_LOW: u8 = 0xFE;
pub const PORT_SENSE_HIGH: u8 = 0xFF;

const STATUS_RX_READY: u8 = 0x01;
const STATUS_TX_READY: u8 = 0x02;

/// Serial terminal and sense switches, as seen through `IN` and `OUT`.
///
/// Port 0 is the serial status, port 1 the serial data, ports 0xFE/0xFF the low/high
/// sense switch bytes. Anything else reads 0xFF and ignores writes.
pub struct Console<R> {
    input: R,
    /// Byte received but not yet read from the data port
    rx: Option<u8>,
    /// Input reached end of file; stop asking
    closed: bool,
    switches: u16,
}

impl Console<Keyboard> {
    pub fn new(switches: u16) -> Self {
        Self::with_input(Keyboard::default(), switches)
    }
}

impl<R: Read> Console<R> {
    pub fn with_input(input: R, switches: u16) -> Self {
        Console {
            input,
            rx: None,
            closed: false,
            switches,
        }
    }

    pub fn switches(&self) -> u16 {
        self.switches
    }

    fn poll(&mut self) {
        if self.rx.is_some() || self.closed {
            return;
        }
        let mut buf = [0; 1];
        match self.input.read(&mut buf) {
            Ok(0) => self.closed = true,
            Ok(_) => self.rx = Some(buf[0]),
            // Nothing typed yet; ask again on the next status read
            Err(_) => (),
        }
    }
}

impl<R: Read> Ports for Console<R> {
    fn input(&mut self, port: u8) -> u8 {
        match port {
            PORT_SERIAL_STATUS => {
                self.poll();
                let rx = if self.rx.is_some() { STATUS_RX_READY } else { 0 };
                rx | STATUS_TX_READY
            }
            PORT_SERIAL_DATA => self.rx.take().unwrap_or(0),
            PORT_SENSE_HIGH => (self.switches >> 8) as u8,
            PORT_SENSE_LOW => self.switches as u8,
            _ => 0xFF,
        }
    }

    fn output(&mut self, port: u8, value: u8) {
        if port == PORT_SERIAL_DATA {
            print_char!(value as char);
        }
    }
}

/// Keys from an interactive terminal, or bytes from piped stdin.
///
/// Terminal reads never block: with no key waiting they fail with [`io::ErrorKind::WouldBlock`].
/// Piped stdin is read as is and ends with `Ok(0)`.
#[derive(Default)]
pub struct Keyboard {
    /// Rest of a multi-byte character
    pending: VecDeque<u8>,
}

impl Read for Keyboard {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !stdin().is_terminal() {
            return stdin().read(&mut buf[..1]);
        }
        if self.pending.is_empty() {
            let Some(ch) = poll_key()? else {
                return Err(io::ErrorKind::WouldBlock.into());
            };
            let mut bytes = [0; 4];
            self.pending.extend(ch.encode_utf8(&mut bytes).bytes());
        }
        match self.pending.pop_front() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }
}

/// Next waiting key press, if any, read in raw mode.
fn poll_key() -> io::Result<Option<char>> {
    terminal::enable_raw_mode()?;
    let key = next_key();
    terminal::disable_raw_mode()?;
    key
}

fn next_key() -> io::Result<Option<char>> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(event) = event::read()? {
            if let Some(ch) = key_char(event) {
                return Ok(Some(ch));
            }
        }
    }
    Ok(None)
}

/// Character a serial terminal would send for this key.
fn key_char(event: KeyEvent) -> Option<char> {
    use KeyModifiers as Mod;

    if matches!(event.kind, KeyEventKind::Release) {
        return None;
    }
    let ch = match (event.modifiers, event.code) {
        (_, KeyCode::Enter) => '\r',
        (_, KeyCode::Tab) => '\t',
        (_, KeyCode::Backspace) => '\x08',
        (_, KeyCode::Esc) => '\x1b',
        (_, KeyCode::Delete) => '\x7f',
        // Ctrl+C arrives as ETX, like on a real terminal
        (Mod::CONTROL, KeyCode::Char(ch)) if ch.is_ascii_alphabetic() => {
            (ch.to_ascii_uppercase() as u8 & 0x1F) as char
        }
        (Mod::NONE | Mod::SHIFT, KeyCode::Char(ch)) => ch,
        _ => return None,
    };
    Some(ch)
}

/// Address and data lights, latched after every instruction.
#[derive(Clone, Copy, Default, Debug)]
pub struct FrontPanel {
    address: u16,
    data: u8,
}

impl FrontPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of lights, most significant bit first, grouped by nibble.
    ///
    /// The switch row shows the sense switch positions the program was run with.
    pub fn render(&self, switches: u16) -> String {
        format!(
            "ADDRESS  {}  {:04X}\nDATA     {}  {:02X}\nSWITCHES {}  {:04X}",
            leds(self.address as u32, 16),
            self.address,
            leds(self.data as u32, 8),
            self.data,
            leds(switches as u32, 16),
            switches,
        )
    }
}

impl Panel for FrontPanel {
    fn update(&mut self, address: u16, data: u8) {
        self.address = address;
        self.data = data;
    }
}

fn leds(value: u32, width: u32) -> String {
    let mut out = String::new();
    for bit in (0..width).rev() {
        out.push(if value & (1 << bit) != 0 { '●' } else { '○' });
        if bit % 4 == 0 && bit != 0 {
            out.push(' ');
        }
    }
    out
}
