// Output macros must be declared before anything that prints
#[macro_use]
pub mod output;

// Assembling
mod air;
mod assembler;
pub use assembler::{assemble, Assembly};
mod encoder;
mod error;
pub use error::{hex_invalid, Diagnostic, DiagnosticKind};
pub mod hex;
pub mod isa;
mod lexer;
mod parser;
pub use parser::AsmParser;
mod symbol;
pub use symbol::{Span, SymbolTable};

// Running
pub mod disasm;
pub mod io;
pub mod runtime;
pub use runtime::{Cpu, Exit, Machine, Ram};

pub mod env;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 8;
