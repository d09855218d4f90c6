use std::ffi::OsStr;
use std::fs;
use std::io::{stdout, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use hotwatch::notify::Event;
use hotwatch::{
    blocking::{Flow, Hotwatch},
    EventKind,
};
use miette::{bail, IntoDiagnostic, Result};

use altair::hex::{self, Record};
use altair::io::{Console, FrontPanel};
use altair::output::{Condition, Output};
use altair::{disasm, dprintln, hex_invalid, Assembly, Exit, Machine, Ram};

/// Altair is an assembler, disassembler and emulator for Intel 8080 machine code.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` or `.hex` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run text `.asm` or Intel HEX `.hex` file directly and output to terminal
    Run {
        /// `.asm` or `.hex` file to run
        name: PathBuf,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
        /// Print every instruction before it executes
        #[arg(short, long)]
        trace: bool,
        /// Stop after this many cycles instead of waiting for `HLT`
        #[arg(long, value_name = "N")]
        max_cycles: Option<u64>,
        /// Sense switch positions as a 16-bit hex value
        #[arg(short, long, value_parser = parse_switches, default_value = "0")]
        switches: u16,
        /// Show the front panel lights after the program stops
        #[arg(short, long)]
        panel: bool,
    },
    /// Create Intel HEX `.hex` file to run later or load elsewhere
    Assemble {
        /// `.asm` file to assemble
        name: PathBuf,
        /// Destination to output .hex file
        dest: Option<PathBuf>,
    },
    /// Check a `.asm` file without running or outputting binary
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Print a listing of the machine code in a `.asm` or `.hex` file
    Disasm {
        /// `.asm` or `.hex` file to disassemble
        name: PathBuf,
    },
    /// Place a watch on a `.asm` file to receive constant assembler updates
    Watch {
        /// `.asm` file to watch
        name: PathBuf,
    },
}

#[derive(Default)]
struct RunOptions {
    minimal: bool,
    trace: bool,
    max_cycles: Option<u64>,
    switches: u16,
    panel: bool,
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    altair::env::init();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(altair::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                minimal,
                trace,
                max_cycles,
                switches,
                panel,
            } => {
                let options = RunOptions {
                    minimal,
                    trace,
                    max_cycles,
                    switches,
                    panel,
                };
                run(&name, options)
            }
            Command::Assemble { name, dest } => {
                file_message(Green, "Assembling", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                let asm = altair::assemble(&contents)?;
                let errors = report(&asm, &contents);

                let out_file_name = dest.unwrap_or_else(|| name.with_extension("hex"));
                fs::write(&out_file_name, asm.hex()).into_diagnostic()?;

                if errors > 0 {
                    file_message(Red, "Saved", &out_file_name);
                    bail!("Assembly finished with {errors} error(s)");
                }
                message(Green, "Finished", "emit Intel HEX");
                file_message(Green, "Saved", &out_file_name);
                Ok(())
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let contents = fs::read_to_string(&name).into_diagnostic()?;
                let asm = altair::assemble(&contents)?;
                let errors = report(&asm, &contents);
                if errors > 0 {
                    bail!("Found {errors} error(s)");
                }
                message(Green, "Success", "no errors found!");
                Ok(())
            }
            Command::Disasm { name } => {
                file_message(Green, "Loading", &name);
                let records = load(&name)?;
                let mut ram = Ram::new();
                ram.load_records(&records);
                for span in hex::spans(&records) {
                    print!("{}", disasm::listing(&ram, span));
                }
                Ok(())
            }
            Command::Watch { name } => {
                if !name.exists() {
                    bail!("File does not exist. Exiting...")
                }
                // Vim breaks if watching a single file
                let folder_path = match name.parent() {
                    Some(pth) if pth.is_dir() => pth.to_path_buf(),
                    _ => Path::new(".").to_path_buf(),
                };

                // Clear screen and move cursor to top left
                print!("\x1B[2J\x1B[2;1H");
                file_message(Green, "Watching", &name);
                message(Cyan, "Help", "press CTRL+C to exit");

                let mut watcher = Hotwatch::new_with_custom_delay(Duration::from_millis(500))
                    .into_diagnostic()?;

                watcher
                    .watch(folder_path, move |event: Event| match event.kind {
                        // Watch remove for vim changes
                        EventKind::Modify(_) | EventKind::Remove(_) => {
                            // Clear screen
                            print!("\x1B[2J\x1B[2;1H");
                            file_message(Green, "Watching", &name);
                            message(Green, "Re-checking", "file change detected");
                            message(Cyan, "Help", "press CTRL+C to exit");

                            // Now we are developing software (makes reruns more obvious)
                            sleep(Duration::from_millis(50));

                            let contents = match fs::read_to_string(&name) {
                                Ok(cts) => cts,
                                Err(e) => {
                                    eprintln!("{e}. Exiting...");
                                    std::process::exit(1)
                                }
                            };
                            match altair::assemble(&contents) {
                                Ok(asm) => {
                                    if report(&asm, &contents) == 0 {
                                        message(Green, "Success", "no errors found!");
                                    }
                                }
                                Err(e) => {
                                    println!("\n{:?}", e);
                                }
                            };
                            Flow::Continue
                        }
                        _ => Flow::Continue,
                    })
                    .into_diagnostic()?;
                watcher.run();
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(&path, RunOptions::default())
    } else {
        println!("\n~ altair v{VERSION} - Copyright (c) 2024 Artemis Rosman ~");
        println!("{}", LOGO.truecolor(232, 72, 50).bold());
        println!("{SHORT_INFO}");
        std::process::exit(0);
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &Path, options: RunOptions) -> Result<()> {
    file_message(MsgColor::Green, "Loading", name);
    let records = load(name)?;

    let mut ram = Ram::new();
    let entry = ram.load_records(&records).unwrap_or(0);
    let mut machine = Machine::new(ram, Console::new(options.switches));
    machine.cpu.pc = entry;
    machine.set_trace(options.trace || altair::env::is_trace_enabled());
    Output::set_minimal(options.minimal);

    message(MsgColor::Green, "Running", &format!("from {entry:04X}h"));
    let mut panel = FrontPanel::new();
    let limit = options.max_cycles.or_else(altair::env::cycle_limit);
    let exit = machine.run(&mut panel, limit);

    Output::Normal.start_new_line();
    stdout().flush().into_diagnostic()?;
    match exit {
        Exit::Halted => dprintln!(Sometimes, "Halted at {:04X}h", machine.cpu.pc),
        Exit::CycleLimit => dprintln!(
            Always,
            "Stopped at {:04X}h after reaching the cycle limit",
            machine.cpu.pc
        ),
    }
    Output::Debugger(Condition::Always).print_state(&machine.cpu);
    if options.panel {
        println!("{}", panel.render(machine.io.switches()));
    }

    file_message(MsgColor::Green, "Completed", name);
    Ok(())
}

/// Records of an `.asm` or `.hex` file, ready to load.
fn load(name: &Path) -> Result<Vec<Record>> {
    let Some(ext) = name.extension().and_then(OsStr::to_str) else {
        bail!("File has no extension. Exiting...");
    };
    match ext {
        "hex" | "ihx" => {
            let contents = fs::read_to_string(name).into_diagnostic()?;
            hex::parse(&contents).map_err(|err| hex_invalid(err, &contents))
        }
        "asm" => {
            let contents = fs::read_to_string(name).into_diagnostic()?;
            let asm = altair::assemble(&contents)?;
            let errors = report(&asm, &contents);
            if errors > 0 {
                bail!("Assembly failed with {errors} error(s)");
            }
            Ok(asm.records().to_vec())
        }
        _ => bail!("File has unknown extension. Exiting..."),
    }
}

/// Print every diagnostic and return how many there were.
fn report(asm: &Assembly, contents: &str) -> usize {
    for diag in asm.diagnostics() {
        eprintln!("{:?}", diag.report(contents));
    }
    asm.diagnostics().len()
}

/// Accepts `A55A`, `0xA55A` or `A55Ah`.
fn parse_switches(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .or_else(|| digits.strip_suffix(['h', 'H']))
        .unwrap_or(digits);
    u16::from_str_radix(digits, 16).map_err(|e| format!("`{s}` is not a 16-bit hex value: {e}"))
}

const LOGO: &str = r#"
          ___      __  ___   ___    ____  ___
         / _ |    / / /_  | / _ |  /  _/ / _ \
        / __ |   / /__ / / / __ | _/ /  / , _/
       /_/ |_|  /____//_/ /_/ |_|/___/ /_/|_|"#;

const SHORT_INFO: &str = r"
Welcome to altair, an all-in-one toolchain for Intel 8080 machine code:
assembler, disassembler and a cycle-counting emulator.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
