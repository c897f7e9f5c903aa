//! Mock assembler binary for integration testing
//!
//! Understands just enough to exercise the regression driver:
//!
//! ```text
//! db b8 01        ; raw bytes, in order
//! dd 1            ; 32-bit little-endian value given in hex
//! warn text       ; "-:N: warning: text" plus a context line
//! error text      ; "-:N: error: text", exit status 1, no output file
//! crash           ; abort()
//! ```
//!
//! It refuses to run outside the test suite environment so the driver's
//! environment flag is checked end to end.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const SUITE_FLAG: &str = "YASM_TEST_SUITE";

#[derive(Default)]
struct Options {
    output: Option<PathBuf>,
    parser: Option<String>,
}

fn parse_args() -> (String, Options) {
    let mut args = std::env::args();
    let argv0 = args.next().unwrap_or_default();
    let mut opts = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" => opts.output = args.next().map(PathBuf::from),
            "-p" => opts.parser = args.next(),
            "-f" | "-m" | "-D" => {
                args.next();
            }
            _ => {}
        }
    }
    (argv0, opts)
}

fn main() -> ExitCode {
    if std::env::var(SUITE_FLAG).as_deref() != Ok("1") {
        eprintln!("mock_asm: {} is not set", SUITE_FLAG);
        return ExitCode::from(3);
    }

    let (argv0, opts) = parse_args();
    let gas = argv0.ends_with("ygas") || opts.parser.as_deref() == Some("gas");
    let comment = if gas { '#' } else { ';' };

    let mut source = String::new();
    if std::io::stdin().read_to_string(&mut source).is_err() {
        eprintln!("mock_asm: cannot read stdin");
        return ExitCode::from(2);
    }

    let mut stderr = std::io::stderr().lock();
    let mut output = Vec::new();
    let mut errors = 0;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let code = raw.split(comment).next().unwrap_or_default().trim();
        let (mnemonic, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
        let rest = rest.trim();

        match mnemonic {
            "" => {}
            "db" => {
                for token in rest.split_whitespace() {
                    match hex::decode(token) {
                        Ok(bytes) => output.extend(bytes),
                        Err(_) => {
                            let _ = writeln!(stderr, "-:{}: error: bad byte `{}'", line_no, token);
                            errors += 1;
                        }
                    }
                }
            }
            "dd" => {
                for token in rest.split_whitespace() {
                    match u32::from_str_radix(token, 16) {
                        Ok(value) => output.extend(value.to_le_bytes()),
                        Err(_) => {
                            let _ = writeln!(stderr, "-:{}: error: bad dword `{}'", line_no, token);
                            errors += 1;
                        }
                    }
                }
            }
            "warn" => {
                let _ = writeln!(stderr, "-:{}: warning: {}", line_no, rest);
                let _ = writeln!(stderr, "  while assembling line {}", line_no);
            }
            "error" => {
                let _ = writeln!(stderr, "-:{}: error: {}", line_no, rest);
                errors += 1;
            }
            "crash" => std::process::abort(),
            other => {
                let _ = writeln!(stderr, "-:{}: error: unknown instruction `{}'", line_no, other);
                errors += 1;
            }
        }
    }

    if errors > 0 {
        return ExitCode::from(1);
    }

    let written = match &opts.output {
        Some(path) => std::fs::write(path, &output),
        None => std::io::stdout().write_all(&output),
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(stderr, "mock_asm: cannot write output: {}", e);
            ExitCode::from(2)
        }
    }
}
