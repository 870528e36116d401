// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use flex_assert::{read_json, JsonAssert, MatchMode, NumericMode, PathOption};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        println!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        println!($msg);
        std::process::exit($code);
    };
}

#[doc(hidden)]
struct Code;

impl Code {
    const SUCCESS: i32 = 0;
    const INVALID_ARGUMENT: i32 = 2;
    const INPUT_ERROR: i32 = 3;
    const MISMATCH: i32 = 4;
}

#[doc(hidden)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Primitives must be equal by value
    Exact,
    /// Primitives only need to share a type
    Type,
}

impl From<Mode> for MatchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Exact => MatchMode::Exact,
            Mode::Type => MatchMode::Type,
        }
    }
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file with the expected template
    expected: PathBuf,

    /// JSON file with the actual document
    actual: PathBuf,

    /// JSON file holding a list of path options
    #[clap(short, long)]
    options: Option<PathBuf>,

    /// How primitives are compared
    #[clap(short, long, value_enum, default_value_t = Mode::Exact)]
    mode: Mode,

    /// Treat `[*]` and `[N*]` path steps as marking their array any-order
    #[clap(long)]
    legacy_any_order: bool,

    /// Compare all numbers as floats
    #[clap(long)]
    assume_float: bool,
}

#[doc(hidden)]
fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => {
            let Ok(json) = std::fs::read_to_string(path) else {
                handle_error!(
                    Code::INVALID_ARGUMENT,
                    "Error: cannot read options file {}",
                    path.display()
                );
            };
            match PathOption::list_from_json(&json) {
                Ok(options) => options,
                Err(err) => {
                    handle_error!(Code::INVALID_ARGUMENT, "Error: invalid options: {}", err);
                }
            }
        }
        None => vec![],
    };

    let expected = match read_json(&cli.expected) {
        Ok(json) => json,
        Err(err) => {
            handle_error!(Code::INPUT_ERROR, "Error: {}", err);
        }
    };
    let actual = match read_json(&cli.actual) {
        Ok(json) => json,
        Err(err) => {
            handle_error!(Code::INPUT_ERROR, "Error: {}", err);
        }
    };

    let numeric_mode = if cli.assume_float {
        NumericMode::AssumeFloat
    } else {
        NumericMode::Strict
    };

    let result = JsonAssert::new(cli.mode.into())
        .with_numeric_mode(numeric_mode)
        .with_legacy_any_order(cli.legacy_any_order)
        .with_options(options)
        .check(&expected, &actual);

    match result {
        Ok(()) => {
            println!("actual json matches expected");
            std::process::exit(Code::SUCCESS);
        }
        Err(report) => {
            handle_error!(Code::MISMATCH, "{}", report);
        }
    }
}
