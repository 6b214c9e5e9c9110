//! MK-54/MK-61 headless runner.
//!
//! Loads the chip ROM dumps, plays an optional key script against the
//! machine and prints the indicator line whenever it changes, the way the
//! original bench harness did. `--json` dumps the final architectural
//! state for downstream tooling.

use std::path::{Path, PathBuf};
use std::process;

use angstrem_ik130x::ChipRom;
use emu_mk61::{AngleMode, CalcConfig, CalcModel, Calculator, Key, KeyScript, ScriptPanel};

struct CliArgs {
    model: CalcModel,
    roms_dir: PathBuf,
    script_path: Option<PathBuf>,
    acceptance: bool,
    max_steps: u32,
    json: bool,
}

fn usage() -> ! {
    eprintln!("Usage: emu-mk61 [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --model <model>    Calculator model: mk54, mk61 [default: mk61]");
    eprintln!("  --roms <dir>       Directory with ik1302.bin/ik1303.bin/ik1306.bin [default: roms]");
    eprintln!("  --script <file>    Key script: whitespace-separated key mnemonics;");
    eprintln!("                     'deg', 'rad', 'grad' move the angle switch");
    eprintln!("  --acceptance       Play the built-in user-manual acceptance sequence");
    eprintln!("  --steps <n>        Host-step limit [default: 10000]");
    eprintln!("  --json             Print the final machine state as JSON");
    process::exit(1);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        model: CalcModel::Mk61,
        roms_dir: PathBuf::from("roms"),
        script_path: None,
        acceptance: false,
        max_steps: 10_000,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--model" => {
                i += 1;
                cli.model = match args.get(i).map(String::as_str) {
                    Some("mk54") => CalcModel::Mk54,
                    Some("mk61") => CalcModel::Mk61,
                    other => {
                        eprintln!("Unknown model: {other:?}");
                        usage();
                    }
                };
            }
            "--roms" => {
                i += 1;
                cli.roms_dir = PathBuf::from(args.get(i).unwrap_or_else(|| usage()));
            }
            "--script" => {
                i += 1;
                cli.script_path = Some(PathBuf::from(args.get(i).unwrap_or_else(|| usage())));
            }
            "--acceptance" => cli.acceptance = true,
            "--steps" => {
                i += 1;
                cli.max_steps = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| usage());
            }
            "--json" => cli.json = true,
            _ => usage(),
        }
        i += 1;
    }
    cli
}

fn load_rom(dir: &Path, name: &str) -> ChipRom {
    let path = dir.join(name);
    let bytes = std::fs::read(&path).unwrap_or_else(|err| {
        eprintln!("Cannot read {}: {err}", path.display());
        process::exit(1);
    });
    ChipRom::from_bytes(&bytes).unwrap_or_else(|err| {
        eprintln!("{}: {err}", path.display());
        process::exit(1);
    })
}

fn load_script(path: &Path) -> KeyScript {
    let text = std::fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("Cannot read {}: {err}", path.display());
        process::exit(1);
    });
    let mut script = KeyScript::new();
    for token in text.split_whitespace() {
        match token {
            "deg" => script.mode(AngleMode::Degrees),
            "rad" => script.mode(AngleMode::Radians),
            "grad" => script.mode(AngleMode::Grads),
            name => match Key::from_name(name) {
                Some(key) => script.tap(key),
                None => {
                    eprintln!("{}: unknown key '{name}'", path.display());
                    process::exit(1);
                }
            },
        }
    }
    script
}

fn main() {
    let cli = parse_args();

    let config = CalcConfig {
        model: cli.model,
        ik1302: load_rom(&cli.roms_dir, "ik1302.bin"),
        ik1303: load_rom(&cli.roms_dir, "ik1303.bin"),
        ik1306: cli
            .model
            .has_ik1306()
            .then(|| load_rom(&cli.roms_dir, "ik1306.bin")),
    };
    let mut calc = Calculator::new(&config);

    let script = if cli.acceptance {
        KeyScript::acceptance_test()
    } else if let Some(path) = &cli.script_path {
        load_script(path)
    } else {
        KeyScript::new()
    };
    let mut panel = ScriptPanel::new(script);

    println!(
        "Started {}.",
        match cli.model {
            CalcModel::Mk54 => "MK-54",
            CalcModel::Mk61 => "MK-61",
        }
    );

    let mut step_num = 0u32;
    loop {
        let running = calc.step(&mut panel);
        step_num += 1;

        if step_num >= cli.max_steps {
            eprintln!("Step limit reached.");
            break;
        }
        if running {
            continue;
        }
        if panel.frame.take_changed() {
            println!("{step_num:4} -- '{}'", panel.frame.text());
        }
        if !panel.script.advance() {
            break;
        }
    }
    println!("Finished.");

    if cli.json {
        match serde_json::to_string_pretty(&calc.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Cannot serialize state: {err}");
                process::exit(1);
            }
        }
    }
}
