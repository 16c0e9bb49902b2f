use std::env;
use std::path::PathBuf;
use std::process;

use xtensa_gdbstub::transport::StdioTransport;
use xtensa_gdbstub::{loader, run};

struct CliArgs {
    log: PathBuf,
    elf: PathBuf,
}

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("USAGE: xtensa-gdbstub --log <crash-log.txt> --elf <firmware.elf>");
    process::exit(code);
}

fn parse_args(args: &[String]) -> CliArgs {
    let mut log: Option<PathBuf> = None;
    let mut elf: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--log" => {
                i += 1;
                let value = args.get(i).unwrap_or_else(|| print_usage_and_exit(2));
                log = Some(PathBuf::from(value));
            }
            "--elf" => {
                i += 1;
                let value = args.get(i).unwrap_or_else(|| print_usage_and_exit(2));
                elf = Some(PathBuf::from(value));
            }
            _ => print_usage_and_exit(2),
        }
        i += 1;
    }

    let (Some(log), Some(elf)) = (log, elf) else {
        print_usage_and_exit(2);
    };
    CliArgs { log, elf }
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args);

    let mut state = match loader::load(&cli.log, &cli.elf) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("failed to load snapshot: {e}");
            process::exit(1);
        }
    };

    eprintln!(
        "loaded snapshot: pc={:#010x} {} memory region(s)",
        state.regs.pc,
        state.memory.region_count()
    );

    let mut transport = StdioTransport::new();
    if let Err(e) = run(&mut state, &mut transport) {
        eprintln!("transport error: {e}");
        process::exit(1);
    }
}
