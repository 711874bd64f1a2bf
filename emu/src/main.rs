use clap::Parser;
use color_print::cprintln;

use arch::symbol::SP;
use hemu::{
    hooks::{dump::Dump, Hook},
    Error, State,
};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Simulator for the Hack computer")]
struct Args {
    /// Stop after this many instructions
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    /// YAML file mapping ROM addresses to dump settings
    #[arg(short, long)]
    dump_cfg: Option<String>,

    /// Dump registers after every instruction
    #[arg(short = 'a', long)]
    dump_all: bool,

    #[arg(default_value = "Main.hack")]
    input_file: String,
}

fn main() {
    let args = Args::parse();
    println!("Hack Emulator");

    if let Err(err) = run(args) {
        cprintln!("<red,bold>error</>: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Initialize state machine model
    let mut state = State::new();
    state.load_rom_file(&args.input_file)?;
    println!("  {} words", state.program_len());

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let mut hooks: Vec<Box<dyn Hook>> = vec![Box::new(Dump::arg(args.dump_cfg, args.dump_all)?)];
    state = hooks.iter_mut().fold(state, |state, hook| hook.init(state));

    // ------------------------------------------------------------------------
    // Main loop
    let tmax = args.tmax.unwrap_or(u64::MAX);
    let mut time = 0;
    while time < tmax && !state.is_terminated() {
        let (addr, code) = state.exec(time);
        state = hooks
            .iter_mut()
            .fold(state, |state, hook| hook.exec(time, addr, code, state));
        time += 1;
    }

    println!("=================================================");
    let status = if state.is_terminated() { "halted" } else { "stopped" };
    println!(
        "{} after {} steps, PC={} SP={} top={}",
        status,
        time,
        state.pc(),
        state.get(SP),
        state.get(state.get(SP).wrapping_sub(1)) as i16
    );
    Ok(())
}
