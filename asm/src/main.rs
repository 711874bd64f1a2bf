use color_print::cprintln;
use hasm::{assemble, util::print_dump, Error};
use std::path::Path;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input file
    #[clap(default_value = "Main.asm")]
    input: String,

    /// Output file [default: input with `.hack` extension]
    #[clap(short, long)]
    output: Option<String>,

    /// Dump assembly listing
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Hack Assembler");

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<bool, Error> {
    let output = match &args.output {
        Some(output) => output.clone(),
        None => Path::new(&args.input)
            .with_extension("hack")
            .to_string_lossy()
            .into_owned(),
    };

    println!("1. Read File");
    println!("  < {}", args.input);
    let source = std::fs::read_to_string(&args.input)
        .map_err(|e| Error::FileOpen(args.input.clone(), e))?;

    println!("2. Resolve Labels & Generate Binary");
    let assembled = assemble(&args.input, &source);
    assembled.msgs.dump();

    if args.dump {
        print_dump(&args.input, &assembled);
    }

    println!("  > {}", output);
    std::fs::write(&output, assembled.to_text()).map_err(|e| Error::FileWrite(output.clone(), e))?;

    if assembled.is_ok() {
        println!("  {} words", assembled.words.len());
    } else {
        cprintln!(
            "<red,bold>error</>: {} error(s), output is not usable",
            assembled.msgs.errors().count()
        );
    }
    Ok(assembled.is_ok())
}
