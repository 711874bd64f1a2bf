use color_print::cprintln;
use std::path::{Path, PathBuf};
use vmt::{translate, translator::DEFAULT_ENTRY, Error, Options, Source};

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
    /// Input `.vm` file or directory of `.vm` files
    input: String,

    /// Output file [default: `<input>.asm`, or `<dir>/<dir>.asm` for a directory]
    #[clap(short, long)]
    output: Option<String>,

    /// Always emit the bootstrap sequence
    #[clap(long, conflicts_with = "no_bootstrap")]
    bootstrap: bool,

    /// Never emit the bootstrap sequence
    #[clap(long)]
    no_bootstrap: bool,

    /// Function called by the bootstrap sequence
    #[clap(long, default_value = DEFAULT_ENTRY)]
    entry: String,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("VM Translator");

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    }
}

/// `.vm` files to translate, sorted by name, and the default output path.
fn collect(input: &Path) -> Result<(Vec<PathBuf>, PathBuf), Error> {
    let files = arch::files::sources(input, "vm")
        .map_err(|e| Error::FileOpen(input.display().to_string(), e))?;
    if files.is_empty() {
        return Err(Error::NoInput(input.display().to_string()));
    }
    if !input.is_dir() {
        return Ok((files, input.with_extension("asm")));
    }
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    Ok((files, input.join(name).with_extension("asm")))
}

fn run(args: &Args) -> Result<bool, Error> {
    let input = Path::new(&args.input);
    let (files, default_output) = collect(input)?;
    let output = match &args.output {
        Some(output) => PathBuf::from(output),
        None => default_output,
    };

    println!("1. Read Files");
    let mut sources = Vec::new();
    for path in &files {
        println!("  < {}", path.display());
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::FileOpen(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sources.push(Source::new(name, text));
    }

    let bootstrap = if args.bootstrap {
        true
    } else if args.no_bootstrap {
        false
    } else {
        input.is_dir() || sources.iter().any(|s| s.stem() == "Sys")
    };
    let options = Options {
        bootstrap,
        entry: args.entry.clone(),
    };

    println!("2. Translate");
    if bootstrap {
        println!("  bootstrap -> {}", options.entry);
    }
    let translated = translate(&sources, &options);
    translated.msgs.dump();

    println!("  > {}", output.display());
    std::fs::write(&output, &translated.asm)
        .map_err(|e| Error::FileWrite(output.display().to_string(), e))?;

    if !translated.is_ok() {
        cprintln!(
            "<red,bold>error</>: {} error(s), output is not usable",
            translated.msgs.errors().count()
        );
    }
    Ok(translated.is_ok())
}
