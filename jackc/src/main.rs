use color_print::cprintln;
use jackc::{compile, Error};
use std::path::{Path, PathBuf};

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
    /// Input `.jack` file or directory of `.jack` files
    input: String,

    /// Output directory [default: next to each input file]
    #[clap(short, long)]
    output: Option<String>,

    /// Print the generated bytecode
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Jack Compiler");

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            std::process::exit(1);
        }
    }
}

fn collect(input: &Path) -> Result<Vec<PathBuf>, Error> {
    let files = arch::files::sources(input, "jack")
        .map_err(|e| Error::FileOpen(input.display().to_string(), e))?;
    if files.is_empty() {
        return Err(Error::NoInput(input.display().to_string()));
    }
    Ok(files)
}

fn run(args: &Args) -> Result<bool, Error> {
    let files = collect(Path::new(&args.input))?;
    let mut ok = true;

    for (i, path) in files.iter().enumerate() {
        println!("{}. Compile", i + 1);
        println!("  < {}", path.display());
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::FileOpen(path.display().to_string(), e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let compiled = compile(&name, &source)?;
        compiled.msgs.dump();
        ok &= compiled.is_ok();

        let text = compiled.to_text();
        if args.verbose {
            print!("{}", text);
        }

        let output = match &args.output {
            Some(dir) => Path::new(dir).join(path.file_name().unwrap_or_default()),
            None => path.clone(),
        }
        .with_extension("vm");
        println!("  > {}", output.display());
        std::fs::write(&output, text).map_err(|e| Error::FileWrite(output.display().to_string(), e))?;
    }

    if !ok {
        cprintln!("<red,bold>error</>: compilation failed, output is not usable");
    }
    Ok(ok)
}
