use arch::inst::to_line;
use color_print::cformat;

use crate::assembler::Assembled;
use crate::symbol::SymbolKind;

/// Print a listing of the assembled program: address, word, statement, comment.
pub fn print_dump(path: &str, assembled: &Assembled) {
    println!(
        "{}+------[{}]{}",
        "-".repeat(24),
        path,
        "-".repeat(45usize.saturating_sub(path.len()))
    );
    for line in &assembled.lines {
        let comment = line
            .comment()
            .map(|s| cformat!("<dim>//{}</>", s))
            .unwrap_or_default();

        let (pc, bin) = match (line.pc, line.bin) {
            (Some(pc), Some(bin)) => (format!("{:05}", pc), to_line(bin)),
            (Some(pc), None) => (format!("{:05}", pc), cformat!("<r,s>{}</>", "!".repeat(16))),
            _ => (" ".repeat(5), " ".repeat(16)),
        };

        let stmt = match &line.stmt {
            Some(stmt) => stmt.cformat(),
            None => String::new(),
        };

        println!("[{}] {} | {:>4}: {} {}", pc, bin, line.no(), stmt, comment);
    }
    println!("{}+{}", "-".repeat(24), "-".repeat(53));

    for (name, kind, addr) in assembled.symbols.iter() {
        match kind {
            SymbolKind::Predefined => {}
            SymbolKind::Label => println!("{}", cformat!("  <g>{:<24}</> {:>5}", name, addr)),
            SymbolKind::Variable => println!("{}", cformat!("  <c>{:<24}</> {:>5}", name, addr)),
        }
    }
}
