use anyhow::{Context, Result};
use std::io::Read;

/// Read one expression from standard input and dump its syntax tree to
/// standard output.
fn main() -> Result<()> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("reading standard input")?;

    let tree = basalt_parser::parse_expression(&source)?;
    print!("{}", basalt_syntax::printer::print_tree(&tree));
    Ok(())
}
