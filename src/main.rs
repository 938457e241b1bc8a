//! avsprop - property document conversion tool.
//!
//! Reads a property file in either format and writes the other one to
//! stdout: binary input comes out as pretty XML, XML input comes out as
//! binary.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use avsproperty::{encoding, Format, Property};

/// Property format conversion tool
#[derive(Parser)]
#[command(name = "avsprop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input property file (binary or XML, autodetected)
    filename: PathBuf,

    /// Set output encoding to UTF-8
    #[arg(short = 'u')]
    utf8: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut prop = Property::default();
    prop.read_file(&cli.filename)
        .with_context(|| format!("failed to read {}", cli.filename.display()))?;

    prop.settings.format = if prop.settings.format == Format::Binary {
        Format::PrettyXml
    } else {
        Format::Binary
    };
    if cli.utf8 {
        prop.settings.encoding = &encoding::UTF_8;
    }

    prop.write(io::stdout().lock()).context("failed to write output")?;

    Ok(())
}
