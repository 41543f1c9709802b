//! Decode hex dumps of the two packed IME buffer formats and print the
//! result as JSON. Useful when diagnosing what a subsystem actually put
//! into a candidate-list or clause buffer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libimm_core::{composition, CandidateList, LegacyEncoding};
use serde_json::json;

#[derive(Parser)]
#[command(about = "Decode hex dumps of IME candidate and clause buffers")]
struct Cli {
    /// Legacy code page label used for string decoding
    #[arg(long, default_value = "shift_jis")]
    encoding: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a candidate-list buffer (24-byte header + offsets + strings)
    Candidates {
        /// Hex dump of the full buffer; whitespace is ignored
        hex: String,
    },
    /// Decode a clause-offset buffer against its composition bytes
    Clauses {
        /// Hex dump of the legacy-encoded composition bytes
        composition: String,
        /// Hex dump of the clause-offset buffer
        clauses: String,
    },
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .with_context(|| format!("bad hex byte at offset {}", i / 2))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let encoding = LegacyEncoding::for_label(&cli.encoding)
        .with_context(|| format!("unknown encoding label {:?}", cli.encoding))?;

    match cli.command {
        Command::Candidates { hex } => {
            let buf = parse_hex(&hex)?;
            let list = CandidateList::decode(&buf, encoding)?;
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        Command::Clauses {
            composition,
            clauses,
        } => {
            let composition_bytes = parse_hex(&composition)?;
            let clause_buf = parse_hex(&clauses)?;
            let decoded = composition::decode_clauses(&composition_bytes, &clause_buf, encoding)?;
            let out = json!({
                "composition": encoding.decode(&composition_bytes),
                "clauses": decoded,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}
