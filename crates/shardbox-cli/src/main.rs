//! Command-line front-end for splitting secrets into share files and
//! combining them back.
//!
//! Share files carry a one-byte x index followed by the raw share bytes;
//! everything else about the secret is opaque to this tool.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use shardbox_shamir::{combine, split};

/// Spellings of the input flag that mean standard input.
const STDIN_NAMES: &[&str] = &["-", "0", "std", "stdio", "stdin"];

/// Spellings of the output flag that mean standard output.
const STDOUT_NAMES: &[&str] = &["", "-", "1", "std", "stdio", "stdout"];

#[derive(Parser)]
#[command(
    name = "shardbox",
    about = "Split a secret into shares, any threshold of which recover it",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a secret into share files.
    Split {
        /// Input file, or `-`/`0`/`std`/`stdio`/`stdin` for standard
        /// input. When omitted, the positional words are joined with
        /// single spaces, or standard input is read if there are none.
        #[arg(short, long, default_value = "")]
        input: String,

        /// Share filename template. `{i}` is replaced by the share index;
        /// without a placeholder the index is appended as decimal.
        #[arg(short, long, default_value = "")]
        output: String,

        /// Number of shares to generate in total (2..=255).
        #[arg(short = 'n', long)]
        count: u8,

        /// Number of shares required to recover the secret (2..=count).
        #[arg(short = 'k', long)]
        threshold: u8,

        /// Secret words, used when no input flag is given.
        secret: Vec<String>,
    },

    /// Combine share files back into the secret.
    Combine {
        /// Output file, or `-`/`1`/`std`/`stdio`/`stdout` (or nothing)
        /// for standard output.
        #[arg(short, long, default_value = "")]
        output: String,

        /// Share files written by `split`.
        #[arg(required = true)]
        shares: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Split {
            input,
            output,
            count,
            threshold,
            secret,
        } => run_split(&input, &output, count, threshold, &secret),
        Command::Combine { output, shares } => run_combine(&output, &shares),
    }
}

fn run_split(input: &str, output: &str, count: u8, threshold: u8, words: &[String]) -> Result<()> {
    let secret = read_secret(input, words)?;
    let shares = split(&secret, count, threshold).context("error splitting secret")?;

    for (x, share) in &shares {
        let name = share_file_name(output, *x);
        let mut data = Vec::with_capacity(1 + share.len());
        data.push(*x);
        data.extend_from_slice(share);
        fs::write(&name, data)
            .with_context(|| format!("error writing share file '{name}'"))?;
    }

    Ok(())
}

fn run_combine(output: &str, files: &[PathBuf]) -> Result<()> {
    let mut shares: HashMap<u8, Vec<u8>> = HashMap::new();
    let mut share_length = None;
    for path in files {
        let data = fs::read(path)
            .with_context(|| format!("error reading share file '{}'", path.display()))?;
        let Some((&x, share)) = data.split_first() else {
            bail!("share file '{}' is empty", path.display());
        };
        // Mixed-length shares cannot come from one split.
        if *share_length.get_or_insert(share.len()) != share.len() {
            bail!("share file '{}' does not match the other shares", path.display());
        }
        shares.insert(x, share.to_vec());
    }

    let secret = combine(&shares);

    if STDOUT_NAMES.contains(&output) {
        io::stdout()
            .write_all(&secret)
            .context("error writing output")?;
    } else {
        fs::write(output, &secret)
            .with_context(|| format!("error writing output file '{output}'"))?;
    }
    Ok(())
}

/// Resolve the secret per the input flag: a named file, standard input,
/// or the positional words joined with single spaces.
fn read_secret(input: &str, words: &[String]) -> Result<Vec<u8>> {
    if input.is_empty() && !words.is_empty() {
        return Ok(words.join(" ").into_bytes());
    }
    if input.is_empty() || STDIN_NAMES.contains(&input) {
        let mut secret = Vec::new();
        io::stdin()
            .read_to_end(&mut secret)
            .context("error reading standard input")?;
        return Ok(secret);
    }
    fs::read(input).with_context(|| format!("error opening input file '{input}'"))
}

/// Expand the output template for one share index. `{i}` is substituted
/// when present; otherwise the index is appended as decimal.
fn share_file_name(template: &str, x: u8) -> String {
    if template.contains("{i}") {
        template.replace("{i}", &x.to_string())
    } else {
        format!("{template}{x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_file_name_with_placeholder() {
        assert_eq!(share_file_name("share-{i}.bin", 3), "share-3.bin");
        assert_eq!(share_file_name("{i}/{i}", 7), "7/7");
    }

    #[test]
    fn test_share_file_name_appends_without_placeholder() {
        assert_eq!(share_file_name("share.", 12), "share.12");
        assert_eq!(share_file_name("", 1), "1");
    }

    #[test]
    fn test_read_secret_joins_words() {
        let words = vec!["correct".to_string(), "horse".to_string(), "battery".to_string()];
        assert_eq!(read_secret("", &words).unwrap(), b"correct horse battery");
    }
}
