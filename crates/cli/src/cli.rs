//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use charon_core::{
    AnchorConfig,
    config::{BULK_INPUT_DIR, BULK_OUTPUT_DIR},
};
use clap::{Parser, Subcommand};

use crate::commands::{bulk, fix, inspect_anchors};

#[derive(Parser)]
#[command(name = "charon-fonts")]
#[command(about = "Post-process Iosevka Charon fonts for Google Fonts compliance")]
pub struct Cli {
    /// Log per-glyph detail
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct AnchorArgs {
    /// Clearance between base outline and base anchor
    #[arg(long, default_value_t = default_gap())]
    pub gap: i32,
    /// Scale the gap by unitsPerEm / 1000
    #[arg(long)]
    pub scale_gap: bool,
}

fn default_gap() -> i32 {
    AnchorConfig::default().gap
}

impl AnchorArgs {
    pub fn config(&self) -> AnchorConfig {
        AnchorConfig { gap: self.gap, scale_gap_to_upm: self.scale_gap, ..AnchorConfig::default() }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fix the given fonts, in place unless an output directory is given
    Fix {
        #[arg(required = true)]
        fonts: Vec<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        parallel: bool,
        #[command(flatten)]
        anchors: AnchorArgs,
    },
    /// Fix every font under the bulk input tree into a fresh output tree
    Bulk {
        #[arg(long, default_value = BULK_INPUT_DIR)]
        input_dir: PathBuf,
        #[arg(long, default_value = BULK_OUTPUT_DIR)]
        output_dir: PathBuf,
        #[command(flatten)]
        anchors: AnchorArgs,
    },
    /// Print the anchors pairing a mark with a base
    InspectAnchors {
        font: PathBuf,
        #[arg(long, value_parser = parse_codepoint, default_value = "U+0301")]
        mark: u32,
        #[arg(long, value_parser = parse_codepoint, default_value = "U+0061")]
        base: u32,
    },
}

/// `U+0301`, `0x301` or bare hex.
fn parse_codepoint(s: &str) -> Result<u32, String> {
    let hex = s
        .strip_prefix("U+")
        .or_else(|| s.strip_prefix("u+"))
        .or_else(|| s.strip_prefix("0x"))
        .unwrap_or(s);
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|&cp| char::from_u32(cp).is_some())
        .ok_or_else(|| format!("Invalid codepoint '{s}', expected U+XXXX"))
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Fix { fonts, output_dir, parallel, anchors } => {
                fix(&fonts, output_dir.as_deref(), parallel, &anchors.config())
            }
            Commands::Bulk { input_dir, output_dir, anchors } => {
                bulk(&input_dir, &output_dir, &anchors.config())
            }
            Commands::InspectAnchors { font, mark, base } => inspect_anchors(&font, mark, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codepoint() {
        assert_eq!(parse_codepoint("U+0301"), Ok(0x301));
        assert_eq!(parse_codepoint("0x25CC"), Ok(0x25CC));
        assert_eq!(parse_codepoint("61"), Ok(0x61));
        assert!(parse_codepoint("U+D800").is_err());
        assert!(parse_codepoint("acute").is_err());
    }

    #[test]
    fn test_parse_fix_command() {
        let cli = Cli::parse_from(["charon-fonts", "--debug", "fix", "a.ttf", "b.ttf", "--gap", "80"]);
        assert!(cli.debug);
        let Commands::Fix { fonts, output_dir, parallel, anchors } = cli.command else {
            panic!("expected fix");
        };
        assert_eq!(fonts, [PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
        assert_eq!(output_dir, None);
        assert!(!parallel);
        assert_eq!(anchors.config().gap, 80);
    }

    #[test]
    fn test_bulk_defaults() {
        let cli = Cli::parse_from(["charon-fonts", "bulk"]);
        let Commands::Bulk { input_dir, output_dir, anchors } = cli.command else {
            panic!("expected bulk");
        };
        assert_eq!(input_dir, PathBuf::from("unprocessed_fonts"));
        assert_eq!(output_dir, PathBuf::from("fonts"));
        assert_eq!(anchors.config(), AnchorConfig::default());
    }

    #[test]
    fn test_inspect_anchors_codepoints() {
        let cli = Cli::parse_from(["charon-fonts", "inspect-anchors", "f.ttf", "--mark", "U+0323"]);
        let Commands::InspectAnchors { mark, base, .. } = cli.command else {
            panic!("expected inspect-anchors");
        };
        assert_eq!((mark, base), (0x323, 0x61));
    }
}
