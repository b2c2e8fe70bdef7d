// Command line interface module
// Handles parsing of command line arguments and stdin input

use anyhow::Result;
use clap::Parser;
use log::debug;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

/// rbounce - A floating window that bounces around your screen
#[derive(Parser, Debug)]
#[command(name = "rbounce")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Background image (can also be piped via stdin). A built-in pattern is used otherwise.
    #[arg(value_name = "IMAGE")]
    pub image_path: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long, default_value = "246", value_parser = clap::value_parser!(u32).range(16..=4096))]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value = "200", value_parser = clap::value_parser!(u32).range(16..=4096))]
    pub height: u32,

    /// Animation and physics tick period in milliseconds
    #[arg(long, default_value = "15", value_parser = parse_tick_ms)]
    pub tick_ms: u64,

    /// Disable GPU rendering and use CPU rendering only
    #[arg(long, default_value = "false")]
    pub cpu: bool,
}

/// Parsed arguments with resolved image source
#[derive(Debug)]
pub struct ParsedArgs {
    pub image_path: Option<PathBuf>,
    pub image_data: Option<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub tick: Duration,
    /// Use GPU rendering (default true, set to false with --cpu)
    pub use_gpu: bool,
}

/// Parse the tick period and ensure it's within a usable range
fn parse_tick_ms(s: &str) -> Result<u64, String> {
    let ms: u64 = s.parse().map_err(|_| "Invalid tick period")?;
    if !(1..=1000).contains(&ms) {
        return Err("Tick period must be between 1 and 1000 ms".to_string());
    }
    Ok(ms)
}

/// Check if stdin has data available (is a pipe)
fn stdin_has_data() -> bool {
    !atty::is(atty::Stream::Stdin)
}

/// Read piped image data. An empty pipe means no image was supplied.
fn read_piped<R: Read>(mut reader: R) -> Result<Option<Vec<u8>>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        debug!("Stdin was empty, using the built-in background");
        return Ok(None);
    }
    Ok(Some(buffer))
}

/// Parse command line arguments and handle stdin input
pub fn parse_args() -> Result<ParsedArgs> {
    resolve(Args::parse())
}

fn resolve(args: Args) -> Result<ParsedArgs> {
    // An explicit path wins over a pipe
    if args.image_path.is_none() && stdin_has_data() {
        resolve_with(args, io::stdin().lock())
    } else {
        resolve_with(args, io::empty())
    }
}

fn resolve_with<R: Read>(args: Args, stdin: R) -> Result<ParsedArgs> {
    let image_data = if args.image_path.is_none() {
        read_piped(stdin)?
    } else {
        None
    };

    Ok(ParsedArgs {
        image_path: args.image_path,
        image_data,
        width: args.width,
        height: args.height,
        tick: Duration::from_millis(args.tick_ms),
        use_gpu: !args.cpu, // GPU is default, --cpu disables it
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rbounce"]).unwrap();
        assert_eq!(args.image_path, None);
        assert_eq!((args.width, args.height), (246, 200));
        assert_eq!(args.tick_ms, 15);
        assert!(!args.cpu);
    }

    #[test]
    fn test_image_and_flags() {
        let args = Args::try_parse_from([
            "rbounce", "cat.png", "--width", "320", "--height", "240", "--tick-ms", "5", "--cpu",
        ])
        .unwrap();
        assert_eq!(args.image_path, Some(PathBuf::from("cat.png")));
        assert_eq!((args.width, args.height), (320, 240));
        assert_eq!(args.tick_ms, 5);
        assert!(args.cpu);
    }

    #[test]
    fn test_rejects_zero_tick() {
        assert!(Args::try_parse_from(["rbounce", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn test_rejects_tiny_window() {
        assert!(Args::try_parse_from(["rbounce", "--width", "2"]).is_err());
    }

    #[test]
    fn test_resolve_with_path_skips_stdin() {
        let args = Args::try_parse_from(["rbounce", "bg.jpg", "--cpu", "--tick-ms", "20"]).unwrap();
        let parsed = resolve(args).unwrap();
        assert!(parsed.image_data.is_none());
        assert!(!parsed.use_gpu);
        assert_eq!(parsed.tick, Duration::from_millis(20));
    }

    #[test]
    fn test_empty_pipe_falls_back_to_builtin() {
        let args = Args::try_parse_from(["rbounce"]).unwrap();
        let parsed = resolve_with(args, io::empty()).unwrap();
        assert!(parsed.image_path.is_none());
        assert!(parsed.image_data.is_none());
    }

    #[test]
    fn test_piped_bytes_are_kept() {
        let args = Args::try_parse_from(["rbounce"]).unwrap();
        let parsed = resolve_with(args, &b"\x89PNG"[..]).unwrap();
        assert_eq!(parsed.image_data.as_deref(), Some(&b"\x89PNG"[..]));
    }

    #[test]
    fn test_path_ignores_piped_bytes() {
        let args = Args::try_parse_from(["rbounce", "bg.jpg"]).unwrap();
        let parsed = resolve_with(args, &b"ignored"[..]).unwrap();
        assert!(parsed.image_data.is_none());
    }
}
