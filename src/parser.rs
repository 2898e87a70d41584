//! Script parser for the termreel animation script format.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].

use crate::segment::{AnimationSegment, SegmentKind};
use anyhow::{Context as _, Result, anyhow, bail};
use std::path::Path;
use std::time::Duration;

/// Parse an animation script from a string slice and return its segments.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error if any line contains an unknown segment keyword, a
/// malformed argument, or an unclosed quoted string, or if the script has no
/// segments at all.
///
/// # Example
///
/// ```
/// use termreel::parse_str;
///
/// let script = parse_str("prompt \"$ \"\ncommand \"ls\" 50ms\nnewline\n").unwrap();
/// assert_eq!(script.len(), 3);
/// ```
pub fn parse_str(content: &str) -> Result<Vec<AnimationSegment>> {
    let mut segments = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        let segment = parse_line(line)
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
        segments.push(segment);
    }
    if segments.is_empty() {
        bail!("Script contains no segments");
    }
    Ok(segments)
}

/// Parse an animation script from a file and return its segments.
///
/// Reads the entire file into memory and delegates to [`parse_str`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the script is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<AnimationSegment>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    parse_str(&content)
}

type ParseFn = fn(&str) -> Result<AnimationSegment>;

static REGISTRY: &[(SegmentKind, ParseFn)] = &[
    (SegmentKind::Prompt, parse_prompt),
    (SegmentKind::Command, parse_command),
    (SegmentKind::Output, parse_output),
    (SegmentKind::LineBreak, parse_line_break),
];

/// Dispatch a single non-empty, non-comment line to the parser for its keyword.
///
/// To add a segment kind, add one entry to [`REGISTRY`] keyed by the kind
/// whose [`SegmentKind::as_str`] is the script keyword.
fn parse_line(line: &str) -> Result<AnimationSegment> {
    let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(kind, _)| kind.as_str() == name)
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| Err(anyhow!("Unknown segment: {}", line)))
}

fn parse_prompt(args: &str) -> Result<AnimationSegment> {
    let (text, delay) = parse_typed(args)?;
    Ok(with_delay(AnimationSegment::prompt(text), delay))
}

fn parse_command(args: &str) -> Result<AnimationSegment> {
    let (text, delay) = parse_typed(args)?;
    Ok(with_delay(AnimationSegment::command(text), delay))
}

fn parse_output(args: &str) -> Result<AnimationSegment> {
    let (text, delay) = parse_typed(args)?;
    Ok(with_delay(AnimationSegment::output(text), delay))
}

fn with_delay(segment: AnimationSegment, delay: Option<Duration>) -> AnimationSegment {
    match delay {
        Some(delay) => segment.with_char_delay(delay),
        None => segment,
    }
}

/// `"text"` optionally followed by a per-character delay.
fn parse_typed(args: &str) -> Result<(String, Option<Duration>)> {
    let (text, rest) = split_quoted(args)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok((text, None));
    }
    let delay = parse_duration(rest)?;
    if delay.is_zero() {
        bail!("Per-character delay must be positive");
    }
    Ok((text, Some(delay)))
}

fn parse_line_break(args: &str) -> Result<AnimationSegment> {
    if !args.trim().is_empty() {
        bail!("'newline' takes no arguments, got: {}", args.trim());
    }
    Ok(AnimationSegment::line_break())
}

/// Split a leading quoted string from the rest of the arguments, respecting
/// backslash escapes. The quoted part is unescaped.
fn split_quoted(args: &str) -> Result<(String, &str)> {
    let args = args.trim();
    if !args.starts_with('"') {
        return Err(anyhow!("Expected quoted string"));
    }
    let mut escaped = false;
    for (i, ch) in args.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            let text = parse_quoted_string(&args[..=i])?;
            return Ok((text, &args[i + 1..]));
        }
    }
    Err(anyhow!("Unclosed quoted string"))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Invalid seconds value")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}

/// Parse a double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
fn parse_quoted_string(s: &str) -> Result<String> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('"') {
        return Err(anyhow!("Expected string to start with '\"'"));
    }
    if !s.ends_with('"') {
        return Err(anyhow!("Expected string to end with '\"'"));
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s[1..s.len() - 1].chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}
