//! Interactive acquisition of block counts.
//!
//! The reader side is async so the binary can race a pending line against
//! an interrupt. Running out of input counts as cancellation.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::{Dimensions, Error, Result};

pub const PROMPT_X: &str = "Blocks X (e.g., 16): ";
pub const PROMPT_Y: &str = "Blocks Y (e.g., 16): ";

const NOT_POSITIVE: &str = "Please enter a positive integer.";
const NOT_INTEGER: &str = "Not a valid integer. Try again.";

/// Why a line was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotPositive,
    NotInteger,
    TooLarge,
}

impl Rejection {
    pub fn message(&self) -> String {
        match self {
            Rejection::NotPositive => NOT_POSITIVE.to_string(),
            Rejection::NotInteger => NOT_INTEGER.to_string(),
            Rejection::TooLarge => format!("Value too large (max {}).", u32::MAX),
        }
    }
}

/// Parses one line of operator input as a block count.
///
/// Single underscores between digits are accepted as separators (`1_000`).
pub fn parse_blocks(line: &str) -> std::result::Result<u32, Rejection> {
    let s = line.trim();
    if s.is_empty() {
        return Err(Rejection::NotPositive);
    }
    let digits = strip_separators(s).ok_or(Rejection::NotInteger)?;
    // i128 so any out-of-range integer still reads as an integer
    let v: i128 = digits.parse().map_err(|_| Rejection::NotInteger)?;
    if v <= 0 {
        return Err(Rejection::NotPositive);
    }
    u32::try_from(v).map_err(|_| Rejection::TooLarge)
}

fn strip_separators(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c != '_' {
            out.push(c);
            continue;
        }
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + 1).copied();
        match (before, after) {
            (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {}
            _ => return None,
        }
    }
    Some(out)
}

pub struct Prompter<R, W> {
    input: R,
    out: W,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin, W: Write> Prompter<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self {
            input,
            out,
            buf: Vec::new(),
        }
    }

    /// Asks with `prompt` until a positive integer comes back.
    pub async fn read_blocks(&mut self, prompt: &str) -> Result<u32> {
        loop {
            write!(self.out, "{prompt}")?;
            self.out.flush()?;

            self.buf.clear();
            if self.input.read_until(b'\n', &mut self.buf).await? == 0 {
                return Err(Error::Canceled);
            }
            let parsed = std::str::from_utf8(&self.buf)
                .map_err(|_| Rejection::NotInteger)
                .and_then(parse_blocks);
            match parsed {
                Ok(v) => return Ok(v),
                Err(rejection) => {
                    debug!(
                        input = %String::from_utf8_lossy(&self.buf).trim_end(),
                        ?rejection,
                        "rejected block count"
                    );
                    writeln!(self.out, "{}", rejection.message())?;
                }
            }
        }
    }

    pub async fn read_dimensions(&mut self) -> Result<Dimensions> {
        let blocks_x = self.read_blocks(PROMPT_X).await?;
        let blocks_y = self.read_blocks(PROMPT_Y).await?;
        Dimensions::new(blocks_x, blocks_y)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
