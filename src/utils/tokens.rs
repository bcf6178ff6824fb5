// src/utils/tokens.rs

use crate::error::{Error, Result};
use crate::io::Format;

/// Whitespace-separated tokens of a line.
pub fn str2list(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Every token of the line parsed as a float.
pub fn line2list(line: &str, format: Format, line_no: usize) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|tok| parse_f64(tok, format, line_no))
        .collect()
}

pub fn parse_f64(token: &str, format: Format, line_no: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| Error::parse(format, line_no, format!("invalid number '{}'", token)))
}

pub fn parse_usize(token: &str, format: Format, line_no: usize) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::parse(format, line_no, format!("invalid count '{}'", token)))
}

/// First three tokens as an [x, y, z] row.
pub fn parse_row3(tokens: &[&str], format: Format, line_no: usize) -> Result<[f64; 3]> {
    if tokens.len() < 3 {
        return Err(Error::parse(
            format,
            line_no,
            "expected three coordinate columns",
        ));
    }
    Ok([
        parse_f64(tokens[0], format, line_no)?,
        parse_f64(tokens[1], format, line_no)?,
        parse_f64(tokens[2], format, line_no)?,
    ])
}

/// Step label carried after the last '=' of a prompt line, e.g.
/// `STEP =    3` or `Direct configuration=     12`.
pub fn step_after_equals(line: &str) -> Option<i64> {
    let (_, tail) = line.rsplit_once('=')?;
    tail.split_whitespace().next()?.parse().ok()
}
