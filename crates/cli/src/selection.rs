//! Pair selection menu.

use std::io::{BufRead, Write};

use vwap_core::config::PairOption;
use vwap_core::{Error, Result};

/// Resolve a menu key (e.g. `"1"`) to its pair.
pub fn parse_selection<'a>(input: &str, pairs: &'a [PairOption]) -> Result<&'a PairOption> {
    let key = input.trim();
    pairs
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| Error::invalid_selection(key))
}

/// Resolve a command-line pair argument: a menu key or a pair symbol.
pub fn resolve_pair<'a>(arg: &str, pairs: &'a [PairOption]) -> Result<&'a PairOption> {
    parse_selection(arg, pairs).or_else(|_| {
        let symbol = arg.trim();
        pairs
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| Error::invalid_selection(symbol))
    })
}

/// Prompt until a valid option is entered.
///
/// Re-asks without limit. Fails only when `input` is exhausted or an I/O
/// error occurs.
pub fn prompt_pair<'a, R: BufRead, W: Write>(
    pairs: &'a [PairOption],
    input: &mut R,
    out: &mut W,
) -> Result<&'a PairOption> {
    let mut line = String::new();
    loop {
        writeln!(out, "Choose the pair to chart:")?;
        for pair in pairs {
            writeln!(out, "{}: {}", pair.key, pair.description)?;
        }
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed before a pair was chosen",
            )));
        }

        match parse_selection(&line, pairs) {
            Ok(pair) => return Ok(pair),
            Err(_) => writeln!(
                out,
                "ERROR: option {} is invalid, choose a valid number\n",
                line.trim()
            )?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use vwap_core::config::default_pairs;

    #[test]
    fn test_parse_selection() {
        let pairs = default_pairs();
        assert_eq!(parse_selection("1", &pairs).unwrap().symbol, "XBTUSDT");
        assert_eq!(parse_selection(" 4\n", &pairs).unwrap().symbol, "XDGUSDT");
        assert!(matches!(
            parse_selection("9", &pairs),
            Err(Error::InvalidSelection(s)) if s == "9"
        ));
        assert!(parse_selection("", &pairs).is_err());
    }

    #[test]
    fn test_resolve_pair_by_symbol() {
        let pairs = default_pairs();
        assert_eq!(resolve_pair("2", &pairs).unwrap().symbol, "ETHUSDT");
        assert_eq!(resolve_pair("ltcusdt", &pairs).unwrap().symbol, "LTCUSDT");
        assert!(resolve_pair("DOTUSDT", &pairs).is_err());
    }

    #[test]
    fn test_prompt_retries_until_valid() {
        let pairs = default_pairs();
        let mut input = Cursor::new("7\nabc\n3\n");
        let mut out = Vec::new();

        let pair = prompt_pair(&pairs, &mut input, &mut out).unwrap();

        assert_eq!(pair.symbol, "XRPUSDT");
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.matches("Choose the pair").count(), 3);
        assert!(printed.contains("ERROR: option 7 is invalid"));
        assert!(printed.contains("ERROR: option abc is invalid"));
    }

    #[test]
    fn test_prompt_eof() {
        let pairs = default_pairs();
        let mut input = Cursor::new("x\n");
        let mut out = Vec::new();

        let err = prompt_pair(&pairs, &mut input, &mut out).unwrap_err();

        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }
}
