#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to read fixture {name}: {err}"))
}

/// Non-blank, non-comment rows of a tab-separated fixture, with line numbers.
pub fn read_rows(name: &str) -> Vec<(usize, Vec<String>)> {
    read_fixture(name)
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() || line.starts_with('#') {
                return None;
            }
            let columns = line.split('\t').map(unescape).collect();
            Some((idx + 1, columns))
        })
        .collect()
}

pub fn unescape(input: &str) -> String {
    let mut out = String::new();
    let mut iter = input.chars().peekable();

    while let Some(ch) = iter.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match iter.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('e') => out.push('\x1b'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hi = iter.next();
                let lo = iter.next();
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    if let (Some(h), Some(l)) = (hi.to_digit(16), lo.to_digit(16)) {
                        let byte = ((h << 4) | l) as u8;
                        out.push(byte as char);
                    } else {
                        out.push('\\');
                        out.push('x');
                        out.push(hi);
                        out.push(lo);
                    }
                } else {
                    out.push('\\');
                    out.push('x');
                    if let Some(hi) = hi {
                        out.push(hi);
                    }
                    if let Some(lo) = lo {
                        out.push(lo);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
