//! ANSI escape parsing and SGR styling helpers.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub code: String,
    pub length: usize,
    pub kind: AnsiCodeKind,
}

pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }
    if pos + 1 >= bytes.len() {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => extract_csi(input, pos),
        b']' => extract_osc(input, pos),
        b'O' => extract_ss3(input, pos),
        _ => None,
    }
}

/// Removes CSI, OSC and SS3 sequences, leaving only printable text.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(ansi) = extract_ansi_code(input, idx) {
            idx += ansi.length;
            continue;
        }

        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}

fn extract_csi(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        let b = bytes[idx];
        if (0x40..=0x7e).contains(&b) {
            let end = idx + 1;
            return Some(AnsiCode {
                code: input[pos..end].to_string(),
                length: end - pos,
                kind: AnsiCodeKind::Csi,
            });
        }
        idx += 1;
    }
    None
}

fn extract_osc(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            let end = idx + 1;
            return Some(AnsiCode {
                code: input[pos..end].to_string(),
                length: end - pos,
                kind: AnsiCodeKind::Osc,
            });
        }
        if bytes[idx] == 0x1b && idx + 1 < bytes.len() && bytes[idx + 1] == b'\\' {
            let end = idx + 2;
            return Some(AnsiCode {
                code: input[pos..end].to_string(),
                length: end - pos,
                kind: AnsiCodeKind::Osc,
            });
        }
        idx += 1;
    }
    None
}

fn extract_ss3(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 2 >= bytes.len() {
        return None;
    }
    let end = pos + 3;
    Some(AnsiCode {
        code: input[pos..end].to_string(),
        length: end - pos,
        kind: AnsiCodeKind::Ss3,
    })
}

fn sgr(code: &str, text: &str) -> String {
    format!("\x1b[{code}m{text}\x1b[0m")
}

pub fn red(text: &str) -> String {
    sgr("31", text)
}

pub fn green(text: &str) -> String {
    sgr("32", text)
}

pub fn yellow(text: &str) -> String {
    sgr("33", text)
}

pub fn gray(text: &str) -> String {
    sgr("90", text)
}

pub fn blue_bold(text: &str) -> String {
    sgr("1;34", text)
}
