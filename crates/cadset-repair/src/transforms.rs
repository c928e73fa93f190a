//! Line-local textual rewrites of generated code. Every transform is
//! idempotent; `fix_code(fix_code(c)) == fix_code(c)`.

use cadset_validate::rule::{has_result_binding, has_setup_import};

pub const SETUP_IMPORT: &str = "import cadquery as cq";
const CHAIN_INDENT: &str = "    ";

pub fn fix_code(code: &str) -> String {
    let code = inject_result_binding(code);
    let code = inject_setup_import(&code);
    let code = normalize_assignment_spacing(&code);
    let code = normalize_argument_separators(&code);
    reindent_method_chains(&code)
}

/// Binds the first top-level `cq.` expression to `result` when nothing is bound.
pub fn inject_result_binding(code: &str) -> String {
    if has_result_binding(code) {
        return code.to_string();
    }
    let mut done = false;
    let lines: Vec<String> = code
        .split('\n')
        .map(|line| {
            if !done && line.starts_with("cq.") {
                done = true;
                format!("result = {line}")
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}

pub fn inject_setup_import(code: &str) -> String {
    if has_setup_import(code) || !code.contains("cq.") {
        return code.to_string();
    }
    format!("{SETUP_IMPORT}\n\n{code}")
}

/// `a=b` / `a  =   b` at statement level becomes `a = b`. Keyword arguments,
/// comparisons and augmented assignments are left alone.
pub fn normalize_assignment_spacing(code: &str) -> String {
    respace(code, '=', " = ", true, |prev, next| {
        (is_word(prev) || prev == ']' || prev == ')') && next != '=' && !next.is_whitespace()
    })
}

/// `1,2` / `1 ,  2` between numeric arguments becomes `1, 2`.
pub fn normalize_argument_separators(code: &str) -> String {
    respace(code, ',', ", ", false, |prev, next| prev.is_ascii_digit() && next.is_ascii_digit())
}

/// Continuation lines that start with `.` get a four-space indent. Lines
/// whose first character sits inside a string literal are left alone.
pub fn reindent_method_chains(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let flags = scan(&chars);
    let mut offset = 0;
    let mut out = Vec::new();
    for (i, line) in code.split('\n').enumerate() {
        let lead = line.chars().take_while(|c| c.is_whitespace()).count();
        let in_code = flags.code.get(offset + lead).copied().unwrap_or(false);
        if i > 0 && in_code && line.trim_start().starts_with('.') && !line.starts_with(CHAIN_INDENT) {
            out.push(format!("{CHAIN_INDENT}{}", line.trim()));
        } else {
            out.push(line.to_string());
        }
        offset += line.chars().count() + 1;
    }
    out.join("\n")
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_hspace(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Per-char flags: outside string literals and comments, and bracket depth.
struct Scan {
    code: Vec<bool>,
    depth: Vec<u32>,
}

fn scan(chars: &[char]) -> Scan {
    let mut code = vec![false; chars.len()];
    let mut depth = vec![0u32; chars.len()];
    let mut level = 0u32;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '#' {
            while i < chars.len() && chars[i] != '\n' {
                depth[i] = level;
                i += 1;
            }
            continue;
        }
        if c == '"' || c == '\'' {
            let triple = i + 2 < chars.len() && chars[i + 1] == c && chars[i + 2] == c;
            let width = if triple { 3 } else { 1 };
            let mut j = i + width;
            while j < chars.len() {
                if chars[j] == '\\' {
                    j += 2;
                    continue;
                }
                if triple {
                    if j + 2 < chars.len() && chars[j] == c && chars[j + 1] == c && chars[j + 2] == c {
                        j += 3;
                        break;
                    }
                } else if chars[j] == c || chars[j] == '\n' {
                    j += 1;
                    break;
                }
                j += 1;
            }
            let end = j.min(chars.len());
            for d in depth.iter_mut().take(end).skip(i) {
                *d = level;
            }
            i = end;
            continue;
        }
        match c {
            '(' | '[' | '{' => level += 1,
            ')' | ']' | '}' => level = level.saturating_sub(1),
            _ => {}
        }
        code[i] = true;
        depth[i] = level;
        i += 1;
    }
    Scan { code, depth }
}

fn respace(code: &str, sep: char, replacement: &str, top_level_only: bool, accept: impl Fn(char, char) -> bool) -> String {
    let chars: Vec<char> = code.chars().collect();
    let flags = scan(&chars);
    let mut out = String::with_capacity(code.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let eligible = c == sep && flags.code[i] && (!top_level_only || flags.depth[i] == 0);
        if eligible {
            let prev = out.trim_end_matches(is_hspace).chars().last();
            let mut j = i + 1;
            while j < chars.len() && is_hspace(chars[j]) {
                j += 1;
            }
            if let (Some(p), Some(&n)) = (prev, chars.get(j)) {
                if accept(p, n) {
                    let kept = out.trim_end_matches(is_hspace).len();
                    out.truncate(kept);
                    out.push_str(replacement);
                    i = j;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }
    out
}
