//! Parser for the `$(...)` substitution syntax written by [`Substitution`]'s
//! `Display` impl

use crate::error::SubstitutionError;
use crate::substitution::Substitution;

/// Parse a string into a list of substitutions.
///
/// Supports `$(var name)` and `$(command ...)`, where the command body may be
/// wrapped in single or double quotes and may itself contain substitutions.
pub fn parse_substitutions(input: &str) -> Result<Vec<Substitution>, SubstitutionError> {
    let mut result = Vec::new();
    let mut text = String::new();
    let mut rest = input;

    while let Some(start) = rest.find("$(") {
        text.push_str(&rest[..start]);
        let body_start = start + 2;
        let body_len = find_closing_paren(&rest[body_start..]).ok_or_else(|| {
            SubstitutionError::InvalidSubstitution(format!("unclosed '$(' in '{}'", input))
        })?;

        if !text.is_empty() {
            result.push(Substitution::Text(std::mem::take(&mut text)));
        }
        result.push(parse_body(&rest[body_start..body_start + body_len])?);
        rest = &rest[body_start + body_len + 1..];
    }

    text.push_str(rest);
    if !text.is_empty() {
        result.push(Substitution::Text(text));
    }
    Ok(result)
}

/// Byte offset of the `)` closing a substitution body, skipping quoted text
fn find_closing_paren(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' if depth == 0 => return Some(i),
                ')' => depth -= 1,
                _ => {}
            },
        }
    }
    None
}

fn parse_body(body: &str) -> Result<Substitution, SubstitutionError> {
    let body = body.trim();
    let (kind, arg) = match body.split_once(char::is_whitespace) {
        Some((kind, arg)) => (kind, arg.trim()),
        None => (body, ""),
    };

    match kind {
        "var" if !arg.is_empty() && !arg.contains(char::is_whitespace) => {
            Ok(Substitution::LaunchConfiguration(arg.to_string()))
        }
        "command" if !arg.is_empty() => {
            let inner = parse_substitutions(strip_quotes(arg))?;
            Ok(Substitution::Command(inner))
        }
        _ => Err(SubstitutionError::InvalidSubstitution(format!(
            "unsupported substitution '$({})'",
            body
        ))),
    }
}

fn strip_quotes(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
