//! Requirement input lines: `R<digits>: <digits>,'<text>',<class>`.

use serde::Serialize;
use thiserror::Error;

/// One parsed requirement line.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Requirement {
    /// `R` followed by digits, e.g. `R12`.
    pub id: String,
    pub project_id: String,
    pub text: String,
    /// Requirement class token, e.g. `FR`, `PE`.
    pub class: String,
}

/// Why a line does not follow the requirement grammar.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LineError {
    #[error("line is empty")]
    Empty,
    #[error("expected a requirement id like `R12:`")]
    MissingId,
    #[error("expected a numeric project id after the requirement id")]
    MissingProjectId,
    #[error("expected `,'` before the requirement text")]
    MissingTextStart,
    #[error("expected `',` followed by a class token after the requirement text")]
    MissingClass,
}

/// Parse a requirement line. Surrounding whitespace is ignored.
///
/// The text runs from the first `'` after the project id up to the first
/// `',` that is followed by a valid class token and nothing else, so texts
/// may themselves contain quotes and commas.
pub fn parse_requirement_line(line: &str) -> Result<Requirement, LineError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(LineError::Empty);
    }

    let rest = line.strip_prefix('R').ok_or(LineError::MissingId)?;
    let digits = leading_digits(rest);
    if digits == 0 {
        return Err(LineError::MissingId);
    }
    let id = &line[..1 + digits];
    let rest = rest[digits..]
        .strip_prefix(':')
        .ok_or(LineError::MissingId)?
        .trim_start();

    let digits = leading_digits(rest);
    if digits == 0 {
        return Err(LineError::MissingProjectId);
    }
    let project_id = &rest[..digits];
    let rest = rest[digits..]
        .strip_prefix(',')
        .ok_or(LineError::MissingTextStart)?
        .trim_start();
    let body = rest.strip_prefix('\'').ok_or(LineError::MissingTextStart)?;

    for (end, _) in body.match_indices("',") {
        if let Some(class) = class_token(&body[end + 2..]) {
            return Ok(Requirement {
                id: id.to_string(),
                project_id: project_id.to_string(),
                text: body[..end].to_string(),
                class: class.to_string(),
            });
        }
    }
    Err(LineError::MissingClass)
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// The class token if `tail` is whitespace, a `[A-Za-z0-9_]+` token and
/// nothing else.
fn class_token(tail: &str) -> Option<&str> {
    let token = tail.trim();
    let valid = !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    valid.then_some(token)
}
