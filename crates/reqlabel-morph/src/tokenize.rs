//! Split requirement text into word, number and punctuation pieces.

/// What a [`Piece`] looks like on the surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PieceKind {
    Word,
    Number,
    /// `'s`, `n't` and friends split off the preceding word.
    Clitic,
    Punct,
    Symbol,
}

/// A slice of the input with its byte offset.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Piece<'a> {
    pub text: &'a str,
    pub offset: usize,
    pub kind: PieceKind,
}

const CLITICS: [&str; 7] = ["n't", "'s", "'re", "'ll", "'ve", "'d", "'m"];

/// Tokenize `text`. Whitespace is dropped; every other byte belongs to
/// exactly one piece.
pub fn tokenize(text: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut iter = text.char_indices().peekable();

    while let Some((start, ch)) = iter.next() {
        if ch.is_whitespace() {
            continue;
        }

        if let Some(len) = clitic_at(text, start) {
            out.push(Piece {
                text: &text[start..start + len],
                offset: start,
                kind: PieceKind::Clitic,
            });
            while iter.peek().is_some_and(|&(idx, _)| idx < start + len) {
                iter.next();
            }
            continue;
        }

        if ch.is_numeric() {
            let mut end = start + ch.len_utf8();
            while let Some(&(idx, next)) = iter.peek() {
                let joins_digits = matches!(next, '.' | ',')
                    && text[idx + 1..].chars().next().is_some_and(char::is_numeric);
                if next.is_numeric() || joins_digits {
                    end = idx + next.len_utf8();
                    iter.next();
                } else {
                    break;
                }
            }
            // "10GB", "2nd": a number glued to letters reads as one word.
            let mut kind = PieceKind::Number;
            while let Some(&(idx, next)) = iter.peek() {
                if next.is_alphabetic() {
                    end = idx + next.len_utf8();
                    kind = PieceKind::Word;
                    iter.next();
                } else {
                    break;
                }
            }
            out.push(Piece {
                text: &text[start..end],
                offset: start,
                kind,
            });
            continue;
        }

        if ch.is_alphabetic() {
            let mut end = start + ch.len_utf8();
            while let Some(&(idx, next)) = iter.peek() {
                // "can't" splits as "ca" + "n't".
                if clitic_at(text, idx).is_some() {
                    break;
                }
                let inner_apostrophe = is_apostrophe(next)
                    && text[idx + next.len_utf8()..]
                        .chars()
                        .next()
                        .is_some_and(char::is_alphabetic);
                if next.is_alphanumeric() || inner_apostrophe {
                    end = idx + next.len_utf8();
                    iter.next();
                } else {
                    break;
                }
            }
            out.push(Piece {
                text: &text[start..end],
                offset: start,
                kind: PieceKind::Word,
            });
            continue;
        }

        let kind = if is_symbol(ch) {
            PieceKind::Symbol
        } else {
            PieceKind::Punct
        };
        out.push(Piece {
            text: &text[start..start + ch.len_utf8()],
            offset: start,
            kind,
        });
    }
    out
}

/// Byte length of the clitic starting at `idx`, if one does.
///
/// `n't` is recognized when `idx` points at its `n`; the others start at the
/// apostrophe and must not be followed by further letters.
fn clitic_at(text: &str, idx: usize) -> Option<usize> {
    let rest = &text[idx..];
    for clitic in CLITICS {
        let Some(len) = prefix_len_ignore_case(rest, clitic) else {
            continue;
        };
        let after_alpha = rest[len..].chars().next().is_some_and(char::is_alphabetic);
        if !after_alpha {
            return Some(len);
        }
    }
    None
}

/// Match `pattern` at the start of `s`, case-insensitively, treating any
/// apostrophe variant as `'`. Returns the matched byte length.
fn prefix_len_ignore_case(s: &str, pattern: &str) -> Option<usize> {
    let mut len = 0;
    let mut chars = s.chars();
    for want in pattern.chars() {
        let got = chars.next()?;
        let same = if want == '\'' {
            is_apostrophe(got)
        } else {
            got.eq_ignore_ascii_case(&want)
        };
        if !same {
            return None;
        }
        len += got.len_utf8();
    }
    Some(len)
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}')
}

fn is_symbol(ch: char) -> bool {
    match ch {
        '$' | '%' | '+' | '<' | '=' | '>' | '^' | '|' | '~' | '#' | '@' | '&' | '*' => true,
        '\u{2018}'..='\u{201F}' | '\u{2013}' | '\u{2014}' | '\u{2026}' | '\u{00AB}' | '\u{00BB}' => {
            false
        }
        _ => !ch.is_ascii(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).into_iter().map(|p| p.text).collect()
    }

    #[test]
    fn splits_words_and_punctuation() {
        assert_eq!(
            texts("The system shall log in (quickly)."),
            vec!["The", "system", "shall", "log", "in", "(", "quickly", ")", "."]
        );
    }

    #[test]
    fn keeps_offsets_into_the_source() {
        let text = "  Users  can't wait";
        for piece in tokenize(text) {
            assert_eq!(&text[piece.offset..piece.offset + piece.text.len()], piece.text);
        }
    }

    #[test]
    fn splits_clitics() {
        assert_eq!(texts("can't"), vec!["ca", "n't"]);
        assert_eq!(texts("user's data"), vec!["user", "'s", "data"]);
        assert_eq!(texts("We'll see"), vec!["We", "'ll", "see"]);
        let kinds: Vec<_> = tokenize("don't").into_iter().map(|p| p.kind).collect();
        assert_eq!(kinds, vec![PieceKind::Word, PieceKind::Clitic]);
    }

    #[test]
    fn keeps_numbers_together() {
        assert_eq!(texts("within 1,000.5 ms"), vec!["within", "1,000.5", "ms"]);
        assert_eq!(texts("ends with 5."), vec!["ends", "with", "5", "."]);
        assert_eq!(texts("10GB"), vec!["10GB"]);
        assert_eq!(tokenize("42")[0].kind, PieceKind::Number);
    }

    #[test]
    fn hyphen_is_its_own_piece() {
        assert_eq!(texts("user-friendly"), vec!["user", "-", "friendly"]);
    }
}
