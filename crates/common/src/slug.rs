//! URL slugs for restaurant names.
//!
//! A slug keeps lower-case Latin letters, Cyrillic `а-я` and ASCII digits.
//! Every run of anything else collapses into one `-`, and the result never
//! starts or ends with a hyphen.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("name produces an empty slug")]
    Empty,
}

fn keep(c: char) -> Option<char> {
    match c {
        'a'..='z' | '0'..='9' | 'а'..='я' => Some(c),
        'ё' => Some('е'),
        _ => None,
    }
}

/// Derive a slug from a display name.
pub fn slugify(name: &str) -> Result<String, SlugError> {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        match keep(c) {
            Some(k) => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(k);
            }
            None => pending_dash = true,
        }
    }
    if out.is_empty() {
        return Err(SlugError::Empty);
    }
    Ok(out)
}

/// True when `s` is already in canonical slug form.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars().all(|c| c == '-' || keep(c) == Some(c))
}
