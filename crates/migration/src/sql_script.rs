//! Ad-hoc SQL scripts applied from disk.
//!
//! Statements are split on `;` only at top level: semicolons inside string
//! literals, quoted identifiers and comments do not terminate a statement.
//! Comments are dropped from the emitted statements.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;
use tracing::{info, warn};

use crate::schema_ops::{classify, ErrorClass};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    Single,
    Double,
    Backtick,
    LineComment,
    BlockComment,
}

/// Split a script into executable statements.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut state = State::Code;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                ';' => flush(&mut cur, &mut out),
                '\'' => {
                    state = State::Single;
                    cur.push(c);
                }
                '"' => {
                    state = State::Double;
                    cur.push(c);
                }
                '`' => {
                    state = State::Backtick;
                    cur.push(c);
                }
                '#' => state = State::LineComment,
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                    cur.push(' ');
                }
                _ => cur.push(c),
            },
            State::Single | State::Double | State::Backtick => {
                let quote = match state {
                    State::Single => '\'',
                    State::Double => '"',
                    _ => '`',
                };
                cur.push(c);
                if c == '\\' && state != State::Backtick {
                    if let Some(next) = chars.next() {
                        cur.push(next);
                    }
                } else if c == quote {
                    // doubled quote is an escaped quote
                    if chars.peek() == Some(&quote) {
                        cur.push(quote);
                        chars.next();
                    } else {
                        state = State::Code;
                    }
                }
            }
            State::LineComment => {
                if c == '\n' {
                    cur.push('\n');
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                }
            }
        }
    }
    flush(&mut cur, &mut out);
    out
}

fn flush(cur: &mut String, out: &mut Vec<String>) {
    let stmt = cur.trim();
    if !stmt.is_empty() {
        out.push(stmt.to_string());
    }
    cur.clear();
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Execute every statement of `sql` in order. Benign duplicate-object errors
/// are logged and counted as skipped; any other error stops the script.
/// Statements are not wrapped in a transaction: MySQL DDL commits implicitly.
pub async fn apply_script<C>(conn: &C, sql: &str) -> Result<ScriptReport, DbErr>
where
    C: ConnectionTrait,
{
    let mut report = ScriptReport::default();
    for (idx, stmt) in split_statements(sql).iter().enumerate() {
        match conn.execute_unprepared(stmt).await {
            Ok(_) => report.applied += 1,
            Err(e) => match classify(&e) {
                ErrorClass::Benign(kind) => {
                    warn!(statement = idx + 1, ?kind, error = %e, "statement skipped");
                    report.skipped += 1;
                }
                _ => return Err(e),
            },
        }
    }
    info!(applied = report.applied, skipped = report.skipped, "sql script finished");
    Ok(report)
}
