//! Placeholder expansion for raw SQL and function calls.

use super::arg::{Arg, FuncExpr, RawValue};
use crate::error::{Error, Result};
use crate::param::ParamList;

/// `(?, ?, ?)` for `n` values, `(NULL)` for none.
pub(crate) fn placeholder_group(n: usize) -> String {
    if n == 0 {
        return "(NULL)".to_string();
    }
    let mut out = String::with_capacity(2 + n * 3);
    out.push('(');
    for i in 0..n {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('?');
    }
    out.push(')');
    out
}

/// Bind each `?` in `raw` to the next argument, appending the bound values
/// to `params` in order.
///
/// A list argument turns its `?` into a parenthesized group; nested raw
/// values and function calls splice in their own text and arguments. Every
/// other character is kept as is.
pub fn expand_placeholders(raw: &RawValue, params: &mut ParamList) -> Result<String> {
    let placeholders = raw.sql.matches('?').count();
    if placeholders != raw.args.len() {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            target: "sqlfrag",
            placeholders,
            args = raw.args.len(),
            sql = %raw.sql,
            "placeholder/argument count mismatch"
        );
        return Err(Error::PlaceholderMismatch {
            placeholders,
            args: raw.args.len(),
        });
    }

    let mut out = String::with_capacity(raw.sql.len());
    let mut args = raw.args.iter();
    for ch in raw.sql.chars() {
        if ch == '?' {
            // Counts were checked above.
            if let Some(arg) = args.next() {
                out.push_str(&expand_arg(arg, params)?);
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// SQL text for one argument in placeholder position.
pub(crate) fn expand_arg(arg: &Arg, params: &mut ParamList) -> Result<String> {
    match arg {
        Arg::Value(p) => {
            params.push(p.clone());
            Ok("?".to_string())
        }
        Arg::List(values) => {
            params.extend_params(values.iter().cloned());
            Ok(placeholder_group(values.len()))
        }
        Arg::Func(f) => render_func(f, params),
        Arg::Raw(r) => expand_placeholders(r, params),
        Arg::Cmp(_) => Err(Error::UnsupportedArgument(
            "a comparison can only be the value of a constraint".to_string(),
        )),
    }
}

/// `NAME()` or `NAME(?, ?, ...)` with the arguments flattened in order.
pub(crate) fn render_func(f: &FuncExpr, params: &mut ParamList) -> Result<String> {
    let mut out = String::with_capacity(f.name.len() + 2 + f.args.len() * 3);
    out.push_str(f.name.trim());
    out.push('(');
    for (i, arg) in f.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&expand_arg(arg, params)?);
    }
    out.push(')');
    Ok(out)
}
