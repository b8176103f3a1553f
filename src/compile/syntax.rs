//! Serialization of filter nodes into the renderer's expression language.
//!
//! Token shapes here are parsed by the renderer verbatim; seconds are always printed with two
//! decimals.

use std::fmt::{self, Display, Formatter, Write as _};

use crate::{
    compile::node::{
        AlphaCurve, CompiledGraph, ConcatNode, Coord, DelayAmount, DelayNode, DrawTextNode,
        FilterNode, MixNode, TextSource,
    },
    foundation::math::fmt_secs,
};

/// Separator between nodes of one filter graph.
pub const NODE_SEPARATOR: char = ';';

/// Separator between chained drawtext filters.
pub const CHAIN_SEPARATOR: char = ',';

impl Display for Coord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}"),
            Self::Expr(e) => f.write_str(e),
        }
    }
}

impl Display for DelayAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window(w) => write!(f, "{}|{}", fmt_secs(w.from), fmt_secs(w.to)),
            Self::Millis(ms) => write!(f, "{ms}"),
        }
    }
}

impl Display for DelayNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:a]adelay={}[{}]", self.input, self.amount, self.output)
    }
}

fn write_labels(f: &mut Formatter<'_>, labels: &[String]) -> fmt::Result {
    for l in labels {
        write!(f, "[{l}]")?;
    }
    Ok(())
}

impl Display for MixNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_labels(f, &self.inputs)?;
        write!(f, "amix=inputs={}[{}]", self.inputs.len(), self.output)
    }
}

impl Display for ConcatNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_labels(f, &self.inputs)?;
        write!(
            f,
            "concat=n={}:v={}:a={}[{}]",
            self.inputs.len(),
            self.video_streams,
            self.audio_streams,
            self.output
        )
    }
}

impl Display for FilterNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delay(n) => n.fmt(f),
            Self::Mix(n) => n.fmt(f),
            Self::Concat(n) => n.fmt(f),
        }
    }
}

impl Display for CompiledGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_char(NODE_SEPARATOR)?;
            }
            node.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for AlphaCurve {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let a = fmt_secs(self.fade_in_start());
        let b = fmt_secs(self.fade_in_end());
        let c = fmt_secs(self.fade_out_start());
        let d = fmt_secs(self.fade_out_end());
        let fi = fmt_secs(self.fade_in);
        let fo = fmt_secs(self.fade_out);
        write!(
            f,
            "if(lt(t,{a}),0,if(lt(t,{b}),(t-{a})/{fi},if(lt(t,{c}),1,if(lt(t,{d}),1-(t-{c})/{fo},0))))"
        )
    }
}

impl Display for TextSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => {
                write!(f, "textfile={}", quote_filter_value(&p.display().to_string()))
            }
            Self::Inline(s) => write!(f, "text='{}'", escape_inline_text(s)),
        }
    }
}

impl Display for DrawTextNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "drawtext=\"{}:fontfile={}:fontsize={}:fontcolor={}",
            self.source,
            quote_filter_value(&self.font_file),
            self.font_size,
            self.font_color
        )?;
        if let Some(spacing) = self.line_spacing {
            write!(f, ":line_spacing={spacing}")?;
        }
        write!(f, ":x={}:y={}", self.position.x, self.position.y)?;
        if let Some(w) = self.enable {
            write!(
                f,
                ":enable='between(t,{},{})'",
                fmt_secs(w.from),
                fmt_secs(w.to)
            )?;
            if let Some(alpha) = &self.alpha {
                write!(f, ":alpha='{alpha}'")?;
            }
        }
        f.write_char('"')
    }
}

/// Quote-safe form of inline drawtext content.
///
/// The result sits inside single quotes in the filter and inside double quotes in the shell:
/// single quotes close/escape/reopen (`'\''`), and characters that stay special inside shell
/// double quotes are backslash-escaped.
pub fn escape_inline_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("'\\''"),
            '"' | '$' | '`' => {
                out.push('\\');
                out.push(ch);
            }
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out
}

/// A filter option value that survives both the filter parser and shell double quotes.
///
/// Values made only of path-safe characters are returned unchanged; anything else is wrapped
/// in filter-level single quotes and escaped like inline text.
pub fn quote_filter_value(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_filter_safe) {
        return s.to_string();
    }
    format!("'{}'", escape_inline_text(s))
}

/// One shell word that `sh` reads back as exactly `s`.
///
/// Words made only of characters the shell never interprets are returned unchanged;
/// everything else is single-quoted, with embedded single quotes written as `'\''`.
pub fn shell_quote(s: &str) -> String {
    let shell_safe = |c: char| is_filter_safe(c) || matches!(c, ':' | ',' | '=' | '@' | '%');
    if !s.is_empty() && s.chars().all(shell_safe) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

fn is_filter_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '+')
}

#[cfg(test)]
#[path = "../../tests/unit/compile/syntax.rs"]
mod tests;
