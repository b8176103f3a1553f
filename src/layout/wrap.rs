use crate::foundation::error::{CuecastError, CuecastResult};

/// Width-constrained wrapping configuration for one caption block.
///
/// Widths are counted in Unicode scalar values, and include the indent and prefix decoration
/// of the line being built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WrapSpec {
    /// Maximum line width.
    pub width: usize,
    /// String the input is split into words on.
    pub separator: String,
    /// String placed between words on the same line.
    pub joiner: String,
    /// Line break inserted between emitted lines.
    pub newline: String,
    /// How many times `indent_glyph` is repeated for an indented line.
    pub indent_amount: usize,
    /// Glyph used for indentation.
    pub indent_glyph: String,
    /// Indent every continuation line.
    pub indent_all: bool,
    /// Indent the first line.
    pub indent_start: bool,
    /// Prefix string (e.g. a bullet).
    pub prefix: String,
    /// Prefix every continuation line.
    pub prefix_all: bool,
    /// Prefix the first line.
    pub prefix_start: bool,
}

impl Default for WrapSpec {
    fn default() -> Self {
        Self {
            width: 60,
            separator: " ".to_string(),
            joiner: " ".to_string(),
            newline: "\n".to_string(),
            indent_amount: 0,
            indent_glyph: " ".to_string(),
            indent_all: false,
            indent_start: false,
            prefix: String::new(),
            prefix_all: false,
            prefix_start: false,
        }
    }
}

impl WrapSpec {
    /// Plain wrapping at `width` with no decoration.
    pub fn plain(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Bulleted body text: prefix on the first line, continuation lines indented.
    pub fn bullet(width: usize, prefix: impl Into<String>, indent_amount: usize) -> Self {
        Self {
            width,
            prefix: prefix.into(),
            prefix_start: true,
            indent_amount,
            indent_all: true,
            ..Self::default()
        }
    }

    /// Paragraph text with indented continuation lines.
    pub fn hanging(width: usize, indent_amount: usize) -> Self {
        Self {
            width,
            indent_amount,
            indent_all: true,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> CuecastResult<()> {
        if self.width == 0 {
            return Err(CuecastError::layout_config("wrap width must be non-zero"));
        }
        if self.separator.is_empty() {
            return Err(CuecastError::layout_config(
                "wrap separator must be non-empty",
            ));
        }
        Ok(())
    }

    fn decoration(&self, first_line: bool) -> String {
        let (indent, prefix) = if first_line {
            (self.indent_start, self.prefix_start)
        } else {
            (self.indent_all, self.prefix_all)
        };
        let mut out = String::new();
        if indent {
            out.push_str(&self.indent_glyph.repeat(self.indent_amount));
        }
        if prefix {
            out.push_str(&self.prefix);
        }
        out
    }
}

/// Ordered exact-match substitutions applied before wrapping.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlyphMap {
    /// Strings to look for.
    pub glyphs: Vec<String>,
    /// Replacement for the glyph at the same index.
    pub replacements: Vec<String>,
}

impl GlyphMap {
    /// Build a map from parallel glyph/replacement lists.
    pub fn new<G, R>(glyphs: G, replacements: R) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            glyphs: glyphs.into_iter().map(Into::into).collect(),
            replacements: replacements.into_iter().map(Into::into).collect(),
        }
    }

    /// Escapes the literal percent sign, which the renderer's text expansion treats as special.
    pub fn renderer_escapes() -> Self {
        Self::new(["%"], ["\\%"])
    }

    pub(crate) fn validate(&self) -> CuecastResult<()> {
        if self.glyphs.len() != self.replacements.len() {
            return Err(CuecastError::layout_config(format!(
                "glyphs and replacements must be of the same length (got {} and {})",
                self.glyphs.len(),
                self.replacements.len()
            )));
        }
        if self.glyphs.iter().any(String::is_empty) {
            return Err(CuecastError::layout_config("glyphs must be non-empty"));
        }
        Ok(())
    }
}

/// Apply `map` to `text`, one pair at a time and in order.
///
/// Each pair is applied once over the output of the previous pair; replacements are never
/// rescanned for the same glyph.
pub fn replace_glyphs(text: &str, map: &GlyphMap) -> CuecastResult<String> {
    map.validate()?;
    let mut out = text.to_string();
    for (glyph, replacement) in map.glyphs.iter().zip(&map.replacements) {
        out = out.replace(glyph.as_str(), replacement);
    }
    Ok(out)
}

/// Greedily wrap `text` into lines no wider than `spec.width`.
///
/// The first word on a line is always placed, so a word that does not fit next to the line's
/// decoration (`width` minus indent and prefix) sits alone on it unsplit, even when the word
/// alone would be narrower than `width`.
pub fn wrap(text: &str, spec: &WrapSpec) -> String {
    let joiner_len = spec.joiner.chars().count();
    let mut lines: Vec<String> = Vec::new();
    let mut line = spec.decoration(true);
    let mut count = line.chars().count();
    let mut line_has_words = false;

    for word in text.split(spec.separator.as_str()).filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();
        if line_has_words && count + word_len >= spec.width {
            lines.push(std::mem::replace(&mut line, spec.decoration(false)));
            count = line.chars().count();
            line_has_words = false;
        }
        if line_has_words {
            line.push_str(&spec.joiner);
        }
        line.push_str(word);
        count += word_len + joiner_len;
        line_has_words = true;
    }
    if line_has_words {
        lines.push(line);
    }

    lines.join(&spec.newline)
}

/// Word-wrap engine bundling a [`WrapSpec`] with the substitutions applied before it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordWrapper {
    /// Wrapping configuration.
    pub spec: WrapSpec,
    /// Substitutions applied before wrapping.
    pub glyphs: GlyphMap,
}

impl WordWrapper {
    /// Create a wrapper.
    pub fn new(spec: WrapSpec, glyphs: GlyphMap) -> Self {
        Self { spec, glyphs }
    }

    /// Substitute, then wrap.
    pub fn layout(&self, text: &str) -> CuecastResult<String> {
        self.spec.validate()?;
        let substituted = replace_glyphs(text, &self.glyphs)?;
        Ok(wrap(&substituted, &self.spec))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
