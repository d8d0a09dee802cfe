//! Line-level model of a manifest file.
//!
//! The manifest is split structurally, never re-serialized: a preamble (lines
//! before the first table header) followed by sections, each a header line
//! and the lines up to the next header. Every line keeps its original bytes,
//! including its line ending, so rendering an unmodified document returns
//! the input exactly.
//!
//! A header is a line starting at column 0 with `[name]` or `[[name]]`,
//! optionally followed by a `#` comment. Lines that continue a multi-line
//! array, inline table or string are never headers, even when they look
//! like one.

/// Line terminator style of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// Style of the first terminated line of `text`; LF when there is none.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if text[..idx].ends_with('\r') => Self::CrLf,
            _ => Self::Lf,
        }
    }

    /// The terminator itself.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// One table header and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Table name between the brackets, trimmed.
    pub name: String,
    /// Header line as written, with its terminator.
    pub header: String,
    /// Body lines, each with its terminator (the last may lack one).
    pub body: Vec<String>,
}

impl Section {
    /// Comment lines directly above the next header.
    ///
    /// They describe the following section, so they survive when this
    /// section's body is regenerated. The scan stops at any line that also
    /// appears in `generated`, so comments written by a previous run are
    /// never carried over.
    fn attached_comments(&self, generated: &[String]) -> &[String] {
        let start = self
            .body
            .iter()
            .rposition(|line| {
                !line.trim_start().starts_with('#')
                    || generated.iter().any(|g| g.trim_end() == line.trim_end())
            })
            .map_or(0, |idx| idx + 1);
        &self.body[start..]
    }
}

/// Tracks values that continue past the end of a line.
#[derive(Debug, Default)]
struct ContinuationState {
    /// Open `[` and `{` brackets outside strings.
    depth: usize,
    /// Closing delimiter of an open multi-line string.
    multiline: Option<&'static str>,
}

impl ContinuationState {
    fn is_open(&self) -> bool {
        self.depth > 0 || self.multiline.is_some()
    }

    fn advance(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if let Some(delim) = self.multiline {
                if delim == BASIC_MULTILINE && bytes[i] == b'\\' {
                    i += 2;
                } else if bytes[i..].starts_with(delim.as_bytes()) {
                    self.multiline = None;
                    i += delim.len();
                } else {
                    i += 1;
                }
                continue;
            }

            match bytes[i] {
                b'#' => return,
                quote @ (b'"' | b'\'') => {
                    let triple = if quote == b'"' { BASIC_MULTILINE } else { LITERAL_MULTILINE };
                    if bytes[i..].starts_with(triple.as_bytes()) {
                        self.multiline = Some(triple);
                        i += triple.len();
                        continue;
                    }
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if quote == b'"' && bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                    i += 1;
                }
                b'[' | b'{' => {
                    self.depth += 1;
                    i += 1;
                }
                b']' | b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    i += 1;
                }
                _ => i += 1,
            }
        }
    }
}

const BASIC_MULTILINE: &str = r#"""""#;
const LITERAL_MULTILINE: &str = "'''";

/// Parsed manifest text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
    line_ending: LineEnding,
}

impl ManifestDocument {
    /// Split `text` into preamble and sections.
    pub fn parse(text: &str) -> Self {
        let mut preamble = Vec::new();
        let mut sections: Vec<Section> = Vec::new();
        let mut continuation = ContinuationState::default();

        for line in text.split_inclusive('\n') {
            if !continuation.is_open()
                && let Some(name) = header_name(line)
            {
                sections.push(Section {
                    name,
                    header: line.to_string(),
                    body: Vec::new(),
                });
                continue;
            }

            continuation.advance(line);
            if let Some(section) = sections.last_mut() {
                section.body.push(line.to_string());
            } else {
                preamble.push(line.to_string());
            }
        }

        Self {
            preamble,
            sections,
            line_ending: LineEnding::detect(text),
        }
    }

    /// Line ending used for generated lines.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Section names in file order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// First section named `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Whether a section named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Whether another section follows the first one named `name`.
    pub fn is_followed(&self, name: &str) -> bool {
        self.sections
            .iter()
            .position(|s| s.name == name)
            .is_some_and(|idx| idx + 1 < self.sections.len())
    }

    /// Replace the body of every section named `name`, keeping comment lines
    /// that sit directly above the next header.
    ///
    /// A header without a terminator is terminated first. Returns `false`
    /// when no such section exists.
    pub fn replace_body(&mut self, name: &str, body: &[String]) -> bool {
        let eol = self.line_ending.as_str();
        let count = self.sections.len();
        let mut replaced = false;
        for (idx, section) in self.sections.iter_mut().enumerate() {
            if section.name != name {
                continue;
            }
            if !section.header.ends_with('\n') {
                section.header.push_str(eol);
            }
            let attached = if idx + 1 < count { section.attached_comments(body).to_vec() } else { Vec::new() };
            section.body = body.iter().cloned().chain(attached).collect();
            replaced = true;
        }
        replaced
    }

    /// Append an empty section named `name` at the end of the document.
    ///
    /// The preceding content is terminated and separated by a blank line.
    pub fn append_section(&mut self, name: &str) {
        let eol = self.line_ending.as_str();
        let lines = match self.sections.last_mut() {
            Some(section) => {
                if !section.header.ends_with('\n') {
                    section.header.push_str(eol);
                }
                &mut section.body
            }
            None => &mut self.preamble,
        };

        if let Some(last) = lines.last_mut()
            && !last.ends_with('\n')
        {
            last.push_str(eol);
        }
        if lines.last().is_some_and(|line| !line.trim().is_empty()) {
            lines.push(eol.to_string());
        }

        self.sections.push(Section {
            name: name.to_string(),
            header: format!("[{name}]{eol}"),
            body: Vec::new(),
        });
    }

    /// Reassemble the document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.preamble {
            out.push_str(line);
        }
        for section in &self.sections {
            out.push_str(&section.header);
            for line in &section.body {
                out.push_str(line);
            }
        }
        out
    }
}

/// Table name of a header line, or `None` for any other line.
fn header_name(line: &str) -> Option<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    if !line.starts_with('[') {
        return None;
    }

    let (open, close) = if line.starts_with("[[") { ("[[", "]]") } else { ("[", "]") };
    let inner = &line[open.len()..];
    let end = inner.find(close)?;
    let name = inner[..end].trim();

    let rest = inner[end + close.len()..].trim_start();
    if name.is_empty() || !(rest.is_empty() || rest.starts_with('#')) {
        return None;
    }

    Some(name.to_string())
}
