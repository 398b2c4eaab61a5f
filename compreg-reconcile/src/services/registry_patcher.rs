//! Generated registry index patching
//!
//! The index is a small TypeScript module: a block of imports followed by an
//! exported object literal listing every generated component. The source is
//! split into an [`IndexDocument`]:
//!
//! ```text
//! head      leading text before the first import (comments)
//! imports   import statements, in order
//! body      everything after the imports, up to and including the anchor line
//! entries   lines inside the object literal
//! tail      the closing line and everything after it
//! ```
//!
//! Rendering an unmodified document gives back the input byte for byte. New
//! components are appended to `imports` and `entries`; nothing else changes.

use crate::models::RegistryPatchResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Written when the index file does not exist yet
pub const INDEX_TEMPLATE: &str = "\
// Generated component registry. Entries are appended by compreg-reconcile.

export const generatedComponents = {
};

export default generatedComponents;
";

static IMPORT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\b").expect("valid import start regex"));

/// An import statement is complete once it names its module
static IMPORT_COMPLETE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)(?:\bfrom\s*['"][^'"]*['"]|^\s*import\s*['"][^'"]*['"])"#)
        .expect("valid import completion regex")
});

static IMPORT_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*import\s+(?:type\s+)?(.*?)\s*\bfrom\s*['"]"#).expect("valid import clause regex")
});

/// Patch errors; all of them are fatal to the patch stage
#[derive(Debug, Error)]
pub enum PatchError {
    /// Configured anchor pattern is not a valid regex
    #[error("Invalid anchor pattern: {0}")]
    InvalidAnchorPattern(#[from] regex::Error),

    /// No line after the imports matches the anchor pattern
    #[error("Anchor not found (pattern: {0})")]
    AnchorNotFound(String),

    /// Anchor found but no closing line follows it
    #[error("No closing line after anchor at line {0}")]
    ClosingNotFound(usize),

    /// Reading or writing the index file failed
    #[error("Index file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One import statement, possibly spanning several lines
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    pub raw: String,
    /// Local names the statement binds
    pub identifiers: Vec<String>,
}

impl ImportStatement {
    fn parse(raw: String) -> Self {
        let identifiers = bound_identifiers(&raw);
        Self { raw, identifiers }
    }
}

/// Local names bound by an import statement
///
/// `import A, { B, C as D } from '...'` binds `A`, `B`, `D`;
/// `import * as NS from '...'` binds `NS`.
fn bound_identifiers(statement: &str) -> Vec<String> {
    let Some(clause) = IMPORT_CLAUSE.captures(statement).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    let clause = clause.as_str();

    let (outside, inside) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{}{}", &clause[..open], &clause[close + 1..]),
            &clause[open + 1..close],
        ),
        _ => (clause.to_string(), ""),
    };

    outside
        .split(',')
        .chain(inside.split(','))
        .map(str::trim)
        .map(|part| part.strip_prefix("type ").unwrap_or(part).trim())
        .filter(|part| !part.is_empty())
        .map(|part| match part.rsplit_once(" as ") {
            Some((_, local)) => local.trim().to_string(),
            None => part.to_string(),
        })
        .collect()
}

/// Lexical context carried from one line to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    BlockComment,
    Template,
}

/// Bracket nesting tracker that ignores strings and comments
///
/// `{`, `[` and `(` open a level; the object literal is closed when a `}`
/// takes the depth back to zero.
#[derive(Debug)]
struct BraceScanner {
    lexical: Lexical,
    depth: usize,
}

/// What a single line contributed
#[derive(Debug, Default)]
struct LineScan {
    /// The line closed the outermost level
    closed: bool,
    /// Byte offset of the last code character (comments excluded)
    last_code: Option<usize>,
}

impl BraceScanner {
    fn new() -> Self {
        Self {
            lexical: Lexical::Code,
            depth: 0,
        }
    }

    fn feed(&mut self, line: &str) -> LineScan {
        let bytes = line.as_bytes();
        let mut scan = LineScan::default();
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            let next = bytes.get(i + 1).copied();
            match self.lexical {
                Lexical::BlockComment => {
                    if b == b'*' && next == Some(b'/') {
                        self.lexical = Lexical::Code;
                        i += 1;
                    }
                }
                Lexical::Template => match b {
                    b'\\' => i += 1,
                    b'`' => {
                        self.lexical = Lexical::Code;
                        scan.last_code = Some(i);
                    }
                    _ => {}
                },
                Lexical::Code => match b {
                    b'/' if next == Some(b'/') => break,
                    b'/' if next == Some(b'*') => {
                        self.lexical = Lexical::BlockComment;
                        i += 1;
                    }
                    b'`' => {
                        self.lexical = Lexical::Template;
                        scan.last_code = Some(i);
                    }
                    b'\'' | b'"' => {
                        i = closing_quote(bytes, i);
                        scan.last_code = Some(i.min(bytes.len() - 1));
                    }
                    b'{' | b'[' | b'(' => {
                        self.depth += 1;
                        scan.last_code = Some(i);
                    }
                    b'}' | b']' | b')' => {
                        self.depth = self.depth.saturating_sub(1);
                        if b == b'}' && self.depth == 0 {
                            scan.closed = true;
                            return scan;
                        }
                        scan.last_code = Some(i);
                    }
                    c if c.is_ascii_whitespace() => {}
                    _ => scan.last_code = Some(i),
                },
            }
            i += 1;
        }
        scan
    }
}

/// Index of the quote closing the string opened at `start`, or the line end
fn closing_quote(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b if b == quote => return j,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// One line between the anchor and the closing line
#[derive(Debug, Clone, PartialEq)]
struct EntryLine {
    raw: String,
    /// Nesting at the start of the line; 1 is the object's own level
    depth: usize,
    /// Nesting once the line has been read
    depth_after: usize,
    /// The line began inside a comment or template string
    continued: bool,
    last_code: Option<usize>,
}

impl EntryLine {
    /// A freshly appended `Identifier,` line
    fn appended(indent: &str, identifier: &str) -> Self {
        let raw = format!("{}{},\n", indent, identifier);
        let last_code = Some(indent.len() + identifier.len());
        Self {
            raw,
            depth: 1,
            depth_after: 1,
            continued: false,
            last_code,
        }
    }

    fn starts_entry(&self) -> bool {
        self.depth == 1 && !self.continued && self.last_code.is_some()
    }

    fn ends_entry(&self) -> bool {
        self.depth_after == 1 && self.last_code.is_some()
    }
}

/// Parsed index source
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    head: String,
    imports: Vec<ImportStatement>,
    body: String,
    entries: Vec<EntryLine>,
    tail: String,
}

impl IndexDocument {
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(
            self.head.len() + self.body.len() + self.tail.len() + 64 * (self.imports.len() + self.entries.len()),
        );
        out.push_str(&self.head);
        for import in &self.imports {
            out.push_str(&import.raw);
        }
        out.push_str(&self.body);
        for entry in &self.entries {
            out.push_str(&entry.raw);
        }
        out.push_str(&self.tail);
        out
    }

    pub fn imported_identifiers(&self) -> BTreeSet<&str> {
        self.imports
            .iter()
            .flat_map(|i| i.identifiers.iter().map(String::as_str))
            .collect()
    }

    /// Raw lines inside the object literal, nested ones included
    pub fn entries(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.raw.as_str()).collect()
    }

    /// Indentation of the first top-level entry; two spaces when there is none
    fn entry_indent(&self) -> String {
        self.entries
            .iter()
            .find(|entry| entry.starts_entry())
            .map(|entry| entry.raw[..entry.raw.len() - entry.raw.trim_start().len()].to_string())
            .unwrap_or_else(|| "  ".to_string())
    }

    /// Give the last top-level entry a trailing comma if it lacks one
    ///
    /// The comma goes right after the last code character, ahead of any
    /// trailing comment.
    fn ensure_trailing_comma(&mut self) {
        let last = self.entries.iter_mut().rev().find(|entry| entry.ends_entry());
        if let Some(entry) = last {
            if let Some(at) = entry.last_code {
                if entry.raw.as_bytes()[at] != b',' {
                    entry.raw.insert(at + 1, ',');
                }
            }
        }
    }
}

/// Result of patching a source text
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedIndex {
    pub source: String,
    pub result: RegistryPatchResult,
}

/// Appends component references to the generated index
#[derive(Debug, Clone)]
pub struct RegistryPatcher {
    anchor: Regex,
    import_prefix: String,
}

impl RegistryPatcher {
    pub fn new(anchor_pattern: &str, import_prefix: impl Into<String>) -> Result<Self, PatchError> {
        Ok(Self {
            anchor: Regex::new(anchor_pattern)?,
            import_prefix: import_prefix.into(),
        })
    }

    pub fn parse(&self, source: &str) -> Result<IndexDocument, PatchError> {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let is_anchor = |line: &str| self.anchor.is_match(line.trim_end_matches(['\n', '\r']));

        let first_anchor = lines.iter().position(|l| is_anchor(*l));
        let first_import = lines
            .iter()
            .position(|l| IMPORT_START.is_match(l))
            .filter(|&i| first_anchor.map_or(true, |a| i < a));

        let mut imports = Vec::new();
        let (head_end, body_start) = match first_import {
            Some(start) => {
                let mut i = start;
                while i < lines.len() {
                    if IMPORT_START.is_match(lines[i]) {
                        let mut raw = String::new();
                        while i < lines.len() {
                            raw.push_str(lines[i]);
                            i += 1;
                            if IMPORT_COMPLETE.is_match(&raw) {
                                break;
                            }
                        }
                        imports.push(ImportStatement::parse(raw));
                    } else if lines[i].trim().is_empty() {
                        // Blank lines belong to the block only between imports
                        let next = (i..lines.len()).find(|&j| !lines[j].trim().is_empty());
                        match next {
                            Some(j) if IMPORT_START.is_match(lines[j]) => {
                                imports.push(ImportStatement::parse(lines[i..j].concat()));
                                i = j;
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                (start, i)
            }
            None => {
                let comments = lines
                    .iter()
                    .take_while(|l| {
                        let t = l.trim_start();
                        t.starts_with("//") || t.starts_with("/*") || t.starts_with('*')
                    })
                    .count();
                (comments, comments)
            }
        };

        let anchor_idx = (body_start..lines.len())
            .find(|&i| is_anchor(lines[i]))
            .ok_or_else(|| PatchError::AnchorNotFound(self.anchor.as_str().to_string()))?;

        let mut scanner = BraceScanner::new();
        let opened = scanner.feed(lines[anchor_idx]);
        if opened.closed || scanner.depth == 0 {
            return Err(PatchError::ClosingNotFound(anchor_idx + 1));
        }

        let mut entries = Vec::new();
        let mut closing_idx = None;
        for (i, line) in lines.iter().enumerate().skip(anchor_idx + 1) {
            let depth = scanner.depth;
            let continued = scanner.lexical != Lexical::Code;
            let scan = scanner.feed(line);
            if scan.closed {
                closing_idx = Some(i);
                break;
            }
            entries.push(EntryLine {
                raw: line.to_string(),
                depth,
                depth_after: scanner.depth,
                continued,
                last_code: scan.last_code,
            });
        }
        let closing_idx = closing_idx.ok_or(PatchError::ClosingNotFound(anchor_idx + 1))?;

        Ok(IndexDocument {
            head: lines[..head_end].concat(),
            imports,
            body: lines[body_start..=anchor_idx].concat(),
            entries,
            tail: lines[closing_idx..].concat(),
        })
    }

    /// Add imports and entries for identifiers not already imported
    pub fn patch(&self, source: &str, identifiers: &[String]) -> Result<PatchedIndex, PatchError> {
        let mut doc = self.parse(source)?;

        let mut seen: BTreeSet<String> = doc
            .imported_identifiers()
            .into_iter()
            .map(str::to_string)
            .collect();
        let added: Vec<String> = identifiers
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();

        if added.is_empty() {
            return Ok(PatchedIndex {
                source: source.to_string(),
                result: RegistryPatchResult::unchanged(),
            });
        }

        if let Some(last) = doc.imports.last_mut() {
            if !last.raw.ends_with('\n') {
                last.raw.push('\n');
            }
        }
        for identifier in &added {
            doc.imports.push(ImportStatement {
                raw: format!("import {0} from '{1}{0}';\n", identifier, self.import_prefix),
                identifiers: vec![identifier.clone()],
            });
        }

        let indent = doc.entry_indent();
        doc.ensure_trailing_comma();
        for identifier in &added {
            doc.entries.push(EntryLine::appended(&indent, identifier));
        }

        Ok(PatchedIndex {
            source: doc.render(),
            result: RegistryPatchResult {
                updated: true,
                new_entries: added.len(),
                added_refs: added,
            },
        })
    }

    /// Patch the index file in place, creating it from [`INDEX_TEMPLATE`] if needed
    ///
    /// The file is only written after a successful patch with new entries.
    pub fn patch_file(&self, path: &Path, identifiers: &[String]) -> Result<RegistryPatchResult, PatchError> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Index file missing, starting from template");
                INDEX_TEMPLATE.to_string()
            }
            Err(e) => return Err(e.into()),
        };

        let patched = self.patch(&source, identifiers)?;
        if patched.result.updated {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &patched.source)?;
            tracing::info!(
                path = %path.display(),
                new_entries = patched.result.new_entries,
                "Registry index patched"
            );
        } else {
            tracing::info!(path = %path.display(), "Registry index already up to date");
        }
        Ok(patched.result)
    }
}
