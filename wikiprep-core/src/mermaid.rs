//! Repairs for mermaid diagram sources.
//!
//! Diagrams scraped from rendered wiki pages often arrive with several
//! statements collapsed onto one physical line, node labels that are present
//! but empty, and pipe characters inside labels that break markdown tables.
//! The stages here fix those defects without interpreting the diagram; text
//! that does not match a repair pattern is passed through verbatim.
//!
//! All stages share one view of a line (`scan_line`). Bracket groups,
//! quoted strings and `|edge labels|` are opaque to the statement splitter,
//! and the label repairs only ever rewrite the inside of a node label, so a
//! later stage can never change what an earlier one decided.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Node label shapes: `[..]`, `(..)`, `{..}` (and their doubled forms) and `>..]`
const LABEL: &str = r"(?:\[[^\]\n]*\]+|\([^)\n]*\)+|\{[^}\n]*\}+|>[^\]\n]*\])";

/// Optional `:::className` suffix on a node
const CLASS_SUFFIX: &str = r"(?::::[\w-]+)?";

/// Edge operators, with an optional `|label|` attached to the arrow
const ARROW: &str = concat!(
    r"(?:",
    r"<?-{2,}[>ox]|<?-{3,}|<?={2,}>|={3,}|<?-\.+->?|~{3,}",
    r"|[ox](?:-{2,}|={2,})[ox]",
    r"|-{1,2}(?:>>|[x)])",
    r"|(?:--|==)[^-=>|\n]+(?:-{2,}>|={2,}>|-{3,})",
    r")(?:\|[^|\n]*\|)?",
);

/// Words that open or shape a diagram rather than name a node
const KEYWORDS: &[&str] = &[
    "graph",
    "flowchart",
    "subgraph",
    "end",
    "direction",
    "style",
    "classDef",
    "class",
    "click",
    "linkStyle",
    "participant",
    "actor",
    "note",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "rect",
    "critical",
    "break",
    "autonumber",
    "activate",
    "deactivate",
    "title",
    "section",
    "state",
];

static EDGE_STATEMENT_REGEX: OnceLock<Regex> = OnceLock::new();
static EDGE_START_REGEX: OnceLock<Regex> = OnceLock::new();
static NODE_REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static NODE_START_REGEX: OnceLock<Regex> = OnceLock::new();

fn node_group_pattern() -> String {
    let node = format!(r"\w+{LABEL}?{CLASS_SUFFIX}");
    format!(r"{node}(?:\s*&\s*{node})*")
}

/// A complete edge statement such as `A --> B` or `A & B -->|x| C --- D`
fn edge_statement_regex() -> &'static Regex {
    EDGE_STATEMENT_REGEX.get_or_init(|| {
        let group = node_group_pattern();
        Regex::new(&format!(r"^{group}(?:\s*{ARROW}\s*{group})+$")).unwrap()
    })
}

/// Text that opens an edge statement (`A -->`, `B[] ==>`)
fn edge_start_regex() -> &'static Regex {
    EDGE_START_REGEX.get_or_init(|| {
        let group = node_group_pattern();
        Regex::new(&format!(r"^{group}\s*{ARROW}")).unwrap()
    })
}

fn node_reference_regex() -> &'static Regex {
    NODE_REFERENCE_REGEX
        .get_or_init(|| Regex::new(&format!(r"^(?P<id>\w+){LABEL}?{CLASS_SUFFIX}$")).unwrap())
}

fn node_start_regex() -> &'static Regex {
    NODE_START_REGEX.get_or_init(|| {
        Regex::new(&format!(
            r"^(?P<id>\w+){LABEL}?{CLASS_SUFFIX}(?:$|[\s&<=~-])"
        ))
        .unwrap()
    })
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn matching_opener(closer: char) -> char {
    match closer {
        ']' => '[',
        ')' => '(',
        _ => '{',
    }
}

/// A whitespace run that may separate two statements
struct Gap {
    /// Byte range in the scanned line
    raw: Range<usize>,
    /// Byte range in [`LineScan::masked`]
    masked: Range<usize>,
}

/// Structure of one diagram line
struct LineScan {
    /// The line with the inside of every bracket group, quoted string and
    /// edge label removed (`A["x y"] -->|z| B` becomes `A[] -->|| B`)
    masked: String,
    /// Whitespace runs outside any opaque span, before free text and not at
    /// the end of the line
    gaps: Vec<Gap>,
    /// Insides of node labels: bracket groups opened right after an identifier
    labels: Vec<Range<usize>>,
}

/// Scan one line of diagram text.
///
/// Brackets nest and a closer only counts when it matches the innermost
/// opener. A `:` that is not part of a `:::class` suffix, or a `%%` comment,
/// starts free text; nothing after it can separate statements.
fn scan_line(line: &str) -> LineScan {
    let mut scan = LineScan {
        masked: String::with_capacity(line.len()),
        gaps: Vec::new(),
        labels: Vec::new(),
    };
    let mut brackets: Vec<char> = Vec::new();
    let mut label_start: Option<usize> = None;
    let mut in_quote = false;
    let mut in_edge_label = false;
    let mut free_text = false;
    let mut prev: Option<char> = None;
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            _ if in_edge_label => {
                if c == '|' {
                    in_edge_label = false;
                    scan.masked.push(c);
                }
            }
            '"' => {
                in_quote = !in_quote;
                if brackets.is_empty() {
                    scan.masked.push(c);
                }
            }
            _ if in_quote => {}
            '[' | '(' | '{' => {
                if brackets.is_empty() {
                    scan.masked.push(c);
                    label_start = prev.filter(|p| is_ident_char(*p)).map(|_| pos + 1);
                }
                brackets.push(c);
            }
            ']' | ')' | '}' if !brackets.is_empty() => {
                if brackets.last() == Some(&matching_opener(c)) {
                    brackets.pop();
                    if brackets.is_empty() {
                        scan.masked.push(c);
                        if let Some(start) = label_start.take() {
                            scan.labels.push(start..pos);
                        }
                    }
                }
            }
            _ if !brackets.is_empty() => {}
            '|' => {
                in_edge_label = true;
                scan.masked.push(c);
            }
            ':' if line[pos..].starts_with(":::") => {
                scan.masked.push_str(":::");
                chars.next();
                chars.next();
            }
            ':' => {
                free_text = true;
                scan.masked.push(c);
            }
            '%' if line[pos..].starts_with("%%") => {
                free_text = true;
                scan.masked.push(c);
            }
            c if c.is_whitespace() => {
                let mut end = pos + c.len_utf8();
                while let Some(&(next_pos, next)) = chars.peek() {
                    if !next.is_whitespace() {
                        break;
                    }
                    end = next_pos + next.len_utf8();
                    chars.next();
                }

                let masked_start = scan.masked.len();
                scan.masked.push_str(&line[pos..end]);
                if !free_text && end < line.len() {
                    scan.gaps.push(Gap {
                        raw: pos..end,
                        masked: masked_start..scan.masked.len(),
                    });
                }
            }
            _ => scan.masked.push(c),
        }
        prev = Some(c);
    }

    scan
}

/// A lone node, optionally labelled, that is not a diagram keyword
fn is_node_reference(text: &str) -> bool {
    node_reference_regex()
        .captures(text)
        .and_then(|caps| caps.name("id"))
        .is_some_and(|id| !is_keyword(id.as_str()))
}

fn starts_with_node(text: &str) -> bool {
    node_start_regex()
        .captures(text)
        .and_then(|caps| caps.name("id"))
        .is_some_and(|id| !is_keyword(id.as_str()))
}

/// Decide whether a whitespace run of `run_len` characters sits between two
/// statements. Both sides are masked text: `left` since the previous split,
/// `right` up to the end of the line. Only a prefix of `right` is inspected.
fn is_statement_boundary(left: &str, right: &str, run_len: usize) -> bool {
    let left_is_edge = edge_statement_regex().is_match(left);
    if left_is_edge && edge_start_regex().is_match(right) {
        return true;
    }

    run_len >= 2 && (left_is_edge || is_node_reference(left)) && starts_with_node(right)
}

fn split_line(line: &str) -> Option<String> {
    let content = line.trim_start();
    let indent = &line[..line.len() - content.len()];
    let scan = scan_line(content);

    let mut boundaries = Vec::new();
    let mut segment_start = 0;
    for gap in &scan.gaps {
        let left = &scan.masked[segment_start..gap.masked.start];
        let right = &scan.masked[gap.masked.end..];
        let run_len = content[gap.raw.clone()].chars().count();
        if is_statement_boundary(left, right, run_len) {
            boundaries.push(gap.raw.clone());
            segment_start = gap.masked.end;
        }
    }
    if boundaries.is_empty() {
        return None;
    }

    let newline = if line.ends_with('\r') { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(line.len() + boundaries.len() * (indent.len() + 2));
    out.push_str(indent);

    let mut last = 0;
    for gap in boundaries {
        out.push_str(&content[last..gap.start]);
        out.push_str(newline);
        out.push_str(indent);
        last = gap.end;
    }
    out.push_str(&content[last..]);

    Some(out)
}

/// Put statements that share a physical line onto their own lines.
///
/// A whitespace run becomes a line break when it separates two complete
/// statements, e.g. `A-->B B-->C` or `A["x"]    B --> C`. The new line keeps
/// the indentation of the line it was split from. The diagram header and
/// `%%` comment lines are never split.
pub fn normalize_statement_separators(diagram: &str) -> String {
    let mut seen_header = false;

    diagram
        .split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return line.to_string();
            }
            if !seen_header {
                seen_header = true;
                return line.to_string();
            }
            if trimmed.starts_with("%%") {
                return line.to_string();
            }
            split_line(line).unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The identifier directly in front of a label opener
fn node_id(before: &str) -> &str {
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(before.len(), |(i, _)| i);
    &before[start..]
}

/// Rewrite node label insides line by line. `rewrite` gets the node id and
/// the current inside and returns the replacement, if any.
fn rewrite_labels<F>(diagram: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, &str) -> Option<String>,
{
    diagram
        .split('\n')
        .map(|line| {
            let mut out = String::with_capacity(line.len());
            let mut last = 0;
            for label in scan_line(line).labels {
                // openers are single byte
                let id = node_id(&line[..label.start - 1]);
                if let Some(replacement) = rewrite(id, &line[label.clone()]) {
                    out.push_str(&line[last..label.start]);
                    out.push_str(&replacement);
                    last = label.end;
                }
            }
            out.push_str(&line[last..]);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Give nodes declared with an empty label (`Dead[""]`) their identifier as
/// the label (`Dead["Dead"]`).
pub fn normalize_empty_node_labels(diagram: &str) -> String {
    rewrite_labels(diagram, |id, inside| {
        (inside == "\"\"").then(|| format!("\"{id}\""))
    })
}

/// Replace `|` with `/` inside node labels. Pipes in edge labels
/// (`-->|yes|`) are left alone.
pub fn normalize_flowchart_nodes(diagram: &str) -> String {
    rewrite_labels(diagram, |_, inside| {
        inside.contains('|').then(|| inside.replace('|', "/"))
    })
}

/// Run every repair over one diagram, in order: statement separators, empty
/// labels, then label pipes.
///
/// # Examples
///
/// ```
/// use wikiprep_core::normalize_mermaid_diagram;
///
/// let fixed = normalize_mermaid_diagram("graph TD\n    A[\"\"] --> B B --> C\n");
/// assert_eq!(fixed, "graph TD\n    A[\"A\"] --> B\n    B --> C\n");
/// ```
pub fn normalize_mermaid_diagram(diagram: &str) -> String {
    let separated = normalize_statement_separators(diagram);
    let labelled = normalize_empty_node_labels(&separated);
    normalize_flowchart_nodes(&labelled)
}

fn is_mermaid(info: &str) -> bool {
    info.split_whitespace()
        .next()
        .is_some_and(|lang| lang.eq_ignore_ascii_case("mermaid"))
}

/// Where `content` sits in the source of a fenced block: directly below the
/// opening fence and followed by a closing fence
fn block_content_range(markdown: &str, block: Range<usize>, content: &str) -> Option<Range<usize>> {
    let source = &markdown[block.clone()];
    let start = source.find('\n')? + 1;
    let rest = &source[start..];
    if content.is_empty() || !rest.starts_with(content) {
        return None;
    }
    if rest[content.len()..].trim().is_empty() {
        // unclosed, runs to the end of the document
        return None;
    }
    Some(block.start + start..block.start + start + content.len())
}

/// Source ranges of the contents of closed mermaid code blocks
fn mermaid_block_contents(markdown: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut current: Option<(Range<usize>, String)> = None;

    for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) if is_mermaid(&info) => {
                current = Some((range, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, content)) = current.as_mut() {
                    content.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((block, content)) = current.take() {
                    ranges.extend(block_content_range(markdown, block, &content));
                }
            }
            _ => {}
        }
    }

    ranges
}

/// Normalize every fenced ```` ```mermaid ```` block in a markdown document.
///
/// Only the text between the fences is rewritten; fence lines, other code
/// blocks and the rest of the document are kept byte for byte. Blocks whose
/// lines carry container markers (block quotes, list indentation) and
/// unclosed blocks are left untouched.
pub fn normalize_mermaid_blocks(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut last = 0;

    for content in mermaid_block_contents(markdown) {
        out.push_str(&markdown[last..content.start]);
        out.push_str(&normalize_mermaid_diagram(&markdown[content.clone()]));
        last = content.end;
    }
    out.push_str(&markdown[last..]);

    out
}
