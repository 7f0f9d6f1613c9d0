//! Reduces rendered invoice HTML to the handful of layout blocks the PDF
//! writer understands.
//!
//! Supported: headings, paragraphs and other block containers, list items,
//! tables, `<br>`, `<hr>` and bold/italic runs. The contents of `head`,
//! `style`, `script` and `title` are dropped, and any other tag is ignored
//! while its text is kept. Character references are decoded after the tags
//! have been split off, so escaped data such as `&lt;script&gt;` stays text.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::mem;
use std::sync::OnceLock;

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

/// One table row: cells, each a list of spans.
pub type Row = Vec<Vec<Span>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    ListItem(Vec<Span>),
    Table(Vec<Row>),
    Rule,
}

impl Block {
    /// Plain text of the block, cells separated by a space.
    pub fn text(&self) -> String {
        fn join(spans: &[Span]) -> String {
            spans.iter().map(|s| s.text.as_str()).collect()
        }
        match self {
            Block::Heading { spans, .. } | Block::Paragraph(spans) | Block::ListItem(spans) => join(spans),
            Block::Table(rows) => rows
                .iter()
                .flat_map(|row| row.iter().map(|cell| join(cell)))
                .collect::<Vec<_>>()
                .join(" "),
            Block::Rule => String::new(),
        }
    }
}

const SKIPPED: [&str; 4] = ["head", "style", "script", "title"];
const CONTAINERS: [&str; 17] = [
    "html", "body", "main", "div", "p", "section", "article", "header", "footer", "address", "aside",
    "blockquote", "ul", "ol", "dl", "dt", "dd",
];

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9]*)[^>]*>")
            .expect("tag pattern is valid")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z]+);").expect("entity pattern is valid")
    })
}

/// Splits `html` into layout blocks, in document order.
pub fn parse(html: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    let mut last = 0;

    for caps in tag_regex().captures_iter(html) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        builder.text(&html[last..whole.start]);
        last = whole.end;

        // Comments and doctypes carry no name.
        if let Some(name) = caps.get(2) {
            let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
            let self_closing = html[whole.clone()].ends_with("/>");
            builder.tag(&name.as_str().to_ascii_lowercase(), closing, self_closing);
        }
    }
    builder.text(&html[last..]);
    builder.finish()
}

#[derive(Default)]
enum Pending {
    #[default]
    Paragraph,
    Heading(u8),
    ListItem,
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    pending: Pending,
    space: bool,
    bold: usize,
    italic: usize,
    skip: Option<String>,
    table: Option<Vec<Row>>,
    row: Option<Row>,
    in_cell: bool,
}

impl Builder {
    fn text(&mut self, raw: &str) {
        if self.skip.is_some() || raw.is_empty() {
            return;
        }
        let decoded = decode_entities(raw);
        let words: Vec<&str> = decoded.split_whitespace().collect();
        if words.is_empty() {
            self.space = true;
            return;
        }

        let mut text = String::new();
        if (self.space || decoded.starts_with(char::is_whitespace)) && !self.spans.is_empty() {
            text.push(' ');
        }
        text.push_str(&words.join(" "));
        self.space = decoded.ends_with(char::is_whitespace);

        let (bold, italic) = (self.bold > 0, self.italic > 0);
        match self.spans.last_mut() {
            Some(last) if last.bold == bold && last.italic == italic => last.text.push_str(&text),
            _ => self.spans.push(Span { text, bold, italic }),
        }
    }

    fn tag(&mut self, name: &str, closing: bool, self_closing: bool) {
        if let Some(skipped) = &self.skip {
            if closing && skipped == name {
                self.skip = None;
            }
            return;
        }

        match name {
            _ if SKIPPED.contains(&name) => {
                if !closing && !self_closing {
                    self.skip = Some(name.to_string());
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                if !closing {
                    self.pending = Pending::Heading(name[1..].parse().unwrap_or(1));
                }
            }
            "li" => {
                self.flush();
                if !closing {
                    self.pending = Pending::ListItem;
                }
            }
            "br" => self.flush(),
            "hr" => {
                self.flush();
                if !self.in_cell {
                    self.blocks.push(Block::Rule);
                }
            }
            "b" | "strong" => adjust(&mut self.bold, closing),
            "i" | "em" => adjust(&mut self.italic, closing),
            "table" => {
                self.flush();
                self.finish_table();
                if !closing {
                    self.table = Some(Vec::new());
                }
            }
            "tr" => {
                self.finish_row();
                if !closing {
                    self.row = Some(Vec::new());
                }
            }
            "td" | "th" => {
                self.finish_cell();
                if name == "th" {
                    adjust(&mut self.bold, closing);
                }
                if !closing {
                    self.flush();
                    self.in_cell = true;
                }
            }
            _ if CONTAINERS.contains(&name) => self.flush(),
            _ => {}
        }
    }

    /// Ends the current line. Inside a table cell the line only becomes a space.
    fn flush(&mut self) {
        if self.in_cell {
            self.space = true;
            return;
        }
        let spans = mem::take(&mut self.spans);
        let pending = mem::take(&mut self.pending);
        self.space = false;
        if spans.is_empty() {
            return;
        }
        self.blocks.push(match pending {
            Pending::Paragraph => Block::Paragraph(spans),
            Pending::Heading(level) => Block::Heading { level, spans },
            Pending::ListItem => Block::ListItem(spans),
        });
    }

    fn finish_cell(&mut self) {
        if !self.in_cell {
            return;
        }
        self.in_cell = false;
        self.space = false;
        let spans = mem::take(&mut self.spans);
        self.row.get_or_insert_with(Vec::new).push(spans);
    }

    fn finish_row(&mut self) {
        self.finish_cell();
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.table.get_or_insert_with(Vec::new).push(row);
            }
        }
    }

    fn finish_table(&mut self) {
        self.finish_row();
        if let Some(rows) = self.table.take() {
            if !rows.is_empty() {
                self.blocks.push(Block::Table(rows));
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.finish_table();
        self.flush();
        self.blocks
    }
}

fn adjust(depth: &mut usize, closing: bool) {
    if closing {
        *depth = depth.saturating_sub(1);
    } else {
        *depth += 1;
    }
}

/// Decodes numeric and common named character references.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    entity_regex().replace_all(text, |caps: &Captures| {
        let name = &caps[1];
        let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = name.strip_prefix('#') {
            dec.parse().ok().and_then(char::from_u32)
        } else {
            named_entity(name)
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "euro" => '€',
        "ndash" => '–',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Span {
        Span {
            text: text.to_string(),
            bold: false,
            italic: false,
        }
    }

    #[test]
    fn drops_head_and_style() {
        let blocks = parse(
            "<!DOCTYPE html><html><head><title>Invoice</title><style>h1 { color: red; }</style></head>\
             <body><h1>INVOICE</h1><p>Thanks</p></body></html>",
        );
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    spans: vec![plain("INVOICE")]
                },
                Block::Paragraph(vec![plain("Thanks")]),
            ]
        );
    }

    #[test]
    fn keeps_inline_styles_and_collapses_whitespace() {
        let blocks = parse("<p>Total:\n   <strong>1500.00</strong> <em>CZK</em></p>");
        assert_eq!(
            blocks,
            vec![Block::Paragraph(vec![
                plain("Total:"),
                Span {
                    text: " 1500.00".to_string(),
                    bold: true,
                    italic: false
                },
                Span {
                    text: " CZK".to_string(),
                    bold: false,
                    italic: true
                },
            ])]
        );
    }

    #[test]
    fn escaped_markup_stays_text() {
        let blocks = parse("<p>&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt; &amp; co</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "<script>alert('x')</script> & co");
    }

    #[test]
    fn collects_table_rows_and_cells() {
        let blocks = parse(
            "<table><thead><tr><th>Item</th><th>Amount</th></tr></thead>\
             <tbody><tr><td>Consulting</td><td>1500.00</td></tr></tbody></table><p>after</p>",
        );
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows[0][0][0].bold);
                assert_eq!(rows[1][1], vec![plain("1500.00")]);
            }
            other => panic!("expected a table, got {:?}", other),
        }
        assert_eq!(blocks[1].text(), "after");
    }

    #[test]
    fn line_breaks_and_list_items() {
        let blocks = parse("<div>Line one<br/>Line two</div><ul><li>first</li><li>second</li></ul><hr>");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![plain("Line one")]),
                Block::Paragraph(vec![plain("Line two")]),
                Block::ListItem(vec![plain("first")]),
                Block::ListItem(vec![plain("second")]),
                Block::Rule,
            ]
        );
    }

    #[test]
    fn tolerates_unclosed_markup() {
        let blocks = parse("<invalid>not a proper html document");
        assert_eq!(blocks, vec![Block::Paragraph(vec![plain("not a proper html document")])]);
    }

    #[test]
    fn unknown_entities_are_left_alone() {
        assert_eq!(decode_entities("a &bogus; b &#65;"), "a &bogus; b A");
    }
}
