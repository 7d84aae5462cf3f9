//! Structured text from the CMS
//!
//! Rich text arrives as a list of blocks, each with its text and a list of
//! inline spans addressed by UTF-16 offsets. It is converted two ways:
//! to plain text for word counting and to HTML for display. The HTML side is
//! the trust boundary for CMS content: every character is escaped and only a
//! small allow-list of URL schemes is ever emitted into attributes.

use serde::{Deserialize, Serialize};

use crate::helpers::{html_escape, push_escaped};

/// Block type tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    fn heading_level(self) -> Option<u8> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            BlockKind::Heading4 => Some(4),
            BlockKind::Heading5 => Some(5),
            BlockKind::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Whether the block carries text (as opposed to media)
    fn is_textual(self) -> bool {
        !matches!(self, BlockKind::Image | BlockKind::Embed | BlockKind::Unknown)
    }
}

/// One rich-text block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
    pub spans: Vec<Span>,
    /// Image source (image blocks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    /// A plain paragraph without spans
    pub fn paragraph(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: BlockKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "hyperlink")]
    Hyperlink,
    #[serde(rename = "label")]
    Label,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Inline formatting over `[start, end)` character offsets of the block text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

impl Span {
    pub fn new(kind: SpanKind, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            kind,
            data: None,
        }
    }

    /// A web hyperlink span
    pub fn link(start: usize, end: usize, url: &str) -> Self {
        Self {
            start,
            end,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                link_type: Some("Web".to_string()),
                url: Some(url.to_string()),
                ..Default::default()
            }),
        }
    }
}

/// Hyperlink target or label name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub link_type: Option<String>,
    pub url: Option<String>,
    pub target: Option<String>,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub document_type: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Embed {
    pub embed_url: Option<String>,
    #[serde(rename = "type")]
    pub embed_type: Option<String>,
    pub provider_name: Option<String>,
    pub title: Option<String>,
    /// Provider markup; never emitted
    pub html: Option<String>,
}

/// Plain text of the blocks, text-bearing blocks joined by a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.kind.is_textual())
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render blocks to sanitized HTML
///
/// `root` is the site root used to resolve links to other documents, which
/// land on `{root}post/{uid}`.
pub fn as_html(blocks: &[RichTextBlock], root: &str) -> String {
    let mut html = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in blocks {
        let list_kind = match block.kind {
            BlockKind::ListItem | BlockKind::OrderedListItem => Some(block.kind),
            _ => None,
        };

        if open_list != list_kind {
            if let Some(kind) = open_list {
                html.push_str(list_close(kind));
            }
            if let Some(kind) = list_kind {
                html.push_str(list_open(kind));
            }
            open_list = list_kind;
        }

        render_block(block, root, &mut html);
    }

    if let Some(kind) = open_list {
        html.push_str(list_close(kind));
    }

    html
}

fn list_open(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OrderedListItem {
        "<ol>"
    } else {
        "<ul>"
    }
}

fn list_close(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OrderedListItem {
        "</ol>"
    } else {
        "</ul>"
    }
}

fn render_block(block: &RichTextBlock, root: &str, html: &mut String) {
    if let Some(level) = block.kind.heading_level() {
        html.push_str(&format!(
            "<h{level}>{}</h{level}>",
            render_spans(&block.text, &block.spans, root)
        ));
        return;
    }

    match block.kind {
        BlockKind::Paragraph => {
            html.push_str("<p>");
            html.push_str(&render_spans(&block.text, &block.spans, root));
            html.push_str("</p>");
        }
        BlockKind::Preformatted => {
            html.push_str("<pre>");
            html.push_str(&html_escape(&block.text));
            html.push_str("</pre>");
        }
        BlockKind::ListItem | BlockKind::OrderedListItem => {
            html.push_str("<li>");
            html.push_str(&render_spans(&block.text, &block.spans, root));
            html.push_str("</li>");
        }
        BlockKind::Image => {
            if let Some(src) = block.url.as_deref().filter(|u| is_safe_url(u)) {
                html.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    html_escape(src),
                    html_escape(block.alt.as_deref().unwrap_or(""))
                ));
            }
        }
        BlockKind::Embed => {
            let Some(embed) = &block.oembed else { return };
            if let Some(url) = embed.embed_url.as_deref().filter(|u| is_safe_url(u)) {
                let label = embed
                    .title
                    .as_deref()
                    .or(embed.provider_name.as_deref())
                    .unwrap_or(url);
                html.push_str(&format!(
                    r#"<div class="embed" data-oembed="{}" data-oembed-type="{}"><a href="{}" target="_blank" rel="noopener">{}</a></div>"#,
                    html_escape(url),
                    html_escape(embed.embed_type.as_deref().unwrap_or("")),
                    html_escape(url),
                    html_escape(label)
                ));
            }
        }
        _ => {
            tracing::debug!("Skipping rich-text block of unknown type");
        }
    }
}

/// Render text with its spans applied
///
/// Span offsets count UTF-16 code units. Spans may nest or overlap.
/// Overlapping spans are split: when a span ends while others opened after
/// it are still active, those are closed and reopened so the output stays
/// well formed. An offset falling inside a surrogate pair applies at the
/// next character boundary.
fn render_spans(text: &str, spans: &[Span], root: &str) -> String {
    let mut pending: Vec<&Span> = spans.iter().filter(|s| s.end > s.start).collect();
    pending.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    let mut pending = pending.into_iter().peekable();

    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<(&Span, Option<String>)> = Vec::new();
    let mut chars = text.chars();
    let mut pos = 0;

    loop {
        close_ended(&mut out, &mut stack, pos);

        while let Some(span) = pending.next_if(|s| s.start <= pos) {
            if span.end <= pos {
                continue;
            }
            let open = open_tag(span, root);
            if let Some(tag) = &open {
                out.push_str(tag);
            }
            stack.push((span, open));
        }

        let Some(c) = chars.next() else {
            break;
        };
        match c {
            '\n' => out.push_str("<br />"),
            c => push_escaped(&mut out, c),
        }
        pos += c.len_utf16();
    }

    while let Some((span, open)) = stack.pop() {
        out.push_str(close_tag(span, open.is_some()));
    }

    out
}

/// Close every span ending at or before `pos`, reopening the ones that
/// were opened after it and still continue
fn close_ended<'a>(out: &mut String, stack: &mut Vec<(&'a Span, Option<String>)>, pos: usize) {
    if !stack.iter().any(|(s, _)| s.end <= pos) {
        return;
    }

    let mut reopen = Vec::new();
    while let Some((span, open)) = stack.pop() {
        out.push_str(close_tag(span, open.is_some()));
        if span.end > pos {
            reopen.push((span, open));
        }
        if !stack.iter().any(|(s, _)| s.end <= pos) {
            break;
        }
    }
    for (span, open) in reopen.into_iter().rev() {
        if let Some(tag) = &open {
            out.push_str(tag);
        }
        stack.push((span, open));
    }
}

/// Opening tag for a span, `None` when the span renders as bare text
fn open_tag(span: &Span, root: &str) -> Option<String> {
    match span.kind {
        SpanKind::Strong => Some("<strong>".to_string()),
        SpanKind::Em => Some("<em>".to_string()),
        SpanKind::Label => {
            let label = span.data.as_ref().and_then(|d| d.label.as_deref())?;
            Some(format!(r#"<span class="{}">"#, html_escape(label)))
        }
        SpanKind::Hyperlink => {
            let data = span.data.as_ref()?;
            let href = resolve_link(data, root)?;
            if data.target.as_deref() == Some("_blank") {
                Some(format!(
                    r#"<a href="{}" target="_blank" rel="noopener">"#,
                    html_escape(&href)
                ))
            } else {
                Some(format!(r#"<a href="{}">"#, html_escape(&href)))
            }
        }
        SpanKind::Unknown => None,
    }
}

fn close_tag(span: &Span, opened: bool) -> &'static str {
    if !opened {
        return "";
    }
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Label => "</span>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Unknown => "",
    }
}

fn resolve_link(data: &SpanData, root: &str) -> Option<String> {
    if data.link_type.as_deref() == Some("Document") {
        let uid = data.uid.as_deref()?;
        return Some(format!("{}/post/{}", root.trim_end_matches('/'), uid));
    }
    data.url.clone().filter(|url| is_safe_url(url))
}

/// URLs allowed into `href`/`src` attributes
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if let Some(path) = url.strip_prefix('/') {
        // Browsers read `//` and `/\` as protocol-relative
        return !path.starts_with(['/', '\\']);
    }
    let lower = url.to_ascii_lowercase();
    ["http://", "https://", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
