//! Markup well-formedness check.
//!
//! The markup is lexed by the html5ever tokenizer; this module keeps a stack
//! of open elements on top of its token stream. Nothing is repaired: every
//! unbalanced tag is reported with its position so the caller can hand the
//! list straight back to the client.

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use serde::Serialize;

/// Elements that never take an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr", "basefont", "bgsound", "frame", "keygen", "spacer", "isindex",
];

const SNIPPET_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HtmlParseErrorCode {
    TagNotClosed,
    TagNotOpened,
    EndTagNotRequired,
    UnterminatedTag,
    UnterminatedComment,
}

/// A single problem found in the markup.
///
/// `line` and `line_position` are 1-based; `stream_position` is the byte
/// offset of the construct that caused the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlParseError {
    pub code: HtmlParseErrorCode,
    pub line: usize,
    pub line_position: usize,
    pub stream_position: usize,
    pub source_text: String,
    pub reason: String,
}

/// Check `markup`; an empty result means it is well-formed.
pub fn validate(markup: &str) -> Vec<HtmlParseError> {
    let opts = TokenizerOpts { exact_errors: true, ..TokenizerOpts::default() };
    let mut tokenizer = Tokenizer::new(Validator::new(markup), opts);
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));
    // the sink never asks the tokenizer to pause for scripts
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.errors
}

/// Content model a start tag switches the tokenizer into.
fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" => Some(RawKind::Rawtext),
        "textarea" | "title" => Some(RawKind::Rcdata),
        _ => None,
    }
}

struct OpenElement {
    name: String,
    offset: usize,
    source: String,
}

/// Token sink tracking open elements. The tokenizer only reports line
/// numbers, so byte offsets are recovered by scanning `lower` forward from
/// `cursor`, which always sits past the last construct already located.
struct Validator<'a> {
    src: &'a str,
    lower: String,
    cursor: usize,
    open: Vec<OpenElement>,
    errors: Vec<HtmlParseError>,
}

impl<'a> TokenSink for Validator<'a> {
    type Handle = ();

    fn process_token(&mut self, token: Token, line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.start_tag(&tag, line),
                TagKind::EndTag => self.end_tag(&tag, line),
            },
            Token::CommentToken(_) | Token::DoctypeToken(_) => self.skip_declaration(),
            Token::ParseError(msg) => self.parse_error(&msg),
            Token::EOFToken => {
                for el in std::mem::take(&mut self.open) {
                    self.unclosed(&el);
                }
            }
            Token::CharacterTokens(_) | Token::NullCharacterToken => {}
        }
        TokenSinkResult::Continue
    }
}

impl<'a> Validator<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, lower: src.to_ascii_lowercase(), cursor: 0, open: Vec::new(), errors: Vec::new() }
    }

    fn start_tag(&mut self, tag: &Tag, line: u64) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let offset = self.locate_tag("<", &name, line);
        let source = self.src[offset..self.cursor].to_string();

        if tag.self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return TokenSinkResult::Continue;
        }
        let raw = raw_kind(&name);
        self.open.push(OpenElement { name, offset, source });
        match raw {
            Some(kind) => TokenSinkResult::RawData(kind),
            None => TokenSinkResult::Continue,
        }
    }

    fn end_tag(&mut self, tag: &Tag, line: u64) {
        let name = tag.name.to_string();
        let offset = self.locate_tag("</", &name, line);
        let source = self.src[offset..self.cursor].to_string();

        if VOID_ELEMENTS.contains(&name.as_str()) {
            self.error(
                HtmlParseErrorCode::EndTagNotRequired,
                offset,
                source,
                format!("End tag </{name}> is not required"),
            );
            return;
        }

        match self.open.iter().rposition(|el| el.name == name) {
            Some(idx) => {
                let unclosed = self.open.split_off(idx + 1);
                self.open.pop();
                for el in &unclosed {
                    self.unclosed(el);
                }
            }
            None => self.error(
                HtmlParseErrorCode::TagNotOpened,
                offset,
                source,
                format!("Start tag <{name}> was not found"),
            ),
        }
    }

    /// Only running out of input inside a construct matters here; the
    /// tokenizer's recoverable complaints (stray `<`, duplicate attributes)
    /// do not make the markup unbalanced.
    fn parse_error(&mut self, msg: &str) {
        // exact messages read "Saw EOF in state <State>"
        if !msg.contains("EOF") || msg.contains("TagOpen") || msg.contains("RawData") {
            return;
        }
        if msg.contains("Comment") {
            let offset = self.find_from_cursor(|rest| rest.starts_with("<!--"));
            self.error(
                HtmlParseErrorCode::UnterminatedComment,
                offset,
                snippet(&self.src[offset..]),
                "Comment is not closed with -->".into(),
            );
        } else if msg.contains("Doctype") {
            let offset = self.find_from_cursor(|rest| rest.starts_with("<!"));
            self.error(
                HtmlParseErrorCode::UnterminatedTag,
                offset,
                snippet(&self.src[offset..]),
                "Declaration is not closed with >".into(),
            );
        } else {
            let offset = self.find_from_cursor(starts_tag);
            let text = snippet(&self.src[offset..]);
            self.error(HtmlParseErrorCode::UnterminatedTag, offset, text.clone(), format!("Tag {text} is not terminated with >"));
        }
        self.cursor = self.src.len();
    }

    /// Offset of the `<` opening the tag `name`, moving the cursor past the
    /// tag's closing `>`. Falls back to the start of the reported line.
    fn locate_tag(&mut self, prefix: &str, name: &str, line: u64) -> usize {
        let needle = format!("{prefix}{name}");
        let mut from = self.cursor;
        while let Some(rel) = self.lower[from..].find(&needle) {
            let at = from + rel;
            let next = self.lower.as_bytes().get(at + needle.len()).copied();
            if matches!(next, None | Some(b'/') | Some(b'>')) || next.is_some_and(|b| b.is_ascii_whitespace()) {
                self.cursor = tag_extent(self.src, at + needle.len());
                return at;
            }
            from = at + needle.len();
        }
        line_start(self.src, line)
    }

    /// Move the cursor past the next comment, doctype or processing
    /// instruction.
    fn skip_declaration(&mut self) {
        let at = self.find_from_cursor(|rest| {
            rest.starts_with("<!")
                || rest.starts_with("<?")
                || (rest.starts_with("</") && !rest[2..].starts_with(|c: char| c.is_ascii_alphabetic()))
        });
        let rest = &self.src[at..];
        let len = if rest.starts_with("<!-->") {
            5
        } else if rest.starts_with("<!--->") {
            6
        } else if rest.starts_with("<!--") {
            rest[4..].find("-->").map_or(rest.len(), |end| 4 + end + 3)
        } else {
            rest.find('>').map_or(rest.len(), |end| end + 1)
        };
        self.cursor = at + len;
    }

    fn find_from_cursor(&self, pred: impl Fn(&str) -> bool) -> usize {
        let mut from = self.cursor;
        while let Some(rel) = self.src[from..].find('<') {
            let at = from + rel;
            if pred(&self.src[at..]) {
                return at;
            }
            from = at + 1;
        }
        self.cursor.min(self.src.len())
    }

    fn unclosed(&mut self, el: &OpenElement) {
        self.error(
            HtmlParseErrorCode::TagNotClosed,
            el.offset,
            el.source.clone(),
            format!("End tag </{}> was not found", el.name),
        );
    }

    fn error(&mut self, code: HtmlParseErrorCode, offset: usize, source_text: String, reason: String) {
        let (line, line_position) = location(self.src, offset);
        self.errors.push(HtmlParseError {
            code,
            line,
            line_position,
            stream_position: offset,
            source_text,
            reason,
        });
    }
}

/// `<` followed by a tag name, optionally after `/`.
fn starts_tag(rest: &str) -> bool {
    let name = rest.strip_prefix("</").or_else(|| rest.strip_prefix('<')).unwrap_or_default();
    name.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Offset just past the `>` ending the tag whose attributes start at `from`.
/// A quote only opens a value directly after `=`.
fn tag_extent(src: &str, from: usize) -> usize {
    let bytes = src.as_bytes();
    let mut quote: Option<u8> = None;
    let mut after_eq = false;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'>' => return i + 1,
            b'"' | b'\'' if after_eq => {
                quote = Some(b);
                after_eq = false;
            }
            b'=' => after_eq = true,
            _ if b.is_ascii_whitespace() => continue,
            _ => after_eq = false,
        }
    }
    src.len()
}

fn line_start(src: &str, line: u64) -> usize {
    if line <= 1 {
        return 0;
    }
    src.match_indices('\n')
        .nth((line - 2) as usize)
        .map_or(src.len(), |(i, _)| i + 1)
}

fn location(src: &str, offset: usize) -> (usize, usize) {
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

fn snippet(s: &str) -> String {
    s.chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(markup: &str) -> Vec<HtmlParseErrorCode> {
        validate(markup).into_iter().map(|e| e.code).collect()
    }

    #[test]
    fn balanced_markup_is_valid() {
        assert!(validate("<div></div>").is_empty());
        assert!(validate("<p></p>").is_empty());
        assert!(validate("<div class=\"a\"><span>hi</span> there</div>").is_empty());
        assert!(validate("").is_empty());
        assert!(validate("plain text").is_empty());
    }

    #[test]
    fn unclosed_div_is_reported() {
        let errors = validate("<div>div>");
        assert_eq!(errors.len(), 1);
        let e = &errors[0];
        assert_eq!(e.code, HtmlParseErrorCode::TagNotClosed);
        assert_eq!((e.line, e.line_position, e.stream_position), (1, 1, 0));
        assert_eq!(e.source_text, "<div>");
        assert_eq!(e.reason, "End tag </div> was not found");
    }

    #[test]
    fn void_and_self_closing_elements_need_no_end_tag() {
        assert!(validate("<div><img src=\"a.png\"><br><hr/></div>").is_empty());
        assert!(validate("<div/>").is_empty());
        assert!(validate("<INPUT type=text>").is_empty());
    }

    #[test]
    fn end_tag_for_void_element() {
        assert_eq!(codes("<p>a<br></br></p>"), vec![HtmlParseErrorCode::EndTagNotRequired]);
    }

    #[test]
    fn names_compare_case_insensitively() {
        assert!(validate("<DIV><Span></SPAN></div>").is_empty());
    }

    #[test]
    fn quoted_attribute_may_contain_gt() {
        assert!(validate("<a title=\"a > b\" href='x>y'>link</a>").is_empty());
    }

    #[test]
    fn apostrophe_in_unquoted_value_does_not_open_quote() {
        assert!(validate("<div data-x=it's>x</div>").is_empty());
    }

    #[test]
    fn comments_and_declarations_are_skipped() {
        assert!(validate("<!DOCTYPE html><!-- <div> --><p>x</p><?xml-stylesheet href=\"a\"?>").is_empty());
    }

    #[test]
    fn raw_text_content_is_not_parsed() {
        assert!(validate("<script>if (a < b) { s = \"<div>\"; }</script>").is_empty());
        assert!(validate("<STYLE>p > a { color: red }</style >").is_empty());
        assert_eq!(codes("<script>var a = 1;"), vec![HtmlParseErrorCode::TagNotClosed]);
    }

    #[test]
    fn stray_end_tag_is_not_opened() {
        let errors = validate("<div></span></div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseErrorCode::TagNotOpened);
        assert_eq!(errors[0].stream_position, 5);
        assert_eq!(errors[0].source_text, "</span>");
    }

    #[test]
    fn mismatched_end_tag_reports_inner_element() {
        let errors = validate("<div><span></div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseErrorCode::TagNotClosed);
        assert_eq!(errors[0].source_text, "<span>");
    }

    #[test]
    fn every_open_element_is_reported_in_document_order() {
        let errors = validate("<section><div><p>");
        let sources: Vec<_> = errors.iter().map(|e| e.source_text.as_str()).collect();
        assert_eq!(sources, vec!["<section>", "<div>", "<p>"]);
    }

    #[test]
    fn unterminated_constructs() {
        assert_eq!(codes("<div"), vec![HtmlParseErrorCode::UnterminatedTag]);
        assert_eq!(codes("<p>x</p"), vec![HtmlParseErrorCode::UnterminatedTag, HtmlParseErrorCode::TagNotClosed]);
        assert_eq!(codes("<!-- never ends"), vec![HtmlParseErrorCode::UnterminatedComment]);
    }

    #[test]
    fn unquoted_value_may_end_in_slash() {
        // `a/` is the attribute value, so the div stays open
        let errors = validate("<div title=a/>x");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, HtmlParseErrorCode::TagNotClosed);
        assert_eq!(errors[0].source_text, "<div title=a/>");
    }

    #[test]
    fn abruptly_closed_comments_are_complete() {
        assert!(validate("<!--><p></p>").is_empty());
        assert!(validate("<!---><p></p>").is_empty());
        assert!(validate("<p><!----></p>").is_empty());
    }

    #[test]
    fn tags_after_comments_are_located() {
        let errors = validate("<!-- <span> --><p>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].stream_position, 15);
        assert_eq!(errors[0].source_text, "<p>");
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        assert!(validate("<p>1 < 2 and 3 <= 4</p>").is_empty());
        assert!(validate("a </ b").is_empty());
    }

    #[test]
    fn location_counts_lines_and_columns() {
        let errors = validate("<div>\n  <span>\n</div>");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert_eq!(errors[0].line_position, 3);
        assert_eq!(errors[0].stream_position, 8);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let errors = validate("<div>");
        let json = serde_json::to_value(&errors[0]).unwrap();
        assert_eq!(json["code"], "TagNotClosed");
        assert_eq!(json["linePosition"], 1);
        assert_eq!(json["streamPosition"], 0);
        assert_eq!(json["sourceText"], "<div>");
    }

    #[test]
    fn validation_is_deterministic() {
        let markup = "<div><p>a</div><span>";
        assert_eq!(validate(markup), validate(markup));
    }
}
