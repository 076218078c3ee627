//! Non-validating markup scanner.
//!
//! Callback-driven: instead of buffering tokens, [`Scanner::scan`] calls
//! the supplied closure for every [`Event`] as soon as it is recognized.
//! The closure returns `Result`, so a consumer (normally the tree builder)
//! can stop the scan at the first error it detects.
//!
//! Supported markup: elements with attributes, self-closing tags, closing
//! tags, character data, CDATA sections, comments, and `<?...?>` / `<!...>`
//! declarations (skipped). Entities are not expanded; text is passed
//! through verbatim.

use memchr::{memchr, memmem};
use unicode_xid::UnicodeXID;

use crate::error::{ParseError, Result, ScanErrorCode};
use crate::event::{Event, RawAttribute};
use crate::span::Span;

const BOM: char = '\u{feff}';

pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Scan the whole input, calling `on_event` for each event.
    pub fn scan<F>(mut self, mut on_event: F) -> Result<()>
    where
        F: FnMut(Event<'a>) -> Result<()>,
    {
        let text = std::str::from_utf8(self.input).map_err(|e| {
            ParseError::scan(ScanErrorCode::InvalidUtf8, Span::point(e.valid_up_to()))
        })?;
        if text.starts_with(BOM) {
            self.pos = BOM.len_utf8();
        }

        while self.pos < self.input.len() {
            match memchr(b'<', &self.input[self.pos..]) {
                None => {
                    let end = self.input.len();
                    self.text_run(text, self.pos, end, &mut on_event)?;
                    self.pos = end;
                }
                Some(offset) => {
                    let lt = self.pos + offset;
                    self.text_run(text, self.pos, lt, &mut on_event)?;
                    self.pos = lt;
                    self.markup(text, &mut on_event)?;
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.peek() {
            self.pos += 1;
        }
    }

    /// Emit `input[start..end]` as text unless it is only whitespace.
    fn text_run<F>(&self, text: &'a str, start: usize, end: usize, on_event: &mut F) -> Result<()>
    where
        F: FnMut(Event<'a>) -> Result<()>,
    {
        let raw = &text[start..end];
        let trimmed = raw.trim_start();
        let lead = raw.len() - trimmed.len();
        let content = trimmed.trim_end();
        if content.is_empty() {
            return Ok(());
        }
        let span = Span::new(start + lead, start + lead + content.len());
        emit(on_event, Event::Text { content, span })
    }

    /// Dispatch on what follows `<` at `self.pos`.
    fn markup<F>(&mut self, text: &'a str, on_event: &mut F) -> Result<()>
    where
        F: FnMut(Event<'a>) -> Result<()>,
    {
        let start = self.pos;
        let rest = self.rest();

        if rest.starts_with(b"<!--") {
            let body = start + 4;
            let close = memmem::find(&self.input[body..], b"-->").ok_or_else(|| {
                ParseError::scan(ScanErrorCode::UnclosedComment, Span::new(start, self.input.len()))
            })?;
            self.pos = body + close + 3;
            let content = text[body..body + close].trim();
            return emit(on_event, Event::Comment { content, span: Span::new(start, self.pos) });
        }

        if rest.starts_with(b"<![CDATA[") {
            let body = start + 9;
            let close = memmem::find(&self.input[body..], b"]]>").ok_or_else(|| {
                ParseError::scan(ScanErrorCode::UnclosedCdata, Span::new(start, self.input.len()))
            })?;
            self.pos = body + close + 3;
            return self.text_run(text, body, body + close, on_event);
        }

        if rest.starts_with(b"<?") {
            let close = memmem::find(&self.input[start + 2..], b"?>").ok_or_else(|| {
                ParseError::scan(
                    ScanErrorCode::UnclosedDeclaration,
                    Span::new(start, self.input.len()),
                )
            })?;
            self.pos = start + 2 + close + 2;
            return Ok(());
        }

        if rest.starts_with(b"<!") {
            let close = memchr(b'>', &self.input[start + 2..]).ok_or_else(|| {
                ParseError::scan(
                    ScanErrorCode::UnclosedDeclaration,
                    Span::new(start, self.input.len()),
                )
            })?;
            self.pos = start + 2 + close + 1;
            return Ok(());
        }

        if rest.starts_with(b"</") {
            self.pos += 2;
            let name = self.name(text)?;
            self.skip_ws();
            self.expect_gt(start)?;
            return emit(on_event, Event::Close { name, span: Span::new(start, self.pos) });
        }

        self.pos += 1;
        let name = self.name(text)?;
        let mut attributes = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    let span = Span::new(start, self.pos);
                    return emit(on_event, Event::Open { name, attributes, span });
                }
                Some(b'/') => {
                    self.pos += 1;
                    self.expect_gt(start)?;
                    let span = Span::new(start, self.pos);
                    return emit(on_event, Event::SelfClosed { name, attributes, span });
                }
                Some(_) => attributes.push(self.attribute(text, start)?),
                None => {
                    return Err(ParseError::scan(
                        ScanErrorCode::UnclosedTag,
                        Span::new(start, self.input.len()),
                    ))
                }
            }
        }
    }

    fn expect_gt(&mut self, tag_start: usize) -> Result<()> {
        match self.peek() {
            Some(b'>') => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(ParseError::scan(ScanErrorCode::UnexpectedByte, Span::point(self.pos))),
            None => Err(ParseError::scan(
                ScanErrorCode::UnclosedTag,
                Span::new(tag_start, self.input.len()),
            )),
        }
    }

    /// Scan a tag name or attribute key.
    fn name(&mut self, text: &'a str) -> Result<&'a str> {
        let start = self.pos;
        let mut chars = text[start..].char_indices();
        let valid_start = matches!(chars.next(), Some((_, c)) if is_name_start(c));
        if !valid_start {
            let code = if start >= self.input.len() {
                ScanErrorCode::UnclosedTag
            } else {
                ScanErrorCode::InvalidName
            };
            return Err(ParseError::scan(code, Span::point(start)));
        }
        let len = chars
            .find(|&(_, c)| !is_name_continue(c))
            .map_or(text.len() - start, |(i, _)| i);
        self.pos = start + len;
        Ok(&text[start..self.pos])
    }

    /// Scan `key=value`, keeping the value's quotes.
    fn attribute(&mut self, text: &'a str, tag_start: usize) -> Result<RawAttribute<'a>> {
        let start = self.pos;
        let key = self.name(text)?;
        self.skip_ws();
        match self.peek() {
            Some(b'=') => self.pos += 1,
            Some(_) => {
                return Err(ParseError::scan(ScanErrorCode::ExpectedEquals, Span::point(self.pos)))
            }
            None => {
                return Err(ParseError::scan(
                    ScanErrorCode::UnclosedTag,
                    Span::new(tag_start, self.input.len()),
                ))
            }
        }
        self.skip_ws();

        let value_start = self.pos;
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let close = memchr(quote, &self.input[value_start + 1..]).ok_or_else(|| {
                    ParseError::scan(
                        ScanErrorCode::UnclosedQuote,
                        Span::new(value_start, self.input.len()),
                    )
                })?;
                self.pos = value_start + 1 + close + 1;
            }
            None => {
                return Err(ParseError::scan(
                    ScanErrorCode::UnclosedTag,
                    Span::new(tag_start, self.input.len()),
                ))
            }
            Some(_) => {
                // Unquoted: runs to whitespace, `>` or `/>`.
                let mut end = value_start;
                while let Some(&b) = self.input.get(end) {
                    match b {
                        b' ' | b'\t' | b'\r' | b'\n' | b'>' => break,
                        b'/' if self.input.get(end + 1) == Some(&b'>') => break,
                        _ => end += 1,
                    }
                }
                if end == value_start {
                    return Err(ParseError::scan(ScanErrorCode::ExpectedValue, Span::point(end)));
                }
                self.pos = end;
            }
        }

        Ok(RawAttribute {
            key,
            value: &text[value_start..self.pos],
            span: Span::new(start, self.pos),
        })
    }
}

#[inline]
fn emit<'a, F>(on_event: &mut F, event: Event<'a>) -> Result<()>
where
    F: FnMut(Event<'a>) -> Result<()>,
{
    tracing::trace!(name = ?event.name(), span = %event.span(), "scan");
    on_event(event)
}

fn is_name_start(c: char) -> bool {
    c == '_' || c == ':' || c.is_xid_start()
}

fn is_name_continue(c: char) -> bool {
    c == '-' || c == '.' || c == ':' || c.is_xid_continue()
}

/// Scan `input` and collect every event.
pub fn scan_events(input: &[u8]) -> Result<Vec<Event<'_>>> {
    let mut events = Vec::new();
    Scanner::new(input).scan(|event| {
        events.push(event);
        Ok(())
    })?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(input: &str) -> Vec<String> {
        scan_events(input.as_bytes())
            .unwrap()
            .iter()
            .map(|e| match e {
                Event::Open { name, .. } => format!("<{}>", name),
                Event::SelfClosed { name, .. } => format!("<{}/>", name),
                Event::Close { name, .. } => format!("</{}>", name),
                Event::Text { content, .. } => format!("{:?}", content),
                Event::Comment { content, .. } => format!("#{}", content),
            })
            .collect()
    }

    fn scan_error(input: &str) -> ScanErrorCode {
        match scan_events(input.as_bytes()) {
            Err(ParseError::Scan { code, .. }) => code,
            other => panic!("expected scan error, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            names("<Point><coordinates>10,20</coordinates></Point>"),
            vec!["<Point>", "<coordinates>", "\"10,20\"", "</coordinates>", "</Point>"]
        );
    }

    #[test]
    fn test_whitespace_text_skipped() {
        assert_eq!(
            names("<a>\n  <b/>\n</a>\n"),
            vec!["<a>", "<b/>", "</a>"]
        );
    }

    #[test]
    fn test_text_is_trimmed_with_span() {
        let events = scan_events(b"<c>  1,2 3,4\n</c>").unwrap();
        assert_eq!(
            events[1],
            Event::Text { content: "1,2 3,4", span: Span::new(5, 12) }
        );
    }

    #[test]
    fn test_attributes_keep_quotes() {
        let events = scan_events(br#"<Point id="p1" name='x' n=3 flag = "a b"/>"#).unwrap();
        let Event::SelfClosed { name, attributes, .. } = &events[0] else {
            panic!("expected self-closed, got {:?}", events[0]);
        };
        assert_eq!(*name, "Point");
        let pairs: Vec<_> = attributes.iter().map(|a| (a.key, a.value)).collect();
        assert_eq!(
            pairs,
            vec![("id", "\"p1\""), ("name", "'x'"), ("n", "3"), ("flag", "\"a b\"")]
        );
    }

    #[test]
    fn test_unquoted_value_before_self_close() {
        let events = scan_events(b"<a k=v/>").unwrap();
        let Event::SelfClosed { attributes, .. } = &events[0] else {
            panic!("expected self-closed");
        };
        assert_eq!(attributes[0].value, "v");
    }

    #[test]
    fn test_declarations_and_comments() {
        let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE kml>\n<!-- note -->\n<Point/>";
        assert_eq!(names(input), vec!["#note", "<Point/>"]);
    }

    #[test]
    fn test_cdata_is_text() {
        assert_eq!(
            names("<c><![CDATA[ 1,2 <x> ]]></c>"),
            vec!["<c>", "\"1,2 <x>\"", "</c>"]
        );
    }

    #[test]
    fn test_namespaced_and_unicode_names() {
        assert_eq!(names("<kml:Point/>"), vec!["<kml:Point/>"]);
        assert_eq!(names("<épaisseur/>"), vec!["<épaisseur/>"]);
    }

    #[test]
    fn test_scan_errors() {
        assert_eq!(scan_error("<Point"), ScanErrorCode::UnclosedTag);
        assert_eq!(scan_error("<Point id=\"x>"), ScanErrorCode::UnclosedQuote);
        assert_eq!(scan_error("<!-- never"), ScanErrorCode::UnclosedComment);
        assert_eq!(scan_error("<![CDATA[ x"), ScanErrorCode::UnclosedCdata);
        assert_eq!(scan_error("<?xml "), ScanErrorCode::UnclosedDeclaration);
        assert_eq!(scan_error("<1abc>"), ScanErrorCode::InvalidName);
        assert_eq!(scan_error("<a b>"), ScanErrorCode::ExpectedEquals);
        assert_eq!(scan_error("<a b=>"), ScanErrorCode::ExpectedValue);
        assert_eq!(scan_error("</a b>"), ScanErrorCode::UnexpectedByte);
        assert_eq!(scan_error("<a/ >"), ScanErrorCode::UnexpectedByte);
    }

    #[test]
    fn test_leading_bom() {
        let events = scan_events("\u{feff}<Point/>".as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].span(), Span::new(3, 11));

        // Only at the start of the input.
        let events = scan_events("<a>\u{feff}</a>".as_bytes()).unwrap();
        assert!(matches!(events[1], Event::Text { content: "\u{feff}", .. }));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = scan_events(b"<a>\xff</a>").unwrap_err();
        assert_eq!(
            err,
            ParseError::Scan { code: ScanErrorCode::InvalidUtf8, span: Span::point(3) }
        );
    }

    #[test]
    fn test_callback_error_stops_scan() {
        let mut seen = 0;
        let result = Scanner::new(b"<a><b/><c/></a>").scan(|_| {
            seen += 1;
            if seen == 2 {
                Err(ParseError::scan(ScanErrorCode::UnexpectedByte, Span::point(0)))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(seen, 2);
    }
}
