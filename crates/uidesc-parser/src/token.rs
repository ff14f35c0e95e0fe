//! Token types produced by the [`Scanner`](crate::scanner::Scanner).

use std::fmt;

use crate::span::Span;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<`
    StartTagOpen,
    /// Tag name following `<`.
    StartTag,
    /// `>` closing a start tag.
    StartTagClose,
    /// `/>`
    StartTagSelfClose,
    /// `</`
    EndTagOpen,
    /// Tag name following `</`.
    EndTag,
    /// `>` closing an end tag.
    EndTagClose,
    AttributeName,
    /// `=` between an attribute name and its value.
    DelimiterAssign,
    /// Attribute value, quotes included when present.
    AttributeValue,
    /// Text between tags.
    Content,
    /// `<!--`
    StartCommentTag,
    Comment,
    /// `-->`
    EndCommentTag,
    /// `<?`
    StartDoctypeTag,
    Doctype,
    /// `?>`
    EndDoctypeTag,
    Whitespace,
    /// End of stream. Always an empty span at the text length.
    Eos,
    /// A character the scanner could not classify.
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::StartTagOpen => "`<`",
            TokenKind::StartTag => "tag name",
            TokenKind::StartTagClose => "`>`",
            TokenKind::StartTagSelfClose => "`/>`",
            TokenKind::EndTagOpen => "`</`",
            TokenKind::EndTag => "end tag name",
            TokenKind::EndTagClose => "`>`",
            TokenKind::AttributeName => "attribute name",
            TokenKind::DelimiterAssign => "`=`",
            TokenKind::AttributeValue => "attribute value",
            TokenKind::Content => "content",
            TokenKind::StartCommentTag => "`<!--`",
            TokenKind::Comment => "comment",
            TokenKind::EndCommentTag => "`-->`",
            TokenKind::StartDoctypeTag => "`<?`",
            TokenKind::Doctype => "header",
            TokenKind::EndDoctypeTag => "`?>`",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Eos => "end of input",
            TokenKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A token with its byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn start(&self) -> usize {
        self.span.start()
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }

    /// Source text covered by this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.slice(source)
    }
}
