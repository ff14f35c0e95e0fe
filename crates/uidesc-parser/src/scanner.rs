//! State-machine scanner for the layout markup.
//!
//! The scanner is pull-based: every call to [`Scanner::scan`] yields exactly
//! one [`Token`] and advances the read position, until it reports
//! [`TokenKind::Eos`]. Lexical problems never stop scanning; at most one
//! [`Diagnostic`] is attached to each token and can be taken with
//! [`Scanner::take_diagnostic`] right after the `scan` call that produced it.
//!
//! All offsets are byte offsets and the scanner only ever stops on UTF-8
//! character boundaries.

use log::warn;

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
    token::{Token, TokenKind},
};

/// Lexical state between two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScannerState {
    WithinContent,
    AfterOpeningStartTag,
    WithinTag,
    AfterAttributeName,
    BeforeAttributeValue,
    AfterOpeningEndTag,
    WithinEndTag,
    WithinComment,
    WithinDoctype,
}

/// Pull scanner over one document's text.
#[derive(Debug)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    token_start: usize,
    state: ScannerState,
    diagnostic: Option<Diagnostic>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            token_start: 0,
            state: ScannerState::WithinContent,
            diagnostic: None,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Takes the diagnostic attached to the most recent token, if any.
    pub fn take_diagnostic(&mut self) -> Option<Diagnostic> {
        self.diagnostic.take()
    }

    /// Scans the next token.
    ///
    /// Every token other than [`TokenKind::Eos`] is non-empty. If the state
    /// machine fails to consume input, one character is skipped and reported
    /// as [`TokenKind::Unknown`].
    pub fn scan(&mut self) -> Token {
        self.diagnostic = None;
        let offset = self.pos;
        let kind = self.scan_kind();

        if kind != TokenKind::Eos && self.pos == offset {
            warn!(
                offset = offset,
                state:? = self.state;
                "Scanner did not advance, skipping one character"
            );
            self.bump();
            return Token::new(TokenKind::Unknown, Span::new(offset..self.pos));
        }

        Token::new(kind, Span::new(self.token_start..self.pos))
    }

    fn scan_kind(&mut self) -> TokenKind {
        loop {
            self.token_start = self.pos;
            if self.at_end() {
                return TokenKind::Eos;
            }

            match self.state {
                ScannerState::WithinContent => {
                    if self.eat("<!--") {
                        self.state = ScannerState::WithinComment;
                        return TokenKind::StartCommentTag;
                    }
                    if self.eat("<?") {
                        self.state = ScannerState::WithinDoctype;
                        return TokenKind::StartDoctypeTag;
                    }
                    if self.eat("</") {
                        self.state = ScannerState::AfterOpeningEndTag;
                        return TokenKind::EndTagOpen;
                    }
                    if self.eat("<") {
                        self.state = ScannerState::AfterOpeningStartTag;
                        return TokenKind::StartTagOpen;
                    }
                    self.skip_until("<");
                    return TokenKind::Content;
                }

                ScannerState::WithinComment => {
                    if self.eat("-->") {
                        self.state = ScannerState::WithinContent;
                        return TokenKind::EndCommentTag;
                    }
                    if !self.skip_until("-->") {
                        self.report(
                            Diagnostic::error("unterminated comment")
                                .with_code(ErrorCode::E007)
                                .with_help("close the comment with `-->`"),
                        );
                    }
                    return TokenKind::Comment;
                }

                ScannerState::WithinDoctype => {
                    if self.eat("?>") {
                        self.state = ScannerState::WithinContent;
                        return TokenKind::EndDoctypeTag;
                    }
                    if !self.skip_until("?>") {
                        self.report(
                            Diagnostic::error("unterminated header")
                                .with_code(ErrorCode::E008)
                                .with_help("close the header with `?>`"),
                        );
                    }
                    return TokenKind::Doctype;
                }

                ScannerState::AfterOpeningStartTag => {
                    if self.eat_tag_name() {
                        self.state = ScannerState::WithinTag;
                        return TokenKind::StartTag;
                    }
                    self.state = ScannerState::WithinTag;
                    if self.eat_whitespace() {
                        self.report(
                            Diagnostic::error("tag name must directly follow the open bracket")
                                .with_code(ErrorCode::E001),
                        );
                        return TokenKind::Whitespace;
                    }
                }

                ScannerState::WithinTag => {
                    if self.eat_whitespace() {
                        return TokenKind::Whitespace;
                    }
                    if self.eat("/>") {
                        self.state = ScannerState::WithinContent;
                        return TokenKind::StartTagSelfClose;
                    }
                    if self.eat(">") {
                        self.state = ScannerState::WithinContent;
                        return TokenKind::StartTagClose;
                    }
                    if self.peek() == Some('<') {
                        self.report_closing_bracket_missing();
                        self.state = ScannerState::WithinContent;
                        continue;
                    }
                    if self.eat_while(is_attribute_name_char) {
                        self.state = ScannerState::AfterAttributeName;
                        return TokenKind::AttributeName;
                    }
                    self.bump();
                    self.report(
                        Diagnostic::error("unexpected character in tag").with_code(ErrorCode::E004),
                    );
                    return TokenKind::Unknown;
                }

                ScannerState::AfterAttributeName => {
                    if self.eat_whitespace() {
                        return TokenKind::Whitespace;
                    }
                    if self.eat("=") {
                        self.state = ScannerState::BeforeAttributeValue;
                        return TokenKind::DelimiterAssign;
                    }
                    self.state = ScannerState::WithinTag;
                }

                ScannerState::BeforeAttributeValue => {
                    if self.eat_whitespace() {
                        return TokenKind::Whitespace;
                    }
                    if let Some(quote) = self.peek().filter(|c| *c == '"' || *c == '\'') {
                        self.bump();
                        if self.skip_until_char(quote) {
                            self.bump();
                        } else {
                            self.report(
                                Diagnostic::error("unterminated attribute value")
                                    .with_code(ErrorCode::E006)
                                    .with_help(format!("close the value with `{quote}`")),
                            );
                        }
                        self.state = ScannerState::WithinTag;
                        return TokenKind::AttributeValue;
                    }
                    if self.eat_unquoted_value() {
                        self.state = ScannerState::WithinTag;
                        return TokenKind::AttributeValue;
                    }
                    self.state = ScannerState::WithinTag;
                }

                ScannerState::AfterOpeningEndTag => {
                    if self.eat_tag_name() {
                        self.state = ScannerState::WithinEndTag;
                        return TokenKind::EndTag;
                    }
                    self.state = ScannerState::WithinEndTag;
                    if self.eat_whitespace() {
                        self.report(
                            Diagnostic::error("end tag name must directly follow the open bracket")
                                .with_code(ErrorCode::E002),
                        );
                        return TokenKind::Whitespace;
                    }
                }

                ScannerState::WithinEndTag => {
                    if self.eat_whitespace() {
                        return TokenKind::Whitespace;
                    }
                    if self.eat(">") {
                        self.state = ScannerState::WithinContent;
                        return TokenKind::EndTagClose;
                    }
                    if self.peek() == Some('<') {
                        self.report_closing_bracket_missing();
                        self.state = ScannerState::WithinContent;
                        continue;
                    }
                    self.eat_while(|c| c != '>' && c != '<');
                    self.report(
                        Diagnostic::error("end tag name expected").with_code(ErrorCode::E003),
                    );
                    return TokenKind::Unknown;
                }
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let span = Span::new(self.token_start..self.pos);
        self.diagnostic = Some(diagnostic.with_span(span));
    }

    fn report_closing_bracket_missing(&mut self) {
        let span = Span::new(self.pos..self.pos);
        self.diagnostic = Some(
            Diagnostic::error("closing bracket missing")
                .with_code(ErrorCode::E005)
                .with_span(span)
                .with_help("add `>` before the next tag"),
        );
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advances past one full character.
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let start = self.pos;
        let len: usize = self
            .rest()
            .chars()
            .take_while(|c| pred(*c))
            .map(char::len_utf8)
            .sum();
        self.pos += len;
        self.pos > start
    }

    fn eat_whitespace(&mut self) -> bool {
        self.eat_while(char::is_whitespace)
    }

    fn eat_tag_name(&mut self) -> bool {
        if !self.peek().is_some_and(is_tag_name_start) {
            return false;
        }
        self.eat_while(is_tag_name_char)
    }

    fn eat_unquoted_value(&mut self) -> bool {
        let start = self.pos;
        self.eat_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>' | '='));
        // `a=b/>` keeps the `/` for the self-close token.
        if self.pos - start > 1
            && self.text[..self.pos].ends_with('/')
            && self.peek() == Some('>')
        {
            self.pos -= 1;
        }
        self.pos > start
    }

    /// Moves to the next occurrence of `needle`, or to the end of the text.
    /// Returns whether `needle` was found.
    fn skip_until(&mut self, needle: &str) -> bool {
        match self.rest().find(needle) {
            Some(idx) => {
                self.pos += idx;
                true
            }
            None => {
                self.pos = self.text.len();
                false
            }
        }
    }

    fn skip_until_char(&mut self, needle: char) -> bool {
        let mut buf = [0u8; 4];
        self.skip_until(needle.encode_utf8(&mut buf))
    }
}

fn is_tag_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_tag_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

fn is_attribute_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
}

/// Scans `text` to the end, returning every token (the final one is
/// [`TokenKind::Eos`]) and the lexical diagnostics in scan order.
pub fn tokenize(text: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut scanner = Scanner::new(text);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    loop {
        let token = scanner.scan();
        if let Some(diagnostic) = scanner.take_diagnostic() {
            diagnostics.push(diagnostic);
        }
        tokens.push(token);
        if token.kind() == TokenKind::Eos {
            break;
        }
    }
    (tokens, diagnostics)
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Markup-flavoured noise: tag punctuation mixed with names, quotes and
    /// multi-byte characters.
    fn markup_noise_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("<".to_string()),
                Just("</".to_string()),
                Just(">".to_string()),
                Just("/>".to_string()),
                Just("=".to_string()),
                Just("\"".to_string()),
                Just("'".to_string()),
                Just("<!--".to_string()),
                Just("-->".to_string()),
                Just("<?".to_string()),
                Just("?>".to_string()),
                Just(" ".to_string()),
                Just("é".to_string()),
                "[A-Za-z_][A-Za-z0-9]{0,6}",
            ],
            0..40,
        )
        .prop_map(|parts| parts.concat())
    }

    // ===================
    // Property Test Functions
    // ===================

    /// The token stream tiles the input exactly and ends with one `Eos`.
    fn check_tokens_tile_input(text: &str) -> Result<(), TestCaseError> {
        let (tokens, _) = tokenize(text);
        let mut expected_start = 0;
        for (i, token) in tokens.iter().enumerate() {
            prop_assert_eq!(token.start(), expected_start, "gap before token {}", i);
            prop_assert!(text.is_char_boundary(token.end()));
            if token.kind() == TokenKind::Eos {
                prop_assert_eq!(i, tokens.len() - 1);
                prop_assert_eq!(token.end(), text.len());
            } else {
                prop_assert!(token.end() > token.start(), "empty {:?} token", token.kind());
            }
            expected_start = token.end();
        }
        Ok(())
    }

    /// No more diagnostics than tokens.
    fn check_at_most_one_diagnostic_per_token(text: &str) -> Result<(), TestCaseError> {
        let (tokens, diagnostics) = tokenize(text);
        prop_assert!(diagnostics.len() <= tokens.len());
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn tokens_tile_noise(text in markup_noise_strategy()) {
            check_tokens_tile_input(&text)?;
        }

        #[test]
        fn tokens_tile_arbitrary(text in any::<String>()) {
            check_tokens_tile_input(&text)?;
        }

        #[test]
        fn at_most_one_diagnostic_per_token(text in markup_noise_strategy()) {
            check_at_most_one_diagnostic_per_token(&text)?;
        }
    }
}
