//! Path-selector expressions.
//!
//! A selector is a `/`-separated list of fragments. Fragments starting with
//! `$` are handles (`$this`, `$parent`, `$ancestor[@type=Button]`,
//! `$sibling-1`, ...); unknown handle names are custom handle aliases. Any
//! other fragment is a plain child name.
//!
//! ```
//! use uidesc_parser::selector::{parse_selector, AncestorPredicate, SelectorFragment};
//!
//! let fragments = parse_selector("$parent/$ancestor[@type=Button]/Title").unwrap();
//! assert_eq!(
//!     fragments,
//!     [
//!         SelectorFragment::Parent,
//!         SelectorFragment::Ancestor(Some(AncestorPredicate::Type("Button".into()))),
//!         SelectorFragment::Identifier("Title".into()),
//!     ]
//! );
//! ```

use std::fmt;

use winnow::{
    Parser,
    ascii::digit1,
    combinator::{alt, delimited, opt, preceded, separated},
    error::ModalResult,
    token::{one_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Predicate narrowing an `$ancestor` step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AncestorPredicate {
    /// `[@name=X]`: nearest ancestor named `X`.
    Name(String),
    /// `[@type=X]`: nearest ancestor whose effective type is exactly frame type `X`.
    Type(String),
    /// `[@oftype=X]`: nearest ancestor whose frame classes include `X`'s class.
    OfType(String),
}

/// One step of a path selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorFragment {
    Ancestor(Option<AncestorPredicate>),
    Parent,
    This,
    Sibling(i32),
    /// Plain child name.
    Identifier(String),
    /// Globally registered handle alias.
    Custom(String),
    Layer,
    Root,
}

impl fmt::Display for SelectorFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorFragment::Ancestor(None) => f.write_str("$ancestor"),
            SelectorFragment::Ancestor(Some(AncestorPredicate::Name(name))) => {
                write!(f, "$ancestor[@name={name}]")
            }
            SelectorFragment::Ancestor(Some(AncestorPredicate::Type(name))) => {
                write!(f, "$ancestor[@type={name}]")
            }
            SelectorFragment::Ancestor(Some(AncestorPredicate::OfType(name))) => {
                write!(f, "$ancestor[@oftype={name}]")
            }
            SelectorFragment::Parent => f.write_str("$parent"),
            SelectorFragment::This => f.write_str("$this"),
            SelectorFragment::Sibling(0) => f.write_str("$sibling"),
            SelectorFragment::Sibling(offset) => write!(f, "$sibling{offset:+}"),
            SelectorFragment::Identifier(name) => f.write_str(name),
            SelectorFragment::Custom(name) => write!(f, "${name}"),
            SelectorFragment::Layer => f.write_str("$layer"),
            SelectorFragment::Root => f.write_str("$root"),
        }
    }
}

/// Parses a selector expression into fragments.
///
/// Surrounding whitespace is ignored. On failure the diagnostic spans from
/// the offending offset to the end of `text`.
pub fn parse_selector(text: &str) -> Result<Vec<SelectorFragment>, Diagnostic> {
    let trimmed = text.trim_start();
    let leading = text.len() - trimmed.len();
    let trimmed = trimmed.trim_end();

    selector.parse(trimmed).map_err(|err| {
        let offset = leading + err.offset();
        Diagnostic::error(format!("invalid selector `{trimmed}`"))
            .with_code(ErrorCode::E300)
            .with_span(Span::new(offset..text.len().max(offset)))
            .with_help("fragments are `$handle` or child names separated by `/`")
    })
}

fn selector(input: &mut &str) -> ModalResult<Vec<SelectorFragment>> {
    separated(1.., fragment, '/').parse_next(input)
}

fn fragment(input: &mut &str) -> ModalResult<SelectorFragment> {
    alt((preceded('$', handle), identifier)).parse_next(input)
}

fn identifier(input: &mut &str) -> ModalResult<SelectorFragment> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '/' | '$' | '[' | ']')
    })
    .map(|name: &str| SelectorFragment::Identifier(name.to_string()))
    .parse_next(input)
}

fn handle(input: &mut &str) -> ModalResult<SelectorFragment> {
    let name = take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)?;
    let fragment = match name {
        "this" => SelectorFragment::This,
        "parent" => SelectorFragment::Parent,
        "root" => SelectorFragment::Root,
        "layer" => SelectorFragment::Layer,
        "sibling" => SelectorFragment::Sibling(opt(sibling_offset).parse_next(input)?.unwrap_or(0)),
        "ancestor" => SelectorFragment::Ancestor(opt(ancestor_predicate).parse_next(input)?),
        custom => SelectorFragment::Custom(custom.to_string()),
    };
    Ok(fragment)
}

fn sibling_offset(input: &mut &str) -> ModalResult<i32> {
    (one_of(['+', '-']), digit1)
        .try_map(|(sign, digits): (char, &str)| {
            digits
                .parse::<i32>()
                .map(|n| if sign == '-' { -n } else { n })
        })
        .parse_next(input)
}

fn ancestor_predicate(input: &mut &str) -> ModalResult<AncestorPredicate> {
    delimited(
        "[@",
        alt((
            preceded("name=", predicate_value).map(AncestorPredicate::Name),
            preceded("type=", predicate_value).map(AncestorPredicate::Type),
            preceded("oftype=", predicate_value).map(AncestorPredicate::OfType),
        )),
        ']',
    )
    .parse_next(input)
}

fn predicate_value(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| c != ']' && c != '/')
        .map(|value: &str| value.trim().to_string())
        .parse_next(input)
}
