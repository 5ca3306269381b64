//! Authorized key title templates.
//!
//! A title template is plain text with three kinds of tokens:
//!
//! - `%{ssh_key}`: name of the key being authorized
//! - `%{account}`: identity the key is authorized for
//! - `%{ssh_keys['<name>']['<attribute>']}`: an attribute of any declared
//!   key; `<name>` may itself contain `%{ssh_key}` or `%{account}`
//!
//! ```text
//! %{ssh_key}-on-%{account}                          -> deploy-on-alice
//! %{ssh_keys['%{ssh_key}']['comment']} on %{account} -> CI deploy key on alice
//! ```
//!
//! Templates are compiled once per pass. Unknown tokens fail compilation;
//! lookups of undeclared keys or missing attributes fail rendering.

use crate::error::TemplateError;
use crate::ordered::Declared;
use crate::schema::SshKeySpec;
use regex::Regex;
use std::sync::LazyLock;

/// Title template used when the configuration does not set one.
pub const DEFAULT_TITLE_TEMPLATE: &str = "%{ssh_key}-on-%{account}";

/// `%{...}` with at most one level of nested `%{...}` inside.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%\{((?:%\{[^{}]*\}|[^{}])*)\}").expect("token pattern is valid")
});

/// Tokens allowed inside a key name: no nesting.
static NAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([^{}]*)\}").expect("name token pattern is valid"));

static LOOKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ssh_keys\[(?:'([^']*)'|"([^"]*)")\]\[(?:'([^']*)'|"([^"]*)")\]$"#)
        .expect("lookup pattern is valid")
});

/// Values a template is rendered against.
#[derive(Debug, Clone, Copy)]
pub struct TitleContext<'a> {
    /// Name of the key being authorized
    pub ssh_key: &'a str,
    /// Identity the key is authorized for
    pub account: &'a str,
    /// Every declared key, for attribute lookups
    pub ssh_keys: &'a Declared<SshKeySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    SshKey,
    Account,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Part(Part),
    Lookup { ssh_key: Vec<Part>, attribute: String },
}

/// A compiled title template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl TitleTemplate {
    /// Compile a template, rejecting unknown or unterminated tokens.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        for piece in scan(source, &TOKEN)? {
            let segment = match piece {
                Piece::Text(text) => Segment::Part(Part::Literal(text.to_string())),
                Piece::Token(body) => match simple_part(body) {
                    Some(part) => Segment::Part(part),
                    None => compile_lookup(body)?,
                },
            };
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render a title for one key/account pair.
    pub fn render(&self, ctx: &TitleContext<'_>) -> Result<String, TemplateError> {
        let mut title = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Part(part) => render_part(part, ctx, &mut title),
                Segment::Lookup { ssh_key, attribute } => {
                    let mut name = String::new();
                    for part in ssh_key {
                        render_part(part, ctx, &mut name);
                    }
                    let spec = ctx
                        .ssh_keys
                        .get(&name)
                        .ok_or_else(|| TemplateError::UnknownSshKey { name: name.clone() })?;
                    let value = spec.attribute(attribute).ok_or_else(|| {
                        TemplateError::UnknownAttribute {
                            ssh_key: name.clone(),
                            attribute: attribute.clone(),
                        }
                    })?;
                    title.push_str(&value);
                }
            }
        }
        Ok(title)
    }
}

impl Default for TitleTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TITLE_TEMPLATE.to_string(),
            segments: vec![
                Segment::Part(Part::SshKey),
                Segment::Part(Part::Literal("-on-".to_string())),
                Segment::Part(Part::Account),
            ],
        }
    }
}

fn render_part(part: &Part, ctx: &TitleContext<'_>, out: &mut String) {
    match part {
        Part::Literal(text) => out.push_str(text),
        Part::SshKey => out.push_str(ctx.ssh_key),
        Part::Account => out.push_str(ctx.account),
    }
}

fn simple_part(body: &str) -> Option<Part> {
    match body {
        "ssh_key" => Some(Part::SshKey),
        "account" => Some(Part::Account),
        _ => None,
    }
}

fn compile_lookup(body: &str) -> Result<Segment, TemplateError> {
    let unknown = || TemplateError::UnknownToken {
        token: body.to_string(),
    };
    let caps = LOOKUP.captures(body).ok_or_else(unknown)?;
    let name = caps
        .get(1)
        .or_else(|| caps.get(2))
        .map_or("", |m| m.as_str());
    let attribute = caps
        .get(3)
        .or_else(|| caps.get(4))
        .map_or("", |m| m.as_str());

    let mut ssh_key = Vec::new();
    for piece in scan(name, &NAME_TOKEN)? {
        match piece {
            Piece::Text(text) => ssh_key.push(Part::Literal(text.to_string())),
            Piece::Token(inner) => ssh_key.push(simple_part(inner).ok_or_else(|| {
                TemplateError::UnknownToken {
                    token: inner.to_string(),
                }
            })?),
        }
    }

    Ok(Segment::Lookup {
        ssh_key,
        attribute: attribute.to_string(),
    })
}

enum Piece<'a> {
    Text(&'a str),
    Token(&'a str),
}

/// Split `source` into literal text and token bodies.
fn scan<'a>(source: &'a str, pattern: &Regex) -> Result<Vec<Piece<'a>>, TemplateError> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in pattern.captures_iter(source) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut pieces, source, last, whole.start())?;
        pieces.push(Piece::Token(caps.get(1).map_or("", |m| m.as_str())));
        last = whole.end();
    }
    push_text(&mut pieces, source, last, source.len())?;
    Ok(pieces)
}

fn push_text<'a>(
    pieces: &mut Vec<Piece<'a>>,
    source: &'a str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &source[start..end];
    if let Some(offset) = text.find("%{") {
        let body = &text[offset + 2..];
        return Err(match body.find('}') {
            Some(close) => TemplateError::Malformed {
                token: body[..close].to_string(),
                position: start + offset,
            },
            None => TemplateError::Unterminated {
                position: start + offset,
            },
        });
    }
    if !text.is_empty() {
        pieces.push(Piece::Text(text));
    }
    Ok(())
}
