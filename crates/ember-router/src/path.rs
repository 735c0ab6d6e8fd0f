//! Route patterns and query strings.
//!
//! A pattern is matched against the whole pathname. `:name` captures one
//! non-empty segment, `*` matches anything (slashes included) and every
//! other character must appear literally.

use indexmap::IndexMap;

pub type Params = IndexMap<String, String>;
pub type Query = IndexMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
    Wildcard,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    tokens: Vec<Token>,
}

impl PathPattern {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                ':' if chars.peek().is_some_and(|next| *next != '/') => {
                    let mut name = String::new();
                    while let Some(next) = chars.next_if(|next| *next != '/') {
                        name.push(next);
                    }
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::Param(name));
                }
                '*' => {
                    flush_literal(&mut literal, &mut tokens);
                    tokens.push(Token::Wildcard);
                }
                other => literal.push(other),
            }
        }
        flush_literal(&mut literal, &mut tokens);
        Self { source, tokens }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the `:param` captures, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Matches the whole of `pathname`, returning the captured params.
    pub fn captures(&self, pathname: &str) -> Option<Params> {
        let mut captured = Vec::new();
        if match_tokens(&self.tokens, pathname, &mut captured) {
            Some(captured.into_iter().collect())
        } else {
            None
        }
    }

    pub fn matches(&self, pathname: &str) -> bool {
        self.captures(pathname).is_some()
    }
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

fn match_tokens(tokens: &[Token], input: &str, captured: &mut Vec<(String, String)>) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return input.is_empty();
    };
    match token {
        Token::Literal(literal) => input
            .strip_prefix(literal.as_str())
            .is_some_and(|remaining| match_tokens(rest, remaining, captured)),
        Token::Param(name) => {
            let segment_end = input.find('/').unwrap_or(input.len());
            // Greedy: try the longest capture first.
            let ends: Vec<usize> = input[..segment_end]
                .char_indices()
                .map(|(index, ch)| index + ch.len_utf8())
                .collect();
            for end in ends.into_iter().rev() {
                captured.push((name.clone(), input[..end].to_owned()));
                if match_tokens(rest, &input[end..], captured) {
                    return true;
                }
                captured.pop();
            }
            false
        }
        Token::Wildcard => (0..=input.len())
            .rev()
            .filter(|end| input.is_char_boundary(*end))
            .any(|end| match_tokens(rest, &input[end..], captured)),
    }
}

/// Splits a location into its pathname and query string (without the `?`).
/// A trailing `#fragment` is dropped.
pub fn split_location(location: &str) -> (&str, &str) {
    let location = location.split('#').next().unwrap_or(location);
    match location.split_once('?') {
        Some((pathname, search)) => (pathname, search),
        None => (location, ""),
    }
}

/// Parses `a=1&b=two` (an optional leading `?` is ignored). Later
/// duplicates overwrite earlier ones.
pub fn parse_query(search: &str) -> Query {
    let search = search.strip_prefix('?').unwrap_or(search);
    let mut query = Query::new();
    for pair in search.split('&').filter(|pair| !pair.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.insert(decode_component(name), decode_component(value));
    }
    query
}

/// Form-style decoding: `+` is a space and `%XX` a byte. Malformed escapes
/// are kept as written.
pub fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'+' => decoded.push(b' '),
            b'%' => {
                let escaped = raw
                    .get(index + 1..index + 3)
                    .filter(|hex| hex.bytes().all(|byte| byte.is_ascii_hexdigit()))
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match escaped {
                    Some(byte) => {
                        decoded.push(byte);
                        index += 2;
                    }
                    None => decoded.push(b'%'),
                }
            }
            byte => decoded.push(byte),
        }
        index += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
#[path = "tests/path_tests.rs"]
mod tests;
