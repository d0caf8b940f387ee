use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenType};
use crate::node::{Document, Node};
use crate::utils::excerpt;
use miette::NamedSource;
use std::sync::Arc;

/// A recursive descent parser for JSON documents.
///
/// The grammar is strict: string keys only, no trailing commas, and exactly
/// one root value followed by end of input.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    source_text: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "source.json".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        let mut lexer = Lexer::new(source_text);
        let tokens: Vec<Token> = lexer
            .lex()
            .into_iter()
            .filter(|t| t.ttype != TokenType::Whitespace)
            .collect();

        Self {
            source,
            tokens,
            position: 0,
            source_text,
        }
    }

    // === Main Parsing Methods ===

    /// Document ::= Value Eof
    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let root = self.parse_value()?;
        self.expect(TokenType::Eof)?;
        Ok(Document { root })
    }

    /// Value ::= Object | Array | String | Number | "true" | "false" | "null"
    fn parse_value(&mut self) -> Result<Node, ParseError> {
        let token = self.current_token()?.clone();
        match token.ttype {
            TokenType::LBrace => self.parse_object(),
            TokenType::LBracket => self.parse_array(),
            TokenType::String(s) => {
                self.advance();
                Ok(Node::String(s))
            }
            TokenType::Int(n) => {
                self.advance();
                Ok(Node::Int(n))
            }
            TokenType::Uint(n) => {
                self.advance();
                Ok(Node::Uint(n))
            }
            TokenType::Float(n) => {
                self.advance();
                Ok(Node::Float(n))
            }
            TokenType::True => {
                self.advance();
                Ok(Node::Bool(true))
            }
            TokenType::False => {
                self.advance();
                Ok(Node::Bool(false))
            }
            TokenType::Null => {
                self.advance();
                Ok(Node::Null)
            }
            _ => self.err_unexpected("a value"),
        }
    }

    /// Object ::= "{" [ Member { "," Member } ] "}"
    fn parse_object(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenType::LBrace)?;
        let mut members = Vec::new();
        if !self.check(TokenType::RBrace) {
            members.push(self.parse_member()?);
            while self.match_token(TokenType::Comma) {
                members.push(self.parse_member()?);
            }
        }
        self.expect(TokenType::RBrace)?;
        Ok(Node::Object(members))
    }

    /// Member ::= String ":" Value
    fn parse_member(&mut self) -> Result<(String, Node), ParseError> {
        let token = self.current_token()?.clone();
        let key = match token.ttype {
            TokenType::String(s) => {
                self.advance();
                s
            }
            _ => return self.err_unexpected("a string key"),
        };
        self.expect(TokenType::Colon)?;
        let value = self.parse_value()?;
        Ok((key, value))
    }

    /// Array ::= "[" [ Value { "," Value } ] "]"
    fn parse_array(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenType::LBracket)?;
        let mut values = Vec::new();
        if !self.check(TokenType::RBracket) {
            values.push(self.parse_value()?);
            while self.match_token(TokenType::Comma) {
                values.push(self.parse_value()?);
            }
        }
        self.expect(TokenType::RBracket)?;
        Ok(Node::Array(values))
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, ParseError> {
        self.tokens.get(self.position).ok_or_else(|| {
            let pos = self.source_text.len().saturating_sub(1);
            ParseError::UnexpectedEof {
                src: (*self.source).clone(),
                span: (pos, 0).into(),
            }
        })
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType) -> Result<(), ParseError> {
        let token = self.current_token()?.clone();
        if std::mem::discriminant(&token.ttype) == std::mem::discriminant(&expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(&format!("{:?}", expected))
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, ParseError> {
        let token = self.current_token()?;
        if token.ttype == TokenType::Eof {
            // Running out of tokens mid-document reads better as an EOF
            // error than as an unexpected token pointing past the input.
            let pos = self.source_text.len().saturating_sub(1);
            return Err(ParseError::UnexpectedEof {
                src: (*self.source).clone(),
                span: (pos, 0).into(),
            });
        }
        Err(ParseError::UnexpectedToken {
            src: (*self.source).clone(),
            span: (token.pos_start, token.pos_end - token.pos_start).into(),
            expected: expected.to_string(),
            excerpt: excerpt(self.source_text, token.pos_start).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    fn parse_ok(source: &str) -> Document {
        let mut parser = Parser::new_with_name(source, "test.json".to_string());
        match parser.parse_document() {
            Ok(doc) => doc,
            Err(err) => {
                let report = Report::from(err);
                panic!("{:?}", report);
            }
        }
    }

    fn parse_err(source: &str) -> ParseError {
        let mut parser = Parser::new_with_name(source, "test.json".to_string());
        match parser.parse_document() {
            Ok(doc) => panic!("expected a parse failure, got {:?}", doc),
            Err(err) => err,
        }
    }

    #[test]
    fn test_empty_object() {
        let doc = parse_ok("{}");
        assert_eq!(doc.root, Node::Object(vec![]));
    }

    #[test]
    fn test_empty_array() {
        let doc = parse_ok("[]");
        assert_eq!(doc.root, Node::Array(vec![]));
    }

    #[test]
    fn test_scalar_roots() {
        assert_eq!(parse_ok("42").root, Node::Int(42));
        assert_eq!(parse_ok("-3.5").root, Node::Float(-3.5));
        assert_eq!(parse_ok("true").root, Node::Bool(true));
        assert_eq!(parse_ok("null").root, Node::Null);
        assert_eq!(parse_ok(r#""hi""#).root, Node::String("hi".to_string()));
    }

    #[test]
    fn test_simple_pair() {
        let doc = parse_ok(r#"{ "key": "value" }"#);
        let members = match doc.root {
            Node::Object(m) => m,
            _ => panic!(),
        };
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].0, "key");
        assert_eq!(members[0].1, Node::String("value".to_string()));
    }

    #[test]
    fn test_nested_structures() {
        let doc = parse_ok(r#"{ "a": { "b": [1, 2, { "c": null }] } }"#);
        let inner = doc.root.member("a").and_then(|n| n.member("b"));
        match inner {
            Some(Node::Array(items)) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], Node::Int(1));
                assert_eq!(items[2].member("c"), Some(&Node::Null));
            }
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn test_member_order_is_preserved() {
        let doc = parse_ok(r#"{ "z": 1, "a": 2, "m": 3 }"#);
        let members = match doc.root {
            Node::Object(m) => m,
            _ => panic!(),
        };
        let keys: Vec<&str> = members.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let doc = parse_ok(r#"{ "a": 1, "a": 2 }"#);
        let members = match &doc.root {
            Node::Object(m) => m,
            _ => panic!(),
        };
        assert_eq!(members.len(), 2);
        // Lookup answers the first occurrence.
        assert_eq!(doc.root.member("a"), Some(&Node::Int(1)));
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(matches!(
            parse_err(r#"{ "a": 1, }"#),
            ParseError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_err("[1, 2,]"),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_non_string_key_rejected() {
        assert!(matches!(
            parse_err("{ key: 1 }"),
            ParseError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_err("{ 1: 2 }"),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(matches!(
            parse_err("{} {}"),
            ParseError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse_err("1 2"),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_truncated_input_is_eof() {
        assert!(matches!(
            parse_err(r#"{ "a": "#),
            ParseError::UnexpectedEof { .. }
        ));
        assert!(matches!(parse_err("[1, 2"), ParseError::UnexpectedEof { .. }));
        assert!(matches!(parse_err(""), ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_missing_colon() {
        assert!(matches!(
            parse_err(r#"{ "a" 1 }"#),
            ParseError::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_error_offset_points_at_token() {
        let source = r#"{ "a": @ }"#;
        let err = parse_err(source);
        assert_eq!(err.offset(), Some(7));
    }

    #[test]
    fn test_error_excerpt_is_captured() {
        let source = r#"{ "a": whoops }"#;
        match parse_err(source) {
            ParseError::UnexpectedToken { excerpt, .. } => {
                assert!(excerpt.starts_with("whoops"));
                assert!(excerpt.len() <= 32);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unicode_escape_in_key() {
        // The escape is decoded at lex time, so the member key is plain "a".
        let doc = parse_ok(r#"{ "\u0061": 1 }"#);
        assert_eq!(doc.root.member("a"), Some(&Node::Int(1)));
    }

    #[test]
    fn test_wide_integers_keep_kind() {
        let doc = parse_ok("[9223372036854775807, 18446744073709551615]");
        match doc.root {
            Node::Array(items) => {
                assert_eq!(items[0], Node::Int(i64::MAX));
                assert_eq!(items[1], Node::Uint(u64::MAX));
            }
            _ => panic!(),
        }
    }
}
