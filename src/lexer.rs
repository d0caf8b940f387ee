/// Represents the different kinds of tokens that the lexer can produce.
/// Each token is a meaningful unit of JSON syntax.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // == Special Tokens ==
    /// Represents the end of the input.
    Eof,
    /// Represents a sequence of one or more whitespace characters.
    Whitespace,
    /// Represents a token that could not be recognized by the lexer: a stray
    /// character, a malformed number, a bad escape, an unterminated string.
    Unknown,

    // == Literals ==
    /// A string literal, enclosed in double quotes. The associated `String`
    /// holds the content with all escape sequences already decoded.
    String(String),
    /// An integer literal that fits a signed 64-bit value.
    Int(i64),
    /// An integer literal above `i64::MAX` that still fits 64 unsigned bits.
    Uint(u64),
    /// A number literal with a fraction or exponent part, or an integer too
    /// wide for 64 bits.
    Float(f64),

    // == Keywords ==
    /// The `true` literal.
    True,
    /// The `false` literal.
    False,
    /// The `null` literal.
    Null,

    // == Punctuation ==
    /// Left Brace: `{`
    LBrace,
    /// Right Brace: `}`
    RBrace,
    /// Left Bracket: `[`
    LBracket,
    /// Right Bracket: `]`
    RBracket,
    /// Comma: `,`
    Comma,
    /// Colon: `:`
    Colon,
}

/// A token with its type and position
#[derive(Debug, Clone)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }
}

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        let start_pos = self.position;

        let ttype = if let Some(char) = self.advance() {
            match char {
                '{' => TokenType::LBrace,
                '}' => TokenType::RBrace,
                '[' => TokenType::LBracket,
                ']' => TokenType::RBracket,
                ',' => TokenType::Comma,
                ':' => TokenType::Colon,
                '"' => self.read_string(),
                c if c.is_whitespace() => self.read_whitespace(),
                c if c.is_ascii_alphabetic() => self.read_keyword(c),
                c if c.is_ascii_digit()
                    || (c == '-' && self.peek().map_or(false, |c| c.is_ascii_digit())) =>
                {
                    self.read_number(c)
                }

                _ => TokenType::Unknown,
            }
        } else {
            TokenType::Eof
        };

        Token::new(ttype, start_pos, self.position)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn read_whitespace(&mut self) -> TokenType {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        TokenType::Whitespace
    }

    fn read_string(&mut self) -> TokenType {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if *c == '"' {
                self.advance(); // Consume the closing quote
                return TokenType::String(value);
            }

            if *c == '\\' {
                self.advance(); // Consume the backslash
                match self.read_escape() {
                    Some(decoded) => value.push(decoded),
                    None => return TokenType::Unknown, // Bad escape sequence
                }
            } else if (*c as u32) < 0x20 {
                // Raw control characters must be escaped inside strings.
                return TokenType::Unknown;
            } else {
                value.push(self.advance().unwrap());
            }
        }
        TokenType::Unknown // Unclosed string
    }

    fn read_escape(&mut self) -> Option<char> {
        match self.advance()? {
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            'b' => Some('\u{0008}'),
            'f' => Some('\u{000C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'u' => self.read_unicode_escape(),
            _ => None,
        }
    }

    fn read_unicode_escape(&mut self) -> Option<char> {
        let first = self.read_hex4()?;
        if (0xD800..=0xDBFF).contains(&first) {
            // A high surrogate must be followed by a `\uXXXX` low surrogate.
            if self.advance()? != '\\' || self.advance()? != 'u' {
                return None;
            }
            let second = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&second) {
                return None;
            }
            let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            char::from_u32(combined)
        } else {
            // Lone surrogates are rejected by from_u32.
            char::from_u32(first)
        }
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            value = value * 16 + self.advance()?.to_digit(16)?;
        }
        Some(value)
    }

    fn read_keyword(&mut self, first_char: char) -> TokenType {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                ident.push(self.advance().unwrap());
            } else {
                break;
            }
        }

        match ident.as_str() {
            "true" => TokenType::True,
            "false" => TokenType::False,
            "null" => TokenType::Null,
            _ => TokenType::Unknown,
        }
    }

    fn read_number(&mut self, first_char: char) -> TokenType {
        let mut number_str = String::new();
        number_str.push(first_char);
        let mut has_dot = false;
        let mut has_exponent = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                number_str.push(self.advance().unwrap());
            } else if *c == '.' && !has_dot && !has_exponent {
                has_dot = true;
                number_str.push(self.advance().unwrap());
            } else if (*c == 'e' || *c == 'E') && !has_exponent {
                has_exponent = true;
                number_str.push(self.advance().unwrap());
                // Check for optional sign after 'e' or 'E'
                if let Some(sign_char) = self.peek() {
                    if *sign_char == '+' || *sign_char == '-' {
                        number_str.push(self.advance().unwrap());
                    }
                }
            } else {
                break;
            }
        }

        if !valid_number_shape(&number_str) {
            TokenType::Unknown
        } else if has_dot || has_exponent {
            if let Ok(num) = number_str.parse::<f64>() {
                TokenType::Float(num)
            } else {
                TokenType::Unknown
            }
        } else {
            parse_integer(&number_str)
        }
    }
}

/// JSON number literals need a digit after a dot or an exponent and forbid
/// leading zeros, both of which `f64::from_str` would let through.
fn valid_number_shape(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.len() > 1 && digits.starts_with('0') && digits.as_bytes()[1].is_ascii_digit() {
        return false;
    }
    let bytes = text.as_bytes();
    if !bytes.last().map_or(false, |b| b.is_ascii_digit()) {
        return false;
    }
    if let Some(i) = text.find('.') {
        if !bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit()) {
            return false;
        }
    }
    true
}

/// Integer literals keep their integer kind across the full unsigned 64-bit
/// range; anything wider falls back to floating point.
fn parse_integer(text: &str) -> TokenType {
    if let Ok(num) = text.parse::<i64>() {
        return TokenType::Int(num);
    }
    if let Ok(num) = text.parse::<u64>() {
        return TokenType::Uint(num);
    }
    if let Ok(num) = text.parse::<f64>() {
        TokenType::Float(num)
    } else {
        TokenType::Unknown
    }
}
