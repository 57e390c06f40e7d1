//! Splits lines into classified tokens for highlighting.
//!
//! A [`Ruleset`] describes one filetype: where tokens end, how comments are
//! marked and which words are keywords or types. A [`Tokenizer`] walks a
//! line with a ruleset (or without one, in which case the whole line is a
//! single plain token).

use bitflags::bitflags;

bitflags! {
    /// Which literal kinds a ruleset recognises.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS   = 0b001;
        const STRINGS   = 0b010;
        const CONSTANTS = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Plain,
    Keyword,
    DataType,
    Number,
    String,
    Constant,
    Comment,
    CommentStart,
    CommentEnd,
    EndOfInput,
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::Comment | TokenKind::CommentStart | TokenKind::CommentEnd
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,

    /// Byte offset into the input.
    pub offset: usize,

    /// Length in bytes.
    pub len: usize,
}

impl Token {
    pub const END: Self = Token {
        kind: TokenKind::EndOfInput,
        offset: 0,
        len: 0,
    };

    pub fn new(kind: TokenKind, offset: usize, len: usize) -> Self {
        Self { kind, offset, len }
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.offset..self.end()]
    }
}

#[derive(Debug)]
pub struct Ruleset {
    pub name: &'static str,
    pub extensions: &'static [&'static str],

    /// Substrings that end a token. They are not part of any token.
    pub separators: &'static [&'static str],

    pub single_line_comment: Option<&'static str>,
    pub multi_line_comment: Option<(&'static str, &'static str)>,

    pub string_quotes: &'static [char],
    pub flags: SyntaxFlags,

    pub data_types: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

impl Ruleset {
    /// Classifies a complete token. Checks run in a fixed order: string,
    /// data type, keyword, number, constant.
    pub fn classify(&self, token: &str) -> TokenKind {
        if token.is_empty() {
            return TokenKind::Plain;
        }

        if self.flags.contains(SyntaxFlags::STRINGS) && self.is_string(token) {
            return TokenKind::String;
        }

        if self.data_types.contains(&token) {
            return TokenKind::DataType;
        }

        if self.keywords.contains(&token) {
            return TokenKind::Keyword;
        }

        if self.flags.contains(SyntaxFlags::NUMBERS) && is_number(token) {
            return TokenKind::Number;
        }

        if self.flags.contains(SyntaxFlags::CONSTANTS) && is_constant(token) {
            return TokenKind::Constant;
        }

        TokenKind::Plain
    }

    fn is_string(&self, token: &str) -> bool {
        let mut chars = token.chars();
        match (chars.next(), chars.next_back()) {
            (Some(open), Some(close)) => open == close && self.string_quotes.contains(&open),
            _ => false,
        }
    }

    fn separator_at(&self, s: &str) -> Option<&'static str> {
        self.separators.iter().copied().find(|sep| s.starts_with(sep))
    }

    fn comment_at(&self, s: &str) -> bool {
        self.single_line_comment.is_some_and(|marker| s.starts_with(marker))
            || self
                .multi_line_comment
                .is_some_and(|(start, end)| s.starts_with(start) || s.starts_with(end))
    }

    /// Length of the token at the start of `s`: up to the next separator or
    /// comment marker.
    fn token_len(&self, s: &str) -> usize {
        s.char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .find(|&i| self.separator_at(&s[i..]).is_some() || self.comment_at(&s[i..]))
            .unwrap_or(s.len())
    }

    /// Length of the string literal at the start of `s`, closing quote
    /// included. Unterminated literals run to the end of `s`.
    fn string_len(s: &str, quote: char) -> usize {
        let mut escaped = false;

        for (i, ch) in s.char_indices().skip(1) {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                ch if ch == quote => return i + ch.len_utf8(),
                _ => {}
            }
        }

        s.len()
    }
}

/// A single optional `-` followed by ASCII digits.
fn is_number(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// At least two characters, starting with an uppercase letter, made of
/// uppercase letters, digits and underscores.
fn is_constant(token: &str) -> bool {
    token.len() >= 2
        && token.starts_with(|ch: char| ch.is_ascii_uppercase())
        && token
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

const C_SEPARATORS: &[&str] = &[
    " ", "\t", ",", ";", ".", "->", "(", ")", "[", "]", "{", "}",
];

pub static C: Ruleset = Ruleset {
    name: "c",
    extensions: &["c", "h", "cpp", "hpp"],
    separators: C_SEPARATORS,
    single_line_comment: Some("//"),
    multi_line_comment: Some(("/*", "*/")),
    string_quotes: &['"', '\''],
    flags: SyntaxFlags::NUMBERS
        .union(SyntaxFlags::STRINGS)
        .union(SyntaxFlags::CONSTANTS),
    data_types: &[
        "int", "long", "short", "double", "float", "char", "unsigned", "signed", "void", "bool",
        "size_t",
    ],
    keywords: &[
        "switch", "#define", "#include", "if", "while", "for", "break", "continue", "return",
        "else", "struct", "union", "typedef", "static", "enum", "class", "case", "default", "do",
        "goto", "sizeof", "const",
    ],
};

pub static RUST: Ruleset = Ruleset {
    name: "rust",
    extensions: &["rs"],
    separators: &[
        " ", "\t", ",", ";", ".", "::", ":", "->", "=>", "(", ")", "[", "]", "{", "}", "<", ">",
        "&",
    ],
    single_line_comment: Some("//"),
    multi_line_comment: Some(("/*", "*/")),
    string_quotes: &['"'],
    flags: SyntaxFlags::NUMBERS
        .union(SyntaxFlags::STRINGS)
        .union(SyntaxFlags::CONSTANTS),
    data_types: &[
        "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
        "f32", "f64", "bool", "char", "str", "String", "Vec", "Option", "Result", "Box", "Self",
    ],
    keywords: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
        "ref", "return", "self", "static", "struct", "super", "trait", "type", "unsafe", "use",
        "where", "while",
    ],
};

pub static RULESETS: &[&Ruleset] = &[&C, &RUST];

/// Finds the ruleset for a file extension, with or without its leading dot.
pub fn find_ruleset(extension: &str) -> Option<&'static Ruleset> {
    let extension = extension.strip_prefix('.').unwrap_or(extension);

    RULESETS
        .iter()
        .copied()
        .find(|ruleset| ruleset.extensions.contains(&extension))
}

/// Produces tokens from one input at a time.
///
/// Block comment state carries over from one input to the next, so feeding
/// the rows of a document in order highlights comments spanning lines.
#[derive(Debug, Default)]
pub struct Tokenizer<'a> {
    ruleset: Option<&'static Ruleset>,
    input: &'a str,
    pos: usize,
    in_block_comment: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(ruleset: Option<&'static Ruleset>) -> Self {
        Self {
            ruleset,
            ..Default::default()
        }
    }

    /// Selects the ruleset for `extension`, falling back to plain mode.
    /// Returns whether a ruleset was found.
    pub fn set_syntax(&mut self, extension: &str) -> bool {
        self.ruleset = find_ruleset(extension);
        self.in_block_comment = false;
        self.ruleset.is_some()
    }

    pub fn syntax_name(&self) -> Option<&'static str> {
        self.ruleset.map(|ruleset| ruleset.name)
    }

    pub fn set_input(&mut self, input: &'a str) {
        self.input = input;
        self.pos = 0;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn in_block_comment(&self) -> bool {
        self.in_block_comment
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            if self.pos >= self.input.len() {
                self.input = "";
                self.pos = 0;
                return Token::END;
            }

            let Some(ruleset) = self.ruleset else {
                return self.take(TokenKind::Plain, self.input.len() - self.pos);
            };

            let input = self.input;
            let rest = &input[self.pos..];

            if let Some((start, end)) = ruleset.multi_line_comment {
                if self.in_block_comment {
                    if rest.starts_with(end) {
                        self.in_block_comment = false;
                        return self.take(TokenKind::CommentEnd, end.len());
                    }

                    let len = rest.find(end).unwrap_or(rest.len());
                    return self.take(TokenKind::Comment, len);
                }

                if rest.starts_with(start) {
                    self.in_block_comment = true;
                    return self.take(TokenKind::CommentStart, start.len());
                }

                if rest.starts_with(end) {
                    return self.take(TokenKind::CommentEnd, end.len());
                }
            }

            if let Some(marker) = ruleset.single_line_comment {
                if rest.starts_with(marker) {
                    return self.take(TokenKind::Comment, rest.len());
                }
            }

            if let Some(sep) = ruleset.separator_at(rest) {
                self.pos += sep.len();
                continue;
            }

            let len = match rest.chars().next() {
                Some(quote)
                    if ruleset.flags.contains(SyntaxFlags::STRINGS)
                        && ruleset.string_quotes.contains(&quote) =>
                {
                    Ruleset::string_len(rest, quote)
                }
                _ => ruleset.token_len(rest),
            };

            let kind = ruleset.classify(&rest[..len]);
            return self.take(kind, len);
        }
    }

    fn take(&mut self, kind: TokenKind, len: usize) -> Token {
        let token = Token::new(kind, self.pos, len);
        self.pos += len;
        token
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        (token.kind != TokenKind::EndOfInput).then_some(token)
    }
}
