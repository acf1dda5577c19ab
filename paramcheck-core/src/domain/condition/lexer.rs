// paramcheck-core/src/domain/condition/lexer.rs

use crate::domain::condition::ast::Comparator;
use crate::domain::error::DomainError;

const OPERATOR_CHARS: [char; 4] = ['=', '!', '<', '>'];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    Operator(Comparator),
    /// Parameter name, literal, or the `and` / `or` keywords.
    /// Keywords are resolved by the parser from their position.
    Word(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset into the source text.
    pub offset: usize,
}

impl Token {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    pub fn is_connective(&self) -> bool {
        self.is_keyword("and") || self.is_keyword("or")
    }
}

fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !is_operator_char(c) && c != '(' && c != ')'
}

/// Splits a condition into tokens. Operator characters are read as a maximal
/// run so that `>=` is never split into `>` `=`, and `=>` is rejected.
pub fn tokenize(text: &str) -> Result<Vec<Token>, DomainError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            c if is_operator_char(c) => {
                let mut end = offset;
                while let Some(&(i, ch)) = chars.peek() {
                    if !is_operator_char(ch) {
                        break;
                    }
                    end = i + ch.len_utf8();
                    chars.next();
                }
                let symbol = &text[offset..end];
                let op = Comparator::from_symbol(symbol).ok_or_else(|| {
                    DomainError::syntax(text, offset, "one of =, !=, >, <, >=, <=")
                })?;
                TokenKind::Operator(op)
            }
            _ => {
                let mut end = offset;
                while let Some(&(i, ch)) = chars.peek() {
                    if !is_word_char(ch) {
                        break;
                    }
                    end = i + ch.len_utf8();
                    chars.next();
                }
                TokenKind::Word(text[offset..end].to_string())
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_longest_match_operators() {
        assert_eq!(
            kinds("bw>=100"),
            vec![
                TokenKind::Word("bw".into()),
                TokenKind::Operator(Comparator::Ge),
                TokenKind::Word("100".into()),
            ]
        );
        assert_eq!(
            kinds("a != b"),
            vec![
                TokenKind::Word("a".into()),
                TokenKind::Operator(Comparator::Ne),
                TokenKind::Word("b".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = tokenize("a => 1").unwrap_err();
        match err {
            DomainError::SyntaxError { position, .. } => assert_eq!(position, 2),
            other => panic!("Expected SyntaxError, got {other:?}"),
        }
        assert!(tokenize("a == 1").is_err());
        assert!(tokenize("a ! 1").is_err());
    }

    #[test]
    fn test_unicode_words_and_offsets() {
        let tokens = tokenize("(小区类型=宏站)").unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].kind, TokenKind::Word("小区类型".into()));
        assert_eq!(tokens[2].offset, 1 + "小区类型".len());
        assert_eq!(tokens[3].kind, TokenKind::Word("宏站".into()));
    }

    #[test]
    fn test_multi_value_literal_is_one_word() {
        assert_eq!(
            kinds("sw=k1:on&k2:off"),
            vec![
                TokenKind::Word("sw".into()),
                TokenKind::Operator(Comparator::Eq),
                TokenKind::Word("k1:on&k2:off".into()),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = tokenize("a=1 AND b=2").unwrap();
        assert!(tokens[3].is_keyword("and"));
        assert!(tokens[3].is_connective());
        assert!(!tokens[0].is_connective());
    }
}
