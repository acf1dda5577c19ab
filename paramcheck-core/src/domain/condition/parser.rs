// paramcheck-core/src/domain/condition/parser.rs
//
// Grammar, lowest to highest precedence:
//   expr       := and_expr ("or" and_expr)*
//   and_expr   := primary ("and" primary)*
//   primary    := "(" expr ")" | comparison
//   comparison := WORD OPERATOR WORD

use crate::domain::condition::ast::ConditionNode;
use crate::domain::condition::lexer::{Token, TokenKind, tokenize};
use crate::domain::error::DomainError;
use crate::domain::value::ParameterValue;

/// Parses a condition expression into its syntax tree.
pub fn parse(text: &str) -> Result<ConditionNode, DomainError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
    };

    let node = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        let expected = match token.kind {
            TokenKind::RParen => "end of expression (unmatched ')')",
            _ => "'and', 'or' or end of expression",
        };
        return Err(parser.error_at(token.offset, expected));
    }
    Ok(node)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, position: usize, expected: &str) -> DomainError {
        DomainError::syntax(self.text, position, expected)
    }

    fn error_here(&self, expected: &str) -> DomainError {
        let position = self.peek().map_or(self.text.len(), |t| t.offset);
        self.error_at(position, expected)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn parse_or(&mut self) -> Result<ConditionNode, DomainError> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = ConditionNode::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ConditionNode, DomainError> {
        let mut left = self.parse_primary()?;
        while self.eat_keyword("and") {
            let right = self.parse_primary()?;
            left = ConditionNode::and(left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<ConditionNode, DomainError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("condition"));
        };

        match &token.kind {
            TokenKind::LParen => {
                let open = token.offset;
                self.advance();
                let inner = self.parse_or()?;
                match self.peek() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some(_) => Err(self.error_here("')'")),
                    None => Err(self.error_at(
                        self.text.len(),
                        &format!("')' closing the '(' at position {}", open),
                    )),
                }
            }
            TokenKind::Word(_) => {
                // A connective where an operand belongs: `a=1 and and b=2`, `or a=1`.
                let next_is_operator = matches!(
                    self.peek_at(1).map(|t| &t.kind),
                    Some(TokenKind::Operator(_))
                );
                if token.is_connective() && !next_is_operator {
                    return Err(self.error_here("condition"));
                }
                self.parse_comparison()
            }
            TokenKind::RParen => Err(self.error_here("condition")),
            TokenKind::Operator(_) => Err(self.error_here("parameter name")),
        }
    }

    fn parse_comparison(&mut self) -> Result<ConditionNode, DomainError> {
        let param = match self.advance() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => word,
            _ => return Err(self.error_here("parameter name")),
        };

        let operator = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Operator(op)) => *op,
            _ => return Err(self.error_here("comparison operator")),
        };
        self.advance();

        let literal = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Word(word)) => ParameterValue::classify(word)?,
            _ => return Err(self.error_here("literal value")),
        };
        self.advance();

        Ok(ConditionNode::Comparison {
            param,
            operator,
            literal,
        })
    }
}
