//! Parse state shared between matchers.

use std::fmt;
use std::rc::Rc;

use crate::machine::error::{Error, Result};
use crate::machine::script::Node;
use crate::token::Token;

/// Persistent stack of semantic values.
///
/// Frames are shared between clones, so cloning is constant time and a push
/// or pop on one clone is never visible through another.
#[derive(Clone, Default)]
pub struct Stack {
    head: Option<Rc<Frame>>,
    len: usize,
}

struct Frame {
    value: Node,
    next: Option<Rc<Frame>>,
}

impl Stack {
    pub fn push(&mut self, value: Node) {
        let next = self.head.take();
        self.head = Some(Rc::new(Frame { value, next }));
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<Node> {
        let frame = self.head.take()?;
        self.len -= 1;
        match Rc::try_unwrap(frame) {
            Ok(frame) => {
                self.head = frame.next;
                Some(frame.value)
            }
            Err(shared) => {
                self.head = shared.next.clone();
                Some(shared.value.clone())
            }
        }
    }

    pub fn peek(&self) -> Option<&Node> {
        self.head.as_ref().map(|frame| &frame.value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns stack contents, bottom first.
    pub fn to_vec(&self) -> Vec<Node> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head.as_ref();
        while let Some(frame) = cursor {
            out.push(frame.value.clone());
            cursor = frame.next.as_ref();
        }
        out.reverse();
        out
    }
}

impl Drop for Stack {
    // unlink uniquely owned frames one by one, long chains would otherwise
    // be dropped recursively
    fn drop(&mut self) {
        let mut cursor = self.head.take();
        while let Some(frame) = cursor {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => cursor = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

/// Mutable parse state: a cursor into a shared token list plus a stack of
/// semantic values.
#[derive(Clone, Debug)]
pub struct Assembly {
    tokens: Rc<[Token]>,
    cursor: usize,
    stack: Stack,
}

impl Assembly {
    pub fn new(tokens: Rc<[Token]>) -> Self {
        Assembly {
            tokens,
            cursor: 0,
            stack: Stack::default(),
        }
    }

    /// Token at the cursor.
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// Last consumed token.
    pub fn previous(&self) -> Option<&Token> {
        self.cursor
            .checked_sub(1)
            .and_then(|n| self.tokens.get(n))
    }

    /// Consumes the token at the cursor.
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(token)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.cursor == self.tokens.len()
    }

    pub fn push(&mut self, value: Node) {
        self.stack.push(value)
    }

    pub fn pop(&mut self) -> Option<Node> {
        self.stack.pop()
    }

    pub fn peek(&self) -> Option<&Node> {
        self.stack.peek()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Pops a raw token pushed by a terminal matcher.
    pub fn pop_token(&mut self) -> Result<Token> {
        match self.pop() {
            Some(Node::Token(token)) => Ok(token),
            other => Err(Error::internal(format!(
                "expected token on the stack, found: {:?}",
                other
            ))),
        }
    }

    /// Pops a token if the top of the stack holds one.
    pub fn pop_token_if_present(&mut self) -> Option<Token> {
        match self.peek() {
            Some(Node::Token(_)) => self.pop_token().ok(),
            _ => None,
        }
    }

    /// Builds an error pointing at the current token.
    pub fn unexpected(&self) -> Error {
        Error::unexpected(self.current(), self.previous())
    }
}
