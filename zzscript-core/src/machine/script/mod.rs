//! Script compiler.
//!
//! Scripts follow the way the *machine* handles logic quite closely, one
//! line is one statement. A statement is either a label or a command.
//!
//! ```text
//! ' comments start with an apostrophe
//! :start
//! Set 3 gems
//! :loop
//! Take 1 gems broke
//! Say "one gem less"
//! Send loop
//! :broke
//! #beep 440 "short"
//! End
//! ```
//!
//! Labels (`:name`) are jump targets. They never become commands, instead
//! each label is recorded at the position of the command that follows it.
//! The same label name can appear more than once, all occurrences are kept in
//! source order and `Zap`/`Restore` pick between them at runtime. Label names
//! and heap keys are case-insensitive.
//!
//! Lines starting with `#` are external commands, their name and arguments
//! are handed over to the script owner verbatim.
//!
//! Compilation result is a [`Script`], a flat list of commands plus a table
//! mapping label names to command positions. Scripts are immutable once
//! compiled, and are usually shared between entities behind an `Arc`.

pub mod grammar;

pub use grammar::Grammar;

use std::path::Path;

use fnv::FnvHashMap;

use crate::lexer::tokenize;
use crate::machine::cmd::Command;
use crate::machine::error::{Error, ErrorKind, Result};
use crate::machine::parse::complete_match;
use crate::token::Token;

/// Label marker as produced by the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: &str) -> Label {
        Label {
            name: name.to_lowercase(),
        }
    }
}

/// Semantic value living on a parse stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Raw token pushed by a terminal, waiting to be assembled
    Token(Token),
    Label(Label),
    Command(Command),
}

/// Compiled script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub source: String,
    pub commands: Vec<Command>,
    /// Command positions for each label name, in source order
    pub label_indices: FnvHashMap<String, Vec<usize>>,
}

impl Script {
    /// Compiles script text using the default grammar.
    pub fn compile(name: &str, source: &str) -> Result<Script> {
        Script::compile_with(name, source, &Grammar::default())
    }

    pub fn compile_with(name: &str, source: &str, grammar: &Grammar) -> Result<Script> {
        let tokens = tokenize(source).map_err(|e| e.with_source(name))?;
        Script::compile_tokens(name, source, tokens, grammar)
    }

    /// Compiles an already tokenized script. The token list needs to end with
    /// a new line.
    pub fn compile_tokens(
        name: &str,
        source: &str,
        tokens: Vec<Token>,
        grammar: &Grammar,
    ) -> Result<Script> {
        let assembly = complete_match(grammar.root(), tokens)
            .map_err(|e| with_suggestion(e, grammar).with_source(name))?;
        let (commands, label_indices) =
            linearize(assembly.stack().to_vec()).map_err(|e| e.with_source(name))?;
        debug!(
            "compiled script {}: {} commands, {} labels",
            name,
            commands.len(),
            label_indices.len()
        );
        Ok(Script {
            name: name.to_string(),
            source: source.to_string(),
            commands,
            label_indices,
        })
    }

    /// Reads and compiles a script file, naming the script after the file.
    pub fn from_file(path: &Path, grammar: &Grammar) -> crate::Result<Script> {
        let source = crate::util::read_text_file(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("script");
        Ok(Script::compile_with(name, &source, grammar)?)
    }

    /// All positions of the given label.
    pub fn label_positions(&self, name: &str) -> Option<&[usize]> {
        self.label_indices
            .get(&name.to_lowercase())
            .map(|v| v.as_slice())
    }

    /// Label names in order of their first position.
    pub fn label_names(&self) -> Vec<&str> {
        let mut names: Vec<(&str, usize)> = self
            .label_indices
            .iter()
            .map(|(name, positions)| (name.as_str(), positions.first().cloned().unwrap_or(0)))
            .collect();
        names.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        names.into_iter().map(|(name, _)| name).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Splits parsed statements into the command list and the label table.
///
/// A label points at the next command to be appended, so a label closing
/// the script points one past the last command.
pub fn linearize(elements: Vec<Node>) -> Result<(Vec<Command>, FnvHashMap<String, Vec<usize>>)> {
    let mut commands = Vec::new();
    let mut label_indices: FnvHashMap<String, Vec<usize>> = FnvHashMap::default();
    for element in elements {
        match element {
            Node::Label(label) => label_indices
                .entry(label.name)
                .or_insert_with(Vec::new)
                .push(commands.len()),
            Node::Command(command) => commands.push(command),
            Node::Token(token) => {
                return Err(Error::internal(format!(
                    "unassembled token left on the stack: {:?}",
                    token
                )))
            }
        }
    }
    Ok((commands, label_indices))
}

fn with_suggestion(error: Error, grammar: &Grammar) -> Error {
    let suggestion = match error.kind() {
        ErrorKind::UnexpectedToken { found, .. } => grammar.suggest(found),
        _ => None,
    };
    match suggestion {
        Some(keyword) => error.with_hint(keyword.to_string()),
        None => error,
    }
}
