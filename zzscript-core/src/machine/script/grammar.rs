//! Statement grammar.
//!
//! Built once from matchers and reused for every parse. Each statement
//! rule is a sequence starting with its keyword, so a line that gets past
//! the keyword but fails later is reported right where it went wrong.

use crate::machine::cmd::{self, ext, flow, print, set, Command};
use crate::machine::parse::{Assembly, Matcher};
use crate::machine::{Error, Result};
use crate::token::{Token, TokenKind};

use super::{Label, Node};

/// Minimum similarity for a keyword to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Script language grammar.
pub struct Grammar {
    root: Matcher,
    keywords: Vec<&'static str>,
    case_sensitive: bool,
}

impl Default for Grammar {
    fn default() -> Self {
        Grammar::new(false)
    }
}

impl Grammar {
    /// Creates the grammar. With case-sensitive keywords only the
    /// lower-case spelling is accepted.
    pub fn new(case_sensitive: bool) -> Grammar {
        let kw = |text: &str| -> Matcher {
            if case_sensitive {
                Matcher::literal_case_sensitive(text).discard()
            } else {
                Matcher::literal(text).discard()
            }
        };
        let eol = || Matcher::newline().discard();

        let label = Matcher::sequence(vec![Matcher::literal(":").discard(), Matcher::word(), eol()])
            .with_action(|a: &mut Assembly| {
                let name = a.pop_token()?;
                a.push(Node::Label(Label::new(&name.value)));
                Ok(())
            });

        // `<keyword> <number> <word>`
        let counter = |name: &str, build: fn(&Token, &Token) -> Result<Command>| {
            Matcher::sequence(vec![kw(name), Matcher::number(), Matcher::word(), eol()])
                .with_action(move |a: &mut Assembly| {
                    let target = a.pop_token()?;
                    let value = a.pop_token()?;
                    a.push(Node::Command(build(&value, &target)?));
                    Ok(())
                })
        };
        // `<keyword> <single argument>`
        let unary = |name: &str, arg: Matcher, build: fn(&Token) -> Result<Command>| {
            Matcher::sequence(vec![kw(name), arg, eol()]).with_action(move |a: &mut Assembly| {
                let token = a.pop_token()?;
                a.push(Node::Command(build(&token)?));
                Ok(())
            })
        };
        // `<keyword>`
        let bare = |name: &str, command: Command| {
            Matcher::sequence(vec![kw(name), eol()]).with_action(move |a: &mut Assembly| {
                a.push(Node::Command(command.clone()));
                Ok(())
            })
        };

        let take = Matcher::sequence(vec![
            kw(set::TAKE_COMMAND_NAMES[0]),
            Matcher::number(),
            Matcher::word(),
            Matcher::optional(Matcher::word()),
            eol(),
        ])
        .with_action(|a: &mut Assembly| {
            let last = a.pop_token()?;
            let second = a.pop_token()?;
            let command = if second.is(TokenKind::Number) {
                set::Take::new(&second, &last, None)?
            } else {
                let amount = a.pop_token()?;
                set::Take::new(&amount, &second, Some(&last))?
            };
            a.push(Node::Command(command));
            Ok(())
        });

        let comparison = Matcher::alternation(
            flow::ifelse::COMPARISON_SYMBOLS
                .iter()
                .map(|symbol| Matcher::literal(symbol))
                .collect(),
        );
        let if_ = Matcher::sequence(vec![
            kw(flow::ifelse::COMMAND_NAMES[0]),
            Matcher::word(),
            comparison,
            Matcher::number(),
            Matcher::optional(kw("then")),
            Matcher::word(),
            eol(),
        ])
        .with_action(|a: &mut Assembly| {
            let label = a.pop_token()?;
            let value = a.pop_token()?;
            let comparison = a.pop_token()?;
            let target = a.pop_token()?;
            a.push(Node::Command(flow::ifelse::If::new(
                &target,
                &comparison,
                &value,
                &label,
            )?));
            Ok(())
        });

        let argument = Matcher::alternation(vec![
            Matcher::word(),
            Matcher::number(),
            Matcher::string(),
        ]);
        let extern_ = Matcher::sequence(vec![
            Matcher::literal("#").discard(),
            Matcher::word(),
            Matcher::repetition(argument),
            eol(),
        ])
        .with_action(|a: &mut Assembly| {
            // statements below on the stack are already turned into nodes
            let mut tokens = Vec::new();
            while let Some(token) = a.pop_token_if_present() {
                tokens.push(token);
            }
            tokens.reverse();
            let (name, args) = match tokens.split_first() {
                Some(split) => split,
                None => return Err(Error::internal("extern command without a name")),
            };
            a.push(Node::Command(ext::Extern::new(name, args)?));
            Ok(())
        });

        let statement = Matcher::alternation(vec![
            label,
            counter(set::SET_COMMAND_NAMES[0], set::Set::new),
            counter(set::GIVE_COMMAND_NAMES[0], set::Give::new),
            take,
            unary(set::CLEAR_COMMAND_NAMES[0], Matcher::word(), set::Clear::new),
            if_,
            unary(flow::SEND_COMMAND_NAMES[0], Matcher::word(), flow::Send::new),
            unary(flow::ZAP_COMMAND_NAMES[0], Matcher::word(), flow::Zap::new),
            unary(
                flow::RESTORE_COMMAND_NAMES[0],
                Matcher::word(),
                flow::Restore::new,
            ),
            unary(flow::WAIT_COMMAND_NAMES[0], Matcher::number(), flow::Wait::new),
            unary(print::COMMAND_NAMES[0], Matcher::string(), print::Say::new),
            bare(
                ext::LOCK_COMMAND_NAMES[0],
                ext::Lock::new(true),
            ),
            bare(
                ext::UNLOCK_COMMAND_NAMES[0],
                ext::Lock::new(false),
            ),
            bare(flow::IDLE_COMMAND_NAMES[0], Command::Idle),
            bare(flow::RESTART_COMMAND_NAMES[0], Command::Restart),
            bare(flow::END_COMMAND_NAMES[0], Command::End),
            extern_,
            // blank line
            eol(),
        ]);

        Grammar {
            root: Matcher::repetition(statement),
            keywords: cmd::keywords(),
            case_sensitive,
        }
    }

    /// Matcher for a whole script.
    pub fn root(&self) -> &Matcher {
        &self.root
    }

    pub fn keywords(&self) -> &[&'static str] {
        &self.keywords
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Finds the keyword closest to a misspelled word.
    pub fn suggest(&self, word: &str) -> Option<&'static str> {
        let word = word.to_lowercase();
        if self.keywords.iter().any(|k| *k == word) {
            return None;
        }
        let mut best: Option<(&'static str, f64)> = None;
        for keyword in &self.keywords {
            let score = strsim::jaro_winkler(&word, keyword);
            if score < SUGGESTION_THRESHOLD {
                continue;
            }
            match best {
                Some((_, top)) if top >= score => (),
                _ => best = Some((*keyword, score)),
            }
        }
        best.map(|(keyword, _)| keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::machine::parse::complete_match;

    fn parse(grammar: &Grammar, source: &str) -> Result<Vec<Node>> {
        let assembly = complete_match(grammar.root(), tokenize(source)?)?;
        Ok(assembly.stack().to_vec())
    }

    fn commands(source: &str) -> Vec<Command> {
        parse(&Grammar::default(), source)
            .unwrap()
            .into_iter()
            .filter_map(|node| match node {
                Node::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn statements_become_nodes() {
        let nodes = parse(
            &Grammar::default(),
            ":Start\n\nset 1 counter\nSAY \"hi\"\nidle\n",
        )
        .unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0], Node::Label(Label::new("start")));
        match &nodes[1] {
            Node::Command(Command::Set(set)) => assert_eq!(set.target, "counter"),
            other => panic!("unexpected node: {:?}", other),
        }
    }

    #[test]
    fn take_with_and_without_label() {
        let cmds = commands("Take 2 gems\nTake 3 gems broke\n");
        assert_eq!(
            cmds[0],
            Command::Take(set::Take {
                amount: crate::var::Var::Int(2),
                target: "gems".to_string(),
                otherwise: None,
            })
        );
        match &cmds[1] {
            Command::Take(take) => assert_eq!(take.otherwise.as_deref(), Some("broke")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn if_with_optional_then() {
        let cmds = commands("If gems >= 3 then rich\nIf gems != 0 poor\n");
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            Command::If(cond) => {
                assert_eq!(cond.comparison, flow::ifelse::Comparison::GreaterOrEqual);
                assert_eq!(cond.label, "rich");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        match &cmds[1] {
            Command::If(cond) => assert_eq!(cond.label, "poor"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn extern_collects_arguments() {
        let cmds = commands("#walk north 2 \"fast\"\n#beep\n");
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            Command::Extern(ext) => {
                assert_eq!(ext.name, "walk");
                assert_eq!(ext.args.len(), 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        match &cmds[1] {
            Command::Extern(ext) => assert!(ext.args.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn lock_and_unlock() {
        let cmds = commands("Lock\nUnlock\n");
        assert_eq!(cmds, vec![ext::Lock::new(true), ext::Lock::new(false)]);
    }

    #[test]
    fn case_sensitive_keywords() {
        let grammar = Grammar::new(true);
        assert!(parse(&grammar, "idle\n").is_ok());
        assert!(parse(&grammar, "Idle\n").is_err());
    }

    #[test]
    fn suggestions() {
        let grammar = Grammar::default();
        assert_eq!(grammar.suggest("Sett"), Some("set"));
        assert_eq!(grammar.suggest("restor"), Some("restore"));
        assert_eq!(grammar.suggest("set"), None);
        assert_eq!(grammar.suggest("xyzzy"), None);
    }
}
