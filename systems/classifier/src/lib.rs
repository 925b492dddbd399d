#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static line checker used to highlight learner code as it is typed.
//!
//! The checker is intentionally shallow. It never evaluates anything, so a
//! line such as `move(-2)` is accepted here even though the compiler rejects
//! it once the program runs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Outcome of checking a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The line looks like something the learner dialect accepts.
    Valid,
    /// The line matches no known shape.
    Invalid,
}

/// Named grammar rules, in the order they are tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Nothing left once the comment is stripped.
    Blank,
    /// `turn_left()` or `turn_right()`.
    TurnCall,
    /// `move(n)` with a literal count or a bare name.
    MoveCall,
    /// `say("...")` with a single quoted string.
    SayCall,
    /// `name = 42`.
    IntAssignment,
    /// `for i in range(3):`.
    CountedLoop,
    /// `def hop(n):`.
    FunctionHeader,
    /// Any line starting with one of the command names and a parenthesis.
    CommandPrefix,
}

impl Rule {
    /// Stable rule name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TurnCall => "turn_call",
            Self::MoveCall => "move_call",
            Self::SayCall => "say_call",
            Self::IntAssignment => "int_assignment",
            Self::CountedLoop => "counted_loop",
            Self::FunctionHeader => "function_header",
            Self::CommandPrefix => "command_prefix",
        }
    }
}

fn pattern(rule: Rule, source: &str) -> (Rule, Regex) {
    match Regex::new(source) {
        Ok(regex) => (rule, regex),
        Err(error) => panic!("grammar pattern {} must compile: {error}", rule.name()),
    }
}

static GRAMMAR: Lazy<Vec<(Rule, Regex)>> = Lazy::new(|| {
    vec![
        pattern(Rule::TurnCall, r"^(turn_left|turn_right)\(\)$"),
        pattern(
            Rule::MoveCall,
            r"^move\(\s*([0-9]+|[A-Za-z_][A-Za-z0-9_]*)\s*\)$",
        ),
        pattern(Rule::SayCall, r#"^say\(\s*('.*'|".*")\s*\)$"#),
        pattern(
            Rule::IntAssignment,
            r"^[A-Za-z_][A-Za-z0-9_]*\s*=\s*([0-9]+)\s*$",
        ),
        pattern(
            Rule::CountedLoop,
            r"^for\s+[A-Za-z0-9_]+\s+in\s+range\(\s*[0-9]+\s*\)\s*:\s*$",
        ),
        pattern(
            Rule::FunctionHeader,
            r"^def\s+[A-Za-z_][A-Za-z0-9_]*\(\s*[A-Za-z_][A-Za-z0-9_]*\s*\)\s*:\s*$",
        ),
        pattern(
            Rule::CommandPrefix,
            r"^(move\(|turn_left\(|turn_right\(|say\()",
        ),
    ]
});

/// Drops a trailing `#` comment that is not inside a quoted string.
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let mut open_quote = None;
    for (index, ch) in line.char_indices() {
        match (open_quote, ch) {
            (None, '\'' | '"') => open_quote = Some(ch),
            (Some(quote), _) if ch == quote => open_quote = None,
            (None, '#') => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Finds the first grammar rule matching the line, if any.
#[must_use]
pub fn matching_rule(line: &str) -> Option<Rule> {
    let trimmed = strip_comment(line).trim();
    if trimmed.is_empty() {
        return Some(Rule::Blank);
    }
    GRAMMAR
        .iter()
        .find(|(_, regex)| regex.is_match(trimmed))
        .map(|(rule, _)| *rule)
}

/// Checks a single line.
#[must_use]
pub fn classify(line: &str) -> Verdict {
    match matching_rule(line) {
        Some(_) => Verdict::Valid,
        None => Verdict::Invalid,
    }
}

/// Verdict for one line of a program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineReport {
    /// One-based line number.
    pub number: usize,
    /// Line text as written, without the line terminator.
    pub text: String,
    /// Outcome of the check.
    pub verdict: Verdict,
    /// Rule that accepted the line.
    pub rule: Option<Rule>,
}

/// Checks every line of a program. CRLF line endings are accepted.
#[must_use]
pub fn classify_source(source: &str) -> Vec<LineReport> {
    source
        .replace("\r\n", "\n")
        .split('\n')
        .enumerate()
        .map(|(index, text)| {
            let rule = matching_rule(text);
            LineReport {
                number: index + 1,
                text: text.to_owned(),
                verdict: if rule.is_some() {
                    Verdict::Valid
                } else {
                    Verdict::Invalid
                },
                rule,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_outside_quotes_are_removed() {
        assert_eq!(strip_comment("move(2)  # go"), "move(2)  ");
        assert_eq!(strip_comment("say('#1')"), "say('#1')");
        assert_eq!(strip_comment("say(\"it's\") # x"), "say(\"it's\") ");
        assert_eq!(strip_comment("# only"), "");
    }

    #[test]
    fn every_rule_is_reachable() {
        let cases = [
            ("", Rule::Blank),
            ("   # note", Rule::Blank),
            ("turn_left()", Rule::TurnCall),
            ("move( steps )", Rule::MoveCall),
            ("say(\"hello\")", Rule::SayCall),
            ("x = 5", Rule::IntAssignment),
            ("for i in range(4):", Rule::CountedLoop),
            ("def hop(n):", Rule::FunctionHeader),
            ("move(-2)", Rule::CommandPrefix),
        ];
        for (line, rule) in cases {
            assert_eq!(matching_rule(line), Some(rule), "line {line:?}");
        }
    }

    #[test]
    fn rule_names_are_snake_case() {
        assert_eq!(Rule::IntAssignment.name(), "int_assignment");
        assert_eq!(Rule::CommandPrefix.name(), "command_prefix");
    }

    #[test]
    fn say_requires_matching_quotes() {
        assert_eq!(matching_rule("say('hi\")"), Some(Rule::CommandPrefix));
        assert_eq!(classify("shout('hi')"), Verdict::Invalid);
    }
}
