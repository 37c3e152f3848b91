//! Code Highlighting
//!
//! A static lexical rule table keyed by language. This is deliberately a
//! line-oriented approximation: keywords, strings, comments and numbers
//! get a color, everything else renders in the code default. Languages
//! missing from the table highlight nothing, which the compiler treats
//! as non-fatal.

use crate::block::StyledSpan;
use crate::config::{Theme, TokenClass};

/// Lexical rules for one language.
pub struct LangRules {
    keywords: &'static [&'static str],
    line_comment: &'static [&'static str],
    string_delims: &'static [char],
}

/// Look up rules by fence language tag, including common aliases.
pub fn language_rules(language: &str) -> Option<&'static LangRules> {
    match language {
        "rust" | "rs" => Some(&RUST),
        "python" | "py" => Some(&PYTHON),
        "javascript" | "js" | "node" => Some(&JAVASCRIPT),
        "sh" | "bash" | "shell" | "zsh" => Some(&SHELL),
        "go" | "golang" => Some(&GO),
        "ruby" | "rb" => Some(&RUBY),
        _ => None,
    }
}

static RUST: LangRules = LangRules {
    keywords: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "trait", "true", "type",
        "unsafe", "use", "where", "while",
    ],
    line_comment: &["//"],
    string_delims: &['"'],
};

static PYTHON: LangRules = LangRules {
    keywords: &[
        "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
        "elif", "else", "except", "False", "finally", "for", "from", "global", "if", "import",
        "in", "is", "lambda", "None", "not", "or", "pass", "print", "raise", "return", "True",
        "try", "while", "with", "yield",
    ],
    line_comment: &["#"],
    string_delims: &['"', '\''],
};

static JAVASCRIPT: LangRules = LangRules {
    keywords: &[
        "async", "await", "break", "case", "catch", "class", "const", "continue", "default",
        "delete", "else", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "let", "new", "null", "of", "return", "static", "switch",
        "this", "throw", "true", "try", "typeof", "undefined", "var", "while", "yield",
    ],
    line_comment: &["//"],
    string_delims: &['"', '\'', '`'],
};

static SHELL: LangRules = LangRules {
    keywords: &[
        "case", "do", "done", "echo", "elif", "else", "esac", "exit", "export", "fi", "for",
        "function", "if", "in", "local", "read", "return", "then", "until", "while",
    ],
    line_comment: &["#"],
    string_delims: &['"', '\''],
};

static GO: LangRules = LangRules {
    keywords: &[
        "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
        "false", "for", "func", "go", "goto", "if", "import", "interface", "map", "nil",
        "package", "range", "return", "select", "struct", "switch", "true", "type", "var",
    ],
    line_comment: &["//"],
    string_delims: &['"', '`'],
};

static RUBY: LangRules = LangRules {
    keywords: &[
        "begin", "break", "case", "class", "def", "do", "else", "elsif", "end", "ensure",
        "false", "if", "in", "module", "next", "nil", "not", "or", "puts", "raise", "rescue",
        "return", "self", "then", "true", "unless", "until", "when", "while", "yield",
    ],
    line_comment: &["#"],
    string_delims: &['"', '\''],
};

/// Classify one line of code into `(text, token class)` runs.
///
/// Strings and comments never span lines; a string left open at the end
/// of a line simply colors the rest of that line.
pub fn classify_line<'a>(line: &'a str, rules: &LangRules) -> Vec<(&'a str, TokenClass)> {
    let mut runs = Vec::new();
    let mut rest = line;

    'outer: while !rest.is_empty() {
        for marker in rules.line_comment {
            if rest.starts_with(marker) {
                runs.push((rest, TokenClass::Comment));
                break 'outer;
            }
        }

        let Some(c) = rest.chars().next() else {
            break;
        };

        if rules.string_delims.contains(&c) {
            let len = match rest[c.len_utf8()..].find(c) {
                Some(i) => c.len_utf8() + i + c.len_utf8(),
                None => rest.len(),
            };
            runs.push((&rest[..len], TokenClass::StringLit));
            rest = &rest[len..];
        } else if c.is_ascii_digit() {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '.' || ch == '_'))
                .unwrap_or(rest.len());
            runs.push((&rest[..len], TokenClass::Number));
            rest = &rest[len..];
        } else if c.is_alphabetic() || c == '_' {
            let len = rest
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                .unwrap_or(rest.len());
            let word = &rest[..len];
            let class = if rules.keywords.contains(&word) {
                TokenClass::Keyword
            } else {
                TokenClass::Ident
            };
            runs.push((word, class));
            rest = &rest[len..];
        } else {
            // Punctuation and whitespace: batch everything up to the next
            // token start so spans stay coarse.
            let len = rest
                .find(|ch: char| {
                    ch.is_alphanumeric()
                        || ch == '_'
                        || rules.string_delims.contains(&ch)
                        || rules.line_comment.iter().any(|m| m.starts_with(ch))
                })
                .unwrap_or(rest.len())
                .max(c.len_utf8());
            runs.push((&rest[..len], TokenClass::Default));
            rest = &rest[len..];
        }
    }

    runs
}

/// Highlight one line into styled spans using the theme's token colors.
/// Unknown languages produce a single span in the code default color.
pub fn highlight_line(line: &str, language: Option<&str>, theme: &Theme) -> Vec<StyledSpan> {
    let rules = language.and_then(language_rules);
    match rules {
        Some(rules) => classify_line(line, rules)
            .into_iter()
            .map(|(text, class)| StyledSpan::plain(text).with_fg(theme.token(class)))
            .collect(),
        None => vec![StyledSpan::plain(line).with_fg(theme.code_fg)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(line: &str, lang: &str) -> Vec<(String, TokenClass)> {
        classify_line(line, language_rules(lang).unwrap())
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect()
    }

    #[test]
    fn keywords_and_idents_are_distinguished() {
        let runs = classes("let total = 0", "rust");
        assert_eq!(runs[0], ("let".into(), TokenClass::Keyword));
        assert!(runs.contains(&("total".into(), TokenClass::Ident)));
        assert!(runs.contains(&("0".into(), TokenClass::Number)));
    }

    #[test]
    fn comment_swallows_rest_of_line() {
        let runs = classes("x = 1  # the answer", "python");
        assert_eq!(runs.last().unwrap().1, TokenClass::Comment);
        assert!(runs.last().unwrap().0.starts_with('#'));
    }

    #[test]
    fn string_literals_stop_at_closing_delimiter() {
        let runs = classes("print(\"2+2\")", "python");
        assert!(runs.contains(&("\"2+2\"".into(), TokenClass::StringLit)));
    }

    #[test]
    fn unterminated_string_colors_to_end_of_line() {
        let runs = classes("s = \"oops", "python");
        assert_eq!(runs.last().unwrap(), &("\"oops".into(), TokenClass::StringLit));
    }

    #[test]
    fn unknown_language_is_a_single_default_span() {
        let theme = Theme::dark();
        let spans = highlight_line("whatever ???", Some("brainfuck"), &theme);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].fg, Some(theme.code_fg));
    }

    #[test]
    fn classification_is_lossless() {
        let line = "for i in range(10):  # loop";
        let joined: String = classes(line, "python").into_iter().map(|(t, _)| t).collect();
        assert_eq!(joined, line);
    }
}
