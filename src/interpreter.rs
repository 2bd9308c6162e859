// Interpreter that turns declarations into shell commands

use std::borrow::Cow;
use std::collections::HashMap;

use uuid::Uuid;

use crate::config::Settings;
use crate::cursor::Cursor;
use crate::error::{ParseError, SyntaxError, SyntaxErrorKind};
use crate::token::{TokenKind, TokenSource};
use crate::tokenizer::Tokenizer;

/// The result of interpreting one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Shell commands in declaration order.
    pub commands: Vec<String>,
    /// Variable bindings left at the end of the script.
    pub variables: HashMap<String, String>,
}

pub struct Interpreter<'s, S> {
    cursor: Cursor<S>,
    filename: String,
    settings: &'s Settings,
    variables: HashMap<String, String>,
    commands: Vec<String>,
}

impl<'s, S: TokenSource> Interpreter<'s, S> {
    pub fn new(
        filename: impl Into<String>,
        source: S,
        settings: &'s Settings,
    ) -> Result<Self, ParseError> {
        let filename = filename.into();
        let cursor = Cursor::new(source).map_err(|e| ParseError::from_syntax(&filename, e))?;
        Ok(Self {
            cursor,
            filename,
            settings,
            variables: HashMap::new(),
            commands: Vec::new(),
        })
    }

    /// Interprets the whole script. Nothing is returned unless every
    /// declaration and the trailer are valid.
    pub fn run(mut self) -> Result<Program, ParseError> {
        self.declarations()
            .map_err(|e| ParseError::from_syntax(&self.filename, e))?;
        Ok(Program {
            commands: self.commands,
            variables: self.variables,
        })
    }

    fn declarations(&mut self) -> Result<(), SyntaxError> {
        loop {
            match self.cursor.peek_kind()? {
                TokenKind::Clone => self.clone_decl()?,
                TokenKind::Run => self.run_decl()?,
                TokenKind::Extract => self.extract_decl()?,
                TokenKind::Set => self.set_decl()?,
                _ => break,
            }
        }
        self.cursor.allow(TokenKind::Semicolon)?;
        self.cursor.expect(TokenKind::EndOfInput)?;
        Ok(())
    }

    /// `clone <string> [as <string>]`
    fn clone_decl(&mut self) -> Result<(), SyntaxError> {
        self.cursor.advance()?;
        let target = self.cursor.expect(TokenKind::String)?;

        let url = format!("https://{}", target.text);
        let root = self.settings.staging_root.display().to_string();
        let staging = self
            .settings
            .staging_root
            .join(format!("watch-{}", Uuid::new_v4().simple()))
            .display()
            .to_string();

        let clone = match url.split('@').collect::<Vec<_>>().as_slice() {
            [repo, branch] => format!(
                "git clone --depth=1 {} {} --branch {}",
                repo,
                shell_quote(&staging),
                branch
            ),
            _ => format!("git clone --depth=1 {} {}", url, shell_quote(&staging)),
        };

        if self.cursor.allow(TokenKind::As)? {
            let name = self.cursor.expect(TokenKind::String)?;
            log::debug!("bind {} = {}", name.text, staging);
            self.variables.insert(name.text, staging);
        }

        self.push(format!("cd {} && {}", shell_quote(&root), clone));
        Ok(())
    }

    /// `run <string>`
    fn run_decl(&mut self) -> Result<(), SyntaxError> {
        self.cursor.advance()?;
        let command = self.cursor.expect(TokenKind::String)?;
        let command = self.substitute(&command.text);
        self.push(command);
        Ok(())
    }

    /// `extract "<source> <destination>"`
    fn extract_decl(&mut self) -> Result<(), SyntaxError> {
        self.cursor.advance()?;
        let arg = self.cursor.expect(TokenKind::String)?;
        let arg = self.substitute(&arg.text);

        let parts: Vec<&str> = arg.split(' ').collect();
        let [source, destination] = parts.as_slice() else {
            return Err(self.argument_error(SyntaxErrorKind::ExtractArguments(parts.len())));
        };

        let destination = match destination.strip_prefix('.') {
            Some(rest) => format!("{}{}", self.settings.working_dir.display(), rest),
            None => destination.to_string(),
        };

        self.push(format!("mv {} {}", source, destination));
        Ok(())
    }

    /// `set "<name>=<value>"`
    fn set_decl(&mut self) -> Result<(), SyntaxError> {
        self.cursor.advance()?;
        let arg = self.cursor.expect(TokenKind::String)?;
        let arg = self.substitute(&arg.text);

        let parts: Vec<&str> = arg.split('=').collect();
        let [name, value] = parts.as_slice() else {
            return Err(self.argument_error(SyntaxErrorKind::SetArguments(parts.len())));
        };

        log::debug!("bind {} = {}", name, value);
        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn push(&mut self, command: String) {
        log::debug!("command: {}", command);
        self.commands.push(command);
    }

    /// Positioned at the string literal the bad argument came from.
    fn argument_error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        let position = self
            .cursor
            .previous()
            .map(|token| token.position)
            .unwrap_or_else(|| self.cursor.current().position);
        SyntaxError::new(position, kind)
    }

    fn substitute(&self, text: &str) -> String {
        substitute(text, &self.variables)
    }
}

/// Replaces each `$[name]` with its bound value in a single pass.
/// Substituted values are not scanned again and unbound names stay as written.
pub fn substitute(text: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("$[") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find(']') else {
            rest = &rest[start..];
            break;
        };
        match variables.get(&after[..end]) {
            Some(value) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                // A later `$[` may still start a bound reference.
                out.push_str("$[");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Single-quotes `path` for the shell unless it is made of safe characters only.
fn shell_quote(path: &str) -> Cow<'_, str> {
    let safe = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@%,=".contains(c));
    if safe {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("'{}'", path.replace('\'', r"'\''")))
    }
}

/// Interprets `source` and returns its command list.
pub fn parse_script(
    filename: &str,
    source: &str,
    settings: &Settings,
) -> Result<Vec<String>, ParseError> {
    let program = Interpreter::new(filename, Tokenizer::new(source), settings)?.run()?;
    Ok(program.commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Position;

    fn settings() -> Settings {
        Settings::new("/tmp", "/work")
    }

    fn interpret(source: &str) -> Result<Program, ParseError> {
        let settings = settings();
        Interpreter::new("Watchfile", Tokenizer::new(source), &settings)?.run()
    }

    fn commands(source: &str) -> Vec<String> {
        interpret(source).unwrap().commands
    }

    /// Pulls the generated staging path out of a clone command.
    fn staging_path(command: &str) -> &str {
        command
            .split(' ')
            .find(|part| part.starts_with("/tmp/watch-"))
            .unwrap()
    }

    #[test]
    fn test_set_only_binds_last_value() {
        let program = interpret(
            r#"
set "A=1"
set "B=2"
set "A=3"
"#,
        )
        .unwrap();
        assert!(program.commands.is_empty());
        assert_eq!(program.variables.len(), 2);
        assert_eq!(program.variables["A"], "3");
        assert_eq!(program.variables["B"], "2");
    }

    #[test]
    fn test_run_substitutes_earlier_bindings_only() {
        let cmds = commands(
            r#"
run "echo $[A]"
set "A=1"
run "echo $[A]"
set "A=2"
"#,
        );
        assert_eq!(cmds, vec!["echo $[A]", "echo 1"]);
    }

    #[test]
    fn test_run_is_verbatim() {
        let cmds = commands(r#"run "cat a.txt | grep 'x y' > out && echo done""#);
        assert_eq!(cmds, vec!["cat a.txt | grep 'x y' > out && echo done"]);
    }

    #[test]
    fn test_clone_default_branch() {
        let cmds = commands(r#"clone "github.com/x/y""#);
        assert_eq!(cmds.len(), 1);
        let staging = staging_path(&cmds[0]);
        assert_eq!(
            cmds[0],
            format!(
                "cd /tmp && git clone --depth=1 https://github.com/x/y {}",
                staging
            )
        );
        assert!(!cmds[0].contains("--branch"));
    }

    #[test]
    fn test_clone_explicit_ref() {
        let cmds = commands(r#"clone "github.com/x/y@dev""#);
        let staging = staging_path(&cmds[0]);
        assert_eq!(
            cmds[0],
            format!(
                "cd /tmp && git clone --depth=1 https://github.com/x/y {} --branch dev",
                staging
            )
        );
    }

    #[test]
    fn test_clone_with_two_ats_keeps_literal() {
        let cmds = commands(r#"clone "host/a@b@c""#);
        assert!(cmds[0].contains("https://host/a@b@c"));
        assert!(!cmds[0].contains("--branch"));
    }

    #[test]
    fn test_clone_as_binds_staging_path() {
        let program = interpret(
            r#"
clone "host/repo" as "r"
run "build $[r]"
"#,
        )
        .unwrap();
        let staging = staging_path(&program.commands[0]).to_string();
        assert_eq!(program.variables["r"], staging);
        assert_eq!(program.commands[1], format!("build {}", staging));
    }

    #[test]
    fn test_clone_paths_are_unique() {
        let cmds = commands(
            r#"
clone "host/a"
clone "host/a"
"#,
        );
        assert_ne!(staging_path(&cmds[0]), staging_path(&cmds[1]));
    }

    #[test]
    fn test_extract_rewrites_leading_dot() {
        assert_eq!(
            commands(r#"extract "a.txt ./out.txt""#),
            vec!["mv a.txt /work/out.txt"]
        );
        assert_eq!(
            commands(r#"extract "a.txt b.txt""#),
            vec!["mv a.txt b.txt"]
        );
    }

    #[test]
    fn test_extract_substitutes_before_split() {
        let cmds = commands(
            r#"
set "SRC=build/lib.so"
extract "$[SRC] ./lib"
"#,
        );
        assert_eq!(cmds, vec!["mv build/lib.so /work/lib"]);
    }

    #[test]
    fn test_extract_wrong_argument_count() {
        let err = interpret(r#"extract "a b c""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExtractArguments(3));
        assert_eq!(err.position, Position::new(1, 9));
        assert_eq!(
            err.to_string(),
            "Watchfile(1:9) expected two arguments but got 3"
        );

        let err = interpret(r#"extract "a""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExtractArguments(1));

        // Only single spaces separate arguments.
        let err = interpret(r#"extract "a  b""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExtractArguments(3));
    }

    #[test]
    fn test_set_wrong_segment_count() {
        let err = interpret(r#"set "A""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::SetArguments(1));

        let err = interpret(r#"set "A=1=2""#).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::SetArguments(3));
        assert_eq!(
            err.to_string(),
            "Watchfile(1:5) expected two arguments separated by '=' but got 3"
        );
    }

    #[test]
    fn test_trailing_semicolon() {
        assert_eq!(commands("run \"make\";"), vec!["make"]);
        assert_eq!(commands(";"), Vec::<String>::new());
        assert_eq!(commands(""), Vec::<String>::new());
    }

    #[test]
    fn test_unknown_keyword_fails_at_trailer() {
        let err = interpret(r#"fetch "x""#).unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::EndOfInput,
                found: TokenKind::Ident,
            }
        );
        assert_eq!(err.position, Position::new(1, 1));
    }

    #[test]
    fn test_content_after_terminator_fails() {
        let err = interpret("run \"a\"; run \"b\"").unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::EndOfInput,
                found: TokenKind::Run,
            }
        );
        assert_eq!(err.position, Position::new(1, 10));
    }

    #[test]
    fn test_missing_string_argument() {
        let err = interpret("run\nset \"A=1\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Watchfile(2:1) expected token string, got 'set'"
        );
    }

    #[test]
    fn test_as_requires_string() {
        let err = interpret(r#"clone "host/a" as ;"#).unwrap_err();
        assert_eq!(
            err.kind,
            SyntaxErrorKind::UnexpectedToken {
                expected: TokenKind::String,
                found: TokenKind::Semicolon,
            }
        );
    }

    #[test]
    fn test_invalid_token() {
        let err = interpret("run \"a\"\n@").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Watchfile(2:1) found invalid token: unexpected character '@'"
        );
    }

    #[test]
    fn test_comments_between_declarations() {
        let cmds = commands(
            r#"
// dependencies
clone "host/a" // trailing
    as "a"
# build it
run "make -C $[a]"
"#,
        );
        assert_eq!(cmds.len(), 2);
        assert!(cmds[1].starts_with("make -C /tmp/watch-"));
    }

    #[test]
    fn test_same_script_twice() {
        let script = r#"
set "OUT=./dist"
clone "host/a@v1" as "a"
run "make -C $[a]"
extract "$[a]/bin $[OUT]"
"#;
        let first = commands(script);
        let second = commands(script);
        assert_eq!(first.len(), second.len());
        fn strip(cmds: &[String]) -> Vec<String> {
            let staging = staging_path(&cmds[0]).to_string();
            cmds.iter().map(|c| c.replace(&staging, "<staging>")).collect()
        }
        assert_eq!(strip(&first), strip(&second));
        assert_eq!(strip(&first)[2], "mv <staging>/bin /work/dist");
    }

    #[test]
    fn test_substitute() {
        let mut vars = HashMap::new();
        vars.insert("a".to_string(), "$[b]".to_string());
        vars.insert("b".to_string(), "2".to_string());
        assert_eq!(substitute("$[a] $[b] $[c]", &vars), "$[b] 2 $[c]");
        assert_eq!(substitute("x $[a", &vars), "x $[a");
        assert_eq!(substitute("$[b]$[b]", &vars), "22");
        assert_eq!(substitute("no refs", &vars), "no refs");
        assert_eq!(substitute("$[c] $[b]", &vars), "$[c] 2");
    }

    #[test]
    fn test_stray_reference_opener() {
        let cmds = parse_script("W", "set \"A=1\"\nrun \"echo $[ $[A]\"", &settings()).unwrap();
        assert_eq!(cmds, vec!["echo $[ 1"]);

        let mut vars = HashMap::new();
        vars.insert("A".to_string(), "1".to_string());
        assert_eq!(substitute("$[x $[A] $[y]", &vars), "$[x 1 $[y]");
    }

    #[test]
    fn test_clone_quotes_unsafe_staging_root() {
        let settings = Settings::new("/tmp/my deps", "/work");
        let cmds = parse_script("W", r#"clone "host/a@v1" as "a""#, &settings).unwrap();
        let staging = cmds[0]
            .split('\'')
            .find(|part| part.starts_with("/tmp/my deps/watch-"))
            .unwrap();
        assert_eq!(
            cmds[0],
            format!(
                "cd '/tmp/my deps' && git clone --depth=1 https://host/a '{}' --branch v1",
                staging
            )
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/watch-1"), "/tmp/watch-1");
        assert_eq!(shell_quote("/a b"), "'/a b'");
        assert_eq!(shell_quote("/it's"), r"'/it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_parse_script() {
        let cmds = parse_script("deps", "set \"X=y\"\nrun \"echo $[X]\"", &settings()).unwrap();
        assert_eq!(cmds, vec!["echo y"]);
    }
}
