use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use photo_mode::host::Hand;
use photo_mode::TabDirection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: {reason}. usage: {usage}")]
    BadArgument {
        line: usize,
        reason: String,
        usage: &'static str,
    },
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle,
    Activate,
    Deactivate,
    Tab(TabDirection),
    Reset,
    ResetAll,
    Frame(u32),
    Open(String),
    Close(String),
    Menu(String),
    Select(usize),
    Show,
    Hide,
    Rotate(f32),
    Move { x: f32, y: f32 },
    Expression { index: u32, strength: f32 },
    Phoneme { index: u32, strength: f32 },
    Modifier { index: u32, strength: f32 },
    Idle(usize),
    Weapon(usize),
    Armor(usize),
    Spell { hand: Hand, index: usize },
    Shader(usize),
    Vfx(usize),
    Fov(f32),
    Roll(f32),
    Freeze(bool),
    Hour(f32),
    Grade {
        saturation: f32,
        contrast: f32,
        brightness: f32,
    },
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub text: String,
    pub command: Command,
}

pub fn read_script(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses the whole script up front so a typo on the last line fails before
/// anything runs. Blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        if text.is_empty() {
            continue;
        }
        let tokens = tokenize(text).ok_or(ScriptError::UnterminatedQuote { line })?;
        let Some((name, args)) = tokens.split_first() else {
            continue;
        };
        lines.push(ScriptLine {
            line,
            text: text.to_string(),
            command: parse_command(line, name, args)?,
        });
    }
    Ok(lines)
}

fn parse_command(line: usize, name: &str, args: &[String]) -> Result<Command, ScriptError> {
    let args = Args { line, args };
    let command = match name.to_ascii_lowercase().as_str() {
        "toggle" => args.none(Command::Toggle, "toggle")?,
        "activate" => args.none(Command::Activate, "activate")?,
        "deactivate" => args.none(Command::Deactivate, "deactivate")?,
        "tab" => {
            const USAGE: &str = "tab <next|prev>";
            match args.exactly(1, USAGE)?[0].as_str() {
                "next" => Command::Tab(TabDirection::Next),
                "prev" => Command::Tab(TabDirection::Previous),
                other => return Err(args.bad(format!("unknown direction '{other}'"), USAGE)),
            }
        }
        "reset" => args.none(Command::Reset, "reset")?,
        "reset_all" => args.none(Command::ResetAll, "reset_all")?,
        "frame" => {
            const USAGE: &str = "frame [count:u32]";
            match args.args {
                [] => Command::Frame(1),
                [count] => Command::Frame(args.number(count, USAGE)?),
                _ => return Err(args.bad("too many arguments".to_string(), USAGE)),
            }
        }
        "open" => Command::Open(args.rest("open <surface...>")?),
        "close" => Command::Close(args.rest("close <surface...>")?),
        "menu" => Command::Menu(args.rest("menu <surface...>")?),
        "select" => Command::Select(args.single("select <index:usize>")?),
        "show" => args.none(Command::Show, "show")?,
        "hide" => args.none(Command::Hide, "hide")?,
        "rotate" => Command::Rotate(args.single("rotate <degrees:f32>")?),
        "move" => {
            const USAGE: &str = "move <x:f32> <y:f32>";
            let values = args.exactly(2, USAGE)?;
            Command::Move {
                x: args.number(&values[0], USAGE)?,
                y: args.number(&values[1], USAGE)?,
            }
        }
        "expr" => {
            let (index, strength) = args.index_strength("expr <index:u32> <strength:f32>")?;
            Command::Expression { index, strength }
        }
        "phoneme" => {
            let (index, strength) = args.index_strength("phoneme <index:u32> <strength:f32>")?;
            Command::Phoneme { index, strength }
        }
        "modifier" => {
            let (index, strength) = args.index_strength("modifier <index:u32> <strength:f32>")?;
            Command::Modifier { index, strength }
        }
        "idle" => Command::Idle(args.single("idle <index:usize>")?),
        "weapon" => Command::Weapon(args.single("weapon <index:usize>")?),
        "armor" => Command::Armor(args.single("armor <index:usize>")?),
        "spell" => {
            const USAGE: &str = "spell <left|right> <index:usize>";
            let values = args.exactly(2, USAGE)?;
            let hand = match values[0].as_str() {
                "left" => Hand::Left,
                "right" => Hand::Right,
                other => return Err(args.bad(format!("unknown hand '{other}'"), USAGE)),
            };
            Command::Spell {
                hand,
                index: args.number(&values[1], USAGE)?,
            }
        }
        "shader" => Command::Shader(args.single("shader <index:usize>")?),
        "vfx" => Command::Vfx(args.single("vfx <index:usize>")?),
        "fov" => Command::Fov(args.single("fov <degrees:f32>")?),
        "roll" => Command::Roll(args.single("roll <degrees:f32>")?),
        "freeze" => {
            const USAGE: &str = "freeze <on|off>";
            match args.exactly(1, USAGE)?[0].as_str() {
                "on" => Command::Freeze(true),
                "off" => Command::Freeze(false),
                other => return Err(args.bad(format!("expected on or off, got '{other}'"), USAGE)),
            }
        }
        "hour" => Command::Hour(args.single("hour <hour:f32>")?),
        "grade" => {
            const USAGE: &str = "grade <saturation:f32> <contrast:f32> <brightness:f32>";
            let values = args.exactly(3, USAGE)?;
            Command::Grade {
                saturation: args.number(&values[0], USAGE)?,
                contrast: args.number(&values[1], USAGE)?,
                brightness: args.number(&values[2], USAGE)?,
            }
        }
        "status" => args.none(Command::Status, "status")?,
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: name.to_string(),
            })
        }
    };
    Ok(command)
}

struct Args<'a> {
    line: usize,
    args: &'a [String],
}

impl<'a> Args<'a> {
    fn bad(&self, reason: String, usage: &'static str) -> ScriptError {
        ScriptError::BadArgument {
            line: self.line,
            reason,
            usage,
        }
    }

    fn none(&self, command: Command, usage: &'static str) -> Result<Command, ScriptError> {
        if self.args.is_empty() {
            Ok(command)
        } else {
            Err(self.bad("takes no arguments".to_string(), usage))
        }
    }

    fn exactly(&self, count: usize, usage: &'static str) -> Result<&'a [String], ScriptError> {
        if self.args.len() == count {
            Ok(self.args)
        } else {
            Err(self.bad(
                format!("expected {count} argument(s), got {}", self.args.len()),
                usage,
            ))
        }
    }

    fn rest(&self, usage: &'static str) -> Result<String, ScriptError> {
        if self.args.is_empty() {
            return Err(self.bad("missing required argument".to_string(), usage));
        }
        Ok(self.args.join(" "))
    }

    fn number<T: std::str::FromStr>(&self, raw: &str, usage: &'static str) -> Result<T, ScriptError> {
        raw.parse::<T>()
            .map_err(|_| self.bad(format!("invalid number '{raw}'"), usage))
    }

    fn single<T: std::str::FromStr>(&self, usage: &'static str) -> Result<T, ScriptError> {
        let values = self.exactly(1, usage)?;
        self.number(&values[0], usage)
    }

    fn index_strength(&self, usage: &'static str) -> Result<(u32, f32), ScriptError> {
        let values = self.exactly(2, usage)?;
        Ok((self.number(&values[0], usage)?, self.number(&values[1], usage)?))
    }
}

/// Whitespace split with double-quoted spans kept whole, so surface names
/// with spaces can be written as `open "Journal Menu"`. `None` on an
/// unterminated quote.
fn tokenize(text: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for ch in text.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            _ => {
                current.push(ch);
                pending = true;
            }
        }
    }

    if in_quotes {
        return None;
    }
    if pending {
        tokens.push(current);
    }
    Some(tokens)
}
