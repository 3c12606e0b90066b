//! Interactive input.
//!
//! Commands never read stdin directly; they go through [`Prompter`] so the
//! same code runs against the terminal ([`TermPrompter`]) and against
//! scripted input in tests ([`LinePrompter`]).

use std::io::{BufRead, Write};
use std::str::FromStr;

use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::{Error, Result};

/// Rejects an answer with a message, or accepts it.
pub type Check<'a> = &'a dyn Fn(&str) -> std::result::Result<(), String>;

/// One free-text question.
#[derive(Clone, Copy)]
pub struct Question<'a> {
    /// Label shown to the user, without punctuation.
    pub label: &'a str,
    /// Value kept when the answer is empty.
    pub current: Option<&'a str>,
    /// Whether an empty answer with no current value is refused.
    pub required: bool,
    /// Validation run on non-empty answers.
    pub check: Option<Check<'a>>,
}

impl<'a> Question<'a> {
    /// Optional question with no validation.
    pub fn new(label: &'a str, current: Option<&'a str>) -> Self {
        Self {
            label,
            current: current.filter(|c| !c.is_empty()),
            required: false,
            check: None,
        }
    }

    fn shown(&self) -> String {
        if self.required {
            format!("{} *", self.label)
        } else {
            self.label.to_string()
        }
    }

    fn validate(&self, answer: &str) -> std::result::Result<(), String> {
        match self.check {
            Some(check) if !answer.is_empty() => check(answer),
            _ => Ok(()),
        }
    }
}

/// Question and answer over some terminal.
///
/// Only [`say`](Prompter::say) and [`read`](Prompter::read) are required;
/// the rest fall back to numbered, line-based dialogues built on them.
pub trait Prompter {
    /// Prints a line of output.
    fn say(&mut self, text: &str) -> Result<()>;

    /// Reads one line after showing `label` verbatim. Returns the trimmed
    /// answer.
    fn read(&mut self, label: &str) -> Result<String>;

    /// Reads a line without echoing it.
    fn read_secret(&mut self, label: &str) -> Result<String> {
        self.read(&format!("{label}: "))
    }

    /// Asks `question` until the answer passes its checks. `None` means
    /// the question was optional and left empty.
    fn ask(&mut self, question: &Question<'_>) -> Result<Option<String>> {
        let shown = match question.current {
            Some(c) => format!("{} [{c}]: ", question.shown()),
            None => format!("{}: ", question.shown()),
        };
        loop {
            let answer = self.read(&shown)?;
            let answer = if answer.is_empty() {
                question.current.map(str::to_string)
            } else {
                Some(answer)
            };
            match answer {
                None if question.required => self.say(&format!("{} is required", question.label))?,
                None => return Ok(None),
                Some(answer) => match question.validate(&answer) {
                    Ok(()) => return Ok(Some(answer)),
                    Err(message) => self.say(&message)?,
                },
            }
        }
    }

    /// Menu over `items`; returns the chosen index. Empty keeps `default`.
    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize> {
        self.say(&format!("{label}:"))?;
        for (i, name) in items.iter().enumerate() {
            let marker = if i == default { '*' } else { ' ' };
            self.say(&format!(" {marker} {}. {name}", i + 1))?;
        }
        loop {
            let answer = self.read(&format!("Choice [{}]: ", default + 1))?;
            if answer.is_empty() && default < items.len() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=items.len()).contains(&n) => return Ok(n - 1),
                _ => self.say(&format!("Pick a number from 1 to {}", items.len()))?,
            }
        }
    }

    /// Yes or no.
    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.read(&format!("{label} [{hint}]: "))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n")?,
            }
        }
    }
}

/// Prompter over the real terminal, drawn with `dialoguer`.
#[derive(Debug, Clone)]
pub struct TermPrompter {
    term: Term,
}

impl TermPrompter {
    /// Prompter on stdout.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for TermPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TermPrompter {
    fn say(&mut self, text: &str) -> Result<()> {
        Ok(self.term.write_line(text)?)
    }

    fn read(&mut self, label: &str) -> Result<String> {
        self.term.write_str(label)?;
        Ok(self.term.read_line()?.trim().to_string())
    }

    fn read_secret(&mut self, label: &str) -> Result<String> {
        Ok(Password::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .allow_empty_password(true)
            .interact_on(&self.term)?)
    }

    fn ask(&mut self, question: &Question<'_>) -> Result<Option<String>> {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(question.shown())
            .allow_empty(!question.required)
            .validate_with(|answer: &String| question.validate(answer.trim()));
        if let Some(current) = question.current {
            input = input.default(current.to_string());
        }
        let answer = input.interact_text_on(&self.term)?;
        let answer = answer.trim();
        Ok(if answer.is_empty() {
            question.current.map(str::to_string)
        } else {
            Some(answer.to_string())
        })
    }

    fn select(&mut self, label: &str, items: &[&str], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .items(items)
            .default(default)
            .interact_on(&self.term)?)
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .default(default)
            .interact_on(&self.term)?)
    }
}

/// Prompter over any reader and writer; end of input is an error.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    /// Wraps `input` and `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn read(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::input("input ended"));
        }
        Ok(line.trim().to_string())
    }
}

fn parses<T: FromStr>(answer: &str) -> std::result::Result<(), String> {
    answer
        .parse::<T>()
        .map(|_| ())
        .map_err(|_| format!("'{answer}' is not a valid value"))
}

fn parse_checked<T: FromStr>(answer: &str) -> Result<T> {
    answer
        .parse()
        .map_err(|_| Error::input(format!("'{answer}' is not a valid value")))
}

/// Typed question helpers built on [`Prompter`].
pub trait PrompterExt: Prompter {
    /// Free text; empty keeps `current`.
    fn text(&mut self, label: &str, current: Option<&str>) -> Result<Option<String>> {
        self.ask(&Question::new(label, current))
    }

    /// Text that may not be left empty.
    fn required(&mut self, label: &str, current: Option<&str>) -> Result<String> {
        let question = Question {
            required: true,
            ..Question::new(label, current)
        };
        self.ask(&question)?
            .ok_or_else(|| Error::input(format!("{label} is required")))
    }

    /// Parsed value; empty keeps `current`, unparsable input asks again.
    fn parsed<T>(&mut self, label: &str, current: Option<T>) -> Result<Option<T>>
    where
        T: FromStr + ToString,
    {
        let shown = current.as_ref().map(ToString::to_string);
        let check = parses::<T>;
        let question = Question {
            check: Some(&check),
            ..Question::new(label, shown.as_deref())
        };
        match self.ask(&question)? {
            Some(answer) => Ok(Some(parse_checked(&answer)?)),
            None => Ok(None),
        }
    }

    /// Parsed value that must be given.
    fn parsed_required<T>(&mut self, label: &str, current: Option<T>) -> Result<T>
    where
        T: FromStr + ToString,
    {
        let shown = current.as_ref().map(ToString::to_string);
        let check = parses::<T>;
        let question = Question {
            required: true,
            check: Some(&check),
            ..Question::new(label, shown.as_deref())
        };
        let answer = self
            .ask(&question)?
            .ok_or_else(|| Error::input(format!("{label} is required")))?;
        parse_checked(&answer)
    }

    /// Menu of labelled values; `current` is the preselected index.
    fn choose<T: Copy>(&mut self, label: &str, options: &[(T, &str)], current: usize) -> Result<T> {
        let names: Vec<&str> = options.iter().map(|(_, name)| *name).collect();
        let index = self.select(label, &names, current)?;
        options
            .get(index)
            .map(|(value, _)| *value)
            .ok_or_else(|| Error::input(format!("no option {}", index + 1)))
    }
}

impl<P: Prompter + ?Sized> PrompterExt for P {}
