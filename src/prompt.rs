//! Interactive question/answer loops.
//!
//! Every question is re-asked until the answer parses; end of input is
//! treated as the user abandoning the run.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("interrupted by user")]
    Interrupted,

    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parse `y`/`yes`/`n`/`no` (any case).
pub fn parse_yes_no(input: &str) -> Result<bool, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        other => Err(format!("expected y/yes or n/no, got '{other}'")),
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        writeln!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::Interrupted);
        }
        Ok(line.trim().to_string())
    }

    fn retry(&mut self, message: &str) -> Result<(), InputError> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    /// Ask until the answer parses as `T` and passes `accept`.
    pub fn ask_parsed<T, F>(&mut self, prompt: &str, accept: F) -> Result<T, InputError>
    where
        T: FromStr,
        F: Fn(&T) -> bool,
    {
        loop {
            let answer = self.read_line(prompt)?;
            match answer.parse::<T>() {
                Ok(value) if accept(&value) => return Ok(value),
                _ => self.retry("Invalid input. Please enter a valid number.")?,
            }
        }
    }

    pub fn ask_integer<T: FromStr>(&mut self, prompt: &str) -> Result<T, InputError> {
        self.ask_parsed(prompt, |_| true)
    }

    /// Ask for a key binding (any non-empty text).
    pub fn ask_key(&mut self, prompt: &str) -> Result<String, InputError> {
        loop {
            let answer = self.read_line(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.retry("Invalid input. Please enter a valid key.")?;
        }
    }

    pub fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, InputError> {
        loop {
            let answer = self.read_line(prompt)?;
            match parse_yes_no(&answer) {
                Ok(value) => return Ok(value),
                Err(_) => self.retry("Invalid input. Please enter y/n.")?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn integer_reprompts_until_valid() {
        let mut p = prompter("abc\n\n-1\n3\n");
        let value: usize = p.ask_parsed("How many?", |n| *n > 0).unwrap();
        assert_eq!(value, 3);

        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("How many?").count(), 4);
        assert_eq!(output.matches("Invalid input").count(), 3);
    }

    #[test]
    fn key_rejects_blank() {
        let mut p = prompter("   \nVK_RIGHT\n");
        assert_eq!(p.ask_key("Key?").unwrap(), "VK_RIGHT");
    }

    #[test]
    fn yes_no_accepts_variants() {
        let mut p = prompter("maybe\nYES\nn\n");
        assert!(p.ask_yes_no("Sure?").unwrap());
        assert!(!p.ask_yes_no("Sure?").unwrap());
    }

    #[test]
    fn end_of_input_is_interrupt() {
        let mut p = prompter("abc\n");
        let result: Result<i64, _> = p.ask_integer("Value?");
        assert!(matches!(result, Err(InputError::Interrupted)));
    }

    #[test]
    fn parse_yes_no_values() {
        assert_eq!(parse_yes_no(" y "), Ok(true));
        assert_eq!(parse_yes_no("No"), Ok(false));
        assert!(parse_yes_no("").is_err());
    }
}
