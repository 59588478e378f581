use anyhow::{anyhow, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Line-based prompting on stdin/stdout
pub struct Prompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Prompter {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// Ask a question and return the trimmed answer
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read answer")?;
        if read == 0 {
            return Err(anyhow!("input closed while waiting for: {}", question.trim()));
        }
        Ok(line.trim().to_string())
    }

    pub fn ask_count(&mut self, question: &str) -> Result<u64> {
        let answer = self.ask(question)?;
        answer
            .parse()
            .map_err(|_| anyhow!("'{}' is not a whole number", answer))
    }

    pub fn ask_path(&mut self, question: &str) -> Result<PathBuf> {
        let answer = self.ask(question)?;
        if answer.is_empty() {
            return Err(anyhow!("a file path is required"));
        }
        Ok(PathBuf::from(answer))
    }
}
