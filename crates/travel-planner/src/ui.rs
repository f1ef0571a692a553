//! Form front-end abstraction and its terminal implementation.
use std::io::{BufRead, Write};

use chrono::NaiveDate;

use crate::banner::BannerImage;
use crate::errors::UiError;

/// Capabilities the planner needs from a form toolkit.
///
/// Output methods are infallible from the planner's point of view; a
/// front-end that cannot draw logs and carries on.
pub trait FormUi {
    fn show_title(&mut self, title: &str);
    fn show_image(&mut self, image: &BannerImage, caption: &str);
    fn show_warning(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
    fn show_spinner(&mut self, label: &str);
    fn clear_spinner(&mut self);

    /// Replaces the whole live output region with `content`.
    fn display_text(&mut self, content: &str);

    fn input_text(&mut self, label: &str) -> Result<String, UiError>;

    /// Asks for a date no earlier than `min`; `min` is also the default.
    fn input_date(&mut self, label: &str, min: NaiveDate) -> Result<NaiveDate, UiError>;

    /// Asks for one of `options`, returning its index. Index 0 is the default.
    fn input_choice(&mut self, label: &str, options: &[&str]) -> Result<usize, UiError>;

    fn confirm(&mut self, label: &str) -> Result<bool, UiError>;
}

/// Line-oriented terminal front-end.
///
/// The live region is redrawn by printing only the newly appended suffix when
/// the new content extends what is already on screen, and by clearing the
/// screen otherwise.
pub struct TerminalUi<R, W, E> {
    input: R,
    out: W,
    err: E,
    shown: String,
    ansi: bool,
}

impl TerminalUi<std::io::StdinLock<'static>, std::io::Stdout, std::io::Stderr> {
    /// Terminal bound to the process's standard streams.
    pub fn stdio() -> Self {
        use std::io::IsTerminal as _;
        let ansi = std::io::stdout().is_terminal();
        Self::new(std::io::stdin().lock(), std::io::stdout(), std::io::stderr()).ansi(ansi)
    }
}

impl<R: BufRead, W: Write, E: Write> TerminalUi<R, W, E> {
    pub fn new(input: R, out: W, err: E) -> Self {
        Self {
            input,
            out,
            err,
            shown: String::new(),
            ansi: false,
        }
    }

    /// Enables ANSI escape sequences for clearing the live region.
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Returns the writers, mostly for inspecting output in tests.
    pub fn into_writers(self) -> (W, E) {
        (self.out, self.err)
    }

    fn write_out(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn write_err(&mut self, text: &str) {
        if let Err(e) = self.err.write_all(text.as_bytes()).and_then(|_| self.err.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, UiError> {
        self.write_out(prompt);
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(UiError::Closed);
        }
        Ok(line.trim().to_string())
    }

    /// Ends the live region so later output starts on a fresh line.
    fn close_region(&mut self) {
        if !self.shown.is_empty() {
            if !self.shown.ends_with('\n') {
                self.write_out("\n");
            }
            self.shown.clear();
        }
    }
}

impl<R: BufRead, W: Write, E: Write> FormUi for TerminalUi<R, W, E> {
    fn show_title(&mut self, title: &str) {
        self.write_out(&format!("{title}\n\n"));
    }

    fn show_image(&mut self, image: &BannerImage, caption: &str) {
        self.write_out(&format!("[image: {image}] {caption}\n\n"));
    }

    fn show_warning(&mut self, message: &str) {
        self.close_region();
        self.write_err(&format!("warning: {message}\n"));
    }

    fn show_error(&mut self, message: &str) {
        self.close_region();
        self.write_err(&format!("error: {message}\n"));
    }

    fn show_spinner(&mut self, label: &str) {
        self.write_err(&format!("{label}\n"));
    }

    fn clear_spinner(&mut self) {
        self.close_region();
    }

    fn display_text(&mut self, content: &str) {
        if let Some(suffix) = content.strip_prefix(self.shown.as_str()) {
            self.write_out(suffix);
        } else {
            if self.ansi {
                self.write_out("\x1b[2J\x1b[H");
            } else {
                self.write_out("\n");
            }
            self.write_out(content);
        }
        self.shown = content.to_string();
    }

    fn input_text(&mut self, label: &str) -> Result<String, UiError> {
        self.read_line(&format!("{label} "))
    }

    fn input_date(&mut self, label: &str, min: NaiveDate) -> Result<NaiveDate, UiError> {
        loop {
            let answer = self.read_line(&format!("{label} [YYYY-MM-DD, default {min}] "))?;
            if answer.is_empty() {
                return Ok(min);
            }
            match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) if date >= min => return Ok(date),
                Ok(_) => self.show_error(&format!("Date must be on or after {min}.")),
                Err(_) => self.show_error("Please enter a date as YYYY-MM-DD."),
            }
        }
    }

    fn input_choice(&mut self, label: &str, options: &[&str]) -> Result<usize, UiError> {
        let mut menu = format!("{label}\n");
        for (idx, option) in options.iter().enumerate() {
            menu.push_str(&format!("  {}) {option}\n", idx + 1));
        }
        self.write_out(&menu);
        loop {
            let answer = self.read_line(&format!("Choose 1-{} [1] ", options.len()))?;
            if answer.is_empty() {
                return Ok(0);
            }
            if let Ok(n) = answer.parse::<usize>()
                && (1..=options.len()).contains(&n)
            {
                return Ok(n - 1);
            }
            if let Some(idx) = options
                .iter()
                .position(|o| o.eq_ignore_ascii_case(&answer))
            {
                return Ok(idx);
            }
            self.show_error(&format!("Please choose one of: {}", options.join(", ")));
        }
    }

    fn confirm(&mut self, label: &str) -> Result<bool, UiError> {
        let answer = self.read_line(&format!("{label} [y/N] "))?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
