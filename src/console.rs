//! Rendering and prompting context handed to every operation.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{Error, Result};
use crate::interrupt::InterruptFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A titled table of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        TableView {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }
}

pub trait Console {
    fn table(&mut self, table: &TableView);

    fn message(&mut self, tone: Tone, text: &str);

    /// Show a spinner until `status_stop`.
    fn status_start(&mut self, text: &str);

    fn status_stop(&mut self);

    /// Ask a free-text question. Fails with `Error::InputClosed` at EOF and
    /// `Error::Interrupted` once the user pressed Ctrl-C.
    fn ask(&mut self, question: &str) -> Result<String>;

    fn interrupted(&self) -> bool {
        false
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", question))?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Interactive terminal: colored messages, boxed tables, spinner.
#[derive(Default)]
pub struct Terminal {
    spinner: Option<ProgressBar>,
    interrupt: InterruptFlags,
}

impl Terminal {
    pub fn new(interrupt: InterruptFlags) -> Self {
        Terminal {
            spinner: None,
            interrupt,
        }
    }

    fn render(table: &TableView) -> Table {
        let mut out = Table::new();
        out.load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(table.headers.iter().map(|h| Cell::new(h).fg(comfy_table::Color::Magenta)));
        for row in &table.rows {
            out.add_row(row.iter().map(|c| {
                let cell = Cell::new(c);
                if c.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
                    cell.set_alignment(CellAlignment::Right)
                } else {
                    cell
                }
            }));
        }
        out
    }
}

impl Console for Terminal {
    fn table(&mut self, table: &TableView) {
        self.status_stop();
        if !table.title.is_empty() {
            println!("{}", table.title.cyan().bold());
        }
        println!("{}", Self::render(table));
    }

    fn message(&mut self, tone: Tone, text: &str) {
        let prefix = match tone {
            Tone::Info => "::".blue().bold(),
            Tone::Success => "ok".green().bold(),
            Tone::Warning => "!!".yellow().bold(),
            Tone::Error => "xx".red().bold(),
        };
        match &self.spinner {
            Some(pb) => pb.println(format!("{} {}", prefix, text)),
            None => println!("{} {}", prefix, text),
        }
    }

    fn status_start(&mut self, text: &str) {
        self.status_stop();
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(text.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(pb);
    }

    fn status_stop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        self.status_stop();
        if self.interrupted() {
            return Err(Error::Interrupted);
        }
        print!("{} {} ", "??".blue().bold(), question);
        io::stdout().flush()?;

        let mut input = String::new();
        let read = self
            .interrupt
            .awaiting(|| io::stdin().lock().read_line(&mut input));
        if self.interrupted() {
            println!();
            return Err(Error::Interrupted);
        }
        if read? == 0 {
            println!();
            return Err(Error::InputClosed);
        }
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_set()
    }
}

/// Console double: answers come from a queue, output is recorded.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    answered: usize,
    interrupt_after: Option<usize>,
    pub questions: Vec<String>,
    pub tables: Vec<TableView>,
    pub messages: Vec<(Tone, String)>,
    pub statuses: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedConsole {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Behave as if Ctrl-C was pressed right after the `answers`-th answer.
    pub fn interrupt_after(mut self, answers: usize) -> Self {
        self.interrupt_after = Some(answers);
        self
    }

    pub fn messages_with(&self, tone: Tone) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn table(&mut self, table: &TableView) {
        self.tables.push(table.clone());
    }

    fn message(&mut self, tone: Tone, text: &str) {
        self.messages.push((tone, text.to_string()));
    }

    fn status_start(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn status_stop(&mut self) {}

    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        if self.interrupted() {
            return Err(Error::Interrupted);
        }
        let answer = self.answers.pop_front().ok_or(Error::InputClosed)?;
        self.answered += 1;
        Ok(answer)
    }

    fn interrupted(&self) -> bool {
        self.interrupt_after.is_some_and(|n| self.answered >= n)
    }
}
