//! Line-oriented front end for the books screen.
//!
//! Reads commands from any buffered reader and writes to any writer, so the same loop
//! drives stdin/stdout in the binary and byte buffers in tests.

use std::str::FromStr;

use anyhow::Context;
use comfy_table::Table;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::api::Book;
use crate::book_form::{BookField, FormError};
use crate::book_list::{BookList, ListView};

const HELP: &str = "\
Commands:
  list         show the books
  refresh      fetch the books again
  show <n>     show or hide the description of book <n>
  add          add a new book
  edit <n>     edit book <n>
  delete <n>   delete book <n>
  help         show this message
  quit         leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Show(usize),
    Add,
    Edit(usize),
    Delete(usize),
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),

    #[error("`{0}` needs the number of a book")]
    MissingNumber(String),

    #[error("`{0}` is not a book number")]
    InvalidNumber(String),
}

/// Parses the 1-based book number following a command
fn book_number(command: &str, argument: Option<&str>) -> Result<usize, CommandError> {
    let argument = argument.ok_or_else(|| CommandError::MissingNumber(command.to_string()))?;
    argument
        .parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .ok_or_else(|| CommandError::InvalidNumber(argument.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        match name {
            "list" | "ls" => Ok(Command::List),
            "refresh" => Ok(Command::Refresh),
            "show" => Ok(Command::Show(book_number(name, words.next())?)),
            "add" => Ok(Command::Add),
            "edit" => Ok(Command::Edit(book_number(name, words.next())?)),
            "delete" | "rm" => Ok(Command::Delete(book_number(name, words.next())?)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Renders the list the way the terminal shows it: books are numbered from 1 in cache order
pub fn render_view(view: &ListView) -> String {
    match view {
        ListView::Loading => "Loading books...".to_string(),
        ListView::Error(error) => format!("Error fetching books ({})", error),
        ListView::Books(entries) if entries.is_empty() => {
            "No books yet, use `add` to create one".to_string()
        }
        ListView::Books(entries) => {
            let mut table = Table::new();
            table.set_header(vec!["#", "Title", "Author", "Genre", "Description"]);
            for (index, entry) in entries.iter().enumerate() {
                let number = index + 1;
                let description = if entry.expanded {
                    entry.book.description.clone()
                } else {
                    format!("(show {})", number)
                };
                table.add_row(vec![
                    number.to_string(),
                    entry.book.title.clone(),
                    entry.book.author.clone(),
                    entry.book.genre.clone(),
                    description,
                ]);
            }
            table.to_string()
        }
    }
}

pub struct Terminal<R, W> {
    lines: Lines<R>,
    output: W,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            lines: input.lines(),
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `quit` or the end of input
    pub async fn run(&mut self, books: &mut BookList) -> anyhow::Result<()> {
        books.mount().await;
        self.print_list(books).await?;

        while let Some(line) = self.prompt("> ").await? {
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(err) => {
                    self.println(&err.to_string()).await?;
                    continue;
                }
            };

            match command {
                Command::List => self.print_list(books).await?,
                Command::Refresh => {
                    books.refresh().await;
                    self.print_list(books).await?;
                }
                Command::Show(number) => {
                    if let Some(book_id) = self.book_at(books, number).await?.and_then(|b| b.id) {
                        books.toggle_expand(book_id);
                        self.print_list(books).await?;
                    }
                }
                Command::Add => {
                    books.open_create();
                    self.fill_form(books).await?;
                }
                Command::Edit(number) => {
                    if let Some(book) = self.book_at(books, number).await? {
                        books.open_edit(&book);
                        self.fill_form(books).await?;
                    }
                }
                Command::Delete(number) => {
                    if let Some(book) = self.book_at(books, number).await? {
                        books.request_delete(&book);
                        self.confirm_delete(books).await?;
                    }
                }
                Command::Help => self.println(HELP).await?,
                Command::Quit => break,
            }
        }
        Ok(())
    }

    async fn book_at(&mut self, books: &BookList, number: usize) -> anyhow::Result<Option<Book>> {
        match books.view() {
            ListView::Books(entries) => match entries.into_iter().nth(number - 1) {
                Some(entry) => Ok(Some(entry.book)),
                None => {
                    self.println(&format!("There is no book number {}", number))
                        .await?;
                    Ok(None)
                }
            },
            _ => {
                self.println("Books are not loaded, try `refresh`").await?;
                Ok(None)
            }
        }
    }

    /// Prompts every field of the open form, then saves or cancels it.
    /// An empty answer keeps the current value of a field
    async fn fill_form(&mut self, books: &mut BookList) -> anyhow::Result<()> {
        while let Some(form) = books.form_mut() {
            self.println(form.heading()).await?;
            for field in BookField::ALL {
                let question = format!("{} [{}]: ", field.label(), form.value(field));
                let Some(answer) = self.prompt(&question).await? else {
                    books.cancel_form();
                    return Ok(());
                };
                if !answer.trim().is_empty() {
                    form.set_value(field, answer);
                }
                form.blur(field);
                if let Some(error) = form.error(field).map(|error| format!("  {}", error)) {
                    self.println(&error).await?;
                }
            }

            let question = format!("{}? [save/cancel]: ", form.submit_label());
            let answer = self.prompt(&question).await?;
            if matches!(answer.as_deref().map(str::trim), None | Some("cancel" | "c")) {
                books.cancel_form();
                self.println("Cancelled").await?;
                return Ok(());
            }

            match books.submit_form().await {
                Ok(saved) => {
                    self.println(&format!("Saved \"{}\"", saved.title)).await?;
                    self.print_list(books).await?;
                }
                Err(FormError::Invalid(errors)) => {
                    for error in errors {
                        self.println(&format!("  {}", error)).await?;
                    }
                }
                Err(err) => self.println(&err.to_string()).await?,
            }
        }
        Ok(())
    }

    /// Asks until the pending delete is confirmed and done, or declined
    async fn confirm_delete(&mut self, books: &mut BookList) -> anyhow::Result<()> {
        while let Some(question) = books.delete_prompt() {
            let answer = self.prompt(&format!("{} [y/N]: ", question)).await?;
            if !matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes")) {
                books.decline_delete();
                return Ok(());
            }

            let title = books
                .pending_delete()
                .map(|book| book.title.clone())
                .unwrap_or_default();
            match books.confirm_delete().await {
                Ok(()) => {
                    self.println(&format!("Deleted \"{}\"", title)).await?;
                    self.print_list(books).await?;
                }
                Err(err) => {
                    self.println(&format!("Error deleting book: {}", err))
                        .await?
                }
            }
        }
        Ok(())
    }

    async fn print_list(&mut self, books: &BookList) -> anyhow::Result<()> {
        let rendered = render_view(&books.view());
        self.println(&rendered).await
    }

    async fn prompt(&mut self, question: &str) -> anyhow::Result<Option<String>> {
        self.output
            .write_all(question.as_bytes())
            .await
            .context("Failed to write prompt")?;
        self.output.flush().await.context("Failed to flush output")?;
        self.lines.next_line().await.context("Failed to read input")
    }

    async fn println(&mut self, text: &str) -> anyhow::Result<()> {
        self.output
            .write_all(format!("{}\n", text).as_bytes())
            .await
            .context("Failed to write output")?;
        self.output.flush().await.context("Failed to flush output")
    }
}
