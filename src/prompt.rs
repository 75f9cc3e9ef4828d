//! Prompts displayed to the user to gather input.

use anyhow::Result;
use anyhow::bail;
use srs_sm2::Grade;
use std::io::{Write, stdin, stdout};
use termion::clear;
use termion::event::{Event, Key};
use termion::input::TermRead;
use termion::raw::IntoRawMode;

/// Displays `prompt` and waits for a yes / no answer.
pub fn confirm(prompt: impl AsRef<str>) -> Result<bool> {
    let selection = read_key(format!("{} [y/n] ", prompt.as_ref()), |key| match key {
        Key::Char('y') => Some(true),
        Key::Char('n') => Some(false),
        _ => None,
    })?;

    println!("{}", if selection { "yes" } else { "no" });

    Ok(selection)
}

/// Displays `prompt` and waits for a grade from 1 (again) to 4 (easy).
pub fn grade(prompt: impl AsRef<str>) -> Result<Grade> {
    let grade = read_key(prompt.as_ref(), |key| match key {
        Key::Char(c) => c
            .to_digit(10)
            .and_then(|digit| u8::try_from(digit).ok())
            .and_then(|digit| Grade::try_from(digit).ok()),
        _ => None,
    })?;

    println!("{grade}");

    Ok(grade)
}

/// Displays `prompt`, waits until a key is pressed, then clears the prompt.
pub fn any(prompt: impl AsRef<str>) -> Result<()> {
    read_key(prompt.as_ref(), |_| Some(()))?;

    let mut stdout = stdout();
    write!(stdout, "\r{}", clear::AfterCursor)?;
    stdout.flush()?;

    Ok(())
}

/// Reads keys in raw mode until `select` accepts one. `q` and Ctrl-C abort.
fn read_key<T>(prompt: impl AsRef<str>, select: impl Fn(Key) -> Option<T>) -> Result<T> {
    let mut stdout = stdout().into_raw_mode()?;
    write!(stdout, "{}", prompt.as_ref())?;
    stdout.flush()?;

    for event in stdin().events() {
        let key = match event? {
            Event::Key(Key::Char('q')) | Event::Key(Key::Ctrl('c')) => {
                write!(stdout, "\r\n")?;
                stdout.flush()?;

                bail!("Exiting instead of answering...")
            }
            Event::Key(key) => key,
            _ => continue,
        };

        if let Some(selection) = select(key) {
            return Ok(selection);
        }
    }

    bail!("Input closed before an answer was given")
}
