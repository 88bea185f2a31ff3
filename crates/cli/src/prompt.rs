use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use photo_renamer_core::{TagDecision, TagKind, TagResolver};

pub fn ask_yes_no(question: &str) -> Result<bool> {
    loop {
        eprint!("{question} y/n: ");
        io::stderr().flush().context("failed to flush stderr")?;
        let answer = read_answer()?;
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => eprintln!("Wrong input. You need to type y or n."),
        }
    }
}

fn ask_line(question: &str) -> Result<String> {
    loop {
        eprint!("{question} ");
        io::stderr().flush().context("failed to flush stderr")?;
        let answer = read_answer()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

fn read_answer() -> Result<String> {
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    if read == 0 {
        anyhow::bail!("input ended before the question was answered");
    }
    Ok(line)
}

pub struct ConsolePrompter;

impl TagResolver for ConsolePrompter {
    fn resolve(&mut self, kind: TagKind, raw: &str) -> Result<TagDecision> {
        if ask_yes_no(&format!(
            "Do you want the {} to be named {:?}?",
            kind.label(),
            raw
        ))? {
            return Ok(TagDecision::KeepRaw);
        }

        loop {
            let replacement = ask_line(&format!(
                "Please type a new name for the {} instead of {:?}:",
                kind.label(),
                raw
            ))?;
            if ask_yes_no(&format!(
                "Are you sure you want to use {:?} for the {}?",
                replacement,
                kind.label()
            ))? {
                return Ok(TagDecision::Replace(replacement));
            }
        }
    }
}
