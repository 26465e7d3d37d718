// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Confirmation before each push (diagnostic mode).

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::Result;

/// Operator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDecision {
    Push,
    Skip,
    Quit,
}

/// What is about to be pushed.
#[derive(Debug, Clone, Copy)]
pub struct PushRequest<'a> {
    pub repo: &'a str,
    pub reference: &'a str,
    pub url: &'a str,
    pub path: &'a Path,
    /// New commit, shown for repositories that receive one.
    pub commit: Option<&'a str>,
}

pub trait PushConfirm: Send + Sync {
    /// Ask whether `request` should go ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&self, request: &PushRequest<'_>) -> Result<PushDecision>;
}

/// Pushes without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl PushConfirm for AutoConfirm {
    fn confirm(&self, _request: &PushRequest<'_>) -> Result<PushDecision> {
        Ok(PushDecision::Push)
    }
}

/// `n` skips, `q` quits, anything else pushes.
#[must_use]
pub fn parse_answer(answer: &str) -> PushDecision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "n" => PushDecision::Skip,
        "q" => PushDecision::Quit,
        _ => PushDecision::Push,
    }
}

/// Line-based prompt. One question at a time across workers.
pub struct LineConfirm<R, W> {
    io: Mutex<(R, W)>,
}

impl LineConfirm<BufReader<Stdin>, Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R, W> LineConfirm<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        self.io.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, W> PushConfirm for LineConfirm<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, request: &PushRequest<'_>) -> Result<PushDecision> {
        let mut guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let (input, output) = &mut *guard;

        writeln!(output)?;
        writeln!(output, "=============================")?;
        writeln!(output, "Diagnostic Mode - BEFORE PUSH TO REMOTE")?;
        writeln!(output, "Repository : {}", request.repo)?;
        writeln!(output, "New revision : {}", request.reference)?;
        if let Some(commit) = request.commit {
            writeln!(output, "New Commit SHA : {commit}")?;
        }
        writeln!(output, "Remote URL : {}", request.url)?;
        writeln!(output, "Repository clone path : {}", request.path.display())?;
        write!(
            output,
            "Press n/N to continue without pushing, q/Q to quit, or any other key to continue : "
        )?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            // closed input cannot confirm anything
            return Ok(PushDecision::Quit);
        }
        Ok(parse_answer(&answer))
    }
}
