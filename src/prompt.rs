//! Interactive yes/no confirmation
//!
//! Prompts suspend the pipeline until a line is read. Ctrl-C or end of input
//! while waiting is reported as [`PromptError::Cancelled`] rather than
//! terminating the process. Questions go to stderr so stdout only ever
//! carries the report.

use crate::error::PromptError;
use async_trait::async_trait;
use colored::Colorize;
use std::io::{BufRead, Write};
use tokio::sync::{mpsc, Mutex};

/// Trait for confirmation prompts
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Ask a yes/no question; `Ok(false)` for anything but an explicit yes
    async fn confirm(&self, question: &str) -> Result<bool, PromptError>;
}

/// Answers yes to every question (`--yes`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl Prompt for AutoConfirm {
    async fn confirm(&self, _question: &str) -> Result<bool, PromptError> {
        Ok(true)
    }
}

/// Returns true for `y` or `yes`, ignoring case and surrounding whitespace
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Line read from stdin; `None` once input is exhausted
type InputLine = Option<String>;

/// Prompt on the controlling terminal
///
/// A dedicated thread owns blocking stdin reads so that a pending read never
/// prevents Ctrl-C from being observed.
pub struct TerminalPrompt {
    lines: Mutex<mpsc::UnboundedReceiver<InputLine>>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TerminalPrompt {
    /// Read answers from stdin and ask on stderr
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            loop {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) | Err(_) => {
                        let _ = tx.send(None);
                        break;
                    }
                    Ok(_) => {
                        if tx.send(Some(line)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self::with_io(rx, Box::new(std::io::stderr()))
    }

    fn with_io(lines: mpsc::UnboundedReceiver<InputLine>, out: Box<dyn Write + Send>) -> Self {
        Self {
            lines: Mutex::new(lines),
            out: Mutex::new(out),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompt for TerminalPrompt {
    async fn confirm(&self, question: &str) -> Result<bool, PromptError> {
        let mut out = self.out.lock().await;
        write!(out, "\n{} (y/n) ", question.bold())?;
        out.flush()?;

        let mut lines = self.lines.lock().await;
        let answer = tokio::select! {
            line = lines.recv() => line.flatten(),
            _ = tokio::signal::ctrl_c() => None,
        };
        match answer {
            Some(answer) => Ok(is_affirmative(&answer)),
            None => {
                writeln!(out)?;
                Err(PromptError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer whose bytes stay readable after the prompt takes ownership
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<std::sync::Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn scripted(lines: &[InputLine]) -> (TerminalPrompt, SharedBuf) {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(line.clone()).unwrap();
        }
        let buf = SharedBuf::default();
        (TerminalPrompt::with_io(rx, Box::new(buf.clone())), buf)
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y\n"));
        assert!(is_affirmative(" yes "));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_terminal_prompt_asks_on_its_writer() {
        colored::control::set_override(false);
        let (prompt, buf) = scripted(&[Some("yes\n".to_string()), Some("no\n".to_string())]);

        assert!(prompt.confirm("Apply this patch?").await.unwrap());
        assert!(!prompt.confirm("Apply this patch?").await.unwrap());
        assert_eq!(buf.text(), "\nApply this patch? (y/n) \nApply this patch? (y/n) ");
    }

    #[tokio::test]
    async fn test_terminal_prompt_end_of_input_cancels() {
        colored::control::set_override(false);
        let (prompt, buf) = scripted(&[None]);

        let err = prompt.confirm("Proceed?").await.unwrap_err();
        assert!(matches!(err, PromptError::Cancelled));
        assert!(buf.text().ends_with("(y/n) \n"));
    }

    #[tokio::test]
    async fn test_auto_confirm() {
        assert!(AutoConfirm.confirm("Apply?").await.unwrap());
    }
}
