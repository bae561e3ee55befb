use std::io;

use async_trait::async_trait;
use question::{Answer, Question};

/// Reads a single free-form line from the operator
#[async_trait]
pub trait Prompt: Send {
    async fn read_line(&mut self, message: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal. The read happens on the blocking pool so an interrupt
/// can still be observed while waiting for input.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl Prompt for TerminalPrompt {
    async fn read_line(&mut self, message: &str) -> io::Result<String> {
        let message = message.to_owned();
        let answer = tokio::task::spawn_blocking(move || Question::new(&message).ask())
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        answer_text(answer)
    }
}

/// `question` yields no answer when stdin is closed or unreadable
fn answer_text(answer: Option<Answer>) -> io::Result<String> {
    match answer {
        Some(Answer::RESPONSE(response)) => Ok(response),
        Some(Answer::YES) => Ok("yes".to_owned()),
        Some(Answer::NO) => Ok("no".to_owned()),
        None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer read from terminal")),
    }
}
