use anyhow::Result;
use onboard_flow::{ChatLoop, OnboardingBackend, SendOutcome};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const QUIT: &str = "/quit";

pub async fn run_chat(backend: Arc<dyn OnboardingBackend>) -> Result<()> {
    let chat = ChatLoop::new(backend);
    for entry in chat.transcript().await {
        println!("bot> {}", entry.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT {
            break;
        }

        match chat.send(&line).await {
            SendOutcome::Replied(reply) => println!("bot> {}", reply.text),
            SendOutcome::Fallback => {
                if let Some(last) = chat.transcript().await.last() {
                    println!("bot> {}", last.text);
                }
            }
            SendOutcome::NoBotReply | SendOutcome::Ignored(_) => {}
        }
    }

    Ok(())
}
