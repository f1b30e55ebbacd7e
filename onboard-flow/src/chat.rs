//! Chat exchange loop.
//!
//! At most one exchange is outstanding at a time; a `send` made while one is
//! pending is dropped rather than queued. The user's line is appended before
//! the request goes out. The in-flight flag is released when the exchange
//! ends, even if the future is dropped before the backend answers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::{backend::OnboardingBackend, models::ChatEntry};

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended and nothing was sent
    Ignored(IgnoreReason),
    /// The backend's first bot entry was appended
    Replied(ChatEntry),
    /// The backend answered without any bot entry; only the user line was kept
    NoBotReply,
    /// The exchange failed and the fallback line was appended
    Fallback,
}

/// Holds the in-flight flag for one exchange and releases it on drop, so a
/// cancelled or panicking `send` cannot leave the loop blocked.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct ChatLoop {
    backend: Arc<dyn OnboardingBackend>,
    transcript: Arc<Mutex<Vec<ChatEntry>>>,
    in_flight: Arc<AtomicBool>,
}

impl ChatLoop {
    /// A transcript that opens with the assistant's greeting.
    pub fn new(backend: Arc<dyn OnboardingBackend>) -> Self {
        Self::with_transcript(backend, vec![ChatEntry::bot(GREETING)])
    }

    pub fn with_transcript(backend: Arc<dyn OnboardingBackend>, transcript: Vec<ChatEntry>) -> Self {
        Self {
            backend,
            transcript: Arc::new(Mutex::new(transcript)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn transcript(&self) -> Vec<ChatEntry> {
        self.transcript.lock().await.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Chat exchange already in flight; ignoring send");
            return SendOutcome::Ignored(IgnoreReason::InFlight);
        };

        self.transcript.lock().await.push(ChatEntry::user(text));

        let result = self.backend.send_message(text).await;

        let mut transcript = self.transcript.lock().await;
        match result {
            Ok(entries) => match entries.into_iter().find(|entry| entry.is_bot) {
                Some(reply) => {
                    transcript.push(reply.clone());
                    SendOutcome::Replied(reply)
                }
                None => {
                    // Nothing to show; the page stays as it is.
                    warn!("Chat response contained no bot entry");
                    SendOutcome::NoBotReply
                }
            },
            Err(err) => {
                error!("Chat exchange failed: {}", err);
                transcript.push(ChatEntry::bot(FALLBACK_REPLY));
                SendOutcome::Fallback
            }
        }
    }
}
