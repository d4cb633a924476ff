//! Terminal stand-in for the 3-D Secure challenge UI.
//!
//! Prints the challenge parameters and waits for the operator to paste the
//! packed authentication data produced by the ACS.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use checkout_types::{
    ChallengeCompletion, ChallengeFailure, ChallengeHandler, ChallengeWindowSize,
    RuntimeErrorEvent, ThreeDsChallenge,
};

/// Reads challenge results from stdin.
///
/// One buffered reader serves every round, so input typed ahead of a prompt
/// is kept for the next challenge.
pub struct StdinChallenge<R = BufReader<Stdin>> {
    reader: Mutex<R>,
    deadline: Duration,
}

impl StdinChallenge {
    pub fn new(deadline: Duration) -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()), deadline)
    }
}

impl<R> StdinChallenge<R> {
    pub fn with_reader(reader: R, deadline: Duration) -> Self {
        Self {
            reader: Mutex::new(reader),
            deadline,
        }
    }
}

#[async_trait]
impl<R> ChallengeHandler for StdinChallenge<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn perform_challenge(
        &self,
        challenge: &ThreeDsChallenge,
        window: Option<ChallengeWindowSize>,
    ) -> Result<ChallengeCompletion, ChallengeFailure> {
        eprintln!("3-D Secure challenge required");
        eprintln!("  3DS server transaction: {}", challenge.three_ds_server_transaction_id);
        eprintln!("  ACS transaction:        {}", challenge.acs_transaction_id);
        eprintln!("  ACS reference:          {}", challenge.acs_ref_number);
        if let Some(version) = &challenge.message_version {
            eprintln!("  Message version:        {version}");
        }
        if let Some(window) = window {
            eprintln!("  Window:                 {window}");
        }
        eprintln!("  Signed content:         {}", challenge.acs_signed_content);
        eprintln!("Paste the packed authentication data.");
        eprintln!(
            "An empty line cancels, `error: <text>` aborts. {}s left:",
            self.deadline.as_secs()
        );

        let mut line = String::new();
        let mut reader = self.reader.lock().await;
        match tokio::time::timeout(self.deadline, reader.read_line(&mut line)).await {
            Err(_) => Err(ChallengeFailure::Timeout),
            Ok(Err(e)) => Err(ChallengeFailure::Other(Box::new(e))),
            Ok(Ok(0)) => Err(ChallengeFailure::Cancelled),
            Ok(Ok(_)) => parse_reply(&line),
        }
    }
}

/// Interprets one line typed by the operator.
fn parse_reply(line: &str) -> Result<ChallengeCompletion, ChallengeFailure> {
    let reply = line.trim();
    if reply.is_empty() {
        return Err(ChallengeFailure::Cancelled);
    }
    if let Some(message) = reply.strip_prefix("error:") {
        return Err(ChallengeFailure::Runtime(RuntimeErrorEvent {
            error_code: None,
            error_message: message.trim().to_string(),
        }));
    }
    Ok(ChallengeCompletion {
        sdk_transaction_id: uuid::Uuid::new_v4().to_string(),
        transaction_status: "Y".to_string(),
        packed_authentication_data: reply.to_string(),
    })
}
