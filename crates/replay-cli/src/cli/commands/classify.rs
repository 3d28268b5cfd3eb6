//! `replay classify <status>` – show the classified kind and message.

use anyhow::Result;
use replay_core::classify::classify_status;

pub fn run_classify(status: u16) -> Result<()> {
    let c = classify_status(Some(status));
    println!("kind:      {}", c.kind);
    println!("retryable: {}", if c.is_retryable() { "yes" } else { "no" });
    println!("message:   {}", c.message);
    Ok(())
}
