use anyhow::{Context, Result};
use marginalia_core::sentence::{self, split_sentences};
use marginalia_core::thread::ThreadIdFormat;
use marginalia_core::thread::id::interpretation_persona_candidate;
use std::io::Read;

pub fn split(text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    for (index, sentence) in split_sentences(&text).iter().enumerate() {
        println!("{index}\t{sentence}");
    }
    Ok(())
}

pub fn encode_address(timestamp: &str, message_index: usize, sentence_index: usize) {
    println!("{}", sentence::encode(timestamp, message_index, sentence_index));
}

pub fn decode_address(id: &str) -> Result<()> {
    let address = sentence::decode(id)?;
    println!("timestamp:      {}", address.message_timestamp);
    println!("message index:  {}", address.message_index);
    println!("sentence index: {}", address.sentence_index);
    Ok(())
}

pub fn classify(thread_id: &str) {
    let format = match ThreadIdFormat::classify(thread_id) {
        ThreadIdFormat::Legacy => "legacy",
        ThreadIdFormat::Current => "current",
    };
    println!("format:  {format}");
    if let Some(persona) = interpretation_persona_candidate(thread_id) {
        println!("persona: {persona}");
    }
}
