// Reads a newline-delimited stream from a named SPSC channel and verifies
// each message's hash against the producer's message index.
use bipbuffer::blocking::wait_for_data;
use bipbuffer::BipBufferBuilder;
use sha2::{Digest, Sha256};
use std::env;
use std::time::{Duration, Instant};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <channel_name> <expected_messages>", args[0]);
        std::process::exit(1);
    }
    let name = &args[1];
    let expected: usize = args[2].parse().expect("invalid expected message count");

    let channel = BipBufferBuilder::new()
        .with_name(name)
        .with_buffer_size(1024 * 1024)
        .build_spsc()?;

    let mut reader = channel.reader();
    let mut pending = String::new();
    let mut received = 0usize;
    let mut mismatches = 0usize;
    let start = Instant::now();

    println!("consumer: waiting for {expected} messages on '{name}'");

    while received < expected {
        if !wait_for_data(&mut reader, Duration::from_secs(5)) {
            eprintln!("consumer: timed out after {received} messages");
            break;
        }

        let chunk = reader.read();
        pending.push_str(&String::from_utf8_lossy(chunk));
        let consumed = chunk.len() as u64;
        reader.advance(consumed);

        while let Some(pos) = pending.find('\n') {
            let line: String = pending.drain(..=pos).collect();
            let line = line.trim_end_matches('\n');
            if let Some((idx_str, claimed_hash)) = line.split_once(':') {
                let mut hasher = Sha256::new();
                hasher.update(format!("message_{idx_str}").as_bytes());
                let expected_hash = format!("{:x}", hasher.finalize());
                if expected_hash != claimed_hash {
                    mismatches += 1;
                    eprintln!("consumer: hash mismatch at message {idx_str}");
                }
            } else {
                eprintln!("consumer: malformed line {line:?}");
            }
            received += 1;
        }
    }

    let elapsed = start.elapsed();
    println!("consumer: received {received} messages ({mismatches} mismatches) in {elapsed:.2?}");
    if mismatches == 0 && received == expected {
        println!("consumer: all messages verified");
    }

    Ok(())
}
