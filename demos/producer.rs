// Streams hashed, newline-delimited messages into a named SPSC channel.
use bipbuffer::blocking::wait_for_space;
use bipbuffer::BipBufferBuilder;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <channel_name> <message_count>", args[0]);
        std::process::exit(1);
    }
    let name = &args[1];
    let message_count: usize = args[2].parse().expect("invalid message count");

    let channel = BipBufferBuilder::new()
        .with_name(name)
        .with_buffer_size(1024 * 1024)
        .build_spsc()?;

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || running_handler.store(false, Ordering::SeqCst))
        .expect("failed to install Ctrl+C handler");

    println!("producer: streaming {message_count} messages on '{name}'");
    let start = Instant::now();
    let mut sent = 0usize;

    for i in 0..message_count {
        if !running.load(Ordering::SeqCst) {
            println!("producer: interrupted after {sent} messages");
            break;
        }

        let mut hasher = Sha256::new();
        hasher.update(format!("message_{i}").as_bytes());
        let line = format!("{i}:{:x}\n", hasher.finalize());
        let bytes = line.as_bytes();

        let mut writer = channel.writer();
        match wait_for_space(Duration::from_secs(5), || writer.reserve(bytes.len())) {
            Some(mut reservation) => {
                reservation.data().copy_from_slice(bytes);
                sent += 1;
            }
            None => {
                eprintln!("producer: timed out waiting for space at message {i}");
                break;
            }
        }
    }

    println!("producer: sent {sent} messages in {:.2?}", start.elapsed());
    Ok(())
}
