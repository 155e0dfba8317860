// Prints a channel's raw byte stream indefinitely, until Ctrl+C.
use bipbuffer::blocking::wait_for_data;
use bipbuffer::BipBufferBuilder;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let name = args.get(1).cloned().unwrap_or_else(|| "bipbufferdemo".to_string());

    let channel = BipBufferBuilder::new()
        .with_name(&name)
        .with_buffer_size(1024 * 1024)
        .build_spsc()?;
    let mut reader = channel.reader();

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || running_handler.store(false, Ordering::SeqCst))
        .expect("failed to install Ctrl+C handler");

    println!("blocking consumer: waiting on '{name}', Ctrl+C to stop");
    while running.load(Ordering::SeqCst) {
        if wait_for_data(&mut reader, Duration::from_millis(500)) {
            let chunk = reader.read();
            print!("{}", String::from_utf8_lossy(chunk));
            reader.advance(chunk.len() as u64);
        }
    }
    println!("\nblocking consumer: shutting down");
    Ok(())
}
