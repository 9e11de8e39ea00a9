use std::env;
use std::error::Error;
use std::fs;
use std::io::BufRead;
use std::io::BufReader;
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use parser::CommandPacket;
use simple_logger::SimpleLogger;

// the firmware keeps one pending packet, give it time to consume each
const DEFAULT_INTERVAL_MS: u64 = 500;

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    let args: Vec<String> = env::args().collect();
    let address = args.get(1).ok_or("Address not specified")?;
    let file_path = args.get(2).ok_or("File not specified")?;
    let interval = match args.get(3) {
        Some(ms) => Duration::from_millis(ms.parse()?),
        None => Duration::from_millis(DEFAULT_INTERVAL_MS),
    };

    let file = fs::File::open(file_path)?;
    let bufreader = BufReader::new(file);
    let socket = UdpSocket::bind("0.0.0.0:0")?;

    for (n, l) in bufreader.lines().enumerate() {
        let line = l?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = CommandPacket::parse(line.as_bytes()) {
            warn!("line {}: {}, skipped", n + 1, e);
            continue;
        }
        socket.send_to(line.as_bytes(), address.as_str())?;
        info!("{} sent", line);
        thread::sleep(interval);
    }

    Ok(())
}
