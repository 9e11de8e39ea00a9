use std::env;
use std::error::Error;
use std::io::{self, BufRead};
use std::net::{SocketAddr, UdpSocket};
use std::thread;

use common::mock::{MockPwm, SimulatedMachine};
use common::AxisIndex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{error, info, warn};
use printer::{Inbox, Packet, Printer};
use simple_logger::SimpleLogger;

mod config;
mod console;

use config::SimulatorConfig;
use console::{LogDisplay, LogReporter};

const DEFAULT_CONFIG_PATH: &str = "simulator.toml";
const MAX_DATAGRAM_LEN: usize = 512;
const PWM_MAX_DUTY: u64 = 4096;
const PEN_FORWARD: u8 = 0;
const PEN_BACKWARD: u8 = 1;

static INBOX: Inbox<CriticalSectionRawMutex> = Inbox::new();

fn network_listener(socket: UdpSocket) {
    let mut buf = [0u8; MAX_DATAGRAM_LEN];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((n, SocketAddr::V4(source))) => {
                info!("[NETWORK] {} bytes from {}", n, source);
                INBOX.post_packet(Packet::new(*source.ip(), &buf[..n]));
            }
            Ok((_, source)) => warn!("[NETWORK] ignoring IPv6 source {}", source),
            Err(e) => error!("[NETWORK] cannot receive: {}", e),
        }
    }
}

fn remote_listener() {
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("[REMOTE] cannot read stdin: {}", e);
                return;
            }
        };
        match parser::ir::parse_code(&line) {
            Some(code) => INBOX.post_ir_code(code),
            None => warn!("[REMOTE] {:?} is not an IR code", line.trim()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()?;

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let conf: SimulatorConfig = confy::load_path(&path)?;
    info!("Loaded configuration from {}", path);

    let socket = UdpSocket::bind(conf.listen_address.as_str())?;
    info!("Listening for command packets on {}", conf.listen_address);
    thread::spawn(move || network_listener(socket));
    thread::spawn(remote_listener);

    let mut printer = Printer::new(
        conf.printer_config()?,
        SimulatedMachine::new(conf.machine.travel, conf.machine.carriage),
        MockPwm::new(PWM_MAX_DUTY),
        (PEN_FORWARD, PEN_BACKWARD),
        LogDisplay,
        LogReporter,
    );
    printer.refresh_display();

    let dt = conf.tick_period();
    let mut was_idle = true;
    loop {
        printer.tick(&INBOX, dt);

        let idle = printer.motion().is_idle();
        if idle && !was_idle {
            let m = printer.motion();
            info!(
                "[MOTION] settled at ({:.2}, {:.2}, {:.2})",
                m.axis(AxisIndex::Planar0).position(),
                m.axis(AxisIndex::Planar1).position(),
                m.axis(AxisIndex::Vertical).position(),
            );
        }
        was_idle = idle;

        thread::sleep(dt);
    }
}
