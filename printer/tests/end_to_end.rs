use core::net::Ipv4Addr;
use core::time::Duration;

use approx::assert_abs_diff_eq;
use common::mock::{MockPwm, RecordingDisplay, RecordingReporter, SimulatedMachine};
use common::{AxisIndex, StatusSnapshot};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use motion::homing::HomingState;
use motion::MotionError;
use parser::CommandError;
use pen::PenError;
use printer::{Inbox, Packet, Printer, PrinterConfig, PrinterEvent};

type TestPrinter = Printer<SimulatedMachine, MockPwm, RecordingDisplay, RecordingReporter>;

const ALLOWED: Ipv4Addr = Ipv4Addr::new(128, 199, 7, 114);
const DT: Duration = Duration::from_millis(10);
const PEN_FORWARD: u8 = 0;
const PEN_BACKWARD: u8 = 1;

fn printer_with(machine: SimulatedMachine) -> TestPrinter {
    Printer::new(
        PrinterConfig::default(),
        machine,
        MockPwm::new(4096),
        (PEN_FORWARD, PEN_BACKWARD),
        RecordingDisplay::default(),
        RecordingReporter::default(),
    )
}

fn printer() -> TestPrinter {
    printer_with(SimulatedMachine::new([260, 260, 260], [10, 10, 10]))
}

fn run_until_idle(p: &mut TestPrinter, inbox: &Inbox<CriticalSectionRawMutex>) {
    for _ in 0..2000 {
        if p.motion().is_idle() {
            return;
        }
        p.tick(inbox, DT);
    }
    panic!("motion never settled");
}

#[test]
fn test_power_button_homes_and_centers() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer_with(SimulatedMachine::new([240, 180, 120], [30, 150, 60]));

    inbox.post_ir_code(parser::ir::parse_code("ba45ff00").unwrap());
    let events = p.tick(&inbox, DT);
    assert!(events.is_empty());
    assert!(p.motion().all_ready());
    for axis in AxisIndex::ALL {
        let travel = p.io().travel(axis) as f32;
        assert_abs_diff_eq!(p.motion().axis(axis).max(), travel);
    }

    run_until_idle(&mut p, &inbox);
    assert_abs_diff_eq!(p.motion().axis(AxisIndex::Planar0).position(), 120.0, epsilon = 1e-3);
    assert_abs_diff_eq!(p.motion().axis(AxisIndex::Planar1).position(), 90.0, epsilon = 1e-3);
    assert_abs_diff_eq!(p.motion().axis(AxisIndex::Vertical).position(), 0.0, epsilon = 1e-3);

    assert_eq!(p.display().last_alert.as_str(), "Initializing...");
    assert!(p.display().ready);
    assert_eq!(p.reporter().last, Some(StatusSnapshot { initialized: true }));
}

#[test]
fn test_power_button_with_dead_switch() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut machine = SimulatedMachine::new([100, 100, 100], [50, 50, 50]);
    machine.disconnect_switches(AxisIndex::Planar0);
    let mut p = printer_with(machine);

    inbox.post_ir_raw(0xba45ff00);
    let events = p.tick(&inbox, DT);
    assert_eq!(
        &events[..],
        &[PrinterEvent::Motion(MotionError::HomingFailed {
            axis: AxisIndex::Planar0,
            state: HomingState::SeekingMin
        })]
    );
    assert!(!p.motion().all_ready());
    assert!(!p.display().ready);
    assert!(p.display().last_alert.starts_with("Motion error: Homing failed"));
}

#[test]
fn test_pen_fwd_toggles() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();

    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_FWD"}"#));
    assert!(p.tick(&inbox, DT).is_empty());
    assert!(p.pen().is_extruding());
    assert!(p.pwm().channel(PEN_FORWARD).enabled);

    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_FWD"}"#));
    assert!(p.tick(&inbox, DT).is_empty());
    assert!(!p.pen().is_extruding());
    assert!(!p.pwm().channel(PEN_FORWARD).enabled);
}

#[test]
fn test_pen_speed_from_packet() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_BCK","SPEED":25}"#));
    p.tick(&inbox, DT);
    assert!(p.pen().is_retracting());
    assert_eq!(p.pen().speed(), 25);
    assert_eq!(p.pwm().channel(PEN_BACKWARD).duty_cycle, 1024);
}

#[test]
fn test_rejected_toggle_keeps_speed() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_BCK"}"#));
    assert!(p.tick(&inbox, DT).is_empty());
    let duty = p.pwm().channel(PEN_BACKWARD).duty_cycle;

    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_FWD","SPEED":10}"#));
    let events = p.tick(&inbox, DT);
    assert_eq!(&events[..], &[PrinterEvent::Pen(PenError::Retracting)]);
    assert_eq!(p.pen().speed(), 100);
    assert!(p.pen().is_retracting());
    assert_eq!(p.pwm().channel(PEN_BACKWARD).duty_cycle, duty);
    assert!(!p.pwm().channel(PEN_FORWARD).enabled);
}

#[test]
fn test_non_string_command_unrecognized() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":3}"#));
    let events = p.tick(&inbox, DT);
    assert_eq!(
        &events[..],
        &[PrinterEvent::Command(CommandError::UnrecognizedCommand)]
    );
    assert_eq!(p.display().last_alert.as_str(), "Requested action not recognized");
}

#[test]
fn test_unrecognized_command_changes_nothing() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"FOO"}"#));
    let events = p.tick(&inbox, DT);

    assert_eq!(
        &events[..],
        &[PrinterEvent::Command(CommandError::UnrecognizedCommand)]
    );
    assert_eq!(p.display().last_alert.as_str(), "Requested action not recognized");
    assert!(!p.pen().is_extruding());
    assert!(!p.pen().is_retracting());
    assert!(!p.pen().is_heating());
    assert!(p.motion().is_idle());
    assert!(!p.motion().all_ready());
    for axis in AxisIndex::ALL {
        assert_eq!(p.io().pulses(axis), 0);
    }
}

#[test]
fn test_packet_errors() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    let cases: [(Ipv4Addr, &[u8], CommandError); 3] = [
        (
            Ipv4Addr::new(192, 168, 1, 7),
            br#"{"CMD":"PEN_FWD"}"#,
            CommandError::UnknownSource,
        ),
        (ALLOWED, br#"{"SPEED":50}"#, CommandError::MissingCommand),
        (ALLOWED, b"PEN_FWD", CommandError::MalformedPayload),
    ];
    for (source, payload, error) in cases {
        inbox.post_packet(Packet::new(source, payload));
        let events = p.tick(&inbox, DT);
        assert_eq!(&events[..], &[PrinterEvent::Command(error)]);
        assert!(!p.pen().is_extruding());
    }
    assert_eq!(p.display().alerts, 3);
}

#[test]
fn test_ir_and_packet_in_same_tick() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_ir_raw(0xe916ff00);
    inbox.post_packet(Packet::new(ALLOWED, br#"{"CMD":"PEN_BCK"}"#));
    assert!(p.tick(&inbox, DT).is_empty());
    assert!(p.motion().all_ready());
    assert!(p.pen().is_retracting());
}

#[test]
fn test_scripted_moves_from_remote() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_ir_raw(0xe916ff00);
    p.tick(&inbox, DT);

    inbox.post_ir_raw(0xbf40ff00);
    p.tick(&inbox, DT);
    run_until_idle(&mut p, &inbox);
    for axis in AxisIndex::ALL {
        assert_abs_diff_eq!(p.motion().axis(axis).position(), 130.0);
    }

    inbox.post_ir_raw(0xbb44ff00);
    p.tick(&inbox, DT);
    run_until_idle(&mut p, &inbox);
    for axis in AxisIndex::ALL {
        assert_abs_diff_eq!(p.motion().axis(axis).position(), 0.0);
    }
}

#[test]
fn test_remote_jog() {
    let inbox: Inbox<CriticalSectionRawMutex> = Inbox::new();
    let mut p = printer();
    inbox.post_ir_raw(0xe916ff00);
    p.tick(&inbox, DT);

    inbox.post_ir_raw(0xb946ff00);
    for _ in 0..6 {
        p.tick(&inbox, DT);
    }
    inbox.post_ir_raw(0xb946ff00);
    p.tick(&inbox, DT);
    assert!(p.motion().is_idle());
    assert_abs_diff_eq!(p.motion().axis(AxisIndex::Vertical).position(), 6.0);
}
