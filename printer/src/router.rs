use core::net::Ipv4Addr;

use common::{AxisIndex, Direction, AXIS_COUNT};
use heapless::Vec;
use parser::{CommandError, CommandPacket, Intent, IrButton, PacketCommand};

use crate::{inbox::Packet, inputs::InputEvent};

pub const MAX_INTENTS: usize = 4;

pub type Intents = Vec<Intent, MAX_INTENTS>;

/// One decoded input, whatever channel it came from.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    Ir(&'a str),
    Packet(&'a Packet),
    Button(InputEvent),
}

/// The slice of machine state the routing decisions depend on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouterState {
    pub pen_hot: bool,
    pub jog: [Option<Direction>; AXIS_COUNT],
}

/// Map an input event onto intents. No state is touched here.
pub fn route(
    event: &Event,
    state: &RouterState,
    allowed_source: Ipv4Addr,
) -> Result<Intents, CommandError> {
    match event {
        Event::Ir(code) => Ok(route_ir(code, state)),
        Event::Packet(packet) => route_packet(packet, allowed_source),
        Event::Button(input) => Ok(route_button(*input, state)),
    }
}

fn single(intent: Intent) -> Intents {
    let mut intents = Intents::new();
    // never full with one element
    let _ = intents.push(intent);
    intents
}

fn toggle_jog(state: &RouterState, axis: AxisIndex, direction: Direction) -> Intent {
    if state.jog[axis.index()] == Some(direction) {
        Intent::JogEnd { axis }
    } else {
        Intent::JogBegin { axis, direction }
    }
}

fn route_ir(code: &str, state: &RouterState) -> Intents {
    let Some(button) = IrButton::from_code(code) else {
        #[cfg(feature = "defmt-log")]
        defmt::debug!("ignoring IR code {}", code);
        return Intents::new();
    };

    let intent = match button {
        IrButton::Power => Intent::FullInit,
        IrButton::Digit(0) => Intent::SoftInit,
        IrButton::Back => Intent::MoveToOrigin,
        IrButton::Forward => Intent::MoveToMax,
        IrButton::Play => Intent::MoveToCenter,
        IrButton::VolumeUp => toggle_jog(state, AxisIndex::Vertical, Direction::Positive),
        IrButton::VolumeDown => toggle_jog(state, AxisIndex::Vertical, Direction::Negative),
        IrButton::Func if state.pen_hot => Intent::PenToggleExtrude,
        IrButton::Func => Intent::PenHeat,
        IrButton::Up => Intent::PenToggleExtrude,
        IrButton::Down => Intent::PenToggleRetract,
        IrButton::Digit(n) => Intent::PenSetSpeed(n.saturating_mul(10)),
        IrButton::Eq | IrButton::Repeat => {
            #[cfg(feature = "defmt-log")]
            defmt::debug!("IR button {} has no action", button);
            return Intents::new();
        }
    };
    single(intent)
}

fn route_packet(packet: &Packet, allowed_source: Ipv4Addr) -> Result<Intents, CommandError> {
    if packet.source != allowed_source {
        return Err(CommandError::UnknownSource);
    }
    if packet.oversized {
        return Err(CommandError::MalformedPayload);
    }
    let command = CommandPacket::parse(&packet.payload)?;

    let mut intents = single(match command.command {
        PacketCommand::PenOn => Intent::PenHeat,
        PacketCommand::PenFwd => Intent::PenToggleExtrude,
        PacketCommand::PenBck => Intent::PenToggleRetract,
    });
    // the speed only lands if the toggle was accepted
    if let Some(speed) = command.speed {
        let _ = intents.push(Intent::PenSetSpeed(speed));
    }
    Ok(intents)
}

fn route_button(input: InputEvent, state: &RouterState) -> Intents {
    match input {
        InputEvent::JogPressed { axis, direction } => single(Intent::JogBegin { axis, direction }),
        // a release only ends the jog its own button started
        InputEvent::JogReleased { axis, direction } if state.jog[axis.index()] == Some(direction) => {
            single(Intent::JogEnd { axis })
        }
        InputEvent::JogReleased { .. } | InputEvent::RefreshPressed => Intents::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: Ipv4Addr = Ipv4Addr::new(128, 199, 7, 114);

    fn route_code(code: &str, state: &RouterState) -> Intents {
        route(&Event::Ir(code), state, ALLOWED).unwrap()
    }

    fn route_payload(source: Ipv4Addr, payload: &[u8]) -> Result<Intents, CommandError> {
        let packet = Packet::new(source, payload);
        route(&Event::Packet(&packet), &RouterState::default(), ALLOWED)
    }

    #[test]
    fn test_route_ir_motion() {
        let s = RouterState::default();
        assert_eq!(&route_code("ba45ff00", &s)[..], &[Intent::FullInit]);
        assert_eq!(&route_code("e916ff00", &s)[..], &[Intent::SoftInit]);
        assert_eq!(&route_code("bb44ff00", &s)[..], &[Intent::MoveToOrigin]);
        assert_eq!(&route_code("bc43ff00", &s)[..], &[Intent::MoveToMax]);
        assert_eq!(&route_code("bf40ff00", &s)[..], &[Intent::MoveToCenter]);
    }

    #[test]
    fn test_route_ir_pen() {
        let cold = RouterState::default();
        let hot = RouterState {
            pen_hot: true,
            ..Default::default()
        };
        assert_eq!(&route_code("b847ff00", &cold)[..], &[Intent::PenHeat]);
        assert_eq!(&route_code("b847ff00", &hot)[..], &[Intent::PenToggleExtrude]);
        assert_eq!(&route_code("f609ff00", &cold)[..], &[Intent::PenToggleExtrude]);
        assert_eq!(&route_code("f807ff00", &cold)[..], &[Intent::PenToggleRetract]);
        assert_eq!(&route_code("f30cff00", &cold)[..], &[Intent::PenSetSpeed(10)]);
        assert_eq!(&route_code("b54aff00", &cold)[..], &[Intent::PenSetSpeed(90)]);
    }

    #[test]
    fn test_route_ir_jog_toggle() {
        let mut s = RouterState::default();
        assert_eq!(
            &route_code("b946ff00", &s)[..],
            &[Intent::JogBegin {
                axis: AxisIndex::Vertical,
                direction: Direction::Positive
            }]
        );
        s.jog[AxisIndex::Vertical.index()] = Some(Direction::Positive);
        assert_eq!(
            &route_code("b946ff00", &s)[..],
            &[Intent::JogEnd {
                axis: AxisIndex::Vertical
            }]
        );
        // the other button reverses instead of stopping
        assert_eq!(
            &route_code("ea15ff00", &s)[..],
            &[Intent::JogBegin {
                axis: AxisIndex::Vertical,
                direction: Direction::Negative
            }]
        );
    }

    #[test]
    fn test_route_ir_ignored() {
        let s = RouterState::default();
        assert!(route_code("e619ff00", &s).is_empty());
        assert!(route_code("f20dff00", &s).is_empty());
        assert!(route_code("00000000", &s).is_empty());
        assert!(route_code("", &s).is_empty());
    }

    #[test]
    fn test_route_packet() {
        let intents = route_payload(ALLOWED, br#"{"CMD":"PEN_FWD"}"#).unwrap();
        assert_eq!(&intents[..], &[Intent::PenToggleExtrude]);
        let intents = route_payload(ALLOWED, br#"{"CMD":"PEN_BCK"}"#).unwrap();
        assert_eq!(&intents[..], &[Intent::PenToggleRetract]);
        let intents = route_payload(ALLOWED, br#"{"CMD":"PEN_ON"}"#).unwrap();
        assert_eq!(&intents[..], &[Intent::PenHeat]);
    }

    #[test]
    fn test_route_packet_speed_after_toggle() {
        let intents = route_payload(ALLOWED, br#"{"CMD":"PEN_FWD","SPEED":35}"#).unwrap();
        assert_eq!(
            &intents[..],
            &[Intent::PenToggleExtrude, Intent::PenSetSpeed(35)]
        );
    }

    #[test]
    fn test_route_packet_errors() {
        assert_eq!(
            route_payload(Ipv4Addr::new(10, 0, 0, 1), br#"{"CMD":"PEN_FWD"}"#),
            Err(CommandError::UnknownSource)
        );
        // the source is checked before the payload is looked at
        assert_eq!(
            route_payload(Ipv4Addr::new(10, 0, 0, 1), b"garbage"),
            Err(CommandError::UnknownSource)
        );
        assert_eq!(
            route_payload(ALLOWED, br#"{"CMD":"FOO"}"#),
            Err(CommandError::UnrecognizedCommand)
        );
        assert_eq!(
            route_payload(ALLOWED, br#"{"CMD":3}"#),
            Err(CommandError::UnrecognizedCommand)
        );
        assert_eq!(
            route_payload(ALLOWED, br#"{"SPEED":20}"#),
            Err(CommandError::MissingCommand)
        );
        assert_eq!(
            route_payload(ALLOWED, b"{"),
            Err(CommandError::MalformedPayload)
        );
        let long = [b' '; 256];
        assert_eq!(
            route_payload(ALLOWED, &long),
            Err(CommandError::MalformedPayload)
        );
    }

    #[test]
    fn test_route_buttons() {
        let mut s = RouterState::default();
        let press = InputEvent::JogPressed {
            axis: AxisIndex::Planar0,
            direction: Direction::Negative,
        };
        let release = InputEvent::JogReleased {
            axis: AxisIndex::Planar0,
            direction: Direction::Negative,
        };
        let intents = route(&Event::Button(press), &s, ALLOWED).unwrap();
        assert_eq!(
            &intents[..],
            &[Intent::JogBegin {
                axis: AxisIndex::Planar0,
                direction: Direction::Negative
            }]
        );

        // not jogging that way: nothing to end
        assert!(route(&Event::Button(release), &s, ALLOWED)
            .unwrap()
            .is_empty());

        s.jog[AxisIndex::Planar0.index()] = Some(Direction::Negative);
        let intents = route(&Event::Button(release), &s, ALLOWED).unwrap();
        assert_eq!(
            &intents[..],
            &[Intent::JogEnd {
                axis: AxisIndex::Planar0
            }]
        );
        assert!(route(&Event::Button(InputEvent::RefreshPressed), &s, ALLOWED)
            .unwrap()
            .is_empty());
    }
}
