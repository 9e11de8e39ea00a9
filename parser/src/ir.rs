use core::fmt::Write;

use heapless::String;

pub const IR_CODE_LEN: usize = 8;

/// Decoded remote code: 8 lowercase hex digits.
pub type IrCode = String<IR_CODE_LEN>;

static IR_POWER: &str = "ba45ff00";
static IR_VOL_UP: &str = "b946ff00";
static IR_FUNC: &str = "b847ff00";
static IR_BACK: &str = "bb44ff00";
static IR_PLAY: &str = "bf40ff00";
static IR_FORWARD: &str = "bc43ff00";
static IR_DOWN: &str = "f807ff00";
static IR_VOL_DOWN: &str = "ea15ff00";
static IR_UP: &str = "f609ff00";
static IR_EQ: &str = "e619ff00";
static IR_REPEAT: &str = "f20dff00";
static IR_DIGITS: [&str; 10] = [
    "e916ff00", "f30cff00", "e718ff00", "a15eff00", "f708ff00", "e31cff00", "a55aff00",
    "bd42ff00", "ad52ff00", "b54aff00",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum IrButton {
    Power,
    VolumeUp,
    Func,
    Back,
    Play,
    Forward,
    Down,
    VolumeDown,
    Up,
    Eq,
    Repeat,
    // 0..=9
    Digit(u8),
}

impl IrButton {
    pub fn from_code(code: &str) -> Option<Self> {
        let button = match code {
            c if c == IR_POWER => IrButton::Power,
            c if c == IR_VOL_UP => IrButton::VolumeUp,
            c if c == IR_FUNC => IrButton::Func,
            c if c == IR_BACK => IrButton::Back,
            c if c == IR_PLAY => IrButton::Play,
            c if c == IR_FORWARD => IrButton::Forward,
            c if c == IR_DOWN => IrButton::Down,
            c if c == IR_VOL_DOWN => IrButton::VolumeDown,
            c if c == IR_UP => IrButton::Up,
            c if c == IR_EQ => IrButton::Eq,
            c if c == IR_REPEAT => IrButton::Repeat,
            c => {
                let digit = IR_DIGITS.iter().position(|d| *d == c)?;
                IrButton::Digit(digit as u8)
            }
        };
        Some(button)
    }

    /// `None` for a digit outside `0..=9`.
    pub fn code(&self) -> Option<&'static str> {
        let code = match self {
            IrButton::Power => IR_POWER,
            IrButton::VolumeUp => IR_VOL_UP,
            IrButton::Func => IR_FUNC,
            IrButton::Back => IR_BACK,
            IrButton::Play => IR_PLAY,
            IrButton::Forward => IR_FORWARD,
            IrButton::Down => IR_DOWN,
            IrButton::VolumeDown => IR_VOL_DOWN,
            IrButton::Up => IR_UP,
            IrButton::Eq => IR_EQ,
            IrButton::Repeat => IR_REPEAT,
            IrButton::Digit(n) => return IR_DIGITS.get(usize::from(*n)).copied(),
        };
        Some(code)
    }
}

/// Render a raw decoder value the way the code table spells it.
pub fn format_code(raw: u32) -> IrCode {
    let mut code = IrCode::new();
    // 8 hex digits always fit
    let _ = core::write!(code, "{:08x}", raw);
    code
}

/// Copy a textual code, `None` when it cannot be an IR code.
pub fn parse_code(text: &str) -> Option<IrCode> {
    let text = text.trim();
    if text.len() != IR_CODE_LEN || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let mut code = IrCode::new();
    for c in text.chars() {
        code.push(c.to_ascii_lowercase()).ok()?;
    }
    Some(code)
}
