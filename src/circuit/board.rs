use crate::error::WiringError;

/// A supported micro-controller and where its pins land on the breadboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicroController {
    pub name: &'static str,
    /// Breadboard columns the board's own headers cover.
    pub skip_holes: &'static [u32],
    pins: &'static [(&'static str, &'static str)],
}

const UNO_PINS: &[(&str, &str)] = &[
    ("2", "pin7E"),
    ("3", "pin10E"),
    ("4", "pin13E"),
    ("5", "pin16E"),
    ("6", "pin19E"),
    ("7", "pin22E"),
    ("8", "pin25E"),
    ("9", "pin28E"),
    ("10", "pin31E"),
    ("11", "pin34E"),
    ("12", "pin37E"),
    ("13", "pin40E"),
    ("A0", "pin44F"),
    ("A1", "pin47F"),
    ("A2", "pin50F"),
    ("A3", "pin53F"),
    ("A4", "pin56F"),
    ("A5", "pin59F"),
];

const MEGA_PINS: &[(&str, &str)] = &[
    ("2", "pin9E"),
    ("3", "pin12E"),
    ("4", "pin15E"),
    ("5", "pin18E"),
    ("6", "pin21E"),
    ("7", "pin24E"),
    ("8", "pin27E"),
    ("9", "pin30E"),
    ("10", "pin33E"),
    ("11", "pin36E"),
    ("12", "pin39E"),
    ("13", "pin42E"),
    ("A0", "pin46F"),
    ("A1", "pin49F"),
    ("A2", "pin52F"),
    ("A3", "pin55F"),
    ("A4", "pin58F"),
    ("A5", "pin61F"),
];

pub const UNO: MicroController = MicroController {
    name: "uno",
    skip_holes: &[],
    pins: UNO_PINS,
};

pub const MEGA: MicroController = MicroController {
    name: "mega",
    skip_holes: &[4, 5, 6],
    pins: MEGA_PINS,
};

impl MicroController {
    /// Look up a board by the id the editor uses. Unknown ids have no layout.
    pub fn for_board(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "uno" => Some(UNO),
            "mega" => Some(MEGA),
            _ => None,
        }
    }

    /// Breadboard hole id (`pin{column}{row}`) wired to `pin`.
    pub fn pin_to_breadboard_hole(&self, pin: &str) -> Result<&'static str, WiringError> {
        self.pins
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, hole)| *hole)
            .ok_or_else(|| WiringError::UnknownPin {
                pin: pin.to_string(),
                board: self.name,
            })
    }

    pub fn pin_column(&self, pin: &str) -> Result<u32, WiringError> {
        let hole = self.pin_to_breadboard_hole(pin)?;
        Ok(hole_column(hole))
    }
}

/// Column number of a hole id such as `pin13E`.
pub fn hole_column(hole_id: &str) -> u32 {
    hole_id
        .trim_start_matches("pin")
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}
