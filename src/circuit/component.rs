//! Circuit components.
//!
//! Every component is a single branch between two junctions. Its kind only
//! decides how the resistance and electromotive force are filled in:
//!
//! | Kind | Resistance | EMF |
//! |------|------------|-----|
//! | Wire | 0 | 0 |
//! | Resistor | given | 0 |
//! | Battery | internal (default 0) | given |
//! | Ammeter | 0 | 0 |
//! | Voltmeter | open circuit | 0 |
//!
//! A battery's EMF acts from its tail (negative terminal) to its head
//! (positive terminal).

use std::fmt;
use std::str::FromStr;

use crate::error::{KirchhoffError, Result};
use crate::graph::VertexId;
use crate::solver::Element;

/// Resistance of an ideal open circuit.
pub const OPEN_CIRCUIT: f64 = f64::INFINITY;

/// The electrical role of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Wire,
    Resistor,
    Battery,
    Ammeter,
    Voltmeter,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Wire => "wire",
            ComponentKind::Resistor => "resistor",
            ComponentKind::Battery => "battery",
            ComponentKind::Ammeter => "ammeter",
            ComponentKind::Voltmeter => "voltmeter",
        };
        f.write_str(name)
    }
}

/// Branch payload: component values plus the solved current and voltage.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub kind: ComponentKind,
    /// Resistance in ohms ([`OPEN_CIRCUIT`] for a voltmeter)
    pub resistance: f64,
    /// Electromotive force in volts
    pub emf: f64,
    /// Solved current from tail to head
    pub current: f64,
    /// Solved voltage drop from tail to head
    pub voltage: f64,
}

impl Branch {
    fn new(kind: ComponentKind, resistance: f64, emf: f64) -> Self {
        Self {
            kind,
            resistance,
            emf,
            current: 0.0,
            voltage: if emf == 0.0 { 0.0 } else { -emf },
        }
    }

    /// An ideal wire.
    pub fn wire() -> Self {
        Self::new(ComponentKind::Wire, 0.0, 0.0)
    }

    pub fn resistor(resistance: f64) -> Self {
        Self::new(ComponentKind::Resistor, resistance, 0.0)
    }

    /// An ideal cell.
    pub fn battery(emf: f64) -> Self {
        Self::new(ComponentKind::Battery, 0.0, emf)
    }

    pub fn battery_with_resistance(emf: f64, internal_resistance: f64) -> Self {
        Self::new(ComponentKind::Battery, internal_resistance, emf)
    }

    /// An ideal ammeter: zero resistance.
    pub fn ammeter() -> Self {
        Self::new(ComponentKind::Ammeter, 0.0, 0.0)
    }

    /// An ideal voltmeter: open circuit.
    pub fn voltmeter() -> Self {
        Self::new(ComponentKind::Voltmeter, OPEN_CIRCUIT, 0.0)
    }

    pub fn is_open(&self) -> bool {
        self.resistance.is_infinite()
    }

    /// Reading of a measuring instrument: current for an ammeter, voltage
    /// for a voltmeter.
    pub fn reading(&self) -> Option<f64> {
        match self.kind {
            ComponentKind::Ammeter => Some(self.current),
            ComponentKind::Voltmeter => Some(self.voltage),
            _ => None,
        }
    }
}

impl Element for Branch {
    fn resistance(&self) -> f64 {
        self.resistance
    }

    fn electromotive_force(&self) -> f64 {
        self.emf
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            write!(
                f,
                "{}\tR:\u{221e}\tE:{}\tI:{}\tU:{}",
                self.kind, self.emf, self.current, self.voltage
            )
        } else {
            write!(
                f,
                "{}\tR:{}\tE:{}\tI:{}\tU:{}",
                self.kind, self.resistance, self.emf, self.current, self.voltage
            )
        }
    }
}

/// A branch together with its endpoints, as written on the command line:
/// `KIND:TAIL:HEAD[:VALUE[:INTERNAL_R]]`.
///
/// KIND is `W` (wire), `R` (resistor), `E` (battery), `A` (ammeter) or
/// `V` (voltmeter). Resistors and batteries need a value; only batteries take
/// an internal resistance.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub tail: VertexId,
    pub head: VertexId,
    pub branch: Branch,
}

impl FromStr for ComponentSpec {
    type Err = KirchhoffError;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |message: &str| KirchhoffError::invalid_component(s, message);
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        if parts.len() < 3 {
            return Err(fail("expected KIND:TAIL:HEAD[:VALUE[:INTERNAL_R]]"));
        }

        let vertex = |text: &str| -> Result<VertexId> {
            text.parse::<usize>()
                .map(VertexId)
                .map_err(|_| fail("junction ids must be non-negative integers"))
        };
        let number = |text: &str| -> Result<f64> {
            text.parse::<f64>()
                .map_err(|_| fail("component values must be numbers"))
        };
        let tail = vertex(parts[1])?;
        let head = vertex(parts[2])?;
        let values = &parts[3..];

        let branch = match (parts[0].to_ascii_uppercase().as_str(), values) {
            ("W", []) => Branch::wire(),
            ("A", []) => Branch::ammeter(),
            ("V", []) => Branch::voltmeter(),
            ("R", [r]) => Branch::resistor(number(*r)?),
            ("E", [e]) => Branch::battery(number(*e)?),
            ("E", [e, r]) => Branch::battery_with_resistance(number(*e)?, number(*r)?),
            ("W" | "A" | "V", _) => return Err(fail("this kind takes no value")),
            ("R", _) => return Err(fail("a resistor takes exactly one value")),
            ("E", _) => return Err(fail("a battery takes an EMF and an optional internal resistance")),
            _ => return Err(fail("unknown kind, expected one of W, R, E, A, V")),
        };

        Ok(Self { tail, head, branch })
    }
}
