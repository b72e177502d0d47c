use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Function table
// ---------------------------------------------------------------------------

/// A callable function of the cut language. The set is closed: every name
/// is resolved at compile time and its arity validated against this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Abs,
    Sqrt,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Floor,
    Ceil,
    Min,
    Max,
    Pow,
    Atan2,
    Fmod,
    DeltaPhi,
    DeltaEta,
    DeltaR,
}

impl Func {
    /// Look up a function by its source-level name.
    pub fn by_name(name: &str) -> Option<Func> {
        match name {
            "abs" | "fabs" => Some(Func::Abs),
            "sqrt" => Some(Func::Sqrt),
            "exp" => Some(Func::Exp),
            "log" => Some(Func::Log),
            "log10" => Some(Func::Log10),
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "asin" => Some(Func::Asin),
            "acos" => Some(Func::Acos),
            "atan" => Some(Func::Atan),
            "floor" => Some(Func::Floor),
            "ceil" => Some(Func::Ceil),
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            "pow" => Some(Func::Pow),
            "atan2" => Some(Func::Atan2),
            "fmod" => Some(Func::Fmod),
            "deltaPhi" => Some(Func::DeltaPhi),
            "deltaEta" => Some(Func::DeltaEta),
            "deltaR" => Some(Func::DeltaR),
            _ => None,
        }
    }

    /// Declared argument count.
    pub fn arity(&self) -> usize {
        match self {
            Func::Abs
            | Func::Sqrt
            | Func::Exp
            | Func::Log
            | Func::Log10
            | Func::Sin
            | Func::Cos
            | Func::Tan
            | Func::Asin
            | Func::Acos
            | Func::Atan
            | Func::Floor
            | Func::Ceil => 1,
            Func::Min
            | Func::Max
            | Func::Pow
            | Func::Atan2
            | Func::Fmod
            | Func::DeltaPhi
            | Func::DeltaEta => 2,
            Func::DeltaR => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::Abs => "abs",
            Func::Sqrt => "sqrt",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Log10 => "log10",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Floor => "floor",
            Func::Ceil => "ceil",
            Func::Min => "min",
            Func::Max => "max",
            Func::Pow => "pow",
            Func::Atan2 => "atan2",
            Func::Fmod => "fmod",
            Func::DeltaPhi => "deltaPhi",
            Func::DeltaEta => "deltaEta",
            Func::DeltaR => "deltaR",
        }
    }

    /// Apply the function to already-evaluated arguments.
    ///
    /// `args.len()` must equal [`arity`](Self::arity) — compilation
    /// guarantees this. Domain errors follow IEEE semantics (NaN), which
    /// fail every comparison downstream.
    pub fn apply(&self, args: &[f64]) -> f64 {
        match self {
            Func::Abs => args[0].abs(),
            Func::Sqrt => args[0].sqrt(),
            Func::Exp => args[0].exp(),
            Func::Log => args[0].ln(),
            Func::Log10 => args[0].log10(),
            Func::Sin => args[0].sin(),
            Func::Cos => args[0].cos(),
            Func::Tan => args[0].tan(),
            Func::Asin => args[0].asin(),
            Func::Acos => args[0].acos(),
            Func::Atan => args[0].atan(),
            Func::Floor => args[0].floor(),
            Func::Ceil => args[0].ceil(),
            Func::Min => args[0].min(args[1]),
            Func::Max => args[0].max(args[1]),
            Func::Pow => args[0].powf(args[1]),
            Func::Atan2 => args[0].atan2(args[1]),
            Func::Fmod => args[0] % args[1],
            Func::DeltaPhi => delta_phi(args[0], args[1]),
            Func::DeltaEta => args[0] - args[1],
            Func::DeltaR => {
                let deta = args[0] - args[2];
                let dphi = delta_phi(args[1], args[3]);
                (deta * deta + dphi * dphi).sqrt()
            }
        }
    }
}

/// Azimuthal-angle difference wrapped into (-pi, pi].
fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let mut dphi = phi1 - phi2;
    while dphi > PI {
        dphi -= 2.0 * PI;
    }
    while dphi <= -PI {
        dphi += 2.0 * PI;
    }
    dphi
}
