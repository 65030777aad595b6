use stackel_expr::Expr;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Bounds for a variable or constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Non-negative half-line [0, +inf).
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// Unbounded in both directions.
    pub fn free() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// A decision variable with bounds, integrality, and a solved value slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub bounds: Bounds,
    pub is_integer: bool,
    pub is_active: bool,
    pub value: Option<f64>,
}

impl Variable {
    /// Create a binary variable with bounds [0, 1] and integer constraint.
    pub fn binary() -> Self {
        Self {
            bounds: Bounds::new(0.0, 1.0),
            is_integer: true,
            is_active: true,
            value: None,
        }
    }

    /// Create a continuous variable with specified bounds.
    pub fn continuous(bounds: Bounds) -> Self {
        Self {
            bounds,
            is_integer: false,
            is_active: true,
            value: None,
        }
    }

    /// Create an integer variable with specified bounds.
    pub fn integer(bounds: Bounds) -> Self {
        Self {
            bounds,
            is_integer: true,
            is_active: true,
            value: None,
        }
    }
}

/// A constraint row with lower and upper bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub bounds: Bounds,
    pub is_active: bool,
}

impl Constraint {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            is_active: true,
        }
    }
}

/// Objective function: a sense and a (possibly quadratic) expression.
///
/// A bilevel model carries more than one objective (the upper level's and
/// the lower block's), so objectives are components with activation flags
/// rather than a single slot on the model.
#[derive(Debug, Clone)]
pub struct Objective {
    pub sense: Sense,
    pub expr: Expr,
    pub is_active: bool,
}

impl Objective {
    pub fn new(sense: Sense, expr: Expr) -> Self {
        Self {
            sense,
            expr,
            is_active: true,
        }
    }
}
