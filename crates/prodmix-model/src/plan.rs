use std::fmt;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Product {
    X,
    Y,
    Z,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::X, Product::Y, Product::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Product::X => "X",
            Product::Y => "Y",
            Product::Z => "Z",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shift {
    Shift1,
    Shift2,
    Overtime,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Shift1, Shift::Shift2, Shift::Overtime];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Shift::Shift1 => "Shift1",
            Shift::Shift2 => "Shift2",
            Shift::Overtime => "Overtime",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies one decision variable: units of `product` made in `shift`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarKey {
    pub product: Product,
    pub shift: Shift,
}

impl VarKey {
    pub const COUNT: usize = Product::ALL.len() * Shift::ALL.len();

    pub fn new(product: Product, shift: Shift) -> Self {
        Self { product, shift }
    }

    /// All keys, product-major and shift-minor
    pub fn all() -> impl Iterator<Item = VarKey> {
        Product::ALL
            .into_iter()
            .flat_map(|product| {
                Shift::ALL
                    .into_iter()
                    .map(move |shift| VarKey::new(product, shift))
            })
    }

    /// Column of this key in the LP, matching the order of [`VarKey::all`]
    pub fn column(self) -> usize {
        self.product.index() * Shift::ALL.len() + self.shift.index()
    }

    pub fn name(self) -> String {
        format!("{}_{}", self.product, self.shift)
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.product, self.shift)
    }
}

/// Coefficient tables of the planning problem.
///
/// Tables indexed by product and shift are `[product][shift]`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanData {
    /// Profit per unit
    pub profit: [[f64; 3]; 3],
    /// Labor hours per unit
    pub labor_rate: [[f64; 3]; 3],
    /// Labor hours available per shift
    pub labor_cap: [f64; 3],
    /// Material per unit, the same in every shift
    pub material_rate: [f64; 3],
    /// Material shared by all products and shifts
    pub material_cap: f64,
    /// Maximum units per product across all shifts
    pub capacity: [f64; 3],
    /// Minimum units per product across all shifts
    pub demand: [f64; 3],
}

impl Default for PlanData {
    fn default() -> Self {
        Self::standard()
    }
}

impl PlanData {
    /// The plant's figures
    pub fn standard() -> Self {
        Self {
            profit: [
                [50.0, 55.0, 45.0],
                [40.0, 42.0, 38.0],
                [60.0, 65.0, 58.0],
            ],
            labor_rate: [
                [3.0, 3.0, 4.0],
                [4.0, 4.0, 5.0],
                [5.0, 5.0, 6.0],
            ],
            labor_cap: [300.0, 350.0, 150.0],
            material_rate: [2.0, 3.0, 4.0],
            material_cap: 700.0,
            capacity: [120.0, 160.0, 100.0],
            demand: [80.0, 100.0, 60.0],
        }
    }

    pub fn profit(&self, key: VarKey) -> f64 {
        self.profit[key.product.index()][key.shift.index()]
    }

    pub fn labor_rate(&self, key: VarKey) -> f64 {
        self.labor_rate[key.product.index()][key.shift.index()]
    }

    pub fn labor_cap(&self, shift: Shift) -> f64 {
        self.labor_cap[shift.index()]
    }

    pub fn material_rate(&self, product: Product) -> f64 {
        self.material_rate[product.index()]
    }

    pub fn capacity(&self, product: Product) -> f64 {
        self.capacity[product.index()]
    }

    pub fn demand(&self, product: Product) -> f64 {
        self.demand[product.index()]
    }

    pub fn with_demand(mut self, product: Product, units: f64) -> Self {
        self.demand[product.index()] = units;
        self
    }
}
