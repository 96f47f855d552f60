//! Process-wide element table.
//!
//! Read-only data shared by every molecule: symbol and name lookup,
//! the mass of the most abundant isotope, the default valence, and
//! the permitted oxidation states consulted by the unsaturation
//! classifier. Immutable after startup; safe to read from any thread.

/// Periodic table entries for elements 1–118.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    Be = 4,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Al = 13,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Sc = 21,
    Ti = 22,
    V = 23,
    Cr = 24,
    Mn = 25,
    Fe = 26,
    Co = 27,
    Ni = 28,
    Cu = 29,
    Zn = 30,
    Ga = 31,
    Ge = 32,
    As = 33,
    Se = 34,
    Br = 35,
    Kr = 36,
    Rb = 37,
    Sr = 38,
    Y = 39,
    Zr = 40,
    Nb = 41,
    Mo = 42,
    Tc = 43,
    Ru = 44,
    Rh = 45,
    Pd = 46,
    Ag = 47,
    Cd = 48,
    In = 49,
    Sn = 50,
    Sb = 51,
    Te = 52,
    I = 53,
    Xe = 54,
    Cs = 55,
    Ba = 56,
    La = 57,
    Ce = 58,
    Pr = 59,
    Nd = 60,
    Pm = 61,
    Sm = 62,
    Eu = 63,
    Gd = 64,
    Tb = 65,
    Dy = 66,
    Ho = 67,
    Er = 68,
    Tm = 69,
    Yb = 70,
    Lu = 71,
    Hf = 72,
    Ta = 73,
    W = 74,
    Re = 75,
    Os = 76,
    Ir = 77,
    Pt = 78,
    Au = 79,
    Hg = 80,
    Tl = 81,
    Pb = 82,
    Bi = 83,
    Po = 84,
    At = 85,
    Rn = 86,
    Fr = 87,
    Ra = 88,
    Ac = 89,
    Th = 90,
    Pa = 91,
    U = 92,
    Np = 93,
    Pu = 94,
    Am = 95,
    Cm = 96,
    Bk = 97,
    Cf = 98,
    Es = 99,
    Fm = 100,
    Md = 101,
    No = 102,
    Lr = 103,
    Rf = 104,
    Db = 105,
    Sg = 106,
    Bh = 107,
    Hs = 108,
    Mt = 109,
    Ds = 110,
    Rg = 111,
    Cn = 112,
    Nh = 113,
    Fl = 114,
    Mc = 115,
    Lv = 116,
    Ts = 117,
    Og = 118,
}

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        if (1..=118).contains(&n) {
            // SAFETY: Element is repr(u8) with variants 1..=118, and we checked bounds.
            Some(unsafe { std::mem::transmute::<u8, Element>(n) })
        } else {
            None
        }
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .position(|&sym| sym == s)
            .and_then(|i| Element::from_atomic_num(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self as usize - 1]
    }

    pub fn name(self) -> &'static str {
        NAMES[self as usize - 1]
    }

    /// Mass of the most abundant isotope, in daltons.
    pub fn weight(self) -> f64 {
        WEIGHTS[self as usize - 1]
    }

    /// The valence an atom of this element assumes when the input
    /// carries no override. `0` means no sensible default exists.
    pub fn default_valence(self) -> i8 {
        match self {
            Element::H | Element::F | Element::Cl | Element::Br | Element::I | Element::At => 1,
            Element::O | Element::S | Element::Se | Element::Te => 2,
            Element::B | Element::N | Element::P | Element::As | Element::Al => 3,
            Element::C | Element::Si | Element::Ge | Element::Sn => 4,
            _ => 0,
        }
    }

    /// Oxidation states this element is permitted to assume, the
    /// default valence included. Empty for elements the classifier
    /// does not validate (mostly metals).
    pub fn oxidation_states(self) -> &'static [i8] {
        match self {
            Element::H => &[1],
            Element::B | Element::Al => &[3],
            Element::C | Element::Si | Element::Ge | Element::Sn => &[4],
            Element::N | Element::P | Element::As => &[3, 5],
            Element::O => &[2],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::F | Element::Cl | Element::Br | Element::At => &[1],
            Element::I => &[1, 3, 5, 7],
            _ => &[],
        }
    }
}

/// Answers whether `state` is a permitted oxidation state for the
/// element with atomic number `atomic_num`.
///
/// Elements without curated state data (and unknown atomic numbers)
/// validate trivially; the classifier only rejects what the table
/// positively forbids.
pub fn is_valid_oxidation_state(atomic_num: u8, state: i8) -> bool {
    let Some(el) = Element::from_atomic_num(atomic_num) else {
        return true;
    };
    let permitted = el.oxidation_states();
    permitted.is_empty() || permitted.contains(&state)
}

static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

static NAMES: [&str; 118] = [
    "Hydrogen", "Helium", "Lithium", "Beryllium", "Boron",
    "Carbon", "Nitrogen", "Oxygen", "Fluorine", "Neon",
    "Sodium", "Magnesium", "Aluminium", "Silicon", "Phosphorus",
    "Sulfur", "Chlorine", "Argon", "Potassium", "Calcium",
    "Scandium", "Titanium", "Vanadium", "Chromium", "Manganese",
    "Iron", "Cobalt", "Nickel", "Copper", "Zinc",
    "Gallium", "Germanium", "Arsenic", "Selenium", "Bromine",
    "Krypton", "Rubidium", "Strontium", "Yttrium", "Zirconium",
    "Niobium", "Molybdenum", "Technetium", "Ruthenium", "Rhodium",
    "Palladium", "Silver", "Cadmium", "Indium", "Tin",
    "Antimony", "Tellurium", "Iodine", "Xenon", "Caesium",
    "Barium", "Lanthanum", "Cerium", "Praseodymium", "Neodymium",
    "Promethium", "Samarium", "Europium", "Gadolinium", "Terbium",
    "Dysprosium", "Holmium", "Erbium", "Thulium", "Ytterbium",
    "Lutetium", "Hafnium", "Tantalum", "Tungsten", "Rhenium",
    "Osmium", "Iridium", "Platinum", "Gold", "Mercury",
    "Thallium", "Lead", "Bismuth", "Polonium", "Astatine",
    "Radon", "Francium", "Radium", "Actinium", "Thorium",
    "Protactinium", "Uranium", "Neptunium", "Plutonium", "Americium",
    "Curium", "Berkelium", "Californium", "Einsteinium", "Fermium",
    "Mendelevium", "Nobelium", "Lawrencium", "Rutherfordium", "Dubnium",
    "Seaborgium", "Bohrium", "Hassium", "Meitnerium", "Darmstadtium",
    "Roentgenium", "Copernicium", "Nihonium", "Flerovium", "Moscovium",
    "Livermorium", "Tennessine", "Oganesson",
];

// Most abundant isotope masses, in daltons.
static WEIGHTS: [f64; 118] = [
    1.0078, 4.0026, 7.0160, 9.0122, 11.0093, 12.0000, 14.0031, 15.9949,
    18.9984, 19.9924, 22.9898, 23.9850, 26.9815, 27.9769, 30.9738, 31.9721,
    34.9689, 39.9624, 38.9637, 39.9626, 44.9559, 47.9479, 50.9440, 51.9405,
    54.9380, 55.9349, 58.9332, 57.9353, 62.9296, 63.9291, 68.9256, 73.9212,
    74.9216, 79.9165, 78.9183, 83.9115, 84.9118, 87.9056, 88.9058, 89.9047,
    92.9064, 97.9054, 96.9064, 101.9043, 102.9055, 105.9035, 106.9051,
    113.9034, 114.9039, 119.9022, 120.9038, 129.9062, 126.9045, 131.9042,
    132.9055, 137.9052, 138.9064, 139.9054, 140.9077, 141.9077, 144.9128,
    151.9197, 152.9212, 157.9241, 158.9254, 163.9292, 164.9303, 165.9303,
    168.9342, 173.9389, 174.9408, 179.9466, 180.9480, 183.9509, 186.9558,
    191.9615, 192.9629, 194.9648, 196.9666, 201.9706, 204.9744, 207.9767,
    208.9804, 208.9824, 209.9871, 222.0176, 223.0197, 226.0254, 227.0278,
    232.0381, 231.0359, 238.0508, 237.0482, 244.0642, 243.0614, 247.0704,
    247.0703, 251.0796, 252.0830, 257.0951, 258.0984, 259.1010, 266.1200,
    267.1220, 268.1260, 269.1290, 270.1330, 277.1500, 278.1560, 281.1650,
    282.1690, 285.1770, 286.1830, 289.1900, 290.1960, 293.2050, 294.2110,
    294.2140,
];
