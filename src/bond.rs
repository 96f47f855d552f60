use bit_set::BitSet;

use crate::error::MoleculeError;

/// Concrete bond order.
///
/// There is no aromatic variant: the input must arrive in Kekulé
/// form, and the "alternating" token is rejected outright by the
/// bond builder. Aromaticity is a derived annotation on top of the
/// concrete orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    /// Decodes a connection-table order code. `0` ("none") and `4`
    /// ("alternating") are refused; Kekulé resolution is upstream's
    /// job.
    pub fn from_code(code: u8) -> Result<BondOrder, MoleculeError> {
        match code {
            1 => Ok(BondOrder::Single),
            2 => Ok(BondOrder::Double),
            3 => Ok(BondOrder::Triple),
            0 | 4 => Err(MoleculeError::InvalidBond {
                bond_id: 0,
                reason: format!("unhandled bond order code {}", code),
            }),
            _ => Err(MoleculeError::InvalidBond {
                bond_id: 0,
                reason: format!("unknown bond order code {}", code),
            }),
        }
    }

    /// Bond multiplicity: 1, 2 or 3.
    pub fn multiplicity(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// Wedge/hash stereo marker carried over from the connection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    /// On the drawing plane.
    #[default]
    None,
    Up,
    Down,
    /// Either wedge direction (undetermined stereocentre).
    Either,
    /// cis/trans undetermined double bond.
    DoubleEither,
}

impl BondStereo {
    pub fn from_code(code: u8) -> Result<BondStereo, MoleculeError> {
        match code {
            0 => Ok(BondStereo::None),
            1 => Ok(BondStereo::Up),
            3 => Ok(BondStereo::DoubleEither),
            4 => Ok(BondStereo::Either),
            6 => Ok(BondStereo::Down),
            _ => Err(MoleculeError::InvalidBond {
                bond_id: 0,
                reason: format!("unknown bond stereo code {}", code),
            }),
        }
    }
}

/// One chemical bond between two distinct atoms.
///
/// Bonds always relate atoms by their input ids, never by normalized
/// ids: they are constructed while the input is being read, and the
/// pairing stays directly correlatable with the original connection
/// table.
#[derive(Debug, Clone)]
pub struct Bond {
    pub(crate) id: u16,
    pub(crate) a1: u16,
    pub(crate) a2: u16,
    pub(crate) order: BondOrder,
    pub(crate) stereo: BondStereo,

    pub(crate) is_aro: bool,
    /// Set when this bond joins two distinct ring systems of the
    /// same connected component.
    pub(crate) is_link: bool,

    /// Ids of the rings this bond participates in.
    pub(crate) rings: BitSet,
}

impl Bond {
    pub(crate) fn new(id: u16, a1: u16, a2: u16, order: BondOrder, stereo: BondStereo) -> Bond {
        Bond {
            id,
            a1,
            a2,
            order,
            stereo,
            is_aro: false,
            is_link: false,
            rings: BitSet::default(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// Input ids of the bound atoms, in input order.
    pub fn atom_ids(&self) -> (u16, u16) {
        (self.a1, self.a2)
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub fn stereo(&self) -> BondStereo {
        self.stereo
    }

    pub fn is_aromatic(&self) -> bool {
        self.is_aro
    }

    pub fn is_link(&self) -> bool {
        self.is_link
    }

    /// The atom of this bond other than the given one. Answers `0`
    /// if the given atom does not participate in this bond at all.
    pub fn other_atom(&self, aiid: u16) -> u16 {
        if self.a1 == aiid {
            self.a2
        } else if self.a2 == aiid {
            self.a1
        } else {
            0
        }
    }

    /// Answers if this bond participates in at least one ring.
    pub fn is_cyclic(&self) -> bool {
        !self.rings.is_empty()
    }

    pub fn is_in_ring(&self, rid: u8) -> bool {
        self.rings.contains(rid as usize)
    }

    /// Ids of the rings this bond participates in.
    pub fn ring_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.rings.iter().map(|r| r as u8)
    }
}
