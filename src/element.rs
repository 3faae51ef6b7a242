use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// Chemical elements a spectrum can be hallucinated for
///
/// The variants are listed in rank order: the rank of an element is its 1-based
/// position in the list, not necessarily its atomic number (Po, At, Rn, Fr, Ra
/// and Ac are not part of the list).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    EnumCount,
    AsRefStr,
    Display,
)]
#[rustfmt::skip]
pub enum Element {
    H, He,
    Li, Be, B, C, N, O, F, Ne,
    Na, Mg, Al, Si, P, S, Cl, Ar,
    K, Ca, Sc, Ti, V, Cr, Mn, Fe, Co, Ni, Cu, Zn, Ga, Ge, As, Se, Br, Kr,
    Rb, Sr, Y, Zr, Nb, Mo, Tc, Ru, Rh, Pd, Ag, Cd, In, Sn, Sb, Te, I, Xe,
    Cs, Ba, La, Ce, Pr, Nd, Pm, Sm, Eu, Gd, Tb, Dy, Ho, Er, Tm, Yb, Lu,
    Hf, Ta, W, Re, Os, Ir, Pt, Au, Hg, Tl, Pb, Bi,
    Th, Pa, U, Np, Pu, Am, Cm, Bk, Cf, Es, Fm, Md, No, Lr,
}
impl Element {
    /// Returns the element rank, from 1 to [Element::COUNT]
    pub fn rank(&self) -> usize {
        *self as usize + 1
    }
    /// Returns the element from its rank
    pub fn from_rank(rank: usize) -> Option<Self> {
        rank.checked_sub(1).and_then(|i| Self::iter().nth(i))
    }
    /// Returns the element symbol
    pub fn symbol(&self) -> &str {
        self.as_ref()
    }
    /// All the elements, in rank order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
    /// Number of elements
    pub fn count() -> usize {
        Self::COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ranks_are_contiguous() {
        let ranks: Vec<_> = Element::iter().map(|e| e.rank()).collect();
        assert_eq!(ranks, (1..=Element::COUNT).collect::<Vec<_>>());
        assert_eq!(Element::COUNT, 97);
        assert_eq!(Element::H.rank(), 1);
        assert_eq!(Element::Bi.rank(), 83);
        assert_eq!(Element::Th.rank(), 84);
        assert_eq!(Element::from_rank(97), Some(Element::Lr));
        assert_eq!(Element::from_rank(0), None);
        assert_eq!(Element::from_rank(98), None);
    }

    #[test]
    fn symbols() {
        assert_eq!(Element::from_str("He").unwrap(), Element::He);
        assert!(Element::from_str("Po").is_err());
        assert_eq!(Element::Fe.to_string(), "Fe");
        assert_eq!(serde_json::to_string(&Element::Cl).unwrap(), r#""Cl""#);
        let o: Element = serde_json::from_str(r#""O""#).unwrap();
        assert_eq!(o, Element::O);
    }
}
