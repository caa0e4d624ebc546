//! Keyboard-adjacency classification of single-character substitutions.

/// Physically adjacent keys on a US QWERTY keyboard, letters only.
const QWERTY_NEIGHBORS: [(char, &str); 26] = [
    ('Q', "WAS"),
    ('W', "QEASD"),
    ('E', "WRSDF"),
    ('R', "ETDFG"),
    ('T', "RYFGH"),
    ('Y', "TUGHJ"),
    ('U', "YIHJK"),
    ('I', "UOJKL"),
    ('O', "IPKL"),
    ('P', "OL"),
    ('A', "QWSZ"),
    ('S', "ADWEZX"),
    ('D', "SFERXC"),
    ('F', "DGRTCV"),
    ('G', "FHTYVB"),
    ('H', "GJYUBN"),
    ('J', "HKUINM"),
    ('K', "JLIOM"),
    ('L', "KOPM"),
    ('Z', "ASX"),
    ('X', "ZCSD"),
    ('C', "XVDF"),
    ('V', "CBFG"),
    ('B', "VNGH"),
    ('N', "BMHJ"),
    ('M', "NJKL"),
];

/// Fixed key-adjacency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardLayout {
    neighbors: &'static [(char, &'static str)],
}

impl KeyboardLayout {
    pub const fn qwerty() -> Self {
        Self {
            neighbors: &QWERTY_NEIGHBORS,
        }
    }

    /// Keys adjacent to `key`; empty for anything that is not a letter.
    pub fn neighbors(&self, key: char) -> &'static str {
        let key = key.to_ascii_uppercase();
        self.neighbors
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, neighbors)| *neighbors)
            .unwrap_or("")
    }

    pub fn are_adjacent(&self, a: char, b: char) -> bool {
        let a = a.to_ascii_uppercase();
        let b = b.to_ascii_uppercase();
        self.neighbors(a).contains(b) || self.neighbors(b).contains(a)
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::qwerty()
    }
}

/// Tags length-preserving single-substitution typos whose two keys touch.
///
/// Insertions, deletions and transpositions are never proximate, even when the
/// matcher reports them within threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardProximityClassifier {
    layout: KeyboardLayout,
}

impl KeyboardProximityClassifier {
    pub const fn new(layout: KeyboardLayout) -> Self {
        Self { layout }
    }

    pub fn is_keyboard_proximate(&self, a: &str, b: &str) -> bool {
        if a.chars().count() != b.chars().count() {
            return false;
        }

        let mut mismatches = a.chars().zip(b.chars()).filter(|(x, y)| x != y);
        match (mismatches.next(), mismatches.next()) {
            (Some((x, y)), None) => self.layout.are_adjacent(x, y),
            _ => false,
        }
    }
}
