use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketLabel {
    Position(u8),
    Overflow,
}

impl BucketLabel {
    pub const FIRST_PAGE_POSITIONS: u8 = 10;

    // Rounds half up, the way report spreadsheets round average position.
    pub fn for_rank(rank: Option<f64>) -> Option<Self> {
        let rounded = (rank? + 0.5).floor();
        if (1.0..=f64::from(Self::FIRST_PAGE_POSITIONS)).contains(&rounded) {
            Some(Self::Position(rounded as u8))
        } else if rounded > f64::from(Self::FIRST_PAGE_POSITIONS) {
            Some(Self::Overflow)
        } else {
            None
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed == ">10" {
            return Some(Self::Overflow);
        }

        trimmed
            .parse::<u8>()
            .ok()
            .filter(|position| (1..=Self::FIRST_PAGE_POSITIONS).contains(position))
            .map(Self::Position)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=Self::FIRST_PAGE_POSITIONS)
            .map(Self::Position)
            .chain(std::iter::once(Self::Overflow))
    }

    pub fn position(self) -> Option<u8> {
        match self {
            Self::Position(position) => Some(position),
            Self::Overflow => None,
        }
    }

    // Overflow has no position of its own; any rank past ten lands there.
    pub fn nominal_rank(self) -> f64 {
        self.position()
            .map_or(f64::from(Self::FIRST_PAGE_POSITIONS + 1), f64::from)
    }

    pub fn is_first_page(self) -> bool {
        matches!(self, Self::Position(_))
    }

    pub fn is_top_three(self) -> bool {
        matches!(self, Self::Position(1..=3))
    }

    pub fn is_near_miss(self) -> bool {
        matches!(self, Self::Position(4..=10))
    }
}

impl fmt::Display for BucketLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(position) => write!(f, "{position}"),
            Self::Overflow => f.write_str(">10"),
        }
    }
}
