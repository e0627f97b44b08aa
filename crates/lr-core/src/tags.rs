//! Point-of-interest categories and per-edge tag sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of POI categories the cost model knows about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tourism,
    Monument,
    Water,
    Park,
    University,
}

impl Category {
    pub const COUNT: usize = 5;

    pub const ALL: [Category; Self::COUNT] = [
        Category::Tourism,
        Category::Monument,
        Category::Water,
        Category::Park,
        Category::University,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Tourism    => "tourism",
            Category::Monument   => "monument",
            Category::Water      => "water",
            Category::Park       => "park",
            Category::University => "university",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    /// Case-insensitive; a handful of raw OSM values map onto a category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tourism" | "attraction" | "viewpoint" => Ok(Category::Tourism),
            "monument" | "memorial" | "historic"   => Ok(Category::Monument),
            "water" | "river" | "lake"             => Ok(Category::Water),
            "park" | "garden" | "forest"           => Ok(Category::Park),
            "university" | "college"               => Ok(Category::University),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TagSet ────────────────────────────────────────────────────────────────────

/// A set of [`Category`] values packed into one byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagSet(u8);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    /// Insert a category; returns `false` if it was already present.
    #[inline]
    pub fn insert(&mut self, category: Category) -> bool {
        let had = self.contains(category);
        self.0 |= category.bit();
        !had
    }

    #[inline]
    pub fn contains(self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    #[inline]
    pub fn union(self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for TagSet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = TagSet::EMPTY;
        for c in iter {
            set.insert(c);
        }
        set
    }
}
