//! Compass and vertical directions linking locations

use serde::{Deserialize, Serialize};

/// One of the ten exits a location may have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
        Direction::Up,
        Direction::Down,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::Northeast => "northeast",
            Direction::East => "east",
            Direction::Southeast => "southeast",
            Direction::South => "south",
            Direction::Southwest => "southwest",
            Direction::West => "west",
            Direction::Northwest => "northwest",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Parse a direction keyword (case-insensitive)
    pub fn parse(word: &str) -> Option<Self> {
        let word = word.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(word))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbour references for the ten exits of a location
///
/// Shared by location templates and location instances so the directional
/// graph can be copied field for field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exits<Id> {
    pub north: Option<Id>,
    pub northeast: Option<Id>,
    pub east: Option<Id>,
    pub southeast: Option<Id>,
    pub south: Option<Id>,
    pub southwest: Option<Id>,
    pub west: Option<Id>,
    pub northwest: Option<Id>,
    pub up: Option<Id>,
    pub down: Option<Id>,
}

impl<Id> Default for Exits<Id> {
    fn default() -> Self {
        Self {
            north: None,
            northeast: None,
            east: None,
            southeast: None,
            south: None,
            southwest: None,
            west: None,
            northwest: None,
            up: None,
            down: None,
        }
    }
}

impl<Id: Copy> Exits<Id> {
    pub fn get(&self, direction: Direction) -> Option<Id> {
        match direction {
            Direction::North => self.north,
            Direction::Northeast => self.northeast,
            Direction::East => self.east,
            Direction::Southeast => self.southeast,
            Direction::South => self.south,
            Direction::Southwest => self.southwest,
            Direction::West => self.west,
            Direction::Northwest => self.northwest,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, direction: Direction, id: Option<Id>) {
        let slot = match direction {
            Direction::North => &mut self.north,
            Direction::Northeast => &mut self.northeast,
            Direction::East => &mut self.east,
            Direction::Southeast => &mut self.southeast,
            Direction::South => &mut self.south,
            Direction::Southwest => &mut self.southwest,
            Direction::West => &mut self.west,
            Direction::Northwest => &mut self.northwest,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        };
        *slot = id;
    }

    /// Exits that lead somewhere, in compass order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Id)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.get(d).map(|id| (d, id)))
    }

    /// Map every exit through `f`, keeping empty exits empty
    pub fn try_map<Other: Copy, E>(
        &self,
        mut f: impl FnMut(Id) -> Result<Other, E>,
    ) -> Result<Exits<Other>, E> {
        let mut mapped = Exits::default();
        for (direction, id) in self.iter() {
            mapped.set(direction, Some(f(id)?));
        }
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Direction::parse("NorthEast"), Some(Direction::Northeast));
        assert_eq!(Direction::parse("down"), Some(Direction::Down));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_exits_iter_and_map() {
        let mut exits: Exits<u32> = Exits::default();
        exits.set(Direction::South, Some(2));
        exits.set(Direction::North, Some(1));

        let listed: Vec<_> = exits.iter().collect();
        assert_eq!(listed, vec![(Direction::North, 1), (Direction::South, 2)]);

        let doubled = exits.try_map(|id| Ok::<_, ()>(id * 10)).unwrap();
        assert_eq!(doubled.get(Direction::South), Some(20));
        assert_eq!(doubled.get(Direction::East), None);
    }

    #[test]
    fn test_try_map_changes_id_type_and_stops_on_error() {
        let mut exits: Exits<u32> = Exits::default();
        exits.set(Direction::Up, Some(7));
        exits.set(Direction::Down, Some(8));

        let named = exits.try_map(|id| Ok::<_, ()>(char::from(b'a' + id as u8))).unwrap();
        assert_eq!(named.get(Direction::Up), Some('h'));
        assert_eq!(named.get(Direction::Down), Some('i'));

        let failed = exits.try_map(|id| if id == 8 { Err(id) } else { Ok(id) });
        assert_eq!(failed.unwrap_err(), 8);
    }
}
