use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, VecDeque},
    fmt,
    hash::{Hash, Hasher},
};

use super::errors::{ModelError, ModelResult};

/// Type alias for pair identifiers. Pairs are numbered from 1.
pub type PairId = u32;

/// Type alias for stable (internal) table identifiers.
pub type TableId = u32;

/// Type alias for board group identifiers.
pub type BoardGroupId = u32;

/// Type alias for board numbers (a board is a single pre-dealt hand).
pub type BoardNumber = u32;

/// Type alias for round numbers. Round 1 is the first round.
pub type RoundNumber = u32;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Position {
    #[serde(rename = "NS")]
    NorthSouth,
    #[serde(rename = "EW")]
    EastWest,
}

impl Position {
    pub const ALL: [Self; 2] = [Self::NorthSouth, Self::EastWest];

    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::NorthSouth => Self::EastWest,
            Self::EastWest => Self::NorthSouth,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NorthSouth => "NS",
            Self::EastWest => "EW",
        };
        write!(f, "{repr}")
    }
}

/// A seat is one side of one table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Seat {
    pub table: TableId,
    pub position: Position,
}

impl Seat {
    #[must_use]
    pub const fn new(table: TableId, position: Position) -> Self {
        Self { table, position }
    }

    #[must_use]
    pub const fn ns(table: TableId) -> Self {
        Self::new(table, Position::NorthSouth)
    }

    #[must_use]
    pub const fn ew(table: TableId) -> Self {
        Self::new(table, Position::EastWest)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table, self.position)
    }
}

/// Which pair sits where in a single round.
pub type SeatMap = BTreeMap<Seat, PairId>;

/// Serde adapter writing a [`SeatMap`] as a list of
/// `{ table, position, pair }` entries, since JSON object keys must be
/// strings.
pub mod seat_entries {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{PairId, Position, Seat, SeatMap, TableId};

    #[derive(Deserialize, Serialize)]
    struct SeatEntry {
        table: TableId,
        position: Position,
        pair: PairId,
    }

    pub fn serialize<S: Serializer>(map: &SeatMap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter().map(|(seat, pair)| SeatEntry {
            table: seat.table,
            position: seat.position,
            pair: *pair,
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SeatMap, D::Error> {
        let entries = Vec::<SeatEntry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (Seat::new(entry.table, entry.position), entry.pair))
            .collect())
    }
}

/// Board groups held by each table in a single round, in arrival order.
/// The head of a table's queue is the group played there.
pub type BoardMap = BTreeMap<TableId, VecDeque<BoardGroup>>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Player {
    pub first_name: String,
    pub last_name: String,
    /// Rating weight used by seeding tools; not interpreted here.
    pub rating: Option<f64>,
    /// Identifier in an external member database.
    pub external_id: Option<i64>,
}

impl Player {
    #[must_use]
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            rating: None,
            external_id: None,
        }
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_external_id(mut self, external_id: i64) -> Self {
        self.external_id = Some(external_id);
        self
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A partnership competing as one unit. Two pairs are the same pair
/// whenever their ids match, regardless of who is playing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Pair {
    pub id: PairId,
    pub players: [Player; 2],
}

impl Pair {
    #[must_use]
    pub fn new(id: PairId, players: [Player; 2]) -> Self {
        Self { id, players }
    }

    /// Pair with placeholder player names, used by generated sectors.
    #[must_use]
    pub fn anonymous(id: PairId) -> Self {
        let name = format!("Pair {id}");
        Self::new(id, [Player::new(&name, "North"), Player::new(&name, "South")])
    }
}

impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Pair {}

impl Hash for Pair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Pair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// A batch of boards moved and played together at one table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawBoardGroup")]
pub struct BoardGroup {
    id: BoardGroupId,
    boards: Vec<BoardNumber>,
}

#[derive(Deserialize)]
struct RawBoardGroup {
    id: BoardGroupId,
    boards: Vec<BoardNumber>,
}

impl TryFrom<RawBoardGroup> for BoardGroup {
    type Error = ModelError;

    fn try_from(value: RawBoardGroup) -> Result<Self, Self::Error> {
        Self::new(value.id, value.boards)
    }
}

impl BoardGroup {
    pub fn new(id: BoardGroupId, boards: Vec<BoardNumber>) -> ModelResult<Self> {
        if boards.is_empty() {
            return Err(ModelError::EmptyBoardGroup(id));
        }
        Ok(Self { id, boards })
    }

    /// Split boards `1..=num_groups * group_size` into consecutive groups
    /// numbered from 1.
    pub fn contiguous(num_groups: usize, group_size: usize) -> ModelResult<Vec<Self>> {
        if group_size == 0 {
            return Err(ModelError::ZeroGroupSize);
        }
        (0..num_groups)
            .map(|i| {
                let first = (i * group_size) as BoardNumber + 1;
                let boards = (first..first + group_size as BoardNumber).collect();
                Self::new(i as BoardGroupId + 1, boards)
            })
            .collect()
    }

    #[must_use]
    pub fn id(&self) -> BoardGroupId {
        self.id
    }

    #[must_use]
    pub fn boards(&self) -> &[BoardNumber] {
        &self.boards
    }

    #[must_use]
    pub fn first_board(&self) -> BoardNumber {
        // Non-empty by construction.
        self.boards[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    #[must_use]
    pub fn contains(&self, board: BoardNumber) -> bool {
        self.boards.contains(&board)
    }
}

impl fmt::Display for BoardGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.first_board();
        let last = self.boards[self.boards.len() - 1];
        if first == last {
            write!(f, "#{} [{first}]", self.id)
        } else {
            write!(f, "#{} [{first}-{last}]", self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pair_identity_is_id() {
        let a = Pair::new(3, [Player::new("Ann", "A"), Player::new("Bob", "B")]);
        let b = Pair::anonymous(3);
        assert_eq!(a, b);

        let set: HashSet<Pair> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_board_group_rejected() {
        assert_eq!(
            BoardGroup::new(7, vec![]),
            Err(ModelError::EmptyBoardGroup(7))
        );
    }

    #[test]
    fn test_board_group_keeps_order() {
        let group = BoardGroup::new(1, vec![5, 2, 9]).unwrap();
        assert_eq!(group.boards(), &[5, 2, 9]);
        assert_eq!(group.first_board(), 5);
        assert!(group.contains(9));
        assert!(!group.contains(1));
    }

    #[test]
    fn test_contiguous_groups() {
        let groups = BoardGroup::contiguous(3, 2).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].boards(), &[1, 2]);
        assert_eq!(groups[2].boards(), &[5, 6]);
        assert_eq!(groups[2].id(), 3);
        assert_eq!(
            BoardGroup::contiguous(3, 0),
            Err(ModelError::ZeroGroupSize)
        );
    }

    #[test]
    fn test_board_group_deserialize_validates() {
        let err = serde_json::from_str::<BoardGroup>(r#"{"id":1,"boards":[]}"#);
        assert!(err.is_err());

        let group: BoardGroup = serde_json::from_str(r#"{"id":2,"boards":[3,4]}"#).unwrap();
        assert_eq!(group.id(), 2);
        assert_eq!(group.to_string(), "#2 [3-4]");
    }

    #[test]
    fn test_position_serde_names() {
        assert_eq!(
            serde_json::to_string(&Position::NorthSouth).unwrap(),
            "\"NS\""
        );
        assert_eq!(Position::EastWest.opposite(), Position::NorthSouth);
        assert_eq!(Seat::ew(4).to_string(), "4EW");
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "seat_entries")]
        seats: SeatMap,
    }

    #[test]
    fn test_seat_map_as_entry_list() {
        let wrapper = Wrapper {
            seats: SeatMap::from([(Seat::ns(1), 3), (Seat::ew(1), 4)]),
        };
        let json = serde_json::to_string(&wrapper).unwrap();
        assert_eq!(
            json,
            r#"{"seats":[{"table":1,"position":"NS","pair":3},{"table":1,"position":"EW","pair":4}]}"#
        );
        assert_eq!(serde_json::from_str::<Wrapper>(&json).unwrap(), wrapper);
    }
}
