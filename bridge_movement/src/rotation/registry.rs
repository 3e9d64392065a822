//! Catalog of rotation generators, queried by capability.

use log::debug;
use std::fmt;

use super::{
    errors::{RotationError, RotationResult},
    generator::{Rotation, RotationParams},
    howell::HowellRotation,
    mitchell::MitchellRotation,
};

/// Sector shape a caller wants candidate rotations for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RotationQuery {
    pub num_pairs: u32,
    pub min_boards: u32,
    pub max_boards: u32,
    pub min_boards_per_group: u32,
}

impl RotationQuery {
    /// Tables needed to seat every pair, counting a bye table for an odd
    /// pair count.
    #[must_use]
    pub const fn num_tables(&self) -> u32 {
        self.num_pairs.div_ceil(2)
    }

    /// Every group size whose total board count fits the query.
    fn candidates(&self, num_tables: u32, num_board_groups: u32) -> Vec<RotationParams> {
        if num_board_groups == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut per_group = self.min_boards_per_group.max(1);
        while per_group * num_board_groups <= self.max_boards {
            if per_group * num_board_groups >= self.min_boards {
                out.push(RotationParams {
                    num_tables,
                    num_board_groups,
                    boards_per_board_group: per_group,
                });
            }
            per_group += 1;
        }
        out
    }
}

/// One registered generator.
#[derive(Clone, Copy)]
pub struct RegisteredRotation {
    pub name: &'static str,
    /// Parameter sets this generator supports for a query.
    pub possible: fn(&RotationQuery) -> Vec<RotationParams>,
    pub build: fn(&RotationParams) -> RotationResult<Rotation>,
}

impl fmt::Debug for RegisteredRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRotation")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn mitchell_possible(query: &RotationQuery) -> Vec<RotationParams> {
    let tables = query.num_tables();
    if tables < 3 || tables % 2 == 0 {
        return Vec::new();
    }
    query.candidates(tables, tables)
}

fn mitchell_build(params: &RotationParams) -> RotationResult<Rotation> {
    Ok(MitchellRotation::new(params.num_tables * 2)?.into())
}

/// Board groups can't be dealt without replays below 4 tables.
fn howell_possible(query: &RotationQuery) -> Vec<RotationParams> {
    let tables = query.num_tables();
    if tables < 4 {
        return Vec::new();
    }
    query.candidates(tables, 2 * tables - 1)
}

fn howell_build(params: &RotationParams) -> RotationResult<Rotation> {
    Ok(HowellRotation::new(params.num_tables * 2)?.into())
}

pub const MITCHELL: RegisteredRotation = RegisteredRotation {
    name: "mitchell",
    possible: mitchell_possible,
    build: mitchell_build,
};

pub const HOWELL: RegisteredRotation = RegisteredRotation {
    name: "howell",
    possible: howell_possible,
    build: howell_build,
};

#[derive(Debug, Default)]
pub struct RotationRegistry {
    entries: Vec<RegisteredRotation>,
}

impl RotationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the Mitchell and Howell generators.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self {
            entries: vec![MITCHELL, HOWELL],
        }
    }

    pub fn register(&mut self, entry: RegisteredRotation) -> RotationResult<()> {
        if self.get(entry.name).is_some() {
            return Err(RotationError::DuplicateRotation(entry.name.to_string()));
        }
        debug!("Registered rotation {}", entry.name);
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredRotation> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Build the named generator.
    pub fn build(&self, name: &str, params: &RotationParams) -> RotationResult<Rotation> {
        let entry = self
            .get(name)
            .ok_or_else(|| RotationError::UnknownRotation(name.to_string()))?;
        (entry.build)(params)
    }

    /// Every (generator, parameters) candidate for the query, in
    /// registration order.
    #[must_use]
    pub fn possible_rotations(
        &self,
        num_pairs: u32,
        min_boards: u32,
        max_boards: u32,
        min_boards_per_group: u32,
    ) -> Vec<(&RegisteredRotation, RotationParams)> {
        let query = RotationQuery {
            num_pairs,
            min_boards,
            max_boards,
            min_boards_per_group,
        };
        self.entries
            .iter()
            .flat_map(|entry| {
                (entry.possible)(&query)
                    .into_iter()
                    .map(move |params| (entry, params))
            })
            .collect()
    }
}
