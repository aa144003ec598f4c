//! Course catalog: the ordered labs of AI Agents 101
//!
//! The store only records lab ids and completion flags. This module knows
//! which ids exist, which of them count toward progress, and where an
//! unknown id should land.

use crate::state::{ApplicationState, LabId};

/// Id of the first lesson; the cold-start current lab.
pub const FIRST_LAB_ID: LabId = 1;

/// How a catalog entry participates in navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabKind {
    /// Numbered lesson, counted by progress and by "complete and advance".
    Lesson,
    /// Reference material reached from the menu.
    Resources,
    /// Free-form sandbox with the in-browser model and Python runtime.
    Playground,
}

impl LabKind {
    /// Whether labs of this kind are part of the linear lesson sequence.
    #[must_use]
    pub const fn is_navigable(self) -> bool {
        matches!(self, Self::Lesson)
    }
}

/// One entry of the course catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lab {
    /// Stable numeric id, as stored in application state.
    pub id: LabId,
    /// URL-friendly name
    pub slug: &'static str,
    /// English title
    pub title: &'static str,
    /// Navigation role
    pub kind: LabKind,
}

const fn lesson(id: LabId, slug: &'static str, title: &'static str) -> Lab {
    Lab {
        id,
        slug,
        title,
        kind: LabKind::Lesson,
    }
}

/// Labs of AI Agents 101 in display order.
pub const LABS: &[Lab] = &[
    lesson(1, "what-is-an-agent", "What is an AI agent?"),
    lesson(2, "talking-to-llms", "Talking to a language model"),
    lesson(3, "prompt-engineering", "Prompt engineering"),
    lesson(4, "tools", "Giving agents tools"),
    lesson(5, "agent-loop", "The agent loop"),
    lesson(6, "memory", "Memory and context"),
    lesson(7, "planning", "Planning and reasoning"),
    lesson(8, "multi-agent", "Multi-agent systems"),
    Lab {
        id: 9,
        slug: "resources",
        title: "Resources",
        kind: LabKind::Resources,
    },
    Lab {
        id: 10,
        slug: "playground",
        title: "Advanced playground",
        kind: LabKind::Playground,
    },
];

/// Completion summary over the navigable labs of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Navigable labs marked complete
    pub completed: usize,
    /// Navigable labs in the course
    pub total: usize,
}

impl Progress {
    /// Whole-number completion percentage, 0 for an empty course.
    #[must_use]
    pub const fn percent(self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }

    /// Whether every navigable lab is complete.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

/// An ordered lab catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Course {
    labs: &'static [Lab],
}

impl Default for Course {
    fn default() -> Self {
        Self::new(LABS)
    }
}

impl Course {
    /// Course over `labs`, kept in the given order.
    #[must_use]
    pub const fn new(labs: &'static [Lab]) -> Self {
        Self { labs }
    }

    /// All catalog entries in display order.
    #[must_use]
    pub const fn labs(&self) -> &'static [Lab] {
        self.labs
    }

    /// Catalog entry for `id`.
    #[must_use]
    pub fn get(&self, id: LabId) -> Option<&'static Lab> {
        self.labs.iter().find(|lab| lab.id == id)
    }

    /// Id of the first lesson, or [`FIRST_LAB_ID`] when the course has none.
    #[must_use]
    pub fn first_lab_id(&self) -> LabId {
        self.navigable().next().map_or(FIRST_LAB_ID, |lab| lab.id)
    }

    /// Lessons in order.
    pub fn navigable(&self) -> impl Iterator<Item = &'static Lab> {
        self.labs.iter().filter(|lab| lab.kind.is_navigable())
    }

    /// Number of lessons, the bound used by "complete and advance".
    #[must_use]
    pub fn navigable_count(&self) -> u32 {
        u32::try_from(self.navigable().count()).unwrap_or(u32::MAX)
    }

    /// Entry to display for `id`, falling back to the first lesson when the
    /// id is not in the catalog.
    #[must_use]
    pub fn resolve(&self, id: LabId) -> Option<&'static Lab> {
        self.get(id)
            .or_else(|| self.navigable().next())
            .or_else(|| self.labs.first())
    }

    /// Completion summary for `state`.
    #[must_use]
    pub fn progress(&self, state: &ApplicationState) -> Progress {
        Progress {
            completed: self
                .navigable()
                .filter(|lab| state.is_lab_complete(lab.id))
                .count(),
            total: self.navigable().count(),
        }
    }
}
