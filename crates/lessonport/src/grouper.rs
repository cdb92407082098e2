use serde::Serialize;

use crate::content::SectionHeading;

/// A section ready to be written, with the lessons gathered since the previous boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SectionRecord<L> {
    pub title: Option<String>,
    pub description: Vec<String>,
    pub lessons: Vec<L>,
}

impl<L> SectionRecord<L> {
    pub fn description_text(&self) -> String {
        self.description.join("\n")
    }
}

/// Buffers lessons until a section boundary, then hands them out as one record.
///
/// The heading adopted at a boundary titles the lessons that follow it. A record is
/// only produced when at least one lesson is buffered.
#[derive(Debug)]
pub struct SectionGrouper<L> {
    active: SectionHeading,
    lessons: Vec<L>,
}

impl<L> Default for SectionGrouper<L> {
    fn default() -> Self {
        Self {
            active: SectionHeading::default(),
            lessons: Vec::new(),
        }
    }
}

impl<L> SectionGrouper<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lessons waiting for a section.
    pub fn buffered(&self) -> usize {
        self.lessons.len()
    }

    pub fn push_lesson(&mut self, lesson: L) {
        self.lessons.push(lesson);
    }

    /// Closes the buffered lessons under the current heading, then adopts `heading` for
    /// the lessons that follow.
    pub fn begin_section(&mut self, heading: SectionHeading) -> Option<SectionRecord<L>> {
        let record = self.flush();
        self.active = heading;
        record
    }

    /// Final flush once the directory sequence is exhausted.
    pub fn finish(mut self) -> Option<SectionRecord<L>> {
        self.flush()
    }

    fn flush(&mut self) -> Option<SectionRecord<L>> {
        if self.lessons.is_empty() {
            return None;
        }
        Some(SectionRecord {
            title: self.active.title.clone(),
            description: self.active.description.clone(),
            lessons: std::mem::take(&mut self.lessons),
        })
    }
}
