#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FieldShape {
    Hms,
    Ms,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Section {
    Hours,
    Minutes,
    Seconds,
}

impl FieldShape {
    pub fn width(self) -> usize {
        match self {
            FieldShape::Hms => 8,
            FieldShape::Ms => 5,
        }
    }

    pub fn colons(self) -> &'static [usize] {
        match self {
            FieldShape::Hms => &[2, 5],
            FieldShape::Ms => &[2],
        }
    }

    pub fn is_colon(self, pos: usize) -> bool {
        self.colons().contains(&pos)
    }

    pub fn last_position(self) -> usize {
        self.width() - 1
    }

    pub fn sections(self) -> &'static [Section] {
        match self {
            FieldShape::Hms => &[Section::Hours, Section::Minutes, Section::Seconds],
            FieldShape::Ms => &[Section::Minutes, Section::Seconds],
        }
    }

    /// A caret sitting right after a section's last digit still belongs to that
    /// section, so the colon position resolves to the section on its left.
    pub fn section_at(self, pos: usize) -> Section {
        match self {
            FieldShape::Hms => {
                if pos <= 2 {
                    Section::Hours
                } else if pos <= 5 {
                    Section::Minutes
                } else {
                    Section::Seconds
                }
            }
            FieldShape::Ms => {
                if pos <= 2 {
                    Section::Minutes
                } else {
                    Section::Seconds
                }
            }
        }
    }

    pub fn range(self, section: Section) -> (usize, usize) {
        match (self, section) {
            (FieldShape::Hms, Section::Hours) => (0, 2),
            (FieldShape::Hms, Section::Minutes) => (3, 5),
            (FieldShape::Hms, Section::Seconds) => (6, 8),
            (FieldShape::Ms, Section::Hours | Section::Minutes) => (0, 2),
            (FieldShape::Ms, Section::Seconds) => (3, 5),
        }
    }

    pub fn range_at(self, pos: usize) -> (usize, usize) {
        self.range(self.section_at(pos))
    }

    pub fn next_section_start(self, section: Section) -> Option<usize> {
        let position = self.sections().iter().position(|s| *s == section)?;
        let next = self.sections().get(position + 1)?;
        Some(self.range(*next).0)
    }

    pub fn prev_section_end(self, section: Section) -> Option<usize> {
        let position = self.sections().iter().position(|s| *s == section)?;
        let prev = self.sections().get(position.checked_sub(1)?)?;
        Some(self.range(*prev).1)
    }
}
