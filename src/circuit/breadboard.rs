use super::board::MicroController;

const FIRST_COLUMN: u32 = 4;
const END_COLUMN: u32 = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hole {
    position: u32,
    taken: bool,
}

/// Free columns on the bottom power/ground rails. One allocator per
/// rendered circuit; dropping it releases every hole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleAllocator {
    holes: Vec<Hole>,
}

impl HoleAllocator {
    pub fn new(board: &MicroController) -> Self {
        HoleAllocator {
            holes: (FIRST_COLUMN..END_COLUMN)
                .filter(|i| !board.skip_holes.contains(i))
                .map(|position| Hole {
                    position,
                    taken: false,
                })
                .collect(),
        }
    }

    pub fn available(&self) -> usize {
        self.holes.iter().filter(|h| !h.taken).count()
    }

    /// Lowest free column.
    pub fn take_next(&mut self) -> Option<u32> {
        let hole = self.holes.iter_mut().find(|h| !h.taken)?;
        hole.taken = true;
        Some(hole.position)
    }

    /// Free column nearest to `column` on the `direction` side of it.
    /// Falls back to the nearest free column on either side.
    pub fn take_closest(&mut self, column: u32, direction: Direction) -> Option<u32> {
        let on_side = self
            .holes
            .iter_mut()
            .filter(|h| !h.taken)
            .filter(|h| match direction {
                Direction::Right => h.position > column,
                Direction::Left => h.position < column,
            })
            .min_by_key(|h| h.position.abs_diff(column));
        if let Some(hole) = on_side {
            hole.taken = true;
            return Some(hole.position);
        }

        let anywhere = self
            .holes
            .iter_mut()
            .filter(|h| !h.taken)
            .min_by_key(|h| h.position.abs_diff(column))?;
        anywhere.taken = true;
        Some(anywhere.position)
    }

    pub fn give_back(&mut self, position: u32) {
        if let Some(hole) = self.holes.iter_mut().find(|h| h.position == position) {
            hole.taken = false;
        }
    }
}
