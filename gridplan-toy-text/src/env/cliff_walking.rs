//! Dynamics of CliffWalking.
//!
//! The grid has 4 rows and 12 columns. The agent starts at the bottom-left
//! corner and the goal is the bottom-right corner. The cells in between form
//! the cliff: stepping into it costs -100 and sends the agent back to the
//! start without ending the episode. Every other move costs -1.

pub(super) const NROWS: usize = 4;
pub(super) const NCOLS: usize = 12;
pub(super) const START: usize = 36;
pub(super) const GOAL: usize = 47;

// up, right, down, left
const DELTAS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

fn is_cliff(row: usize, col: usize) -> bool {
    row == NROWS - 1 && col > 0 && col < NCOLS - 1
}

/// Returns `(next_state, reward, terminated)`.
pub(super) fn transition(state: usize, action: usize) -> (usize, f32, bool) {
    let (row, col) = (state / NCOLS, state % NCOLS);
    let (dr, dc) = DELTAS[action];
    let row = (row as isize + dr).clamp(0, NROWS as isize - 1) as usize;
    let col = (col as isize + dc).clamp(0, NCOLS as isize - 1) as usize;

    if is_cliff(row, col) {
        (START, -100.0, false)
    } else {
        let next = row * NCOLS + col;
        (next, -1.0, next == GOAL)
    }
}

pub(super) fn render(state: usize) -> String {
    (0..NROWS)
        .map(|row| {
            (0..NCOLS)
                .map(|col| {
                    let s = row * NCOLS + col;
                    if s == state {
                        " x "
                    } else if s == GOAL {
                        " T "
                    } else if is_cliff(row, col) {
                        " C "
                    } else {
                        " o "
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_are_clipped_at_borders() {
        assert_eq!(transition(0, 0), (0, -1.0, false));
        assert_eq!(transition(0, 3), (0, -1.0, false));
        assert_eq!(transition(11, 1), (11, -1.0, false));
        assert_eq!(transition(START, 2), (START, -1.0, false));
        assert_eq!(transition(START, 3), (START, -1.0, false));
    }

    #[test]
    fn test_cliff_sends_back_to_start() {
        assert_eq!(transition(START, 1), (START, -100.0, false));
        for col in 1..NCOLS - 1 {
            assert_eq!(transition(2 * NCOLS + col, 2), (START, -100.0, false));
        }
    }

    #[test]
    fn test_goal_terminates() {
        assert_eq!(transition(35, 2), (GOAL, -1.0, true));
        assert_eq!(transition(GOAL, 1), (GOAL, -1.0, true));
        assert_eq!(transition(GOAL, 0), (35, -1.0, false));
    }

    #[test]
    fn test_render() {
        let s = render(START);
        let rows = s.lines().collect::<Vec<_>>();
        assert_eq!(rows.len(), NROWS);
        assert_eq!(rows[3], format!(" x {} T ", " C ".repeat(10)));
    }
}
