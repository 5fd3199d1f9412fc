//! Dynamics of FrozenLake.
//!
//! Letters of a map: `S` start, `F` frozen, `H` hole, `G` goal. Falling into a
//! hole or reaching the goal ends the episode; only the goal pays 1. On a
//! slippery lake the agent moves in the intended direction or in one of the
//! two perpendicular directions, each with probability 1/3.
use anyhow::{bail, Result};
use rand::{rngs::SmallRng, Rng};

pub(super) const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

pub(super) const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF",
    "FFFHFFFG",
];

/// Checks a map and converts it to rows of bytes.
pub(super) fn parse_desc<S: AsRef<str>>(rows: &[S]) -> Result<Vec<Vec<u8>>> {
    let desc = rows
        .iter()
        .map(|r| r.as_ref().as_bytes().to_vec())
        .collect::<Vec<_>>();

    let ncols = match desc.first() {
        Some(row) if !row.is_empty() => row.len(),
        _ => bail!("Empty FrozenLake map"),
    };
    if desc.iter().any(|row| row.len() != ncols) {
        bail!("FrozenLake map is not rectangular");
    }
    if let Some(c) = desc.iter().flatten().find(|&&c| !b"SFHG".contains(&c)) {
        bail!("Unexpected letter {:?} in FrozenLake map", *c as char);
    }
    if desc.iter().flatten().filter(|&&c| c == b'S').count() != 1 {
        bail!("FrozenLake map must have exactly one start");
    }

    Ok(desc)
}

pub(super) fn start_state(desc: &[Vec<u8>]) -> usize {
    desc.iter()
        .flatten()
        .position(|&c| c == b'S')
        .unwrap_or_default()
}

fn is_terminal(letter: u8) -> bool {
    letter == b'G' || letter == b'H'
}

/// Returns `(next_state, reward, terminated)`.
///
/// `rng` is drawn only on a slippery lake.
pub(super) fn transition(
    desc: &[Vec<u8>],
    is_slippery: bool,
    state: usize,
    action: usize,
    rng: &mut SmallRng,
) -> (usize, f32, bool) {
    let (nrows, ncols) = (desc.len(), desc[0].len());
    let (row, col) = (state / ncols, state % ncols);

    if is_terminal(desc[row][col]) {
        return (state, 0.0, true);
    }

    let action = if is_slippery {
        [(action + 3) % 4, action, (action + 1) % 4][rng.gen_range(0..3)]
    } else {
        action
    };

    let (row, col) = match action {
        0 => (row, col.saturating_sub(1)),
        1 => ((row + 1).min(nrows - 1), col),
        2 => (row, (col + 1).min(ncols - 1)),
        _ => (row.saturating_sub(1), col),
    };
    let letter = desc[row][col];
    let reward = if letter == b'G' { 1.0 } else { 0.0 };

    (row * ncols + col, reward, is_terminal(letter))
}

pub(super) fn render(desc: &[Vec<u8>], state: usize, last_action: Option<usize>) -> String {
    let ncols = desc[0].len();
    let mut lines = vec![];
    if let Some(a) = last_action {
        let name = ["Left", "Down", "Right", "Up"][a % 4];
        lines.push(format!("  ({})", name));
    }
    for (row, letters) in desc.iter().enumerate() {
        let line = letters
            .iter()
            .enumerate()
            .map(|(col, &c)| {
                if row * ncols + col == state {
                    format!("[{}]", c as char)
                } else {
                    format!(" {} ", c as char)
                }
            })
            .collect::<String>();
        lines.push(line);
    }
    lines.join("\n")
}
