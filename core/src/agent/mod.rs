use alloc::vec::Vec;
use hashbrown::HashSet;
use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

pub use sentence::*;

mod sentence;

/// Knowledge-based Minesweeper player.
///
/// Every revealed cell turns into a [`Sentence`] over its hidden neighbors.
/// After each observation the agent runs a deduction loop to fixpoint:
/// sentences at `count == 0` or `count == |cells|` resolve all their members,
/// every certainty is broadcast into the whole knowledge base, and the subset
/// rule derives new sentences from nested pairs. The loop is quadratic in the
/// knowledge-base size per pass, which is fine for boards in the
/// tens-by-tens range.
///
/// `moves_made`, `known_mines` and `known_safe` only ever grow, and the two
/// derived sets stay disjoint as long as the observations fed in are
/// truthful.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    size: Cell,
    moves_made: HashSet<Cell>,
    known_mines: HashSet<Cell>,
    known_safe: HashSet<Cell>,
    knowledge: Vec<Sentence>,
}

impl Agent {
    pub fn new(config: GameConfig) -> Self {
        Self {
            size: config.size,
            moves_made: HashSet::new(),
            known_mines: HashSet::new(),
            known_safe: HashSet::new(),
            knowledge: Vec::new(),
        }
    }

    pub fn size(&self) -> Cell {
        self.size
    }

    pub fn moves_made(&self) -> &HashSet<Cell> {
        &self.moves_made
    }

    pub fn known_mines(&self) -> &HashSet<Cell> {
        &self.known_mines
    }

    pub fn known_safe(&self) -> &HashSet<Cell> {
        &self.known_safe
    }

    pub fn knowledge_len(&self) -> usize {
        self.knowledge.len()
    }

    /// Records that `cell` is safe and broadcasts the fact into every held
    /// sentence. Idempotent; `Changed` means something actually moved.
    pub fn report_safe(&mut self, cell: Cell) -> MarkOutcome {
        let mut outcome = if self.known_safe.insert(cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        };
        for sentence in &mut self.knowledge {
            outcome = outcome | sentence.mark_safe(cell);
        }
        outcome
    }

    /// Records that `cell` is a mine and broadcasts the fact into every held
    /// sentence. Idempotent.
    pub fn report_mine(&mut self, cell: Cell) -> MarkOutcome {
        let mut outcome = if self.known_mines.insert(cell) {
            MarkOutcome::Changed
        } else {
            MarkOutcome::NoChange
        };
        for sentence in &mut self.knowledge {
            outcome = outcome | sentence.mark_mine(cell);
        }
        outcome
    }

    /// Primary entry point: the board told us the revealed `cell` has `count`
    /// adjacent mines. Records the move, stores the neighbor sentence, and
    /// deduces everything that follows before returning.
    pub fn observe(&mut self, cell: Cell, count: u8) -> Result<()> {
        self.validate_cell(cell)?;

        let neighbor_cells: Vec<Cell> = neighbors(cell, self.size).collect();
        if usize::from(count) > neighbor_cells.len() {
            return Err(GameError::ImpossibleClue);
        }

        self.moves_made.insert(cell);
        self.report_safe(cell);

        // The clue counts every adjacent mine, known ones included, so fold
        // already-certain cells into the sentence up front.
        let mut sentence = Sentence::new(neighbor_cells, count.into());
        for &mine in &self.known_mines {
            sentence.mark_mine(mine);
        }
        for &safe in &self.known_safe {
            sentence.mark_safe(safe);
        }

        debug!("observed {:?} = {}, recording {}", cell, count, sentence);
        self.insert_sentence(sentence);
        self.run_deduction();
        Ok(())
    }

    /// Any cell proven safe that has not been played yet. Read-only;
    /// which candidate wins is arbitrary.
    pub fn choose_safe_move(&self) -> Option<Cell> {
        self.known_safe
            .iter()
            .find(|cell| !self.moves_made.contains(*cell))
            .copied()
    }

    /// Uniform guess among cells that are neither played nor known mines.
    /// Read-only on the agent; the caller supplies the randomness.
    pub fn choose_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Cell> {
        let (rows, cols) = self.size;
        let mut candidates: Vec<Cell> = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let cell = (row, col);
                if !self.moves_made.contains(&cell) && !self.known_mines.contains(&cell) {
                    candidates.push(cell);
                }
            }
        }

        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.random_range(0..candidates.len())])
        }
    }

    fn validate_cell(&self, cell: Cell) -> Result<Cell> {
        if cell.0 < self.size.0 && cell.1 < self.size.1 {
            Ok(cell)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Appends a sentence unless it is empty or already held.
    fn insert_sentence(&mut self, sentence: Sentence) -> MarkOutcome {
        if sentence.is_empty() || self.knowledge.contains(&sentence) {
            MarkOutcome::NoChange
        } else {
            self.knowledge.push(sentence);
            MarkOutcome::Changed
        }
    }

    /// Runs deduction to fixpoint. Terminates because the cell universe is
    /// finite, sentences only shrink, and derived sentences are deduplicated.
    fn run_deduction(&mut self) {
        loop {
            let mut changed = MarkOutcome::NoChange;

            // direct extraction: sentences at 0 or |cells| resolve every member
            let mut safe_cells: Vec<Cell> = Vec::new();
            let mut mine_cells: Vec<Cell> = Vec::new();
            for sentence in &self.knowledge {
                if let Some(cells) = sentence.known_safe_cells() {
                    safe_cells.extend(cells.iter().copied());
                } else if let Some(cells) = sentence.known_mine_cells() {
                    mine_cells.extend(cells.iter().copied());
                }
            }
            for cell in safe_cells {
                if self.report_safe(cell).has_update() {
                    debug!("deduced safe cell {:?}", cell);
                    changed = MarkOutcome::Changed;
                }
            }
            for cell in mine_cells {
                if self.report_mine(cell).has_update() {
                    debug!("deduced mine at {:?}", cell);
                    changed = MarkOutcome::Changed;
                }
            }

            // subset rule over every ordered pair of sentences
            let mut derived: Vec<Sentence> = Vec::new();
            for full in &self.knowledge {
                for subset in &self.knowledge {
                    if let Some(sentence) = full.resolve_with(subset) {
                        if !self.knowledge.contains(&sentence) && !derived.contains(&sentence) {
                            derived.push(sentence);
                        }
                    }
                }
            }
            if !derived.is_empty() {
                trace!("subset rule derived {} new sentence(s)", derived.len());
            }
            for sentence in derived {
                changed = changed | self.insert_sentence(sentence);
            }

            // narrowed-to-empty sentences are tautologies, drop them
            self.knowledge.retain(|sentence| !sentence.is_empty());

            if !changed.has_update() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn agent(size: Cell) -> Agent {
        Agent::new(GameConfig::new_unchecked(size, 1))
    }

    #[test]
    fn zero_clue_marks_all_neighbors_safe() {
        let mut agent = agent((3, 3));

        agent.observe((0, 0), 0).unwrap();

        for cell in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert!(agent.known_safe().contains(&cell));
        }
        assert!(agent.known_mines().is_empty());
    }

    #[test]
    fn full_clue_marks_all_neighbors_as_mines() {
        let mut agent = agent((3, 3));

        agent.observe((1, 1), 8).unwrap();

        assert_eq!(agent.known_mines().len(), 8);
        assert!(!agent.known_mines().contains(&(1, 1)));
        assert!(agent.known_safe().contains(&(1, 1)));
    }

    #[test]
    fn subset_resolution_marks_exclusive_cell_safe() {
        let mut agent = agent((4, 4));
        agent.insert_sentence(Sentence::new([(1, 1), (1, 2), (2, 1)], 1));
        agent.insert_sentence(Sentence::new([(1, 1), (1, 2)], 1));

        agent.run_deduction();

        assert!(agent.known_safe().contains(&(2, 1)));
        assert!(!agent.known_mines().contains(&(2, 1)));
    }

    #[test]
    fn subset_resolution_can_prove_mines() {
        let mut agent = agent((4, 4));
        agent.insert_sentence(Sentence::new([(0, 0), (0, 1), (0, 2)], 2));
        agent.insert_sentence(Sentence::new([(0, 1)], 0));

        agent.run_deduction();

        // {(0,0),(0,2)} = 2 follows, so both are mines
        assert!(agent.known_mines().contains(&(0, 0)));
        assert!(agent.known_mines().contains(&(0, 2)));
        assert!(agent.known_safe().contains(&(0, 1)));
    }

    #[test]
    fn reports_are_idempotent() {
        let mut agent = agent((3, 3));

        assert_eq!(agent.report_mine((2, 2)), MarkOutcome::Changed);
        let snapshot = agent.clone();
        assert_eq!(agent.report_mine((2, 2)), MarkOutcome::NoChange);
        assert_eq!(agent, snapshot);

        assert_eq!(agent.report_safe((0, 0)), MarkOutcome::Changed);
        let snapshot = agent.clone();
        assert_eq!(agent.report_safe((0, 0)), MarkOutcome::NoChange);
        assert_eq!(agent, snapshot);
    }

    #[test]
    fn observe_rejects_out_of_bounds_cells() {
        let mut agent = agent((3, 3));

        assert_eq!(agent.observe((3, 0), 0), Err(GameError::InvalidCoords));
        assert!(agent.moves_made().is_empty());
    }

    #[test]
    fn observe_rejects_impossible_clue_counts() {
        let mut agent = agent((3, 3));

        // a corner has only three neighbors
        assert_eq!(agent.observe((0, 0), 4), Err(GameError::ImpossibleClue));
        assert!(agent.moves_made().is_empty());
    }

    #[test]
    fn end_to_end_three_by_three_single_mine() {
        let minefield = Minefield::from_mine_coords((3, 3), &[(2, 2)]).unwrap();
        let mut game = Game::new(minefield);
        let mut agent = agent((3, 3));

        let report = game.reveal((0, 0)).unwrap();
        assert_eq!(report.outcome, RevealOutcome::Won);

        let (first, rest) = report.observations.split_first().unwrap();
        agent.observe(first.0, first.1).unwrap();

        // one zero observation resolves the whole neighborhood
        assert!(agent.known_safe().contains(&(0, 1)));
        assert!(agent.known_safe().contains(&(1, 0)));
        assert!(agent.known_safe().contains(&(1, 1)));
        let safe_move = agent.choose_safe_move().unwrap();
        assert_ne!(safe_move, (2, 2));
        assert!(!agent.moves_made().contains(&safe_move));

        for &(cell, count) in rest {
            agent.observe(cell, count).unwrap();
        }

        // every cell but the mine is proven safe, and the mine itself falls
        // out of the clues around it
        assert_eq!(agent.known_safe().len(), 8);
        assert!(!agent.known_safe().contains(&(2, 2)));
        assert_eq!(agent.known_mines().iter().copied().collect::<Vec<_>>(), [(2, 2)]);

        // no-move scenario: all safe cells played, the rest are mines
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(agent.choose_safe_move(), None);
        assert_eq!(agent.choose_random_move(&mut rng), None);
    }

    #[test]
    fn safe_move_prefers_unplayed_cells_only() {
        let mut agent = agent((2, 2));

        agent.observe((0, 0), 0).unwrap();
        let mut seen: Vec<Cell> = Vec::new();
        while let Some(cell) = agent.choose_safe_move() {
            assert!(!agent.moves_made().contains(&cell));
            agent.observe(cell, 0).unwrap();
            seen.push(cell);
        }

        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn random_move_avoids_played_cells_and_known_mines() {
        let mut closed = agent((2, 2));
        closed.observe((0, 0), 3).unwrap();

        let mut rng = SmallRng::seed_from_u64(1);
        // every unplayed cell is a known mine now
        assert_eq!(closed.choose_random_move(&mut rng), None);

        let mut open = agent((2, 2));
        open.observe((0, 0), 1).unwrap();
        for _ in 0..16 {
            let cell = open.choose_random_move(&mut rng).unwrap();
            assert_ne!(cell, (0, 0));
        }
    }

    fn assert_invariants(agent: &Agent, minefield: &Minefield) {
        assert!(
            agent.known_mines.is_disjoint(&agent.known_safe),
            "known mines and known safes overlap"
        );
        for cell in &agent.known_mines {
            assert!(minefield.is_mine(*cell), "{:?} marked mine but is safe", cell);
        }
        for cell in &agent.known_safe {
            assert!(!minefield.is_mine(*cell), "{:?} marked safe but is a mine", cell);
        }
        for sentence in &agent.knowledge {
            let true_mines = sentence
                .cells()
                .iter()
                .filter(|&&cell| minefield.is_mine(cell))
                .count();
            assert_eq!(
                true_mines,
                sentence.count() as usize,
                "unsound sentence {}",
                sentence
            );
            assert!(sentence.count() as usize <= sentence.cells().len());
        }
    }

    fn play_out(seed: u64, size: Cell, mines: CellCount) {
        let config = GameConfig::new(size, mines);
        let minefield =
            RandomMinefieldGenerator::new(seed, (0, 0), StartTile::SimpleSafe).generate(config);
        let mut game = Game::new(minefield.clone());
        let mut agent = Agent::new(config);
        let mut rng = SmallRng::seed_from_u64(seed);

        while !game.is_finished() {
            let Some(cell) = agent
                .choose_safe_move()
                .or_else(|| agent.choose_random_move(&mut rng))
            else {
                break;
            };

            let report = game.reveal(cell).unwrap();
            if report.outcome == RevealOutcome::HitMine {
                break;
            }
            for (observed, count) in report.observations {
                agent.observe(observed, count).unwrap();
                assert_invariants(&agent, &minefield);
            }
        }
    }

    #[test]
    fn full_games_stay_sound_and_terminate() {
        for seed in 0..8 {
            play_out(seed, (8, 8), 8);
        }
        play_out(99, (20, 20), 40);
        play_out(7, (5, 5), 24);
        play_out(3, (1, 1), 1);
    }
}
