use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashSet;
use board::{encode_board, Board, BoardError, PieceKind, Square, BOARD_SIZE};
use evaluator::samples::Samples;
use rand::{rngs::StdRng, Rng, SeedableRng};

const MOVE_COOLDOWN: u32 = 2;
const MAX_TARGET_ATTEMPTS: usize = 16;
const MATERIAL_SCALE: f32 = 10.0;

/// Plays random lines from the initial position until the shared line budget
/// is spent or the stop flag is raised.
pub struct LineWorker {
    tid: usize,
    line_counter: Arc<AtomicUsize>,
    stop_flag: Arc<AtomicBool>,
    length: usize,
    seed: Option<u64>,
}

impl LineWorker {
    pub fn new(
        tid: usize,
        line_counter: Arc<AtomicUsize>,
        stop_flag: Arc<AtomicBool>,
        length: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            tid,
            line_counter,
            stop_flag,
            length,
            seed,
        }
    }

    pub fn play_lines(&mut self, lines: usize) -> Result<Vec<(usize, Samples)>, BoardError> {
        let mut played = Vec::new();

        while !self.stop_flag.load(Ordering::Relaxed) {
            let line_id = self.line_counter.fetch_add(1, Ordering::Relaxed);
            if line_id >= lines {
                break;
            }

            let line = self.play_line(line_id)?;
            log::debug!(
                "[{}] Line {} finished with {} positions",
                self.tid,
                line_id,
                line.len()
            );
            played.push((line_id, line));

            if (line_id + 1) % 100 == 0 {
                log::info!("Generated {} lines", line_id + 1);
            }
        }

        Ok(played)
    }

    fn play_line(&self, line_id: usize) -> Result<Samples, BoardError> {
        // Seeding per line keeps the data independent of thread scheduling
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(line_id as u64)),
            None => StdRng::from_entropy(),
        };

        let mut board = Board::initial();
        let mut seen = AHashSet::new();
        let mut samples = Samples::new();

        for _ in 0..self.length {
            let features = encode_board(&board)?;
            let key: Vec<u32> = features.iter().map(|v| v.to_bits()).collect();
            if !seen.insert(key) {
                log::debug!("[{}] Repetition in line {}", self.tid, line_id);
                break;
            }

            samples.push(features, label(&board), line_id);

            if !make_random_move(&mut board, &mut rng)? {
                break;
            }
        }

        Ok(samples)
    }
}

/// Material balance squashed into [-1, 1].
fn label(board: &Board) -> f32 {
    (board.material_balance() as f32 / MATERIAL_SCALE).tanh()
}

// Moves a random ready piece to a random square, capturing whatever enemy
// non-king stands there. Returns false when no piece could move.
fn make_random_move(board: &mut Board, rng: &mut StdRng) -> Result<bool, BoardError> {
    tick_cooldowns(board)?;

    let ready: Vec<(PieceKind, usize)> = PieceKind::ALL
        .iter()
        .flat_map(|&kind| {
            board
                .pieces(kind)
                .iter()
                .enumerate()
                .filter(|(_, p)| p.alive && p.cooldown == 0)
                .map(move |(slot, _)| (kind, slot))
        })
        .collect();

    if ready.is_empty() {
        return Ok(false);
    }

    for _ in 0..MAX_TARGET_ATTEMPTS {
        let (kind, slot) = ready[rng.gen_range(0..ready.len())];
        let mover = *board.piece(kind, slot)?;
        let target = Square::new(rng.gen_range(0..BOARD_SIZE), rng.gen_range(0..BOARD_SIZE))?;

        if target == mover.square {
            continue;
        }

        if let Some((victim_kind, victim_slot)) = board.piece_at(target) {
            let victim = board.piece(victim_kind, victim_slot)?;
            if victim.side == mover.side || victim_kind == PieceKind::King {
                continue;
            }
            board.capture(victim_kind, victim_slot)?;
        }

        board.relocate(kind, slot, target)?;
        board.set_cooldown(kind, slot, MOVE_COOLDOWN)?;
        return Ok(true);
    }

    Ok(false)
}

fn tick_cooldowns(board: &mut Board) -> Result<(), BoardError> {
    for kind in PieceKind::ALL {
        for slot in 0..kind.slots() {
            let piece = board.piece_mut(kind, slot)?;
            piece.cooldown = piece.cooldown.saturating_sub(1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::Side;

    #[test]
    fn test_random_moves_keep_board_valid() {
        let mut board = Board::initial();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            make_random_move(&mut board, &mut rng).unwrap();
            assert!(board.validate().is_ok());
            assert_eq!(board.alive_count(PieceKind::King, Side::White), 1);
            assert_eq!(board.alive_count(PieceKind::King, Side::Black), 1);
        }
    }

    #[test]
    fn test_label_follows_material() {
        let mut board = Board::initial();
        assert_eq!(label(&board), 0.0);

        board.capture(PieceKind::Queen, 1).unwrap();
        assert!((label(&board) - 0.9f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_lines_are_reproducible() {
        let worker = LineWorker::new(
            0,
            Arc::new(AtomicUsize::new(0)),
            Arc::new(AtomicBool::new(false)),
            12,
            Some(3),
        );

        let a = worker.play_line(5).unwrap();
        let b = worker.play_line(5).unwrap();
        assert_eq!(a.features, b.features);
        assert!(a.line_ids.iter().all(|&id| id == 5));
        assert!(!a.is_empty());
    }
}
