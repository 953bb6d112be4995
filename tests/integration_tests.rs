//! Session end-to-end: intents, gravity, locking, hold, game over and restart.

use tremor_tetris::core::{Board, GameSession, LockState, Piece};
use tremor_tetris::types::{
    ClearEvent, GameAction, GameEvent, PieceKind, Rgb, BOARD_WIDTH, DEFAULT_PALETTE, TICK_MS,
};

const FILL: Rgb = Rgb::new(90, 90, 90);

fn occupied_row(game: &GameSession, y: i8) -> String {
    (0..BOARD_WIDTH as i8)
        .map(|x| if game.board().is_occupied(x, y) { 'x' } else { '.' })
        .collect()
}

fn run_ms(game: &mut GameSession, ms: u32) {
    for _ in 0..ms / TICK_MS {
        game.tick(TICK_MS);
    }
}

#[test]
fn test_hard_drop_i_piece_on_empty_board() {
    let mut game = GameSession::new(12345);
    let color = DEFAULT_PALETTE[1];
    assert!(game.place_active(Piece::new(PieceKind::I, color), 3, 0));

    assert!(game.apply_action(GameAction::HardDrop));

    assert_eq!(occupied_row(&game, 19), "...xxxx...");
    for x in 3..=6 {
        assert_eq!(game.board().get(x, 19), Some(Some(color)));
    }
    assert_eq!(game.board().occupied_count(), 4);
    assert_eq!(game.lines(), 0);
    // Only the hard-drop distance bonus: 19 rows x 2.
    assert_eq!(game.score(), 38);
    assert_eq!(game.hard_drop_cells(), 19);
    assert!(game.active().is_some(), "next piece spawned");
}

#[test]
fn test_filling_the_gap_clears_one_line() {
    let mut game = GameSession::new(7);
    for x in 1..BOARD_WIDTH as i8 {
        game.board_mut().set(x, 19, Some(FILL));
    }
    let vertical_i = Piece::new(PieceKind::I, DEFAULT_PALETTE[0]).rotated_cw();
    assert!(game.place_active(vertical_i, 0, 0));

    game.apply_action(GameAction::HardDrop);

    assert_eq!(game.lines(), 1);
    assert_eq!(occupied_row(&game, 0), "..........");
    // The rest of the I slid down into rows 17..19.
    for y in 17..20 {
        assert_eq!(occupied_row(&game, y), "x.........");
    }
    assert_eq!(game.board().occupied_count(), 3);
    // 16 rows of hard drop, a single at level 1, combo 1.
    assert_eq!(game.score(), 32 + 100 + 50);
}

#[test]
fn test_gravity_moves_the_piece_once_per_second() {
    let mut game = GameSession::new(1);
    let start = game.active().unwrap().y;
    run_ms(&mut game, 992);
    assert_eq!(game.active().unwrap().y, start);
    game.tick(TICK_MS);
    assert_eq!(game.active().unwrap().y, start + 1);
    assert_eq!(game.score(), 0, "gravity awards nothing");
}

#[test]
fn test_soft_drop_release_commits_a_locking_piece() {
    let mut game = GameSession::new(3);
    assert!(game.place_active(Piece::new(PieceKind::O, DEFAULT_PALETTE[2]), 0, 18));

    // Blocked soft drop while held: waits instead of locking.
    assert!(!game.apply_action(GameAction::SoftDrop));
    assert!(matches!(game.lock_state(), LockState::Locking { .. }));
    assert_eq!(game.board().occupied_count(), 0);

    assert!(game.apply_action(GameAction::SoftDropRelease));
    assert_eq!(game.board().occupied_count(), 4);
    assert_eq!(occupied_row(&game, 19), "xx........");
}

#[test]
fn test_gravity_locks_immediately_without_soft_drop() {
    let mut game = GameSession::new(3);
    assert!(game.place_active(Piece::new(PieceKind::O, DEFAULT_PALETTE[2]), 0, 18));
    run_ms(&mut game, 1008);
    assert_eq!(game.board().occupied_count(), 4);
}

#[test]
fn test_hold_once_per_placement() {
    let mut game = GameSession::new(11);
    let first = game.active().unwrap().piece;
    let next = game.next_piece();

    assert!(game.apply_action(GameAction::Hold));
    assert_eq!(game.hold_piece(), Some(first.reset_orientation()));
    assert_eq!(game.active().unwrap().piece, next);
    assert!(!game.apply_action(GameAction::Hold));

    game.apply_action(GameAction::HardDrop);
    assert!(game.can_hold());
    assert!(game.apply_action(GameAction::Hold));
    assert_eq!(game.active().unwrap().piece, first.reset_orientation());
}

#[test]
fn test_game_over_and_restart() {
    let mut game = GameSession::new(5);
    for y in 0..20 {
        for x in 3..7 {
            game.board_mut().set(x, y, Some(FILL));
        }
    }
    assert!(game.place_active(Piece::new(PieceKind::O, DEFAULT_PALETTE[0]), 0, 0));
    game.apply_action(GameAction::HardDrop);

    assert!(game.game_over());
    assert!(game.active().is_none());
    let events = game.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::GameOver { .. })));

    // Only restart is accepted now; timers are frozen.
    assert!(!game.apply_action(GameAction::MoveLeft));
    assert!(!game.apply_action(GameAction::HardDrop));
    let occupied = game.board().occupied_count();
    run_ms(&mut game, 2000);
    assert_eq!(game.board().occupied_count(), occupied);

    assert!(game.apply_action(GameAction::Restart));
    assert!(!game.game_over());
    assert_eq!(game.board().occupied_count(), 0);
    assert_eq!(game.score(), 0);
    assert_eq!(game.level(), 1);
    assert_eq!(game.episode_id(), 1);
    assert!(game.active().is_some());
}

fn line_clears(game: &mut GameSession) -> Vec<ClearEvent> {
    game.take_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::LineClear(clear) => Some(clear),
            _ => None,
        })
        .collect()
}

/// Two rows with a recess that a T can only enter by rotating beside it:
/// the T's center lands on (5, 18) with three of its corners blocked.
fn t_slot_game() -> GameSession {
    let mut game = GameSession::new(21);
    *game.board_mut() = Board::from_ascii(
        &[
            "......x...",
            "xxxx..xxxx",
            "xxxxx.xxxx",
        ],
        FILL,
    );
    game.take_events();
    game
}

#[test]
fn test_t_rotated_into_a_recess_is_a_tspin() {
    let mut game = t_slot_game();
    assert!(game.place_active(Piece::new(PieceKind::T, DEFAULT_PALETTE[0]), 3, 17));

    assert!(game.apply_action(GameAction::Rotate));
    let active = game.active().unwrap();
    assert_eq!((active.x, active.y), (4, 17));
    assert!(game.apply_action(GameAction::HardDrop));

    let clears = line_clears(&mut game);
    assert_eq!(clears.len(), 1);
    assert_eq!(clears[0].lines_cleared, 2);
    assert!(clears[0].tspin);
    assert_eq!(clears[0].points, 1250);
    assert_eq!(game.score(), 1250);
}

#[test]
fn test_rotating_high_then_dropping_straight_is_not_a_tspin() {
    let mut game = t_slot_game();
    assert!(game.place_active(Piece::new(PieceKind::T, DEFAULT_PALETTE[0]), 4, 0));
    assert!(game.apply_action(GameAction::Rotate));
    assert!(game.last_action_was_rotate());
    assert_eq!(game.active().unwrap().x, 4);

    assert!(game.apply_action(GameAction::HardDrop));

    let clears = line_clears(&mut game);
    assert_eq!(clears.len(), 1);
    assert_eq!(clears[0].lines_cleared, 2);
    assert!(!clears[0].tspin);
    assert_eq!(clears[0].points, 350);
    // 17 rows of hard drop on top.
    assert_eq!(game.score(), 350 + 34);
}

#[test]
fn test_descending_after_a_rotation_clears_the_rotation_flag() {
    let mut game = GameSession::new(3);
    assert!(game.place_active(Piece::new(PieceKind::T, DEFAULT_PALETTE[0]), 4, 0));
    assert!(game.apply_action(GameAction::Rotate));
    assert!(game.apply_action(GameAction::SoftDrop));
    assert!(!game.last_action_was_rotate());

    assert!(game.apply_action(GameAction::Rotate));
    run_ms(&mut game, 1008);
    assert_eq!(game.active().unwrap().y, 2);
    assert!(!game.last_action_was_rotate());
}

#[test]
fn test_rows_left_full_are_removed_without_scoring() {
    let mut game = GameSession::new(8);
    for x in 0..BOARD_WIDTH as i8 {
        game.board_mut().set(x, 19, Some(FILL));
    }
    assert!(game.place_active(Piece::new(PieceKind::O, DEFAULT_PALETTE[3]), 4, 0));

    game.apply_action(GameAction::HardDrop);

    assert!(line_clears(&mut game).is_empty());
    assert_eq!(game.lines(), 0);
    assert_eq!(game.combo(), 0);
    // 17 rows of hard drop only; the O sits on the floor after the full row went.
    assert_eq!(game.score(), 34);
    assert_eq!(game.board().occupied_count(), 4);
    assert_eq!(occupied_row(&game, 19), "....xx....");
}

#[test]
fn test_only_rows_the_piece_completes_are_scored() {
    let mut game = GameSession::new(8);
    for y in 15..20 {
        for x in 1..BOARD_WIDTH as i8 {
            game.board_mut().set(x, y, Some(FILL));
        }
    }
    for y in 16..20 {
        game.board_mut().set(0, y, Some(FILL));
    }
    let vertical_i = Piece::new(PieceKind::I, DEFAULT_PALETTE[0]).rotated_cw();
    assert!(game.place_active(vertical_i, 0, 0));

    game.apply_action(GameAction::HardDrop);

    let clears = line_clears(&mut game);
    assert_eq!(clears.len(), 1);
    assert_eq!(clears[0].lines_cleared, 1);
    assert_eq!(clears[0].points, 150);
    assert_eq!(game.lines(), 1);
    assert_eq!(game.combo(), 1);
    // Five rows went; the rest of the I slid to the floor.
    assert_eq!(game.board().occupied_count(), 3);
    for y in 17..20 {
        assert_eq!(occupied_row(&game, y), "x.........");
    }
}

#[test]
fn test_same_seed_same_game() {
    let script = [
        GameAction::MoveLeft,
        GameAction::Rotate,
        GameAction::HardDrop,
        GameAction::MoveRight,
        GameAction::MoveRight,
        GameAction::HardDrop,
        GameAction::Hold,
        GameAction::SoftDrop,
        GameAction::HardDrop,
    ];
    let play = || {
        let mut game = GameSession::new(2024);
        for action in script {
            game.apply_action(action);
            run_ms(&mut game, 160);
        }
        game.snapshot()
    };
    assert_eq!(play(), play());
}

#[test]
fn test_palette_and_style_are_cosmetic() {
    let mut plain = GameSession::new(9);
    let mut styled = GameSession::new(9);
    styled.set_style(tremor_tetris::types::PieceStyle::Glow);
    for slot in 0..7 {
        assert!(styled.set_palette_slot(slot, Rgb::new(1, 2, 3)));
    }
    assert!(!styled.set_palette_slot(7, Rgb::new(1, 2, 3)));

    for _ in 0..5 {
        plain.apply_action(GameAction::HardDrop);
        styled.apply_action(GameAction::HardDrop);
    }
    assert_eq!(plain.score(), styled.score());
    assert_eq!(
        plain.board().occupied_count(),
        styled.board().occupied_count()
    );
    assert_eq!(
        plain.active().map(|a| a.piece.kind()),
        styled.active().map(|a| a.piece.kind())
    );
}
