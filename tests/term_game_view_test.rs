//! Terminal view over real session snapshots.

use tremor_tetris::core::{GameSession, GameSnapshot};
use tremor_tetris::term::{AnchorY, FrameBuffer, GameView, Viewport};
use tremor_tetris::types::{GameAction, PieceStyle};

fn contains(fb: &FrameBuffer, needle: &str) -> bool {
    (0..fb.height()).any(|y| fb.row_text(y).contains(needle))
}

#[test]
fn test_renders_board_frame_and_panel() {
    let game = GameSession::new(1);
    let view = GameView::default();
    let fb = view.render(&game.snapshot(), Viewport::new(80, 24));

    let frame = view.layout(Viewport::new(80, 24));
    assert_eq!(fb.get(frame.x, frame.y).unwrap().ch, '┌');
    assert_eq!(
        fb.get(frame.x + frame.w - 1, frame.y + frame.h - 1).unwrap().ch,
        '┘'
    );
    for label in ["SCORE", "LEVEL", "COMBO", "STACK", "HOLD", "NEXT"] {
        assert!(contains(&fb, label), "missing {label}");
    }
    assert!(!contains(&fb, "GAME OVER"));
}

#[test]
fn test_settled_cells_show_after_hard_drop() {
    let mut game = GameSession::new(2);
    game.apply_action(GameAction::HardDrop);

    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let viewport = Viewport::new(80, 24);
    let fb = view.render(&game.snapshot(), viewport);
    let frame = view.layout(viewport);

    let bottom = frame.y + frame.h - 2;
    let blocks = (0..frame.w)
        .filter(|&dx| fb.get(frame.x + dx, bottom).unwrap().ch == '█')
        .count();
    assert!(blocks >= 2, "bottom row should show the dropped piece");
}

#[test]
fn test_style_reaches_the_renderer() {
    let mut game = GameSession::new(2);
    game.set_style(PieceStyle::Glow);
    game.apply_action(GameAction::HardDrop);

    let view = GameView::default();
    let viewport = Viewport::new(80, 24);
    let fb = view.render(&game.snapshot(), viewport);
    assert!(contains(&fb, "▐▌"));
    assert!(!contains(&fb, "█"));
}

#[test]
fn test_game_over_overlay_shows_score_and_hint() {
    let mut snap = GameSnapshot::default();
    snap.game_over = true;
    snap.score = 4321;

    let fb = GameView::default().render(&snap, Viewport::new(80, 24));
    assert!(contains(&fb, "GAME OVER"));
    assert!(contains(&fb, "SCORE 4321"));
    assert!(contains(&fb, "R: restart"));
}

#[test]
fn test_tiny_terminal_does_not_panic() {
    let game = GameSession::new(3);
    let view = GameView::default();
    for (w, h) in [(0, 0), (1, 1), (10, 5), (30, 10)] {
        let fb = view.render(&game.snapshot(), Viewport::new(w, h));
        assert_eq!((fb.width(), fb.height()), (w, h));
    }
}
