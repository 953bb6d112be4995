//! Pieces: rotation, wall kicks and collision.

use std::cell::RefCell;

use tremor_tetris::core::{collides, landing_y, try_rotate, Board, Piece};
use tremor_tetris::types::{PieceKind, Rgb, DEFAULT_PALETTE};

const GRAY: Rgb = Rgb::new(128, 128, 128);

fn piece(kind: PieceKind) -> Piece {
    Piece::new(kind, DEFAULT_PALETTE[0])
}

#[test]
fn test_four_rotations_return_to_spawn_shape() {
    for kind in PieceKind::ALL {
        let p = piece(kind);
        let half = p.rotated_cw().rotated_cw();
        let full = half.rotated_cw().rotated_cw();
        assert_eq!(full.shape(), p.shape(), "{kind:?}");
        // 180 twice is the identity too.
        assert_eq!(half.rotated_cw().rotated_cw(), p, "{kind:?}");
    }
}

#[test]
fn test_rotation_swaps_dimensions() {
    let i = piece(PieceKind::I);
    assert_eq!((i.shape().rows(), i.shape().cols()), (1, 4));
    let vertical = i.rotated_cw();
    assert_eq!((vertical.shape().rows(), vertical.shape().cols()), (4, 1));
}

#[test]
fn test_spawn_columns() {
    assert_eq!(piece(PieceKind::I).shape().spawn_x(), 3);
    assert_eq!(piece(PieceKind::O).shape().spawn_x(), 4);
    assert_eq!(piece(PieceKind::T).shape().spawn_x(), 4);
}

#[test]
fn test_i_kicks_try_left_before_right() {
    let board = Board::new();
    // Vertical I against the right wall: rotating to horizontal needs a kick of -2.
    let vertical = piece(PieceKind::I).rotated_cw();
    let rotated = try_rotate(&vertical, 8, 5, |s, x, y| collides(&board, s, x, y)).unwrap();
    assert_eq!(rotated.kick, -2);
    assert_eq!(rotated.x, 6);
}

#[test]
fn test_other_pieces_kick_right_by_two_at_most() {
    let board = Board::new();
    // Vertical J in column 0, pointing such that the rotated shape fits with no kick.
    let j = piece(PieceKind::J).rotated_cw();
    let rotated = try_rotate(&j, 0, 5, |s, x, y| collides(&board, s, x, y)).unwrap();
    assert_eq!(rotated.kick, 0);

    // Every offset blocked: rotation fails and the caller keeps the piece.
    let blocked = Board::from_ascii(&["xxxxxxxxx."; 20], GRAY);
    let t = piece(PieceKind::T);
    assert!(try_rotate(&t, 4, 0, |s, x, y| collides(&blocked, s, x, y)).is_none());
}

/// Kick offsets `try_rotate` tries, in order, when every position is blocked.
fn kicks_tried(piece: &Piece, x: i8) -> Vec<i8> {
    let tried = RefCell::new(Vec::new());
    let rotated = try_rotate(piece, x, 5, |_, nx, _| {
        tried.borrow_mut().push(nx - x);
        true
    });
    assert!(rotated.is_none());
    tried.into_inner()
}

/// Kick chosen when only the first `blocked` offsets of `order` collide.
fn kick_with_first_blocked(piece: &Piece, order: &[i8], blocked: usize) -> i8 {
    let x = 4;
    let rotated = try_rotate(piece, x, 5, |_, nx, _| order[..blocked].contains(&(nx - x)));
    let rotated = rotated.unwrap();
    assert_eq!(rotated.x, x + rotated.kick);
    rotated.kick
}

#[test]
fn test_kick_order_for_pieces_that_become_one_row() {
    let vertical = piece(PieceKind::I).rotated_cw();
    let order = [0, -1, 1, -2, 2];
    assert_eq!(kicks_tried(&vertical, 4), order);
    for (i, &kick) in order.iter().enumerate() {
        assert_eq!(kick_with_first_blocked(&vertical, &order, i), kick);
    }
}

#[test]
fn test_kick_order_for_other_pieces() {
    let order = [0, -1, 1, 2];
    for kind in PieceKind::ALL {
        let mut p = piece(kind);
        for _ in 0..4 {
            if p.rotated_cw().shape().rows() != 1 {
                assert_eq!(kicks_tried(&p, 4), order, "{kind:?}");
                for (i, &kick) in order.iter().enumerate() {
                    assert_eq!(kick_with_first_blocked(&p, &order, i), kick, "{kind:?}");
                }
            }
            p = p.rotated_cw();
        }
    }
}

#[test]
fn test_i_kicks_on_a_board() {
    let board = Board::new();
    let vertical = piece(PieceKind::I).rotated_cw();
    let fits = |b: &Board, p: &Piece, x: i8| {
        try_rotate(p, x, 5, |s, nx, ny| collides(b, s, nx, ny)).unwrap()
    };

    // One column short of the right wall.
    assert_eq!(fits(&board, &vertical, 7).kick, -1);
    assert_eq!(fits(&board, &vertical, 6).kick, 0);

    // Left wall plus a block right of the piece: +1 still hits it, +2 clears it.
    let mut blocked = Board::new();
    blocked.set(1, 5, Some(GRAY));
    let rotated = fits(&blocked, &vertical, 0);
    assert_eq!((rotated.kick, rotated.x), (2, 2));
}

#[test]
fn test_t_kicks_on_a_board() {
    let board = Board::new();
    let t = piece(PieceKind::T);

    // Pointing left (two columns wide) against the right wall.
    let left = t.rotated_cw();
    let rotated = try_rotate(&left, 8, 5, |s, x, y| collides(&board, s, x, y)).unwrap();
    assert_eq!((rotated.kick, rotated.x), (-1, 7));

    // Pointing right against the left wall with a block on its top row.
    let right = t.rotated_cw().rotated_cw().rotated_cw();
    let mut blocked = Board::new();
    blocked.set(1, 5, Some(GRAY));
    assert!(!collides(&blocked, right.shape(), 0, 5));
    let rotated = try_rotate(&right, 0, 5, |s, x, y| collides(&blocked, s, x, y)).unwrap();
    assert_eq!((rotated.kick, rotated.x), (2, 2));
    assert_eq!(rotated.piece, t);
}

#[test]
fn test_collision_bounds() {
    let board = Board::new();
    let o = piece(PieceKind::O);
    assert!(!collides(&board, o.shape(), 0, 0));
    assert!(collides(&board, o.shape(), -1, 0));
    assert!(collides(&board, o.shape(), 9, 0));
    assert!(collides(&board, o.shape(), 0, 19));
}

#[test]
fn test_piece_at_its_landing_spot_does_not_collide_until_merged() {
    let mut board = Board::from_ascii(&["...x......", "..xxx....."], GRAY);
    let l = piece(PieceKind::L);
    let y = landing_y(&board, l.shape(), 2, 0);
    assert!(!collides(&board, l.shape(), 2, y));
    assert!(collides(&board, l.shape(), 2, y + 1));

    board.merge(&l, 2, y);
    assert!(collides(&board, l.shape(), 2, y));
}
