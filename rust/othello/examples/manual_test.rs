//! Manual walk through a short game, printing the board and its line statistics
use othello_board::{parse_square, square_name, Game, Player, TurnCommand, TurnOutcome};

fn main() {
    println!("=== Othello Board Manual Test ===\n");

    let mut game = Game::new();

    println!("Test 1: Initial Board State");
    print!("{}", game.board());
    let (black, white) = game.piece_counts();
    println!("Black: {black}, White: {white}");
    assert_eq!((black, white), (2, 2));
    assert_eq!(game.current_player(), Player::Black);
    println!("✓ Initial state correct\n");

    println!("Test 2: Valid Moves Detection");
    let moves = game.board().placeable_cells(Player::Black);
    let names: Vec<String> = moves.iter().map(|&cell| square_name(cell)).collect();
    println!("Valid moves: {}", names.join(" "));
    assert_eq!(names, ["D3", "C4", "F5", "E6"]);
    println!("✓ Valid moves detection correct\n");

    println!("Test 3: Opening D3 C3 C4");
    for name in ["D3", "C3", "C4"] {
        let cell = parse_square(name).expect("square names are valid");
        let outcome = game
            .apply_command(TurnCommand::Move(cell))
            .expect("opening moves are legal");
        if let TurnOutcome::Played { flipped, .. } = outcome {
            println!("{name}: flipped {flipped}");
        }
    }
    print!("{}", game.board());
    let board = game.board();
    println!(
        "Material {:+}, mobility {:+}, settled {:+} (White's view)",
        board.material_diff(Player::White),
        board.mobility_score(Player::White),
        board.settled_score(Player::White)
    );
    println!("Features: {:?}", &board.features()[..12]);
    println!("✓ Moves applied\n");

    println!("Test 4: Invalid Move at A1");
    assert!(game.apply_command(TurnCommand::Move(0)).is_err());
    println!("✓ Invalid move rejected correctly\n");

    println!("Test 5: Undo");
    let outcome = game
        .apply_command(TurnCommand::Undo)
        .expect("White has moved before");
    println!("{outcome:?}");
    assert_eq!(game.current_player(), Player::White);
    assert_eq!(game.ply(), 1);
    println!("✓ Undo correct\n");

    println!("Test 6: Reset Board");
    game.reset();
    assert_eq!(game.piece_counts(), (2, 2));
    assert_eq!(game.current_player(), Player::Black);
    println!("✓ Reset correct\n");

    println!("=== All manual tests passed! ===");
}
