//! Property tests for the rule engines.

use duelhub_games::{
    BlockExchange, BlockExchangeConfig, BlockExchangeState, BlockMove, TileDuel, TileDuelConfig,
    TileDuelError, TileDuelState, round_winner,
};
use duelhub_hub::DuelGame;
use duelhub_protocol::{BlockEvent, Side, Team, TileColor};
use proptest::prelude::*;

fn hand() -> impl Strategy<Value = Vec<i32>> {
    Just((1..=9).collect::<Vec<i32>>()).prop_shuffle()
}

proptest! {
    #[test]
    fn prop_round_winner_is_antisymmetric(a in 1i32..=9, b in 1i32..=9) {
        let forward = round_winner(a, b);
        let backward = round_winner(b, a);
        if a == b {
            prop_assert_eq!(forward, None);
            prop_assert_eq!(backward, None);
        } else {
            prop_assert!(forward.is_some());
            prop_assert_eq!(forward.map(|c| c.opponent()), backward);
        }
    }

    #[test]
    fn prop_tile_duel_ends_within_nine_rounds(blue in hand(), red in hand()) {
        let mut state = TileDuelState::new(TileDuelConfig::default());
        let mut hands = [blue.into_iter(), red.into_iter()];
        let mut resolved = 0;

        while !TileDuel::is_finished(&state) {
            prop_assert!(resolved < 9, "match outlived nine rounds");
            let leader = state.current_turn();
            for color in [leader, leader.opponent()] {
                let tile = hands[color.index()].next().expect("nine tiles per side");
                TileDuel::apply(&mut state, color, tile).expect("fresh tile in turn order");
            }
            resolved += 1;
        }

        let (blue_wins, red_wins) = (state.wins(TileColor::Blue), state.wins(TileColor::Red));
        prop_assert!(blue_wins == 5 || red_wins == 5 || resolved == 9);
        prop_assert!(blue_wins + red_wins <= resolved);
    }

    #[test]
    fn prop_tile_values_never_repeat(first in 1i32..=9, other in 1i32..=9) {
        let mut state = TileDuelState::new(TileDuelConfig::default());
        TileDuel::apply(&mut state, TileColor::Blue, first).unwrap();
        TileDuel::apply(&mut state, TileColor::Red, other).unwrap();
        prop_assert_eq!(state.round(), 2);

        // Reuse is caught whoever leads the new round.
        let err = TileDuel::apply(&mut state, TileColor::Blue, first).unwrap_err();
        prop_assert_eq!(err, TileDuelError::ValueReused(first));
        prop_assert_eq!(state.used(TileColor::Blue), &[first][..]);
    }

    #[test]
    fn prop_block_round_costs_each_inventory_one_block(
        rounds in prop::collection::vec((0usize..20, 0usize..20, 0usize..20, 0usize..20), 1..12)
    ) {
        let mut state = BlockExchangeState::new(BlockExchangeConfig::default());

        for (a1, a2, b1, b2) in rounds {
            if BlockExchange::is_finished(&state) {
                break;
            }
            let before = [state.inventory(Team::Team1).len(), state.inventory(Team::Team2).len()];

            for (team, i, j) in [(Team::Team1, a1, a2), (Team::Team2, b1, b2)] {
                let inventory = state.inventory(team);
                let n = inventory.len();
                let (i, j) = (i % n, j % n);
                let j = if i == j { (j + 1) % n } else { j };
                let mv = BlockMove::Submit {
                    block1: inventory[i],
                    block2: inventory[j],
                    use_hidden: false,
                    selection: 0,
                };
                BlockExchange::apply(&mut state, team, mv).expect("blocks come from the inventory");
            }

            prop_assert_eq!(state.inventory(Team::Team1).len(), before[0] - 1);
            prop_assert_eq!(state.inventory(Team::Team2).len(), before[1] - 1);
        }
    }

    #[test]
    fn prop_hidden_round_never_resolves_without_selection(
        a in (1i32..=7, 1i32..=7),
        b in (1i32..=7, 1i32..=7),
        choice in 1i32..=2,
    ) {
        let mut state = BlockExchangeState::new(BlockExchangeConfig::default());
        let hidden = BlockMove::Submit { block1: a.0, block2: a.1, use_hidden: true, selection: 0 };
        let plain = BlockMove::Submit { block1: b.0, block2: b.1, use_hidden: false, selection: 0 };

        let before = (
            state.inventory(Team::Team1).to_vec(),
            state.inventory(Team::Team2).to_vec(),
        );

        BlockExchange::apply(&mut state, Team::Team1, hidden).unwrap();
        let out = BlockExchange::apply(&mut state, Team::Team2, plain).unwrap();
        prop_assert!(!out.iter().any(|(_, e)| matches!(e, BlockEvent::RoundResult { .. })), "unexpected RoundResult event");
        prop_assert_eq!(state.round(), 1);
        prop_assert_eq!((state.score(Team::Team1), state.score(Team::Team2)), (0, 0));
        prop_assert_eq!(state.inventory(Team::Team1), &before.0[..]);
        prop_assert_eq!(state.inventory(Team::Team2), &before.1[..]);
        prop_assert!(!state.hidden_used(Team::Team1));

        let out = BlockExchange::apply(&mut state, Team::Team2, BlockMove::Select(choice)).unwrap();
        let expected = if choice == 1 { a.0 } else { a.1 };
        let received = out.iter().find_map(|(_, e)| match e {
            BlockEvent::RoundResult { team2_received_block, .. } => Some(*team2_received_block),
            _ => None,
        });
        prop_assert_eq!(received, Some(expected));
        prop_assert!(state.hidden_used(Team::Team1));
    }
}
