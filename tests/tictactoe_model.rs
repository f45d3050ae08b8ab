//! Tic-Tac-Toe as an MDP: model invariants and solver behaviour

use ttt_mdp::{
    Environment, MarkovModel, PolicyIteration, QLearning, Solver, ValueIteration,
    config::{PolicyIterationConfig, QLearningConfig, ValueIterationConfig},
    mdp::validate_transitions,
    tictactoe::{
        BoardState, OpponentKind, Player, RewardConfig, TicTacToeEnvironment, TicTacToeMdp,
    },
};

fn mdp(first: Player, opponent: OpponentKind) -> TicTacToeMdp {
    TicTacToeMdp::new(first, opponent.into_model(), RewardConfig::default())
}

mod model_invariants {
    use super::*;

    #[test]
    fn distributions_sum_to_one_for_every_setup() {
        for first in [Player::X, Player::O] {
            for opponent in [OpponentKind::Random, OpponentKind::Defensive] {
                validate_transitions(&mdp(first, opponent)).unwrap();
            }
        }
    }

    #[test]
    fn transitions_stay_inside_enumeration() {
        let model = mdp(Player::O, OpponentKind::Defensive);
        let states: std::collections::HashSet<_> = model.enumerate_states().into_iter().collect();
        for state in &states {
            for action in model.legal_actions(state) {
                for t in model.transitions(state, &action) {
                    assert!(states.contains(&t.next_state), "{} escapes", t.next_state.encode());
                }
            }
        }
    }

    #[test]
    fn terminal_boards_have_no_actions() {
        let model = mdp(Player::X, OpponentKind::Random);
        for state in model.enumerate_states() {
            if model.is_terminal(&state) {
                assert!(model.legal_actions(&state).is_empty());
            } else {
                assert_eq!(state.to_move, Player::X);
                assert!(!model.legal_actions(&state).is_empty());
            }
        }
    }
}

mod planning {
    use super::*;

    #[test]
    fn value_and_policy_iteration_agree_on_values() {
        let model = mdp(Player::X, OpponentKind::Random);
        let vi = ValueIteration::solve(model.clone(), ValueIterationConfig::default()).unwrap();
        let pi = PolicyIteration::solve(
            model.clone(),
            PolicyIterationConfig::default().with_delta(1e-9).with_seed(2),
        )
        .unwrap();

        for state in model.enumerate_states() {
            let diff = (vi.value_of(&state) - pi.value_of(&state)).abs();
            assert!(
                diff < 1e-6,
                "{}: VI {} vs PI {}",
                state.encode(),
                vi.value_of(&state),
                pi.value_of(&state)
            );
        }
    }

    #[test]
    fn policies_cover_exactly_the_decision_boards() {
        let model = mdp(Player::X, OpponentKind::Defensive);
        let vi = ValueIteration::solve(model.clone(), ValueIterationConfig::default()).unwrap();
        let policy = vi.policy().unwrap();

        assert_eq!(policy.len(), 2423);
        for (board, &pos) in policy.iter() {
            assert!(!board.is_terminal());
            assert!(board.is_empty(pos), "illegal move {pos} on {}", board.encode());
        }
    }

    #[test]
    fn optimal_play_never_loses_against_random() {
        // Follow the value-iteration policy against every opponent reply:
        // no reachable board may be an O win.
        let model = mdp(Player::X, OpponentKind::Random);
        let vi = ValueIteration::solve(model.clone(), ValueIterationConfig::default()).unwrap();
        let policy = vi.policy().unwrap();

        let mut frontier = vec![BoardState::new()];
        while let Some(board) = frontier.pop() {
            let pos = *policy.get(&board).unwrap();
            for t in model.transitions(&board, &pos) {
                assert_ne!(
                    t.next_state.winner(),
                    Some(Player::O),
                    "lost at {}",
                    t.next_state.encode()
                );
                if !t.next_state.is_terminal() {
                    frontier.push(t.next_state);
                }
            }
        }
        assert!(vi.value_of(&BoardState::new()) > 0.0);
    }

    #[test]
    fn blocks_an_immediate_threat() {
        // O threatens the middle row; X cannot win this turn.
        //  X . .
        //  O O .
        //  X . .
        let model = mdp(Player::X, OpponentKind::Defensive);
        let vi = ValueIteration::solve(model, ValueIterationConfig::default()).unwrap();
        let board = BoardState::from_string("X..OO.X..").unwrap();
        assert_eq!(board.to_move, Player::X);
        assert_eq!(vi.policy().unwrap().get(&board), Some(&5));
    }
}

mod learning {
    use super::*;

    #[test]
    fn q_learning_policy_is_legal_everywhere() {
        let model = mdp(Player::O, OpponentKind::Random);
        let env = TicTacToeEnvironment::new(model.clone(), Some(21)).unwrap();
        let config = QLearningConfig::default().with_episodes(2000).with_seed(21);
        let mut ql = QLearning::new(model, env, config).unwrap();
        let policy = ql.train().unwrap();

        assert_eq!(policy.len(), 2097);
        for (board, &pos) in policy.iter() {
            assert!(board.is_empty(pos));
        }
        assert_eq!(ql.metadata().iterations, 2000);
    }

    #[test]
    fn environment_matches_model_support() {
        let model = mdp(Player::X, OpponentKind::Defensive);
        let mut env = TicTacToeEnvironment::new(model.clone(), Some(8)).unwrap();
        for _ in 0..50 {
            env.reset();
            while !env.is_terminal() {
                let board = env.current_state();
                let pos = board.legal_moves()[board.legal_moves().len() / 2];
                let outcome = env.step(&pos).unwrap();
                let support = model.transitions(&board, &pos);
                let matching = support
                    .iter()
                    .find(|t| t.next_state == outcome.next_state)
                    .expect("sampled board must be in the model's support");
                assert_eq!(matching.reward, outcome.reward);
            }
        }
    }
}
