pub mod frame;
pub mod game_trait;
pub mod input;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{GameEvent, TickedGame};
    use crate::input::InputSnapshot;

    /// Run N game ticks with the same input, returning all accumulated events.
    pub fn run_game_ticks(
        game: &mut dyn TickedGame,
        n: usize,
        input: &InputSnapshot,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(input));
        }
        all_events
    }

    /// Run one tick per entry in `inputs`, returning all accumulated events.
    pub fn run_input_sequence(
        game: &mut dyn TickedGame,
        inputs: &[InputSnapshot],
    ) -> Vec<GameEvent> {
        inputs.iter().flat_map(|input| game.update(input)).collect()
    }

    /// Assert that the game's serialized state differs from `before`.
    pub fn assert_game_state_changed(game: &dyn TickedGame, before: &[u8]) {
        let after = game.serialize_state();
        assert_ne!(
            before,
            &after[..],
            "Game state should have changed after operation"
        );
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every TickedGame implementation is expected to pass these. Game crates
    // call them from their own tests with a game that is already in play.

    /// serialize_state() -> apply_state() on a second instance must reproduce the bytes.
    pub fn contract_state_roundtrip_preserves(
        game: &dyn TickedGame,
        fresh: &mut dyn TickedGame,
    ) {
        let state = game.serialize_state();
        assert!(!state.is_empty(), "serialize_state() must return bytes");
        fresh.apply_state(&state);
        assert_eq!(
            state,
            fresh.serialize_state(),
            "apply_state(serialize_state()) must reproduce the state"
        );
    }

    /// apply_state() with garbage must leave the state untouched.
    pub fn contract_apply_garbage_is_ignored(game: &mut dyn TickedGame) {
        let before = game.serialize_state();
        game.apply_state(&[0xc1, 0xff, 0x00, 0x13]);
        assert_eq!(
            before,
            game.serialize_state(),
            "undecodable snapshot must be ignored"
        );
    }

    /// While paused, update() must not change state; after resume() it must.
    pub fn contract_pause_stops_updates(game: &mut dyn TickedGame, input: &InputSnapshot) {
        game.pause();
        let before = game.serialize_state();
        for _ in 0..10 {
            let events = game.update(input);
            assert!(events.is_empty(), "paused game must not emit events");
        }
        assert_eq!(
            before,
            game.serialize_state(),
            "paused game must not advance"
        );

        game.resume();
        game.update(input);
        assert_game_state_changed(game, &before);
    }

    /// Two games with equal state fed the same inputs must stay byte-identical.
    pub fn contract_deterministic_replay(
        a: &mut dyn TickedGame,
        b: &mut dyn TickedGame,
        inputs: &[InputSnapshot],
    ) {
        assert_eq!(
            a.serialize_state(),
            b.serialize_state(),
            "replay must start from equal states"
        );
        for (i, input) in inputs.iter().enumerate() {
            let ea = a.update(input);
            let eb = b.update(input);
            assert_eq!(ea, eb, "events diverged at tick {i}");
            assert_eq!(
                a.serialize_state(),
                b.serialize_state(),
                "state diverged at tick {i}"
            );
        }
    }
}
