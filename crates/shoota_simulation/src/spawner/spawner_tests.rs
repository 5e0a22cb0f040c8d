//! Tests for spawn tick rules.

#[cfg(test)]
mod tests {
    use super::super::systems::{on_spawn_tick, provide_visual};
    use super::super::timer::SpawnTimer;
    use crate::config::GalleryConfig;
    use crate::error::GalleryError;
    use crate::hud::{Hud, HudRole};
    use crate::session::{ArSession, HeadlessSession, VisualSpec};
    use crate::state::GameState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    struct Fixture {
        state: GameState,
        timer: SpawnTimer,
        session: HeadlessSession,
        hud: Hud,
        rng: ChaCha8Rng,
        config: GalleryConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GalleryConfig::default();
            let session = HeadlessSession::default();
            Self {
                state: GameState::new(config.target_cap, Duration::ZERO),
                timer: SpawnTimer::new(config.spawn_period_secs),
                hud: Hud::new(&config, session.viewport()),
                session,
                rng: ChaCha8Rng::seed_from_u64(42),
                config,
            }
        }

        fn tick(&mut self) -> Result<Option<super::super::systems::SpawnedTarget>, GalleryError> {
            on_spawn_tick(
                &mut self.state,
                &mut self.timer,
                &mut self.session,
                &mut self.hud,
                &mut self.rng,
                &self.config,
            )
        }
    }

    #[test]
    fn test_tick_creates_anchor_and_counts() {
        let mut fixture = Fixture::new();

        let spawned = fixture.tick().unwrap().unwrap();

        assert_eq!(spawned.ordinal, 1);
        assert_eq!(fixture.state.targets_created(), 1);
        assert_eq!(fixture.state.targets_live(), 1);
        assert_eq!(fixture.session.anchor_count(), 1);
        assert_eq!(
            fixture.session.anchor_transform(spawned.anchor),
            Some(spawned.transform)
        );
        assert_eq!(fixture.hud.text(HudRole::Remaining), Some("Remaining: 1"));
    }

    #[test]
    fn test_created_never_exceeds_cap() {
        let mut fixture = Fixture::new();

        for _ in 0..20 {
            fixture.tick().unwrap();
            assert!(fixture.state.targets_created() <= 20);
        }
        assert!(fixture.timer.is_active());
    }

    #[test]
    fn test_twenty_five_ticks_stop_at_cap() {
        let mut fixture = Fixture::new();

        for _ in 0..25 {
            fixture.tick().unwrap();
        }

        assert_eq!(fixture.state.targets_created(), 20);
        assert_eq!(fixture.state.targets_live(), 20);
        assert_eq!(fixture.session.anchor_count(), 20);
        // 21-й тик отменил таймер, дальше no-op
        assert!(!fixture.timer.is_active());
        assert!(fixture.tick().unwrap().is_none());
    }

    #[test]
    fn test_rendering_unavailable_leaves_counts_untouched() {
        let mut fixture = Fixture::new();
        fixture.tick().unwrap();
        fixture.session.pause();

        let result = fixture.tick();

        assert!(matches!(result, Err(GalleryError::RenderingUnavailable)));
        assert_eq!(fixture.state.targets_created(), 1);
        assert_eq!(fixture.state.targets_live(), 1);
        assert_eq!(fixture.hud.text(HudRole::Remaining), Some("Remaining: 1"));
        assert!(fixture.timer.is_active());

        fixture.session.resume();
        assert_eq!(fixture.tick().unwrap().unwrap().ordinal, 2);
    }

    #[test]
    fn test_tick_after_game_over_cancels_timer() {
        let mut fixture = Fixture::new();
        fixture.state = GameState::new(1, Duration::ZERO);
        fixture.tick().unwrap();
        fixture.state.record_hit(|_| {}).unwrap();
        fixture.state.try_finish(Duration::from_secs(3)).unwrap();

        let result = fixture.tick();

        assert!(matches!(result, Err(GalleryError::SpuriousLateEvent)));
        assert!(!fixture.timer.is_active());
        assert_eq!(fixture.session.anchor_count(), 1);
    }

    #[test]
    fn test_same_seed_same_anchor_transforms() {
        let mut first = Fixture::new();
        let mut second = Fixture::new();

        for _ in 0..20 {
            let a = first.tick().unwrap().unwrap();
            let b = second.tick().unwrap().unwrap();
            assert_eq!(a.transform, b.transform);
            assert_eq!(a.angles, b.angles);
        }
    }

    #[test]
    fn test_provide_visual_uses_configured_sprite() {
        let mut config = GalleryConfig::default();
        assert_eq!(
            provide_visual(&config),
            VisualSpec::Sprite { image: "target".to_string() }
        );

        config.target_sprite = "duck".to_string();
        assert_eq!(
            provide_visual(&config),
            VisualSpec::Sprite { image: "duck".to_string() }
        );
    }
}
