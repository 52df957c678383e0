pub mod closure;
pub mod dependency_generator;
mod dependency_generator_state;
pub mod match_state;
pub mod settings;

pub use closure::{closure, is_candidate_key, is_superkey};
pub use dependency_generator::{generate_dependencies, GeneratorResult};
pub use dependency_generator_state::GeneratorStats;
pub use match_state::MatchState;
pub use settings::Settings;

#[cfg(test)]
pub mod tests {
    use std::sync::Once;
    use test_context::TestContext;

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                let _ = env_logger::builder().is_test(true).try_init();
            });
            UsingLogger {
                _value: "logger".to_string(),
            }
        }

        fn teardown(self) {}
    }
}
