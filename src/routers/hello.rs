use std::sync::Arc;

use chrono::SecondsFormat;
use lambda_runtime::tracing::debug;
use serde_json::Value;

use crate::models::{GreetInput, GreetOutput, RandomGreetingOutput, RpcError};
use crate::ports::{Clock, RandomSource, SystemClock, ThreadRandom};

use super::{decode_input, encode_output};

/// Name used when `greet` receives no name, or an empty one
pub const DEFAULT_NAME: &str = "World";

/// Greetings `randomGreeting` picks from, in order
pub const GREETINGS: [&str; 5] = ["Hello", "Hi", "Hey", "Greetings", "Salutations"];

/// Procedures of the `hello` namespace.
#[derive(Clone)]
pub struct GreetingService {
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl Default for GreetingService {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(ThreadRandom))
    }
}

impl GreetingService {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, random: Arc<dyn RandomSource>) -> Self {
        Self { clock, random }
    }

    /// Greets `input.name`, or the World when it is missing or empty.
    ///
    /// The timestamp is read after the message is built, formatted like
    /// `2024-01-01T12:00:00.000Z`.
    ///
    /// # Examples
    ///
    /// `{"name": "Ann"}`: "Hello, Ann!"
    /// `{}` or `{"name": ""}`: "Hello, World!"
    #[must_use]
    pub fn greet(&self, input: GreetInput) -> GreetOutput {
        let name = input
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let message = format!("Hello, {name}!");

        GreetOutput {
            message,
            timestamp: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Picks one of [`GREETINGS`] and builds the welcome message from it.
    #[must_use]
    pub fn random_greeting(&self) -> RandomGreetingOutput {
        let index = self.random.pick_index(GREETINGS.len()) % GREETINGS.len();
        let greeting = GREETINGS[index];

        RandomGreetingOutput {
            greeting: greeting.to_string(),
            message: format!("{greeting}, welcome to our API!"),
        }
    }

    /// Dispatches a procedure of this namespace.
    ///
    /// # Errors
    ///
    /// - `UnknownProcedure` if `procedure` is not `greet` or `randomGreeting`
    /// - `ValidationError` if the `greet` input is not `{ name?: string }`
    pub fn call(&self, procedure: &str, input: Value) -> Result<Value, RpcError> {
        debug!(procedure = %procedure, "Dispatching hello procedure");
        match procedure {
            "greet" => encode_output(&self.greet(decode_input(input)?)),
            "randomGreeting" => encode_output(&self.random_greeting()),
            _ => Err(RpcError::UnknownProcedure(format!("hello.{procedure}"))),
        }
    }
}
