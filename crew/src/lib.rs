//! Sequential LLM crew for competitor analysis.
//!
//! A [`Crew`] is an ordered list of [`Task`]s, each performed by an [`Agent`]
//! persona. [`Crew::kickoff`] sends one chat request per task through an
//! [`LlmClient`] and threads every previous answer into the next prompt.
//!
//! ```
//! use competitor_report_crew::{ChatRequest, Crew, CrewInput, LlmClient, Result};
//!
//! struct Echo;
//!
//! impl LlmClient for Echo {
//!     fn complete(&self, request: &ChatRequest) -> Result<String> {
//!         Ok(format!("{} messages", request.messages.len()))
//!     }
//! }
//!
//! let input = CrewInput::new(vec!["https://alpha.example/".to_string()], "");
//! let output = Crew::competitor_analysis().kickoff(&Echo, &input).unwrap();
//! assert_eq!(output.tasks.len(), 4);
//! assert_eq!(output.final_output, "2 messages");
//! ```

mod agent;
mod crew;
mod error;
mod llm;

pub use agent::{Agent, Task};
pub use crew::{Crew, CrewInput, CrewOutput, TaskOutput};
pub use error::{CrewError, Result};
pub use llm::{ChatRequest, LlmClient, LlmConfig, Message, OpenAiClient};
