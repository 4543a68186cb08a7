//! Sequential crew execution.
//!
//! Tasks run strictly in order. Each task sees the text produced by every
//! task before it, and the last task's output is the crew's result. The
//! first task additionally receives the analyzed URLs and the corpus
//! preview gathered by the fetcher.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::agent::{Agent, Task};
use crate::error::{CrewError, Result};
use crate::llm::{ChatRequest, LlmClient, Message};

/// What the crew is asked to analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewInput {
    pub urls: Vec<String>,
    /// Serialized corpus, already truncated by the caller.
    pub corpus_preview: String,
}

impl CrewInput {
    pub fn new(urls: Vec<String>, corpus_preview: impl Into<String>) -> Self {
        Self {
            urls,
            corpus_preview: corpus_preview.into(),
        }
    }
}

/// The text one task produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub role: String,
    pub output: String,
}

/// Outputs of every task plus the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
    pub final_output: String,
}

/// An ordered list of tasks.
#[derive(Debug, Clone, Default)]
pub struct Crew {
    tasks: Vec<Task>,
}

impl Crew {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The four-step competitor analysis: crawl, extract value propositions,
    /// compare, then write the go-to-market report.
    pub fn competitor_analysis() -> Self {
        let crawler = Agent::new(
            "Competitive Research Crawler",
            "Collect the key facts from each competitor page: offer, pricing, calls to action, \
             proof elements and tone of voice.",
            "A meticulous web researcher who reads landing pages the way a buyer does and \
             never invents facts that are not on the page.",
        );
        let extractor = Agent::new(
            "Value Proposition Extractor",
            "Turn the raw research into measurable signals for every competitor site.",
            "A conversion analyst who counts what matters: how much copy a page carries, how \
             many calls to action it offers and how much social proof backs it up.",
        );
        let analyst = Agent::new(
            "Competitor Analyst",
            "Compare the competitors and name their strengths, weaknesses and the \
             opportunities they leave open.",
            "A strategy consultant with years of competitive audits behind them, known for \
             blunt and specific assessments.",
        );
        let strategist = Agent::new(
            "Go-To-Market Strategist",
            "Write a clear, actionable competitor report with concrete recommendations.",
            "A growth lead who has launched products into crowded markets and writes reports \
             that executives actually read.",
        );

        let tasks = vec![
            Task::new(
                "Study the competitor pages listed below. For each URL summarize the offer, \
                 pricing model, calls to action, testimonials, case studies and certificates \
                 that the page shows.",
                "A per-URL research digest in plain text.",
                crawler,
            ),
            Task::new(
                "For every competitor, write the full URL on its own line, followed by its \
                 measurable signals. Phrase the counts exactly like \"N characters\", \
                 \"N CTAs\" and \"N reviews\", and say whether the page has case studies, \
                 reviews and certificates.",
                "One block per URL with text size, CTA count, trust signal count and the \
                 presence of cases, reviews and certificates.",
                extractor,
            ),
            Task::new(
                "Compare the competitors. For each domain list its strengths, weaknesses and \
                 the opportunities it leaves for us, one short sentence per point, mentioning \
                 the domain by name.",
                "A comparison with Strengths, Weaknesses and Opportunities for every domain.",
                analyst,
            ),
            Task::new(
                "Write the final competitor report with the headings Summary, Competitor \
                 Analysis, Recommendations, Action Plan and Conclusion. Keep the URL lines and \
                 signal counts from the earlier steps so they can be charted.",
                "A complete report in Markdown with the five headings.",
                strategist,
            ),
        ];
        Self::new(tasks)
    }

    /// Runs every task in order against `client`.
    ///
    /// # Errors
    ///
    /// Returns [`CrewError::Config`] for a crew without tasks and
    /// [`CrewError::Task`] wrapping the client error of the first failing task.
    pub fn kickoff(&self, client: &dyn LlmClient, input: &CrewInput) -> Result<CrewOutput> {
        if self.tasks.is_empty() {
            return Err(CrewError::Config("crew has no tasks".to_string()));
        }

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        for (index, task) in self.tasks.iter().enumerate() {
            let start = Instant::now();
            let request = ChatRequest::new()
                .message(Message::system(task.agent.system_prompt()))
                .message(Message::user(task_prompt(task, index, input, &outputs)));

            let output = client.complete(&request).map_err(|e| {
                error!(task = index, role = %task.agent.role, error = %e, "Crew task failed");
                CrewError::Task {
                    index,
                    role: task.agent.role.clone(),
                    source: Box::new(e),
                }
            })?;

            info!(
                task = index,
                role = %task.agent.role,
                chars = output.chars().count(),
                duration_ms = start.elapsed().as_millis(),
                "Crew task completed"
            );
            outputs.push(TaskOutput {
                role: task.agent.role.clone(),
                output,
            });
        }

        let final_output = outputs
            .last()
            .map(|t| t.output.clone())
            .unwrap_or_default();
        Ok(CrewOutput {
            tasks: outputs,
            final_output,
        })
    }
}

fn task_prompt(task: &Task, index: usize, input: &CrewInput, previous: &[TaskOutput]) -> String {
    let mut prompt = task.description.clone();

    if index == 0 {
        prompt.push_str("\n\nCompetitor URLs:\n");
        for url in &input.urls {
            prompt.push_str("- ");
            prompt.push_str(url);
            prompt.push('\n');
        }
        if !input.corpus_preview.is_empty() {
            prompt.push_str("\n---\nCorpus prepared in advance:\n");
            prompt.push_str(&input.corpus_preview);
            prompt.push('\n');
        }
    }

    if !previous.is_empty() {
        prompt.push_str("\n\nResults of the previous steps:\n");
        for step in previous {
            prompt.push_str(&format!("\n### {}\n{}\n", step.role, step.output));
        }
    }

    prompt.push_str("\n\nExpected output: ");
    prompt.push_str(&task.expected_output);
    prompt
}
