//! Agents and the tasks assigned to them.

use serde::{Deserialize, Serialize};

/// A role-playing persona for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// System prompt that puts the model into this agent's role.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}.\n\nYour goal: {}\n\nBackground: {}",
            self.role, self.goal, self.backstory
        )
    }
}

/// A unit of work performed by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub expected_output: String,
    pub agent: Agent,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Agent,
    ) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_mentions_role_goal_and_backstory() {
        let agent = Agent::new("Analyst", "compare sites", "ten years in marketing");
        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are Analyst."));
        assert!(prompt.contains("Your goal: compare sites"));
        assert!(prompt.contains("Background: ten years in marketing"));
    }
}
