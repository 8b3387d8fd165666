// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Evolved artifact documents.
//!
//! Each kind has its own template and location under the evolved directory:
//!
//! | Kind | Location |
//! |------|----------|
//! | skill | `skills/<name>/SKILL.md` |
//! | command | `commands/<name>.md` |
//! | agent | `agents/<name>.md` |
//!
//! Every template lists each member's action and trigger. Writing an
//! artifact whose name already exists overwrites it.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;

use super::atomic_file::write_atomic;
use super::frontmatter;
use crate::domain::{title_case, ArtifactKind, ArtifactRepository, EvolvedArtifact, Result};

const COMMAND_TOOLS: [&str; 5] = ["Bash", "Read", "Write", "Glob", "Grep"];

#[derive(Serialize)]
struct ArtifactHeader<'a> {
    name: &'a str,
    description: String,
    #[serde(rename = "argument-hint", skip_serializing_if = "Option::is_none")]
    argument_hint: Option<&'a str>,
    #[serde(rename = "allowed-tools", skip_serializing_if = "Option::is_none")]
    allowed_tools: Option<&'a [&'a str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    evolved_from: Vec<&'a str>,
    evolved_date: String,
    confidence: f64,
}

/// Render the full document for an artifact
pub fn render_artifact(artifact: &EvolvedArtifact) -> Result<String> {
    let members = artifact.cluster.members();
    let domain = members
        .first()
        .map(|m| m.domain.as_str().to_string())
        .unwrap_or_else(|| "general".to_string());
    let lead_trigger = members
        .first()
        .map(|m| m.trigger.as_str())
        .filter(|t| !t.is_empty());

    let actions = members
        .iter()
        .map(|m| format!("- {}", m.action))
        .collect::<Vec<_>>()
        .join("\n");
    let triggers: Vec<String> = members
        .iter()
        .filter(|m| !m.trigger.is_empty())
        .map(|m| format!("- {}", m.trigger))
        .collect();
    let trigger_list = |fallback: &str| {
        if triggers.is_empty() {
            fallback.to_string()
        } else {
            triggers.join("\n")
        }
    };

    let title = title_case(&artifact.name);
    let size = members.len();
    let observations = artifact.total_observations();

    let (description, argument_hint, allowed_tools, model, body) = match artifact.kind {
        ArtifactKind::Command => (
            lead_trigger
                .unwrap_or("Evolved from learned patterns")
                .to_string(),
            Some("[options]"),
            Some(&COMMAND_TOOLS[..]),
            None,
            format!(
                "# {title} Command\n\n\
                 This command was evolved from {size} related instincts based on {observations} observations.\n\n\
                 ## What This Does\n\n{actions}\n\n\
                 ## Usage\n\n`/{name}`\n\n\
                 ## When to Use\n\n{when}\n\n\
                 ## Implementation Notes\n\n\
                 Review and customize this evolved command before activating.\n",
                name = artifact.name,
                when = trigger_list("- When performing related tasks"),
            ),
        ),
        ArtifactKind::Agent => (
            format!(
                "Evolved agent for {} tasks. {}",
                domain,
                lead_trigger.unwrap_or("Handles complex multi-step workflows.")
            ),
            None,
            None,
            Some("inherit"),
            format!(
                "You are a specialized agent evolved from {size} learned patterns.\n\n\
                 ## Core Behaviors\n\n{actions}\n\n\
                 ## When You're Invoked\n\n{when}\n\n\
                 ## How to Work\n\n\
                 1. Analyze the task against the learned patterns above\n\
                 2. Apply each relevant behavior systematically\n\
                 3. Verify your work matches the expected patterns\n\
                 4. Report what you did and why\n\n\
                 ## Notes\n\n\
                 This agent was evolved from observations. Review and refine before regular use.\n",
                when = trigger_list("- For complex multi-step tasks in this domain"),
            ),
        ),
        ArtifactKind::Skill => (
            format!(
                "Use when {} - applies learned patterns automatically",
                lead_trigger
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("performing {} tasks", domain))
            ),
            None,
            None,
            None,
            format!(
                "# {title}\n\n\
                 This skill was evolved from {size} related instincts.\n\n\
                 ## Learned Patterns\n\n{actions}\n\n\
                 ## When This Applies\n\n{when}\n\n\
                 ## How to Apply\n\n\
                 Follow these patterns automatically when the trigger conditions match.\n\n\
                 ## Evidence\n\n\
                 - Based on {observations} observations\n\
                 - Confidence: {percent:.0}%\n\
                 - Domain: {domain}\n",
                when = trigger_list(&format!("- When working in the {} domain", domain)),
                percent = artifact.confidence * 100.0,
            ),
        ),
    };

    let header = ArtifactHeader {
        name: &artifact.name,
        description,
        argument_hint,
        allowed_tools,
        model,
        evolved_from: artifact.evolved_from.iter().map(|id| id.as_str()).collect(),
        evolved_date: artifact.evolved_date.to_string(),
        confidence: artifact.confidence,
    };

    frontmatter::render(&header, &body)
}

/// Filesystem-backed artifact store rooted at the evolved directory
pub struct FileArtifactRepository {
    root: PathBuf,
}

impl FileArtifactRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactRepository for FileArtifactRepository {
    fn location(&self, artifact: &EvolvedArtifact) -> PathBuf {
        self.root.join(artifact.kind.relative_path(&artifact.name))
    }

    fn save(&self, artifact: &EvolvedArtifact) -> Result<PathBuf> {
        let content = render_artifact(artifact)?;
        let path = self.location(artifact);
        write_atomic(&path, &content)?;
        Ok(path)
    }
}

/// In-memory artifact store for testing; keeps rendered documents
#[derive(Default)]
pub struct InMemoryArtifactRepository {
    documents: RwLock<Vec<(PathBuf, String)>>,
}

impl InMemoryArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> Vec<(PathBuf, String)> {
        self.documents.read().map(|d| d.clone()).unwrap_or_default()
    }
}

impl ArtifactRepository for InMemoryArtifactRepository {
    fn location(&self, artifact: &EvolvedArtifact) -> PathBuf {
        artifact.kind.relative_path(&artifact.name)
    }

    fn save(&self, artifact: &EvolvedArtifact) -> Result<PathBuf> {
        let content = render_artifact(artifact)?;
        let path = self.location(artifact);
        if let Ok(mut documents) = self.documents.write() {
            documents.retain(|(p, _)| p != &path);
            documents.push((path.clone(), content));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instinct, InstinctCluster, InstinctDomain, InstinctId};
    use chrono::NaiveDate;

    fn artifact(kind: ArtifactKind) -> EvolvedArtifact {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let members: Vec<Instinct> = ["bash", "npm", "cargo"]
            .iter()
            .map(|tool| Instinct {
                id: InstinctId::new(format!("error-resolution-{}-edit", tool)),
                trigger: format!("when {} produces an error", tool),
                action: format!("Try using Edit to resolve the {} issue", tool),
                domain: InstinctDomain::ErrorHandling,
                confidence: 0.6,
                observation_count: 2,
                source: "session-observation".to_string(),
                last_updated: date,
            })
            .collect();
        let cluster = InstinctCluster::new(members).unwrap();
        EvolvedArtifact {
            name: "error-handling-resolve".to_string(),
            kind,
            confidence: 0.7,
            evolved_from: cluster.ids(),
            evolved_date: date,
            cluster,
        }
    }

    #[test]
    fn test_every_kind_lists_all_actions_and_triggers() {
        for kind in [ArtifactKind::Skill, ArtifactKind::Command, ArtifactKind::Agent] {
            let content = render_artifact(&artifact(kind)).unwrap();
            for tool in ["bash", "npm", "cargo"] {
                assert!(content.contains(&format!("- Try using Edit to resolve the {} issue", tool)));
                assert!(content.contains(&format!("- when {} produces an error", tool)));
            }
        }
    }

    #[test]
    fn test_header_fields_per_kind() {
        let command = frontmatter::parse(&render_artifact(&artifact(ArtifactKind::Command)).unwrap()).unwrap();
        assert_eq!(command.frontmatter.get_str("argument-hint").as_deref(), Some("[options]"));
        assert_eq!(command.frontmatter.get_list("allowed-tools").len(), 5);
        assert!(command.frontmatter.get_str("model").is_none());

        let agent = frontmatter::parse(&render_artifact(&artifact(ArtifactKind::Agent)).unwrap()).unwrap();
        assert_eq!(agent.frontmatter.get_str("model").as_deref(), Some("inherit"));
        assert!(agent.section("Core Behaviors").is_some());

        let skill = frontmatter::parse(&render_artifact(&artifact(ArtifactKind::Skill)).unwrap()).unwrap();
        let fm = &skill.frontmatter;
        assert_eq!(fm.get_str("name").as_deref(), Some("error-handling-resolve"));
        assert_eq!(fm.get_f64("confidence"), Some(0.7));
        assert_eq!(fm.get_str("evolved_date").as_deref(), Some("2026-03-14"));
        assert_eq!(
            fm.get_list("evolved_from"),
            vec![
                "error-resolution-bash-edit",
                "error-resolution-npm-edit",
                "error-resolution-cargo-edit"
            ]
        );
        assert!(skill.body.contains("- Confidence: 70%"));
    }

    #[test]
    fn test_file_repository_locations_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileArtifactRepository::new(dir.path().join("evolved"));

        let skill = artifact(ArtifactKind::Skill);
        let path = repo.save(&skill).unwrap();
        assert_eq!(path, dir.path().join("evolved/skills/error-handling-resolve/SKILL.md"));
        assert!(path.exists());

        let mut again = artifact(ArtifactKind::Skill);
        again.confidence = 0.9;
        repo.save(&again).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("confidence: 0.9"));

        let command_path = repo.save(&artifact(ArtifactKind::Command)).unwrap();
        assert_eq!(command_path, dir.path().join("evolved/commands/error-handling-resolve.md"));
    }
}
