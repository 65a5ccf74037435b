//! Interactive circuit collection.
//!
//! Collection is a three-state machine over an owned, shrinking pool of
//! candidate r1cs files:
//!
//! ```text
//! SelectingCircuit ──▶ CollectingInput ──▶ AskingContinue
//!        ▲                                      │ continue, pool non-empty
//!        └──────────────────────────────────────┘
//! ```
//!
//! A selected file leaves the pool for the rest of the run. Sequence
//! positions start at 1 and grow by exactly 1 per collected circuit. An
//! empty pool ends the loop unconditionally, whatever the operator wants.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::ceremony::{CircuitInputData, CollectedCircuit};
use crate::error::{CeremonyError, Result};

/// Operator answers for one circuit.
#[derive(Debug, Clone)]
pub struct CircuitDetails {
    pub name: String,
    pub description: String,
    pub max_contribution_wait_minutes: u32,
}

/// The interactive questions collection needs answered.
#[async_trait]
pub trait CollectorPrompt: Send {
    /// Pick one file from the remaining pool; returns its index.
    async fn select_circuit(&mut self, pool: &[PathBuf]) -> Result<usize>;

    /// Collect the details for the selected file at the given sequence position.
    async fn circuit_details(&mut self, file: &Path, position: u32) -> Result<CircuitDetails>;

    /// Whether the operator wants to add another circuit.
    async fn wants_another(&mut self) -> Result<bool>;
}

/// Find the candidate `.r1cs` files in the working directory, sorted by name.
///
/// Fails with [`CeremonyError::Collection`] if none are found.
pub fn scan_pool(working_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pool = Vec::new();
    for entry in std::fs::read_dir(working_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "r1cs") {
            pool.push(path);
        }
    }
    if pool.is_empty() {
        return Err(CeremonyError::Collection(working_dir.to_path_buf()));
    }
    pool.sort();
    Ok(pool)
}

enum CollectState {
    SelectingCircuit,
    CollectingInput { selected: PathBuf },
    AskingContinue,
    Done,
}

/// Run the collection loop over `pool`, returning the collected circuits in
/// sequence order (index 0 is position 1).
pub async fn collect<P: CollectorPrompt + ?Sized>(
    mut pool: Vec<PathBuf>,
    prompt: &mut P,
) -> Result<Vec<CollectedCircuit>> {
    if pool.is_empty() {
        return Err(CeremonyError::Collection(PathBuf::from(".")));
    }

    let mut circuits: Vec<CollectedCircuit> = Vec::new();
    let mut state = CollectState::SelectingCircuit;

    loop {
        state = match state {
            CollectState::SelectingCircuit => {
                let idx = prompt.select_circuit(&pool).await?;
                if idx >= pool.len() {
                    return Err(CeremonyError::InvalidInput(format!(
                        "circuit selection {idx} out of range (pool size {})",
                        pool.len()
                    )));
                }
                // Leaves the pool permanently; a file can be collected once.
                let selected = pool.remove(idx);
                CollectState::CollectingInput { selected }
            }
            CollectState::CollectingInput { selected } => {
                let position = circuits.len() as u32 + 1;
                let details = prompt.circuit_details(&selected, position).await?;
                circuits.push(CollectedCircuit {
                    input: CircuitInputData::new(
                        details.name,
                        details.description,
                        position,
                        details.max_contribution_wait_minutes,
                    ),
                    r1cs_path: selected,
                });
                CollectState::AskingContinue
            }
            CollectState::AskingContinue => {
                if pool.is_empty() {
                    CollectState::Done
                } else if prompt.wants_another().await? {
                    CollectState::SelectingCircuit
                } else {
                    CollectState::Done
                }
            }
            CollectState::Done => break,
        };
    }

    Ok(circuits)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted prompt: always selects index 0 and answers `continue_answers`
    /// in order (missing answers default to false).
    struct ScriptedPrompt {
        continue_answers: Vec<bool>,
        asked: usize,
    }

    impl ScriptedPrompt {
        fn new(continue_answers: Vec<bool>) -> Self {
            Self {
                continue_answers,
                asked: 0,
            }
        }
    }

    #[async_trait]
    impl CollectorPrompt for ScriptedPrompt {
        async fn select_circuit(&mut self, _pool: &[PathBuf]) -> Result<usize> {
            Ok(0)
        }

        async fn circuit_details(&mut self, file: &Path, position: u32) -> Result<CircuitDetails> {
            Ok(CircuitDetails {
                name: format!(
                    "{} {position}",
                    file.file_stem().unwrap().to_string_lossy()
                ),
                description: "test circuit".into(),
                max_contribution_wait_minutes: 10,
            })
        }

        async fn wants_another(&mut self) -> Result<bool> {
            let answer = self.continue_answers.get(self.asked).copied().unwrap_or(false);
            self.asked += 1;
            Ok(answer)
        }
    }

    fn pool(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn test_positions_are_contiguous_from_one() {
        let mut prompt = ScriptedPrompt::new(vec![true, true]);
        let circuits = collect(pool(&["a.r1cs", "b.r1cs", "c.r1cs"]), &mut prompt)
            .await
            .unwrap();

        let positions: Vec<u32> = circuits.iter().map(|c| c.input.sequence_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_operator_declines_after_first() {
        let mut prompt = ScriptedPrompt::new(vec![false]);
        let circuits = collect(pool(&["a.r1cs", "b.r1cs"]), &mut prompt).await.unwrap();

        assert_eq!(circuits.len(), 1);
        assert_eq!(circuits[0].r1cs_path, PathBuf::from("a.r1cs"));
    }

    #[tokio::test]
    async fn test_empty_pool_terminates_despite_operator_intent() {
        // Operator would continue forever, but two files can only yield two circuits.
        let mut prompt = ScriptedPrompt::new(vec![true, true, true, true]);
        let circuits = collect(pool(&["a.r1cs", "b.r1cs"]), &mut prompt).await.unwrap();

        assert_eq!(circuits.len(), 2);
        // Pool exhaustion ends the loop without a final continue question.
        assert_eq!(prompt.asked, 1);
    }

    #[tokio::test]
    async fn test_no_file_selected_twice() {
        let mut prompt = ScriptedPrompt::new(vec![true, true]);
        let circuits = collect(pool(&["a.r1cs", "b.r1cs", "c.r1cs"]), &mut prompt)
            .await
            .unwrap();

        let mut files: Vec<_> = circuits.iter().map(|c| c.r1cs_path.clone()).collect();
        files.sort();
        files.dedup();
        assert_eq!(files.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_initial_pool_is_a_collection_error() {
        let mut prompt = ScriptedPrompt::new(vec![]);
        let result = collect(Vec::new(), &mut prompt).await;
        assert!(matches!(result, Err(CeremonyError::Collection(_))));
    }

    #[test]
    fn test_scan_pool_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.r1cs"), "").unwrap();
        std::fs::write(dir.path().join("a.r1cs"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let pool = scan_pool(dir.path()).unwrap();
        let names: Vec<_> = pool
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.r1cs", "b.r1cs"]);
    }

    #[test]
    fn test_scan_pool_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            scan_pool(dir.path()),
            Err(CeremonyError::Collection(_))
        ));
    }
}
