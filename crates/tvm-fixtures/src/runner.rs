//! Fixture runner and statistics

use crate::error::{FixtureError, FixtureResult};
use crate::types::{Expectation, FixtureCase, FixtureFile};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tvm_executor::{ExecutionResult, Receipt, TransactionExecutor, WorldState};

/// Results of one fixture file
#[derive(Debug, Default)]
pub struct FileResults {
    /// File path
    pub file: String,
    /// Passed case names
    pub passed: Vec<String>,
    /// Failed case names with reasons
    pub failed: Vec<(String, String)>,
}

impl FileResults {
    /// Create empty results for a file
    pub fn new(file: String) -> Self {
        Self {
            file,
            ..Default::default()
        }
    }

    /// Total number of cases
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Aggregated test statistics
#[derive(Debug, Default)]
pub struct TestStats {
    /// Total cases executed
    pub total: usize,
    /// Cases passed
    pub passed: usize,
    /// Cases failed, unreadable files included
    pub failed: usize,
    /// Total execution time
    pub duration: Duration,
    /// Failed case names with reasons
    pub failures: Vec<(String, String)>,
}

impl TestStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the results of one file
    pub fn add_file_results(&mut self, results: &FileResults) {
        self.total += results.total();
        self.passed += results.passed.len();
        self.failed += results.failed.len();
        for (name, reason) in &results.failed {
            self.failures
                .push((format!("{}::{}", results.file, name), reason.clone()));
        }
    }

    /// Count a file that could not be loaded as one failure
    pub fn add_file_error(&mut self, path: &Path, error: &FixtureError) {
        self.total += 1;
        self.failed += 1;
        self.failures
            .push((path.display().to_string(), error.to_string()));
    }

    /// Fold another run into this one
    pub fn merge(&mut self, other: TestStats) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.duration += other.duration;
        self.failures.extend(other.failures);
    }

    /// Whether every executed case passed
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("Fixture Summary");
        println!("========================================");
        println!("Total:   {}", self.total);
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Pass Rate: {:.2}%", self.pass_rate());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());

        if !self.failures.is_empty() {
            println!("\nFailed fixtures:");
            for (name, reason) in &self.failures {
                println!("  - {}: {}", name, reason);
            }
        }
    }
}

/// Runs fixture cases, each against a fresh executor
pub struct FixtureRunner {
    /// Log every case, not only failures
    verbose: bool,
}

impl FixtureRunner {
    /// Create new runner
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run a file, or every `.json` file under a directory
    pub fn run_path(&self, path: &Path) -> FixtureResult<TestStats> {
        if path.is_dir() {
            return self.run_dir(path);
        }
        let start = Instant::now();
        let mut stats = TestStats::new();
        let results = self.run_file(path)?;
        stats.add_file_results(&results);
        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Run every `.json` file under `dir`, recursively.
    ///
    /// A file that cannot be read or parsed counts as one failure.
    pub fn run_dir(&self, dir: &Path) -> FixtureResult<TestStats> {
        let mut stats = TestStats::new();
        let start = Instant::now();

        if self.verbose {
            info!("Running fixtures from: {:?}", dir);
        }

        self.run_dir_recursive(dir, &mut stats)?;

        stats.duration = start.elapsed();
        Ok(stats)
    }

    fn run_dir_recursive(&self, dir: &Path, stats: &mut TestStats) -> FixtureResult<()> {
        let mut entries = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.run_dir_recursive(&path, stats)?;
            } else if path.extension().is_some_and(|e| e == "json") {
                match self.run_file(&path) {
                    Ok(results) => {
                        if !results.failed.is_empty() {
                            warn!(
                                "File: {:?} - {} passed, {} failed",
                                path,
                                results.passed.len(),
                                results.failed.len()
                            );
                        }
                        stats.add_file_results(&results);
                    }
                    Err(e) => {
                        warn!("Unreadable fixture {:?}: {}", path, e);
                        stats.add_file_error(&path, &e);
                    }
                }
            }
        }

        Ok(())
    }

    /// Run all cases in a file
    pub fn run_file(&self, path: &Path) -> FixtureResult<FileResults> {
        let content = std::fs::read_to_string(path)?;
        let cases: FixtureFile = serde_json::from_str(&content)?;

        let mut results = FileResults::new(path.display().to_string());

        for (name, case) in cases {
            match self.run_test(&name, &case) {
                Ok(()) => {
                    if self.verbose {
                        info!("PASS: {}", name);
                    }
                    results.passed.push(name);
                }
                Err(e) => {
                    warn!("FAIL: {} - {}", name, e);
                    results.failed.push((name, e.to_string()));
                }
            }
        }

        Ok(results)
    }

    /// Run a single case
    pub fn run_test(&self, name: &str, case: &FixtureCase) -> FixtureResult<()> {
        let mut executor =
            TransactionExecutor::with_state(case.pre_state(), case.executor_config());

        for (index, tx) in case.transactions.iter().enumerate() {
            let outcome = executor.execute(&tx.to_transaction());
            check_transaction(&format!("{}[{}]", name, index), &tx.expect, outcome)?;
        }

        check_post_state(name, case, executor.state())
    }
}

fn check_transaction(
    label: &str,
    expect: &Expectation,
    outcome: ExecutionResult<Receipt>,
) -> FixtureResult<()> {
    if expect.rejected {
        return match outcome {
            Err(_) => Ok(()),
            Ok(_) => Err(FixtureError::Assertion(format!(
                "{}: expected rejection but the transaction ran",
                label
            ))),
        };
    }

    let receipt = outcome?;

    if receipt.success != expect.success {
        return Err(FixtureError::Assertion(format!(
            "{}: success mismatch: expected {}, got {}",
            label, expect.success, receipt.success
        )));
    }

    if let Some(expected_gas) = expect.gas_used {
        if receipt.gas_used != expected_gas.0 {
            return Err(FixtureError::Assertion(format!(
                "{}: gas mismatch: expected {}, got {}",
                label, expected_gas.0, receipt.gas_used
            )));
        }
    }

    if let Some(expected_out) = &expect.output {
        if receipt.output != expected_out.0 {
            return Err(FixtureError::Assertion(format!(
                "{}: output mismatch: expected 0x{}, got 0x{}",
                label,
                hex::encode(&expected_out.0),
                hex::encode(&receipt.output)
            )));
        }
    }

    Ok(())
}

fn check_post_state(name: &str, case: &FixtureCase, state: &WorldState) -> FixtureResult<()> {
    for (address, expected) in &case.post {
        let actual = state.storage_of(address);
        let expected_storage = expected.non_zero_storage();
        if actual != expected_storage {
            return Err(FixtureError::Assertion(format!(
                "{}: storage mismatch at {}: expected {:?}, got {:?}",
                name, address, expected_storage, actual
            )));
        }

        if let Some(balance) = expected.balance {
            let actual = state.balance(address);
            if actual != balance.0 {
                return Err(FixtureError::Assertion(format!(
                    "{}: balance mismatch at {}: expected {}, got {}",
                    name, address, balance.0, actual
                )));
            }
        }
    }
    Ok(())
}
