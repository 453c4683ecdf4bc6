//! Workload run orchestration.
//!
//! A run goes through fixed phases:
//!
//! ```text
//! validate config ─► create accounts ─► [print] ─► verify Initial
//!                                                     │
//!       verify Final ◄─ [print] ◄─ submit each ◄─ generate batch
//! ```
//!
//! Recognised rejections are counted and the run continues. Every other error
//! ends the run immediately; nothing is retried.

use crate::accounts::AccountSpace;
use crate::classify::{Classification, RejectionKind, RejectionPolicy, ResponseClassifier};
use crate::config::{ConfigError, WorkloadConfig};
use crate::fixture::VerificationFixture;
use crate::metrics::{MetricsCollector, RunReport};
use crate::provision::build_creation_request;
use crate::verify::{StateVerifier, VerifyError};
use crate::workload::{GenerateError, TransactionGenerator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallbank_core::Transport;
use smallbank_types::{AccountRange, Checkpoint, PayloadError, CREATE_BATCH_METHOD};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives one client instance's workload against the service.
pub struct Runner<T> {
    config: WorkloadConfig,
    space: AccountSpace,
    transport: T,
    classifier: ResponseClassifier,
    fixture: VerificationFixture,
}

impl<T: Transport> Runner<T> {
    /// Create a runner. Fails on an invalid configuration, before any traffic.
    pub fn new(config: WorkloadConfig, transport: T) -> Result<Self, RunError> {
        config.validate()?;
        let space = AccountSpace::from_config(&config)?;

        Ok(Self {
            config,
            space,
            transport,
            classifier: ResponseClassifier::default(),
            fixture: VerificationFixture::default(),
        })
    }

    /// Verify checkpoints against `fixture`.
    ///
    /// Fails if the fixture was written for a different number of accounts
    /// and clients are not partitioned.
    pub fn with_fixture(mut self, fixture: VerificationFixture) -> Result<Self, RunError> {
        fixture.check_accounts(self.space.total_accounts(), self.space.is_partitioned())?;
        self.fixture = fixture;
        Ok(self)
    }

    /// Replace the set of recognised rejections.
    pub fn with_rejection_policy(mut self, policy: RejectionPolicy) -> Self {
        self.classifier = ResponseClassifier::new(policy);
        self
    }

    /// The account range this runner owns.
    pub fn range(&self) -> AccountRange {
        self.space.range()
    }

    /// Execute every phase of the run.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        info!(
            seed,
            client = %self.space.client_id(),
            partitioned = self.space.is_partitioned(),
            range = %self.range(),
            transactions = self.config.num_transactions,
            selection = %self.config.selection,
            "Starting SmallBank run"
        );

        let creation_rejected = self.create_accounts()?;

        if self.config.print_accounts {
            self.print_accounts("Initial accounts")?;
        }
        self.verify(Checkpoint::Initial)?;

        let generator = TransactionGenerator::new(self.range())?
            .with_policy(self.config.selection.clone());
        let requests = generator.generate(self.config.num_transactions, &mut rng)?;

        let mut metrics = MetricsCollector::new()?;
        let start = Instant::now();

        for request in &requests {
            let sent = Instant::now();
            let result = self.transport.submit(request.method(), &request.payload);
            let latency = sent.elapsed();

            match self.classifier.classify_result(&result) {
                Classification::Accepted => metrics.record_accepted(request.tx_type, latency),
                Classification::RecognizedRejection(kind) => {
                    debug!(
                        sequence_index = request.sequence_index,
                        tx_type = %request.tx_type,
                        %kind,
                        "Recognised rejection"
                    );
                    metrics.record_rejection(request.tx_type, kind, latency);
                }
                Classification::Fatal(message) => {
                    return Err(RunError::Fatal {
                        method: request.method().to_string(),
                        sequence_index: Some(request.sequence_index),
                        message,
                    });
                }
            }
        }

        let report = metrics.finish(start.elapsed(), creation_rejected);

        if report.rejected() > 0 {
            warn!(
                rejected = report.rejected(),
                submitted = report.submitted,
                "Some transactions were rejected by business rules"
            );
        }

        if self.config.print_accounts {
            self.print_accounts("Final accounts")?;
        }
        self.verify(Checkpoint::Final)?;

        info!(
            submitted = report.submitted,
            accepted = report.accepted,
            rejected = report.rejected(),
            duration = ?report.duration,
            "SmallBank run complete"
        );

        Ok(report)
    }

    /// Submit the batch-creation request for the owned range.
    ///
    /// Returns whether the service rejected it because the accounts already
    /// existed.
    pub fn create_accounts(&self) -> Result<bool, RunError> {
        let request = build_creation_request(
            self.range(),
            self.config.initial_checking_balance,
            self.config.initial_savings_balance,
        )?;

        info!(
            from = request.range.from,
            to = request.range.to,
            accounts = request.account_count(),
            "Creating accounts"
        );
        let result = self.transport.submit(request.method(), &request.payload);

        match self.classifier.classify_result(&result) {
            Classification::Accepted => Ok(false),
            Classification::RecognizedRejection(kind) => {
                warn!(%kind, "Account creation rejected");
                Ok(kind == RejectionKind::DuplicateAccount)
            }
            Classification::Fatal(message) => Err(RunError::Fatal {
                method: CREATE_BATCH_METHOD.to_string(),
                sequence_index: None,
                message,
            }),
        }
    }

    /// Verify one checkpoint against the fixture. A no-op without expectations.
    pub fn verify(&self, checkpoint: Checkpoint) -> Result<usize, RunError> {
        let verifier = StateVerifier::new(&self.transport);
        Ok(verifier.verify(checkpoint, self.fixture.expected(checkpoint))?)
    }

    /// Log the balance of every owned account as pretty JSON.
    pub fn print_accounts(&self, header: &str) -> Result<(), RunError> {
        let verifier = StateVerifier::new(&self.transport);
        let accounts = verifier.snapshot(self.range())?;
        let json = serde_json::to_string_pretty(&accounts).map_err(PayloadError::Encode)?;
        info!("{}\nAccounts:\n{}", header, json);
        Ok(())
    }
}

/// Errors that end a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{method} failed{}: {message}", describe_index(.sequence_index))]
    Fatal {
        method: String,
        sequence_index: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Failed to create latency histogram: {0}")]
    Metrics(#[from] hdrhistogram::CreationError),
}

fn describe_index(sequence_index: &Option<usize>) -> String {
    match sequence_index {
        Some(i) => format!(" (transaction {})", i),
        None => String::new(),
    }
}
