//! SmallBank transaction generator.

use crate::config::SelectionPolicy;
use rand::Rng;
use smallbank_types::{
    AccountId, AccountRange, PayloadError, Transaction, TransactionRequest, TransactionType,
    UnknownTransactionType,
};
use std::ops::RangeInclusive;
use tracing::{debug, trace};

/// Signed savings delta of a `TransactSavings`.
pub const SAVINGS_DELTA: RangeInclusive<i32> = -50..=50;

/// Check amount of a `WriteCheck`.
pub const WRITE_CHECK_AMOUNT: RangeInclusive<i32> = 0..=50;

/// Deposit amount of a `DepositChecking`. Never zero.
pub const DEPOSIT_AMOUNT: RangeInclusive<i32> = 1..=51;

/// Generates SmallBank transactions against one account range.
pub struct TransactionGenerator {
    /// Accounts every generated transaction is drawn from.
    range: AccountRange,

    /// Transaction type selection policy.
    policy: SelectionPolicy,
}

impl TransactionGenerator {
    /// Create a generator over a non-empty account range.
    pub fn new(range: AccountRange) -> Result<Self, GenerateError> {
        if range.is_empty() {
            return Err(GenerateError::EmptyRange);
        }
        Ok(Self {
            range,
            policy: SelectionPolicy::default(),
        })
    }

    /// Set the transaction type selection policy.
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate exactly `count` requests.
    ///
    /// Fails as a whole if any entry cannot be generated; no partial batch is
    /// returned.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<TransactionRequest>, GenerateError> {
        let mut requests = Vec::with_capacity(count);

        for sequence_index in 0..count {
            let tx = self.generate_one(sequence_index, rng)?;
            let request = tx.into_request(sequence_index)?;
            trace!(
                sequence_index,
                tx_type = %request.tx_type,
                payload = %hex::encode(&request.payload),
                "Generated transaction"
            );
            requests.push(request);
        }

        debug!(count, range = %self.range, policy = %self.policy, "Generated transaction batch");

        Ok(requests)
    }

    /// Generate the transaction at `sequence_index`.
    pub fn generate_one<R: Rng + ?Sized>(
        &self,
        sequence_index: usize,
        rng: &mut R,
    ) -> Result<Transaction, GenerateError> {
        let tx_type = self.policy.select(sequence_index, rng)?;
        self.generate_of_type(tx_type, rng)
    }

    /// Generate a transaction of the given type with random parameters.
    pub fn generate_of_type<R: Rng + ?Sized>(
        &self,
        tx_type: TransactionType,
        rng: &mut R,
    ) -> Result<Transaction, GenerateError> {
        let tx = match tx_type {
            TransactionType::TransactSavings => Transaction::TransactSavings {
                account: self.select_account(rng)?,
                amount: rng.gen_range(SAVINGS_DELTA),
            },
            TransactionType::Amalgamate => {
                let (source, destination) = self.select_pair(rng)?;
                Transaction::Amalgamate {
                    source,
                    destination,
                }
            }
            TransactionType::WriteCheck => Transaction::WriteCheck {
                account: self.select_account(rng)?,
                amount: rng.gen_range(WRITE_CHECK_AMOUNT),
            },
            TransactionType::DepositChecking => Transaction::DepositChecking {
                account: self.select_account(rng)?,
                amount: rng.gen_range(DEPOSIT_AMOUNT),
            },
            TransactionType::GetBalance => Transaction::GetBalance {
                account: self.select_account(rng)?,
            },
        };
        Ok(tx)
    }

    /// Select a single account uniformly from the range.
    fn select_account<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<AccountId, GenerateError> {
        self.account_at(rng.gen_range(0..self.range.len()))
    }

    fn account_at(&self, offset: u64) -> Result<AccountId, GenerateError> {
        self.range.account_at(offset).ok_or(GenerateError::EmptyRange)
    }

    /// Select a pair of distinct accounts.
    ///
    /// The destination is drawn from the `len - 1` accounts other than the
    /// source by skipping over the source index, so a single draw always
    /// suffices.
    fn select_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(AccountId, AccountId), GenerateError> {
        let len = self.range.len();
        if len < 2 {
            return Err(GenerateError::RangeTooSmall {
                range: self.range,
                required: 2,
            });
        }

        let source = rng.gen_range(0..len);
        let mut destination = rng.gen_range(0..len - 1);
        if destination >= source {
            destination += 1;
        }

        Ok((self.account_at(source)?, self.account_at(destination)?))
    }
}

/// Errors during transaction generation. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    UnknownType(#[from] UnknownTransactionType),

    #[error("Cannot generate transactions over an empty account range")]
    EmptyRange,

    #[error("Account range {range} is too small: need at least {required} accounts")]
    RangeTooSmall { range: AccountRange, required: u64 },

    #[error("Selection sequence is empty")]
    EmptySequence,

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use smallbank_types::payload::{self, AmalgamatePayload, TransactionPayload};

    fn touched_accounts(tx: &Transaction) -> Vec<AccountId> {
        match *tx {
            Transaction::Amalgamate {
                source,
                destination,
            } => vec![source, destination],
            Transaction::TransactSavings { account, .. }
            | Transaction::WriteCheck { account, .. }
            | Transaction::DepositChecking { account, .. }
            | Transaction::GetBalance { account } => vec![account],
        }
    }

    fn generator(from: u64, to: u64) -> TransactionGenerator {
        TransactionGenerator::new(AccountRange::new(from, to)).unwrap()
    }

    #[test]
    fn test_generate_exact_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let requests = generator(0, 10).generate(100, &mut rng).unwrap();
        assert_eq!(requests.len(), 100);
        for (i, request) in requests.iter().enumerate() {
            assert_eq!(request.sequence_index, i);
            assert_eq!(request.is_write, request.tx_type.is_write());
        }
    }

    #[test]
    fn test_accounts_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = AccountRange::new(30, 40);
        let gen = TransactionGenerator::new(range).unwrap();
        for i in 0..1000 {
            let tx = gen.generate_one(i, &mut rng).unwrap();
            for account in touched_accounts(&tx) {
                assert!(range.contains(account), "{} outside {}", account, range);
            }
        }
    }

    #[test]
    fn test_amalgamate_accounts_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for (from, to) in [(0u64, 2u64), (5, 8), (100, 200)] {
            let range = AccountRange::new(from, to);
            let gen = TransactionGenerator::new(range).unwrap();
            for _ in 0..500 {
                match gen.generate_of_type(TransactionType::Amalgamate, &mut rng).unwrap() {
                    Transaction::Amalgamate {
                        source,
                        destination,
                    } => {
                        assert_ne!(source, destination);
                        assert!(range.contains(source));
                        assert!(range.contains(destination));
                    }
                    other => panic!("Expected amalgamate, got {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_amalgamate_two_accounts_covers_both_orders() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let gen = generator(0, 2);
        let mut pairs = std::collections::HashSet::new();
        for _ in 0..100 {
            if let Transaction::Amalgamate {
                source,
                destination,
            } = gen.generate_of_type(TransactionType::Amalgamate, &mut rng).unwrap()
            {
                pairs.insert((source.0, destination.0));
            }
        }
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(1, 0)));
    }

    #[test]
    fn test_amalgamate_single_account_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let result = generator(3, 4).generate_of_type(TransactionType::Amalgamate, &mut rng);
        assert!(matches!(
            result,
            Err(GenerateError::RangeTooSmall { required: 2, .. })
        ));
    }

    #[test]
    fn test_amount_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let gen = generator(0, 10);
        for _ in 0..2000 {
            match gen.generate_of_type(TransactionType::DepositChecking, &mut rng).unwrap() {
                Transaction::DepositChecking { amount, .. } => {
                    assert!((1..=51).contains(&amount), "deposit {}", amount)
                }
                other => panic!("unexpected {:?}", other),
            }
            match gen.generate_of_type(TransactionType::WriteCheck, &mut rng).unwrap() {
                Transaction::WriteCheck { amount, .. } => {
                    assert!((0..=50).contains(&amount), "check {}", amount)
                }
                other => panic!("unexpected {:?}", other),
            }
            match gen.generate_of_type(TransactionType::TransactSavings, &mut rng).unwrap() {
                Transaction::TransactSavings { amount, .. } => {
                    assert!((-50..=50).contains(&amount), "delta {}", amount)
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_fixed_policy() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let requests = generator(0, 10)
            .with_policy(SelectionPolicy::Fixed(TransactionType::GetBalance))
            .generate(20, &mut rng)
            .unwrap();
        assert!(requests
            .iter()
            .all(|r| r.tx_type == TransactionType::GetBalance && !r.is_write));
    }

    #[test]
    fn test_same_seed_same_batch() {
        let gen = generator(0, 50);
        let a = gen.generate(64, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = gen.generate(64, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let c = gen.generate(64, &mut ChaCha8Rng::seed_from_u64(10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_payloads_decode_to_schema() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let requests = generator(0, 10)
            .with_policy(SelectionPolicy::Sequence(vec![
                TransactionType::Amalgamate,
                TransactionType::DepositChecking,
            ]))
            .generate(2, &mut rng)
            .unwrap();

        let amalgamate: AmalgamatePayload = payload::decode(&requests[0].payload).unwrap();
        assert_ne!(amalgamate.src_account, amalgamate.dst_account);
        assert_eq!(requests[0].method(), "SmallBank_amalgamate");

        let deposit: TransactionPayload = payload::decode(&requests[1].payload).unwrap();
        assert!(deposit.amount >= 1);
        assert!(deposit.account.parse::<u64>().unwrap() < 10);
    }

    #[test]
    fn test_empty_range_rejected() {
        assert!(matches!(
            TransactionGenerator::new(AccountRange::new(5, 5)),
            Err(GenerateError::EmptyRange)
        ));
    }
}
