//! End-to-end runs of the workload engine against an in-memory service.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use smallbank_core::Transport;
use smallbank_test_helpers::InMemoryBank;
use smallbank_types::{AccountId, AccountRange, Checkpoint, Response};
use smallbank_workload::{
    Classification, ResponseClassifier, RunError, Runner, SelectionPolicy, StateVerifier,
    TransactionGenerator, VerificationFixture, VerifyError, WorkloadConfig,
};

#[test]
fn test_ten_accounts_hundred_transactions() {
    let bank = InMemoryBank::new();
    let config = WorkloadConfig::new(10).with_num_transactions(100).with_seed(7);

    let runner = Runner::new(config, &bank).unwrap();
    assert_eq!(runner.range(), AccountRange::new(0, 10));

    let report = runner.run().unwrap();
    assert_eq!(report.submitted, 100);
    assert_eq!(report.accepted + report.rejected(), 100);
    assert_eq!(report.writes + report.reads, 100);

    let balance = StateVerifier::new(&bank).query_balance(AccountId(0)).unwrap();
    assert_eq!(Some(balance), bank.balance_of(AccountId(0)));
}

#[test]
fn test_every_failure_is_classified() {
    let bank = InMemoryBank::new();
    let range = AccountRange::new(0, 10);
    for id in range.accounts() {
        bank.insert_account(id, 0, 10);
    }

    let classifier = ResponseClassifier::default();
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let requests = TransactionGenerator::new(range)
        .unwrap()
        .generate(200, &mut rng)
        .unwrap();

    for request in &requests {
        let response = bank.submit(request.method(), &request.payload).unwrap();
        match classifier.classify(&response) {
            Classification::Accepted => assert!(response.is_success()),
            Classification::RecognizedRejection(_) => assert!(!response.is_success()),
            Classification::Fatal(body) => assert_eq!(body, response.body_text()),
        }
    }
}

#[test]
fn test_same_seed_same_traffic() {
    let first = InMemoryBank::new();
    let second = InMemoryBank::new();
    let config = WorkloadConfig::new(16).with_num_transactions(64).with_seed(2024);

    let a = Runner::new(config.clone(), &first).unwrap().run().unwrap();
    let b = Runner::new(config, &second).unwrap().run().unwrap();

    assert_eq!(first.calls(), second.calls());
    assert_eq!(a.accepted_by_type, b.accepted_by_type);
    assert_eq!(a.rejections, b.rejections);
    assert_eq!(first.total_money(), second.total_money());
}

#[test]
fn test_fixture_verification_round() {
    let bank = InMemoryBank::new();
    let config = WorkloadConfig::new(4)
        .with_num_transactions(4)
        .with_seed(1)
        .with_selection(SelectionPolicy::Fixed(smallbank_types::TransactionType::GetBalance));

    let fixture = VerificationFixture::from_json_str(
        &json!({
            "accounts": 4,
            "Initial": [
                {"account": 0, "balance": 2000},
                {"account": 3, "balance": 2000}
            ],
            "Final": [{"account": 0, "balance": 1999}]
        })
        .to_string(),
    )
    .unwrap();

    let err = Runner::new(config, &bank)
        .unwrap()
        .with_fixture(fixture)
        .unwrap()
        .run()
        .unwrap_err();

    match err {
        RunError::Verify(VerifyError::Mismatch {
            checkpoint,
            account,
            expected,
            actual,
        }) => {
            assert_eq!(checkpoint, Checkpoint::Final);
            assert_eq!(account, AccountId(0));
            assert_eq!(expected, 1999);
            assert_eq!(actual, 2000);
        }
        other => panic!("Expected final mismatch, got {:?}", other),
    }
}

#[test]
fn test_service_outage_mid_run() {
    let bank = InMemoryBank::new();
    bank.fail_method(
        smallbank_types::BALANCE_METHOD,
        Response::new(503, "Service unavailable"),
    );
    let config = WorkloadConfig::new(10)
        .with_num_transactions(20)
        .with_seed(3)
        .with_selection(SelectionPolicy::Sequence(vec![
            smallbank_types::TransactionType::DepositChecking,
            smallbank_types::TransactionType::GetBalance,
        ]));

    let err = Runner::new(config, &bank).unwrap().run().unwrap_err();
    assert_eq!(
        err.to_string(),
        "SmallBank_balance failed (transaction 1): Service unavailable"
    );
    // Creation, one deposit, the failing balance query.
    assert_eq!(bank.calls().len(), 3);
}
