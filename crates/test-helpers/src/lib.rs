//! Test helpers for the SmallBank driver.
//!
//! Provides [`InMemoryBank`], an in-process SmallBank service that implements
//! [`Transport`] so the workload engine can be exercised without a network.

use parking_lot::Mutex;
use serde_json::json;
use smallbank_core::{Transport, TransportError};
use smallbank_types::payload::{
    self, AccountPayload, AmalgamatePayload, CreateAccountsPayload, TransactionPayload,
};
use smallbank_types::{AccountId, Response, TransactionType, BALANCE_METHOD, CREATE_BATCH_METHOD};
use std::collections::{BTreeMap, HashMap};

/// Checking and savings balances of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balances {
    pub checking: i64,
    pub savings: i64,
}

impl Balances {
    pub fn total(&self) -> i64 {
        self.checking + self.savings
    }
}

#[derive(Default)]
struct BankState {
    accounts: BTreeMap<u64, Balances>,
    calls: Vec<(String, Vec<u8>)>,
    failures: HashMap<String, Response>,
}

/// An in-memory SmallBank service.
///
/// Follows the service's business rules, including the free-text errors the
/// classifier recognises. Every submission is recorded for later inspection.
#[derive(Default)]
pub struct InMemoryBank {
    state: Mutex<BankState>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite an account directly, bypassing the service.
    pub fn insert_account(&self, account: AccountId, checking: i64, savings: i64) {
        self.state
            .lock()
            .accounts
            .insert(account.0, Balances { checking, savings });
    }

    /// Answer every call to `method` with `response` instead of executing it.
    pub fn fail_method(&self, method: &str, response: Response) {
        self.state
            .lock()
            .failures
            .insert(method.to_string(), response);
    }

    /// Checking and savings balances of an account.
    pub fn balances(&self, account: AccountId) -> Option<Balances> {
        self.state.lock().accounts.get(&account.0).copied()
    }

    /// Total balance of an account.
    pub fn balance_of(&self, account: AccountId) -> Option<i64> {
        self.balances(account).map(|b| b.total())
    }

    /// Number of existing accounts.
    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }

    /// Sum of all balances across all accounts.
    pub fn total_money(&self) -> i64 {
        self.state.lock().accounts.values().map(Balances::total).sum()
    }

    /// Every `(method, payload)` submitted so far, in order.
    pub fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().calls.clone()
    }

    /// Accounts queried through the balance method, in order.
    pub fn balance_queries(&self) -> Vec<AccountId> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(method, _)| method == BALANCE_METHOD)
            .filter_map(|(_, body)| payload::decode::<AccountPayload>(body).ok())
            .filter_map(|p| p.account.parse().ok().map(AccountId))
            .collect()
    }

    fn execute(state: &mut BankState, method: &str, body: &[u8]) -> Response {
        let result = match method {
            CREATE_BATCH_METHOD => decode(body).and_then(|p| create_batch(state, p)),
            m if m == TransactionType::GetBalance.method() => {
                decode(body).and_then(|p: AccountPayload| {
                    let account = lookup(state, &p.account)?;
                    Ok(json!({ "balance": state.accounts[&account].total() }).to_string())
                })
            }
            m if m == TransactionType::TransactSavings.method() => {
                decode(body).and_then(|p| transact_savings(state, p))
            }
            m if m == TransactionType::Amalgamate.method() => {
                decode(body).and_then(|p| amalgamate(state, p))
            }
            m if m == TransactionType::WriteCheck.method() => {
                decode(body).and_then(|p| write_check(state, p))
            }
            m if m == TransactionType::DepositChecking.method() => {
                decode(body).and_then(|p| deposit_checking(state, p))
            }
            other => Err((404, format!("Unknown method: {}", other))),
        };

        match result {
            Ok(body) => Response::ok(body),
            Err((status, message)) => Response::new(status, message),
        }
    }
}

impl Transport for InMemoryBank {
    fn submit(&self, method: &str, payload: &[u8]) -> Result<Response, TransportError> {
        let mut state = self.state.lock();
        state.calls.push((method.to_string(), payload.to_vec()));

        if let Some(response) = state.failures.get(method) {
            return Ok(response.clone());
        }

        Ok(Self::execute(&mut state, method, payload))
    }
}

type Outcome = Result<String, (u16, String)>;

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, (u16, String)> {
    payload::decode(body).map_err(|e| (400, e.to_string()))
}

fn lookup(state: &BankState, account: &str) -> Result<u64, (u16, String)> {
    let id: u64 = account
        .parse()
        .map_err(|_| (400, format!("Invalid account id: {}", account)))?;
    if state.accounts.contains_key(&id) {
        Ok(id)
    } else {
        Err((404, format!("Account {} does not exist", id)))
    }
}

fn create_batch(state: &mut BankState, p: CreateAccountsPayload) -> Outcome {
    let range = p.range();
    if state.accounts.keys().any(|&id| range.contains(AccountId(id))) {
        return Err((400, "Account already exists in accounts table".to_string()));
    }
    for account in range.accounts() {
        state.accounts.insert(
            account.0,
            Balances {
                checking: p.checking_balance,
                savings: p.savings_balance,
            },
        );
    }
    Ok(String::new())
}

fn transact_savings(state: &mut BankState, p: TransactionPayload) -> Outcome {
    let id = lookup(state, &p.account)?;
    let account = state.accounts.entry(id).or_default();
    let updated = account.savings + i64::from(p.amount);
    if updated < 0 {
        return Err((400, "Not enough money in savings account".to_string()));
    }
    account.savings = updated;
    Ok(String::new())
}

fn amalgamate(state: &mut BankState, p: AmalgamatePayload) -> Outcome {
    let src = lookup(state, &p.src_account)?;
    let dst = lookup(state, &p.dst_account)?;
    if src == dst {
        return Err((400, "Source and destination accounts must differ".to_string()));
    }
    let moved = std::mem::take(state.accounts.entry(src).or_default()).total();
    state.accounts.entry(dst).or_default().checking += moved;
    Ok(String::new())
}

fn write_check(state: &mut BankState, p: TransactionPayload) -> Outcome {
    let id = lookup(state, &p.account)?;
    let account = state.accounts.entry(id).or_default();
    let amount = i64::from(p.amount);
    // Overdrafts incur a one unit penalty.
    if account.total() < amount {
        account.checking -= amount + 1;
    } else {
        account.checking -= amount;
    }
    Ok(String::new())
}

fn deposit_checking(state: &mut BankState, p: TransactionPayload) -> Outcome {
    let id = lookup(state, &p.account)?;
    if p.amount <= 0 {
        return Err((400, "Value of deposit must be positive".to_string()));
    }
    state.accounts.entry(id).or_default().checking += i64::from(p.amount);
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallbank_types::AccountRange;

    fn submit(bank: &InMemoryBank, method: &str, body: serde_json::Value) -> Response {
        bank.submit(method, body.to_string().as_bytes()).unwrap()
    }

    fn created_bank() -> InMemoryBank {
        let bank = InMemoryBank::new();
        let payload = CreateAccountsPayload::new(AccountRange::new(0, 3), 100, 50);
        let response = bank
            .submit(CREATE_BATCH_METHOD, &payload.encode().unwrap())
            .unwrap();
        assert!(response.is_success());
        bank
    }

    #[test]
    fn test_create_and_duplicate() {
        let bank = created_bank();
        assert_eq!(bank.account_count(), 3);
        assert_eq!(bank.balance_of(AccountId(2)), Some(150));

        let payload = CreateAccountsPayload::new(AccountRange::new(2, 4), 1, 1);
        let response = bank
            .submit(CREATE_BATCH_METHOD, &payload.encode().unwrap())
            .unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body_text(),
            "Account already exists in accounts table"
        );
        assert_eq!(bank.account_count(), 3);
    }

    #[test]
    fn test_transact_savings_insufficient() {
        let bank = created_bank();
        let response = submit(
            &bank,
            "SmallBank_transact_savings",
            json!({"account": "0", "amount": -51}),
        );
        assert_eq!(response.body_text(), "Not enough money in savings account");
        assert_eq!(bank.balances(AccountId(0)).unwrap().savings, 50);
    }

    #[test]
    fn test_amalgamate_moves_everything() {
        let bank = created_bank();
        let response = submit(
            &bank,
            "SmallBank_amalgamate",
            json!({"src_account": "0", "dst_account": "1"}),
        );
        assert!(response.is_success());
        assert_eq!(bank.balance_of(AccountId(0)), Some(0));
        assert_eq!(
            bank.balances(AccountId(1)),
            Some(Balances {
                checking: 250,
                savings: 50
            })
        );
        assert_eq!(bank.total_money(), 450);
    }

    #[test]
    fn test_write_check_overdraft_penalty() {
        let bank = InMemoryBank::new();
        bank.insert_account(AccountId(7), 10, 5);
        let response = submit(
            &bank,
            "SmallBank_write_check",
            json!({"account": "7", "amount": 20}),
        );
        assert!(response.is_success());
        assert_eq!(bank.balances(AccountId(7)).unwrap().checking, -11);
    }

    #[test]
    fn test_balance_query() {
        let bank = created_bank();
        let response = submit(&bank, BALANCE_METHOD, json!({"account": "1"}));
        assert_eq!(response.body_text(), r#"{"balance":150}"#);
        assert_eq!(bank.balance_queries(), vec![AccountId(1)]);
    }

    #[test]
    fn test_unknown_account_and_method() {
        let bank = created_bank();
        assert_eq!(
            submit(&bank, BALANCE_METHOD, json!({"account": "9"})).status,
            404
        );
        assert_eq!(submit(&bank, "SmallBank_overdraft", json!({})).status, 404);
    }

    #[test]
    fn test_injected_failure() {
        let bank = created_bank();
        bank.fail_method(BALANCE_METHOD, Response::new(503, "unavailable"));
        let response = submit(&bank, BALANCE_METHOD, json!({"account": "1"}));
        assert_eq!(response, Response::new(503, "unavailable"));
    }
}
