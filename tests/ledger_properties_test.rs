use chainbasis::ledger::{BaseToken, CompositeToken, Ledger, LedgerError, Token};
use chainbasis::{ContractId, Decimal, TokenId};
use std::collections::BTreeMap;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn id(s: &str) -> TokenId {
    TokenId::new(s)
}

fn base(token: &str, lots: &[(&str, &str)]) -> BaseToken {
    let mut t = BaseToken::new(id(token));
    for (count, unit_cost) in lots {
        t.add_lot(d(count), d(unit_cost)).unwrap();
    }
    t
}

#[test]
fn test_removal_conserves_amount_and_cost() {
    for x in ["0.000001", "3", "57.5", "99.9999", "130"] {
        let mut token = base("X", &[("100", "5"), ("20", "12"), ("10", "0.3")]);
        let (amount, cost) = (token.amount(), token.cost());

        let removed = token.remove(d(x)).unwrap();

        assert!((removed.amount() + token.amount()).approx_eq(amount), "amount for {x}");
        assert_eq!(removed.cost() + token.cost(), cost, "cost for {x}");
        assert!(removed.amount().approx_eq(d(x)));
    }
}

#[test]
fn test_lifo_draws_most_recent_lot_first() {
    let mut token = base("X", &[("100", "5"), ("20", "12")]);

    let removed = Token::Base(token.remove(d("10")).unwrap());
    assert_eq!(removed.cost_basis(), Some(d("12")));
    assert_eq!(token.amount(), d("110"));

    let removed = token.remove(d("20")).unwrap();
    assert_eq!(token.amount(), d("90"));
    // 10 left @12 then 10 @5
    assert_eq!(removed.cost(), d("170"));
    assert_eq!(token.lots().len(), 1);
    assert_eq!(token.lots()[0].unit_cost(), d("5"));
}

#[test]
fn test_over_removal_is_fatal() {
    let mut token = base("X", &[("1", "5")]);
    let err = token.remove(d("2")).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientLots { .. }));
    assert_eq!(token.amount(), d("1"));
}

#[test]
fn test_composite_removal_is_proportional() {
    let mut underlying = BTreeMap::new();
    underlying.insert(id("A"), Token::Base(base("A", &[("40", "2")])));
    underlying.insert(id("B"), Token::Base(base("B", &[("60", "3")])));
    let mut lp = CompositeToken::new(id("LP"), d("100"), underlying);
    let cost_before = lp.cost();

    let removed = lp.remove_ratio(d("0.25")).unwrap();

    assert_eq!(removed.underlying_amount(&id("A")), d("10"));
    assert_eq!(removed.underlying_amount(&id("B")), d("15"));
    assert_eq!(lp.amount(), d("75"));
    assert_eq!(removed.amount(), d("25"));
    assert_eq!(removed.cost(), d("65"));
    assert_eq!(removed.cost() + lp.cost(), cost_before);
}

#[test]
fn test_nested_composites_recurse() {
    let mut inner = BTreeMap::new();
    inner.insert(id("ETH"), Token::Base(base("ETH", &[("2", "1000")])));
    let steth = CompositeToken::new(id("stETH"), d("2"), inner);

    let mut outer = BTreeMap::new();
    outer.insert(id("stETH"), Token::Composite(steth));
    outer.insert(id("USDC"), Token::Base(base("USDC", &[("4000", "1")])));
    let mut lp = Token::Composite(CompositeToken::new(id("LP"), d("10"), outer));

    let removed = lp.remove(d("5")).unwrap();

    let mut leaves = BTreeMap::new();
    removed.collect_leaves(&mut leaves);
    assert_eq!(leaves[&id("ETH")], d("1"));
    assert_eq!(leaves[&id("USDC")], d("2000"));
    assert_eq!(removed.cost(), d("3000"));
    assert_eq!(lp.cost(), d("3000"));
}

#[test]
fn test_withdraw_extracts_single_leaf() {
    let mut underlying = BTreeMap::new();
    underlying.insert(id("A"), Token::Base(base("A", &[("40", "2")])));
    underlying.insert(id("B"), Token::Base(base("B", &[("60", "3")])));
    let mut lp = CompositeToken::new(id("LP"), d("100"), underlying);

    let a = lp.withdraw(&id("A"), d("40")).unwrap();

    assert_eq!(a.amount(), d("40"));
    assert_eq!(lp.underlying_amount(&id("A")), Decimal::zero());
    assert_eq!(lp.underlying_amount(&id("B")), d("60"));
    assert_eq!(lp.amount(), d("100"));
    assert!(matches!(
        lp.withdraw(&id("A"), d("1")),
        Err(LedgerError::UnknownUnderlying { .. })
    ));
}

#[test]
fn test_deposit_withdraw_round_trip() {
    let mut ledger = Ledger::new();
    let contract = ContractId::new("0xC");
    ledger.add_buy(&id("X"), d("80"), d("2")).unwrap();
    ledger.add_buy(&id("X"), d("20"), d("3")).unwrap();
    let before = ledger.holding(&id("X")).unwrap().clone();

    ledger.deposit(&contract, &id("X"), d("50")).unwrap();
    let back = ledger.withdraw_from_contract(&contract, &id("X"), d("50")).unwrap();
    ledger.add_token(back).unwrap();

    let after = ledger.holding(&id("X")).unwrap();
    assert_eq!(after.amount(), before.amount());
    assert_eq!(after.cost(), before.cost());
    assert!(ledger.deposit_record(&contract).is_none());
}

#[test]
fn test_holdings_unwrap_across_spot_and_contracts() {
    let mut ledger = Ledger::new();
    ledger.add_buy(&id("ETH"), d("3"), d("1000")).unwrap();
    let eth = ledger.remove_token(&id("ETH"), d("2")).unwrap();
    let mut underlying = BTreeMap::new();
    underlying.insert(id("ETH"), eth);
    ledger.liquid_deposit(&id("stETH"), d("2"), underlying).unwrap();
    ledger.deposit(&ContractId::new("0xvault"), &id("stETH"), d("1")).unwrap();

    let holdings = ledger.holdings();
    assert_eq!(holdings.amount(&id("ETH")), d("3"));
    assert_eq!(holdings.len(), 1);
    assert_eq!(ledger.total_cost(), d("3000"));
}
