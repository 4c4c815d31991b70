// End-to-end scenarios against the public `Ledger` and `AccountTree`
// surfaces, each on its own `tempfile::TempDir`.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use ledgertree::{AccountTree, Ledger, Record, RecordKey, TreeConfig};
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn key(account: &str, date: DateTime<Utc>, seq: u32) -> RecordKey {
    RecordKey::new(account, date, seq)
}

fn amount(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[test]
fn scenario_1_empty_balance() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());
    let balance = ledger
        .balance_as_of("A", &key("A", day(2024, 1, 1), 0))
        .unwrap();
    assert_eq!(balance, amount("0"));
}

#[test]
fn scenario_2_three_inserts_exact_balance() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());

    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 0), "rent", amount("12.50")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 1), "groceries", amount("23.95")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 2), 0), "refund", amount("-7.00")))
        .unwrap();

    assert_eq!(
        ledger.balance_as_of("A", &key("A", day(2024, 1, 1), 1)).unwrap(),
        amount("36.45")
    );
    assert_eq!(
        ledger.balance_as_of("A", &key("A", day(2024, 1, 2), 0)).unwrap(),
        amount("29.45")
    );
}

#[test]
fn scenario_3_delete_restores_correct_balance() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());
    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 0), "rent", amount("12.50")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 1), "groceries", amount("23.95")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 2), 0), "refund", amount("-7.00")))
        .unwrap();

    assert!(ledger.delete(&key("A", day(2024, 1, 1), 1)).unwrap());

    assert_eq!(
        ledger.balance_as_of("A", &key("A", day(2024, 1, 2), 0)).unwrap(),
        amount("5.50")
    );
}

#[test]
fn scenario_4_update_with_amount_change() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());
    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 0), "rent", amount("12.50")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 1), 1), "groceries", amount("23.95")))
        .unwrap();
    ledger
        .insert(Record::new(key("A", day(2024, 1, 2), 0), "refund", amount("-7.00")))
        .unwrap();

    assert!(ledger
        .update(Record::new(key("A", day(2024, 1, 1), 0), "rent", amount("100.00")))
        .unwrap());

    assert_eq!(
        ledger.balance_as_of("A", &key("A", day(2024, 1, 2), 0)).unwrap(),
        amount("116.95")
    );
}

#[test]
fn scenario_5_split_under_stress_at_degree_four() {
    let dir = tempdir().unwrap();
    let mut tree = AccountTree::open(dir.path(), "A", 4);

    let date = day(2024, 6, 1);
    let mut total = amount("0");
    for seq in 0..100u32 {
        let amt = amount("1.00");
        assert!(tree.insert(Record::new(key("A", date, seq), "txn", amt.clone())).unwrap());
        total += amt;
    }

    tree.save().unwrap();

    for len in tree.node_lens() {
        assert!(len <= 4, "node with {len} entries exceeds degree 4 after save");
    }
    assert_eq!(tree.record_count().unwrap(), 100);
    assert_eq!(
        tree.balance_as_of(&key("A", date, 99)).unwrap(),
        total
    );
}

#[test]
fn scenario_6_adjust_key_collision() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());
    let date = day(2024, 3, 1);

    ledger
        .insert(Record::new(key("A", date, 0), "first", amount("1.00")))
        .unwrap();

    let next = ledger.adjust_key(&key("A", date, 0)).unwrap();
    assert_eq!(next.sequence(), 1);

    ledger
        .insert(Record::new(next.clone(), "second", amount("1.00")))
        .unwrap();

    let next2 = ledger.adjust_key(&key("A", date, 0)).unwrap();
    assert_eq!(next2.sequence(), 2);
}

#[test]
fn scenario_7_range_delete() {
    let dir = tempdir().unwrap();
    let mut ledger = Ledger::new(dir.path(), TreeConfig::default());

    let mut total = amount("0");
    let mut removed_total = amount("0");
    for d in 1..=50u32 {
        let date = day(2024, 1, 1) + chrono::Duration::days(d as i64 - 1);
        let amt = amount("2.00");
        ledger
            .insert(Record::new(key("A", date, 0), "txn", amt.clone()))
            .unwrap();
        total += amt.clone();
        if (10..=20).contains(&d) {
            removed_total += amt;
        }
    }

    let start = key("A", day(2024, 1, 10), 0);
    let end = key("A", day(2024, 1, 20), u32::MAX);
    let deleted = ledger.delete_range(&start, &end).unwrap();
    assert_eq!(deleted, 11);

    let remaining = ledger.list("A").unwrap();
    assert_eq!(remaining.len(), 39);

    let remaining_total: BigDecimal = remaining.iter().fold(amount("0"), |acc, r| acc + r.amount());
    assert_eq!(remaining_total, total - removed_total);
}

#[test]
fn scenario_8_persistence_round_trip() {
    let dir = tempdir().unwrap();
    let date = day(2024, 6, 1);
    let mut total = amount("0");

    {
        let mut tree = AccountTree::open(dir.path(), "A", 4);
        for seq in 0..100u32 {
            let amt = amount("1.00");
            tree.insert(Record::new(key("A", date, seq), "txn", amt.clone())).unwrap();
            total += amt;
        }
        tree.save().unwrap();
    }

    let mut reloaded = AccountTree::open(dir.path(), "A", 4);
    assert_eq!(reloaded.record_count().unwrap(), 100);
    assert_eq!(reloaded.list().unwrap().len(), 100);
    assert!(reloaded.contains(&key("A", date, 42)).unwrap());
    assert_eq!(reloaded.balance_as_of(&key("A", date, 99)).unwrap(), total);
}

#[test]
fn scenario_9_adjust_key_after_emptying_top_leaf() {
    let dir = tempdir().unwrap();
    let mut tree = AccountTree::open(dir.path(), "A", 4);
    let date = day(2024, 6, 1);

    // Twelve sequential inserts, then one save: segment_bounds(12, 4)
    // splits the overflowing root leaf into three four-record leaves
    // covering sequences [0..4), [4..8), [8..12).
    for seq in 0..12u32 {
        assert!(tree.insert(Record::new(key("A", date, seq), "txn", amount("1.00"))).unwrap());
    }
    tree.save().unwrap();

    // Empty the leaf holding the day's highest sequences; it keeps its old
    // key bounds (`AccountTree::ref_for`) so routing still reaches it.
    for seq in 8..12u32 {
        assert!(tree.delete_key(&key("A", date, seq)).unwrap());
    }

    // The floor of (A, date, u32::MAX) must now fall back past the emptied
    // leaf to the next sequence actually present (7), not report no
    // predecessor at all.
    let next = tree.adjust_key(date, 0).unwrap();
    assert_eq!(next.sequence(), 8);
}
